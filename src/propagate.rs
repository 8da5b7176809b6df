//! Propagation of single-track uncertainties to a whole decay

use crate::{
    classify::{Rejection, TrackedDaughter, TrackedDaughters},
    config::{option_name, parse_option, UnknownOption},
    decay::{DaughterCounts, DecayTree},
    histogram::BinnedTable,
    momentum,
    numeric::Float,
    species::Species,
    tables::PionProtonTables,
    Result,
};
use eyre::ensure;
use nalgebra::{Matrix2, Vector2};
use prefix_num_ops::real::*;
use std::{fmt, str::FromStr};
use tracing::debug;

/// Where the TPC uncertainty of protons comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtonTpcSource {
    /// Bin contents of the proton table
    Histogram,

    /// Straight line fitted to the proton table
    Fit,
}
//
impl ProtonTpcSource {
    const CHOICES: [(&'static str, Self); 2] = [("histogram", Self::Histogram), ("fit", Self::Fit)];
}
//
impl FromStr for ProtonTpcSource {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("proton TPC source", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for ProtonTpcSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Straight line `intercept + slope * x`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    /// Value at zero
    pub intercept: Float,

    /// Derivative
    pub slope: Float,
}
//
impl LinearFit {
    /// Least-squares fit of a straight line through the bin centers of a table
    ///
    /// Bin contents are treated as Poisson counts, so each non-empty bin is
    /// weighted by the inverse of its content and empty bins are ignored.
    ///
    pub fn fit(table: &BinnedTable) -> Result<Self> {
        let mut normal = Matrix2::<Float>::zeros();
        let mut rhs = Vector2::<Float>::zeros();
        let mut num_points = 0;
        for bin in 0..table.num_bins() {
            let y = table.bin_content(bin);
            if y <= 0. {
                continue;
            }
            let x = table.axis().bin_center(bin);
            let weight = 1. / y;
            let basis = Vector2::new(1., x);
            normal += weight * basis * basis.transpose();
            rhs += weight * y * basis;
            num_points += 1;
        }
        ensure!(
            num_points >= 2,
            "A straight line fit needs at least two non-empty bins, got {}",
            num_points
        );
        let solution = normal
            .try_inverse()
            .map(|inverse| inverse * rhs)
            .ok_or_else(|| eyre::eyre!("Straight line fit is degenerate"))?;
        Ok(Self {
            intercept: solution[0],
            slope: solution[1],
        })
    }

    /// Value of the line at some abscissa
    pub fn eval(&self, x: Float) -> Float {
        self.intercept + self.slope * x
    }
}

/// Uncertainty tables of the tracked species
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesTables {
    /// ITS-TPC matching uncertainties
    pub matching: PionProtonTables,

    /// TPC track selection uncertainties
    pub tpc: PionProtonTables,
}
//
impl SpeciesTables {
    /// Proton TPC uncertainties above this value (%) are considered
    /// statistical fluctuations and discarded
    pub const MAX_PROTON_TPC: Float = 30.;

    /// Bundle matching and TPC tables
    ///
    /// Proton TPC bins above `MAX_PROTON_TPC` are zeroed.
    ///
    pub fn new(matching: PionProtonTables, mut tpc: PionProtonTables) -> Self {
        for bin in 0..tpc.proton.num_bins() {
            if tpc.proton.bin_content(bin) > Self::MAX_PROTON_TPC {
                debug!(
                    "Discarding proton TPC uncertainty of {}% in bin {}",
                    tpc.proton.bin_content(bin),
                    bin
                );
                tpc.proton.set_bin_content(bin, 0.);
            }
        }
        Self { matching, tpc }
    }
}

/// Uncertainty contribution of one daughter track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaughterContribution {
    /// Species of the daughter
    pub species: Species,

    /// Transverse momentum (GeV/c)
    pub pt: Float,

    /// ITS-TPC matching uncertainty (%)
    pub matching: Float,

    /// TPC track selection uncertainty (%)
    pub tpc: Float,

    /// Truth that the track comes from a K0S decay
    pub from_k0s: bool,
}
//
impl DaughterContribution {
    /// Matching and TPC uncertainties added in quadrature
    pub fn combined(&self) -> Float {
        sqrt(self.matching.powi(2) + self.tpc.powi(2))
    }
}

/// Tracking uncertainty of a decay (%)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackingUncertainty {
    /// Linear sum of the per-daughter combined uncertainties
    pub total: Float,

    /// Linear sum of the per-daughter TPC uncertainties
    pub tpc: Float,

    /// Linear sum of the per-daughter matching uncertainties
    pub matching: Float,

    /// Individual contributions, in decay order
    pub daughters: Vec<DaughterContribution>,
}
//
impl TrackingUncertainty {
    /// Account for one more daughter
    fn add(&mut self, contribution: DaughterContribution) {
        self.total += contribution.combined();
        self.tpc += contribution.tpc;
        self.matching += contribution.matching;
        self.daughters.push(contribution);
    }
}

/// How the proton TPC uncertainty is evaluated
#[derive(Clone, Copy, Debug, PartialEq)]
enum ProtonTpc {
    Histogram,
    Fit(LinearFit),
}

/// Propagates single-track uncertainties to decays of one channel
#[derive(Clone, Debug, PartialEq)]
pub struct UncertaintyPropagator {
    /// Single-track uncertainty tables
    tables: SpeciesTables,

    /// Evaluation of the proton TPC uncertainty
    proton_tpc: ProtonTpc,

    /// Tracked daughters of the decay channel
    expected: DaughterCounts,
}
//
impl UncertaintyPropagator {
    /// Set up a propagator for a decay channel with given tracked daughters
    pub fn new(
        tables: SpeciesTables,
        proton_source: ProtonTpcSource,
        expected: DaughterCounts,
    ) -> Result<Self> {
        let proton_tpc = match proton_source {
            ProtonTpcSource::Histogram => ProtonTpc::Histogram,
            ProtonTpcSource::Fit => {
                let fit = LinearFit::fit(&tables.tpc.proton)?;
                debug!(
                    "Proton TPC uncertainty fit: {} + {} * pT",
                    fit.intercept, fit.slope
                );
                ProtonTpc::Fit(fit)
            }
        };
        Ok(Self {
            tables,
            proton_tpc,
            expected,
        })
    }

    /// Single-track uncertainty tables in use
    pub fn tables(&self) -> &SpeciesTables {
        &self.tables
    }

    /// Straight line used for proton TPC uncertainties, if any
    pub fn proton_fit(&self) -> Option<LinearFit> {
        match self.proton_tpc {
            ProtonTpc::Fit(fit) => Some(fit),
            ProtonTpc::Histogram => None,
        }
    }

    /// Compute the tracking uncertainty of a decay
    ///
    /// Fails if a daughter is too soft, if a K0S did not decay into two pions,
    /// or if the tracked daughters are not those of the decay channel. No
    /// partial result is produced in these cases.
    ///
    pub fn propagate(&self, tree: &DecayTree) -> std::result::Result<TrackingUncertainty, Rejection> {
        let tracked = TrackedDaughters::walk(tree)?;
        if tracked.counts != self.expected {
            return Err(Rejection::WrongMultiplicity {
                found: tracked.counts,
                expected: self.expected,
            });
        }
        let mut result = TrackingUncertainty::default();
        for daughter in &tracked.daughters {
            result.add(self.contribution(daughter));
        }
        Ok(result)
    }

    /// Uncertainty contribution of a daughter track
    ///
    /// Kaons use pion tables, and K0S decay products carry no matching
    /// uncertainty.
    ///
    fn contribution(&self, daughter: &TrackedDaughter) -> DaughterContribution {
        let species = daughter.particle.species();
        let pt = momentum::pt(&daughter.particle.momentum);
        let (matching, tpc) = match species {
            Species::Proton => (
                self.tables.matching.proton.lookup(pt),
                match self.proton_tpc {
                    ProtonTpc::Histogram => self.tables.tpc.proton.lookup(pt),
                    ProtonTpc::Fit(fit) => fit.eval(pt),
                },
            ),
            _ => (
                self.tables.matching.pion.lookup(pt),
                self.tables.tpc.pion.lookup(pt),
            ),
        };
        DaughterContribution {
            species,
            pt,
            matching: if daughter.from_k0s { 0. } else { matching },
            tpc,
            from_k0s: daughter.from_k0s,
        }
    }
}
