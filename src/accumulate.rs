//! This module allows integrating toy Monte Carlo results across trials

use crate::{
    classify::{Classification, Rejection, ResonantChannel},
    histogram::{Axis, Histogram2D, Profile},
    numeric::Float,
    propagate::TrackingUncertainty,
    species::Species,
    Result,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Edges of the parent transverse momentum bins of the analysis (GeV/c)
pub const ANALYSIS_PT_EDGES: [Float; 8] = [0., 1., 2., 4., 6., 8., 12., 24.];

/// Number of resonant channels which are told apart
const NUM_RESONANT_CHANNELS: usize = 4;

/// Uncertainty histograms, vs parent transverse momentum
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintyHistograms {
    /// Sum over daughters of the combined uncertainty
    pub total: Histogram2D,

    /// Sum over daughters of the TPC uncertainty
    pub tpc: Histogram2D,

    /// Sum over daughters of the matching uncertainty
    pub matching: Histogram2D,
}
//
impl UncertaintyHistograms {
    /// Set up empty histograms with a given parent momentum binning
    fn new(pt_axis: Axis) -> Result<Self> {
        let unc_axis = Axis::uniform(500, 0., 50.)?;
        let histogram = || Histogram2D::new(pt_axis.clone(), unc_axis.clone());
        Ok(Self {
            total: histogram(),
            tpc: histogram(),
            matching: histogram(),
        })
    }

    /// Record the uncertainty of one decay
    fn fill(&mut self, parent_pt: Float, uncertainty: &TrackingUncertainty) {
        self.total.fill(parent_pt, uncertainty.total);
        self.tpc.fill(parent_pt, uncertainty.tpc);
        self.matching.fill(parent_pt, uncertainty.matching);
    }

    /// Integrate another set of histograms
    fn merge(&mut self, other: &Self) {
        self.total.merge(&other.total);
        self.tpc.merge(&other.tpc);
        self.matching.merge(&other.matching);
    }

    /// Mean uncertainties vs parent transverse momentum
    fn profiles(&self) -> UncertaintyProfiles {
        UncertaintyProfiles {
            total: self.total.profile_x(),
            tpc: self.tpc.profile_x(),
            matching: self.matching.profile_x(),
        }
    }
}

/// Mean uncertainties vs parent transverse momentum
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintyProfiles {
    /// Combined tracking uncertainty
    pub total: Profile,

    /// TPC track selection part
    pub tpc: Profile,

    /// ITS-TPC matching part
    pub matching: Profile,
}

/// This struct accumulates the results of toy Monte Carlo trials
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToyAccumulator {
    // ### TRIAL COUNTERS ###
    /// Number of simulated trials
    trials: usize,

    /// Number of trials which made it into the uncertainty histograms
    accepted: usize,

    /// Number of excluded trials, by reason
    rejections: BTreeMap<&'static str, usize>,

    /// Number of accepted trials, by resonant channel identifier
    resonant_channels: [usize; NUM_RESONANT_CHANNELS],

    // ### HISTOGRAMS ###
    /// Uncertainties with a fine parent momentum binning
    fine: UncertaintyHistograms,

    /// Uncertainties with the parent momentum binning of the analysis
    binned: UncertaintyHistograms,

    /// Parent pT vs rapidity of usable decays
    pt_y_generated: Histogram2D,

    /// Same, restricted to the fiducial acceptance
    pt_y_fiducial: Histogram2D,

    /// Same, further restricted to decays with all daughters in acceptance
    pt_y_reconstructable: Histogram2D,

    /// Parent pT vs proton daughter pT
    proton_pt: Histogram2D,

    /// Parent pT vs pion daughter pT, K0S decay products included
    pion_pt: Histogram2D,

    /// Parent pT vs kaon daughter pT
    kaon_pt: Histogram2D,
}
//
impl ToyAccumulator {
    /// Prepare for results integration
    pub fn new() -> Result<Self> {
        let pt_y = || -> Result<Histogram2D> {
            Ok(Histogram2D::new(
                Axis::uniform(400, 0., 40.)?,
                Axis::uniform(20, -1., 1.)?,
            ))
        };
        let daughter_pt = || -> Result<Histogram2D> {
            Ok(Histogram2D::new(
                Axis::uniform(60, 0., 30.)?,
                Axis::uniform(60, 0., 30.)?,
            ))
        };
        Ok(Self {
            trials: 0,
            accepted: 0,
            rejections: BTreeMap::new(),
            resonant_channels: [0; NUM_RESONANT_CHANNELS],
            fine: UncertaintyHistograms::new(Axis::uniform(300, 0., 30.)?)?,
            binned: UncertaintyHistograms::new(Axis::new(ANALYSIS_PT_EDGES.to_vec())?)?,
            pt_y_generated: pt_y()?,
            pt_y_fiducial: pt_y()?,
            pt_y_reconstructable: pt_y()?,
            proton_pt: daughter_pt()?,
            pion_pt: daughter_pt()?,
            kaon_pt: daughter_pt()?,
        })
    }

    /// Number of simulated trials
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Number of trials which made it into the uncertainty histograms
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of excluded trials, by reason
    pub fn rejections(&self) -> &BTreeMap<&'static str, usize> {
        &self.rejections
    }

    /// Record an excluded trial
    pub fn reject(&mut self, rejection: &Rejection) {
        self.trials += 1;
        *self.rejections.entry(rejection.kind()).or_default() += 1;
    }

    /// Record a usable trial
    pub fn integrate(&mut self, trial: &AcceptedTrial) {
        self.trials += 1;
        self.accepted += 1;
        self.resonant_channels[usize::from(trial.classification.resonant_channel.id())] += 1;

        let pt = trial.parent_pt;
        self.fine.fill(pt, &trial.uncertainty);
        self.binned.fill(pt, &trial.uncertainty);
        for daughter in &trial.uncertainty.daughters {
            let histogram = match daughter.species {
                Species::Proton => &mut self.proton_pt,
                Species::Pion => &mut self.pion_pt,
                Species::Kaon => &mut self.kaon_pt,
                _ => continue,
            };
            histogram.fill(pt, daughter.pt);
        }

        self.pt_y_generated.fill(pt, trial.parent_y);
        if trial.in_fiducial_acceptance {
            self.pt_y_fiducial.fill(pt, trial.parent_y);
            if trial.classification.in_acceptance == trial.classification.counts {
                self.pt_y_reconstructable.fill(pt, trial.parent_y);
            }
        }
    }

    /// Integrate simulation results from another accumulator
    #[allow(clippy::needless_pass_by_value)]
    pub fn merge(&mut self, other: Self) {
        self.trials += other.trials;
        self.accepted += other.accepted;
        for (kind, count) in other.rejections {
            *self.rejections.entry(kind).or_default() += count;
        }
        for (mine, theirs) in self
            .resonant_channels
            .iter_mut()
            .zip(other.resonant_channels)
        {
            *mine += theirs;
        }
        self.fine.merge(&other.fine);
        self.binned.merge(&other.binned);
        self.pt_y_generated.merge(&other.pt_y_generated);
        self.pt_y_fiducial.merge(&other.pt_y_fiducial);
        self.pt_y_reconstructable.merge(&other.pt_y_reconstructable);
        self.proton_pt.merge(&other.proton_pt);
        self.pion_pt.merge(&other.pion_pt);
        self.kaon_pt.merge(&other.kaon_pt);
    }

    /// Turn integrated simulation data into finalized results
    pub fn finalize(self) -> ToyResults {
        let resonant_channels = [
            ResonantChannel::NonResonant,
            ResonantChannel::Lambda1520,
            ResonantChannel::KStar0,
            ResonantChannel::DeltaPlusPlus,
        ]
        .into_iter()
        .map(|channel| (channel, self.resonant_channels[usize::from(channel.id())]))
        .collect();
        ToyResults {
            profiles: self.fine.profiles(),
            binned_profiles: self.binned.profiles(),
            resonant_channels,
            accumulator: self,
        }
    }
}

/// What the toy Monte Carlo learned from a usable trial
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedTrial {
    /// Parent transverse momentum (GeV/c)
    pub parent_pt: Float,

    /// Parent rapidity
    pub parent_y: Float,

    /// Truth that the parent is within the fiducial acceptance
    pub in_fiducial_acceptance: bool,

    /// Daughter classification
    pub classification: Classification,

    /// Tracking uncertainty of the decay
    pub uncertainty: TrackingUncertainty,
}

/// Final results of the toy Monte Carlo
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToyResults {
    /// Mean uncertainties with a fine parent momentum binning
    pub profiles: UncertaintyProfiles,

    /// Mean uncertainties with the parent momentum binning of the analysis
    pub binned_profiles: UncertaintyProfiles,

    /// Number of accepted trials in each resonant channel
    pub resonant_channels: Vec<(ResonantChannel, usize)>,

    /// Raw accumulated data
    pub accumulator: ToyAccumulator,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decay::DaughterCounts, propagate::DaughterContribution};
    use approx::assert_relative_eq;

    fn trial(parent_pt: Float, total: Float) -> AcceptedTrial {
        let counts = DaughterCounts {
            pions: 1,
            kaons: 1,
            ..DaughterCounts::default()
        };
        AcceptedTrial {
            parent_pt,
            parent_y: 0.1,
            in_fiducial_acceptance: true,
            classification: Classification {
                counts,
                in_acceptance: counts,
                ..Classification::default()
            },
            uncertainty: TrackingUncertainty {
                total,
                tpc: total / 2.,
                matching: total / 2.,
                daughters: vec![DaughterContribution {
                    species: Species::Kaon,
                    pt: parent_pt / 2.,
                    matching: total / 2.,
                    tpc: total / 2.,
                    from_k0s: false,
                }],
            },
        }
    }

    #[test]
    fn merging_matches_single_accumulation() {
        let mut single = ToyAccumulator::new().unwrap();
        let mut first = ToyAccumulator::new().unwrap();
        let mut second = ToyAccumulator::new().unwrap();
        let trials = [trial(3.5, 4.), trial(3.6, 6.), trial(10., 2.)];
        for (i, t) in trials.iter().enumerate() {
            single.integrate(t);
            if i == 0 {
                first.integrate(t);
            } else {
                second.integrate(t);
            }
        }
        single.reject(&Rejection::EmptyDecay);
        second.reject(&Rejection::EmptyDecay);
        first.merge(second);
        assert_eq!(first, single);
        assert_eq!(single.trials(), 4);
        assert_eq!(single.accepted(), 3);
        assert_eq!(single.rejections()["empty decay"], 1);
    }

    #[test]
    fn binned_profile_averages_trials() {
        let mut acc = ToyAccumulator::new().unwrap();
        acc.integrate(&trial(3.5, 4.));
        acc.integrate(&trial(2.5, 6.));
        acc.integrate(&trial(10., 2.));
        let results = acc.finalize();
        let total = &results.binned_profiles.total;
        assert_relative_eq!(total.mean[2], 5.);
        assert_relative_eq!(total.entries[2], 2.);
        assert_relative_eq!(total.mean[5], 2.);
        assert_relative_eq!(total.mean[0], 0.);
        assert_eq!(results.resonant_channels[0], (ResonantChannel::NonResonant, 3));
    }
}
