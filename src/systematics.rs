//! Extraction of the TPC track selection systematic uncertainty
//!
//! For each tabulated species, the efficiency of every track selection
//! variation (relative to the sample without extra cut) is measured in data
//! and in simulation. The single-track uncertainty in each momentum bin is
//! the largest relative deviation of the data/simulation efficiency ratio
//! from unity across the variations.

use crate::{
    cuts::CutVariant,
    histogram::{self, Axis, BinnedTable, DeviationEntry},
    numeric::Float,
    species::TrackSpecies,
    track::{Track, TrackTags},
    Result,
};
use eyre::bail;
use prefix_num_ops::real::*;
use tracing::{debug, info};

/// Transverse momentum binning of the uncertainty tables (GeV/c)
pub const PT_BIN_EDGES: [Float; 13] = [
    0., 0.5, 1., 1.5, 2., 2.5, 3., 3.5, 4., 5., 6., 8., 15.,
];

/// Default bound on the TPC PID score of identified pions and protons
///
/// This bound is expressed in different units than the stored scores, which
/// makes it far wider than any real score: the gate is effectively a no-op.
///
pub const DEFAULT_PID_GATE: Float = 300.;

/// Half-width of the TOF PID window defining the charged-particle sample
const CHARGED_TOF_WINDOW: Float = 10.;

/// Interval at which track processing progress is reported
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Knobs of the extraction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractionSettings {
    /// Bound on |TPC PID score| for identified pions and protons, if enabled
    pub pid_gate: Option<Float>,

    /// Minimal transverse momentum of identified protons (GeV/c)
    pub proton_min_pt: Float,
}
//
impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            pid_gate: Some(DEFAULT_PID_GATE),
            proton_min_pt: 0.,
        }
    }
}

/// Momentum spectra of one species in one sample, before and after each cut
/// variation
#[derive(Clone, Debug, PartialEq)]
pub struct VariantHistograms {
    /// Spectrum without extra cut
    pub all: BinnedTable,

    /// Spectrum after each cut variation, in `CutVariant::ALL` order
    pub passing: Vec<BinnedTable>,
}
//
impl VariantHistograms {
    /// Set up empty spectra
    pub fn new(axis: &Axis) -> Self {
        Self {
            all: BinnedTable::with_axis(axis.clone()),
            passing: vec![BinnedTable::with_axis(axis.clone()); CutVariant::ALL.len()],
        }
    }

    /// Record a track
    pub fn fill(&mut self, track: &Track) {
        self.all.fill(track.pt);
        for (variant, hist) in CutVariant::ALL.iter().zip(&mut self.passing) {
            if variant.keep(track) {
                hist.fill(track.pt);
            }
        }
    }

    /// Efficiency of each cut variation, in `CutVariant::ALL` order
    pub fn efficiencies(&self) -> Result<Vec<BinnedTable>> {
        self.passing
            .iter()
            .map(|passing| passing.divide(&self.all))
            .collect()
    }
}

/// Systematic uncertainty of one species, with intermediate results
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesSystematics {
    /// Species under study
    pub species: TrackSpecies,

    /// Spectra measured in data
    pub data: VariantHistograms,

    /// Spectra measured in simulation
    pub mc: VariantHistograms,

    /// Data efficiency of each cut variation
    pub data_efficiencies: Vec<BinnedTable>,

    /// Simulated efficiency of each cut variation
    pub mc_efficiencies: Vec<BinnedTable>,

    /// Data/simulation efficiency ratio of each cut variation
    pub data_over_mc: Vec<BinnedTable>,

    /// Single-track uncertainty (%)
    pub uncertainty: BinnedTable,
}
//
impl SpeciesSystematics {
    /// Named tables to be persisted
    pub fn named_tables(&self) -> Vec<(String, &BinnedTable)> {
        let species = self.species.name();
        let mut tables = vec![
            (format!("h_{}_all_data", species), &self.data.all),
            (format!("h_{}_all_mc", species), &self.mc.all),
        ];
        for (i, variant) in CutVariant::ALL.iter().enumerate() {
            let number = variant.number();
            tables.push((
                format!("h_{}_Cut{}_data", species, number),
                &self.data_efficiencies[i],
            ));
            tables.push((
                format!("h_{}_Cut{}_mc", species, number),
                &self.mc_efficiencies[i],
            ));
            tables.push((
                format!("h_{}_Cut{}_data_over_mc", species, number),
                &self.data_over_mc[i],
            ));
        }
        tables.push((self.species.uncertainty_key(), &self.uncertainty));
        tables
    }
}

/// Extractor of per-species single-track systematic uncertainties
pub struct TrackingSystematicExtractor {
    /// Knobs of the extraction
    settings: ExtractionSettings,

    /// Transverse momentum binning
    axis: Axis,
}
//
impl TrackingSystematicExtractor {
    /// Set up an extractor with the standard momentum binning
    pub fn new(settings: ExtractionSettings) -> Result<Self> {
        Ok(Self {
            settings,
            axis: Axis::new(PT_BIN_EDGES.to_vec())?,
        })
    }

    /// Decide whether a track belongs to the sample of some species
    ///
    /// Samples are not exclusive: a track can belong to several of them.
    ///
    pub fn selects(&self, species: TrackSpecies, track: &Track) -> bool {
        let pid_gate_ok = |n_sigma: Float| match self.settings.pid_gate {
            Some(gate) => abs(n_sigma) < gate,
            None => true,
        };
        let in_tof_window =
            |n_sigma: Float| n_sigma > -CHARGED_TOF_WINDOW && n_sigma < CHARGED_TOF_WINDOW;
        let tags = track.tags;
        match species {
            TrackSpecies::Proton => {
                tags.intersects(TrackTags::PROTON_FROM_LAMBDA | TrackTags::PROTON_FROM_TOF)
                    && track.pt >= self.settings.proton_min_pt
                    && pid_gate_ok(track.n_sigma.tpc_proton)
            }
            TrackSpecies::Pion => {
                tags.intersects(
                    TrackTags::PION_FROM_K0S
                        | TrackTags::PION_FROM_LAMBDA
                        | TrackTags::PION_FROM_TOF,
                ) && pid_gate_ok(track.n_sigma.tpc_pion)
            }
            TrackSpecies::Kaon => tags.intersects(TrackTags::KAON_FROM_TOF),
            TrackSpecies::Charged => {
                in_tof_window(track.n_sigma.tof_kaon)
                    || in_tof_window(track.n_sigma.tof_proton)
                    || in_tof_window(track.n_sigma.tof_pion)
            }
        }
    }

    /// Measure the momentum spectra of several species in one sample
    fn histogram_sample(
        &self,
        sample_name: &str,
        tracks: &[Track],
        species: &[TrackSpecies],
    ) -> Vec<VariantHistograms> {
        info!("Processing {} {} tracks", tracks.len(), sample_name);
        let mut histograms = vec![VariantHistograms::new(&self.axis); species.len()];
        for (i, track) in tracks.iter().enumerate() {
            if i % PROGRESS_INTERVAL == 0 {
                debug!("-- {} track {}", sample_name, i);
            }
            if !track.is_usable() {
                continue;
            }
            for (&species, hist) in species.iter().zip(&mut histograms) {
                if self.selects(species, track) {
                    hist.fill(track);
                }
            }
        }
        histograms
    }

    /// Turn the spectra of one species into a systematic uncertainty
    fn reduce(
        &self,
        species: TrackSpecies,
        data: VariantHistograms,
        mc: VariantHistograms,
    ) -> Result<SpeciesSystematics> {
        let data_efficiencies = data.efficiencies()?;
        let mc_efficiencies = mc.efficiencies()?;
        let data_over_mc = data_efficiencies
            .iter()
            .zip(&mc_efficiencies)
            .map(|(data_eff, mc_eff)| data_eff.divide(mc_eff))
            .collect::<Result<Vec<_>>>()?;

        // Retired variations keep their slot as a zero deviation
        let entries = CutVariant::ALL
            .iter()
            .zip(&data_over_mc)
            .map(|(variant, ratio)| {
                if variant.is_used_for_uncertainty() {
                    DeviationEntry::Ratio(ratio)
                } else {
                    DeviationEntry::Zero
                }
            })
            .collect::<Vec<_>>();
        let uncertainty = histogram::max_abs_deviation_from_unity(&self.axis, &entries)?;

        Ok(SpeciesSystematics {
            species,
            data,
            mc,
            data_efficiencies,
            mc_efficiencies,
            data_over_mc,
            uncertainty,
        })
    }

    /// Extract the systematic uncertainty of a single species
    pub fn extract_species(
        &self,
        data_tracks: &[Track],
        mc_tracks: &[Track],
        species: TrackSpecies,
    ) -> Result<SpeciesSystematics> {
        let data = self.histogram_sample("data", data_tracks, &[species]).pop();
        let mc = self.histogram_sample("MC", mc_tracks, &[species]).pop();
        let (Some(data), Some(mc)) = (data, mc) else {
            bail!("No {} spectrum was measured", species.name());
        };
        self.reduce(species, data, mc)
    }

    /// Extract the systematic uncertainty of every tabulated species, going
    /// through each sample only once
    pub fn extract(
        &self,
        data_tracks: &[Track],
        mc_tracks: &[Track],
    ) -> Result<Vec<SpeciesSystematics>> {
        let data = self.histogram_sample("data", data_tracks, &TrackSpecies::ALL);
        let mc = self.histogram_sample("MC", mc_tracks, &TrackSpecies::ALL);
        TrackSpecies::ALL
            .iter()
            .zip(data.into_iter().zip(mc))
            .map(|(&species, (data, mc))| self.reduce(species, data, mc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ClusterCounts, NSigma};

    fn track(pt: Float, tags: TrackTags) -> Track {
        Track {
            pt,
            clusters: ClusterCounts {
                total: 100.,
                pid: 50.,
                crossed_rows: 110.,
                findable: 130.,
            },
            tags,
            n_sigma: NSigma {
                tof_pion: 50.,
                tof_kaon: 50.,
                tof_proton: 50.,
                ..NSigma::default()
            },
        }
    }

    #[test]
    fn species_membership() {
        let extractor = TrackingSystematicExtractor::new(ExtractionSettings::default()).unwrap();
        let mut proton = track(1., TrackTags::PROTON_FROM_TOF | TrackTags::PION_FROM_K0S);
        assert!(extractor.selects(TrackSpecies::Proton, &proton));
        assert!(extractor.selects(TrackSpecies::Pion, &proton));
        assert!(!extractor.selects(TrackSpecies::Kaon, &proton));
        assert!(!extractor.selects(TrackSpecies::Charged, &proton));

        // The default gate lets through any realistic PID score
        proton.n_sigma.tpc_proton = 25.;
        proton.n_sigma.tpc_pion = -40.;
        assert!(extractor.selects(TrackSpecies::Proton, &proton));
        assert!(extractor.selects(TrackSpecies::Pion, &proton));

        proton.n_sigma.tpc_proton = -300.;
        assert!(!extractor.selects(TrackSpecies::Proton, &proton));
        let ungated = TrackingSystematicExtractor::new(ExtractionSettings {
            pid_gate: None,
            ..ExtractionSettings::default()
        })
        .unwrap();
        assert!(ungated.selects(TrackSpecies::Proton, &proton));

        proton.n_sigma.tof_kaon = 9.;
        assert!(extractor.selects(TrackSpecies::Charged, &proton));
        proton.n_sigma.tof_kaon = -10.;
        assert!(!extractor.selects(TrackSpecies::Charged, &proton));
    }

    #[test]
    fn proton_momentum_threshold() {
        let extractor = TrackingSystematicExtractor::new(ExtractionSettings {
            proton_min_pt: 0.4,
            ..ExtractionSettings::default()
        })
        .unwrap();
        assert!(!extractor.selects(TrackSpecies::Proton, &track(0.3, TrackTags::PROTON_FROM_LAMBDA)));
        assert!(extractor.selects(TrackSpecies::Proton, &track(0.4, TrackTags::PROTON_FROM_LAMBDA)));
    }

    #[test]
    fn denominator_dominates_every_variant() {
        let extractor = TrackingSystematicExtractor::new(ExtractionSettings::default()).unwrap();
        let tracks = (0..200)
            .map(|i| {
                let mut t = track(0.05 + 0.07 * (i as Float), TrackTags::KAON_FROM_TOF);
                t.clusters.pid = (i % 90) as Float;
                t.clusters.crossed_rows = 80. + (i % 70) as Float;
                t
            })
            .collect::<Vec<_>>();
        let hists = extractor.histogram_sample("test", &tracks, &[TrackSpecies::Kaon]);
        for passing in &hists[0].passing {
            for bin in 0..passing.num_bins() {
                assert!(passing.bin_content(bin) <= hists[0].all.bin_content(bin));
            }
        }
    }

    #[test]
    fn unusable_tracks_are_skipped() {
        let extractor = TrackingSystematicExtractor::new(ExtractionSettings::default()).unwrap();
        let mut no_findable = track(1., TrackTags::KAON_FROM_TOF);
        no_findable.clusters.findable = 0.;
        let hists = extractor.histogram_sample(
            "test",
            &[no_findable, track(0., TrackTags::KAON_FROM_TOF)],
            &[TrackSpecies::Kaon],
        );
        assert_eq!(hists[0].all.integral(), 0.);
    }
}
