//! Toy Monte Carlo propagation of single-track uncertainties to decays

use crate::{
    accumulate::{AcceptedTrial, ToyAccumulator},
    classify::{
        DaughterAcceptance, DecayDaughterClassifier, FiducialAcceptance, FiducialPolicy, Rejection,
    },
    config::ToyConfiguration,
    dataset::{Centrality, Dataset},
    decay::{DecayChannel, DecayTree, Decayer},
    momentum,
    numeric::{reals::consts::PI, Float},
    propagate::{ProtonTpcSource, SpeciesTables, UncertaintyPropagator},
    random::RandomGenerator,
    scheduling,
    spectrum::{PtSampler, PtShape},
    Result,
};
use eyre::eyre;
use std::ops::Range;
use tracing::{debug, info, trace};

/// Trials between two progress reports
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Toy Monte Carlo simulation of the decays of one channel
pub struct ToyMcDriver<D: Decayer> {
    /// Decay channel under study
    channel: DecayChannel,

    /// Mass of the decaying parent (GeV/c²)
    parent_mass: Float,

    /// Parent transverse momentum spectrum
    pt_sampler: PtSampler,

    /// Parent rapidity range of interest
    fiducial: FiducialAcceptance,

    /// Decay generator
    decayer: D,

    /// Daughter classification
    classifier: DecayDaughterClassifier,

    /// Uncertainty propagation
    propagator: UncertaintyPropagator,

    /// Accumulator from which each batch of trials starts
    empty_accumulator: ToyAccumulator,
}
//
impl<D: Decayer> ToyMcDriver<D> {
    /// Set up a simulation
    pub fn new(
        channel: DecayChannel,
        pt_shape: PtShape,
        fiducial: FiducialAcceptance,
        tables: SpeciesTables,
        proton_tpc: ProtonTpcSource,
        decayer: D,
    ) -> Result<Self> {
        let parent_mass = channel
            .parent_species()
            .mass()
            .ok_or_else(|| eyre!("Unknown mass of the {} parent", channel))?;
        Ok(Self {
            channel,
            parent_mass,
            pt_sampler: pt_shape.sampler(channel)?,
            fiducial,
            decayer,
            classifier: DecayDaughterClassifier::new(DaughterAcceptance::default()),
            propagator: UncertaintyPropagator::new(
                tables,
                proton_tpc,
                channel.expected_daughters(),
            )?,
            empty_accumulator: ToyAccumulator::new()?,
        })
    }

    /// Simulate one decay
    pub fn simulate_trial(
        &self,
        trial: usize,
        rng: &mut RandomGenerator,
    ) -> std::result::Result<AcceptedTrial, Rejection> {
        // Generate the parent
        let parent_pt = self.pt_sampler.sample(rng);
        let phi = rng.uniform(0., 2. * PI);
        let parent_y = rng.uniform(-1., 1.);
        let parent = momentum::from_pt_phi_y(self.parent_mass, parent_pt, phi, parent_y);

        // Decay it
        let particles = self.decayer.decay(self.channel.parent_pdg(), &parent, rng);
        let tree = DecayTree::from_flat(&particles).ok_or(Rejection::EmptyDecay)?;
        if !self.channel.has_expected_topology(&tree, particles.len()) {
            return Err(Rejection::UnexpectedTopology);
        }

        // Check out the daughters and propagate their uncertainties
        let classification = self.classifier.classify(&tree);
        if let Some(rejection) = classification.inconsistency {
            return Err(rejection);
        }
        let uncertainty = self.propagator.propagate(&tree)?;
        if trial % PROGRESS_INTERVAL == 0 {
            for daughter in &uncertainty.daughters {
                trace!(
                    "Trial {}: {} daughter{} with pT = {} GeV/c, matching = {}%, TPC = {}%",
                    trial,
                    daughter.species,
                    if daughter.from_k0s { " from K0S" } else { "" },
                    daughter.pt,
                    daughter.matching,
                    daughter.tpc
                );
            }
        }

        Ok(AcceptedTrial {
            parent_pt,
            parent_y,
            in_fiducial_acceptance: self.fiducial.is_in_fiducial_acceptance(parent_pt, parent_y),
            classification,
            uncertainty,
        })
    }

    /// Simulate a range of trials, given an initial random generator state
    pub fn simulate_trials(&self, trials: Range<usize>, rng: &mut RandomGenerator) -> ToyAccumulator {
        let mut accumulator = self.empty_accumulator.clone();
        for trial in trials {
            if trial % PROGRESS_INTERVAL == 0 {
                info!("Trial {}", trial);
            }
            match self.simulate_trial(trial, rng) {
                Ok(accepted) => accumulator.integrate(&accepted),
                Err(rejection) => {
                    debug!("Trial {} rejected: {}", trial, rejection);
                    accumulator.reject(&rejection);
                }
            }
        }
        accumulator
    }

    /// Simulate a number of trials, in batches
    pub fn run(&self, num_trials: usize, seed: u64) -> ToyAccumulator {
        scheduling::run_simulation(num_trials, seed, |trials, rng| {
            self.simulate_trials(trials, rng)
        })
    }
}

/// Stem of the output file names of a toy Monte Carlo run
pub fn output_stem(config: &ToyConfiguration) -> String {
    let mut stem = format!("Acceptance_Toy_{}_", config.channel);
    match config.fiducial.policy {
        FiducialPolicy::Fixed => {
            stem.push_str(&format!("yfid{:02}_", (config.fiducial.y_max * 10.).round() as i32))
        }
        FiducialPolicy::PtDependent => stem.push_str("yfidPtDep_"),
    }
    match config.run.dataset {
        Dataset::Lhc18r => stem.push_str("18r_"),
        Dataset::Lhc18q => stem.push_str("18q_"),
        _ => {}
    }
    match config.run.centrality {
        Centrality::Central => stem.push_str("central_"),
        Centrality::SemiCentral => stem.push_str("semiCentral_"),
        _ => {}
    }
    if config.proton_tpc == ProtonTpcSource::Fit {
        stem.push_str("protonFit_");
    }
    let acceptance = DaughterAcceptance::default();
    stem.push_str(&format!(
        "etaDau{:02}_ptDau{}_{}",
        (acceptance.max_eta * 10.).round() as i32,
        (acceptance.min_pt * 1000.).round() as i32,
        config.pt_shape.file_suffix(config.channel)
    ));
    stem
}
