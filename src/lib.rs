//! trackunc: single-track systematic uncertainties of charm hadron decays
//!
//!
//! # Introduction (for the physicist)
//!
//! Charm hadrons are reconstructed from their charged decay daughters, so the
//! imperfect description of track reconstruction by the detector simulation
//! is a source of systematic uncertainty on every charm measurement.
//!
//! This program tackles the problem in two steps:
//!
//! * First, the single-track uncertainty of each species (pions, kaons,
//!   protons) is extracted by comparing how data and simulation tracks react
//!   to variations of the TPC track quality cuts.
//! * Then, a toy Monte Carlo decays charm hadrons following a realistic
//!   transverse momentum spectrum, and combines the single-track
//!   uncertainties of the daughters into the tracking uncertainty of the
//!   parent, as a function of its transverse momentum.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Per-daughter TPC and ITS-TPC matching uncertainties are added in
//! quadrature, then summed linearly over daughters since they are fully
//! correlated. The toy Monte Carlo averages this over phase space.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Each step is a pipeline:
//!
//! * read in a configuration file
//! * load inputs (track samples or uncertainty tables)
//! * loop over tracks or (random) decays, accumulating histograms
//! * reduce the histograms into tables and profiles
//! * then store the results as JSON along with a text summary.
//!
//! The toy Monte Carlo runs in batches of trials, optionally in parallel, with
//! results that do not depend on the number of threads.

#![warn(missing_docs)]

pub mod accumulate;
pub mod classify;
pub mod config;
pub mod cuts;
pub mod dataset;
pub mod decay;
pub mod histogram;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod phasespace;
pub mod propagate;
pub mod random;
pub mod sample;
pub mod scheduling;
pub mod species;
pub mod spectrum;
pub mod systematics;
pub mod tables;
pub mod toymc;
pub mod track;

/// We'll use eyre's type-erased result type throughout the application
pub type Result<T> = eyre::Result<T>;
