//! Command-line front-end of trackunc

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use std::{path::PathBuf, time::Instant};
use tracing::info;
use trackunc::{
    config::{ExtractionConfiguration, ToyConfiguration},
    output,
    phasespace::PhaseSpaceDecayer,
    propagate::SpeciesTables,
    sample,
    systematics::TrackingSystematicExtractor,
    tables::PionProtonTables,
    toymc::ToyMcDriver,
    Result,
};

#[derive(Parser)]
#[command(name = "trackunc")]
#[command(about = "Tracking systematic uncertainties of charm hadron decays")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract single-track uncertainties from data and simulation samples
    Extract {
        /// Configuration file
        config: PathBuf,
    },

    /// Propagate single-track uncertainties to decays with a toy Monte Carlo
    Toymc {
        /// Configuration file
        config: PathBuf,
    },
}

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Extract { config } => extract(config),
        Commands::Toymc { config } => toymc(config),
    }
}

/// Extract single-track uncertainties
fn extract(config_path: PathBuf) -> Result<()> {
    let cfg = ExtractionConfiguration::load(&config_path)
        .wrap_err("Failed to load the configuration")?;

    // Start the clock after configuration I/O
    let saved_time = Instant::now();

    let data_tracks = sample::load_tracks(&cfg.data_path, cfg.run.data_directory())?;
    let mc_tracks = sample::load_tracks(&cfg.mc_path, cfg.run.mc_directory())?;
    let extractor = TrackingSystematicExtractor::new(cfg.settings)?;
    let results = extractor.extract(&data_tracks, &mc_tracks)?;

    let elapsed_time = saved_time.elapsed();
    info!("Extraction took {:?}", elapsed_time);
    output::dump_extraction(&cfg, &results, elapsed_time)
        .wrap_err("Failed to output the results")?;
    Ok(())
}

/// Run the toy Monte Carlo
fn toymc(config_path: PathBuf) -> Result<()> {
    let cfg =
        ToyConfiguration::load(&config_path).wrap_err("Failed to load the configuration")?;

    // Load the single-track uncertainties
    let tables = SpeciesTables::new(
        PionProtonTables::matching(&cfg.run)?,
        PionProtonTables::tpc(&cfg.tpc_table_dir, &cfg.run)?,
    );

    // Start the clock after configuration I/O
    let saved_time = Instant::now();

    let driver = ToyMcDriver::new(
        cfg.channel,
        cfg.pt_shape,
        cfg.fiducial,
        tables,
        cfg.proton_tpc,
        PhaseSpaceDecayer::for_channel(cfg.channel)?,
    )?;
    let accumulator = driver.run(cfg.num_trials, cfg.seed);
    info!(
        "{} out of {} trials were used",
        accumulator.accepted(),
        accumulator.trials()
    );
    let results = accumulator.finalize();

    let elapsed_time = saved_time.elapsed();
    output::dump_toy_results(&cfg, &results, elapsed_time)
        .wrap_err("Failed to output the results")?;
    Ok(())
}
