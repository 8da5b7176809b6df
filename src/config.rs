//! Mechanism for loading the configuration of extraction and toy runs

use crate::{
    classify::{FiducialAcceptance, FiducialPolicy},
    dataset::{Centrality, Dataset, RunSelection, SpeciesCutSet},
    decay::DecayChannel,
    numeric::Float,
    propagate::ProtonTpcSource,
    spectrum::PtShape,
    systematics::ExtractionSettings,
    Result,
};
use eyre::{ensure, eyre, WrapErr};
use std::{fs, path::Path, path::PathBuf, str::FromStr};

/// Error emitted when an enumerated option does not have a known value
#[derive(Debug, thiserror::Error)]
#[error("Unknown {kind} \"{value}\", expected one of: {expected}")]
pub struct UnknownOption {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Parse an enumerated option from a table of (name, value) choices
///
/// Names are matched case-insensitively.
///
pub fn parse_option<T: Copy>(
    kind: &'static str,
    value: &str,
    choices: &[(&'static str, T)],
) -> std::result::Result<T, UnknownOption> {
    choices
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|&(_, choice)| choice)
        .ok_or_else(|| UnknownOption {
            kind,
            value: value.to_owned(),
            expected: choices
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Name of an enumerated option value in a table of (name, value) choices
pub fn option_name<T: PartialEq>(value: &T, choices: &[(&'static str, T)]) -> &'static str {
    choices
        .iter()
        .find(|(_, choice)| choice == value)
        .map_or("<unnamed>", |(name, _)| *name)
}

/// Configuration of a tracking systematic extraction
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionConfiguration {
    /// Track sample recorded by the detector
    pub data_path: PathBuf,

    /// Track sample from the detector simulation
    pub mc_path: PathBuf,

    /// Collision system and data taking period
    pub run: RunSelection,

    /// Cut tuning which the output is labelled with
    pub species_cuts: SpeciesCutSet,

    /// Track selection knobs
    pub settings: ExtractionSettings,

    /// Where output files are written
    pub output_dir: PathBuf,
}
//
impl ExtractionConfiguration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = read_config_file(path)?;
        let mut items = ConfigItems::new(&config_str);

        let data_path = items.next_item("data_path")?.parse::<PathBuf>()?;
        let mc_path = items.next_item("mc_path")?.parse::<PathBuf>()?;
        let centrality = items.next_item("centrality")?.parse::<Centrality>()?;
        let dataset = items.next_item("dataset")?.parse::<Dataset>()?;
        let species_cuts = items.next_item("species_cuts")?.parse::<SpeciesCutSet>()?;
        let pid_gate_enabled = items.next_item("pid_gate_enabled")?.parse_bool()?;
        let pid_gate = items.next_item("pid_gate")?.parse::<Float>()?;
        let proton_min_pt = items.next_item("proton_min_pt")?.parse::<Float>()?;
        let output_dir = items.next_item("output_dir")?.parse::<PathBuf>()?;

        let config = Self {
            data_path,
            mc_path,
            run: RunSelection::new(centrality, dataset)?,
            species_cuts,
            settings: ExtractionSettings {
                pid_gate: pid_gate_enabled.then_some(pid_gate),
                proton_min_pt,
            },
            output_dir,
        };
        config.print();

        ensure!(pid_gate > 0., "The PID gate must be positive");
        ensure!(
            proton_min_pt >= 0.,
            "The proton pT threshold must not be negative"
        );
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("DATA SAMPLE     : {}", self.data_path.display());
        println!("MC SAMPLE       : {}", self.mc_path.display());
        println!("CENTRALITY      : {}", self.run.centrality);
        println!("DATASET         : {}", self.run.dataset);
        println!("SPECIES CUTS    : {}", self.species_cuts);
        match self.settings.pid_gate {
            Some(gate) => println!("PID GATE        : {}", gate),
            None => println!("PID GATE        : disabled"),
        }
        println!("PROTON MIN PT   : {}", self.settings.proton_min_pt);
        println!("OUTPUT DIR      : {}", self.output_dir.display());
    }

    /// Name of the output files, without extension
    pub fn output_stem(&self) -> String {
        format!(
            "TrackingTPCCutUnc{}{}{}",
            self.run.file_suffix(),
            self.species_cuts.file_suffix(),
            if self.settings.pid_gate.is_some() {
                "_3sigmaTPC"
            } else {
                ""
            }
        )
    }
}

/// Configuration of a toy Monte Carlo run
#[derive(Clone, Debug, PartialEq)]
pub struct ToyConfiguration {
    /// Number of decays to be simulated
    pub num_trials: usize,

    /// Decay channel under study
    pub channel: DecayChannel,

    /// Rapidity range in which generated parents are counted
    pub fiducial: FiducialAcceptance,

    /// Transverse momentum spectrum of generated parents
    pub pt_shape: PtShape,

    /// Collision system and data taking period of the uncertainty tables
    pub run: RunSelection,

    /// Where the proton TPC uncertainty comes from
    pub proton_tpc: ProtonTpcSource,

    /// Directory holding the TPC uncertainty tables
    pub tpc_table_dir: PathBuf,

    /// Where output files are written
    pub output_dir: PathBuf,

    /// Seed of the random number generator
    pub seed: u64,
}
//
impl ToyConfiguration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = read_config_file(path)?;
        let mut items = ConfigItems::new(&config_str);

        let num_trials = items.next_item("num_trials")?.parse::<usize>()?;
        let channel = items.next_item("channel")?.parse::<DecayChannel>()?;
        let policy = items.next_item("fiducial_policy")?.parse::<FiducialPolicy>()?;
        let y_max = items.next_item("fiducial_y_max")?.parse::<Float>()?;
        let pt_shape = items.next_item("pt_shape")?.parse::<PtShape>()?;
        let dataset = items.next_item("dataset")?.parse::<Dataset>()?;
        let centrality = items.next_item("centrality")?.parse::<Centrality>()?;
        let proton_tpc = items.next_item("proton_tpc")?.parse::<ProtonTpcSource>()?;
        let tpc_table_dir = items.next_item("tpc_table_dir")?.parse::<PathBuf>()?;
        let output_dir = items.next_item("output_dir")?.parse::<PathBuf>()?;
        let seed = items.next_item("seed")?.parse::<u64>()?;

        let config = Self {
            num_trials,
            channel,
            fiducial: FiducialAcceptance { policy, y_max },
            pt_shape,
            run: RunSelection::new(centrality, dataset)?,
            proton_tpc,
            tpc_table_dir,
            output_dir,
            seed,
        };
        config.print();

        ensure!(config.num_trials > 0, "Please simulate at least one trial");
        ensure!(y_max > 0., "The fiducial rapidity cut must be positive");
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("TRIALS          : {}", self.num_trials);
        println!("CHANNEL         : {}", self.channel);
        println!("FIDUCIAL POLICY : {}", self.fiducial.policy);
        println!("FIDUCIAL Y MAX  : {}", self.fiducial.y_max);
        println!("PT SHAPE        : {}", self.pt_shape);
        println!("DATASET         : {}", self.run.dataset);
        println!("CENTRALITY      : {}", self.run.centrality);
        println!("PROTON TPC      : {}", self.proton_tpc);
        println!("TPC TABLE DIR   : {}", self.tpc_table_dir.display());
        println!("OUTPUT DIR      : {}", self.output_dir.display());
        println!("SEED            : {}", self.seed);
    }
}

/// Read out a configuration file or die trying
fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .wrap_err_with(|| format!("Could not read configuration file {}", path.display()))
}

/// Iterator over the items of a configuration file
///
/// Items are the first non-whitespace chunk of text on each line, the rest of
/// the line being free-form commentary. Blank lines are ignored.
///
struct ConfigItems<'data> {
    items: Box<dyn Iterator<Item = &'data str> + 'data>,
}
//
impl<'data> ConfigItems<'data> {
    /// Start iterating over the items of a configuration file
    fn new(config_str: &'data str) -> Self {
        Self {
            items: Box::new(
                config_str
                    .lines()
                    .filter_map(|line| line.split_whitespace().next()),
            ),
        }
    }

    /// Fetch the next item, tagging it with the name of the field which it is
    /// supposed to fill
    fn next_item(&mut self, name: &'static str) -> Result<ConfigItem<'data>> {
        self.items
            .next()
            .map(|data| ConfigItem::new(name, data))
            .ok_or_else(|| eyre!("Missing configuration of {}", name))
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data as a boolean, also accepting Fortran's syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            ".true." => Ok(true),
            ".false." => Ok(false),
            _ => self.parse::<bool>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trackunc_{}_{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn options_list_their_choices() {
        let choices = [("one", 1), ("two", 2)];
        assert_eq!(parse_option("number", "TWO", &choices).unwrap(), 2);
        assert_eq!(option_name(&1, &choices), "one");
        let err = parse_option("number", "three", &choices).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown number \"three\", expected one of: one, two"
        );
    }

    #[test]
    fn extraction_configuration() {
        let path = write_config(
            "extraction",
            "data.json          Data sample\n\
             mc.json            MC sample\n\
             \n\
             semicentral        Centrality\n\
             18r                Dataset\n\
             proton             Species cuts\n\
             .TRUE.             Enable PID gate\n\
             300                PID gate\n\
             0.4                Proton min pT\n\
             out                Output directory\n",
        );
        let config = ExtractionConfiguration::load(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data.json"));
        assert_eq!(config.run.centrality, Centrality::SemiCentral);
        assert_eq!(config.settings.pid_gate, Some(300.));
        assert_eq!(config.settings.proton_min_pt, 0.4);
        assert_eq!(
            config.output_stem(),
            "TrackingTPCCutUnc_semicent_18r_protonCuts_3sigmaTPC"
        );
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn toy_configuration() {
        let path = write_config(
            "toy",
            "1000    Trials\nLcK0Sp  Channel\nptdep   Fiducial policy\n0.8     y max\n\
             flat    pT shape\n18q     Dataset\ncentral Centrality\nfit     Proton TPC\n\
             tables  Table dir\nout     Output dir\n42      Seed\n",
        );
        let config = ToyConfiguration::load(&path).unwrap();
        assert_eq!(config.num_trials, 1000);
        assert_eq!(config.channel, DecayChannel::LcK0Sp);
        assert_eq!(config.fiducial.policy, FiducialPolicy::PtDependent);
        assert_eq!(config.pt_shape, PtShape::Flat);
        assert_eq!(config.proton_tpc, ProtonTpcSource::Fit);
        assert_eq!(config.seed, 42);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn bad_configurations() {
        let truncated = write_config("truncated", "1000\nD0Kpi\n");
        let err = ToyConfiguration::load(&truncated).unwrap_err();
        assert!(format!("{:?}", err).contains("fiducial_policy"));
        fs::remove_file(truncated).unwrap();

        let unknown = write_config(
            "unknown",
            "10\nBplusD0pi\nfixed\n0.8\nflat\n18r\ncentral\nhistogram\nt\no\n1\n",
        );
        let err = ToyConfiguration::load(&unknown).unwrap_err();
        assert!(format!("{:?}", err).contains("BplusD0pi"));
        fs::remove_file(unknown).unwrap();
    }
}
