//! Data taking periods and collision systems which samples come from

use crate::{
    config::{option_name, parse_option, UnknownOption},
    Result,
};
use eyre::ensure;
use std::{fmt, str::FromStr};

/// Collision system and centrality class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Centrality {
    /// Pb-Pb, 0-10%
    Central,
    /// Pb-Pb, 30-50%
    SemiCentral,
    /// pp at 5 TeV
    Pp,
    /// p-Pb at 5 TeV
    PPb,
}
//
impl Centrality {
    const CHOICES: [(&'static str, Self); 4] = [
        ("central", Self::Central),
        ("semicentral", Self::SemiCentral),
        ("pp", Self::Pp),
        ("ppb", Self::PPb),
    ];

    /// Truth that this is a Pb-Pb centrality class
    pub fn is_lead_lead(self) -> bool {
        matches!(self, Self::Central | Self::SemiCentral)
    }
}
//
impl FromStr for Centrality {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("centrality", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Data taking period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dataset {
    /// Pb-Pb, 2018 second period
    Lhc18r,
    /// Pb-Pb, 2018 first period
    Lhc18q,
    /// LHC18q and LHC18r merged
    Lhc18qr,
    /// pp at 5 TeV, 2017
    Lhc17pq,
    /// p-Pb at 5 TeV, 2016
    Lhc16qt,
}
//
impl Dataset {
    const CHOICES: [(&'static str, Self); 5] = [
        ("18r", Self::Lhc18r),
        ("18q", Self::Lhc18q),
        ("18qr", Self::Lhc18qr),
        ("17pq", Self::Lhc17pq),
        ("16qt", Self::Lhc16qt),
    ];

    /// Human-readable period name
    pub fn description(self) -> &'static str {
        match self {
            Self::Lhc18r => "LHC18r",
            Self::Lhc18q => "LHC18q",
            Self::Lhc18qr => "LHC18q+LHC18r",
            Self::Lhc17pq => "LHC17pq",
            Self::Lhc16qt => "LHC16qt",
        }
    }
}
//
impl FromStr for Dataset {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("dataset", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Species-specific cut tuning which an extraction run is labelled with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeciesCutSet {
    /// Tuned for pions
    PionCuts,
    /// Tuned for protons
    ProtonCuts,
    /// Common tuning
    AllCuts,
}
//
impl SpeciesCutSet {
    const CHOICES: [(&'static str, Self); 3] = [
        ("pion", Self::PionCuts),
        ("proton", Self::ProtonCuts),
        ("all", Self::AllCuts),
    ];

    /// Suffix of the output file names
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::PionCuts => "_pionCuts",
            Self::ProtonCuts => "_protonCuts",
            Self::AllCuts => "",
        }
    }
}
//
impl FromStr for SpeciesCutSet {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("species cut set", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for SpeciesCutSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Combination of collision system and data taking period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSelection {
    /// Collision system and centrality class
    pub centrality: Centrality,

    /// Data taking period
    pub dataset: Dataset,
}
//
impl RunSelection {
    /// Check that a period was recorded with the requested collision system
    pub fn new(centrality: Centrality, dataset: Dataset) -> Result<Self> {
        let consistent = match centrality {
            _ if centrality.is_lead_lead() => matches!(
                dataset,
                Dataset::Lhc18r | Dataset::Lhc18q | Dataset::Lhc18qr
            ),
            Centrality::Pp => dataset == Dataset::Lhc17pq,
            Centrality::PPb => dataset == Dataset::Lhc16qt,
            Centrality::Central | Centrality::SemiCentral => {
                unreachable!("Pb-Pb centralities are handled by the is_lead_lead arm")
            }
        };
        ensure!(
            consistent,
            "Dataset {} was not recorded in {} collisions",
            dataset,
            centrality
        );
        Ok(Self {
            centrality,
            dataset,
        })
    }

    /// Name of the data sample directory
    pub fn data_directory(&self) -> &'static str {
        match self.centrality {
            Centrality::Central => "PWGHF_D2H_SystNsigmaPID_PbPb_010_kCentral_kINT7",
            Centrality::SemiCentral => "PWGHF_D2H_SystNsigmaPID_PbPb_3050_kSemiCentral_kINT7",
            Centrality::Pp => "PWGHF_D2H_SystNsigmaPID_ppMB_kINT7",
            Centrality::PPb => "PWGHF_D2H_SystNsigmaPID_pPb_kINT7",
        }
    }

    /// Name of the simulation sample directory
    pub fn mc_directory(&self) -> &'static str {
        match self.centrality {
            Centrality::Central => "PWGHF_D2H_SystNsigmaPID_PbPb_010_kMB",
            Centrality::SemiCentral => "PWGHF_D2H_SystNsigmaPID_PbPb_3050_kMB",
            Centrality::Pp | Centrality::PPb => self.data_directory(),
        }
    }

    /// Human-readable description of the selection
    pub fn description(&self) -> String {
        let system = match self.centrality {
            Centrality::Central => "0-10%",
            Centrality::SemiCentral => "30-50%",
            Centrality::Pp => "pp 5 TeV",
            Centrality::PPb => "pPb 5 TeV",
        };
        format!("{}, {}", system, self.dataset.description())
    }

    /// Suffix of the output file names
    pub fn file_suffix(&self) -> String {
        let centrality = match self.centrality {
            Centrality::Central => "_cent",
            Centrality::SemiCentral => "_semicent",
            Centrality::Pp | Centrality::PPb => "",
        };
        format!("{}_{}", centrality, self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_and_suffixes() {
        let run = RunSelection::new(Centrality::SemiCentral, Dataset::Lhc18r).unwrap();
        assert_eq!(run.data_directory(), "PWGHF_D2H_SystNsigmaPID_PbPb_3050_kSemiCentral_kINT7");
        assert_eq!(run.mc_directory(), "PWGHF_D2H_SystNsigmaPID_PbPb_3050_kMB");
        assert_eq!(run.file_suffix(), "_semicent_18r");
        assert_eq!(run.description(), "30-50%, LHC18r");

        let pp = RunSelection::new(Centrality::Pp, Dataset::Lhc17pq).unwrap();
        assert_eq!(pp.mc_directory(), pp.data_directory());
        assert_eq!(pp.file_suffix(), "_17pq");
    }

    #[test]
    fn inconsistent_selections_are_rejected() {
        assert!(RunSelection::new(Centrality::Pp, Dataset::Lhc18r).is_err());
        assert!(RunSelection::new(Centrality::Central, Dataset::Lhc16qt).is_err());
    }

    #[test]
    fn options_parse_case_insensitively() {
        assert_eq!("SemiCentral".parse::<Centrality>().unwrap(), Centrality::SemiCentral);
        assert_eq!("18qr".parse::<Dataset>().unwrap(), Dataset::Lhc18qr);
        let err = "18x".parse::<Dataset>().unwrap_err().to_string();
        assert!(err.contains("18x") && err.contains("16qt"), "{}", err);
    }
}
