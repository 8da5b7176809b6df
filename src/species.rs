//! Particle species known to the program

use crate::numeric::Float;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Particle species, irrespective of charge sign
///
/// Species are identified by the absolute value of their PDG Monte Carlo code.
/// Codes which the program does not need to tell apart are kept verbatim.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    // ### LONG-LIVED HADRONS ###
    /// π±
    Pion,
    /// K±
    Kaon,
    /// p
    Proton,
    /// K0S
    K0Short,
    /// K0L
    K0Long,

    // ### STRONGLY DECAYING RESONANCES ###
    /// K*(892)0
    KStar0,
    /// Δ(1232)++
    DeltaPlusPlus,
    /// Λ(1520)
    Lambda1520,

    // ### CHARM HADRONS ###
    /// D0
    D0,
    /// D+
    DPlus,
    /// D*(2010)+
    DStarPlus,
    /// Ds+
    DsPlus,
    /// Λc+
    LambdaC,

    /// Any other particle, with its absolute PDG code
    Other(u32),
}
//
impl Species {
    /// Identify the species of a (signed) PDG code
    pub fn from_pdg(code: i32) -> Self {
        match code.unsigned_abs() {
            211 => Self::Pion,
            321 => Self::Kaon,
            2212 => Self::Proton,
            310 => Self::K0Short,
            130 => Self::K0Long,
            313 => Self::KStar0,
            2224 => Self::DeltaPlusPlus,
            3124 => Self::Lambda1520,
            421 => Self::D0,
            411 => Self::DPlus,
            413 => Self::DStarPlus,
            431 => Self::DsPlus,
            4122 => Self::LambdaC,
            other => Self::Other(other),
        }
    }

    /// Absolute PDG code of the species
    pub fn pdg(self) -> u32 {
        match self {
            Self::Pion => 211,
            Self::Kaon => 321,
            Self::Proton => 2212,
            Self::K0Short => 310,
            Self::K0Long => 130,
            Self::KStar0 => 313,
            Self::DeltaPlusPlus => 2224,
            Self::Lambda1520 => 3124,
            Self::D0 => 421,
            Self::DPlus => 411,
            Self::DStarPlus => 413,
            Self::DsPlus => 431,
            Self::LambdaC => 4122,
            Self::Other(code) => code,
        }
    }

    /// Nominal mass (GeV/c²), for the species which the decayer produces
    pub fn mass(self) -> Option<Float> {
        match self {
            Self::Pion => Some(0.13957),
            Self::Kaon => Some(0.493677),
            Self::Proton => Some(0.938272),
            Self::K0Short | Self::K0Long => Some(0.497611),
            Self::KStar0 => Some(0.89555),
            Self::DeltaPlusPlus => Some(1.232),
            Self::Lambda1520 => Some(1.5195),
            Self::D0 => Some(1.86484),
            Self::DPlus => Some(1.86966),
            Self::DStarPlus => Some(2.01026),
            Self::DsPlus => Some(1.96835),
            Self::LambdaC => Some(2.28646),
            Self::Other(_) => None,
        }
    }

    /// Truth that the species is a charged hadron reaching the tracker
    pub fn is_stable_charged(self) -> bool {
        matches!(self, Self::Pion | Self::Kaon | Self::Proton)
    }
}
//
impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "PDG {}", code),
            known => write!(f, "{:?}", known),
        }
    }
}

/// Species for which single-track uncertainties are tabulated
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrackSpecies {
    /// Identified pions
    Pion,
    /// Identified kaons
    Kaon,
    /// Identified protons
    Proton,
    /// Any track with a TOF PID score
    Charged,
}
//
impl TrackSpecies {
    /// All tabulated species, in output order
    pub const ALL: [TrackSpecies; 4] = [Self::Pion, Self::Kaon, Self::Proton, Self::Charged];

    /// Name used in table keys
    pub fn name(self) -> &'static str {
        match self {
            Self::Pion => "pion",
            Self::Kaon => "kaon",
            Self::Proton => "proton",
            Self::Charged => "charged",
        }
    }

    /// Key of the single-track uncertainty table of this species
    pub fn uncertainty_key(self) -> String {
        format!("hunc_{}", self.name())
    }
}
