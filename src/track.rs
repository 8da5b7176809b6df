//! Identified track records, as produced by the upstream PID-tree skimming

use crate::{numeric::Float, Result};
use eyre::ensure;
use std::{fmt, ops::BitOr};

/// Set of identification tags attached to a track
///
/// Each tag records one way by which the track species was identified
/// (topological V0 reconstruction, TOF, ...). Unknown bits are rejected at
/// construction, so a TrackTags value always only holds meaningful tags.
///
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TrackTags(u32);
//
impl TrackTags {
    // ### TOPOLOGICAL IDENTIFICATION ###

    /// Pion from a K0S V0
    pub const PION_FROM_K0S: Self = Self(1 << 0);
    /// Pion from a Λ V0
    pub const PION_FROM_LAMBDA: Self = Self(1 << 1);
    /// Proton from a Λ V0
    pub const PROTON_FROM_LAMBDA: Self = Self(1 << 2);
    /// Electron from a photon conversion
    pub const ELECTRON_FROM_GAMMA: Self = Self(1 << 3);
    /// Kaon from a kink topology
    pub const KAON_FROM_KINKS: Self = Self(1 << 4);
    /// Kaon from an Ω cascade
    pub const KAON_FROM_OMEGA: Self = Self(1 << 16);

    // ### DETECTOR IDENTIFICATION ###

    /// Kaon identified by the TOF
    pub const KAON_FROM_TOF: Self = Self(1 << 5);
    /// Kaon identified by the TPC
    pub const KAON_FROM_TPC: Self = Self(1 << 6);
    /// Kaon identified by the HMPID
    pub const KAON_FROM_HMPID: Self = Self(1 << 7);
    /// Deuteron identified by the TPC and TOF
    pub const DEUTERON_FROM_TPC_TOF: Self = Self(1 << 8);
    /// Triton identified by the TPC and TOF
    pub const TRITON_FROM_TPC_TOF: Self = Self(1 << 9);
    /// Helium-3 identified by the TPC and TOF
    pub const HE3_FROM_TPC_TOF: Self = Self(1 << 10);
    /// Pion identified by the TOF
    pub const PION_FROM_TOF: Self = Self(1 << 17);
    /// Proton identified by the TOF
    pub const PROTON_FROM_TOF: Self = Self(1 << 18);

    // ### CHARGE ###

    /// Positively charged track
    pub const POSITIVE_TRACK: Self = Self(1 << 14);
    /// Negatively charged track
    pub const NEGATIVE_TRACK: Self = Self(1 << 15);

    /// Every tag known to this program, with its name
    const NAMED: [(&'static str, Self); 16] = [
        ("PionFromK0s", Self::PION_FROM_K0S),
        ("PionFromL", Self::PION_FROM_LAMBDA),
        ("ProtonFromL", Self::PROTON_FROM_LAMBDA),
        ("ElectronFromGamma", Self::ELECTRON_FROM_GAMMA),
        ("KaonFromKinks", Self::KAON_FROM_KINKS),
        ("KaonFromTOF", Self::KAON_FROM_TOF),
        ("KaonFromTPC", Self::KAON_FROM_TPC),
        ("KaonFromHMPID", Self::KAON_FROM_HMPID),
        ("DeuteronFromTPCTOF", Self::DEUTERON_FROM_TPC_TOF),
        ("TritonFromTPCTOF", Self::TRITON_FROM_TPC_TOF),
        ("He3FromTPCTOF", Self::HE3_FROM_TPC_TOF),
        ("PositiveTrack", Self::POSITIVE_TRACK),
        ("NegativeTrack", Self::NEGATIVE_TRACK),
        ("KaonFromOmega", Self::KAON_FROM_OMEGA),
        ("PionFromTOF", Self::PION_FROM_TOF),
        ("ProtonFromTOF", Self::PROTON_FROM_TOF),
    ];

    /// Empty tag set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Decode a raw tag word, rejecting bits which carry no known meaning
    pub fn from_bits(bits: u32) -> Result<Self> {
        let known = Self::NAMED.iter().fold(0, |acc, (_, tag)| acc | tag.0);
        ensure!(
            bits & !known == 0,
            "Track tag word {:#x} has unknown bits {:#x}",
            bits,
            bits & !known
        );
        Ok(Self(bits))
    }

    /// Raw tag word
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Truth that this set shares at least one tag with `other`
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Truth that this set holds every tag of `other`
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}
//
impl BitOr for TrackTags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
//
impl fmt::Debug for TrackTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(
                Self::NAMED
                    .iter()
                    .filter(|(_, tag)| self.contains(*tag))
                    .map(|(name, _)| name),
            )
            .finish()
    }
}

/// TPC cluster counts of a track
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClusterCounts {
    /// Number of TPC clusters
    pub total: Float,

    /// Number of TPC clusters usable for PID
    pub pid: Float,

    /// Number of crossed TPC pad rows
    pub crossed_rows: Float,

    /// Number of findable TPC clusters
    pub findable: Float,
}

/// PID deviation scores, in the raw units stored in the track trees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NSigma {
    /// TPC, pion hypothesis
    pub tpc_pion: Float,
    /// TPC, kaon hypothesis
    pub tpc_kaon: Float,
    /// TPC, proton hypothesis
    pub tpc_proton: Float,
    /// TOF, pion hypothesis
    pub tof_pion: Float,
    /// TOF, kaon hypothesis
    pub tof_kaon: Float,
    /// TOF, proton hypothesis
    pub tof_proton: Float,
}

/// Identified track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track {
    /// Transverse momentum (GeV/c)
    pub pt: Float,

    /// TPC cluster counts
    pub clusters: ClusterCounts,

    /// Identification tags
    pub tags: TrackTags,

    /// PID deviation scores
    pub n_sigma: NSigma,
}
//
impl Track {
    /// Truth that the track can be used at all
    ///
    /// Tracks with vanishing momentum or no findable cluster would make the
    /// cut variables ill-defined.
    ///
    pub fn is_usable(&self) -> bool {
        self.pt >= 1e-5 && self.clusters.findable >= 1.
    }
}
