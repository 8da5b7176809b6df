//! Decay channels, decay generators and the decay trees they produce

use crate::{
    config::{option_name, parse_option, UnknownOption},
    momentum::Momentum,
    random::RandomGenerator,
    species::Species,
};
use std::{fmt, str::FromStr};

/// Particle produced by a decay generator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratedParticle {
    /// Signed PDG Monte Carlo code
    pub pdg: i32,

    /// Laboratory 4-momentum
    pub momentum: Momentum,
}
//
impl GeneratedParticle {
    /// Species of the particle
    pub fn species(&self) -> Species {
        Species::from_pdg(self.pdg)
    }
}

/// Something which can decay a parent particle into daughters
///
/// The output is a flat list in which entry 0 is the parent itself. Each K0S
/// in the list must be immediately followed by its two decay products.
/// Intermediate resonances may be listed alongside their decay products.
///
pub trait Decayer: Sync {
    /// Decay a parent particle of known 4-momentum
    fn decay(
        &self,
        parent_pdg: i32,
        momentum: &Momentum,
        rng: &mut RandomGenerator,
    ) -> Vec<GeneratedParticle>;
}

/// Node of a decay tree
#[derive(Clone, Debug, PartialEq)]
pub struct DecayNode {
    /// The particle itself
    pub particle: GeneratedParticle,

    /// Decay products which were attached to it, if any
    pub children: Vec<GeneratedParticle>,
}
//
impl DecayNode {
    /// Species of the particle
    pub fn species(&self) -> Species {
        self.particle.species()
    }
}

/// Outcome of a parent decay, with K0S decay products attached to the K0S
#[derive(Clone, Debug, PartialEq)]
pub struct DecayTree {
    /// Decaying particle
    pub parent: GeneratedParticle,

    /// Decay products, in generator order
    pub daughters: Vec<DecayNode>,
}
//
impl DecayTree {
    /// Number of children attached to each K0S
    pub const K0S_CHILDREN: usize = 2;

    /// Build a decay tree from the flat output of a decay generator
    ///
    /// Returns None if there is not even a parent. A K0S near the end of the
    /// list gets fewer than two children, which later stages reject.
    ///
    pub fn from_flat(particles: &[GeneratedParticle]) -> Option<Self> {
        let (&parent, mut rest) = particles.split_first()?;
        let mut daughters = Vec::with_capacity(rest.len());
        while let Some((&particle, tail)) = rest.split_first() {
            let num_children = if particle.species() == Species::K0Short {
                Self::K0S_CHILDREN.min(tail.len())
            } else {
                0
            };
            let (children, tail) = tail.split_at(num_children);
            daughters.push(DecayNode {
                particle,
                children: children.to_vec(),
            });
            rest = tail;
        }
        Some(Self { parent, daughters })
    }

    /// Every particle of the tree except for the parent, in generator order
    pub fn descendants(&self) -> impl Iterator<Item = &GeneratedParticle> + '_ {
        self.daughters
            .iter()
            .flat_map(|node| std::iter::once(&node.particle).chain(&node.children))
    }
}

/// Number of daughters of each tracked species
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DaughterCounts {
    /// Charged pions
    pub pions: usize,
    /// Charged kaons
    pub kaons: usize,
    /// Protons
    pub protons: usize,
    /// K0S, whose decay pions are also counted as pions
    pub k0_shorts: usize,
}
//
impl DaughterCounts {
    /// Count one more daughter of some species, ignoring untracked species
    pub fn record(&mut self, species: Species) {
        match species {
            Species::Pion => self.pions += 1,
            Species::Kaon => self.kaons += 1,
            Species::Proton => self.protons += 1,
            Species::K0Short => self.k0_shorts += 1,
            _ => {}
        }
    }
}

/// Decay channel studied by the toy Monte Carlo
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayChannel {
    /// D0 → K- π+
    D0Kpi,
    /// D+ → K- π+ π+
    DplusKpipi,
    /// D*+ → D0 π+ → K- π+ π+
    DstarD0pi,
    /// Ds+ → K+ K- π+
    DsKKpi,
    /// Λc+ → p K- π+
    LcpKpi,
    /// Λc+ → p K0S → p π+ π-
    LcK0Sp,
    /// D+ → K+ K- π+
    DplusKKpi,
}
//
impl DecayChannel {
    const CHOICES: [(&'static str, Self); 7] = [
        ("D0Kpi", Self::D0Kpi),
        ("DplusKpipi", Self::DplusKpipi),
        ("DStarD0pi", Self::DstarD0pi),
        ("DsKKpi", Self::DsKKpi),
        ("LcpKpi", Self::LcpKpi),
        ("LcK0Sp", Self::LcK0Sp),
        ("DplusKKpi", Self::DplusKKpi),
    ];

    /// Species of the parent
    pub fn parent_species(self) -> Species {
        match self {
            Self::D0Kpi => Species::D0,
            Self::DplusKpipi | Self::DplusKKpi => Species::DPlus,
            Self::DstarD0pi => Species::DStarPlus,
            Self::DsKKpi => Species::DsPlus,
            Self::LcpKpi | Self::LcK0Sp => Species::LambdaC,
        }
    }

    /// PDG code of the (particle) parent
    pub fn parent_pdg(self) -> i32 {
        self.parent_species().pdg() as i32
    }

    /// Tracked daughters of a decay in this channel, K0S decay products
    /// included
    pub fn expected_daughters(self) -> DaughterCounts {
        let (pions, kaons, protons, k0_shorts) = match self {
            Self::D0Kpi => (1, 1, 0, 0),
            Self::DplusKpipi | Self::DstarD0pi => (2, 1, 0, 0),
            Self::DsKKpi | Self::DplusKKpi => (1, 2, 0, 0),
            Self::LcpKpi => (1, 1, 1, 0),
            Self::LcK0Sp => (2, 0, 1, 1),
        };
        DaughterCounts {
            pions,
            kaons,
            protons,
            k0_shorts,
        }
    }

    /// Truth that a decay has the topology expected from this channel
    ///
    /// This only screens out generator outputs which went through another
    /// decay mode, the daughter-level checks come later.
    ///
    pub fn has_expected_topology(self, tree: &DecayTree, num_generated: usize) -> bool {
        match self {
            Self::D0Kpi => tree.daughters.len() == 2,
            Self::LcK0Sp => num_generated <= 6,
            _ => true,
        }
    }
}
//
impl FromStr for DecayChannel {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("decay channel", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for DecayChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(pdg: i32) -> GeneratedParticle {
        GeneratedParticle {
            pdg,
            momentum: Momentum::zeros(),
        }
    }

    #[test]
    fn k0s_adopts_the_two_following_entries() {
        let flat = [4122, 2212, 310, 211, -211].map(particle);
        let tree = DecayTree::from_flat(&flat).unwrap();
        assert_eq!(tree.parent.pdg, 4122);
        assert_eq!(tree.daughters.len(), 2);
        assert!(tree.daughters[0].children.is_empty());
        assert_eq!(tree.daughters[1].species(), Species::K0Short);
        let children = tree.daughters[1].children.iter().map(|c| c.pdg).collect::<Vec<_>>();
        assert_eq!(children, [211, -211]);
        assert_eq!(tree.descendants().count(), 4);
    }

    #[test]
    fn truncated_k0s_decays_keep_what_is_there() {
        let tree = DecayTree::from_flat(&[4122, 2212, 310, 211].map(particle)).unwrap();
        assert_eq!(tree.daughters[1].children.len(), 1);
        assert!(DecayTree::from_flat(&[]).is_none());
    }

    #[test]
    fn channel_names_round_trip() {
        for (name, channel) in DecayChannel::CHOICES {
            assert_eq!(name.parse::<DecayChannel>().unwrap(), channel);
            assert_eq!(channel.to_string(), name);
        }
        assert!("LcpK0S".parse::<DecayChannel>().is_err());
    }

    #[test]
    fn parents() {
        assert_eq!(DecayChannel::DstarD0pi.parent_pdg(), 413);
        assert_eq!(DecayChannel::DplusKKpi.parent_pdg(), 411);
        assert_eq!(DecayChannel::LcK0Sp.parent_pdg(), 4122);
        assert_eq!(DecayChannel::DsKKpi.parent_species(), Species::DsPlus);
    }
}
