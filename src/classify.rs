//! Classification of decay daughters and acceptance checks

use crate::{
    config::{option_name, parse_option, UnknownOption},
    decay::{DaughterCounts, DecayTree, GeneratedParticle},
    momentum::{self, Momentum},
    numeric::Float,
    species::Species,
};
use prefix_num_ops::real::*;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Minimal transverse momentum of a daughter track (GeV/c)
pub const MIN_DAUGHTER_PT: Float = 0.5;

/// Tolerance on each component of the daughter momentum sum (GeV/c)
pub const MOMENTUM_TOLERANCE: Float = 0.001;

/// Reason why a toy Monte Carlo trial is not used
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rejection {
    /// The decay generator produced nothing
    EmptyDecay,

    /// The generator went through a decay mode of another topology
    UnexpectedTopology,

    /// A K0 came out as a K0L, which is not reconstructed
    LongLivedNeutralKaon,

    /// A K0S is not followed by its two decay products
    IncompleteK0sDecay { children: usize },

    /// A K0S decay product is not a pion
    UnexpectedK0sChild(Species),

    /// A daughter track is too soft to be reconstructed
    SoftDaughter { species: Species, pt: Float },

    /// Daughter momenta do not add up to the parent momentum
    MomentumNotConserved { worst_deviation: Float },

    /// The decay does not have the daughters of the studied channel
    WrongMultiplicity {
        found: DaughterCounts,
        expected: DaughterCounts,
    },
}
//
impl Rejection {
    /// Short name of the rejection reason, for bookkeeping
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyDecay => "empty decay",
            Self::UnexpectedTopology => "unexpected topology",
            Self::LongLivedNeutralKaon => "K0L daughter",
            Self::IncompleteK0sDecay { .. } => "incomplete K0S decay",
            Self::UnexpectedK0sChild(_) => "K0S not decaying to pions",
            Self::SoftDaughter { .. } => "soft daughter",
            Self::MomentumNotConserved { .. } => "momentum conservation violation",
            Self::WrongMultiplicity { .. } => "wrong decay products",
        }
    }
}
//
impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteK0sDecay { children } => {
                write!(f, "K0S has {} decay products instead of 2", children)
            }
            Self::UnexpectedK0sChild(species) => write!(f, "K0S decays to {}", species),
            Self::SoftDaughter { species, pt } => {
                write!(f, "{} daughter has pT = {} GeV/c", species, pt)
            }
            Self::MomentumNotConserved { worst_deviation } => write!(
                f,
                "daughter momenta miss the parent momentum by {} GeV/c",
                worst_deviation
            ),
            Self::WrongMultiplicity { found, expected } => {
                write!(f, "found {:?}, expected {:?}", found, expected)
            }
            other => f.write_str(other.kind()),
        }
    }
}

/// Intermediate resonance of the Λc → p K- π+ decay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ResonantChannel {
    /// Direct three-body decay
    #[default]
    NonResonant,
    /// Λc → Λ(1520) π+
    Lambda1520,
    /// Λc → p K*0
    KStar0,
    /// Λc → Δ++ K-
    DeltaPlusPlus,
}
//
impl ResonantChannel {
    /// Conventional numerical identifier of the channel
    pub fn id(self) -> u8 {
        match self {
            Self::NonResonant => 0,
            Self::Lambda1520 => 1,
            Self::KStar0 => 2,
            Self::DeltaPlusPlus => 3,
        }
    }
}

/// Geometrical acceptance of daughter tracks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaughterAcceptance {
    /// Maximal |pseudorapidity|
    pub max_eta: Float,

    /// Minimal transverse momentum (GeV/c)
    pub min_pt: Float,
}
//
impl DaughterAcceptance {
    /// Truth that a daughter is within acceptance (strict bounds)
    pub fn contains(&self, momentum: &Momentum) -> bool {
        abs(momentum::pseudorapidity(momentum)) < self.max_eta
            && momentum::pt(momentum) > self.min_pt
    }
}
//
impl Default for DaughterAcceptance {
    fn default() -> Self {
        Self {
            max_eta: 0.9,
            min_pt: 0.1,
        }
    }
}

/// Outcome of the classification of a decay
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Classification {
    /// Tracked daughters, K0S decay products included
    pub counts: DaughterCounts,

    /// Tracked daughters within the daughter acceptance
    pub in_acceptance: DaughterCounts,

    /// Intermediate resonance, if any
    pub resonant_channel: ResonantChannel,

    /// Why the decay cannot be used, if that is the case
    pub inconsistency: Option<Rejection>,
}
//
impl Classification {
    /// Truth that the decay can be used
    pub fn is_consistent(&self) -> bool {
        self.inconsistency.is_none()
    }
}

/// Classifier of the daughters of a decay
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecayDaughterClassifier {
    /// Acceptance used to count daughters "in acceptance"
    pub acceptance: DaughterAcceptance,
}
//
impl DecayDaughterClassifier {
    /// Set up a classifier
    pub fn new(acceptance: DaughterAcceptance) -> Self {
        Self { acceptance }
    }

    /// Classify the daughters of a decay
    ///
    /// Classification stops at the first inconsistency, so counts are only
    /// complete for consistent decays.
    ///
    pub fn classify(&self, tree: &DecayTree) -> Classification {
        let mut result = Classification {
            resonant_channel: Self::resonant_channel(tree),
            ..Classification::default()
        };
        if let Err(rejection) = self.count_daughters(tree, &mut result) {
            result.inconsistency = Some(rejection);
        }
        result
    }

    /// Identify the intermediate resonance, K*0 taking precedence over Δ++
    /// which takes precedence over Λ(1520)
    fn resonant_channel(tree: &DecayTree) -> ResonantChannel {
        let has = |species| tree.descendants().any(|p| p.species() == species);
        if has(Species::KStar0) {
            ResonantChannel::KStar0
        } else if has(Species::DeltaPlusPlus) {
            ResonantChannel::DeltaPlusPlus
        } else if has(Species::Lambda1520) {
            ResonantChannel::Lambda1520
        } else {
            ResonantChannel::NonResonant
        }
    }

    /// Count tracked daughters and check momentum conservation
    fn count_daughters(
        &self,
        tree: &DecayTree,
        result: &mut Classification,
    ) -> Result<(), Rejection> {
        if tree.descendants().any(|p| p.species() == Species::K0Long) {
            return Err(Rejection::LongLivedNeutralKaon);
        }

        let tracked = TrackedDaughters::walk(tree)?;
        let mut sum = Momentum::zeros();
        for daughter in &tracked.daughters {
            if self.acceptance.contains(&daughter.particle.momentum) {
                result.in_acceptance.record(daughter.particle.species());
            }
            sum += daughter.particle.momentum;
        }
        result.counts = tracked.counts;

        let worst_deviation = (sum - tree.parent.momentum).amax();
        if worst_deviation > MOMENTUM_TOLERANCE {
            return Err(Rejection::MomentumNotConserved { worst_deviation });
        }
        Ok(())
    }
}

/// Tracked daughter track of a decay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedDaughter<'tree> {
    /// Generated particle
    pub particle: &'tree GeneratedParticle,

    /// Truth that the track comes from a K0S decay
    pub from_k0s: bool,
}

/// Tracked daughters of a decay, K0S decay products included
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedDaughters<'tree> {
    /// Daughter tracks, in decay order
    pub daughters: Vec<TrackedDaughter<'tree>>,

    /// Daughter tracks and K0S per species
    pub counts: DaughterCounts,
}
//
impl<'tree> TrackedDaughters<'tree> {
    /// Walk the daughters of a decay
    ///
    /// Fails on the first daughter track below `MIN_DAUGHTER_PT` and on K0S
    /// which did not decay into two pions.
    ///
    pub fn walk(tree: &'tree DecayTree) -> Result<Self, Rejection> {
        let mut result = Self {
            daughters: Vec::new(),
            counts: DaughterCounts::default(),
        };
        for node in &tree.daughters {
            let species = node.species();
            if species.is_stable_charged() {
                result.push(&node.particle, false)?;
            } else if species == Species::K0Short {
                check_k0s_children(&node.children)?;
                for child in &node.children {
                    result.push(child, true)?;
                }
                result.counts.record(species);
            }
        }
        Ok(result)
    }

    /// Record one daughter track
    fn push(&mut self, particle: &'tree GeneratedParticle, from_k0s: bool) -> Result<(), Rejection> {
        let species = particle.species();
        let pt = momentum::pt(&particle.momentum);
        if pt < MIN_DAUGHTER_PT {
            return Err(Rejection::SoftDaughter { species, pt });
        }
        self.counts.record(species);
        self.daughters.push(TrackedDaughter { particle, from_k0s });
        Ok(())
    }
}

/// Check that a K0S decayed into two pions
pub fn check_k0s_children(children: &[GeneratedParticle]) -> Result<(), Rejection> {
    if children.len() != DecayTree::K0S_CHILDREN {
        return Err(Rejection::IncompleteK0sDecay {
            children: children.len(),
        });
    }
    match children.iter().find(|child| child.species() != Species::Pion) {
        Some(child) => Err(Rejection::UnexpectedK0sChild(child.species())),
        None => Ok(()),
    }
}

/// Policy for the rapidity range in which parents are counted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FiducialPolicy {
    /// |y| below a fixed bound
    Fixed,

    /// |y| below a bound which grows with pT, up to 0.8 above 5 GeV/c
    PtDependent,
}
//
impl FiducialPolicy {
    const CHOICES: [(&'static str, Self); 2] = [("fixed", Self::Fixed), ("ptdep", Self::PtDependent)];
}
//
impl FromStr for FiducialPolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("fiducial policy", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for FiducialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Rapidity fiducial acceptance of parents
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiducialAcceptance {
    /// Policy in use
    pub policy: FiducialPolicy,

    /// Bound on |y| for the fixed policy
    pub y_max: Float,
}
//
impl FiducialAcceptance {
    /// Bound on |y| of the pT-dependent policy at high pT
    const HIGH_PT_Y_MAX: Float = 0.8;

    /// pT above which the pT-dependent policy uses a constant bound (GeV/c)
    const HIGH_PT_THRESHOLD: Float = 5.;

    /// Bound on |y| at some transverse momentum
    pub fn y_max_at(&self, pt: Float) -> Float {
        match self.policy {
            FiducialPolicy::Fixed => self.y_max,
            FiducialPolicy::PtDependent if pt > Self::HIGH_PT_THRESHOLD => Self::HIGH_PT_Y_MAX,
            FiducialPolicy::PtDependent => -0.2 / 15. * pt.powi(2) + 1.9 / 15. * pt + 0.5,
        }
    }

    /// Truth that a parent of given pT and rapidity is in the fiducial range
    pub fn is_in_fiducial_acceptance(&self, pt: Float, y: Float) -> bool {
        abs(y) <= self.y_max_at(pt)
    }
}
//
impl Default for FiducialAcceptance {
    fn default() -> Self {
        Self {
            policy: FiducialPolicy::Fixed,
            y_max: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::{from_pt_phi_y, from_xyz_mass};
    use nalgebra::Vector3;

    fn particle(pdg: i32, p: Vector3<Float>) -> GeneratedParticle {
        let mass = Species::from_pdg(pdg).mass().unwrap_or(0.);
        GeneratedParticle {
            pdg,
            momentum: from_xyz_mass(&p, mass),
        }
    }

    /// D0 → K- π+ with the parent built from the daughters
    fn d0_decay(kaon: Vector3<Float>, pion: Vector3<Float>) -> Vec<GeneratedParticle> {
        let k = particle(-321, kaon);
        let pi = particle(211, pion);
        let parent = GeneratedParticle {
            pdg: 421,
            momentum: k.momentum + pi.momentum,
        };
        vec![parent, k, pi]
    }

    #[test]
    fn conserving_decay_is_consistent() {
        let flat = d0_decay(Vector3::new(1., 0.2, 0.1), Vector3::new(0.1, 0.8, -0.3));
        let tree = DecayTree::from_flat(&flat).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert!(classification.is_consistent(), "{:?}", classification);
        assert_eq!(classification.counts.kaons, 1);
        assert_eq!(classification.counts.pions, 1);
        assert_eq!(classification.in_acceptance.pions, 1);
        assert_eq!(classification.resonant_channel, ResonantChannel::NonResonant);
    }

    #[test]
    fn momentum_violation_is_inconsistent() {
        let mut flat = d0_decay(Vector3::new(1., 0.2, 0.1), Vector3::new(0.1, 0.8, -0.3));
        flat[0].momentum[momentum::X] += 0.002;
        let tree = DecayTree::from_flat(&flat).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert!(matches!(
            classification.inconsistency,
            Some(Rejection::MomentumNotConserved { .. })
        ));
    }

    #[test]
    fn soft_daughters_short_circuit() {
        let flat = d0_decay(Vector3::new(0.3, 0.2, 0.1), Vector3::new(0.1, 0.8, -0.3));
        let tree = DecayTree::from_flat(&flat).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert!(matches!(
            classification.inconsistency,
            Some(Rejection::SoftDaughter {
                species: Species::Kaon,
                ..
            })
        ));
        assert_eq!(classification.counts, DaughterCounts::default());
    }

    #[test]
    fn k0s_children_are_counted_as_pions() {
        let proton = particle(2212, Vector3::new(1.5, 0., 0.2));
        let pi_plus = particle(211, Vector3::new(0., 1., 0.));
        let pi_minus = particle(-211, Vector3::new(0.6, -0.2, 0.));
        let k0s = GeneratedParticle {
            pdg: 310,
            momentum: pi_plus.momentum + pi_minus.momentum,
        };
        let parent = GeneratedParticle {
            pdg: 4122,
            momentum: proton.momentum + k0s.momentum,
        };
        let tree = DecayTree::from_flat(&[parent, proton, k0s, pi_plus, pi_minus]).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert!(classification.is_consistent(), "{:?}", classification);
        assert_eq!(
            classification.counts,
            DaughterCounts {
                pions: 2,
                kaons: 0,
                protons: 1,
                k0_shorts: 1
            }
        );

        let truncated = DecayTree::from_flat(&[parent, proton, k0s, pi_plus]).unwrap();
        assert_eq!(
            DecayDaughterClassifier::default().classify(&truncated).inconsistency,
            Some(Rejection::IncompleteK0sDecay { children: 1 })
        );
    }

    #[test]
    fn tracked_daughters_follow_decay_order() {
        let proton = particle(2212, Vector3::new(1.5, 0., 0.2));
        let k0s = particle(310, Vector3::new(0.6, 0.8, 0.));
        let pi_plus = particle(211, Vector3::new(0., 1., 0.));
        let pi_minus = particle(-211, Vector3::new(0.6, -0.2, 0.));
        let parent = particle(4122, Vector3::new(2., 1., 0.2));
        let tree = DecayTree::from_flat(&[parent, proton, k0s, pi_plus, pi_minus]).unwrap();
        let tracked = TrackedDaughters::walk(&tree).unwrap();
        let pdgs = tracked.daughters.iter().map(|d| d.particle.pdg).collect::<Vec<_>>();
        assert_eq!(pdgs, [2212, 211, -211]);
        let from_k0s = tracked.daughters.iter().map(|d| d.from_k0s).collect::<Vec<_>>();
        assert_eq!(from_k0s, [false, true, true]);
        assert_eq!(tracked.counts.k0_shorts, 1);
        assert_eq!(tracked.counts.pions, 2);
    }

    #[test]
    fn k0l_and_resonances() {
        let mut flat = d0_decay(Vector3::new(1., 0.2, 0.1), Vector3::new(0.1, 0.8, -0.3));
        flat.push(particle(3124, Vector3::zeros()));
        flat.push(particle(2224, Vector3::zeros()));
        let tree = DecayTree::from_flat(&flat).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert_eq!(classification.resonant_channel, ResonantChannel::DeltaPlusPlus);
        assert_eq!(classification.resonant_channel.id(), 3);

        flat.push(particle(130, Vector3::new(1., 0., 0.)));
        let tree = DecayTree::from_flat(&flat).unwrap();
        let classification = DecayDaughterClassifier::default().classify(&tree);
        assert_eq!(classification.inconsistency, Some(Rejection::LongLivedNeutralKaon));
    }

    #[test]
    fn daughter_acceptance_bounds() {
        let acceptance = DaughterAcceptance::default();
        assert!(acceptance.contains(&from_pt_phi_y(0.13957, 0.2, 0., 0.5)));
        assert!(!acceptance.contains(&from_pt_phi_y(0.13957, 0.05, 0., 0.)));
        assert!(!acceptance.contains(&from_pt_phi_y(0.13957, 2., 0., 1.2)));
    }

    #[test]
    fn fiducial_acceptance() {
        let fixed = FiducialAcceptance::default();
        assert!(!fixed.is_in_fiducial_acceptance(3., 0.9));
        assert!(fixed.is_in_fiducial_acceptance(3., 0.5));
        assert!(fixed.is_in_fiducial_acceptance(3., -0.8));

        let pt_dependent = FiducialAcceptance {
            policy: FiducialPolicy::PtDependent,
            ..FiducialAcceptance::default()
        };
        assert!(!pt_dependent.is_in_fiducial_acceptance(3., 0.9));
        assert!(pt_dependent.is_in_fiducial_acceptance(3., 0.5));
        assert!(!pt_dependent.is_in_fiducial_acceptance(0., 0.6));
        assert!(pt_dependent.is_in_fiducial_acceptance(0., -0.5));
        assert!(pt_dependent.is_in_fiducial_acceptance(10., 0.79));
        assert!(!pt_dependent.is_in_fiducial_acceptance(10., -0.81));
    }
}
