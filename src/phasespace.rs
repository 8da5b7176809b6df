//! Phase-space decay generator for the studied charm hadron decays

use crate::{
    decay::{DecayChannel, Decayer, GeneratedParticle},
    momentum::{self, Momentum, E},
    numeric::{reals::consts::PI, Float},
    random::RandomGenerator,
    species::Species,
    Result,
};
use eyre::{ensure, eyre};
use nalgebra::{Rotation3, Vector3};
use prefix_num_ops::real::*;
use std::collections::BTreeMap;

// Masses of the few generated particles which the rest of the program does
// not need to know about (GeV/c²)
const NEUTRAL_PION_MASS: Float = 0.134977;
const NEUTRAL_KAON_MASS: Float = 0.497611;

/// Nominal mass of a particle, from its signed PDG code
fn particle_mass(pdg: i32) -> Option<Float> {
    match pdg.unsigned_abs() {
        111 => Some(NEUTRAL_PION_MASS),
        311 => Some(NEUTRAL_KAON_MASS),
        _ => Species::from_pdg(pdg).mass(),
    }
}

/// One way in which a particle can decay
#[derive(Clone, Debug, PartialEq)]
pub struct DecayMode {
    /// Relative probability of this mode among those of the same particle
    pub weight: Float,

    /// Signed PDG codes of the decay products
    pub products: Vec<i32>,

    /// Masses of the decay products
    masses: Vec<Float>,
}

/// Generator of decays which are uniformly distributed in phase space
///
/// Each decaying particle has a table of decay modes. Particles without one
/// are considered stable. Decay products are listed right after the particle
/// which they come from, recursively, so that unstable products such as K0S
/// are immediately followed by their own decay products.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseSpaceDecayer {
    /// Decay modes of unstable particles, by signed PDG code
    modes: BTreeMap<i32, Vec<DecayMode>>,
}
//
impl PhaseSpaceDecayer {
    // ### CONSTRUCTION ###

    /// Set up a decayer which knows of no unstable particle
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decay mode of some particle
    pub fn add_mode(&mut self, parent: i32, weight: Float, products: &[i32]) -> Result<()> {
        let parent_mass =
            particle_mass(parent).ok_or_else(|| eyre!("Unknown mass of particle {}", parent))?;
        ensure!(weight > 0., "Decay mode weights must be positive");
        ensure!(!products.is_empty(), "A decay must produce something");
        let masses = products
            .iter()
            .map(|&pdg| particle_mass(pdg).ok_or_else(|| eyre!("Unknown mass of particle {}", pdg)))
            .collect::<Result<Vec<_>>>()?;
        let total_mass = masses.iter().sum::<Float>();
        ensure!(
            if products.len() == 1 {
                total_mass <= parent_mass
            } else {
                total_mass < parent_mass
            },
            "Decay of {} into {:?} is kinematically forbidden",
            parent,
            products
        );
        self.modes.entry(parent).or_default().push(DecayMode {
            weight,
            products: products.to_vec(),
            masses,
        });
        Ok(())
    }

    /// Set up the decays of a charm hadron decay channel
    ///
    /// Resonant Λc → p K- π+ contributions go through K*0, Δ++ and Λ(1520),
    /// and the neutral kaon of Λc → p K0S becomes a K0S or a K0L with equal
    /// probability, like in a full event generator.
    ///
    pub fn for_channel(channel: DecayChannel) -> Result<Self> {
        let mut decayer = Self::new();
        let parent = channel.parent_pdg();
        match channel {
            DecayChannel::D0Kpi => decayer.add_mode(parent, 1., &[-321, 211])?,
            DecayChannel::DplusKpipi => decayer.add_mode(parent, 1., &[-321, 211, 211])?,
            DecayChannel::DstarD0pi => {
                decayer.add_mode(parent, 1., &[421, 211])?;
                decayer.add_mode(421, 1., &[-321, 211])?;
            }
            DecayChannel::DsKKpi | DecayChannel::DplusKKpi => {
                decayer.add_mode(parent, 1., &[321, -321, 211])?
            }
            DecayChannel::LcpKpi => {
                decayer.add_mode(parent, 0.35, &[2212, -321, 211])?;
                decayer.add_mode(parent, 0.196, &[2212, -313])?;
                decayer.add_mode(parent, 0.108, &[2224, -321])?;
                decayer.add_mode(parent, 0.05, &[3124, 211])?;
                decayer.add_mode(-313, 1., &[-321, 211])?;
                decayer.add_mode(2224, 1., &[2212, 211])?;
                decayer.add_mode(3124, 1., &[2212, -321])?;
            }
            DecayChannel::LcK0Sp => {
                decayer.add_mode(parent, 1., &[2212, -311])?;
                decayer.add_mode(-311, 0.5, &[310])?;
                decayer.add_mode(-311, 0.5, &[130])?;
                decayer.add_mode(310, 0.692, &[211, -211])?;
                decayer.add_mode(310, 0.308, &[111, 111])?;
            }
        }
        Ok(decayer)
    }

    // ### DECAY GENERATION ###

    /// Append a particle and, recursively, its decay products to `output`
    fn decay_into(
        &self,
        pdg: i32,
        momentum: &Momentum,
        rng: &mut RandomGenerator,
        output: &mut Vec<GeneratedParticle>,
    ) {
        output.push(GeneratedParticle {
            pdg,
            momentum: *momentum,
        });
        let Some(mode) = self.modes.get(&pdg).and_then(|modes| choose_mode(modes, rng)) else {
            return;
        };
        let beta = momentum::boost_vector(momentum);
        let rest_frame_momenta = n_body_decay(momentum::mass(momentum), &mode.masses, rng);
        for (&product, rest_momentum) in mode.products.iter().zip(rest_frame_momenta.iter()) {
            let lab_momentum = momentum::boost(rest_momentum, &beta);
            self.decay_into(product, &lab_momentum, rng, output);
        }
    }
}
//
impl Decayer for PhaseSpaceDecayer {
    fn decay(
        &self,
        parent_pdg: i32,
        momentum: &Momentum,
        rng: &mut RandomGenerator,
    ) -> Vec<GeneratedParticle> {
        let mut output = Vec::new();
        self.decay_into(parent_pdg, momentum, rng, &mut output);
        output
    }
}

/// Pick a decay mode with a probability proportional to its weight
fn choose_mode<'a>(modes: &'a [DecayMode], rng: &mut RandomGenerator) -> Option<&'a DecayMode> {
    let total_weight = modes.iter().map(|mode| mode.weight).sum::<Float>();
    let mut r = rng.random() * total_weight;
    for mode in modes {
        if r < mode.weight {
            return Some(mode);
        }
        r -= mode.weight;
    }
    modes.last()
}

/// Momentum of the two products of a two-body decay, in the parent rest frame
fn two_body_momentum(parent_mass: Float, mass_1: Float, mass_2: Float) -> Float {
    let sum = (parent_mass.powi(2) - (mass_1 + mass_2).powi(2)).max(0.);
    let diff = (parent_mass.powi(2) - (mass_1 - mass_2).powi(2)).max(0.);
    sqrt(sum * diff) / (2. * parent_mass)
}

/// Generate the rest frame 4-momenta of the products of an N-body decay
///
/// This uses the GENBOD algorithm from F. James (CERN 68-15): the decay is
/// built as a chain of two-body decays of intermediate systems of random
/// invariant masses, and configurations are accepted with a probability
/// proportional to their phase space weight, so that accepted decays are
/// uniformly distributed in phase space.
///
fn n_body_decay(parent_mass: Float, masses: &[Float], rng: &mut RandomGenerator) -> Vec<Momentum> {
    let num_products = masses.len();
    if num_products == 1 {
        return vec![Momentum::new(0., 0., 0., masses[0])];
    }

    // Kinetic energy available to the products, and maximal weight
    let kinetic_energy = parent_mass - masses.iter().sum::<Float>();
    let mut max_weight = 1.;
    let mut e_max = kinetic_energy + masses[0];
    let mut e_min = 0.;
    for k in 1..num_products {
        e_min += masses[k - 1];
        e_max += masses[k];
        max_weight *= two_body_momentum(e_max, e_min, masses[k]);
    }

    // Draw intermediate invariant masses until a configuration is accepted
    let mut invariant_masses = vec![0.; num_products];
    let mut pair_momenta = vec![0.; num_products - 1];
    loop {
        let mut r = vec![0.; num_products];
        r[num_products - 1] = 1.;
        for r_k in &mut r[1..num_products - 1] {
            *r_k = rng.random();
        }
        r[1..num_products - 1].sort_by(Float::total_cmp);

        let mut mass_sum = 0.;
        for k in 0..num_products {
            mass_sum += masses[k];
            invariant_masses[k] = r[k] * kinetic_energy + mass_sum;
        }

        let mut weight = 1.;
        for k in 0..num_products - 1 {
            pair_momenta[k] =
                two_body_momentum(invariant_masses[k + 1], invariant_masses[k], masses[k + 1]);
            weight *= pair_momenta[k];
        }
        if rng.random() * max_weight <= weight {
            break;
        }
    }

    // Build the momenta, from the innermost two-body decay outwards
    let at_rest = |p_y: Float, mass: Float| momentum::from_xyz_mass(&Vector3::new(0., p_y, 0.), mass);
    let mut momenta = Vec::with_capacity(num_products);
    momenta.push(at_rest(pair_momenta[0], masses[0]));
    momenta.push(at_rest(-pair_momenta[0], masses[1]));
    rotate_randomly(&mut momenta, rng);
    for k in 1..num_products - 1 {
        let subsystem_energy = sqrt(pair_momenta[k].powi(2) + invariant_masses[k].powi(2));
        let beta = Vector3::new(0., pair_momenta[k] / subsystem_energy, 0.);
        for p in &mut momenta {
            *p = momentum::boost(p, &beta);
        }
        momenta.push(at_rest(-pair_momenta[k], masses[k + 1]));
        rotate_randomly(&mut momenta, rng);
    }
    momenta
}

/// Rotate a set of momenta so that the Y axis points in a random direction
fn rotate_randomly(momenta: &mut [Momentum], rng: &mut RandomGenerator) {
    let [cos_theta, phi_rnd] = rng.random_array::<2>();
    let theta = (2. * cos_theta - 1.).acos();
    let phi = 2. * PI * phi_rnd;
    let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), phi)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), theta);
    for p in momenta {
        let xyz = rotation * momentum::xyz(p);
        *p = Momentum::new(xyz.x, xyz.y, xyz.z, p[E]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{momentum::from_pt_phi_y, random::DEFAULT_SEED};
    use approx::assert_relative_eq;

    fn decay(channel: DecayChannel, rng: &mut RandomGenerator) -> Vec<GeneratedParticle> {
        let decayer = PhaseSpaceDecayer::for_channel(channel).unwrap();
        let mass = channel.parent_species().mass().unwrap();
        let parent = from_pt_phi_y(mass, 5., 1., 0.5);
        decayer.decay(channel.parent_pdg(), &parent, rng)
    }

    #[test]
    fn three_body_decays_conserve_momentum() {
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        for _ in 0..100 {
            let particles = decay(DecayChannel::DplusKpipi, &mut rng);
            let pdgs = particles.iter().map(|p| p.pdg).collect::<Vec<_>>();
            assert_eq!(pdgs, [411, -321, 211, 211]);
            let sum = particles[1..]
                .iter()
                .fold(Momentum::zeros(), |acc, p| acc + p.momentum);
            assert_relative_eq!(sum, particles[0].momentum, epsilon = 1e-9);
            assert_relative_eq!(
                momentum::mass(&particles[1].momentum),
                Species::Kaon.mass().unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn resonance_products_follow_the_resonance() {
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        let pdgs = decay(DecayChannel::DstarD0pi, &mut rng)
            .iter()
            .map(|p| p.pdg)
            .collect::<Vec<_>>();
        assert_eq!(pdgs, [413, 421, -321, 211, 211]);

        for _ in 0..20 {
            let particles = decay(DecayChannel::LcK0Sp, &mut rng);
            assert_eq!(particles[1].pdg, 2212);
            assert_eq!(particles[2].pdg, -311);
            match particles[3].pdg {
                310 => assert_eq!(particles.len(), 6),
                130 => assert_eq!(particles.len(), 4),
                other => panic!("Unexpected neutral kaon {}", other),
            }
        }
    }

    #[test]
    fn all_lambda_c_sub_channels_are_generated() {
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        let mut seen = [false; 4];
        for _ in 0..1000 {
            let particles = decay(DecayChannel::LcpKpi, &mut rng);
            let index = match particles[1].pdg {
                2212 => 0,
                -313 => 1,
                2224 => 2,
                3124 => 3,
                other => panic!("Unexpected product {}", other),
            };
            seen[index] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn forbidden_decays_are_rejected() {
        let mut decayer = PhaseSpaceDecayer::new();
        assert!(decayer.add_mode(421, 1., &[2212, 2212]).is_err());
        assert!(decayer.add_mode(421, 1., &[99999]).is_err());
        assert!(decayer.add_mode(421, 0., &[-321, 211]).is_err());
    }
}
