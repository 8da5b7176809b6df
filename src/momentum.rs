//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::Float;
use nalgebra::{SVector, Vector3};
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum (GeV)
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Pseudorapidity reported for particles flying along the beam axis
const BEAM_AXIS_ETA: Float = 1e30;

/// Build the 4-momentum of a particle of known mass from its transverse
/// momentum, azimuthal angle and rapidity
pub fn from_pt_phi_y(mass: Float, pt: Float, phi: Float, y: Float) -> Momentum {
    let px = pt * cos(phi);
    let py = pt * sin(phi);
    let mt = sqrt(mass.powi(2) + pt.powi(2));
    let pz = mt * y.sinh();
    Momentum::new(px, py, pz, sqrt(mt.powi(2) + pz.powi(2)))
}

/// Build an on-shell 4-momentum from a 3-momentum and a mass
pub fn from_xyz_mass(p: &Vector3<Float>, mass: Float) -> Momentum {
    Momentum::new(p.x, p.y, p.z, sqrt(p.norm_squared() + mass.powi(2)))
}

/// Spatial part of a 4-momentum
pub fn xyz(p: &Momentum) -> Vector3<Float> {
    p.xyz()
}

/// Transverse momentum
pub fn pt(p: &Momentum) -> Float {
    sqrt(p[X].powi(2) + p[Y].powi(2))
}

/// Rapidity along the beam (Z) axis
pub fn rapidity(p: &Momentum) -> Float {
    0.5 * ln((p[E] + p[Z]) / (p[E] - p[Z]))
}

/// Pseudorapidity along the beam (Z) axis
///
/// Particles with no transverse momentum get a huge value carrying the sign of
/// their longitudinal momentum, so that any acceptance cut rejects them.
///
pub fn pseudorapidity(p: &Momentum) -> Float {
    let p_norm = xyz(p).norm();
    if p_norm > abs(p[Z]) {
        0.5 * ln((p_norm + p[Z]) / (p_norm - p[Z]))
    } else if p[Z] >= 0. {
        BEAM_AXIS_ETA
    } else {
        -BEAM_AXIS_ETA
    }
}

/// Invariant mass, clamped to zero for slightly space-like rounding errors
pub fn mass(p: &Momentum) -> Float {
    sqrt((p[E].powi(2) - xyz(p).norm_squared()).max(0.))
}

/// Velocity of the rest frame of a particle, in units of c
pub fn boost_vector(p: &Momentum) -> Vector3<Float> {
    xyz(p) / p[E]
}

/// Apply a Lorentz boost of velocity `beta` (in units of c) to a 4-momentum
pub fn boost(p: &Momentum, beta: &Vector3<Float>) -> Momentum {
    let beta_2 = beta.norm_squared();
    if beta_2 == 0. {
        return *p;
    }
    let gamma = 1. / sqrt(1. - beta_2);
    let beta_p = beta.dot(&xyz(p));
    let gamma_2 = (gamma - 1.) / beta_2;
    let p_xyz = xyz(p) + beta * (gamma_2 * beta_p + gamma * p[E]);
    Momentum::new(p_xyz.x, p_xyz.y, p_xyz.z, gamma * (p[E] + beta_p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kinematics_round_trip_through_pt_phi_y() {
        let p = from_pt_phi_y(1.86484, 3.5, 0.7, -0.4);
        assert_relative_eq!(pt(&p), 3.5, max_relative = 1e-12);
        assert_relative_eq!(rapidity(&p), -0.4, max_relative = 1e-12);
        assert_relative_eq!(mass(&p), 1.86484, max_relative = 1e-9);
    }

    #[test]
    fn boost_to_rest_frame_leaves_only_mass() {
        let p = from_pt_phi_y(2.28646, 7., 2., 0.3);
        let rest = boost(&p, &-boost_vector(&p));
        assert_relative_eq!(xyz(&rest).norm(), 0., epsilon = 1e-9);
        assert_relative_eq!(rest[E], 2.28646, max_relative = 1e-9);
    }

    #[test]
    fn beam_axis_particles_have_huge_pseudorapidity() {
        let p = Momentum::new(0., 0., -3., 3.);
        assert_eq!(pseudorapidity(&p), -BEAM_AXIS_ETA);
    }
}
