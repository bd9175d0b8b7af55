//! Artificial-compressibility models for incompressible flow.
//!
//! Chorin's pseudo-compressibility replaces the divergence constraint by
//! `∂p/∂τ + β ∇·u = 0`, giving a hyperbolic system marched to steady state.
//!
//! - [`ArtificialCompressibility`]: single phase, `U = [p, u, v, w]`
//! - [`ArtificialCompressibilityVof`]: two phases tracked by a volume
//!   fraction, `U = [p, ρu, ρv, ρw, α]`

use std::ops::Range;

use glam::DVec3;

use super::{Convection, Diffusion, GoverningEquations, Source, ZeroDiffusion, ZeroSource};

// =============================================================================
// Single phase
// =============================================================================

/// Single-phase artificial compressibility with Laplacian viscosity.
#[derive(Clone, Copy, Debug)]
pub struct ArtificialCompressibility {
    /// Artificial compressibility parameter β.
    pub beta: f64,
    /// Kinematic viscosity ν.
    pub viscosity: f64,
}

impl ArtificialCompressibility {
    pub fn new(beta: f64, viscosity: f64) -> Self {
        Self { beta, viscosity }
    }

    #[inline]
    pub fn velocity(u: &[f64]) -> DVec3 {
        DVec3::new(u[1], u[2], u[3])
    }

    /// Pseudo sound speed `√(u_n² + β)`.
    #[inline]
    pub fn pseudo_sound_speed(&self, un: f64) -> f64 {
        (un * un + self.beta).sqrt()
    }
}

impl Convection for ArtificialCompressibility {
    fn flux(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let v = Self::velocity(u);
        let un = v.dot(normal);
        let p = u[0];
        vec![
            self.beta * un,
            v.x * un + p * normal.x,
            v.y * un + p * normal.y,
            v.z * un + p * normal.z,
        ]
    }

    fn sorted_eigenvalues(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let un = Self::velocity(u).dot(normal);
        let c = self.pseudo_sound_speed(un);
        vec![un - c, un, un, un + c]
    }
}

impl Diffusion for ArtificialCompressibility {
    fn flux(&self, _u: &[f64], gradient: &[DVec3], normal: DVec3) -> Vec<f64> {
        vec![
            0.0,
            self.viscosity * gradient[1].dot(normal),
            self.viscosity * gradient[2].dot(normal),
            self.viscosity * gradient[3].dot(normal),
        ]
    }

    fn max_abs_diffusivity(&self, _u: &[f64]) -> f64 {
        self.viscosity.abs()
    }
}

impl GoverningEquations for ArtificialCompressibility {
    fn name(&self) -> &'static str {
        "artificial-compressibility"
    }

    fn num_vars(&self) -> usize {
        4
    }

    fn conservative_vars(&self, primitive: &[f64]) -> Vec<f64> {
        primitive.to_vec()
    }

    fn primitive_vars(&self, conservative: &[f64]) -> Vec<f64> {
        conservative.to_vec()
    }

    fn convection(&self) -> &dyn Convection {
        self
    }

    fn diffusion(&self) -> &dyn Diffusion {
        self
    }

    fn source(&self) -> &dyn Source {
        &ZeroSource
    }

    fn vector_components(&self) -> Option<Range<usize>> {
        Some(1..4)
    }
}

// =============================================================================
// Volume of fluid
// =============================================================================

/// Two-phase artificial compressibility with a transported volume fraction.
///
/// Mixture density `ρ = α ρ_l + (1 − α) ρ_g`.
#[derive(Clone, Copy, Debug)]
pub struct ArtificialCompressibilityVof {
    pub beta: f64,
    pub rho_liquid: f64,
    pub rho_gas: f64,
    pub gravity: DVec3,
}

impl ArtificialCompressibilityVof {
    pub fn new(beta: f64, rho_liquid: f64, rho_gas: f64, gravity: DVec3) -> Self {
        Self {
            beta,
            rho_liquid,
            rho_gas,
            gravity,
        }
    }

    /// Mixture density for a volume fraction.
    #[inline]
    pub fn density(&self, alpha: f64) -> f64 {
        alpha * self.rho_liquid + (1.0 - alpha) * self.rho_gas
    }

    #[inline]
    pub fn velocity(&self, u: &[f64]) -> DVec3 {
        DVec3::new(u[1], u[2], u[3]) / self.density(u[4])
    }

    /// Pseudo sound speed `√(u_n² + β/ρ)`.
    #[inline]
    pub fn pseudo_sound_speed(&self, un: f64, rho: f64) -> f64 {
        (un * un + self.beta / rho).sqrt()
    }
}

impl Convection for ArtificialCompressibilityVof {
    fn flux(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let v = self.velocity(u);
        let un = v.dot(normal);
        let p = u[0];
        vec![
            self.beta * un,
            u[1] * un + p * normal.x,
            u[2] * un + p * normal.y,
            u[3] * un + p * normal.z,
            u[4] * un,
        ]
    }

    fn sorted_eigenvalues(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let un = self.velocity(u).dot(normal);
        let c = self.pseudo_sound_speed(un, self.density(u[4]));
        vec![un - c, un, un, un, un + c]
    }
}

impl Source for ArtificialCompressibilityVof {
    fn source_vector(&self, _position: DVec3, u: &[f64], _gradient: &[DVec3]) -> Vec<f64> {
        let g = self.density(u[4]) * self.gravity;
        vec![0.0, g.x, g.y, g.z, 0.0]
    }
}

impl GoverningEquations for ArtificialCompressibilityVof {
    fn name(&self) -> &'static str {
        "artificial-compressibility-vof"
    }

    fn num_vars(&self) -> usize {
        5
    }

    /// `[p, u, v, w, α]` to `[p, ρu, ρv, ρw, α]`.
    fn conservative_vars(&self, primitive: &[f64]) -> Vec<f64> {
        let rho = self.density(primitive[4]);
        vec![
            primitive[0],
            rho * primitive[1],
            rho * primitive[2],
            rho * primitive[3],
            primitive[4],
        ]
    }

    fn primitive_vars(&self, conservative: &[f64]) -> Vec<f64> {
        let v = self.velocity(conservative);
        vec![conservative[0], v.x, v.y, v.z, conservative[4]]
    }

    fn convection(&self) -> &dyn Convection {
        self
    }

    fn diffusion(&self) -> &dyn Diffusion {
        &ZeroDiffusion
    }

    fn source(&self) -> &dyn Source {
        self
    }

    fn vector_components(&self) -> Option<Range<usize>> {
        Some(1..4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_ac_flux_and_spectrum() {
        let ac = ArtificialCompressibility::new(4.0, 0.0);
        let u = [2.0, 1.0, 0.5, 0.0];
        let f = ac.convection().flux(&u, DVec3::X);
        assert_eq!(f, vec![4.0, 1.0 + 2.0, 0.5, 0.0]);

        let eig = ac.convection().sorted_eigenvalues(&u, DVec3::X);
        let c = 5.0f64.sqrt();
        assert!((eig[0] - (1.0 - c)).abs() < TOL);
        assert!((eig[3] - (1.0 + c)).abs() < TOL);
    }

    #[test]
    fn test_ac_viscous_flux() {
        let ac = ArtificialCompressibility::new(1.0, 0.1);
        let grad = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::ZERO, DVec3::Z];
        let f = ac.diffusion().flux(&[0.0; 4], &grad, DVec3::X);
        assert!((f[1] - 0.2).abs() < TOL);
        assert_eq!(f[0], 0.0);
        assert_eq!(f[3], 0.0);
    }

    #[test]
    fn test_vof_density_and_roundtrip() {
        let vof = ArtificialCompressibilityVof::new(10.0, 1000.0, 1.0, -9.81 * DVec3::Y);
        assert!((vof.density(0.5) - 500.5).abs() < TOL);

        let w = [1.5, 0.2, -0.3, 0.1, 0.25];
        let back = vof.primitive_vars(&vof.conservative_vars(&w));
        for (a, b) in w.iter().zip(&back) {
            assert!((a - b).abs() < TOL);
        }
    }

    #[test]
    fn test_vof_gravity_source() {
        let vof = ArtificialCompressibilityVof::new(10.0, 1000.0, 1.0, -9.81 * DVec3::Y);
        let s = vof.source().source_vector(DVec3::ZERO, &[0.0, 0.0, 0.0, 0.0, 1.0], &[]);
        assert!((s[2] + 9810.0).abs() < 1e-9);
        assert_eq!(s[4], 0.0);
    }
}
