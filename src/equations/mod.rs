//! Governing-equation contracts.
//!
//! A system of conservation laws
//!
//! ∂U/∂t + ∇·F_c(U) = ∇·F_d(U, ∇U) + S(x, U, ∇U)
//!
//! is exposed through three sub-contracts: [`Convection`] (F_c and its
//! eigenvalues), [`Diffusion`] (F_d and its spectral bound) and [`Source`]
//! (S). [`GoverningEquations`] bundles them with the conversions between
//! conservative and primitive variables.
//!
//! # Example
//!
//! ```
//! use fvm_rs::equations::{Euler, GoverningEquations};
//! use glam::DVec3;
//!
//! let euler = Euler::new(1.4, 1);
//! let u = euler.conservative_vars(&[1.0, 0.0, 1.0]); // rho, u, p
//! let flux = euler.convection().flux(&u, DVec3::X);
//! assert!((flux[1] - 1.0).abs() < 1e-14); // pure pressure flux
//! ```

mod advection;
mod artificial_compressibility;
mod euler;

use std::ops::Range;

use glam::DVec3;

pub use advection::ScalarAdvection;
pub use artificial_compressibility::{ArtificialCompressibility, ArtificialCompressibilityVof};
pub use euler::Euler;

/// Convective flux and its spectrum along a unit normal.
pub trait Convection: Send + Sync {
    /// Physical flux `F_c(U) · n`.
    fn flux(&self, u: &[f64], normal: DVec3) -> Vec<f64>;

    /// Eigenvalues of `∂(F_c · n)/∂U`, ascending.
    fn sorted_eigenvalues(&self, u: &[f64], normal: DVec3) -> Vec<f64>;

    /// Largest eigenvalue magnitude.
    fn max_abs_eigenvalue(&self, u: &[f64], normal: DVec3) -> f64 {
        let eig = self.sorted_eigenvalues(u, normal);
        match (eig.first(), eig.last()) {
            (Some(lo), Some(hi)) => lo.abs().max(hi.abs()),
            _ => 0.0,
        }
    }
}

/// Diffusive flux.
pub trait Diffusion: Send + Sync {
    /// Diffusive flux `F_d(U, ∇U) · n`.
    fn flux(&self, u: &[f64], gradient: &[DVec3], normal: DVec3) -> Vec<f64>;

    /// Largest diffusivity, used for the viscous time-step bound.
    fn max_abs_diffusivity(&self, u: &[f64]) -> f64;
}

/// Volumetric source term.
pub trait Source: Send + Sync {
    fn source_vector(&self, position: DVec3, u: &[f64], gradient: &[DVec3]) -> Vec<f64>;
}

/// A complete governing-equation model.
///
/// `conservative_vars` and `primitive_vars` must be mutual inverses.
pub trait GoverningEquations: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Number of conservative variables.
    fn num_vars(&self) -> usize;

    fn conservative_vars(&self, primitive: &[f64]) -> Vec<f64>;

    fn primitive_vars(&self, conservative: &[f64]) -> Vec<f64>;

    fn convection(&self) -> &dyn Convection;

    fn diffusion(&self) -> &dyn Diffusion;

    fn source(&self) -> &dyn Source;

    /// Components of `U` that transform as a vector (velocity or momentum).
    ///
    /// Used by wall boundary conditions. `None` for scalar models.
    fn vector_components(&self) -> Option<Range<usize>> {
        None
    }
}

// =============================================================================
// Neutral sub-contracts
// =============================================================================

/// Convection with zero flux and zero wave speeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroConvection;

impl Convection for ZeroConvection {
    fn flux(&self, u: &[f64], _normal: DVec3) -> Vec<f64> {
        vec![0.0; u.len()]
    }

    fn sorted_eigenvalues(&self, u: &[f64], _normal: DVec3) -> Vec<f64> {
        vec![0.0; u.len()]
    }
}

/// No diffusion.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroDiffusion;

impl Diffusion for ZeroDiffusion {
    fn flux(&self, u: &[f64], _gradient: &[DVec3], _normal: DVec3) -> Vec<f64> {
        vec![0.0; u.len()]
    }

    fn max_abs_diffusivity(&self, _u: &[f64]) -> f64 {
        0.0
    }
}

/// No source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroSource;

impl Source for ZeroSource {
    fn source_vector(&self, _position: DVec3, u: &[f64], _gradient: &[DVec3]) -> Vec<f64> {
        vec![0.0; u.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spectrum(Vec<f64>);

    impl Convection for Spectrum {
        fn flux(&self, u: &[f64], _normal: DVec3) -> Vec<f64> {
            u.to_vec()
        }

        fn sorted_eigenvalues(&self, _u: &[f64], _normal: DVec3) -> Vec<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn test_default_max_abs_eigenvalue() {
        assert_eq!(Spectrum(vec![-3.0, 1.0, 2.0]).max_abs_eigenvalue(&[], DVec3::X), 3.0);
        assert_eq!(Spectrum(vec![-1.0, 0.5, 2.0]).max_abs_eigenvalue(&[], DVec3::X), 2.0);
        assert_eq!(Spectrum(vec![]).max_abs_eigenvalue(&[], DVec3::X), 0.0);
    }

    #[test]
    fn test_zero_parts() {
        let u = [1.0, 2.0];
        assert_eq!(ZeroConvection.flux(&u, DVec3::X), vec![0.0, 0.0]);
        assert_eq!(ZeroConvection.max_abs_eigenvalue(&u, DVec3::X), 0.0);
        assert_eq!(ZeroDiffusion.max_abs_diffusivity(&u), 0.0);
        assert_eq!(
            ZeroSource.source_vector(DVec3::ZERO, &u, &[DVec3::ZERO; 2]),
            vec![0.0, 0.0]
        );
    }
}
