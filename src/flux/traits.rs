//! Trait-based Riemann solver abstraction.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use fvm_rs::equations::{Euler, GoverningEquations};
//! use fvm_rs::flux::{RiemannSolver, RiemannSolverKind, create_riemann_solver};
//! use fvm_rs::geometry::Surface;
//! use glam::DVec3;
//!
//! let euler = Arc::new(Euler::air(1));
//! let ul = euler.conservative_vars(&[1.0, 0.0, 1.0]);
//! let ur = euler.conservative_vars(&[0.125, 0.0, 0.1]);
//! let surface = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
//!
//! let solver = create_riemann_solver(RiemannSolverKind::Hll, euler);
//! let flux = solver.flux(&ul, &ur, &surface).unwrap();
//! assert!(flux[0] > 0.0); // mass moves toward the low-pressure side
//! ```

use std::sync::Arc;

use crate::equations::GoverningEquations;
use crate::geometry::Surface;
use crate::solver::SolverError;

use super::{Hll, Rusanov};

// =============================================================================
// Riemann Solver Trait
// =============================================================================

/// Numerical flux across a face.
///
/// # Implementation Notes
///
/// - Consistency: `flux(u, u, s) == F(u) · s.normal`
/// - Conservation: `flux(ul, ur, s) == -flux(ur, ul, s.flipped())`
/// - Degenerate wave configurations are errors, never silently clamped
pub trait RiemannSolver: Send + Sync {
    /// Flux from `ul` (behind the normal) to `ur` (ahead of it).
    fn flux(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> Result<Vec<f64>, SolverError>;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Runtime selection
// =============================================================================

/// Riemann solvers that work with any [`GoverningEquations`].
///
/// The HLLC variants are tied to a specific equation set and are
/// constructed directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RiemannSolverKind {
    /// Local Lax-Friedrichs (simple, robust, diffusive)
    #[default]
    Rusanov,
    /// Two-wave HLL
    Hll,
}

impl RiemannSolverKind {
    pub fn name(&self) -> &'static str {
        match self {
            RiemannSolverKind::Rusanov => "rusanov",
            RiemannSolverKind::Hll => "hll",
        }
    }
}

/// Type alias for a shared Riemann solver.
pub type SharedRiemannSolver = Arc<dyn RiemannSolver>;

/// Create a solver for the given equations from a kind tag.
pub fn create_riemann_solver(
    kind: RiemannSolverKind,
    equations: Arc<dyn GoverningEquations>,
) -> SharedRiemannSolver {
    match kind {
        RiemannSolverKind::Rusanov => Arc::new(Rusanov::new(equations)),
        RiemannSolverKind::Hll => Arc::new(Hll::new(equations)),
    }
}

/// `true` when every entry is finite.
#[inline]
pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::ScalarAdvection;
    use glam::DVec3;

    #[test]
    fn test_create_by_kind() {
        let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
        for kind in [RiemannSolverKind::Rusanov, RiemannSolverKind::Hll] {
            let solver = create_riemann_solver(kind, eq.clone());
            assert_eq!(solver.name(), kind.name());
        }
    }

    #[test]
    fn test_trait_object_matches_concrete() {
        let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
        let surface = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
        let concrete = Rusanov::new(eq.clone()).flux(&[2.0], &[1.0], &surface).unwrap();
        let boxed = create_riemann_solver(RiemannSolverKind::Rusanov, eq)
            .flux(&[2.0], &[1.0], &surface)
            .unwrap();
        assert_eq!(concrete, boxed);
    }

    #[test]
    fn test_all_finite() {
        assert!(all_finite(&[1.0, -2.0]));
        assert!(!all_finite(&[1.0, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY]));
    }
}
