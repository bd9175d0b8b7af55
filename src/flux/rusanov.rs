//! Rusanov (local Lax-Friedrichs) flux.
//!
//! F* = ½(F(U_L) + F(U_R)) · n − ½ λ_max (U_R − U_L)
//!
//! with λ_max = max(|λ(U_L)|, |λ(U_R)|). Always defined for finite states;
//! the most dissipative member of the family.

use std::sync::Arc;

use super::RiemannSolver;
use super::traits::all_finite;
use crate::equations::GoverningEquations;
use crate::geometry::Surface;
use crate::solver::SolverError;

/// Rusanov solver for any governing equations.
#[derive(Clone)]
pub struct Rusanov {
    equations: Arc<dyn GoverningEquations>,
}

impl Rusanov {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }
}

impl RiemannSolver for Rusanov {
    fn flux(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> Result<Vec<f64>, SolverError> {
        let conv = self.equations.convection();
        let n = surface.normal;
        let fl = conv.flux(ul, n);
        let fr = conv.flux(ur, n);
        let lambda = conv
            .max_abs_eigenvalue(ul, n)
            .max(conv.max_abs_eigenvalue(ur, n));
        if !lambda.is_finite() || !all_finite(&fl) || !all_finite(&fr) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }

        Ok((0..ul.len())
            .map(|i| 0.5 * (fl[i] + fr[i]) - 0.5 * lambda * (ur[i] - ul[i]))
            .collect())
    }

    fn name(&self) -> &'static str {
        "rusanov"
    }
}
