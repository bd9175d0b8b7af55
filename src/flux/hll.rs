//! HLL (Harten-Lax-van Leer) two-wave solver.
//!
//! Wave-speed bounds from the sorted eigenvalues of both states:
//!
//! S_L = min(λ_1(U_L), λ_1(U_R)),  S_R = max(λ_m(U_L), λ_m(U_R))
//!
//! F* = F_L                                        if S_L > 0
//! F* = F_R                                        if S_R < 0
//! F* = (S_R F_L − S_L F_R + S_L S_R (U_R − U_L)) / (S_R − S_L)   otherwise
//!
//! `S_L == S_R == 0` has no fan and is reported as an error.

use std::sync::Arc;

use super::RiemannSolver;
use super::traits::all_finite;
use crate::equations::GoverningEquations;
use crate::geometry::Surface;
use crate::solver::SolverError;

/// HLL solver for any governing equations.
#[derive(Clone)]
pub struct Hll {
    equations: Arc<dyn GoverningEquations>,
}

impl Hll {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }

    /// `(S_L, S_R)` for a state pair.
    pub fn wave_speeds(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> (f64, f64) {
        let conv = self.equations.convection();
        bounds(
            &conv.sorted_eigenvalues(ul, surface.normal),
            &conv.sorted_eigenvalues(ur, surface.normal),
        )
    }
}

fn bounds(el: &[f64], er: &[f64]) -> (f64, f64) {
    let first = |e: &[f64]| e.first().copied().unwrap_or(0.0);
    let last = |e: &[f64]| e.last().copied().unwrap_or(0.0);
    (first(el).min(first(er)), last(el).max(last(er)))
}

impl RiemannSolver for Hll {
    fn flux(&self, ul: &[f64], ur: &[f64], surface: &Surface) -> Result<Vec<f64>, SolverError> {
        let conv = self.equations.convection();
        // min/max would silently drop a NaN eigenvalue of one side.
        let el = conv.sorted_eigenvalues(ul, surface.normal);
        let er = conv.sorted_eigenvalues(ur, surface.normal);
        if !all_finite(&el) || !all_finite(&er) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }
        let (sl, sr) = bounds(&el, &er);
        let checked = |f: Vec<f64>| {
            if all_finite(&f) {
                Ok(f)
            } else {
                Err(SolverError::non_finite(self.name(), ul, ur))
            }
        };

        if sl > 0.0 {
            return checked(conv.flux(ul, surface.normal));
        }
        if sr < 0.0 {
            return checked(conv.flux(ur, surface.normal));
        }
        if sr - sl <= 0.0 {
            return Err(SolverError::DegenerateWaveSpeeds {
                solver: self.name(),
                sl,
                sr,
                left: ul.to_vec(),
                right: ur.to_vec(),
            });
        }

        let fl = conv.flux(ul, surface.normal);
        let fr = conv.flux(ur, surface.normal);
        if !all_finite(&fl) || !all_finite(&fr) {
            return Err(SolverError::non_finite(self.name(), ul, ur));
        }
        let inv = 1.0 / (sr - sl);
        Ok((0..ul.len())
            .map(|i| (sr * fl[i] - sl * fr[i] + sl * sr * (ur[i] - ul[i])) * inv)
            .collect())
    }

    fn name(&self) -> &'static str {
        "hll"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{Convection, Euler, ScalarAdvection};
    use glam::DVec3;

    const TOL: f64 = 1e-12;

    fn x_surface() -> Surface {
        Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap()
    }

    #[test]
    fn test_supersonic_left_to_right_is_left_flux() {
        let euler = Arc::new(Euler::air(1));
        let ul = euler.conservative_vars(&[1.0, 5.0, 1.0]);
        let ur = euler.conservative_vars(&[0.5, 4.0, 0.8]);
        let hll = Hll::new(euler.clone());
        let (sl, _) = hll.wave_speeds(&ul, &ur, &x_surface());
        assert!(sl > 0.0);

        let f = hll.flux(&ul, &ur, &x_surface()).unwrap();
        let expected = euler.flux(&ul, DVec3::X);
        for (a, b) in f.iter().zip(&expected) {
            assert!((a - b).abs() < TOL);
        }
    }

    #[test]
    fn test_nan_state_is_an_error() {
        let euler = Arc::new(Euler::air(1));
        let ur = euler.conservative_vars(&[0.5, 4.0, 0.8]);
        let hll = Hll::new(euler);
        let ul = [f64::NAN, 0.0, 1.0];
        match hll.flux(&ul, &ur, &x_surface()) {
            Err(SolverError::NonFiniteState { solver, right, .. }) => {
                assert_eq!(solver, "hll");
                assert_eq!(right, ur);
            }
            other => panic!("expected a non-finite state error, got {other:?}"),
        }
        // Same on the right, where S_L > 0 would otherwise pick the left flux.
        let supersonic = [1.0, 5.0, 15.0];
        assert!(matches!(
            hll.flux(&supersonic, &ul, &x_surface()),
            Err(SolverError::NonFiniteState { .. })
        ));
    }

    #[test]
    fn test_stationary_advection_is_degenerate() {
        let eq = Arc::new(ScalarAdvection::new(DVec3::ZERO, 0.0));
        let hll = Hll::new(eq);
        let err = hll.flux(&[1.0], &[2.0], &x_surface()).unwrap_err();
        match err {
            SolverError::DegenerateWaveSpeeds { sl, sr, left, right, .. } => {
                assert_eq!((sl, sr), (0.0, 0.0));
                assert_eq!(left, vec![1.0]);
                assert_eq!(right, vec![2.0]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_subsonic_average() {
        // Linear advection with negative speed: S_L = S_R = -1 < 0 gives F_R.
        let eq = Arc::new(ScalarAdvection::new(-DVec3::X, 0.0));
        let hll = Hll::new(eq);
        let f = hll.flux(&[1.0], &[3.0], &x_surface()).unwrap();
        assert!((f[0] + 3.0).abs() < TOL);
    }
}
