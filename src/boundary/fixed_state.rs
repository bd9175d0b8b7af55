//! Dirichlet boundary with a prescribed state.

use super::{BoundaryCondition, BoundaryContext};
use crate::flux::SharedRiemannSolver;
use crate::solver::SolverError;

/// Ghost cell holds a prescribed conservative state.
///
/// The flux is the Riemann problem between the interior and that state, so
/// waves leaving the domain are not reflected back.
#[derive(Clone)]
pub struct FixedState {
    state: Vec<f64>,
    solver: SharedRiemannSolver,
}

impl FixedState {
    pub fn new(state: Vec<f64>, solver: SharedRiemannSolver) -> Self {
        Self { state, solver }
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }
}

impl BoundaryCondition for FixedState {
    fn ghost_state(&self, _ctx: &BoundaryContext<'_>) -> Vec<f64> {
        self.state.clone()
    }

    fn convective_flux(&self, ctx: &BoundaryContext<'_>) -> Result<Vec<f64>, SolverError> {
        if self.state.len() != ctx.interior.u.len() {
            return Err(SolverError::StateSize {
                expected: ctx.interior.u.len(),
                found: self.state.len(),
            });
        }
        self.solver
            .flux(&ctx.interior.u, &self.state, ctx.face.surface())
    }

    fn name(&self) -> &'static str {
        "fixed-state"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::boundary::test_support::line_mesh;
    use crate::equations::{GoverningEquations, ScalarAdvection};
    use crate::flux::{RiemannSolverKind, create_riemann_solver};
    use glam::DVec3;

    #[test]
    fn test_inflow_takes_prescribed_state() {
        let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
        let mesh = line_mesh(&eq, &[2.0]);
        let bc = FixedState::new(
            vec![5.0],
            create_riemann_solver(RiemannSolverKind::Rusanov, eq),
        );

        // Left boundary: flow enters, upwind value is the prescribed one.
        let face = &mesh.boundary_faces()[0];
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        assert_eq!(bc.ghost_state(&ctx), vec![5.0]);
        assert!((bc.convective_flux(&ctx).unwrap()[0] + 5.0).abs() < 1e-14);

        // Right boundary: flow leaves, upwind value is the interior.
        let face = &mesh.boundary_faces()[1];
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        assert!((bc.convective_flux(&ctx).unwrap()[0] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_size_mismatch() {
        let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
        let mesh = line_mesh(&eq, &[2.0]);
        let bc = FixedState::new(
            vec![1.0, 2.0],
            create_riemann_solver(RiemannSolverKind::Rusanov, eq),
        );
        let face = &mesh.boundary_faces()[0];
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        assert!(matches!(
            bc.convective_flux(&ctx),
            Err(SolverError::StateSize { expected: 1, found: 2 })
        ));
    }
}
