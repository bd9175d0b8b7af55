//! Zero-gradient outflow boundary.

use std::sync::Arc;

use super::{BoundaryCondition, BoundaryContext};
use crate::equations::GoverningEquations;
use crate::solver::SolverError;

/// Ghost state copies the interior; the flux is the interior physical flux.
#[derive(Clone)]
pub struct Extrapolated {
    equations: Arc<dyn GoverningEquations>,
}

impl Extrapolated {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }
}

impl BoundaryCondition for Extrapolated {
    fn ghost_state(&self, ctx: &BoundaryContext<'_>) -> Vec<f64> {
        ctx.interior.u.clone()
    }

    fn convective_flux(&self, ctx: &BoundaryContext<'_>) -> Result<Vec<f64>, SolverError> {
        Ok(self
            .equations
            .convection()
            .flux(&ctx.interior.u, ctx.face.normal()))
    }

    fn name(&self) -> &'static str {
        "extrapolated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::test_support::line_mesh;
    use crate::equations::ScalarAdvection;
    use glam::DVec3;

    #[test]
    fn test_outflow_flux() {
        let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
        let mesh = line_mesh(&eq, &[2.0]);
        let bc = Extrapolated::new(eq);

        let face = &mesh.boundary_faces()[1]; // right boundary
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        assert_eq!(bc.ghost_state(&ctx), vec![2.0]);
        assert_eq!(bc.convective_flux(&ctx).unwrap(), vec![2.0]);

        let face = &mesh.boundary_faces()[0]; // left boundary, normal -x
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        assert_eq!(bc.convective_flux(&ctx).unwrap(), vec![-2.0]);
    }
}
