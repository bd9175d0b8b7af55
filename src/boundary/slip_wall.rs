//! Inviscid slip wall.

use std::sync::Arc;

use glam::DVec3;

use super::{BoundaryCondition, BoundaryContext};
use crate::equations::GoverningEquations;
use crate::solver::SolverError;

/// Mirror state with reversed normal velocity and preserved tangential velocity.
///
/// The flux is the physical flux of the mean of the interior and mirror
/// states, whose normal velocity is zero: only pressure crosses the wall.
/// Scalar models have no velocity to mirror and behave as [`super::Extrapolated`].
#[derive(Clone)]
pub struct SlipWall {
    equations: Arc<dyn GoverningEquations>,
}

impl SlipWall {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }

    fn mirror(&self, u: &[f64], normal: DVec3) -> Vec<f64> {
        let mut ghost = u.to_vec();
        if let Some(range) = self.equations.vector_components() {
            let mut v = DVec3::ZERO;
            for (k, i) in range.clone().enumerate() {
                v[k] = u[i];
            }
            let reflected = v - 2.0 * v.dot(normal) * normal;
            for (k, i) in range.enumerate() {
                ghost[i] = reflected[k];
            }
        }
        ghost
    }
}

impl BoundaryCondition for SlipWall {
    fn ghost_state(&self, ctx: &BoundaryContext<'_>) -> Vec<f64> {
        self.mirror(&ctx.interior.u, ctx.face.normal())
    }

    fn convective_flux(&self, ctx: &BoundaryContext<'_>) -> Result<Vec<f64>, SolverError> {
        let u = &ctx.interior.u;
        let ghost = self.mirror(u, ctx.face.normal());
        let mean: Vec<f64> = u.iter().zip(&ghost).map(|(a, b)| 0.5 * (a + b)).collect();
        Ok(self.equations.convection().flux(&mean, ctx.face.normal()))
    }

    fn name(&self) -> &'static str {
        "slip-wall"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::test_support::line_mesh;
    use crate::equations::{ArtificialCompressibility, Euler};

    #[test]
    fn test_euler_wall_only_transmits_pressure() {
        let euler = Euler::air(1);
        let u = euler.conservative_vars(&[1.0, 0.3, 1.0]);
        let eq: Arc<dyn GoverningEquations> = Arc::new(euler);
        let mesh = line_mesh(&eq, &u);
        let bc = SlipWall::new(eq);

        let face = &mesh.boundary_faces()[1];
        let ctx = BoundaryContext::new(face, mesh.cell(face.left()), 0.0);
        let ghost = bc.ghost_state(&ctx);
        assert!((ghost[1] + u[1]).abs() < 1e-14);
        assert_eq!(ghost[0], u[0]);
        assert_eq!(ghost[2], u[2]);

        let f = bc.convective_flux(&ctx).unwrap();
        assert!(f[0].abs() < 1e-14, "no mass through the wall");
        assert!(f[2].abs() < 1e-14, "no energy through the wall");
        let p_mean = euler.pressure(&[u[0], 0.0, u[2]]);
        assert!((f[1] - p_mean).abs() < 1e-12);
    }

    #[test]
    fn test_ac_tangential_velocity_kept() {
        let ac = ArtificialCompressibility::new(1.0, 0.0);
        let eq: Arc<dyn GoverningEquations> = Arc::new(ac);
        let bc = SlipWall::new(eq);
        let ghost = bc.mirror(&[2.0, 1.0, 3.0, -1.0], DVec3::X);
        assert_eq!(ghost, vec![2.0, -1.0, 3.0, -1.0]);
    }
}
