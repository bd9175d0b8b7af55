//! Boundary conditions.
//!
//! A boundary condition supplies, for every face of its boundary, the state
//! of the ghost cell behind the face and the convective flux through it.
//!
//! # Available Boundary Conditions
//!
//! | BC Type | Ghost state | Flux |
//! |---------|-------------|------|
//! | [`Extrapolated`] | copy of the interior | physical flux of the interior |
//! | [`FixedState`] | prescribed state | Riemann solver, interior vs prescribed |
//! | [`SlipWall`] | interior with mirrored normal velocity | physical flux of the mean state |

mod extrapolated;
mod fixed_state;
mod slip_wall;

use crate::mesh::{Cell, Face};
use crate::solver::SolverError;

pub use extrapolated::Extrapolated;
pub use fixed_state::FixedState;
pub use slip_wall::SlipWall;

/// Context passed to boundary conditions.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryContext<'a> {
    /// Boundary face, normal pointing out of the domain.
    pub face: &'a Face,
    /// Interior cell owning the face.
    pub interior: &'a Cell,
    /// Current physical time.
    pub time: f64,
}

impl<'a> BoundaryContext<'a> {
    pub fn new(face: &'a Face, interior: &'a Cell, time: f64) -> Self {
        Self {
            face,
            interior,
            time,
        }
    }
}

/// Trait for boundary conditions.
pub trait BoundaryCondition: Send + Sync {
    /// State of the ghost cell behind the face.
    fn ghost_state(&self, ctx: &BoundaryContext<'_>) -> Vec<f64>;

    /// Convective flux through the face, along its outward normal.
    fn convective_flux(&self, ctx: &BoundaryContext<'_>) -> Result<Vec<f64>, SolverError>;

    /// Name of this boundary condition for debugging/logging.
    fn name(&self) -> &'static str;
}
