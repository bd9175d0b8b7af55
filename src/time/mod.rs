//! Explicit time integration of cell averages.
//!
//! - [`StandardIntegrator`]: runtime choice between [`ExplicitEuler`],
//!   [`SspRk2`] and [`SspRk3`]
//! - [`current_total_residual`]: normalised rate of change of the last step

mod integrator;
mod norm;

pub use integrator::{
    ExplicitEuler, IntegratorInfo, SspRk2, SspRk3, StageCoefficients, StandardIntegrator,
    TimeIntegrator,
};
pub use norm::{NORMALIZATION_FLOOR, ResidualNorm, current_total_residual};
