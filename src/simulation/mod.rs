//! Run driver.
//!
//! Ties together:
//! - the mesh and its state
//! - a [`crate::solver::SpatialDiscretization`] (assemblers and time-step rule)
//! - a [`crate::time::StandardIntegrator`]
//! - convergence monitoring and progress logging
//!
//! Configuration lives in [`SolverConfig`]; [`Solver::run`] iterates until the
//! configured residual norm drops below the tolerance.

mod config;
mod runner;

pub use config::{ConfigError, SolverConfig};
pub use runner::{RunSummary, Solver};
