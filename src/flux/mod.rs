//! Approximate Riemann solvers.
//!
//! Every solver returns the numerical flux across a face in the direction of
//! the face normal:
//!
//! - [`Rusanov`]: local Lax-Friedrichs, any equations
//! - [`Hll`]: two-wave HLL, any equations
//! - [`HllcArtificialCompressibility`]: three-wave HLLC for single-phase
//!   artificial compressibility
//! - [`HllcArtificialCompressibilityVof`]: HLLC with a four-way fan for the
//!   volume-of-fluid variant
//!
//! # Solver Trait
//!
//! The [`RiemannSolver`] trait is object safe; boundary conditions and
//! residual assemblers hold solvers as [`SharedRiemannSolver`].

mod hll;
mod hllc;
mod rusanov;
pub mod traits;

pub use hll::Hll;
pub use hllc::{HllcArtificialCompressibility, HllcArtificialCompressibilityVof};
pub use rusanov::Rusanov;
pub use traits::{RiemannSolver, RiemannSolverKind, SharedRiemannSolver, create_riemann_solver};
