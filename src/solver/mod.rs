//! Spatial discretization: reconstruction, residual assembly and local time steps.
//!
//! One stage of an explicit scheme runs, in order:
//! 1. ghost states from the boundary conditions
//! 2. gradient reconstruction ([`SolutionReconstructor`])
//! 3. face fluxes and residual summation ([`ResidualAssembler`])
//! 4. stable time steps ([`TimeStepCalculator`])
//!
//! Each step is a barrier; loops inside a step run in parallel when the
//! `parallel` feature is enabled.

mod diagnostics;
mod discretization;
mod error;
pub(crate) mod parallel;
mod reconstruction;
mod residual;
mod timestep;

pub use diagnostics::{ConvergenceMonitor, ResidualRecord};
pub use discretization::SpatialDiscretization;
pub use error::SolverError;
pub use reconstruction::{
    GreenGaussNodal, LeastSquares, PiecewiseConstant, ReconstructionKind, SolutionReconstructor,
    create_reconstructor,
};
pub use residual::{
    ConvectionResidual, DiffusionResidual, ResidualAssembler, SourceResidual, update_ghost_cells,
};
pub use timestep::{GlobalTimeStep, LocalTimeStep, TimeStepCalculator, TimeStepping};
