//! Bundle of residual assemblers and the time-step rule for one equation set.

use std::sync::Arc;

use super::parallel::for_each_mut;
use super::{ResidualAssembler, SolverError, TimeStepCalculator, TimeStepping};
use crate::equations::GoverningEquations;
use crate::mesh::Mesh;

/// Spatial operator of a finite-volume scheme.
///
/// Assemblers run in insertion order, one after another, so each cell's
/// residual has a single writer at a time.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fvm_rs::equations::{GoverningEquations, ScalarAdvection};
/// use fvm_rs::flux::{RiemannSolverKind, create_riemann_solver};
/// use fvm_rs::solver::{
///     ConvectionResidual, PiecewiseConstant, SpatialDiscretization, TimeStepping,
/// };
/// use glam::DVec3;
///
/// let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
/// let convection = ConvectionResidual::new(
///     create_riemann_solver(RiemannSolverKind::Rusanov, eq.clone()),
///     Arc::new(PiecewiseConstant),
/// );
/// let spatial = SpatialDiscretization::new(eq, TimeStepping::Global, 0.9)
///     .with_assembler(convection);
/// assert_eq!(spatial.assembler_names(), vec!["convection"]);
/// ```
pub struct SpatialDiscretization {
    equations: Arc<dyn GoverningEquations>,
    assemblers: Vec<Box<dyn ResidualAssembler>>,
    time_step: Box<dyn TimeStepCalculator>,
    courant: f64,
    time_step_limit: f64,
}

impl SpatialDiscretization {
    pub fn new(equations: Arc<dyn GoverningEquations>, time_stepping: TimeStepping, courant: f64) -> Self {
        Self {
            equations,
            assemblers: Vec::new(),
            time_step: time_stepping.calculator(),
            courant,
            time_step_limit: f64::INFINITY,
        }
    }

    /// Upper bound on every cell's time step.
    pub fn with_time_step_limit(mut self, limit: f64) -> Self {
        self.time_step_limit = limit;
        self
    }

    pub fn with_assembler<A: ResidualAssembler + 'static>(mut self, assembler: A) -> Self {
        self.assemblers.push(Box::new(assembler));
        self
    }

    pub fn with_boxed_assembler(mut self, assembler: Box<dyn ResidualAssembler>) -> Self {
        self.assemblers.push(assembler);
        self
    }

    pub fn equations(&self) -> &Arc<dyn GoverningEquations> {
        &self.equations
    }

    pub fn courant(&self) -> f64 {
        self.courant
    }

    pub fn time_step_limit(&self) -> f64 {
        self.time_step_limit
    }

    pub fn assembler_names(&self) -> Vec<&'static str> {
        self.assemblers.iter().map(|a| a.name()).collect()
    }

    pub fn time_step_name(&self) -> &'static str {
        self.time_step.name()
    }

    /// The mesh must be allocated for the equations' variable count.
    pub fn check_state(&self, mesh: &Mesh) -> Result<(), SolverError> {
        let expected = self.equations.num_vars();
        if mesh.num_vars() != expected {
            return Err(SolverError::StateSize {
                expected,
                found: mesh.num_vars(),
            });
        }
        Ok(())
    }

    /// Zero every cell's residual accumulator.
    pub fn clear_residuals(&self, mesh: &mut Mesh) {
        for_each_mut(mesh.cells_mut(), |_, cell| {
            cell.residual.iter_mut().for_each(|r| *r = 0.0);
        });
    }

    /// Run every assembler on the current cell states.
    pub fn assemble_residual(&self, mesh: &mut Mesh, time: f64) -> Result<(), SolverError> {
        for assembler in &self.assemblers {
            assembler.accumulate(mesh, time)?;
        }
        Ok(())
    }

    /// Fill `Cell::dt` from the current states.
    pub fn update_time_steps(&self, mesh: &mut Mesh) -> Result<(), SolverError> {
        self.time_step.update_cell_time_steps(
            mesh,
            self.equations.as_ref(),
            self.courant,
            self.time_step_limit,
        )
    }
}
