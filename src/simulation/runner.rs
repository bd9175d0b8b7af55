//! Pseudo-time / physical-time run driver.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use super::SolverConfig;
use crate::equations::GoverningEquations;
use crate::mesh::Mesh;
use crate::solver::{
    ConvergenceMonitor, ResidualAssembler, SolverError, SpatialDiscretization,
};
use crate::time::{IntegratorInfo, ResidualNorm, TimeIntegrator, current_total_residual};

// =============================================================================
// Run Summary
// =============================================================================

/// Result of [`Solver::run`].
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Iterations taken by this run.
    pub iterations: usize,
    /// Physical time reached.
    pub final_time: f64,
    /// Whether the convergence tolerance was met.
    pub converged: bool,
    /// Residual of the last iteration in the configured norm.
    pub final_residual: Vec<f64>,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
}

// =============================================================================
// Solver
// =============================================================================

/// Mesh, spatial operator and integrator advanced together.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fvm_rs::boundary::Extrapolated;
/// use fvm_rs::equations::{GoverningEquations, ScalarAdvection};
/// use fvm_rs::flux::{RiemannSolverKind, create_riemann_solver};
/// use fvm_rs::mesh::structured_1d;
/// use fvm_rs::simulation::{Solver, SolverConfig};
/// use fvm_rs::solver::{ConvectionResidual, PiecewiseConstant};
/// use glam::DVec3;
///
/// let eq: Arc<dyn GoverningEquations> = Arc::new(ScalarAdvection::new(DVec3::X, 0.0));
/// let mut mesh = structured_1d(0.0, 1.0, 10).unwrap();
/// mesh.allocate_state(1, 1);
/// mesh.set_initial_condition(|_| vec![1.0]).unwrap();
/// for name in ["left", "right"] {
///     mesh.set_boundary_condition(name, Arc::new(Extrapolated::new(eq.clone()))).unwrap();
/// }
///
/// let convection = ConvectionResidual::new(
///     create_riemann_solver(RiemannSolverKind::Rusanov, eq.clone()),
///     Arc::new(PiecewiseConstant),
/// );
/// let mut solver = Solver::new(mesh, eq, SolverConfig::default().with_max_iterations(5))
///     .unwrap()
///     .with_assembler(convection);
///
/// let summary = solver.run().unwrap();
/// assert!(summary.converged); // a uniform state is already steady
/// ```
pub struct Solver {
    mesh: Mesh,
    spatial: SpatialDiscretization,
    config: SolverConfig,
    time: f64,
    iteration: usize,
    monitor: ConvergenceMonitor,
}

impl Solver {
    /// Validate `config` and check that `mesh` is allocated for `equations`.
    pub fn new(
        mesh: Mesh,
        equations: Arc<dyn GoverningEquations>,
        config: SolverConfig,
    ) -> Result<Self, SolverError> {
        config.validate()?;
        let spatial = SpatialDiscretization::new(equations, config.time_stepping, config.courant)
            .with_time_step_limit(config.time_step_limit);
        spatial.check_state(&mesh)?;

        Ok(Self {
            mesh,
            spatial,
            config,
            time: 0.0,
            iteration: 0,
            monitor: ConvergenceMonitor::new(),
        })
    }

    /// Append a residual assembler; assemblers run in insertion order.
    pub fn with_assembler<A: ResidualAssembler + 'static>(mut self, assembler: A) -> Self {
        self.spatial = self.spatial.with_assembler(assembler);
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn spatial(&self) -> &SpatialDiscretization {
        &self.spatial
    }

    pub fn monitor(&self) -> &ConvergenceMonitor {
        &self.monitor
    }

    /// Physical time reached.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Steps taken so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Advance one step with the configured integrator. Returns the step size.
    pub fn update_cell_averages(&mut self) -> Result<f64, SolverError> {
        let dt = self
            .config
            .integrator
            .update_cell_averages(&mut self.mesh, &self.spatial, self.time)?;
        self.time += dt;
        self.iteration += 1;
        Ok(dt)
    }

    /// Normalised rate of change of the last step.
    pub fn current_total_residual(&self, norm: ResidualNorm) -> Vec<f64> {
        current_total_residual(&self.mesh, norm)
    }

    /// Step until the configured residual norm drops below the tolerance or
    /// `max_iterations` steps have been taken.
    pub fn run(&mut self) -> Result<RunSummary, SolverError> {
        let start_wall = Instant::now();
        let start_iteration = self.iteration;

        info!(
            "Starting run: {} with {} integrator, {} time stepping, assemblers {:?}",
            self.spatial.equations().name(),
            self.config.integrator.name(),
            self.spatial.time_step_name(),
            self.spatial.assembler_names()
        );
        debug!(
            "  {} cells, {} faces, courant = {}",
            self.mesh.cells().len(),
            self.mesh.faces().len(),
            self.config.courant
        );

        let mut converged = false;
        let mut residual = vec![0.0; self.mesh.num_vars()];
        for _ in 0..self.config.max_iterations {
            self.update_cell_averages()?;
            residual = self.current_total_residual(self.config.residual_norm);
            self.monitor.record(self.iteration, self.time, residual.clone());

            if self.monitor.has_diverged() {
                return Err(SolverError::Diverged {
                    iteration: self.iteration,
                    residual,
                });
            }

            let report = self.config.report_interval;
            if report > 0 && self.iteration % report == 0 {
                info!("{}", self.monitor.summary_line());
            }

            if self.monitor.is_converged(self.config.convergence_tolerance) {
                converged = true;
                break;
            }
        }

        let wall_time = start_wall.elapsed().as_secs_f64();
        let iterations = self.iteration - start_iteration;
        if converged {
            info!(
                "Converged after {} iterations ({:.2}s): {}",
                iterations,
                wall_time,
                self.monitor.summary_line()
            );
        } else {
            warn!(
                "Not converged after {} iterations ({:.2}s): {}",
                iterations,
                wall_time,
                self.monitor.summary_line()
            );
        }

        Ok(RunSummary {
            iterations,
            final_time: self.time,
            converged,
            final_residual: residual,
            wall_time,
        })
    }
}
