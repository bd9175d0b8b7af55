//! Explicit strong-stability-preserving Runge-Kutta integrators.
//!
//! Every scheme is written in Shu-Osher form. Stage `k` overwrites the cell
//! state with
//! ```text
//! U = a_k U0 + b_k U - c_k (dt / V) R(U)
//! ```
//! where `U0` is the state at the start of the step (kept in `history[0]`)
//! and `R` the assembled residual.
//!
//! # Example
//! ```
//! use fvm_rs::time::{IntegratorInfo, StandardIntegrator};
//!
//! let integrator = StandardIntegrator::SspRk3;
//! assert_eq!(integrator.order(), 3);
//! assert_eq!(integrator.stage_times(0.1), vec![0.0, 0.1, 0.05]);
//! ```

use log::trace;

use crate::mesh::Mesh;
use crate::solver::parallel::{for_each_mut, min_by};
use crate::solver::{SolverError, SpatialDiscretization};

// =============================================================================
// IntegratorInfo Trait
// =============================================================================

/// Static description of a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    fn is_ssp(&self) -> bool;

    /// Times at which the residual is evaluated relative to the current time.
    ///
    /// For SSP-RK3: [0, dt, dt/2]
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Advances the cell averages of a mesh by one step.
pub trait TimeIntegrator: IntegratorInfo {
    /// Advance every interior cell by its `dt`, computed in the first stage.
    ///
    /// Returns the smallest time step taken.
    fn update_cell_averages(
        &self,
        mesh: &mut Mesh,
        spatial: &SpatialDiscretization,
        time: f64,
    ) -> Result<f64, SolverError>;
}

/// Shu-Osher coefficients of one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageCoefficients {
    /// Weight of the state at the start of the step.
    pub initial: f64,
    /// Weight of the previous stage's state.
    pub previous: f64,
    /// Weight of `dt / V * R(previous)`.
    pub residual: f64,
}

const fn stage(initial: f64, previous: f64, residual: f64) -> StageCoefficients {
    StageCoefficients {
        initial,
        previous,
        residual,
    }
}

const EULER_STAGES: [StageCoefficients; 1] = [stage(0.0, 1.0, 1.0)];
const SSP_RK2_STAGES: [StageCoefficients; 2] = [stage(0.0, 1.0, 1.0), stage(0.5, 0.5, 0.5)];
const SSP_RK3_STAGES: [StageCoefficients; 3] = [
    stage(0.0, 1.0, 1.0),
    stage(0.75, 0.25, 0.25),
    stage(1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0),
];

/// Copy the current state into `history[0]`.
fn snapshot(mesh: &mut Mesh) {
    for_each_mut(mesh.cells_mut(), |_, cell| {
        if cell.history.is_empty() {
            cell.history.push(cell.u.clone());
        } else {
            cell.history[0].clone_from(&cell.u);
        }
    });
}

fn apply_stage(mesh: &mut Mesh, coefficients: StageCoefficients) {
    let StageCoefficients {
        initial,
        previous,
        residual,
    } = coefficients;
    for_each_mut(mesh.cells_mut(), |_, cell| {
        let scale = residual * cell.dt / cell.volume();
        for ((u, u0), r) in cell.u.iter_mut().zip(&cell.history[0]).zip(&cell.residual) {
            *u = initial * u0 + previous * *u - scale * r;
        }
    });
}

/// Run a Shu-Osher stage table.
fn advance(
    integrator: &dyn IntegratorInfo,
    stages: &[StageCoefficients],
    mesh: &mut Mesh,
    spatial: &SpatialDiscretization,
    time: f64,
) -> Result<f64, SolverError> {
    spatial.check_state(mesh)?;
    snapshot(mesh);

    let mut dt = 0.0;
    let mut stage_times = vec![0.0; stages.len()];
    for (k, coefficients) in stages.iter().enumerate() {
        spatial.clear_residuals(mesh);
        spatial.assemble_residual(mesh, time + stage_times[k])?;
        if k == 0 {
            spatial.update_time_steps(mesh)?;
            dt = min_by(mesh.cells(), |c| c.dt);
            stage_times = integrator.stage_times(dt);
        }
        apply_stage(mesh, *coefficients);
        trace!("{} stage {} done (dt = {:.3e})", integrator.name(), k + 1, dt);
    }
    Ok(dt)
}

// =============================================================================
// Schemes
// =============================================================================

/// Forward Euler (1st order).
///
/// ```text
/// U = U0 - (dt / V) R(U0)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ExplicitEuler;

impl IntegratorInfo for ExplicitEuler {
    fn name(&self) -> &'static str {
        "explicit-euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn n_stages(&self) -> usize {
        1
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, _dt: f64) -> Vec<f64> {
        vec![0.0]
    }
}

impl TimeIntegrator for ExplicitEuler {
    fn update_cell_averages(
        &self,
        mesh: &mut Mesh,
        spatial: &SpatialDiscretization,
        time: f64,
    ) -> Result<f64, SolverError> {
        advance(self, &EULER_STAGES, mesh, spatial, time)
    }
}

/// Two-stage SSP Runge-Kutta (Heun).
///
/// ```text
/// U1    = U0 - (dt / V) R(U0)
/// U_new = 1/2 (U0 + U1 - (dt / V) R(U1))
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SspRk2;

impl IntegratorInfo for SspRk2 {
    fn name(&self) -> &'static str {
        "ssp-rk2"
    }

    fn order(&self) -> usize {
        2
    }

    fn n_stages(&self) -> usize {
        2
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt]
    }
}

impl TimeIntegrator for SspRk2 {
    fn update_cell_averages(
        &self,
        mesh: &mut Mesh,
        spatial: &SpatialDiscretization,
        time: f64,
    ) -> Result<f64, SolverError> {
        advance(self, &SSP_RK2_STAGES, mesh, spatial, time)
    }
}

/// Three-stage SSP Runge-Kutta (Shu-Osher).
///
/// ```text
/// U1    = U0 - (dt / V) R(U0)
/// U2    = 3/4 U0 + 1/4 U1 - 1/4 (dt / V) R(U1)
/// U_new = 1/3 U0 + 2/3 U2 - 2/3 (dt / V) R(U2)
/// ```
///
/// Stage times: t, t + dt, t + dt/2
#[derive(Clone, Copy, Debug, Default)]
pub struct SspRk3;

impl IntegratorInfo for SspRk3 {
    fn name(&self) -> &'static str {
        "ssp-rk3"
    }

    fn order(&self) -> usize {
        3
    }

    fn n_stages(&self) -> usize {
        3
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt, 0.5 * dt]
    }
}

impl TimeIntegrator for SspRk3 {
    fn update_cell_averages(
        &self,
        mesh: &mut Mesh,
        spatial: &SpatialDiscretization,
        time: f64,
    ) -> Result<f64, SolverError> {
        advance(self, &SSP_RK3_STAGES, mesh, spatial, time)
    }
}

// =============================================================================
// Standard Integrator Enum
// =============================================================================

/// Enum wrapper for built-in integrators, for runtime selection via configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StandardIntegrator {
    /// Forward Euler (1st order, for testing)
    ExplicitEuler,
    SspRk2,
    /// SSP-RK3 (default, recommended for hyperbolic problems)
    #[default]
    SspRk3,
}

impl StandardIntegrator {
    fn scheme(&self) -> &dyn TimeIntegrator {
        match self {
            StandardIntegrator::ExplicitEuler => &ExplicitEuler,
            StandardIntegrator::SspRk2 => &SspRk2,
            StandardIntegrator::SspRk3 => &SspRk3,
        }
    }
}

impl IntegratorInfo for StandardIntegrator {
    fn name(&self) -> &'static str {
        self.scheme().name()
    }

    fn order(&self) -> usize {
        self.scheme().order()
    }

    fn n_stages(&self) -> usize {
        self.scheme().n_stages()
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        self.scheme().stage_times(dt)
    }
}

impl TimeIntegrator for StandardIntegrator {
    fn update_cell_averages(
        &self,
        mesh: &mut Mesh,
        spatial: &SpatialDiscretization,
        time: f64,
    ) -> Result<f64, SolverError> {
        self.scheme().update_cell_averages(mesh, spatial, time)
    }
}
