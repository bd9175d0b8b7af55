//! Error types for flux evaluation, assembly and time stepping.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::mesh::MeshError;
use crate::simulation::ConfigError;

/// Errors raised while advancing a solution.
///
/// Numerical-state variants carry the offending states for diagnosis.
#[derive(Error, Debug)]
pub enum SolverError {
    /// A state or wave speed is NaN or infinite.
    #[error("{solver}: non-finite state or wave speed (left = {left:?}, right = {right:?})")]
    NonFiniteState {
        solver: &'static str,
        left: Vec<f64>,
        right: Vec<f64>,
    },

    /// Wave-speed estimates leave no non-empty Riemann fan.
    #[error(
        "{solver}: degenerate wave speeds SL = {sl}, SR = {sr} (left = {left:?}, right = {right:?})"
    )]
    DegenerateWaveSpeeds {
        solver: &'static str,
        sl: f64,
        sr: f64,
        left: Vec<f64>,
        right: Vec<f64>,
    },

    /// No branch of an HLLC fan matched the wave speeds.
    #[error(
        "{solver}: no fan branch for SL = {sl}, S* = {s_star}, SR = {sr} (left = {left:?}, right = {right:?})"
    )]
    UnresolvedFan {
        solver: &'static str,
        sl: f64,
        s_star: f64,
        sr: f64,
        left: Vec<f64>,
        right: Vec<f64>,
    },

    /// A boundary with faces has no boundary condition attached.
    #[error("boundary '{0}' has no boundary condition")]
    MissingBoundaryCondition(String),

    /// The stable time step of a cell is not finite.
    #[error("cell {cell}: time step {dt} is not finite (no wave speed, diffusivity or limit bounds it)")]
    UnboundedTimeStep { cell: usize, dt: f64 },

    /// State vector has the wrong number of variables.
    #[error("state has {found} variables, equations expect {expected}")]
    StateSize { expected: usize, found: usize },

    /// Mesh configuration error.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Geometry error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Invalid solver configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The convergence norm became NaN or infinite.
    #[error("solution diverged at iteration {iteration} (residual = {residual:?})")]
    Diverged { iteration: usize, residual: Vec<f64> },
}

impl SolverError {
    pub(crate) fn non_finite(solver: &'static str, left: &[f64], right: &[f64]) -> Self {
        Self::NonFiniteState {
            solver,
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
