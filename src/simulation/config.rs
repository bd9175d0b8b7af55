//! Run configuration.

use thiserror::Error;

use crate::solver::TimeStepping;
use crate::time::{ResidualNorm, StandardIntegrator};

/// Invalid [`SolverConfig`] values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("courant number must be finite and positive, got {0}")]
    Courant(f64),

    #[error("time step limit must be positive, got {0}")]
    TimeStepLimit(f64),

    #[error("convergence tolerance must be finite and non-negative, got {0}")]
    Tolerance(f64),

    #[error("max_iterations must be at least 1")]
    NoIterations,
}

/// Configuration of a [`super::Solver`] run.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Courant number of the stable time step.
    pub courant: f64,
    /// Upper bound on every cell's time step.
    pub time_step_limit: f64,
    pub time_stepping: TimeStepping,
    pub integrator: StandardIntegrator,
    /// Norm of the convergence check.
    pub residual_norm: ResidualNorm,
    pub max_iterations: usize,
    /// The run stops once every residual component is below this.
    pub convergence_tolerance: f64,
    /// Iterations between progress log lines, 0 disables them.
    pub report_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            courant: 0.5,
            time_step_limit: f64::INFINITY,
            time_stepping: TimeStepping::Global,
            integrator: StandardIntegrator::SspRk3,
            residual_norm: ResidualNorm::L2,
            max_iterations: 1000,
            convergence_tolerance: 1e-8,
            report_interval: 100,
        }
    }
}

impl SolverConfig {
    pub fn with_courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    pub fn with_time_step_limit(mut self, limit: f64) -> Self {
        self.time_step_limit = limit;
        self
    }

    pub fn with_time_stepping(mut self, time_stepping: TimeStepping) -> Self {
        self.time_stepping = time_stepping;
        self
    }

    pub fn with_integrator(mut self, integrator: StandardIntegrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_residual_norm(mut self, norm: ResidualNorm) -> Self {
        self.residual_norm = norm;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.courant.is_finite() && self.courant > 0.0) {
            return Err(ConfigError::Courant(self.courant));
        }
        // NaN fails the comparison as well.
        if !(self.time_step_limit > 0.0) {
            return Err(ConfigError::TimeStepLimit(self.time_step_limit));
        }
        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance >= 0.0) {
            return Err(ConfigError::Tolerance(self.convergence_tolerance));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        Ok(())
    }
}
