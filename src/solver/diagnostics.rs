//! Convergence history of a run.

/// One recorded iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualRecord {
    pub iteration: usize,
    pub time: f64,
    /// Normalised residual per conservative variable.
    pub residual: Vec<f64>,
}

impl ResidualRecord {
    /// Largest component of the residual.
    pub fn max_component(&self) -> f64 {
        self.residual.iter().copied().fold(0.0, f64::max)
    }
}

/// Tracks the residual history for monitoring convergence.
#[derive(Clone, Debug, Default)]
pub struct ConvergenceMonitor {
    history: Vec<ResidualRecord>,
    /// Largest residual component of the first record
    initial_max: Option<f64>,
}

impl ConvergenceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the residual after an iteration.
    pub fn record(&mut self, iteration: usize, time: f64, residual: Vec<f64>) {
        let record = ResidualRecord {
            iteration,
            time,
            residual,
        };
        if self.initial_max.is_none() {
            self.initial_max = Some(record.max_component());
        }
        self.history.push(record);
    }

    pub fn history(&self) -> &[ResidualRecord] {
        &self.history
    }

    pub fn latest(&self) -> Option<&ResidualRecord> {
        self.history.last()
    }

    /// Orders of magnitude the largest residual component has dropped since
    /// the first record. Zero when nothing has been recorded.
    pub fn orders_reduced(&self) -> f64 {
        match (self.initial_max, self.latest()) {
            (Some(first), Some(last)) if first > 0.0 && last.max_component() > 0.0 => {
                (first / last.max_component()).log10()
            }
            _ => 0.0,
        }
    }

    /// Whether the latest residual is below `tolerance` in every component.
    pub fn is_converged(&self, tolerance: f64) -> bool {
        self.latest()
            .is_some_and(|r| r.residual.iter().all(|v| *v < tolerance))
    }

    /// Whether the latest residual contains NaN or infinity.
    pub fn has_diverged(&self) -> bool {
        self.latest()
            .is_some_and(|r| r.residual.iter().any(|v| !v.is_finite()))
    }

    /// One-line summary suitable for progress logging.
    pub fn summary_line(&self) -> String {
        match self.latest() {
            Some(r) => {
                let components: Vec<String> =
                    r.residual.iter().map(|v| format!("{:.3e}", v)).collect();
                format!(
                    "iter={} t={:.4e} res=[{}] drop={:.2}",
                    r.iteration,
                    r.time,
                    components.join(", "),
                    self.orders_reduced()
                )
            }
            None => "no iterations recorded".to_string(),
        }
    }
}
