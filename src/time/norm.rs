//! Convergence norms of the last step.

use crate::mesh::Mesh;

/// Smallest divisor used when normalising by the mean state magnitude.
pub const NORMALIZATION_FLOOR: f64 = 1e-12;

/// Norm used to reduce per-cell residuals over the domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResidualNorm {
    /// Mean absolute rate of change.
    L1,
    /// Root mean square rate of change.
    #[default]
    L2,
    /// Largest rate of change.
    LInf,
}

impl ResidualNorm {
    pub fn name(&self) -> &'static str {
        match self {
            ResidualNorm::L1 => "L1",
            ResidualNorm::L2 => "L2",
            ResidualNorm::LInf => "Linf",
        }
    }
}

/// Rate of change of the last step, one value per conservative variable.
///
/// Each cell contributes `|U - U0| / dt`, `U0` being `history[0]`. Cells
/// are reduced with `norm`, then every component is divided by the domain
/// mean of `|U|` (floored at [`NORMALIZATION_FLOOR`]). Cells that have not
/// taken a step yet (`dt == 0`) contribute zero.
pub fn current_total_residual(mesh: &Mesh, norm: ResidualNorm) -> Vec<f64> {
    let n_vars = mesh.num_vars();
    let n_cells = mesh.cells().len();
    if n_vars == 0 || n_cells == 0 {
        return vec![0.0; n_vars];
    }

    let mut reduced = vec![0.0; n_vars];
    let mut magnitude = vec![0.0; n_vars];
    for cell in mesh.cells() {
        for k in 0..n_vars {
            magnitude[k] += cell.u[k].abs();
            let rate = match cell.history.first() {
                Some(u0) if cell.dt > 0.0 => (cell.u[k] - u0[k]).abs() / cell.dt,
                _ => 0.0,
            };
            match norm {
                ResidualNorm::L1 => reduced[k] += rate,
                ResidualNorm::L2 => reduced[k] += rate * rate,
                ResidualNorm::LInf => reduced[k] = f64::max(reduced[k], rate),
            }
        }
    }

    let n = n_cells as f64;
    reduced
        .into_iter()
        .zip(magnitude)
        .map(|(r, m)| {
            let r = match norm {
                ResidualNorm::L1 => r / n,
                ResidualNorm::L2 => (r / n).sqrt(),
                ResidualNorm::LInf => r,
            };
            r / (m / n).max(NORMALIZATION_FLOOR)
        })
        .collect()
}
