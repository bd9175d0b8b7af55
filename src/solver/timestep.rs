//! Stable explicit time steps.
//!
//! Per cell:
//! ```text
//! dt = courant * V / (Σ λ_f A_f + 4 Σ D_f A_f² / V)
//! ```
//! clamped to an external limit. `λ_f` and `D_f` are cached on the faces.

use super::SolverError;
use super::parallel::{for_each_mut, min_by, try_for_each_mut};
use crate::equations::GoverningEquations;
use crate::flux::traits::all_finite;
use crate::mesh::{Cell, Face, Mesh, neighbor_cell};

/// Fills `Cell::dt` for every interior cell.
pub trait TimeStepCalculator: Send + Sync {
    fn update_cell_time_steps(
        &self,
        mesh: &mut Mesh,
        equations: &dyn GoverningEquations,
        courant: f64,
        limit: f64,
    ) -> Result<(), SolverError>;

    fn name(&self) -> &'static str;
}

/// Time stepping strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeStepping {
    /// Every cell advances with its own stable step (pseudo-time marching).
    Local,
    /// Every cell advances with the smallest stable step (time accurate).
    #[default]
    Global,
}

impl TimeStepping {
    pub fn calculator(self) -> Box<dyn TimeStepCalculator> {
        match self {
            TimeStepping::Local => Box::new(LocalTimeStep),
            TimeStepping::Global => Box::new(GlobalTimeStep),
        }
    }
}

/// Cache the largest eigenvalue and diffusivity of both sides on every face.
///
/// A non-finite value on either side is an error rather than being masked
/// by the other side's radius.
fn update_face_spectral_radii(
    mesh: &mut Mesh,
    equations: &dyn GoverningEquations,
) -> Result<(), SolverError> {
    let parts = mesh.parts_mut();
    let cells: &[Cell] = &*parts.cells;
    let ghosts: &[Cell] = &*parts.ghosts;
    let convection = equations.convection();
    let diffusion = equations.diffusion();

    try_for_each_mut(parts.faces, |_, face| {
        let left = &cells[face.left()];
        let right = neighbor_cell(cells, ghosts, face.right());
        let n = face.normal();
        let radii = [
            convection.max_abs_eigenvalue(&left.u, n),
            convection.max_abs_eigenvalue(&right.u, n),
            diffusion.max_abs_diffusivity(&left.u),
            diffusion.max_abs_diffusivity(&right.u),
        ];
        if !all_finite(&radii) {
            return Err(SolverError::non_finite("time step", &left.u, &right.u));
        }
        face.max_abs_eigenvalue = radii[0].max(radii[1]);
        face.diffusivity = radii[2].max(radii[3]);
        Ok(())
    })
}

/// Each cell gets its own stable step.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTimeStep;

impl TimeStepCalculator for LocalTimeStep {
    fn update_cell_time_steps(
        &self,
        mesh: &mut Mesh,
        equations: &dyn GoverningEquations,
        courant: f64,
        limit: f64,
    ) -> Result<(), SolverError> {
        update_face_spectral_radii(mesh, equations)?;

        let parts = mesh.parts_mut();
        let faces: &[Face] = &*parts.faces;
        try_for_each_mut(parts.cells, |i, cell| {
            let volume = cell.volume();
            let (mut convective, mut diffusive) = (0.0, 0.0);
            for &f in cell.faces() {
                let face = &faces[f];
                convective += face.max_abs_eigenvalue * face.area();
                diffusive += face.diffusivity * face.area() * face.area();
            }
            diffusive /= volume;

            let dt = (courant * volume / (convective + 4.0 * diffusive)).min(limit);
            if !dt.is_finite() || dt <= 0.0 {
                return Err(SolverError::UnboundedTimeStep { cell: i, dt });
            }
            cell.dt = dt;
            Ok(())
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// The smallest local step, applied to every cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalTimeStep;

impl TimeStepCalculator for GlobalTimeStep {
    fn update_cell_time_steps(
        &self,
        mesh: &mut Mesh,
        equations: &dyn GoverningEquations,
        courant: f64,
        limit: f64,
    ) -> Result<(), SolverError> {
        LocalTimeStep.update_cell_time_steps(mesh, equations, courant, limit)?;
        let dt = min_by(mesh.cells(), |c| c.dt);
        for_each_mut(mesh.cells_mut(), |_, cell| cell.dt = dt);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "global"
    }
}
