//! Residual assemblers.
//!
//! Residuals follow one sign convention: an explicit update reads
//! `U -= dt / V * residual`. Convective fluxes leaving a cell add to its
//! residual; sources and viscous fluxes enter with the opposite sign.
//! Assemblers only accumulate; the integrator clears residuals between stages.

use std::sync::Arc;

use super::SolverError;
use super::parallel::{for_each_mut, map_collect, try_for_each_mut};
use super::reconstruction::SolutionReconstructor;
use crate::boundary::{BoundaryCondition, BoundaryContext};
use crate::equations::GoverningEquations;
use crate::flux::SharedRiemannSolver;
use crate::mesh::{Boundary, Cell, Face, Mesh, neighbor_cell};
use crate::types::CellIndex;

/// One contribution to the cell residuals.
pub trait ResidualAssembler: Send + Sync {
    /// Add this contribution to every cell's `residual`.
    fn accumulate(&self, mesh: &mut Mesh, time: f64) -> Result<(), SolverError>;

    /// Name of this assembler for debugging/logging.
    fn name(&self) -> &'static str;
}

fn condition_of<'a>(
    boundaries: &'a [Boundary],
    face: &Face,
) -> Result<&'a dyn BoundaryCondition, SolverError> {
    match face.boundary() {
        Some(b) => {
            let boundary = &boundaries[b];
            boundary
                .condition()
                .map(|bc| bc.as_ref())
                .ok_or_else(|| SolverError::MissingBoundaryCondition(boundary.name().to_string()))
        }
        None => Err(SolverError::MissingBoundaryCondition(format!(
            "<none> (face {})",
            face.index()
        ))),
    }
}

/// Fill every ghost cell from the boundary condition of its face.
///
/// A boundary that owns faces but has no condition attached is an error.
pub fn update_ghost_cells(mesh: &mut Mesh, time: f64) -> Result<(), SolverError> {
    let parts = mesh.parts_mut();
    let cells: &[Cell] = &*parts.cells;
    let boundaries = parts.boundaries;
    let boundary_faces = &parts.faces[parts.n_internal_faces..];

    try_for_each_mut(parts.ghosts, |g, ghost| {
        let face = &boundary_faces[g];
        let condition = condition_of(boundaries, face)?;
        let ctx = BoundaryContext::new(face, &cells[face.left()], time);
        ghost.u = condition.ghost_state(&ctx);
        Ok(())
    })
}

// =============================================================================
// Convection
// =============================================================================

/// Convective residual: Riemann fluxes on internal faces, boundary-condition
/// fluxes on boundary faces, summed as `±flux·area` per cell.
#[derive(Clone)]
pub struct ConvectionResidual {
    solver: SharedRiemannSolver,
    reconstructor: Arc<dyn SolutionReconstructor>,
}

impl ConvectionResidual {
    pub fn new(solver: SharedRiemannSolver, reconstructor: Arc<dyn SolutionReconstructor>) -> Self {
        Self {
            solver,
            reconstructor,
        }
    }

    pub fn solver(&self) -> &SharedRiemannSolver {
        &self.solver
    }

    fn compute_face_fluxes(&self, mesh: &mut Mesh, time: f64) -> Result<(), SolverError> {
        let parts = mesh.parts_mut();
        let cells: &[Cell] = &*parts.cells;
        let ghosts: &[Cell] = &*parts.ghosts;
        let boundaries = parts.boundaries;
        let n_internal = parts.n_internal_faces;
        let solver = self.solver.as_ref();
        let reconstructor = self.reconstructor.as_ref();

        try_for_each_mut(parts.faces, |f, face| {
            let flux = if f < n_internal {
                let x = face.centroid();
                let ul = reconstructor.value_at(&cells[face.left()], x);
                let ur = reconstructor.value_at(neighbor_cell(cells, ghosts, face.right()), x);
                solver.flux(&ul, &ur, face.surface())?
            } else {
                let condition = condition_of(boundaries, face)?;
                let ctx = BoundaryContext::new(face, &cells[face.left()], time);
                condition.convective_flux(&ctx)?
            };
            face.flux = flux;
            Ok(())
        })
    }
}

impl ResidualAssembler for ConvectionResidual {
    fn accumulate(&self, mesh: &mut Mesh, time: f64) -> Result<(), SolverError> {
        update_ghost_cells(mesh, time)?;
        self.reconstructor.reconstruct(mesh)?;
        self.compute_face_fluxes(mesh, time)?;

        let parts = mesh.parts_mut();
        let faces: &[Face] = &*parts.faces;
        for_each_mut(parts.cells, |i, cell| {
            let index = CellIndex::new(i);
            let (incident, residual) = cell.faces_and_residual();
            for &f in incident {
                let face = &faces[f];
                let scale = if face.left() == index {
                    face.area()
                } else {
                    -face.area()
                };
                for (r, flux) in residual.iter_mut().zip(&face.flux) {
                    *r += scale * flux;
                }
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "convection"
    }
}

// =============================================================================
// Source
// =============================================================================

/// Volumetric source residual: `residual -= S(x, U, ∇U) · V`.
#[derive(Clone)]
pub struct SourceResidual {
    equations: Arc<dyn GoverningEquations>,
}

impl SourceResidual {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }
}

impl ResidualAssembler for SourceResidual {
    fn accumulate(&self, mesh: &mut Mesh, _time: f64) -> Result<(), SolverError> {
        let source = self.equations.source();
        for_each_mut(mesh.cells_mut(), |_, cell| {
            let s = source.source_vector(cell.centroid(), &cell.u, &cell.gradient_u);
            let volume = cell.volume();
            for (r, s) in cell.residual.iter_mut().zip(s) {
                *r -= s * volume;
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "source"
    }
}

// =============================================================================
// Diffusion
// =============================================================================

/// Viscous residual from the [`crate::equations::Diffusion`] contract.
///
/// The face state is the mean of both sides. The face gradient is the mean
/// gradient with its component along the centroid-to-centroid direction
/// replaced by the two-point difference, so piecewise-constant runs still
/// diffuse. `flux·area` is subtracted from `left` and added to `right`.
#[derive(Clone)]
pub struct DiffusionResidual {
    equations: Arc<dyn GoverningEquations>,
}

impl DiffusionResidual {
    pub fn new(equations: Arc<dyn GoverningEquations>) -> Self {
        Self { equations }
    }

    fn face_flux(&self, left: &Cell, right: &Cell, face: &Face) -> Vec<f64> {
        let d = right.centroid() - left.centroid();
        let distance = d.length();
        let e = d / distance;

        let u: Vec<f64> = left
            .u
            .iter()
            .zip(&right.u)
            .map(|(a, b)| 0.5 * (a + b))
            .collect();
        let gradient: Vec<_> = left
            .gradient_u
            .iter()
            .zip(&right.gradient_u)
            .zip(left.u.iter().zip(&right.u))
            .map(|((gl, gr), (ul, ur))| {
                let mean = 0.5 * (*gl + *gr);
                mean + ((ur - ul) / distance - mean.dot(e)) * e
            })
            .collect();

        self.equations.diffusion().flux(&u, &gradient, face.normal())
    }
}

impl ResidualAssembler for DiffusionResidual {
    fn accumulate(&self, mesh: &mut Mesh, _time: f64) -> Result<(), SolverError> {
        let fluxes = {
            let mesh: &Mesh = mesh;
            map_collect(mesh.faces(), |_, face| {
                self.face_flux(mesh.cell(face.left()), mesh.neighbor(face.right()), face)
            })
        };

        let parts = mesh.parts_mut();
        let faces: &[Face] = &*parts.faces;
        for_each_mut(parts.cells, |i, cell| {
            let index = CellIndex::new(i);
            let (incident, residual) = cell.faces_and_residual();
            for &f in incident {
                let face = &faces[f];
                let scale = if face.left() == index {
                    -face.area()
                } else {
                    face.area()
                };
                for (r, flux) in residual.iter_mut().zip(&fluxes[f.get()]) {
                    *r += scale * flux;
                }
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "diffusion"
    }
}
