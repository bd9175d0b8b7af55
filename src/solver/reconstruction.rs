//! Gradient reconstruction of cell averages.
//!
//! - [`PiecewiseConstant`]: first order, face values are cell averages
//! - [`LeastSquares`]: normal-equation gradients over face neighbours,
//!   optionally limited with Barth-Jespersen
//! - [`GreenGaussNodal`]: inverse-distance node values integrated over faces
//!
//! Ghost cells take the gradient of their owner once a reconstruction ends.

use std::sync::Arc;

use faer::{Mat, linalg::solvers::Solve};
use glam::DVec3;
use log::warn;

use super::SolverError;
use super::parallel::{for_each_mut, map_collect};
use crate::mesh::{Cell, Face, Mesh, neighbor_cell};
use crate::types::CellIndex;

/// Refreshes per-cell gradients and evaluates face states.
pub trait SolutionReconstructor: Send + Sync {
    /// Recompute `gradient_u` of every cell from the current averages.
    ///
    /// Ghost states must be current before this is called.
    fn reconstruct(&self, mesh: &mut Mesh) -> Result<(), SolverError>;

    /// Linear estimate of the state of `cell` at `point`.
    fn value_at(&self, cell: &Cell, point: DVec3) -> Vec<f64> {
        let offset = point - cell.centroid();
        cell.u
            .iter()
            .zip(&cell.gradient_u)
            .map(|(u, g)| u + g.dot(offset))
            .collect()
    }

    /// Name of this reconstruction for debugging/logging.
    fn name(&self) -> &'static str;
}

/// Reconstruction selected at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReconstructionKind {
    #[default]
    PiecewiseConstant,
    LeastSquares,
    /// Least squares with the Barth-Jespersen limiter.
    LimitedLeastSquares,
    GreenGaussNodal,
}

pub fn create_reconstructor(kind: ReconstructionKind) -> Arc<dyn SolutionReconstructor> {
    match kind {
        ReconstructionKind::PiecewiseConstant => Arc::new(PiecewiseConstant),
        ReconstructionKind::LeastSquares => Arc::new(LeastSquares::new(false)),
        ReconstructionKind::LimitedLeastSquares => Arc::new(LeastSquares::new(true)),
        ReconstructionKind::GreenGaussNodal => Arc::new(GreenGaussNodal),
    }
}

/// Cell on the other side of `face` seen from `index`.
pub(crate) fn across<'a>(
    cells: &'a [Cell],
    ghosts: &'a [Cell],
    face: &Face,
    index: CellIndex,
) -> &'a Cell {
    if face.left() == index {
        neighbor_cell(cells, ghosts, face.right())
    } else {
        &cells[face.left()]
    }
}

fn copy_gradients_to_ghosts(mesh: &mut Mesh) {
    let parts = mesh.parts_mut();
    let cells: &[Cell] = parts.cells;
    let boundary_faces = &parts.faces[parts.n_internal_faces..];
    for_each_mut(parts.ghosts, |g, ghost| {
        let owner = &cells[boundary_faces[g].left()];
        ghost.gradient_u.clone_from(&owner.gradient_u);
    });
}

fn store_gradients(mesh: &mut Mesh, gradients: Vec<Vec<DVec3>>) {
    for (cell, gradient) in mesh.cells_mut().iter_mut().zip(gradients) {
        cell.gradient_u = gradient;
    }
    copy_gradients_to_ghosts(mesh);
}

// =============================================================================
// Piecewise constant
// =============================================================================

/// First-order reconstruction: every face sees the cell average.
#[derive(Clone, Copy, Debug, Default)]
pub struct PiecewiseConstant;

impl SolutionReconstructor for PiecewiseConstant {
    fn reconstruct(&self, _mesh: &mut Mesh) -> Result<(), SolverError> {
        Ok(())
    }

    fn value_at(&self, cell: &Cell, _point: DVec3) -> Vec<f64> {
        cell.u.clone()
    }

    fn name(&self) -> &'static str {
        "piecewise-constant"
    }
}

// =============================================================================
// Least squares
// =============================================================================

/// Unweighted least-squares gradients over the face neighbours of a cell.
///
/// For each cell the normal equations `(Σ d dᵀ) g = Σ d Δu` are solved with a
/// full-pivot LU, `d` being the centroid offset to a neighbour (ghosts
/// included) restricted to the mesh dimension. A singular stencil yields a
/// zero gradient and a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeastSquares {
    limiter: bool,
}

impl LeastSquares {
    pub fn new(limiter: bool) -> Self {
        Self { limiter }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter
    }

    fn cell_gradient(&self, mesh: &Mesh, index: CellIndex) -> Vec<DVec3> {
        let dim = mesh.dimension();
        let cell = mesh.cell(index);
        let n_vars = cell.num_vars();

        let mut normal = Mat::<f64>::zeros(dim, dim);
        let mut rhs = Mat::<f64>::zeros(dim, n_vars);
        for &f in cell.faces() {
            let other = across(mesh.cells(), mesh.ghosts(), &mesh.faces()[f], index);
            let d = other.centroid() - cell.centroid();
            for i in 0..dim {
                for j in 0..dim {
                    normal[(i, j)] += d[i] * d[j];
                }
                for k in 0..n_vars {
                    rhs[(i, k)] += d[i] * (other.u[k] - cell.u[k]);
                }
            }
        }

        let solution = normal.as_ref().full_piv_lu().solve(&rhs);
        let mut gradient = vec![DVec3::ZERO; n_vars];
        for (k, g) in gradient.iter_mut().enumerate() {
            for i in 0..dim {
                g[i] = solution[(i, k)];
            }
        }

        if gradient.iter().any(|g| !g.is_finite()) {
            warn!(
                "least-squares stencil of cell {} is singular, using a zero gradient",
                index
            );
            return vec![DVec3::ZERO; n_vars];
        }

        if self.limiter {
            barth_jespersen(mesh, index, &mut gradient);
        }
        gradient
    }
}

/// Scale each variable's gradient so that no face value leaves the range of
/// the cell and its neighbours.
fn barth_jespersen(mesh: &Mesh, index: CellIndex, gradient: &mut [DVec3]) {
    let cell = mesh.cell(index);
    for (k, g) in gradient.iter_mut().enumerate() {
        let u = cell.u[k];
        let (mut lo, mut hi) = (u, u);
        for &f in cell.faces() {
            let other = across(mesh.cells(), mesh.ghosts(), &mesh.faces()[f], index);
            lo = lo.min(other.u[k]);
            hi = hi.max(other.u[k]);
        }

        let mut phi: f64 = 1.0;
        for &f in cell.faces() {
            let delta = g.dot(mesh.faces()[f].centroid() - cell.centroid());
            if delta > 0.0 {
                phi = phi.min(((hi - u) / delta).min(1.0));
            } else if delta < 0.0 {
                phi = phi.min(((lo - u) / delta).min(1.0));
            }
        }
        *g *= phi;
    }
}

impl SolutionReconstructor for LeastSquares {
    fn reconstruct(&self, mesh: &mut Mesh) -> Result<(), SolverError> {
        let gradients = {
            let mesh: &Mesh = mesh;
            map_collect(mesh.cells(), |i, _| self.cell_gradient(mesh, CellIndex::new(i)))
        };
        store_gradients(mesh, gradients);
        Ok(())
    }

    fn name(&self) -> &'static str {
        if self.limiter {
            "least-squares-limited"
        } else {
            "least-squares"
        }
    }
}

// =============================================================================
// Green-Gauss with nodal values
// =============================================================================

/// Green-Gauss gradients from node values.
///
/// Node states are inverse-distance averages of the incident cells, kept in
/// [`crate::mesh::Node::state`]. A face value is the mean of its nodes and
/// the gradient is `(1/V) Σ u_f n_f A_f`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreenGaussNodal;

impl GreenGaussNodal {
    fn update_node_states(mesh: &mut Mesh) {
        let parts = mesh.parts_mut();
        let cells: &[Cell] = parts.cells;
        for_each_mut(parts.nodes, |_, node| {
            let position = node.position();
            let (incident, state) = node.cells_and_state_mut();
            let mut total = 0.0;
            state.iter_mut().for_each(|s| *s = 0.0);
            for &c in incident {
                let cell = &cells[c];
                let w = 1.0 / (cell.centroid() - position).length().max(f64::EPSILON);
                total += w;
                for (s, u) in state.iter_mut().zip(&cell.u) {
                    *s += w * u;
                }
            }
            if total > 0.0 {
                state.iter_mut().for_each(|s| *s /= total);
            }
        });
    }
}

impl SolutionReconstructor for GreenGaussNodal {
    fn reconstruct(&self, mesh: &mut Mesh) -> Result<(), SolverError> {
        Self::update_node_states(mesh);

        let gradients = {
            let mesh: &Mesh = mesh;
            map_collect(mesh.cells(), |i, cell| {
                let index = CellIndex::new(i);
                let mut gradient = vec![DVec3::ZERO; cell.num_vars()];
                for &f in cell.faces() {
                    let face = &mesh.faces()[f];
                    let sign = if face.left() == index { 1.0 } else { -1.0 };
                    let weight = sign * face.area() / face.nodes().len() as f64;
                    for &n in face.nodes() {
                        for (g, s) in gradient.iter_mut().zip(&mesh.nodes()[n].state) {
                            *g += weight * s * face.normal();
                        }
                    }
                }
                let inv_volume = 1.0 / cell.volume();
                gradient.iter_mut().for_each(|g| *g *= inv_volume);
                gradient
            })
        };
        store_gradients(mesh, gradients);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "green-gauss-nodal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::structured_2d;

    fn linear(x: DVec3) -> f64 {
        2.0 * x.x + 3.0 * x.y
    }

    fn linear_mesh(nx: usize, ny: usize) -> Mesh {
        let mut mesh = structured_2d([0.0, 1.0, 0.0, 1.0], nx, ny).unwrap();
        mesh.allocate_state(1, 1);
        mesh.set_initial_condition(|x| vec![linear(x)]).unwrap();
        for ghost in mesh.parts_mut().ghosts.iter_mut() {
            ghost.u = vec![linear(ghost.centroid())];
        }
        mesh
    }

    fn assert_gradient(g: DVec3) {
        assert!((g.x - 2.0).abs() < 1e-10, "d/dx = {}", g.x);
        assert!((g.y - 3.0).abs() < 1e-10, "d/dy = {}", g.y);
        assert_eq!(g.z, 0.0);
    }

    #[test]
    fn test_least_squares_exact_for_linear_field() {
        let mut mesh = linear_mesh(4, 3);
        LeastSquares::new(false).reconstruct(&mut mesh).unwrap();
        for cell in mesh.cells() {
            assert_gradient(cell.gradient_u[0]);
        }
        for ghost in mesh.ghosts() {
            assert_gradient(ghost.gradient_u[0]);
        }
    }

    #[test]
    fn test_least_squares_face_values() {
        let mut mesh = linear_mesh(3, 3);
        let reconstructor = LeastSquares::new(false);
        reconstructor.reconstruct(&mut mesh).unwrap();
        for face in mesh.internal_faces() {
            let value = reconstructor.value_at(mesh.cell(face.left()), face.centroid());
            assert!((value[0] - linear(face.centroid())).abs() < 1e-10);
        }
    }

    #[test]
    fn test_limiter_keeps_linear_field_inside_bounds() {
        let mut mesh = linear_mesh(4, 4);
        // A spike at one cell: its limited gradient must not create new extrema.
        mesh.cells_mut()[5].u[0] = 10.0;
        let reconstructor = LeastSquares::new(true);
        reconstructor.reconstruct(&mut mesh).unwrap();

        for (i, cell) in mesh.cells().iter().enumerate() {
            let index = CellIndex::new(i);
            let mut lo = cell.u[0];
            let mut hi = cell.u[0];
            for &f in cell.faces() {
                let other = across(mesh.cells(), mesh.ghosts(), &mesh.faces()[f], index);
                lo = lo.min(other.u[0]);
                hi = hi.max(other.u[0]);
            }
            for &f in cell.faces() {
                let v = reconstructor.value_at(cell, mesh.faces()[f].centroid())[0];
                assert!(v >= lo - 1e-12 && v <= hi + 1e-12, "cell {i}: {v} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn test_green_gauss_exact_on_interior_cell() {
        let mut mesh = linear_mesh(4, 4);
        GreenGaussNodal.reconstruct(&mut mesh).unwrap();
        // Cell (1, 1): every node of it is an interior node.
        assert_gradient(mesh.cells()[4 + 1].gradient_u[0]);
        assert_gradient(mesh.cells()[2 * 4 + 2].gradient_u[0]);
    }

    #[test]
    fn test_node_states_average_incident_cells() {
        let mut mesh = structured_2d([0.0, 1.0, 0.0, 1.0], 3, 2).unwrap();
        mesh.allocate_state(2, 1);
        mesh.set_initial_condition(|_| vec![1.5, -0.25]).unwrap();
        GreenGaussNodal.reconstruct(&mut mesh).unwrap();
        for node in mesh.nodes() {
            assert!(!node.cells().is_empty());
            assert!((node.state[0] - 1.5).abs() < 1e-14);
            assert!((node.state[1] + 0.25).abs() < 1e-14);
        }
        for cell in mesh.cells() {
            assert!(cell.gradient_u.iter().all(|g| g.length() < 1e-12));
        }
    }

    #[test]
    fn test_piecewise_constant_face_value_is_average() {
        let mut mesh = linear_mesh(2, 2);
        PiecewiseConstant.reconstruct(&mut mesh).unwrap();
        let cell = &mesh.cells()[0];
        assert_eq!(PiecewiseConstant.value_at(cell, DVec3::new(5.0, 5.0, 0.0)), cell.u);
    }

    #[test]
    fn test_factory() {
        assert_eq!(
            create_reconstructor(ReconstructionKind::LimitedLeastSquares).name(),
            "least-squares-limited"
        );
        assert_eq!(
            create_reconstructor(ReconstructionKind::default()).name(),
            "piecewise-constant"
        );
    }
}
