//! Unstructured mesh topology.
//!
//! Provides the arena-backed cell/face/node/boundary graph:
//! - [`MeshBuilder`]: raw connectivity to a finalised [`Mesh`], with face
//!   deduplication and ghost-cell synthesis
//! - [`structured_1d`] / [`structured_2d`]: uniform generators
//! - [`read_mesh`] / [`parse_mesh`]: line-oriented ASCII mesh files
//!
//! Ghost cells live in their own arena and are reachable only through the
//! `right` side of boundary faces.

mod builder;
mod entities;
mod reader;
mod structured;

use std::sync::Arc;

use glam::DVec3;
use thiserror::Error;

use crate::boundary::BoundaryCondition;
use crate::geometry::{GeometryError, VtkCellType};
use crate::types::{BoundaryIndex, CellIndex, IndexError};

pub use builder::{Connectivity, MeshBuilder};
pub use entities::{Boundary, Cell, CellKind, Face, Neighbor, Node};
pub use reader::{parse_mesh, read_mesh};
pub use structured::{structured_1d, structured_2d};

/// Errors raised while building or configuring a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh dimension must be 1, 2 or 3, got {0}")]
    InvalidDimension(usize),

    #[error("{entity} is a {shape:?}, expected a {expected}D shape")]
    DimensionMismatch {
        entity: String,
        shape: VtkCellType,
        expected: usize,
    },

    #[error("node {node} out of range ({n_nodes} nodes)")]
    NodeOutOfRange { node: usize, n_nodes: usize },

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("face {nodes:?} is shared by more than two cells")]
    NonManifoldFace { nodes: Vec<usize> },

    #[error("could not locate boundary face {nodes:?} of boundary '{boundary}' in mesh")]
    BoundaryFaceNotFound { boundary: String, nodes: Vec<usize> },

    #[error("face {nodes:?} claimed twice (second claim by boundary '{boundary}')")]
    DuplicateBoundaryFace { boundary: String, nodes: Vec<usize> },

    #[error("face {nodes:?} has a single owner but belongs to no boundary")]
    UnclaimedBoundaryFace { nodes: Vec<usize> },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("entity left without an index after finalisation")]
    UnassignedIndex,

    #[error("unknown boundary '{0}'")]
    UnknownBoundary(String),

    #[error("state has {found} variables, mesh is allocated for {expected}")]
    StateSize { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Finalised mesh.
///
/// Faces are stored internal first; boundary faces follow, grouped by
/// boundary in declaration order. Ghost `g` belongs to boundary face
/// `n_internal_faces + g`.
#[derive(Clone, Debug)]
pub struct Mesh {
    dimension: usize,
    nodes: Vec<Node>,
    cells: Vec<Cell>,
    faces: Vec<Face>,
    n_internal_faces: usize,
    ghosts: Vec<Cell>,
    boundaries: Vec<Boundary>,
    num_vars: usize,
}

/// Disjoint mutable views of the mesh arenas, for stage-parallel loops.
pub struct MeshPartsMut<'a> {
    pub nodes: &'a mut [Node],
    pub cells: &'a mut [Cell],
    pub faces: &'a mut [Face],
    pub ghosts: &'a mut [Cell],
    pub boundaries: &'a [Boundary],
    pub n_internal_faces: usize,
}

/// Resolve the right side of a face.
#[inline]
pub fn neighbor_cell<'a>(cells: &'a [Cell], ghosts: &'a [Cell], neighbor: Neighbor) -> &'a Cell {
    match neighbor {
        Neighbor::Cell(c) => &cells[c],
        Neighbor::Ghost(g) => &ghosts[g],
    }
}

impl Mesh {
    pub(crate) fn from_parts(
        dimension: usize,
        nodes: Vec<Node>,
        cells: Vec<Cell>,
        faces: Vec<Face>,
        n_internal_faces: usize,
        ghosts: Vec<Cell>,
        boundaries: Vec<Boundary>,
    ) -> Self {
        Self {
            dimension,
            nodes,
            cells,
            faces,
            n_internal_faces,
            ghosts,
            boundaries,
            num_vars: 0,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Interior cells. Ghost cells are not included.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// All faces, internal first.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn internal_faces(&self) -> &[Face] {
        &self.faces[..self.n_internal_faces]
    }

    #[inline]
    pub fn boundary_faces(&self) -> &[Face] {
        &self.faces[self.n_internal_faces..]
    }

    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.n_internal_faces
    }

    #[inline]
    pub fn ghosts(&self) -> &[Cell] {
        &self.ghosts
    }

    #[inline]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn boundary(&self, name: &str) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.name() == name)
    }

    pub fn boundary_index(&self, name: &str) -> Option<BoundaryIndex> {
        self.boundaries
            .iter()
            .position(|b| b.name() == name)
            .map(BoundaryIndex::new)
    }

    /// Cell on the right side of a face.
    #[inline]
    pub fn neighbor(&self, neighbor: Neighbor) -> &Cell {
        neighbor_cell(&self.cells, &self.ghosts, neighbor)
    }

    #[inline]
    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[index]
    }

    /// Number of conservative variables allocated, 0 before [`Mesh::allocate_state`].
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Sum of interior cell volumes.
    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(Cell::volume).sum()
    }

    /// Size every numeric buffer for `num_vars` variables and zero it.
    pub fn allocate_state(&mut self, num_vars: usize, history_levels: usize) {
        self.num_vars = num_vars;
        for cell in self.cells.iter_mut().chain(self.ghosts.iter_mut()) {
            cell.allocate(num_vars, history_levels);
        }
        for face in &mut self.faces {
            face.allocate(num_vars);
        }
        for node in &mut self.nodes {
            node.state = vec![0.0; num_vars];
        }
    }

    /// Set every interior cell's state from its centroid.
    pub fn set_initial_condition<F>(&mut self, initial: F) -> Result<(), MeshError>
    where
        F: Fn(DVec3) -> Vec<f64>,
    {
        for cell in &mut self.cells {
            let u = initial(cell.centroid());
            if u.len() != self.num_vars {
                return Err(MeshError::StateSize {
                    expected: self.num_vars,
                    found: u.len(),
                });
            }
            cell.u = u;
        }
        Ok(())
    }

    /// Attach a boundary condition to the named boundary.
    pub fn set_boundary_condition(
        &mut self,
        name: &str,
        condition: Arc<dyn BoundaryCondition>,
    ) -> Result<(), MeshError> {
        let boundary = self
            .boundaries
            .iter_mut()
            .find(|b| b.name() == name)
            .ok_or_else(|| MeshError::UnknownBoundary(name.to_string()))?;
        boundary.set_condition(condition);
        Ok(())
    }

    /// Mutable views of every arena at once.
    pub fn parts_mut(&mut self) -> MeshPartsMut<'_> {
        MeshPartsMut {
            nodes: &mut self.nodes,
            cells: &mut self.cells,
            faces: &mut self.faces,
            ghosts: &mut self.ghosts,
            boundaries: &self.boundaries,
            n_internal_faces: self.n_internal_faces,
        }
    }
}
