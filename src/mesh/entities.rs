//! Mesh entities: nodes, cells, faces and named boundaries.
//!
//! Topology fields are private and fixed once the builder finalises the
//! mesh. Numeric state fields are public; the solver owns their lifecycle.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

use crate::boundary::BoundaryCondition;
use crate::geometry::{Shape, Surface, VtkCellType};
use crate::types::{BoundaryIndex, CellIndex, FaceIndex, GhostIndex, NodeIndex};

// =============================================================================
// Node
// =============================================================================

/// Mesh vertex.
#[derive(Clone, Debug)]
pub struct Node {
    position: DVec3,
    cells: Vec<CellIndex>,
    /// Scratch state used by node-based reconstruction.
    pub state: Vec<f64>,
}

impl Node {
    pub(crate) fn new(position: DVec3) -> Self {
        Self {
            position,
            cells: Vec::new(),
            state: Vec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Interior cells sharing this node.
    #[inline]
    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    /// Incident cells alongside the mutable node state.
    pub(crate) fn cells_and_state_mut(&mut self) -> (&[CellIndex], &mut [f64]) {
        (&self.cells, &mut self.state)
    }

    pub(crate) fn link_cell(&mut self, cell: CellIndex) {
        self.cells.push(cell);
    }
}

// =============================================================================
// Cell
// =============================================================================

/// Whether a cell is part of the mesh or a ghost mirrored across a boundary face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Interior(CellIndex),
    /// Ghost cell owned by the given boundary face.
    Ghost(FaceIndex),
}

/// Finite-volume cell with its numeric state.
#[derive(Clone, Debug)]
pub struct Cell {
    kind: CellKind,
    nodes: Vec<NodeIndex>,
    faces: Vec<FaceIndex>,
    vtk_type: VtkCellType,
    shape: Shape,

    /// Conservative state (cell average).
    pub u: Vec<f64>,
    /// Gradient of each conservative variable.
    pub gradient_u: Vec<DVec3>,
    /// Residual accumulator.
    pub residual: Vec<f64>,
    /// Earlier time levels; `history[0]` holds the state at the start of a step.
    pub history: Vec<Vec<f64>>,
    /// Local time step.
    pub dt: f64,
}

impl Cell {
    pub(crate) fn new(
        kind: CellKind,
        vtk_type: VtkCellType,
        nodes: Vec<NodeIndex>,
        shape: Shape,
    ) -> Self {
        Self {
            kind,
            nodes,
            faces: Vec::new(),
            vtk_type,
            shape,
            u: Vec::new(),
            gradient_u: Vec::new(),
            residual: Vec::new(),
            history: Vec::new(),
            dt: 0.0,
        }
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Mesh index, `None` for ghost cells.
    #[inline]
    pub fn index(&self) -> Option<CellIndex> {
        match self.kind {
            CellKind::Interior(index) => Some(index),
            CellKind::Ghost(_) => None,
        }
    }

    #[inline]
    pub fn is_ghost(&self) -> bool {
        matches!(self.kind, CellKind::Ghost(_))
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Incident faces.
    #[inline]
    pub fn faces(&self) -> &[FaceIndex] {
        &self.faces
    }

    #[inline]
    pub fn vtk_type(&self) -> VtkCellType {
        self.vtk_type
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.shape.volume
    }

    #[inline]
    pub fn centroid(&self) -> DVec3 {
        self.shape.centroid
    }

    /// Number of conservative variables currently allocated.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.u.len()
    }

    /// Incident faces together with the residual accumulator.
    pub(crate) fn faces_and_residual(&mut self) -> (&[FaceIndex], &mut [f64]) {
        (&self.faces, &mut self.residual)
    }

    pub(crate) fn link_face(&mut self, face: FaceIndex) {
        self.faces.push(face);
    }

    pub(crate) fn allocate(&mut self, num_vars: usize, history_levels: usize) {
        self.u = vec![0.0; num_vars];
        self.gradient_u = vec![DVec3::ZERO; num_vars];
        self.residual = vec![0.0; num_vars];
        self.history = vec![vec![0.0; num_vars]; history_levels];
        self.dt = 0.0;
    }
}

// =============================================================================
// Face
// =============================================================================

/// What lies on the `right` side of a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    Cell(CellIndex),
    Ghost(GhostIndex),
}

/// Face between two cells, or between a cell and its ghost.
///
/// The normal points from `left` to `right`.
#[derive(Clone, Debug)]
pub struct Face {
    index: FaceIndex,
    nodes: Vec<NodeIndex>,
    vtk_type: VtkCellType,
    surface: Surface,
    left: CellIndex,
    right: Neighbor,
    boundary: Option<BoundaryIndex>,

    /// Numerical flux last computed across the face.
    pub flux: Vec<f64>,
    /// Largest convective eigenvalue magnitude seen across the face.
    pub max_abs_eigenvalue: f64,
    /// Largest diffusivity seen across the face.
    pub diffusivity: f64,
}

impl Face {
    pub(crate) fn new(
        index: FaceIndex,
        vtk_type: VtkCellType,
        nodes: Vec<NodeIndex>,
        surface: Surface,
        left: CellIndex,
        right: Neighbor,
        boundary: Option<BoundaryIndex>,
    ) -> Self {
        Self {
            index,
            nodes,
            vtk_type,
            surface,
            left,
            right,
            boundary,
            flux: Vec::new(),
            max_abs_eigenvalue: 0.0,
            diffusivity: 0.0,
        }
    }

    #[inline]
    pub fn index(&self) -> FaceIndex {
        self.index
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    #[inline]
    pub fn vtk_type(&self) -> VtkCellType {
        self.vtk_type
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.surface.area
    }

    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.surface.normal
    }

    #[inline]
    pub fn centroid(&self) -> DVec3 {
        self.surface.centroid
    }

    /// Owning interior cell.
    #[inline]
    pub fn left(&self) -> CellIndex {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Neighbor {
        self.right
    }

    /// Boundary the face belongs to, `None` for internal faces.
    #[inline]
    pub fn boundary(&self) -> Option<BoundaryIndex> {
        self.boundary
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.boundary.is_some()
    }

    pub(crate) fn allocate(&mut self, num_vars: usize) {
        self.flux = vec![0.0; num_vars];
        self.max_abs_eigenvalue = 0.0;
        self.diffusivity = 0.0;
    }
}

// =============================================================================
// Boundary
// =============================================================================

/// Named group of boundary faces with an optional boundary condition.
#[derive(Clone)]
pub struct Boundary {
    name: String,
    faces: Vec<FaceIndex>,
    condition: Option<Arc<dyn BoundaryCondition>>,
}

impl Boundary {
    pub(crate) fn new(name: String, faces: Vec<FaceIndex>) -> Self {
        Self {
            name,
            faces,
            condition: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn faces(&self) -> &[FaceIndex] {
        &self.faces
    }

    /// Attached boundary condition, `None` until one is set.
    #[inline]
    pub fn condition(&self) -> Option<&Arc<dyn BoundaryCondition>> {
        self.condition.as_ref()
    }

    #[inline]
    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    pub(crate) fn set_condition(&mut self, condition: Arc<dyn BoundaryCondition>) {
        self.condition = Some(condition);
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Boundary")
            .field("name", &self.name)
            .field("faces", &self.faces.len())
            .field("condition", &self.condition.as_ref().map(|bc| bc.name()))
            .finish()
    }
}
