//! VTK cell type catalogue and canonical face templates.
//!
//! Node ordering follows the VTK conventions. Every face template lists its
//! local node indices in the order that yields an outward normal for a
//! positively oriented cell.

use super::GeometryError;

/// Supported VTK cell/face shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VtkCellType {
    /// Single point (face of a 1D cell).
    Vertex,
    /// Two-node segment.
    Line,
    /// Three-node triangle.
    Triangle,
    /// Planar polygon with any number (>= 3) of nodes.
    Polygon,
    /// Four-node quadrilateral.
    Quad,
    /// Four-node tetrahedron.
    Tetra,
    /// Eight-node hexahedron.
    Hexahedron,
    /// Six-node triangular prism.
    Wedge,
    /// Five-node square pyramid.
    Pyramid,
}

const TETRA_FACES: [&[usize]; 4] = [&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];

const HEXAHEDRON_FACES: [&[usize]; 6] = [
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

const WEDGE_FACES: [&[usize]; 5] = [
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];

const PYRAMID_FACES: [&[usize]; 5] = [
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

impl VtkCellType {
    /// VTK integer code.
    pub fn code(self) -> i32 {
        match self {
            VtkCellType::Vertex => 1,
            VtkCellType::Line => 3,
            VtkCellType::Triangle => 5,
            VtkCellType::Polygon => 7,
            VtkCellType::Quad => 9,
            VtkCellType::Tetra => 10,
            VtkCellType::Hexahedron => 12,
            VtkCellType::Wedge => 13,
            VtkCellType::Pyramid => 14,
        }
    }

    /// Topological dimension of the shape.
    pub fn dimension(self) -> usize {
        match self {
            VtkCellType::Vertex => 0,
            VtkCellType::Line => 1,
            VtkCellType::Triangle | VtkCellType::Polygon | VtkCellType::Quad => 2,
            VtkCellType::Tetra
            | VtkCellType::Hexahedron
            | VtkCellType::Wedge
            | VtkCellType::Pyramid => 3,
        }
    }

    /// Fixed node count, or `None` for polygons.
    pub fn node_count(self) -> Option<usize> {
        match self {
            VtkCellType::Vertex => Some(1),
            VtkCellType::Line => Some(2),
            VtkCellType::Triangle => Some(3),
            VtkCellType::Polygon => None,
            VtkCellType::Quad => Some(4),
            VtkCellType::Tetra => Some(4),
            VtkCellType::Hexahedron => Some(8),
            VtkCellType::Wedge => Some(6),
            VtkCellType::Pyramid => Some(5),
        }
    }

    /// Check a node list against the shape's node count.
    pub fn validate_node_count(self, n_nodes: usize) -> Result<(), GeometryError> {
        let ok = match self.node_count() {
            Some(expected) => n_nodes == expected,
            None => n_nodes >= 3,
        };
        if ok {
            Ok(())
        } else {
            Err(GeometryError::NodeCount {
                shape: self,
                found: n_nodes,
            })
        }
    }

    /// Faces of a cell with `n_nodes` nodes, as (face type, local node order).
    ///
    /// Vertices have no faces.
    pub fn face_templates(self, n_nodes: usize) -> Vec<(VtkCellType, Vec<usize>)> {
        let polyhedron = |faces: &[&[usize]]| {
            faces
                .iter()
                .map(|f| {
                    let kind = if f.len() == 3 {
                        VtkCellType::Triangle
                    } else {
                        VtkCellType::Quad
                    };
                    (kind, f.to_vec())
                })
                .collect()
        };

        match self {
            VtkCellType::Vertex => Vec::new(),
            VtkCellType::Line => vec![(VtkCellType::Vertex, vec![0]), (VtkCellType::Vertex, vec![1])],
            VtkCellType::Triangle | VtkCellType::Quad | VtkCellType::Polygon => (0..n_nodes)
                .map(|i| (VtkCellType::Line, vec![i, (i + 1) % n_nodes]))
                .collect(),
            VtkCellType::Tetra => polyhedron(&TETRA_FACES),
            VtkCellType::Hexahedron => polyhedron(&HEXAHEDRON_FACES),
            VtkCellType::Wedge => polyhedron(&WEDGE_FACES),
            VtkCellType::Pyramid => polyhedron(&PYRAMID_FACES),
        }
    }
}

impl TryFrom<i32> for VtkCellType {
    type Error = GeometryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VtkCellType::Vertex),
            3 => Ok(VtkCellType::Line),
            5 => Ok(VtkCellType::Triangle),
            7 => Ok(VtkCellType::Polygon),
            9 => Ok(VtkCellType::Quad),
            10 => Ok(VtkCellType::Tetra),
            12 => Ok(VtkCellType::Hexahedron),
            13 => Ok(VtkCellType::Wedge),
            14 => Ok(VtkCellType::Pyramid),
            _ => Err(GeometryError::UnsupportedShape(value)),
        }
    }
}
