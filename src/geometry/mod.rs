//! Geometric measures for the supported VTK cell and face shapes.
//!
//! - [`VtkCellType`]: shape catalogue with canonical outward face templates
//! - [`cell_shape`]: volume/centroid of a cell
//! - [`face_surface`]: area/centroid/outward normal of a face

mod measures;
mod vtk;

use thiserror::Error;

pub use measures::{
    GEOMETRY_EPS, Shape, Surface, cell_shape, face_surface, polygon_measure, polyhedron_measure,
    segment_measure, unit,
};
pub use vtk::VtkCellType;

/// Errors from geometric evaluation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("unsupported VTK shape code {0}")]
    UnsupportedShape(i32),

    #[error("{shape:?} cannot be built from {found} nodes")]
    NodeCount { shape: VtkCellType, found: usize },

    #[error("{measure} is not applicable to {shape:?}")]
    NotApplicable {
        shape: VtkCellType,
        measure: &'static str,
    },

    #[error("{shape:?} has zero measure")]
    ZeroMeasure { shape: VtkCellType },

    #[error("cannot normalize near-zero vector ({x}, {y}, {z})")]
    DegenerateNormal { x: f64, y: f64, z: f64 },
}
