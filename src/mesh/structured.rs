//! Uniform structured meshes expressed through the unstructured builder.

use glam::DVec3;

use super::{Connectivity, Mesh, MeshBuilder, MeshError};
use crate::geometry::VtkCellType;

/// Uniform line mesh on `[x_min, x_max]` with `n` cells.
///
/// Boundaries: `"left"` (x = x_min) and `"right"` (x = x_max).
pub fn structured_1d(x_min: f64, x_max: f64, n: usize) -> Result<Mesh, MeshError> {
    let mut builder = MeshBuilder::new(1);
    let dx = (x_max - x_min) / n as f64;
    for i in 0..=n {
        builder.add_node(DVec3::new(x_min + i as f64 * dx, 0.0, 0.0));
    }
    for i in 0..n {
        builder.add_cell(VtkCellType::Line, vec![i, i + 1]);
    }
    builder.add_boundary("left", vec![Connectivity::new(VtkCellType::Vertex, vec![0])]);
    builder.add_boundary("right", vec![Connectivity::new(VtkCellType::Vertex, vec![n])]);
    builder.build()
}

/// Uniform quad mesh on `[x_min, x_max] × [y_min, y_max]`.
///
/// `bounds` is `[x_min, x_max, y_min, y_max]`. Boundaries: `"bottom"`,
/// `"right"`, `"top"`, `"left"`.
pub fn structured_2d(bounds: [f64; 4], nx: usize, ny: usize) -> Result<Mesh, MeshError> {
    let [x_min, x_max, y_min, y_max] = bounds;
    let dx = (x_max - x_min) / nx as f64;
    let dy = (y_max - y_min) / ny as f64;
    let node = |i: usize, j: usize| j * (nx + 1) + i;

    let mut builder = MeshBuilder::new(2);
    for j in 0..=ny {
        for i in 0..=nx {
            builder.add_node(DVec3::new(
                x_min + i as f64 * dx,
                y_min + j as f64 * dy,
                0.0,
            ));
        }
    }
    for j in 0..ny {
        for i in 0..nx {
            builder.add_cell(
                VtkCellType::Quad,
                vec![node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)],
            );
        }
    }

    let edge = |a, b| Connectivity::new(VtkCellType::Line, vec![a, b]);
    builder.add_boundary(
        "bottom",
        (0..nx).map(|i| edge(node(i, 0), node(i + 1, 0))).collect(),
    );
    builder.add_boundary(
        "right",
        (0..ny).map(|j| edge(node(nx, j), node(nx, j + 1))).collect(),
    );
    builder.add_boundary(
        "top",
        (0..nx).map(|i| edge(node(i + 1, ny), node(i, ny))).collect(),
    );
    builder.add_boundary(
        "left",
        (0..ny).map(|j| edge(node(0, j + 1), node(0, j))).collect(),
    );
    builder.build()
}
