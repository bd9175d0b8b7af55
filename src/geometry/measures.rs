//! Cell and face measures.
//!
//! Each dimension class only offers the measures it supports: segments have
//! a length, polygons an area and a plane normal, polyhedra a volume. Asking
//! a shape for something it does not have is a [`GeometryError`].

use glam::DVec3;

use super::{GeometryError, VtkCellType};

/// Smallest accepted measure or normal magnitude.
pub const GEOMETRY_EPS: f64 = 1e-14;

// =============================================================================
// Shape / Surface
// =============================================================================

/// Volume (length in 1D, area in 2D) and centroid of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub volume: f64,
    pub centroid: DVec3,
}

/// Oriented face: area, centroid, unit normal and a right-handed tangent pair.
///
/// `normal × tangent1 == tangent2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub area: f64,
    pub centroid: DVec3,
    pub normal: DVec3,
    pub tangent1: DVec3,
    pub tangent2: DVec3,
}

impl Surface {
    /// Build a surface, normalising `normal`.
    pub fn new(area: f64, centroid: DVec3, normal: DVec3) -> Result<Self, GeometryError> {
        let normal = unit(normal)?;
        let tangent1 = normal.any_orthonormal_vector();
        let tangent2 = normal.cross(tangent1);
        Ok(Self {
            area,
            centroid,
            normal,
            tangent1,
            tangent2,
        })
    }

    /// Same face seen from the other side.
    pub fn flipped(&self) -> Self {
        Self {
            area: self.area,
            centroid: self.centroid,
            normal: -self.normal,
            tangent1: self.tangent1,
            tangent2: -self.tangent2,
        }
    }

    /// Replace the normal, recomputing the tangents.
    pub fn with_normal(&self, normal: DVec3) -> Result<Self, GeometryError> {
        Self::new(self.area, self.centroid, normal)
    }

    /// Express a physical vector in (normal, tangent1, tangent2) components.
    #[inline]
    pub fn to_local(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.normal), v.dot(self.tangent1), v.dot(self.tangent2))
    }

    /// Inverse of [`Surface::to_local`].
    #[inline]
    pub fn to_global(&self, v: DVec3) -> DVec3 {
        self.normal * v.x + self.tangent1 * v.y + self.tangent2 * v.z
    }
}

/// Normalise a vector, rejecting near-zero input.
pub fn unit(v: DVec3) -> Result<DVec3, GeometryError> {
    let len = v.length();
    if !len.is_finite() || len < GEOMETRY_EPS {
        return Err(GeometryError::DegenerateNormal {
            x: v.x,
            y: v.y,
            z: v.z,
        });
    }
    Ok(v / len)
}

// =============================================================================
// Dimension-class measures
// =============================================================================

/// Length and midpoint of a segment.
pub fn segment_measure(a: DVec3, b: DVec3) -> (f64, DVec3) {
    ((b - a).length(), 0.5 * (a + b))
}

/// Area vector (Newell, magnitude = area) and centroid of a planar polygon.
pub fn polygon_measure(points: &[DVec3]) -> (DVec3, DVec3) {
    let n = points.len();
    let mut area_vec = DVec3::ZERO;
    for i in 0..n {
        area_vec += points[i].cross(points[(i + 1) % n]);
    }
    area_vec *= 0.5;

    // Area-weighted fan centroid, signed along the polygon normal.
    let mean = points.iter().copied().sum::<DVec3>() / n as f64;
    let axis = area_vec.normalize_or_zero();
    let mut weight = 0.0;
    let mut centroid = DVec3::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let w = 0.5 * (a - mean).cross(b - mean).dot(axis);
        weight += w;
        centroid += w * (mean + a + b) / 3.0;
    }
    let centroid = if weight.abs() > GEOMETRY_EPS {
        centroid / weight
    } else {
        mean
    };
    (area_vec, centroid)
}

/// Volume and centroid of a polyhedron, by tetrahedra from the vertex mean
/// to every triangulated face.
pub fn polyhedron_measure(kind: VtkCellType, points: &[DVec3]) -> (f64, DVec3) {
    let apex = points.iter().copied().sum::<DVec3>() / points.len() as f64;
    let mut volume = 0.0;
    let mut centroid = DVec3::ZERO;
    for (_, face) in kind.face_templates(points.len()) {
        let a = points[face[0]];
        for k in 1..face.len() - 1 {
            let b = points[face[k]];
            let c = points[face[k + 1]];
            let v = (a - apex).dot((b - apex).cross(c - apex)) / 6.0;
            volume += v;
            centroid += v * (apex + a + b + c) / 4.0;
        }
    }
    if volume.abs() > GEOMETRY_EPS {
        (volume.abs(), centroid / volume)
    } else {
        (0.0, apex)
    }
}

// =============================================================================
// Collaborator entry points
// =============================================================================

/// Shape of a cell of the given type.
pub fn cell_shape(kind: VtkCellType, points: &[DVec3]) -> Result<Shape, GeometryError> {
    kind.validate_node_count(points.len())?;
    let (volume, centroid) = match kind.dimension() {
        1 => segment_measure(points[0], points[1]),
        2 => {
            let (area_vec, centroid) = polygon_measure(points);
            (area_vec.length(), centroid)
        }
        3 => polyhedron_measure(kind, points),
        _ => {
            return Err(GeometryError::NotApplicable {
                shape: kind,
                measure: "volume",
            });
        }
    };
    if !(volume > GEOMETRY_EPS) {
        return Err(GeometryError::ZeroMeasure { shape: kind });
    }
    Ok(Shape { volume, centroid })
}

/// Surface of a face, oriented away from `owner_centroid`.
///
/// `mesh_dimension` selects the embedding: faces of 1D meshes are points
/// with unit area, faces of 2D meshes are segments in the xy-plane.
pub fn face_surface(
    kind: VtkCellType,
    points: &[DVec3],
    mesh_dimension: usize,
    owner_centroid: DVec3,
) -> Result<Surface, GeometryError> {
    kind.validate_node_count(points.len())?;
    if kind.dimension() + 1 != mesh_dimension {
        return Err(GeometryError::NotApplicable {
            shape: kind,
            measure: "face surface",
        });
    }

    let (area, centroid, normal) = match mesh_dimension {
        1 => (1.0, points[0], points[0] - owner_centroid),
        2 => {
            let (length, mid) = segment_measure(points[0], points[1]);
            let t = points[1] - points[0];
            (length, mid, DVec3::new(t.y, -t.x, 0.0))
        }
        _ => {
            let (area_vec, centroid) = polygon_measure(points);
            (area_vec.length(), centroid, area_vec)
        }
    };
    if !(area > GEOMETRY_EPS) {
        return Err(GeometryError::ZeroMeasure { shape: kind });
    }

    let normal = if normal.dot(centroid - owner_centroid) < 0.0 {
        -normal
    } else {
        normal
    };
    Surface::new(area, centroid, normal)
}
