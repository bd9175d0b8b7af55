//! Topology construction from raw connectivity.
//!
//! The builder works in three phases:
//!
//! 1. every element emits its outward candidate faces, registered under a
//!    canonical key (sorted node indices); a second discovery of the same key
//!    merges the two candidates into one internal face
//! 2. declared boundary faces are matched against the single-owner
//!    candidates by the same key
//! 3. a finalisation pass assigns every cell and face index exactly once,
//!    synthesises one ghost cell per boundary face and links cells to faces
//!    and nodes to cells
//!
//! The face kept for a merged pair is the one discovered first. Elements are
//! visited in input order, so the lower-indexed cell is always `left`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::DVec3;
use log::debug;

use super::{Boundary, Cell, CellKind, Face, Mesh, MeshError, Neighbor, Node};
use crate::geometry::{self, GeometryError, Shape, Surface, VtkCellType};
use crate::types::{BoundaryIndex, CellIndex, FaceIndex, GhostIndex, IndexSlot, NodeIndex};

/// Raw element or boundary-face connectivity.
#[derive(Clone, Debug, PartialEq)]
pub struct Connectivity {
    pub vtk_type: VtkCellType,
    pub nodes: Vec<usize>,
}

impl Connectivity {
    pub fn new(vtk_type: VtkCellType, nodes: Vec<usize>) -> Self {
        Self { vtk_type, nodes }
    }
}

/// Collects nodes, elements and named boundaries, then builds a [`Mesh`].
#[derive(Clone, Debug, Default)]
pub struct MeshBuilder {
    dimension: usize,
    nodes: Vec<DVec3>,
    elements: Vec<Connectivity>,
    boundaries: Vec<(String, Vec<Connectivity>)>,
}

/// Cell record before index assignment.
#[derive(Debug)]
struct CellDraft {
    vtk_type: VtkCellType,
    nodes: Vec<usize>,
    shape: Shape,
    index: IndexSlot,
}

/// Face record before index assignment.
#[derive(Clone, Debug)]
pub(crate) struct FaceDraft {
    pub(crate) vtk_type: VtkCellType,
    pub(crate) nodes: Vec<usize>,
    pub(crate) surface: Surface,
    pub(crate) left: usize,
    pub(crate) right: Option<usize>,
    pub(crate) boundary: Option<usize>,
    pub(crate) index: IndexSlot,
}

/// Canonical identity of a face: its node set, order-independent.
pub(crate) fn face_key(nodes: &[usize]) -> Vec<usize> {
    let mut key = nodes.to_vec();
    key.sort_unstable();
    key
}

/// Merge two candidates of the same physical face.
///
/// `retained` keeps its node order and owner; `other`'s owner becomes the
/// right cell. The normal is the bisector `(n_retained - n_other) / 2`,
/// renormalised.
pub(crate) fn merge_faces(
    retained: &FaceDraft,
    other: &FaceDraft,
) -> Result<FaceDraft, GeometryError> {
    let normal = (retained.surface.normal - other.surface.normal) * 0.5;
    Ok(FaceDraft {
        surface: retained.surface.with_normal(normal)?,
        right: Some(other.left),
        ..retained.clone()
    })
}

impl MeshBuilder {
    /// Empty builder for a mesh of the given spatial dimension (1, 2 or 3).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn add_node(&mut self, position: DVec3) -> NodeIndex {
        self.nodes.push(position);
        NodeIndex::new(self.nodes.len() - 1)
    }

    pub fn add_cell(&mut self, vtk_type: VtkCellType, nodes: Vec<usize>) -> &mut Self {
        self.elements.push(Connectivity::new(vtk_type, nodes));
        self
    }

    /// Declare a named boundary by its face connectivity.
    pub fn add_boundary(
        &mut self,
        name: impl Into<String>,
        faces: Vec<Connectivity>,
    ) -> &mut Self {
        self.boundaries.push((name.into(), faces));
        self
    }

    /// Build the mesh. Any invalid element or face rejects the whole mesh.
    pub fn build(self) -> Result<Mesh, MeshError> {
        if !(1..=3).contains(&self.dimension) {
            return Err(MeshError::InvalidDimension(self.dimension));
        }

        let mut cells = self.cell_drafts()?;
        let (mut drafts, registry) = self.face_drafts(&cells)?;
        let boundary_faces = self.match_boundaries(&mut drafts, &registry)?;

        if let Some(orphan) = drafts
            .iter()
            .find(|d| d.right.is_none() && d.boundary.is_none())
        {
            return Err(MeshError::UnclaimedBoundaryFace {
                nodes: orphan.nodes.clone(),
            });
        }

        // Finalisation: internal faces first, then boundary faces grouped by boundary.
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.index.assign(i)?;
        }
        let mut next = 0;
        for draft in drafts.iter_mut().filter(|d| d.right.is_some()) {
            draft.index.assign(next)?;
            next += 1;
        }
        let n_internal = next;
        for slots in &boundary_faces {
            for &slot in slots {
                drafts[slot].index.assign(next)?;
                next += 1;
            }
        }
        drafts.sort_by_key(|d| d.index.get());

        self.finalize(cells, drafts, boundary_faces, n_internal)
    }

    fn check_nodes(&self, nodes: &[usize]) -> Result<(), MeshError> {
        match nodes.iter().find(|&&n| n >= self.nodes.len()) {
            Some(&node) => Err(MeshError::NodeOutOfRange {
                node,
                n_nodes: self.nodes.len(),
            }),
            None => Ok(()),
        }
    }

    fn points(&self, nodes: &[usize]) -> Vec<DVec3> {
        nodes.iter().map(|&n| self.nodes[n]).collect()
    }

    fn cell_drafts(&self) -> Result<Vec<CellDraft>, MeshError> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                if element.vtk_type.dimension() != self.dimension {
                    return Err(MeshError::DimensionMismatch {
                        entity: format!("element {}", i),
                        shape: element.vtk_type,
                        expected: self.dimension,
                    });
                }
                self.check_nodes(&element.nodes)?;
                let shape = geometry::cell_shape(element.vtk_type, &self.points(&element.nodes))?;
                Ok(CellDraft {
                    vtk_type: element.vtk_type,
                    nodes: element.nodes.clone(),
                    shape,
                    index: IndexSlot::default(),
                })
            })
            .collect()
    }

    fn face_drafts(
        &self,
        cells: &[CellDraft],
    ) -> Result<(Vec<FaceDraft>, HashMap<Vec<usize>, usize>), MeshError> {
        let mut drafts: Vec<FaceDraft> = Vec::new();
        let mut registry: HashMap<Vec<usize>, usize> = HashMap::new();

        for (owner, cell) in cells.iter().enumerate() {
            for (vtk_type, local) in cell.vtk_type.face_templates(cell.nodes.len()) {
                let nodes: Vec<usize> = local.iter().map(|&l| cell.nodes[l]).collect();
                let surface = geometry::face_surface(
                    vtk_type,
                    &self.points(&nodes),
                    self.dimension,
                    cell.shape.centroid,
                )?;
                let candidate = FaceDraft {
                    vtk_type,
                    nodes,
                    surface,
                    left: owner,
                    right: None,
                    boundary: None,
                    index: IndexSlot::default(),
                };

                match registry.entry(face_key(&candidate.nodes)) {
                    Entry::Vacant(slot) => {
                        slot.insert(drafts.len());
                        drafts.push(candidate);
                    }
                    Entry::Occupied(slot) => {
                        let retained = &drafts[*slot.get()];
                        if retained.right.is_some() {
                            return Err(MeshError::NonManifoldFace {
                                nodes: candidate.nodes,
                            });
                        }
                        let merged = merge_faces(retained, &candidate)?;
                        drafts[*slot.get()] = merged;
                    }
                }
            }
        }

        Ok((drafts, registry))
    }

    fn match_boundaries(
        &self,
        drafts: &mut [FaceDraft],
        registry: &HashMap<Vec<usize>, usize>,
    ) -> Result<Vec<Vec<usize>>, MeshError> {
        let mut matched = Vec::with_capacity(self.boundaries.len());
        for (b, (name, faces)) in self.boundaries.iter().enumerate() {
            let mut slots = Vec::with_capacity(faces.len());
            for face in faces {
                if face.vtk_type.dimension() + 1 != self.dimension {
                    return Err(MeshError::DimensionMismatch {
                        entity: format!("face of boundary '{}'", name),
                        shape: face.vtk_type,
                        expected: self.dimension - 1,
                    });
                }
                self.check_nodes(&face.nodes)?;

                let slot = registry
                    .get(&face_key(&face.nodes))
                    .copied()
                    .filter(|&s| drafts[s].right.is_none())
                    .ok_or_else(|| MeshError::BoundaryFaceNotFound {
                        boundary: name.clone(),
                        nodes: face.nodes.clone(),
                    })?;
                if drafts[slot].boundary.is_some() {
                    return Err(MeshError::DuplicateBoundaryFace {
                        boundary: name.clone(),
                        nodes: face.nodes.clone(),
                    });
                }
                drafts[slot].boundary = Some(b);
                slots.push(slot);
            }
            matched.push(slots);
        }
        Ok(matched)
    }

    fn finalize(
        self,
        cells: Vec<CellDraft>,
        drafts: Vec<FaceDraft>,
        boundary_faces: Vec<Vec<usize>>,
        n_internal: usize,
    ) -> Result<Mesh, MeshError> {
        let mut nodes: Vec<Node> = self.nodes.iter().map(|&p| Node::new(p)).collect();

        let mut cells: Vec<Cell> = cells
            .into_iter()
            .map(|draft| {
                let index = draft.index.get().ok_or(MeshError::UnassignedIndex)?;
                Ok(Cell::new(
                    CellKind::Interior(CellIndex::new(index)),
                    draft.vtk_type,
                    draft.nodes.into_iter().map(NodeIndex::new).collect(),
                    draft.shape,
                ))
            })
            .collect::<Result<_, MeshError>>()?;

        let mut faces = Vec::with_capacity(drafts.len());
        let mut ghosts = Vec::with_capacity(drafts.len() - n_internal);
        for draft in drafts {
            let index = FaceIndex::new(draft.index.get().ok_or(MeshError::UnassignedIndex)?);
            let left = CellIndex::new(draft.left);
            let right = match draft.right {
                Some(r) => Neighbor::Cell(CellIndex::new(r)),
                None => {
                    let owner = &cells[left];
                    ghosts.push(mirror_ghost(owner, index, &draft));
                    Neighbor::Ghost(GhostIndex::new(ghosts.len() - 1))
                }
            };
            faces.push(Face::new(
                index,
                draft.vtk_type,
                draft.nodes.into_iter().map(NodeIndex::new).collect(),
                draft.surface,
                left,
                right,
                draft.boundary.map(BoundaryIndex::new),
            ));
        }

        for face in &faces {
            cells[face.left()].link_face(face.index());
            if let Neighbor::Cell(right) = face.right() {
                cells[right].link_face(face.index());
            }
        }
        for (i, cell) in cells.iter().enumerate() {
            for &node in cell.nodes() {
                nodes[node].link_cell(CellIndex::new(i));
            }
        }

        let mut next = n_internal;
        let boundaries: Vec<Boundary> = self
            .boundaries
            .into_iter()
            .zip(boundary_faces)
            .map(|((name, _), slots)| {
                let faces = (next..next + slots.len()).map(FaceIndex::new).collect();
                next += slots.len();
                Boundary::new(name, faces)
            })
            .collect();

        debug!(
            "built {}D mesh: {} nodes, {} cells, {} internal faces, {} boundary faces in {} boundaries",
            self.dimension,
            nodes.len(),
            cells.len(),
            n_internal,
            ghosts.len(),
            boundaries.len()
        );

        Ok(Mesh::from_parts(
            self.dimension,
            nodes,
            cells,
            faces,
            n_internal,
            ghosts,
            boundaries,
        ))
    }
}

/// Ghost cell reflected through the face plane, same volume as its owner.
fn mirror_ghost(owner: &Cell, face: FaceIndex, draft: &FaceDraft) -> Cell {
    let c = owner.centroid();
    let n = draft.surface.normal;
    let centroid = c + 2.0 * (draft.surface.centroid - c).dot(n) * n;
    Cell::new(
        CellKind::Ghost(face),
        owner.vtk_type(),
        draft.nodes.iter().copied().map(NodeIndex::new).collect(),
        Shape {
            volume: owner.volume(),
            centroid,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn two_quads() -> MeshBuilder {
        // 3---4---5
        // | 0 | 1 |
        // 0---1---2
        let mut b = MeshBuilder::new(2);
        for j in 0..2 {
            for i in 0..3 {
                b.add_node(DVec3::new(i as f64, j as f64, 0.0));
            }
        }
        b.add_cell(VtkCellType::Quad, vec![0, 1, 4, 3]);
        b.add_cell(VtkCellType::Quad, vec![1, 2, 5, 4]);
        let line = |a, b| Connectivity::new(VtkCellType::Line, vec![a, b]);
        b.add_boundary("bottom", vec![line(0, 1), line(1, 2)]);
        b.add_boundary("right", vec![line(2, 5)]);
        b.add_boundary("top", vec![line(5, 4), line(4, 3)]);
        b.add_boundary("left", vec![line(3, 0)]);
        b
    }

    #[test]
    fn test_face_key_ignores_order() {
        assert_eq!(face_key(&[4, 1, 7]), face_key(&[7, 4, 1]));
        assert_ne!(face_key(&[4, 1, 7]), face_key(&[4, 1, 8]));
    }

    #[test]
    fn test_merge_faces_is_pure() {
        let surface = Surface::new(1.0, DVec3::ZERO, DVec3::X).unwrap();
        let a = FaceDraft {
            vtk_type: VtkCellType::Line,
            nodes: vec![1, 4],
            surface,
            left: 0,
            right: None,
            boundary: None,
            index: IndexSlot::default(),
        };
        let b = FaceDraft {
            nodes: vec![4, 1],
            surface: surface.flipped(),
            left: 1,
            ..a.clone()
        };

        let merged = merge_faces(&a, &b).unwrap();
        assert_eq!(merged.left, 0);
        assert_eq!(merged.right, Some(1));
        assert_eq!(merged.nodes, vec![1, 4]);
        assert!((merged.surface.normal - DVec3::X).length() < TOL);
        assert_eq!(a.right, None, "inputs must not be mutated");
    }

    #[test]
    fn test_two_quads_topology() {
        let mesh = two_quads().build().unwrap();
        assert_eq!(mesh.cells().len(), 2);
        assert_eq!(mesh.n_internal_faces(), 1);
        assert_eq!(mesh.faces().len(), 7);
        assert_eq!(mesh.ghosts().len(), 6);

        let shared = &mesh.faces()[0];
        assert_eq!(shared.left(), CellIndex::new(0));
        assert_eq!(shared.right(), Neighbor::Cell(CellIndex::new(1)));
        assert!((shared.normal() - DVec3::X).length() < TOL);

        for cell in mesh.cells() {
            assert_eq!(cell.faces().len(), 4);
        }
        assert_eq!(mesh.nodes()[1].cells().len(), 2);
        assert_eq!(mesh.nodes()[0].cells().len(), 1);
    }

    #[test]
    fn test_boundary_faces_grouped_after_internal() {
        let mesh = two_quads().build().unwrap();
        let bottom = mesh.boundary("bottom").unwrap();
        assert_eq!(bottom.faces(), &[FaceIndex::new(1), FaceIndex::new(2)]);
        let left = mesh.boundary("left").unwrap();
        assert_eq!(left.faces(), &[FaceIndex::new(6)]);

        for face in mesh.boundary_faces() {
            assert!(matches!(face.right(), Neighbor::Ghost(_)));
            assert!(face.is_boundary());
        }
    }

    #[test]
    fn test_ghost_is_mirrored() {
        let mesh = two_quads().build().unwrap();
        let left_face = &mesh.faces()[6];
        let Neighbor::Ghost(g) = left_face.right() else {
            panic!("boundary face without ghost");
        };
        let ghost = &mesh.ghosts()[g];
        assert!(ghost.is_ghost());
        assert_eq!(ghost.index(), None);
        assert!((ghost.centroid() - DVec3::new(-0.5, 0.5, 0.0)).length() < TOL);
        assert!((ghost.volume() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_missing_boundary_face_is_fatal() {
        let mut b = two_quads();
        b.add_boundary("bogus", vec![Connectivity::new(VtkCellType::Line, vec![0, 5])]);
        assert!(matches!(
            b.build(),
            Err(MeshError::BoundaryFaceNotFound { .. })
        ));
    }

    #[test]
    fn test_internal_face_cannot_be_boundary() {
        let mut b = two_quads();
        b.add_boundary("inner", vec![Connectivity::new(VtkCellType::Line, vec![4, 1])]);
        assert!(matches!(
            b.build(),
            Err(MeshError::BoundaryFaceNotFound { .. })
        ));
    }

    #[test]
    fn test_unclaimed_face_is_fatal() {
        let mut b = MeshBuilder::new(2);
        b.add_node(DVec3::ZERO);
        b.add_node(DVec3::X);
        b.add_node(DVec3::Y);
        b.add_cell(VtkCellType::Triangle, vec![0, 1, 2]);
        b.add_boundary("partial", vec![Connectivity::new(VtkCellType::Line, vec![0, 1])]);
        assert!(matches!(
            b.build(),
            Err(MeshError::UnclaimedBoundaryFace { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut b = MeshBuilder::new(3);
        b.add_node(DVec3::ZERO);
        b.add_node(DVec3::X);
        b.add_node(DVec3::Y);
        b.add_cell(VtkCellType::Triangle, vec![0, 1, 2]);
        assert!(matches!(
            b.build(),
            Err(MeshError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_manifold_face_rejected() {
        // Three triangles sharing edge 0-1.
        let mut b = MeshBuilder::new(2);
        b.add_node(DVec3::ZERO);
        b.add_node(DVec3::X);
        b.add_node(DVec3::Y);
        b.add_node(-DVec3::Y);
        b.add_node(DVec3::new(0.5, 2.0, 0.0));
        b.add_cell(VtkCellType::Triangle, vec![0, 1, 2]);
        b.add_cell(VtkCellType::Triangle, vec![1, 0, 3]);
        b.add_cell(VtkCellType::Triangle, vec![0, 1, 4]);
        assert!(matches!(
            b.build(),
            Err(MeshError::NonManifoldFace { .. })
        ));
    }

    #[test]
    fn test_node_out_of_range() {
        let mut b = MeshBuilder::new(1);
        b.add_node(DVec3::ZERO);
        b.add_cell(VtkCellType::Line, vec![0, 3]);
        assert!(matches!(
            b.build(),
            Err(MeshError::NodeOutOfRange { node: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_dimension() {
        assert!(matches!(
            MeshBuilder::new(4).build(),
            Err(MeshError::InvalidDimension(4))
        ));
    }
}
