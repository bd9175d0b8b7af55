//! Strongly-typed handles for the mesh arena.
//!
//! Cells, faces, nodes, boundaries and ghost cells live in flat vectors owned
//! by [`Mesh`](crate::mesh::Mesh). These newtypes are the stable integer
//! handles used to cross-reference them, so a face index can never be used
//! to look up a cell by accident.
//!
//! # Example
//!
//! ```
//! use fvm_rs::types::{CellIndex, IndexSlot};
//!
//! let cell = CellIndex::new(3);
//! assert_eq!(cell.get(), 3);
//!
//! let mut slot = IndexSlot::default();
//! assert!(slot.get().is_none());
//! slot.assign(7).unwrap();
//! assert!(slot.assign(8).is_err());
//! ```

mod indices;

pub use indices::{BoundaryIndex, CellIndex, FaceIndex, GhostIndex, IndexError, IndexSlot, NodeIndex};
