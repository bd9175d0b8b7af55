//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up handles into the different mesh arenas
//! (cells vs faces vs nodes vs boundaries vs ghost cells).

use std::fmt;

use thiserror::Error;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Iterate over [0, n).
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Interior cell handle.
    ///
    /// Ghost cells never receive a `CellIndex`; they are addressed by
    /// [`GhostIndex`] through the boundary face that owns them.
    CellIndex,
    "C"
);

define_index!(
    /// Face handle. Internal faces come first, boundary faces after.
    FaceIndex,
    "F"
);

define_index!(
    /// Mesh node (vertex) handle.
    NodeIndex,
    "N"
);

define_index!(
    /// Named boundary handle.
    BoundaryIndex,
    "B"
);

define_index!(
    /// Ghost cell handle, one per boundary face.
    GhostIndex,
    "G"
);

// =============================================================================
// One-time index assignment
// =============================================================================

/// Error raised when an index slot is assigned twice.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("index already assigned: {current}, refusing to overwrite with {requested}")]
pub struct IndexError {
    /// Index already held by the slot.
    pub current: usize,
    /// Index that was rejected.
    pub requested: usize,
}

/// Index that transitions from unset to a fixed value exactly once.
///
/// Used by the mesh builder's draft records; the finalisation pass is the
/// only writer. `None` is the "not yet assigned" sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexSlot(Option<usize>);

impl IndexSlot {
    /// Assign the index. Fails if a value is already present.
    pub fn assign(&mut self, index: usize) -> Result<(), IndexError> {
        match self.0 {
            Some(current) => Err(IndexError {
                current,
                requested: index,
            }),
            None => {
                self.0 = Some(index);
                Ok(())
            }
        }
    }

    /// Assigned index, or `None` while unset.
    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.0
    }

    /// Whether an index has been assigned.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.0.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
