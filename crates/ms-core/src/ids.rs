//! Strongly typed identifiers for road-network nodes and edges.
//!
//! Node ids come straight from the source graph (OSM ids are 64-bit and may
//! be sparse), so unlike an arena index they are never used to index a `Vec`
//! directly.  `EdgeTable` keeps hash indices for that.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// The raw id as stored by the source graph.
            #[inline(always)]
            pub const fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }
    };
}

typed_id! {
    /// Stable id of a road-network node, taken from the source graph.
    pub struct NodeId(i64);
}

/// Key of a directed edge: the `(u, v)` node pair.
///
/// Parallel edges between the same pair collapse to one key; the table keeps
/// a single representative per key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct EdgeKey {
    pub u: NodeId,
    pub v: NodeId,
}

impl EdgeKey {
    #[inline]
    pub const fn new(u: NodeId, v: NodeId) -> Self {
        Self { u, v }
    }

    /// The same segment traversed in the opposite direction.
    #[inline]
    pub const fn flipped(self) -> Self {
        Self { u: self.v, v: self.u }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.u.0, self.v.0)
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((u, v): (NodeId, NodeId)) -> Self {
        Self { u, v }
    }
}
