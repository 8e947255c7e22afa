//! `ms-graph`: raw street graphs and the normalized edge/node table.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`raw`]      | `RawGraph`, `RawGraphBuilder`, `EdgeAttrs`                    |
//! | [`locate`]   | `NodeLocator` (R-tree nearest-node snap)                      |
//! | [`road`]     | Road-class rules and `maxspeed` parsing                       |
//! | [`table`]    | `EdgeTable` (CSR arena of `Node`/`Edge` records)              |
//! | [`build`]    | `EdgeTableBuilder`                                            |
//! | [`source`]   | `NetworkGraphSource`, `GraphRequest`, `CachedSource`          |
//! | [`snapshot`] | `SnapshotCache` (JSON graph snapshots with expiry)            |
//! | [`osm`]      | `PbfSource` (feature = `"osm"` only)                          |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                                          |
//! |-------|-----------------------------------------------------------------|
//! | `osm` | Enables OSM PBF loading via the `osmpbf` crate.                 |

pub mod build;
pub mod error;
pub mod locate;
pub mod raw;
pub mod road;
pub mod snapshot;
pub mod source;
pub mod table;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use build::EdgeTableBuilder;
pub use error::{GraphError, GraphResult};
pub use locate::NodeLocator;
pub use raw::{EdgeAttrs, RawEdge, RawGraph, RawGraphBuilder, RawNode};
pub use snapshot::SnapshotCache;
pub use source::{CachedSource, GraphRequest, NetworkGraphSource};
pub use table::{Edge, EdgeTable, Node, TableCounts};
