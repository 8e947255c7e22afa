//! Graph-subsystem error type.

use thiserror::Error;

use ms_core::NodeId;

/// Errors produced by `ms-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge ({u} -> {v}) references a node missing from the graph")]
    DanglingEdge { u: NodeId, v: NodeId },

    #[error("graph has no nodes")]
    Empty,

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
