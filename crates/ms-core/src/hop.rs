//! Next-hop assignments and the per-stage resolution state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Where traffic on an edge `(u, v)` continues once it reaches `v`.
///
/// The legacy integer encoding (`0` unresolved, `-1` sink, otherwise a node
/// id) is still available through [`NextHop::as_raw`] for tabular output.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum NextHop {
    /// No next hop known yet.
    #[default]
    Unresolved,
    /// The edge ends at the reference node; traffic leaves the network here.
    Sink,
    /// Continue along `(v, node)`.
    Node(NodeId),
}

impl NextHop {
    #[inline]
    pub fn is_resolved(self) -> bool {
        !matches!(self, NextHop::Unresolved)
    }

    #[inline]
    pub fn is_sink(self) -> bool {
        matches!(self, NextHop::Sink)
    }

    /// The target node, if this hop continues to one.
    #[inline]
    pub fn node(self) -> Option<NodeId> {
        match self {
            NextHop::Node(n) => Some(n),
            _ => None,
        }
    }

    /// `0` for unresolved, `-1` for sink, otherwise the raw node id.
    pub fn as_raw(self) -> i64 {
        match self {
            NextHop::Unresolved => 0,
            NextHop::Sink => -1,
            NextHop::Node(n) => n.0,
        }
    }

    /// Inverse of [`as_raw`](Self::as_raw).
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => NextHop::Unresolved,
            -1 => NextHop::Sink,
            n => NextHop::Node(NodeId(n)),
        }
    }
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHop::Unresolved => f.write_str("unresolved"),
            NextHop::Sink => f.write_str("sink"),
            NextHop::Node(n) => write!(f, "{}", n.0),
        }
    }
}

/// Which pipeline stage settled an edge's (or node's) next hop.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Unresolved,
    HeuristicResolved,
    SearchResolved,
    OracleResolved,
    Sink,
}

impl Resolution {
    #[inline]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }

    /// Label for CSV/SQLite columns.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Unresolved        => "unresolved",
            Resolution::HeuristicResolved => "heuristic",
            Resolution::SearchResolved    => "search",
            Resolution::OracleResolved    => "oracle",
            Resolution::Sink              => "sink",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
