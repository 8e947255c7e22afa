//! Normalized node/edge table the resolver stages operate on.
//!
//! # Data layout
//!
//! `nodes` is sorted by id and `edges` by `(u, v)`, so all outgoing edges of
//! the node at index `i` occupy the contiguous slice
//!
//! ```text
//! edges[ node_out_start[i] .. node_out_start[i+1] ]
//! ```
//!
//! Two hash indices (`NodeId → node index`, `EdgeKey → edge index`) replace
//! the keyed lookups a dataframe would offer.  The edge set is fixed after
//! construction; only per-record attributes change as stages run.

use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;

use ms_core::{EdgeKey, GeoPoint, NextHop, NodeId, Orientation, Resolution};

// ── Records ───────────────────────────────────────────────────────────────────

/// A graph node plus its annotated transit time.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub pos: GeoPoint,
    /// Spherical-mercator metres, for renderers.
    pub x: f64,
    pub y: f64,
    pub highway: Option<String>,
    /// Seconds to (or from) the reference node.  `Some(0.0)` at the
    /// reference, `None` until annotated or when no duration is known.
    pub transit_time: Option<f64>,
    /// Stage that last chose a continuation out of this node; `Sink` at the
    /// reference.
    pub resolution: Resolution,
}

/// A directed edge `(u, v)` in resolver orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    /// Parallel key of the representative kept during deduplication.
    pub key: u32,
    /// Metres.
    pub length: f64,
    pub highway: String,
    /// Parsed `maxspeed` tag in m/s.
    pub maxspeed: Option<f64>,
    /// `maxspeed`, or the configured default when the tag is absent.
    pub speed_mps: f64,
    pub oneway: bool,
    pub name: Option<String>,
    /// Shape points in source orientation.
    pub geometry: Vec<GeoPoint>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// `end_time - start_time`; negative means progress toward the reference.
    pub dt: Option<f64>,
    pub ignore: bool,
    pub w: NextHop,
    pub v2: NodeId,
    pub through_traffic: f64,
    pub current_traffic: f64,
    pub resolution: Resolution,
}

impl Edge {
    #[inline]
    pub fn edge_key(&self) -> EdgeKey {
        EdgeKey::new(self.u, self.v)
    }

    /// Free-flow traversal time in seconds.
    #[inline]
    pub fn est_time(&self) -> f64 {
        self.length / self.speed_mps
    }

    /// `dt / est_time` for progress edges (`dt < 0`), `None` otherwise.
    pub fn efficiency(&self) -> Option<f64> {
        match self.dt {
            Some(dt) if dt < 0.0 => Some(dt / self.est_time()),
            _ => None,
        }
    }

    /// Set the next hop together with the stage that produced it.
    pub fn assign(&mut self, w: NextHop, resolution: Resolution) {
        self.w = w;
        self.resolution = if w.is_sink() { Resolution::Sink } else { resolution };
    }
}

// ── EdgeTable ─────────────────────────────────────────────────────────────────

/// Node and edge arena in CSR layout.
///
/// Built by [`EdgeTableBuilder`](crate::EdgeTableBuilder); fields that must
/// stay consistent with the indices are private.
#[derive(Clone, Debug)]
pub struct EdgeTable {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    node_out_start: Vec<u32>,
    node_index: FxHashMap<NodeId, u32>,
    edge_index: FxHashMap<EdgeKey, u32>,
    reference: NodeId,
    orientation: Orientation,
}

impl EdgeTable {
    /// Assemble a table from deduplicated records.  Sorts both arrays and
    /// builds the row pointer and hash indices; every edge endpoint must be
    /// present in `nodes`.
    pub(crate) fn from_parts(
        mut nodes: Vec<Node>,
        mut edges: Vec<Edge>,
        reference: NodeId,
        orientation: Orientation,
    ) -> Self {
        nodes.sort_unstable_by_key(|n| n.id);
        edges.sort_unstable_by_key(|e| (e.u, e.v));

        let node_index: FxHashMap<NodeId, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i as u32))
            .collect();
        let edge_index: FxHashMap<EdgeKey, u32> = edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.edge_key(), i as u32))
            .collect();

        // Count out-degree per node, then prefix-sum into the row pointer.
        let mut node_out_start = vec![0u32; nodes.len() + 1];
        for e in &edges {
            if let Some(&i) = node_index.get(&e.u) {
                node_out_start[i as usize + 1] += 1;
            }
        }
        for i in 1..node_out_start.len() {
            node_out_start[i] += node_out_start[i - 1];
        }

        Self { nodes, edges, node_out_start, node_index, edge_index, reference, orientation }
    }

    // ── Dimensions and metadata ───────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn reference(&self) -> NodeId {
        self.reference
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// `true` when `u`/`v` were swapped on intake.
    pub fn is_reversed(&self) -> bool {
        !self.orientation.is_towards()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn node_idx(&self, id: NodeId) -> Option<usize> {
        self.node_index.get(&id).map(|&i| i as usize)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_idx(id).map(|i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.node_idx(id).map(|i| &mut self.nodes[i])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn transit_time(&self, id: NodeId) -> Option<f64> {
        self.node(id).and_then(|n| n.transit_time)
    }

    #[inline]
    pub fn edge_idx(&self, key: EdgeKey) -> Option<usize> {
        self.edge_index.get(&key).map(|&i| i as usize)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edge_idx(key).map(|i| &self.edges[i])
    }

    pub fn edge_mut(&mut self, key: EdgeKey) -> Option<&mut Edge> {
        self.edge_idx(key).map(|i| &mut self.edges[i])
    }

    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edge_index.contains_key(&key)
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Edge indices of all outgoing edges of `id`, ascending by `v`.
    /// Empty for unknown nodes.
    #[inline]
    pub fn out_edges(&self, id: NodeId) -> Range<usize> {
        match self.node_idx(id) {
            Some(i) => {
                self.node_out_start[i] as usize..self.node_out_start[i + 1] as usize
            }
            None => 0..0,
        }
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.out_edges(id).len()
    }

    /// Indices of edges still awaiting a next hop and not ignored.
    pub fn unresolved_edges(&self) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.ignore && !e.w.is_resolved())
            .map(|(i, _)| i)
            .collect()
    }

    /// Key of edge `idx` in the orientation of the source graph.
    pub fn oriented_key(&self, idx: usize) -> EdgeKey {
        let key = self.edges[idx].edge_key();
        if self.is_reversed() { key.flipped() } else { key }
    }

    /// Tally of edges by resolution state.
    pub fn counts(&self) -> TableCounts {
        let mut c = TableCounts { nodes: self.nodes.len(), edges: self.edges.len(), ..Default::default() };
        for e in &self.edges {
            if e.ignore {
                c.ignored += 1;
            }
            match e.resolution {
                Resolution::Unresolved        => c.unresolved += 1,
                Resolution::HeuristicResolved => c.heuristic += 1,
                Resolution::SearchResolved    => c.search += 1,
                Resolution::OracleResolved    => c.oracle += 1,
                Resolution::Sink              => c.sink += 1,
            }
        }
        c
    }
}

/// Resolution summary over an [`EdgeTable`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub nodes: usize,
    pub edges: usize,
    pub ignored: usize,
    pub unresolved: usize,
    pub heuristic: usize,
    pub search: usize,
    pub oracle: usize,
    pub sink: usize,
}

impl TableCounts {
    pub fn resolved(&self) -> usize {
        self.edges - self.unresolved
    }
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} edges ({} ignored): {} heuristic, {} search, {} oracle, {} sink, {} unresolved",
            self.nodes, self.edges, self.ignored, self.heuristic, self.search, self.oracle,
            self.sink, self.unresolved,
        )
    }
}
