//! Raw street graph as handed over by a graph source.
//!
//! A `RawGraph` is a directed multigraph: nodes carry source ids, coordinates
//! and tags; edges carry length, road class and the raw `maxspeed` tag.  It
//! is plain serializable data so it can be snapshotted to disk and reloaded
//! without contacting the graph source again.  All normalization (type
//! coercion, orientation, parallel-edge deduplication) happens later in
//! [`EdgeTableBuilder`](crate::EdgeTableBuilder).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use ms_core::{GeoPoint, NodeId};

/// A node of the raw graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub pos: GeoPoint,
    /// Node-level `highway` tag (traffic signals, turning circles, …).
    #[serde(default)]
    pub highway: Option<String>,
}

/// A directed edge of the raw graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub u: NodeId,
    pub v: NodeId,
    /// Distinguishes parallel edges between the same `(u, v)`.
    pub key: u32,
    pub length_m: f64,
    pub highway: String,
    /// Raw OSM `maxspeed` tag, e.g. `"25 mph"` or `"50"`.
    #[serde(default)]
    pub maxspeed: Option<String>,
    #[serde(default)]
    pub oneway: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Vec<GeoPoint>,
}

/// Per-edge attributes passed to [`RawGraphBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
    pub length_m: f64,
    pub highway:  String,
    pub maxspeed: Option<String>,
    pub name:     Option<String>,
    pub geometry: Vec<GeoPoint>,
}

impl EdgeAttrs {
    pub fn new(length_m: f64, highway: impl Into<String>) -> Self {
        Self {
            length_m,
            highway:  highway.into(),
            maxspeed: None,
            name:     None,
            geometry: Vec::new(),
        }
    }

    pub fn maxspeed(mut self, tag: impl Into<String>) -> Self {
        self.maxspeed = Some(tag.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn geometry(mut self, points: Vec<GeoPoint>) -> Self {
        self.geometry = points;
        self
    }
}

/// Directed street multigraph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `NodeId → position` lookup for all nodes.
    pub fn positions(&self) -> FxHashMap<NodeId, GeoPoint> {
        self.nodes.iter().map(|n| (n.id, n.pos)).collect()
    }

    /// Position of a single node (linear scan; use [`positions`](Self::positions)
    /// for repeated lookups).
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.iter().find(|n| n.id == id).map(|n| n.pos)
    }

    /// Keep only nodes within `radius_m` of `center` and the edges between
    /// them.
    pub fn crop(mut self, center: GeoPoint, radius_m: f64) -> RawGraph {
        // ~111 km per degree of latitude; generous box for the cheap pre-filter.
        let half_deg = radius_m / 111_000.0 / center.lat.to_radians().cos().max(0.1);
        self.nodes.retain(|n| {
            n.pos.within_bbox(center, half_deg) && n.pos.distance_m(center) <= radius_m
        });
        let kept: FxHashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.edges.retain(|e| kept.contains(&e.u) && kept.contains(&e.v));
        self
    }
}

// ── RawGraphBuilder ───────────────────────────────────────────────────────────

/// Construct a [`RawGraph`] incrementally, then call [`build`](Self::build).
///
/// Parallel edges between the same `(u, v)` receive increasing `key`s in
/// insertion order.
///
/// # Example
///
/// ```
/// use ms_core::{GeoPoint, NodeId};
/// use ms_graph::{EdgeAttrs, RawGraphBuilder};
///
/// let mut b = RawGraphBuilder::new();
/// let a = b.add_node(NodeId(1), GeoPoint::new(43.64, -72.25));
/// let c = b.add_node(NodeId(2), GeoPoint::new(43.65, -72.25));
/// b.add_road(a, c, EdgeAttrs::new(1_100.0, "residential"));
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
pub struct RawGraphBuilder {
    nodes:     Vec<RawNode>,
    edges:     Vec<RawEdge>,
    positions: FxHashMap<NodeId, GeoPoint>,
    next_key:  FxHashMap<(NodeId, NodeId), u32>,
}

impl RawGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes:     Vec::new(),
            edges:     Vec::new(),
            positions: FxHashMap::default(),
            next_key:  FxHashMap::default(),
        }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading from OSM.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            edges:     Vec::with_capacity(edges),
            positions: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            next_key:  FxHashMap::with_capacity_and_hasher(edges, Default::default()),
        }
    }

    /// Add a node and return its id.  Re-adding an existing id is a no-op.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) -> NodeId {
        self.add_tagged_node(id, pos, None)
    }

    /// Add a node carrying a node-level `highway` tag.
    pub fn add_tagged_node(&mut self, id: NodeId, pos: GeoPoint, highway: Option<String>) -> NodeId {
        if self.positions.insert(id, pos).is_none() {
            self.nodes.push(RawNode { id, pos, highway });
        }
        id
    }

    /// Add a **directed** edge from `u` to `v`.
    pub fn add_directed_edge(&mut self, u: NodeId, v: NodeId, attrs: EdgeAttrs) {
        self.push_edge(u, v, attrs, true);
    }

    /// Convenience: add edges in **both directions** for a two-way segment.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) {
        let mut reverse = attrs.clone();
        reverse.geometry.reverse();
        self.push_edge(a, b, attrs, false);
        self.push_edge(b, a, reverse, false);
    }

    /// Position of a node added earlier (used by loaders to compute edge
    /// lengths between adjacent way nodes).
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.positions.get(&id).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    pub fn build(self) -> RawGraph {
        RawGraph { nodes: self.nodes, edges: self.edges }
    }

    fn push_edge(&mut self, u: NodeId, v: NodeId, attrs: EdgeAttrs, oneway: bool) {
        let slot = self.next_key.entry((u, v)).or_insert(0);
        let key = *slot;
        *slot += 1;
        self.edges.push(RawEdge {
            u,
            v,
            key,
            length_m: attrs.length_m,
            highway:  attrs.highway,
            maxspeed: attrs.maxspeed,
            oneway,
            name:     attrs.name,
            geometry: attrs.geometry,
        });
    }
}

impl Default for RawGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
