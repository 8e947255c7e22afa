//! Nearest-node lookup.
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap the reference point (a geocoded address) onto the graph, and by
//! the in-process graph oracle to snap request coordinates.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ms_core::{GeoPoint, NodeId};

use crate::RawGraph;

/// Entry stored in the R-tree: a 2-D `[lat, lon]` point with its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Spatial index over a graph's nodes.
pub struct NodeLocator {
    tree: RTree<NodeEntry>,
}

impl NodeLocator {
    /// Bulk-load the index; O(N log N).
    pub fn new(graph: &RawGraph) -> Self {
        Self::from_points(graph.nodes.iter().map(|n| (n.id, n.pos)))
    }

    pub fn from_points(points: impl IntoIterator<Item = (NodeId, GeoPoint)>) -> Self {
        let entries: Vec<NodeEntry> = points
            .into_iter()
            .map(|(id, pos)| NodeEntry { point: [pos.lat, pos.lon], id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// The nearest node to `pos`; `None` only for an empty graph.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[pos.lat, pos.lon]).map(|e| e.id)
    }

    /// Up to `k` nearest nodes, sorted by ascending distance.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.tree
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
