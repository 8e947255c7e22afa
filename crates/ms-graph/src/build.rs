//! Normalize a [`RawGraph`] into an [`EdgeTable`].

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use ms_core::config::DEFAULT_SPEED_MPS;
use ms_core::{EdgeKey, NextHop, NodeId, Orientation, Resolution};

use crate::raw::{RawEdge, RawGraph};
use crate::road::parse_maxspeed;
use crate::table::{Edge, EdgeTable, Node};
use crate::{GraphError, GraphResult};

/// Builds the resolver table from a raw multigraph.
///
/// * `AwayFromReference` swaps `u` and `v` on intake so every later stage
///   reasons about "toward the reference" only.
/// * Parallel edges per `(u, v)` collapse to the longest one; equal lengths
///   keep the lowest parallel key.
/// * Self-loops are dropped.
/// * Edges without a parseable `maxspeed` travel at the default speed.
///
/// # Example
///
/// ```
/// use ms_core::{GeoPoint, NodeId, Orientation};
/// use ms_graph::{EdgeAttrs, EdgeTableBuilder, RawGraphBuilder};
///
/// let mut b = RawGraphBuilder::new();
/// let a = b.add_node(NodeId(1), GeoPoint::new(43.64, -72.25));
/// let r = b.add_node(NodeId(2), GeoPoint::new(43.65, -72.25));
/// b.add_road(a, r, EdgeAttrs::new(1_100.0, "residential"));
///
/// let table = EdgeTableBuilder::new(Orientation::TowardsReference)
///     .build(&b.build(), r)
///     .unwrap();
/// assert_eq!(table.edge_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct EdgeTableBuilder {
    orientation: Orientation,
    default_speed_mps: f64,
}

impl EdgeTableBuilder {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation, default_speed_mps: DEFAULT_SPEED_MPS }
    }

    /// Speed assumed for edges without a `maxspeed` tag.
    pub fn default_speed(mut self, mps: f64) -> Self {
        self.default_speed_mps = mps;
        self
    }

    /// Build the table.
    ///
    /// # Errors
    ///
    /// [`GraphError::Empty`] for a graph without nodes,
    /// [`GraphError::NodeNotFound`] if `reference` is not a graph node, and
    /// [`GraphError::DanglingEdge`] for an edge whose endpoint is missing.
    pub fn build(&self, raw: &RawGraph, reference: NodeId) -> GraphResult<EdgeTable> {
        if raw.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut seen = FxHashSet::default();
        let nodes: Vec<Node> = raw
            .nodes
            .iter()
            .filter(|n| seen.insert(n.id))
            .map(|n| {
                let (x, y) = n.pos.to_mercator();
                Node {
                    id: n.id,
                    pos: n.pos,
                    x,
                    y,
                    highway: n.highway.clone(),
                    transit_time: None,
                    resolution: if n.id == reference { Resolution::Sink } else { Resolution::Unresolved },
                }
            })
            .collect();

        if !seen.contains(&reference) {
            return Err(GraphError::NodeNotFound(reference));
        }

        // ── Deduplicate parallel edges ────────────────────────────────────
        let mut kept: FxHashMap<EdgeKey, &RawEdge> = FxHashMap::default();
        let mut self_loops = 0usize;
        for e in &raw.edges {
            if !seen.contains(&e.u) || !seen.contains(&e.v) {
                return Err(GraphError::DanglingEdge { u: e.u, v: e.v });
            }
            if e.u == e.v {
                self_loops += 1;
                continue;
            }
            let key = match self.orientation {
                Orientation::TowardsReference => EdgeKey::new(e.u, e.v),
                Orientation::AwayFromReference => EdgeKey::new(e.v, e.u),
            };
            kept.entry(key)
                .and_modify(|cur| {
                    if e.length_m > cur.length_m || (e.length_m == cur.length_m && e.key < cur.key) {
                        *cur = e;
                    }
                })
                .or_insert(e);
        }

        let duplicates = raw.edges.len() - self_loops - kept.len();
        let edges: Vec<Edge> = kept
            .into_iter()
            .map(|(key, e)| self.edge_record(key, e))
            .collect();

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            duplicates,
            self_loops,
            orientation = self.orientation.as_str(),
            "edge table built"
        );

        Ok(EdgeTable::from_parts(nodes, edges, reference, self.orientation))
    }

    fn edge_record(&self, key: EdgeKey, e: &RawEdge) -> Edge {
        let maxspeed = e.maxspeed.as_deref().and_then(parse_maxspeed);
        Edge {
            u: key.u,
            v: key.v,
            key: e.key,
            length: e.length_m,
            highway: e.highway.clone(),
            maxspeed,
            speed_mps: maxspeed.unwrap_or(self.default_speed_mps),
            oneway: e.oneway,
            name: e.name.clone(),
            geometry: e.geometry.clone(),
            start_time: None,
            end_time: None,
            dt: None,
            ignore: false,
            w: NextHop::Unresolved,
            v2: key.v,
            through_traffic: 0.0,
            current_traffic: 0.0,
            resolution: Resolution::Unresolved,
        }
    }
}
