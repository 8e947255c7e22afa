//! In-process oracle: Dijkstra over the street graph itself.
//!
//! Stands in for an external routing service in tests and offline runs.
//! Costs are free-flow travel times (`length / speed`) in integer
//! milliseconds so heap ordering is total and deterministic.
//!
//! | Mode | Speed                                               |
//! |------|-----------------------------------------------------|
//! | Car  | parsed `maxspeed`, else the road-class default      |
//! | Walk | 1.4 m/s                                             |
//! | Bike | 4.2 m/s                                             |

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use ms_core::{GeoPoint, NodeId, Orientation, TravelMode};
use ms_graph::road::{class_speed_mps, parse_maxspeed};
use ms_graph::{NodeLocator, RawGraph};

use crate::oracle::{RoutePath, RoutingOracle};
use crate::{OracleError, OracleResult};

/// Unreached marker in distance arrays.
const UNREACHED: u64 = u64::MAX;

/// Adjacency in CSR form over dense node indices.
struct Csr {
    out_start: Vec<u32>,
    edge_to:   Vec<u32>,
    /// Length (m) and car speed (m/s) of each edge.
    edge_len:  Vec<f64>,
    edge_car:  Vec<f64>,
}

impl Csr {
    fn build(n: usize, mut edges: Vec<(u32, u32, f64, f64)>) -> Self {
        edges.sort_unstable_by_key(|e| (e.0, e.1));
        let mut out_start = vec![0u32; n + 1];
        for e in &edges {
            out_start[e.0 as usize + 1] += 1;
        }
        for i in 1..out_start.len() {
            out_start[i] += out_start[i - 1];
        }
        Self {
            out_start,
            edge_to:  edges.iter().map(|e| e.1).collect(),
            edge_len: edges.iter().map(|e| e.2).collect(),
            edge_car: edges.iter().map(|e| e.3).collect(),
        }
    }

    #[inline]
    fn out_edges(&self, node: u32) -> std::ops::Range<usize> {
        self.out_start[node as usize] as usize..self.out_start[node as usize + 1] as usize
    }

    #[inline]
    fn cost_ms(&self, edge: usize, mode: TravelMode) -> u64 {
        let speed = mode.fixed_speed_mps().unwrap_or(self.edge_car[edge]);
        (self.edge_len[edge] / speed * 1_000.0).round() as u64
    }
}

/// Dijkstra oracle over a [`RawGraph`].
pub struct GraphOracle {
    ids:     Vec<NodeId>,
    index:   FxHashMap<NodeId, u32>,
    /// Forward adjacency.
    fwd:     Csr,
    /// Reversed adjacency, for many-to-one tables.
    rev:     Csr,
    locator: NodeLocator,
}

impl GraphOracle {
    pub fn new(graph: &RawGraph) -> Self {
        let ids: Vec<NodeId> = graph.nodes.iter().map(|n| n.id).collect();
        let index: FxHashMap<NodeId, u32> =
            ids.iter().enumerate().map(|(i, &id)| (id, i as u32)).collect();

        let mut fwd = Vec::with_capacity(graph.edge_count());
        let mut rev = Vec::with_capacity(graph.edge_count());
        for e in &graph.edges {
            let (Some(&u), Some(&v)) = (index.get(&e.u), index.get(&e.v)) else {
                continue;
            };
            let car = e
                .maxspeed
                .as_deref()
                .and_then(parse_maxspeed)
                .or_else(|| class_speed_mps(&e.highway))
                .unwrap_or(ms_core::config::DEFAULT_SPEED_MPS);
            fwd.push((u, v, e.length_m, car));
            rev.push((v, u, e.length_m, car));
        }

        Self {
            fwd: Csr::build(ids.len(), fwd),
            rev: Csr::build(ids.len(), rev),
            locator: NodeLocator::new(graph),
            ids,
            index,
        }
    }

    fn snap(&self, pos: GeoPoint) -> Option<u32> {
        self.locator.nearest(pos).and_then(|id| self.index.get(&id).copied())
    }

    /// One-to-all costs from `source`, with predecessor nodes.
    fn dijkstra(&self, csr: &Csr, source: u32, target: Option<u32>, mode: TravelMode) -> (Vec<u64>, Vec<u32>) {
        let n = self.ids.len();
        let mut dist = vec![UNREACHED; n];
        let mut prev = vec![u32::MAX; n];
        dist[source as usize] = 0;

        // Secondary key (node index) makes tie-breaking deterministic.
        let mut heap: BinaryHeap<Reverse<(u64, u32)>> = BinaryHeap::new();
        heap.push(Reverse((0, source)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if Some(node) == target {
                break;
            }
            if cost > dist[node as usize] {
                continue;
            }
            for edge in csr.out_edges(node) {
                let next = csr.edge_to[edge];
                let new_cost = cost.saturating_add(csr.cost_ms(edge, mode));
                if new_cost < dist[next as usize] {
                    dist[next as usize] = new_cost;
                    prev[next as usize] = node;
                    heap.push(Reverse((new_cost, next)));
                }
            }
        }
        (dist, prev)
    }
}

impl RoutingOracle for GraphOracle {
    fn table(
        &self,
        reference: GeoPoint,
        sources: &[GeoPoint],
        orientation: Orientation,
        mode: TravelMode,
    ) -> OracleResult<Vec<Option<f64>>> {
        let Some(root) = self.snap(reference) else {
            return Ok(vec![None; sources.len()]);
        };
        // Towards: costs from every node to the root = search on the reversed graph.
        let csr = if orientation.is_towards() { &self.rev } else { &self.fwd };
        let (dist, _) = self.dijkstra(csr, root, None, mode);
        Ok(sources
            .iter()
            .map(|&p| {
                self.snap(p)
                    .map(|i| dist[i as usize])
                    .filter(|&d| d != UNREACHED)
                    .map(|d| d as f64 / 1_000.0)
            })
            .collect())
    }

    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> OracleResult<RoutePath> {
        let no_route = || OracleError::NoRoute { from, to };
        let (s, t) = match (self.snap(from), self.snap(to)) {
            (Some(s), Some(t)) => (s, t),
            _ => return Err(no_route()),
        };
        let (dist, prev) = self.dijkstra(&self.fwd, s, Some(t), mode);
        if dist[t as usize] == UNREACHED {
            return Err(no_route());
        }

        let mut nodes = vec![self.ids[t as usize]];
        let mut cur = t;
        while cur != s {
            cur = prev[cur as usize];
            nodes.push(self.ids[cur as usize]);
        }
        nodes.reverse();
        Ok(RoutePath { nodes, duration_secs: dist[t as usize] as f64 / 1_000.0 })
    }
}
