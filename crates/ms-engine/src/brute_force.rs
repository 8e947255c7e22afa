//! Baseline throughput from one oracle route per node.
//!
//! Nodes are visited in ascending id order and every node not yet
//! *calculated* is routed to the reference.  Walking a route, each
//! uncalculated node adds one trip to the running volume and becomes
//! calculated; the volume is added to `through_traffic` of every edge the
//! route traverses.  A node whose trip has already been carried downstream is
//! therefore never routed or counted again.
//!
//! Requests go through the [`RoutePool`] in batches of `workers` nodes.  A
//! route whose origin was covered by an earlier route of the same batch is
//! discarded.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use ms_core::{EdgeKey, NodeId, TravelMode};
use ms_graph::EdgeTable;
use ms_oracle::{OracleError, RoutingOracle};

use crate::consensus::{resolver_route, route_job};
use crate::pool::{RouteJob, RoutePool};
use crate::EngineResult;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BruteForceReport {
    /// Route requests issued.
    pub requests: usize,
    /// Routes whose trips were added to the table.
    pub routed: usize,
    /// Routes discarded because their origin was already calculated.
    pub superseded: usize,
    pub failed_requests: usize,
    /// Nodes the oracle found no route for, ascending.
    pub missing_nodes: Vec<NodeId>,
    /// Consecutive route nodes with no table edge between them, ascending.
    pub missing_edges: Vec<EdgeKey>,
    /// Nodes calculated at the end, the reference included.
    pub calculated: usize,
    /// The request cap stopped the run with uncalculated nodes left.
    pub capped: bool,
}

pub struct BruteForceRouter {
    max_requests: Option<usize>,
    mode:         TravelMode,
}

impl BruteForceRouter {
    pub fn new(max_requests: Option<usize>, mode: TravelMode) -> Self {
        Self { max_requests, mode }
    }

    /// Overwrite `through_traffic` on every edge with routed trip counts.
    pub fn route_all<O>(&self, table: &mut EdgeTable, oracle: &O, pool: &RoutePool) -> EngineResult<BruteForceReport>
    where
        O: RoutingOracle + ?Sized,
    {
        let reference = table.reference();
        let ref_idx = table.node_idx(reference).ok_or(ms_graph::GraphError::NodeNotFound(reference))?;
        let origin = table.nodes[ref_idx].pos;

        for e in table.edges.iter_mut() {
            e.through_traffic = 0.0;
            e.current_traffic = 0.0;
        }
        let n = table.node_count();
        let mut calculated = vec![false; n];
        calculated[ref_idx] = true;

        let mut report = BruteForceReport::default();
        let mut missing_nodes: BTreeSet<NodeId> = BTreeSet::new();
        let mut missing_edges: BTreeSet<EdgeKey> = BTreeSet::new();
        let mut cursor = 0;

        loop {
            let budget = self.max_requests.map_or(usize::MAX, |m| m.saturating_sub(report.requests));
            if budget == 0 {
                report.capped = (cursor..n).any(|i| !calculated[i]);
                break;
            }

            // ── ① Next batch of uncalculated nodes ────────────────────────
            let size = pool.workers().min(budget);
            let mut jobs: Vec<RouteJob> = Vec::with_capacity(size);
            while cursor < n && jobs.len() < size {
                if !calculated[cursor] {
                    let node = &table.nodes[cursor];
                    jobs.push(route_job(node.id, node.pos, origin, table.orientation()));
                }
                cursor += 1;
            }
            if jobs.is_empty() {
                break;
            }
            let outcomes = pool.run(oracle, &jobs, self.mode);
            report.requests += jobs.len();

            // ── ② Add trips along each route, in node order ───────────────
            for outcome in outcomes {
                let path = match outcome.result {
                    Ok(path) => path,
                    Err(OracleError::NoRoute { .. }) => {
                        debug!(node = %outcome.node, "no route");
                        missing_nodes.insert(outcome.node);
                        report.failed_requests += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!(node = %outcome.node, error = %e, "route request dropped");
                        report.failed_requests += 1;
                        continue;
                    }
                };
                if table.node_idx(outcome.node).is_some_and(|i| calculated[i]) {
                    report.superseded += 1;
                    continue;
                }
                let route = resolver_route(table, path.nodes);
                add_trips(table, &route, &mut calculated, &mut missing_edges);
                report.routed += 1;
            }
            debug!(requests = report.requests, routed = report.routed, "brute-force batch");
        }

        report.missing_nodes = missing_nodes.into_iter().collect();
        report.missing_edges = missing_edges.into_iter().collect();
        report.calculated = calculated.iter().filter(|&&c| c).count();
        info!(
            requests = report.requests,
            routed = report.routed,
            superseded = report.superseded,
            failed = report.failed_requests,
            missing_edges = report.missing_edges.len(),
            calculated = report.calculated,
            capped = report.capped,
            "brute-force routing"
        );
        Ok(report)
    }
}

/// Walk `route`, counting one trip per newly calculated node.
fn add_trips(table: &mut EdgeTable, route: &[NodeId], calculated: &mut [bool], missing: &mut BTreeSet<EdgeKey>) {
    let mut trips = 0.0;
    for pair in route.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if let Some(i) = table.node_idx(a) {
            if !calculated[i] {
                calculated[i] = true;
                trips += 1.0;
            }
        }
        let key = EdgeKey::new(a, b);
        match table.edge_idx(key) {
            Some(e) => table.edges[e].through_traffic += trips,
            None => {
                missing.insert(key);
            }
        }
    }
}
