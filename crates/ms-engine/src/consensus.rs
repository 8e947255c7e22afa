//! Oracle-backed resolution by majority vote.
//!
//! Each iteration samples a batch of unresolved edges (topped up with
//! already-resolved ones as a cross-check), routes once per distinct `v`
//! node through the [`RoutePool`], turns every route into `(u, v, w)`
//! evidence triplets and merges the per-`(u, v)` mode back into the table.
//! Route evidence overrides earlier heuristic or search answers but never a
//! sink.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use ms_core::{BatchRng, ConsensusConfig, EdgeKey, GeoPoint, NextHop, NodeId, Orientation, Resolution, TravelMode};
use ms_graph::EdgeTable;
use ms_oracle::{OracleError, RoutingOracle};

use crate::pool::{RouteJob, RoutePool};
use crate::{EngineResult, PipelineObserver};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsensusReport {
    pub iterations: usize,
    /// Route requests issued.
    pub requests: usize,
    /// Requests that produced no evidence (transport errors and no-route).
    pub failed_requests: usize,
    /// Nodes the oracle found no route for, ascending.
    pub missing_nodes: Vec<NodeId>,
    /// Previously unresolved edges that received a next hop.
    pub newly_resolved: usize,
    /// Non-ignored edges still unresolved at the end.
    pub remaining: usize,
}

pub struct ConsensusOracleResolver {
    config: ConsensusConfig,
    mode:   TravelMode,
}

impl ConsensusOracleResolver {
    pub fn new(config: ConsensusConfig, mode: TravelMode) -> Self {
        Self { config, mode }
    }

    pub fn resolve<O, Obs>(
        &self,
        table: &mut EdgeTable,
        oracle: &O,
        pool: &RoutePool,
        observer: &mut Obs,
    ) -> EngineResult<ConsensusReport>
    where
        O: RoutingOracle + ?Sized,
        Obs: PipelineObserver + ?Sized,
    {
        self.config.validate()?;
        let reference = table.reference();
        let origin = table
            .node(reference)
            .map(|n| n.pos)
            .ok_or(ms_graph::GraphError::NodeNotFound(reference))?;

        let mut rng = BatchRng::new(self.config.seed);
        let mut report = ConsensusReport::default();
        let mut missing: BTreeSet<NodeId> = BTreeSet::new();

        for i in 0..self.config.max_iter {
            // ── ① Sample the batch ────────────────────────────────────────
            let unsolved = table.unresolved_edges();
            let mut batch = rng.sample(&unsolved, self.config.batch_size);
            let extra = self.config.batch_size - batch.len();
            if extra > 0 {
                let resolved: Vec<usize> = (0..table.edge_count())
                    .filter(|&e| !table.edges[e].ignore && table.edges[e].w.node().is_some())
                    .collect();
                batch.extend(rng.sample(&resolved, extra));
            }
            if batch.is_empty() {
                break;
            }

            // ── ② One route per distinct v ────────────────────────────────
            let mut by_node: BTreeMap<NodeId, Vec<EdgeKey>> = BTreeMap::new();
            for &e in &batch {
                let key = table.edges[e].edge_key();
                by_node.entry(key.v).or_default().push(key);
            }
            let jobs: Vec<RouteJob> = by_node
                .keys()
                .filter_map(|&v| table.node(v).map(|n| route_job(v, n.pos, origin, table.orientation())))
                .collect();
            let outcomes = pool.run(oracle, &jobs, self.mode);
            report.requests += jobs.len();

            // ── ③ Evidence triplets ───────────────────────────────────────
            let mut tally: FxHashMap<EdgeKey, FxHashMap<NodeId, usize>> = FxHashMap::default();
            for outcome in outcomes {
                let path = match outcome.result {
                    Ok(path) => path,
                    Err(OracleError::NoRoute { .. }) => {
                        debug!(node = %outcome.node, "no route");
                        missing.insert(outcome.node);
                        report.failed_requests += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!(node = %outcome.node, error = %e, "route request dropped");
                        report.failed_requests += 1;
                        continue;
                    }
                };
                let route = resolver_route(table, path.nodes);
                for key in by_node.get(&outcome.node).into_iter().flatten() {
                    for t in triplets(key, &route) {
                        *tally.entry(EdgeKey::new(t[0], t[1])).or_default().entry(t[2]).or_default() += 1;
                    }
                }
            }

            // ── ④ Majority vote, ⑤ merge ──────────────────────────────────
            let votes: BTreeMap<EdgeKey, NodeId> =
                tally.into_iter().filter_map(|(key, counts)| Some((key, mode_of(&counts)?))).collect();
            let newly = self.merge(table, &votes);
            report.newly_resolved += newly;
            report.iterations = i + 1;

            debug!(
                iteration = i,
                unsolved = unsolved.len(),
                batch = batch.len(),
                requests = jobs.len(),
                votes = votes.len(),
                newly_resolved = newly,
                "consensus batch"
            );
            observer.on_consensus_iteration(i, unsolved.len(), newly);

            // ── ⑥ Stop condition ──────────────────────────────────────────
            if unsolved.is_empty() && i >= self.config.min_iter {
                break;
            }
        }

        report.missing_nodes = missing.into_iter().collect();
        report.remaining = table.unresolved_edges().len();
        info!(
            iterations = report.iterations,
            requests = report.requests,
            failed = report.failed_requests,
            missing_nodes = report.missing_nodes.len(),
            newly_resolved = report.newly_resolved,
            remaining = report.remaining,
            "oracle consensus routing"
        );
        Ok(report)
    }

    /// Apply voted next hops; returns how many were previously unresolved.
    fn merge(&self, table: &mut EdgeTable, votes: &BTreeMap<EdgeKey, NodeId>) -> usize {
        let mut newly = 0;
        for (&key, &w) in votes {
            let Some(idx) = table.edge_idx(key) else { continue };
            if table.edges[idx].w.is_sink() {
                continue;
            }
            let Some((v2, w)) = repair_gap(table, votes, key.v, w, self.config.gap_repair_limit) else {
                debug!(edge = %key, "vote without reachable continuation discarded");
                continue;
            };
            let e = &mut table.edges[idx];
            if !e.w.is_resolved() {
                newly += 1;
            }
            e.v2 = v2;
            e.assign(NextHop::Node(w), Resolution::OracleResolved);
            if let Some(n) = table.node_mut(key.v) {
                if n.resolution != Resolution::Sink {
                    n.resolution = Resolution::OracleResolved;
                }
            }
        }
        newly
    }
}

pub(crate) fn route_job(v: NodeId, pos: GeoPoint, origin: GeoPoint, orientation: Orientation) -> RouteJob {
    match orientation {
        Orientation::TowardsReference => RouteJob { node: v, from: pos, to: origin },
        Orientation::AwayFromReference => RouteJob { node: v, from: origin, to: pos },
    }
}

/// Oracle route nodes restricted to the table, in resolver orientation.
pub(crate) fn resolver_route(table: &EdgeTable, nodes: Vec<NodeId>) -> Vec<NodeId> {
    let mut route: Vec<NodeId> = nodes.into_iter().filter(|&n| table.contains_node(n)).collect();
    if table.is_reversed() {
        route.reverse();
    }
    route
}

/// `[u, v, route…]` windowed into `(u, v, w)` triplets.  `v` is prepended
/// only if the route does not already start there.
pub(crate) fn triplets(key: &EdgeKey, route: &[NodeId]) -> Vec<[NodeId; 3]> {
    let mut anchored = Vec::with_capacity(route.len() + 2);
    anchored.push(key.u);
    if route.first() != Some(&key.v) {
        anchored.push(key.v);
    }
    anchored.extend_from_slice(route);
    anchored.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
}

/// Most frequent value; ties go to the lowest node id.
pub(crate) fn mode_of(counts: &FxHashMap<NodeId, usize>) -> Option<NodeId> {
    counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(&n, _)| n)
}

/// Resolve `(v, w)` to a pair `(v2, w2)` with `(v2, w2)` in the table,
/// following the vote chain forward when `(v, w)` itself is missing.
pub(crate) fn repair_gap(
    table: &EdgeTable,
    votes: &BTreeMap<EdgeKey, NodeId>,
    v: NodeId,
    w: NodeId,
    limit: usize,
) -> Option<(NodeId, NodeId)> {
    let (mut cu, mut cv) = (v, w);
    if table.contains_edge(EdgeKey::new(cu, cv)) {
        return Some((cu, cv));
    }
    for _ in 0..limit {
        let next = *votes.get(&EdgeKey::new(cu, cv))?;
        if table.contains_edge(EdgeKey::new(cv, next)) {
            return Some((cv, next));
        }
        (cu, cv) = (cv, next);
    }
    None
}
