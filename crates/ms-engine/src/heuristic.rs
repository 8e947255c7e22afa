//! Greedy next-hop assignment from transit-time deltas.
//!
//! For every node the outgoing edge with the steepest progress toward the
//! reference (most negative `dt / est_time`) is its *best exit*; an edge
//! `(u, v)` then continues along `v`'s best exit.  Equal efficiencies go to
//! the lowest target id (out-edges are scanned in ascending `v` order and
//! only a strictly better candidate replaces the current one).
//!
//! The stage recomputes every derived attribute from scratch, so running it
//! twice leaves the table unchanged.

use tracing::info;

use ms_core::{NextHop, NodeId, PipelineConfig, Resolution};
use ms_graph::EdgeTable;
use ms_graph::road::is_minor;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeuristicReport {
    /// Edges given a `Node` next hop.
    pub resolved: usize,
    pub sinks: usize,
    pub ignored: usize,
    /// Non-ignored edges left without a next hop.
    pub unresolved: usize,
}

#[derive(Clone, Debug)]
pub struct HeuristicResolver {
    strict_ignore:     bool,
    default_speed_mps: f64,
}

impl HeuristicResolver {
    pub fn new(strict_ignore: bool, default_speed_mps: f64) -> Self {
        Self { strict_ignore, default_speed_mps }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.strict_ignore, config.default_speed_mps)
    }

    pub fn resolve(&self, table: &mut EdgeTable) -> HeuristicReport {
        // ── ① Per-edge times, ignore flag and speed ───────────────────────
        let times: Vec<(Option<f64>, Option<f64>)> = table
            .edges
            .iter()
            .map(|e| (table.transit_time(e.u), table.transit_time(e.v)))
            .collect();
        for (e, (start, end)) in table.edges.iter_mut().zip(times) {
            e.start_time = start;
            e.end_time = end;
            e.dt = start.zip(end).map(|(s, t)| t - s);
            let receding = !matches!(e.dt, Some(dt) if dt < 0.0);
            e.ignore = is_minor(&e.highway) || (self.strict_ignore && receding);
            e.speed_mps = e.maxspeed.unwrap_or(self.default_speed_mps);
        }

        // ── ② Best exit per node ──────────────────────────────────────────
        let best_exit: Vec<Option<NodeId>> = table
            .nodes
            .iter()
            .map(|n| {
                let mut best: Option<(f64, NodeId)> = None;
                for i in table.out_edges(n.id) {
                    let e = &table.edges[i];
                    if let Some(eff) = e.efficiency() {
                        if best.is_none_or(|(b, _)| eff < b) {
                            best = Some((eff, e.v));
                        }
                    }
                }
                best.map(|(_, v)| v)
            })
            .collect();

        // ── ③ Assign w, v2 and sinks ──────────────────────────────────────
        let mut report = HeuristicReport::default();
        for i in 0..table.edges.len() {
            let v = table.edges[i].v;
            let exit = table.node_idx(v).and_then(|n| best_exit[n]);
            let e = &mut table.edges[i];
            e.v2 = v;
            e.w = match exit {
                Some(x) => NextHop::Node(x),
                None => NextHop::Unresolved,
            };
            if e.end_time == Some(0.0) {
                e.w = NextHop::Sink;
            }
            e.resolution = match e.w {
                NextHop::Unresolved => Resolution::Unresolved,
                NextHop::Sink => Resolution::Sink,
                NextHop::Node(_) => Resolution::HeuristicResolved,
            };

            match e.w {
                NextHop::Sink => report.sinks += 1,
                NextHop::Node(_) => report.resolved += 1,
                NextHop::Unresolved if !e.ignore => report.unresolved += 1,
                NextHop::Unresolved => {}
            }
            if e.ignore {
                report.ignored += 1;
            }
        }

        let reference = table.reference();
        for (n, exit) in table.nodes.iter_mut().zip(&best_exit) {
            n.resolution = if n.id == reference {
                Resolution::Sink
            } else if exit.is_some() {
                Resolution::HeuristicResolved
            } else {
                Resolution::Unresolved
            };
        }

        info!(
            resolved = report.resolved,
            sinks = report.sinks,
            ignored = report.ignored,
            unresolved = report.unresolved,
            "heuristic routing"
        );
        report
    }
}
