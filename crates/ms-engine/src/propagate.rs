//! Traffic relaxation along resolved next hops.
//!
//! Every resolved edge is seeded with `length / meters_per_unit` (zero on
//! motorways, scaled on local generator classes).  Each step tallies the
//! in-flight volume into `through_traffic` and moves it to the edge keyed
//! `(v2, w)`; sink edges absorb it, and volume whose target key is missing
//! is dropped.
//!
//! The next-edge relation is a functional graph, so the loop can only fail
//! to drain when volume circulates on a cycle.  Cycle membership is computed
//! once up front: as soon as every edge still holding volume lies on a
//! cycle, the remainder is reported as trapped and the loop stops.

use tracing::{info, warn};

use ms_core::{EdgeKey, NextHop, TrafficConfig};
use ms_graph::EdgeTable;
use ms_graph::road::{is_local_generator, is_motorway};

use crate::PipelineObserver;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PropagationReport {
    pub iterations: usize,
    pub seeded: f64,
    /// Volume that left the network through sink edges.
    pub absorbed: f64,
    /// Volume sent to a `(v2, w)` key missing from the table, or arriving
    /// on an unresolved edge.
    pub dropped: f64,
    /// Volume left circulating when the loop halted.
    pub trapped: f64,
    pub stalled: bool,
}

pub struct TrafficPropagator {
    config: TrafficConfig,
}

impl TrafficPropagator {
    pub fn new(config: TrafficConfig) -> Self {
        Self { config }
    }

    /// Initial volume for an edge.
    fn seed(&self, length: f64, highway: &str) -> f64 {
        if self.config.motorways_seed_zero && is_motorway(highway) {
            return 0.0;
        }
        let base = length / self.config.meters_per_unit;
        if is_local_generator(highway) { base * self.config.local_multiplier } else { base }
    }

    pub fn propagate<Obs>(&self, table: &mut EdgeTable, observer: &mut Obs) -> PropagationReport
    where
        Obs: PipelineObserver + ?Sized,
    {
        let n = table.edge_count();
        let mut report = PropagationReport::default();

        // ── Seeding ───────────────────────────────────────────────────────
        for i in 0..n {
            let seed = if table.edges[i].w.is_resolved() {
                self.seed(table.edges[i].length, &table.edges[i].highway)
            } else {
                0.0
            };
            let e = &mut table.edges[i];
            e.through_traffic = 0.0;
            e.current_traffic = seed;
            report.seeded += seed;
        }

        let next: Vec<Option<usize>> = table
            .edges
            .iter()
            .map(|e| match e.w {
                NextHop::Node(x) => table.edge_idx(EdgeKey::new(e.v2, x)),
                _ => None,
            })
            .collect();
        let on_cycle = cycle_members(&next);
        let cap = self.config.max_iterations.unwrap_or(n + 1);

        // ── Relaxation ────────────────────────────────────────────────────
        loop {
            let active: Vec<usize> = (0..n).filter(|&i| table.edges[i].current_traffic > 0.0).collect();
            if active.is_empty() {
                break;
            }
            let volume: f64 = active.iter().map(|&i| table.edges[i].current_traffic).sum();
            observer.on_propagation_iteration(report.iterations, active.len(), volume);

            if active.iter().all(|&i| on_cycle[i]) || report.iterations >= cap {
                report.trapped = volume;
                report.stalled = true;
                warn!(
                    iterations = report.iterations,
                    edges = active.len(),
                    volume,
                    "propagation stalled, traffic circulating"
                );
                break;
            }
            report.iterations += 1;

            let mut incoming = vec![0.0f64; n];
            for &i in &active {
                let e = &mut table.edges[i];
                let c = e.current_traffic;
                e.through_traffic += c;
                match (e.w, next[i]) {
                    (NextHop::Sink, _) => report.absorbed += c,
                    (NextHop::Node(_), Some(j)) => incoming[j] += c,
                    _ => report.dropped += c,
                }
            }
            for (e, c) in table.edges.iter_mut().zip(incoming) {
                e.current_traffic = c;
            }
        }

        info!(
            iterations = report.iterations,
            seeded = report.seeded,
            absorbed = report.absorbed,
            dropped = report.dropped,
            trapped = report.trapped,
            "traffic propagated"
        );
        report
    }
}

/// Mark the edges lying on a cycle of the functional graph `next`.
pub(crate) fn cycle_members(next: &[Option<usize>]) -> Vec<bool> {
    const NEW: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![NEW; next.len()];
    let mut on_cycle = vec![false; next.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..next.len() {
        if state[start] != NEW {
            continue;
        }
        let mut cur = Some(start);
        while let Some(i) = cur {
            match state[i] {
                NEW => {
                    state[i] = ON_PATH;
                    path.push(i);
                    cur = next[i];
                }
                ON_PATH => {
                    // Closed a loop: everything from `i` onward is on it.
                    if let Some(pos) = path.iter().position(|&p| p == i) {
                        for &p in &path[pos..] {
                            on_cycle[p] = true;
                        }
                    }
                    break;
                }
                _ => break,
            }
        }
        for p in path.drain(..) {
            state[p] = DONE;
        }
    }
    on_cycle
}
