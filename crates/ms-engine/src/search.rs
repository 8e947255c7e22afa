//! Bounded forward search for edges the heuristic left ambiguous.
//!
//! For an unresolved edge `s = (u, v)` all paths of `1..=n` further hops are
//! enumerated with an explicit-stack DFS, for `n = 1, 2, …, depth`:
//!
//! * an edge whose next hop is `Node(x)` may only continue along `(v, x)`;
//! * a sink edge, or an edge whose continuation is not in the table, ends
//!   the path early;
//! * an unresolved edge branches over every outgoing edge of its `v`.
//!
//! Paths that end closer to the reference than `s` does are ranked by
//! `total_dt / total_length`, and the first minimum in enumeration order is
//! written back along the path.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use ms_core::{EdgeKey, NextHop, NodeId, Resolution};
use ms_graph::EdgeTable;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Start edges searched from.
    pub attempted: usize,
    /// Edges that received a next hop, including downstream path edges.
    pub resolved: usize,
    /// Start edges for which no improving path was found.
    pub exhausted: usize,
}

#[derive(Clone, Debug)]
pub struct RecursiveSearchResolver {
    depth: usize,
}

impl RecursiveSearchResolver {
    pub fn new(depth: usize) -> Self {
        Self { depth }
    }

    pub fn resolve(&self, table: &mut EdgeTable) -> SearchReport {
        let mut todo = table.unresolved_edges();
        // Farthest first; unknown end times last.
        todo.sort_by(|&a, &b| match (table.edges[a].end_time, table.edges[b].end_time) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let mut report = SearchReport::default();
        for s in todo {
            if table.edges[s].w.is_resolved() {
                continue;
            }
            report.attempted += 1;

            let best = (1..=self.depth).find_map(|n| best_path(table, s, n));
            match best {
                Some(path) => match apply_path(table, &path) {
                    Some(written) => report.resolved += written,
                    None => {
                        let key = table.edges[s].edge_key();
                        warn!(edge = %key, "search path conflicts with existing next hops, skipped");
                        report.exhausted += 1;
                    }
                },
                None => {
                    debug!(edge = %table.edges[s].edge_key(), depth = self.depth, "no improving path");
                    report.exhausted += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            resolved = report.resolved,
            exhausted = report.exhausted,
            "follow-up search routing"
        );
        report
    }
}

/// Enumerate paths of up to `n` hops beyond `s` and return the best
/// improving one, as edge indices starting with `s`.
fn best_path(table: &EdgeTable, s: usize, n: usize) -> Option<Vec<usize>> {
    let s_end = table.edges[s].end_time?;
    let mut best: Option<(f64, Vec<usize>)> = None;

    // Each stack entry is a partial path; children are pushed in reverse so
    // they pop in out-edge order.
    let mut stack: Vec<Vec<usize>> = vec![vec![s]];
    while let Some(path) = stack.pop() {
        let last = path[path.len() - 1];
        let next = if path.len() > n { Vec::new() } else { continuations(table, last) };

        if next.is_empty() {
            let Some(end) = table.edges[last].end_time else { continue };
            let dt = end - s_end;
            if dt < 0.0 {
                let length: f64 = path.iter().map(|&i| table.edges[i].length).sum();
                let efficiency = dt / length;
                if best.as_ref().is_none_or(|(b, _)| efficiency < *b) {
                    best = Some((efficiency, path));
                }
            }
            continue;
        }

        for &i in next.iter().rev() {
            let mut p = path.clone();
            p.push(i);
            stack.push(p);
        }
    }
    best.map(|(_, path)| path)
}

fn continuations(table: &EdgeTable, edge: usize) -> Vec<usize> {
    let e = &table.edges[edge];
    match e.w {
        NextHop::Sink => Vec::new(),
        NextHop::Node(x) => table.edge_idx(EdgeKey::new(e.v, x)).into_iter().collect(),
        NextHop::Unresolved => table.out_edges(e.v).collect(),
    }
}

/// Write `w` along `path`; `None` (and no writes) if any edge already holds
/// a different next hop.  Returns how many edges changed.
fn apply_path(table: &mut EdgeTable, path: &[usize]) -> Option<usize> {
    let mut planned: FxHashMap<usize, NodeId> = FxHashMap::default();
    for pair in path.windows(2) {
        let (step, next) = (pair[0], pair[1]);
        let target = table.edges[next].v;
        let consistent = match table.edges[step].w {
            NextHop::Unresolved => true,
            NextHop::Node(x) => x == target,
            NextHop::Sink => false,
        };
        if !consistent || planned.insert(step, target).is_some_and(|t| t != target) {
            return None;
        }
    }

    let mut written = 0;
    for (step, target) in planned {
        let e = &mut table.edges[step];
        if !e.w.is_resolved() {
            e.assign(NextHop::Node(target), Resolution::SearchResolved);
            written += 1;
            let v = e.v;
            if let Some(n) = table.node_mut(v) {
                if n.resolution == Resolution::Unresolved {
                    n.resolution = Resolution::SearchResolved;
                }
            }
        }
    }
    Some(written)
}
