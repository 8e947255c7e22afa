//! Plain data row types written by output backends.

use ms_graph::{EdgeTable, TableCounts};

/// One edge of the final table, keyed in source-graph orientation.
///
/// Only `u`/`v` and their transit times are flipped back for a reversed
/// table.  `w` and `v2` stay in resolver orientation, so there `(w, v2)` is
/// the source edge whose traffic feeds this one rather than the next edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub u:               i64,
    pub v:               i64,
    /// Legacy encoding: `0` unresolved, `-1` sink, otherwise a node id.
    pub w:               i64,
    pub v2:              i64,
    pub through_traffic: f64,
    /// Transit time of `u`, empty when unknown.
    pub u_time:          Option<f64>,
    pub v_time:          Option<f64>,
    pub highway:         String,
    pub length:          f64,
    pub ignore:          bool,
    pub resolution:      &'static str,
}

impl EdgeRow {
    /// Rows for every edge of `table`, in table order.
    pub fn from_table(table: &EdgeTable) -> Vec<EdgeRow> {
        table
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let key = table.oriented_key(i);
                EdgeRow {
                    u:               key.u.raw(),
                    v:               key.v.raw(),
                    w:               e.w.as_raw(),
                    v2:              e.v2.raw(),
                    through_traffic: e.through_traffic,
                    u_time:          table.transit_time(key.u),
                    v_time:          table.transit_time(key.v),
                    highway:         e.highway.clone(),
                    length:          e.length,
                    ignore:          e.ignore,
                    resolution:      e.resolution.as_str(),
                }
            })
            .collect()
    }
}

/// Resolution tally after one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummaryRow {
    pub stage:      &'static str,
    pub nodes:      usize,
    pub edges:      usize,
    pub ignored:    usize,
    pub heuristic:  usize,
    pub search:     usize,
    pub oracle:     usize,
    pub sink:       usize,
    pub unresolved: usize,
}

impl StageSummaryRow {
    pub fn new(stage: &'static str, c: &TableCounts) -> Self {
        Self {
            stage,
            nodes:      c.nodes,
            edges:      c.edges,
            ignored:    c.ignored,
            heuristic:  c.heuristic,
            search:     c.search,
            oracle:     c.oracle,
            sink:       c.sink,
            unresolved: c.unresolved,
        }
    }
}
