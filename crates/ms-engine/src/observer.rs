//! Pipeline observer trait for progress reporting and data collection.

use std::fmt;

use ms_graph::{EdgeTable, TableCounts};

use crate::PipelineReport;

/// Pipeline stages, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Annotate,
    Heuristic,
    Search,
    Consensus,
    Propagate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Annotate  => "annotate",
            Stage::Heuristic => "heuristic",
            Stage::Search    => "search",
            Stage::Consensus => "consensus",
            Stage::Propagate => "propagate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks invoked by [`Pipeline::run`](crate::Pipeline::run) and the
/// iterative stages.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl PipelineObserver for Progress {
///     fn on_consensus_iteration(&mut self, i: usize, unresolved: usize, _new: usize) {
///         eprintln!("consensus {i}: {unresolved} unresolved");
///     }
/// }
/// ```
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: Stage) {}

    /// Called after each stage with the table's resolution tally.
    fn on_stage_end(&mut self, _stage: Stage, _counts: &TableCounts) {}

    /// Called after each consensus batch has been merged.
    ///
    /// `unresolved` is the candidate count the batch was sampled from.
    fn on_consensus_iteration(&mut self, _iteration: usize, _unresolved: usize, _newly_resolved: usize) {}

    /// Called at the top of each relaxation step with the number of edges
    /// holding traffic and the total volume in flight.
    fn on_propagation_iteration(&mut self, _iteration: usize, _active: usize, _volume: f64) {}

    /// Called once with the final table.
    fn on_pipeline_end(&mut self, _table: &EdgeTable, _report: &PipelineReport) {}
}

/// A [`PipelineObserver`] that does nothing.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
