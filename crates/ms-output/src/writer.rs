//! The `OutputWriter` trait implemented by all backend writers.

use crate::{EdgeRow, OutputResult, StageSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface through [`TableOutputObserver::take_error`](crate::TableOutputObserver::take_error)
/// when the writer is driven by the pipeline.
pub trait OutputWriter {
    /// Write a batch of edge rows.
    fn write_edges(&mut self, rows: &[EdgeRow]) -> OutputResult<()>;

    /// Write one stage summary row.
    fn write_stage_summary(&mut self, row: &StageSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
