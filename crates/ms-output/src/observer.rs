//! `TableOutputObserver<W>`: bridges `PipelineObserver` to an `OutputWriter`.

use tracing::debug;

use ms_engine::{PipelineObserver, PipelineReport, Stage};
use ms_graph::{EdgeTable, TableCounts};

use crate::row::{EdgeRow, StageSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`PipelineObserver`] that writes a summary row after every stage and
/// the full edge table once the pipeline ends.
///
/// Observer methods have no return value, so the first write error is kept
/// and retrieved with [`take_error`][Self::take_error] after the run.
pub struct TableOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TableOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> PipelineObserver for TableOutputObserver<W> {
    fn on_stage_end(&mut self, stage: Stage, counts: &TableCounts) {
        let result = self.writer.write_stage_summary(&StageSummaryRow::new(stage.as_str(), counts));
        self.store_err(result);
    }

    fn on_pipeline_end(&mut self, table: &EdgeTable, _report: &PipelineReport) {
        let rows = EdgeRow::from_table(table);
        debug!(rows = rows.len(), "writing edge table");
        let result = self.writer.write_edges(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
