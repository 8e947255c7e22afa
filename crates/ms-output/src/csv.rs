//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `edges.csv`
//! - `stage_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{EdgeRow, OutputResult, StageSummaryRow};
use crate::writer::OutputWriter;

pub const EDGE_HEADER: [&str; 11] = [
    "u", "v", "w", "v2", "through_traffic", "u_time", "v_time", "highway", "length", "ignored",
    "resolution",
];

pub const SUMMARY_HEADER: [&str; 9] = [
    "stage", "nodes", "edges", "ignored", "heuristic", "search", "oracle", "sink", "unresolved",
];

/// Writes the edge table and stage summaries to two CSV files.
pub struct CsvWriter {
    edges:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open both files and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut edges = Writer::from_path(dir.join("edges.csv"))?;
        edges.write_record(EDGE_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("stage_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { edges, summaries, finished: false })
    }
}

fn opt(t: Option<f64>) -> String {
    t.map(|t| t.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_edges(&mut self, rows: &[EdgeRow]) -> OutputResult<()> {
        for row in rows {
            self.edges.write_record(&[
                row.u.to_string(),
                row.v.to_string(),
                row.w.to_string(),
                row.v2.to_string(),
                row.through_traffic.to_string(),
                opt(row.u_time),
                opt(row.v_time),
                row.highway.clone(),
                row.length.to_string(),
                (row.ignore as u8).to_string(),
                row.resolution.to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_stage_summary(&mut self, row: &StageSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.stage.to_owned(),
            row.nodes.to_string(),
            row.edges.to_string(),
            row.ignored.to_string(),
            row.heuristic.to_string(),
            row.search.to_string(),
            row.oracle.to_string(),
            row.sink.to_string(),
            row.unresolved.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.edges.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
