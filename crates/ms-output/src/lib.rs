//! `ms-output`: writers for the resolved edge table.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                          |
//! |-----------|---------|----------------------------------------|
//! | *(none)*  | CSV     | `edges.csv`, `stage_summaries.csv`     |
//! | `sqlite`  | SQLite  | `output.db`                            |
//!
//! Both implement [`OutputWriter`] and are driven by
//! [`TableOutputObserver`], which implements `ms_engine::PipelineObserver`.
//! Edge rows are keyed in the orientation of the source graph; `w`/`v2`
//! keep resolver orientation (see [`EdgeRow`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use ms_output::{CsvWriter, TableOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = TableOutputObserver::new(writer);
//! pipeline.run(&mut table, &oracle, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TableOutputObserver;
pub use row::{EdgeRow, StageSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
