//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `edges` and `stage_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::{EdgeRow, OutputResult, StageSummaryRow};
use crate::writer::OutputWriter;

/// Writes the edge table to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS edges (
                 u               INTEGER NOT NULL,
                 v               INTEGER NOT NULL,
                 w               INTEGER NOT NULL,
                 v2              INTEGER NOT NULL,
                 through_traffic REAL    NOT NULL,
                 u_time          REAL,
                 v_time          REAL,
                 highway         TEXT    NOT NULL,
                 length          REAL    NOT NULL,
                 ignored         INTEGER NOT NULL,
                 resolution      TEXT    NOT NULL,
                 PRIMARY KEY (u, v)
             );
             CREATE TABLE IF NOT EXISTS stage_summaries (
                 seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                 stage      TEXT    NOT NULL,
                 nodes      INTEGER NOT NULL,
                 edges      INTEGER NOT NULL,
                 ignored    INTEGER NOT NULL,
                 heuristic  INTEGER NOT NULL,
                 search     INTEGER NOT NULL,
                 oracle     INTEGER NOT NULL,
                 sink       INTEGER NOT NULL,
                 unresolved INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_edges(&mut self, rows: &[EdgeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO edges \
                 (u, v, w, v2, through_traffic, u_time, v_time, highway, length, ignored, resolution) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.u,
                    row.v,
                    row.w,
                    row.v2,
                    row.through_traffic,
                    row.u_time,
                    row.v_time,
                    row.highway,
                    row.length,
                    row.ignore as i64,
                    row.resolution,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_stage_summary(&mut self, row: &StageSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO stage_summaries \
             (stage, nodes, edges, ignored, heuristic, search, oracle, sink, unresolved) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                row.stage,
                row.nodes as i64,
                row.edges as i64,
                row.ignored as i64,
                row.heuristic as i64,
                row.search as i64,
                row.oracle as i64,
                row.sink as i64,
                row.unresolved as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
