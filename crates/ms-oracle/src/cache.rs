//! SQLite cache of raw routing-service responses, keyed by request URL.
//!
//! Entries older than the TTL are ignored on read and replaced on the next
//! write; [`purge_expired`](ResponseCache::purge_expired) reclaims them.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension};

use crate::OracleResult;

/// Default response lifetime: one week.
pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(7 * 24 * 3_600);

pub struct ResponseCache {
    conn: Connection,
    ttl:  Duration,
}

impl ResponseCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path, ttl: Duration) -> OracleResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Self::init(conn, ttl)
    }

    /// Non-persistent cache, for tests.
    pub fn in_memory(ttl: Duration) -> OracleResult<Self> {
        Self::init(Connection::open_in_memory()?, ttl)
    }

    fn init(conn: Connection, ttl: Duration) -> OracleResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS responses (
                 url       TEXT PRIMARY KEY,
                 body      TEXT NOT NULL,
                 stored_ms INTEGER NOT NULL
             );",
        )?;
        Ok(Self { conn, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached body for `url`, unless absent or expired.
    pub fn get(&self, url: &str) -> OracleResult<Option<String>> {
        let row: Option<(String, i64)> = self
            .conn
            .prepare_cached("SELECT body, stored_ms FROM responses WHERE url = ?1")?
            .query_row([url], |r| Ok((r.get(0)?, r.get(1)?)))
            .optional()?;
        Ok(row.and_then(|(body, stored)| (now_ms() - stored <= self.ttl_ms()).then_some(body)))
    }

    pub fn put(&self, url: &str, body: &str) -> OracleResult<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO responses (url, body, stored_ms) VALUES (?1, ?2, ?3)",
            )?
            .execute(rusqlite::params![url, body, now_ms()])?;
        Ok(())
    }

    /// Delete expired rows; returns how many were removed.
    pub fn purge_expired(&self) -> OracleResult<usize> {
        let cutoff = now_ms() - self.ttl_ms();
        Ok(self.conn.execute("DELETE FROM responses WHERE stored_ms < ?1", [cutoff])?)
    }

    pub fn len(&self) -> OracleResult<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM responses", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    pub fn is_empty(&self) -> OracleResult<bool> {
        Ok(self.len()? == 0)
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
