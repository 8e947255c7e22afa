//! On-disk JSON snapshots of raw graphs.
//!
//! One file per key under a cache directory.  A snapshot older than the
//! TTL (judged by file modification time) is treated as absent and will be
//! overwritten by the next [`store`](SnapshotCache::store).

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::raw::RawGraph;
use crate::GraphResult;

/// Default snapshot lifetime: one week.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(7 * 24 * 3_600);

#[derive(Clone, Debug)]
pub struct SnapshotCache {
    dir: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    /// Cache rooted at `dir`, created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> GraphResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, ttl: DEFAULT_SNAPSHOT_TTL })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the snapshot for `key`; `Ok(None)` if absent or expired.
    pub fn load(&self, key: &str) -> GraphResult<Option<RawGraph>> {
        let path = self.path_for(key);
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|t| SystemTime::now().duration_since(t).ok())
            .unwrap_or_default();
        if age > self.ttl {
            return Ok(None);
        }
        let graph = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
        Ok(Some(graph))
    }

    /// Write the snapshot for `key`, replacing any previous one.
    pub fn store(&self, key: &str, graph: &RawGraph) -> GraphResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut w, graph)?;
            w.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}
