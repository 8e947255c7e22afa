//! Graph acquisition seam and its snapshot-caching wrapper.

use tracing::{debug, info};

use ms_core::GeoPoint;

use crate::raw::RawGraph;
use crate::snapshot::SnapshotCache;
use crate::GraphResult;

/// Area of interest: every node within `radius_m` of `center`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphRequest {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl GraphRequest {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m }
    }

    /// Stable key naming this request in a [`SnapshotCache`].
    pub fn cache_key(&self) -> String {
        format!("{:.6}_{:.6}_{:.0}m", self.center.lat, self.center.lon, self.radius_m)
    }
}

/// Anything that can produce a street graph for a [`GraphRequest`].
pub trait NetworkGraphSource {
    fn fetch(&self, request: &GraphRequest) -> GraphResult<RawGraph>;
}

/// An in-memory graph serves requests by cropping a copy of itself.
impl NetworkGraphSource for RawGraph {
    fn fetch(&self, request: &GraphRequest) -> GraphResult<RawGraph> {
        Ok(self.clone().crop(request.center, request.radius_m))
    }
}

/// Serves graphs from a [`SnapshotCache`], falling back to `inner` on a miss
/// and storing the result.
pub struct CachedSource<S> {
    inner: S,
    cache: SnapshotCache,
}

impl<S: NetworkGraphSource> CachedSource<S> {
    pub fn new(inner: S, cache: SnapshotCache) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: NetworkGraphSource> NetworkGraphSource for CachedSource<S> {
    fn fetch(&self, request: &GraphRequest) -> GraphResult<RawGraph> {
        let key = request.cache_key();
        if let Some(graph) = self.cache.load(&key)? {
            debug!(key = %key, nodes = graph.node_count(), "graph snapshot hit");
            return Ok(graph);
        }
        info!(key = %key, "graph snapshot miss, fetching");
        let graph = self.inner.fetch(request)?;
        self.cache.store(&key, &graph)?;
        Ok(graph)
    }
}
