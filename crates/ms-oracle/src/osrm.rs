//! OSRM v1 HTTP client.
//!
//! Speaks the `table` and `route` services:
//!
//! ```text
//! {base}/table/v1/{profile}/{ref};{p1};{p2}…?destinations=0   (towards)
//! {base}/table/v1/{profile}/{ref};{p1};{p2}…?sources=0        (away)
//! {base}/route/v1/{profile}/{from};{to}?steps=true&annotations=true
//! ```
//!
//! Coordinates are `lon,lat`.  Successful response bodies are cached in a
//! [`ResponseCache`] when one is configured, so re-running a study area does
//! not hit the service again.

use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ms_core::{GeoPoint, NodeId, Orientation, TravelMode};

use crate::cache::{DEFAULT_RESPONSE_TTL, ResponseCache};
use crate::oracle::{RoutePath, RoutingOracle};
use crate::{OracleError, OracleResult};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    /// Service root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// SQLite response cache; `None` disables caching.
    pub cache_path: Option<PathBuf>,
    pub cache_ttl: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url:   "http://router.project-osrm.org".to_owned(),
            timeout:    Duration::from_secs(30),
            cache_path: None,
            cache_ttl:  DEFAULT_RESPONSE_TTL,
        }
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct OsrmClient {
    config: OsrmConfig,
    http:   reqwest::blocking::Client,
    cache:  Option<Mutex<ResponseCache>>,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> OracleResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        let cache = match &config.cache_path {
            Some(path) => Some(Mutex::new(ResponseCache::open(path, config.cache_ttl)?)),
            None => None,
        };
        Ok(Self { config, http, cache })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    /// GET `url`, consulting the cache first.  Non-success statuses are
    /// returned as `Err((status, body))` so callers can inspect OSRM's
    /// error `code`.
    fn fetch(&self, url: &str) -> OracleResult<Result<String, (u16, String)>> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.lock().get(url)? {
                debug!(url, "osrm cache hit");
                return Ok(Ok(body));
            }
        }

        debug!(url, "osrm request");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| OracleError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Ok(Err((status.as_u16(), body)));
        }
        if let Some(cache) = &self.cache {
            cache.lock().put(url, &body)?;
        }
        Ok(Ok(body))
    }
}

impl RoutingOracle for OsrmClient {
    fn table(
        &self,
        reference: GeoPoint,
        sources: &[GeoPoint],
        orientation: Orientation,
        mode: TravelMode,
    ) -> OracleResult<Vec<Option<f64>>> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }
        let url = table_url(&self.config.base_url, reference, sources, orientation, mode);
        match self.fetch(&url)? {
            Ok(body) => parse_table(&body, orientation, sources.len()),
            Err((status, _)) => Err(OracleError::Status { status, url }),
        }
    }

    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> OracleResult<RoutePath> {
        let url = route_url(&self.config.base_url, from, to, mode);
        match self.fetch(&url)? {
            Ok(body) => parse_route(&body, from, to),
            // OSRM reports an unroutable pair as 400 with code "NoRoute".
            Err((status, body)) => match serde_json::from_str::<RouteResponse>(&body) {
                Ok(r) if is_no_route(&r.code) => Err(OracleError::NoRoute { from, to }),
                _ => Err(OracleError::Status { status, url }),
            },
        }
    }
}

// ── URLs ──────────────────────────────────────────────────────────────────────

pub(crate) fn table_url(
    base: &str,
    reference: GeoPoint,
    sources: &[GeoPoint],
    orientation: Orientation,
    mode: TravelMode,
) -> String {
    let mut coords = reference.lon_lat();
    for p in sources {
        coords.push(';');
        coords.push_str(&p.lon_lat());
    }
    let anchor = match orientation {
        Orientation::TowardsReference => "destinations=0",
        Orientation::AwayFromReference => "sources=0",
    };
    format!("{base}/table/v1/{}/{coords}?{anchor}", mode.profile())
}

pub(crate) fn route_url(base: &str, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> String {
    format!(
        "{base}/route/v1/{}/{};{}?steps=true&annotations=true",
        mode.profile(),
        from.lon_lat(),
        to.lon_lat(),
    )
}

// ── Response parsing ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    durations: Vec<Vec<Option<f64>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    duration: f64,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Deserialize)]
struct OsrmLeg {
    annotation: Option<OsrmAnnotation>,
}

#[derive(Deserialize)]
struct OsrmAnnotation {
    #[serde(default)]
    nodes: Vec<i64>,
}

fn is_no_route(code: &str) -> bool {
    matches!(code, "NoRoute" | "NoSegment")
}

/// Extract the reference row or column, skipping the reference itself.
pub(crate) fn parse_table(
    body: &str,
    orientation: Orientation,
    expected: usize,
) -> OracleResult<Vec<Option<f64>>> {
    let resp: TableResponse = serde_json::from_str(body)?;
    if resp.code != "Ok" {
        return Err(OracleError::Malformed(format!("table code {}", resp.code)));
    }
    let times: Vec<Option<f64>> = match orientation {
        // One row per source, single destination column.
        Orientation::TowardsReference => resp
            .durations
            .iter()
            .skip(1)
            .map(|row| row.first().copied().flatten())
            .collect(),
        // Single source row, one column per destination.
        Orientation::AwayFromReference => resp
            .durations
            .first()
            .map(|row| row.iter().skip(1).copied().collect())
            .unwrap_or_default(),
    };
    if times.len() != expected {
        return Err(OracleError::LengthMismatch { expected, got: times.len() });
    }
    Ok(times)
}

/// Node sequence across all legs of the first route.
pub(crate) fn parse_route(body: &str, from: GeoPoint, to: GeoPoint) -> OracleResult<RoutePath> {
    let resp: RouteResponse = serde_json::from_str(body)?;
    if is_no_route(&resp.code) {
        return Err(OracleError::NoRoute { from, to });
    }
    if resp.code != "Ok" {
        return Err(OracleError::Malformed(format!("route code {}", resp.code)));
    }
    let route = resp.routes.into_iter().next().ok_or(OracleError::NoRoute { from, to })?;

    let mut nodes: Vec<NodeId> = Vec::new();
    for leg in route.legs {
        let annotation = leg
            .annotation
            .ok_or_else(|| OracleError::Malformed("route leg without annotation".to_owned()))?;
        for id in annotation.nodes {
            // Consecutive legs share their boundary node.
            if nodes.last() != Some(&NodeId(id)) {
                nodes.push(NodeId(id));
            }
        }
    }
    Ok(RoutePath { nodes, duration_secs: route.duration })
}
