//! OSM PBF graph source, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use ms_core::GeoPoint;
//! use ms_graph::osm::PbfSource;
//! use ms_graph::{GraphRequest, NetworkGraphSource};
//!
//! let source = PbfSource::new("vermont.osm.pbf");
//! let graph = source.fetch(&GraphRequest::new(GeoPoint::new(43.70, -72.29), 5_000.0))?;
//! ```
//!
//! Only drivable `highway=*` ways are loaded (see
//! [`class_speed_mps`](crate::road::class_speed_mps)).  Node ids are the
//! OSM ids, edge lengths are haversine distances between consecutive way
//! nodes, and the result is cropped to the request radius.

use std::path::{Path, PathBuf};

use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use ms_core::{GeoPoint, NodeId};

use crate::raw::{EdgeAttrs, RawGraph, RawGraphBuilder};
use crate::road::class_speed_mps;
use crate::source::{GraphRequest, NetworkGraphSource};
use crate::{GraphError, GraphResult};

/// Reads a local `.osm.pbf` extract on every fetch.
#[derive(Clone, Debug)]
pub struct PbfSource {
    path: PathBuf,
}

impl PbfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NetworkGraphSource for PbfSource {
    fn fetch(&self, request: &GraphRequest) -> GraphResult<RawGraph> {
        let graph = load_from_pbf(&self.path)?;
        let full = graph.node_count();
        let cropped = graph.crop(request.center, request.radius_m);
        info!(
            path = %self.path.display(),
            full_nodes = full,
            nodes = cropped.node_count(),
            edges = cropped.edge_count(),
            "loaded OSM extract"
        );
        Ok(cropped)
    }
}

/// Load every drivable way of a PBF extract as a [`RawGraph`].
///
/// # Errors
///
/// [`GraphError::Osm`] on open or parse failures.
pub fn load_from_pbf(path: &Path) -> GraphResult<RawGraph> {
    let reader = ElementReader::from_path(path).map_err(|e| GraphError::Osm(e.to_string()))?;

    let mut all_nodes: FxHashMap<i64, (GeoPoint, Option<String>)> = FxHashMap::default();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                let highway = n.tags().find(|(k, _)| *k == "highway").map(|(_, v)| v.to_owned());
                all_nodes.insert(n.id(), (GeoPoint::new(n.lat(), n.lon()), highway));
            }
            Element::DenseNode(n) => {
                let highway = n.tags().find(|(k, _)| *k == "highway").map(|(_, v)| v.to_owned());
                all_nodes.insert(n.id(), (GeoPoint::new(n.lat(), n.lon()), highway));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                let Some(highway) = tag("highway") else { return };
                if class_speed_mps(highway).is_none() {
                    return;
                }
                road_ways.push(OsmWay {
                    refs:     w.refs().collect(),
                    highway:  highway.to_owned(),
                    maxspeed: tag("maxspeed").map(str::to_owned),
                    name:     tag("name").map(str::to_owned),
                    oneway:   oneway_dir(highway, tag("oneway")),
                });
            }
            _ => {}
        })
        .map_err(|e| GraphError::Osm(e.to_string()))?;

    let road_node_ids: FxHashSet<i64> = road_ways.iter().flat_map(|w| w.refs.iter().copied()).collect();
    let mut builder = RawGraphBuilder::with_capacity(road_node_ids.len(), road_node_ids.len() * 2);
    for osm_id in &road_node_ids {
        if let Some((pos, highway)) = all_nodes.remove(osm_id) {
            builder.add_tagged_node(NodeId(*osm_id), pos, highway);
        }
    }
    drop(all_nodes);

    for way in &road_ways {
        for pair in way.refs.windows(2) {
            let (a, b) = (NodeId(pair[0]), NodeId(pair[1]));
            let (Some(pa), Some(pb)) = (builder.node_pos(a), builder.node_pos(b)) else {
                continue;
            };
            let mut attrs = EdgeAttrs::new(pa.distance_m(pb), way.highway.clone()).geometry(vec![pa, pb]);
            if let Some(tag) = &way.maxspeed {
                attrs = attrs.maxspeed(tag.clone());
            }
            if let Some(name) = &way.name {
                attrs = attrs.name(name.clone());
            }
            match way.oneway {
                OneWay::No => builder.add_road(a, b, attrs),
                OneWay::Forward => builder.add_directed_edge(a, b, attrs),
                OneWay::Backward => {
                    attrs.geometry.reverse();
                    builder.add_directed_edge(b, a, attrs);
                }
            }
        }
    }

    Ok(builder.build())
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:     Vec<i64>,
    highway:  String,
    maxspeed: Option<String>,
    name:     Option<String>,
    oneway:   OneWay,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum OneWay {
    No,
    Forward,
    Backward,
}

/// Motorways and motorway links are implicitly one-way.
fn oneway_dir(highway: &str, tag: Option<&str>) -> OneWay {
    match tag {
        Some("yes" | "1" | "true") => OneWay::Forward,
        Some("-1" | "reverse") => OneWay::Backward,
        Some("no" | "0" | "false") => OneWay::No,
        _ if matches!(highway, "motorway" | "motorway_link") => OneWay::Forward,
        _ => OneWay::No,
    }
}
