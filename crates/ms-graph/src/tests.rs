//! Unit tests for ms-graph.
//!
//! All tests use hand-crafted graphs so they run without any OSM file.

#[cfg(test)]
mod helpers {
    use ms_core::{GeoPoint, NodeId};
    use crate::{EdgeAttrs, RawGraph, RawGraphBuilder};

    /// Five nodes along a north-south street plus a side street.
    ///
    ///   A(1) ── B(2) ── C(3) ── R(4)
    ///            │
    ///           D(5)
    ///
    /// All segments are two-way, 100 m, `residential`.
    pub fn street() -> (RawGraph, [NodeId; 5]) {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(1), GeoPoint::new(43.600, -72.300));
        let bb = b.add_node(NodeId(2), GeoPoint::new(43.601, -72.300));
        let c = b.add_node(NodeId(3), GeoPoint::new(43.602, -72.300));
        let r = b.add_node(NodeId(4), GeoPoint::new(43.603, -72.300));
        let d = b.add_node(NodeId(5), GeoPoint::new(43.601, -72.301));
        for (x, y) in [(a, bb), (bb, c), (c, r), (d, bb)] {
            b.add_road(x, y, EdgeAttrs::new(100.0, "residential"));
        }
        (b.build(), [a, bb, c, r, d])
    }
}

// ── Raw graph & builder ───────────────────────────────────────────────────────

#[cfg(test)]
mod raw {
    use ms_core::{GeoPoint, NodeId};
    use crate::{EdgeAttrs, RawGraphBuilder};

    #[test]
    fn add_road_is_bidirectional_and_two_way() {
        let (g, _) = super::helpers::street();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 8);
        assert!(g.edges.iter().all(|e| !e.oneway));
    }

    #[test]
    fn parallel_edges_get_increasing_keys() {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(10), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeId(11), GeoPoint::new(0.0, 0.001));
        b.add_directed_edge(a, c, EdgeAttrs::new(100.0, "primary"));
        b.add_directed_edge(a, c, EdgeAttrs::new(120.0, "primary"));
        let g = b.build();
        let keys: Vec<u32> = g.edges.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![0, 1]);
        assert!(g.edges.iter().all(|e| e.oneway));
    }

    #[test]
    fn re_adding_node_is_noop() {
        let mut b = RawGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(1.0, 1.0));
        b.add_node(NodeId(1), GeoPoint::new(2.0, 2.0));
        assert_eq!(b.node_count(), 1);
        assert_eq!(b.node_pos(NodeId(1)), Some(GeoPoint::new(1.0, 1.0)));
    }

    #[test]
    fn crop_drops_far_nodes_and_their_edges() {
        let (g, [a, _, _, r, _]) = super::helpers::street();
        // B is ~111 m north of A, D ~137 m away diagonally.
        let center = g.node_pos(a).unwrap();
        let cropped = g.crop(center, 120.0);
        assert!(cropped.node_pos(r).is_none());
        assert_eq!(cropped.node_count(), 2);
        assert_eq!(cropped.edge_count(), 2);
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod locate {
    use ms_core::GeoPoint;
    use crate::NodeLocator;

    #[test]
    fn nearest_node() {
        let (g, [_, _, c, _, _]) = super::helpers::street();
        let loc = NodeLocator::new(&g);
        assert_eq!(loc.len(), 5);
        assert_eq!(loc.nearest(GeoPoint::new(43.60201, -72.29999)), Some(c));
    }

    #[test]
    fn k_nearest_sorted() {
        let (g, [a, b, _, _, _]) = super::helpers::street();
        let loc = NodeLocator::new(&g);
        let near = loc.k_nearest(GeoPoint::new(43.5999, -72.300), 2);
        assert_eq!(near, vec![a, b]);
    }

    #[test]
    fn empty_locator() {
        let loc = NodeLocator::new(&crate::RawGraph::default());
        assert!(loc.is_empty());
        assert_eq!(loc.nearest(GeoPoint::new(0.0, 0.0)), None);
    }
}

// ── Road rules ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod road {
    use crate::road::*;

    #[test]
    fn minor_classes_match_by_substring() {
        assert!(is_minor("footway"));
        assert!(is_minor("['residential', 'service']"));
        assert!(!is_minor("residential"));
    }

    #[test]
    fn motorway_prefix() {
        assert!(is_motorway("motorway"));
        assert!(is_motorway("motorway_link"));
        assert!(!is_motorway("trunk"));
    }

    #[test]
    fn local_generators_exact() {
        assert!(is_local_generator("residential"));
        assert!(is_local_generator("secondary"));
        assert!(!is_local_generator("secondary_link"));
        assert!(!is_local_generator("primary"));
    }

    #[test]
    fn maxspeed_units() {
        let mph = parse_maxspeed("25 mph").unwrap();
        assert!((mph - 11.176).abs() < 1e-3);
        let kmh = parse_maxspeed("36").unwrap();
        assert!((kmh - 10.0).abs() < 1e-9);
        let explicit = parse_maxspeed("36 km/h").unwrap();
        assert!((explicit - 10.0).abs() < 1e-9);
    }

    #[test]
    fn bare_maxspeed_is_kmh_not_mph() {
        let bare = parse_maxspeed("25").unwrap();
        assert!((bare - 25.0 / 3.6).abs() < 1e-9);
        assert!(bare < parse_maxspeed("25 mph").unwrap());
    }

    #[test]
    fn maxspeed_list_takes_first() {
        let v = parse_maxspeed("['30 mph', '25 mph']").unwrap();
        assert!((v - 30.0 * 1_609.344 / 3_600.0).abs() < 1e-9);
    }

    #[test]
    fn maxspeed_non_numeric() {
        assert_eq!(parse_maxspeed("none"), None);
        assert_eq!(parse_maxspeed("signals"), None);
        assert_eq!(parse_maxspeed("0"), None);
    }

    #[test]
    fn drivable_classes() {
        assert!(class_speed_mps("residential").is_some());
        assert!(class_speed_mps("footway").is_none());
        assert!(class_speed_mps("some_new_class").is_some());
    }
}

// ── Edge table ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod table {
    use ms_core::config::DEFAULT_SPEED_MPS;
    use ms_core::{EdgeKey, GeoPoint, NextHop, NodeId, Orientation, Resolution};
    use crate::{EdgeAttrs, EdgeTableBuilder, GraphError, RawGraphBuilder};

    #[test]
    fn csr_out_edges_sorted_by_target() {
        let (g, [a, b, c, _, d]) = super::helpers::street();
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, NodeId(4)).unwrap();
        assert_eq!(t.node_count(), 5);
        assert_eq!(t.edge_count(), 8);
        let targets: Vec<NodeId> = t.out_edges(b).map(|i| t.edges[i].v).collect();
        assert_eq!(targets, vec![a, c, d]);
        assert_eq!(t.out_degree(a), 1);
        assert_eq!(t.out_edges(NodeId(999)).len(), 0);
    }

    #[test]
    fn every_edge_indexed() {
        let (g, _) = super::helpers::street();
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, NodeId(4)).unwrap();
        for (i, e) in t.edges.iter().enumerate() {
            assert_eq!(t.edge_idx(e.edge_key()), Some(i));
            assert_eq!(e.v2, e.v);
            assert_eq!(e.w, NextHop::Unresolved);
        }
    }

    #[test]
    fn reference_node_state() {
        let (g, [_, _, _, r, _]) = super::helpers::street();
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, r).unwrap();
        assert_eq!(t.reference(), r);
        assert_eq!(t.node(r).unwrap().resolution, Resolution::Sink);
        assert!(!t.is_reversed());
    }

    #[test]
    fn parallel_edges_keep_longest() {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001));
        b.add_directed_edge(a, c, EdgeAttrs::new(90.0, "primary"));
        b.add_directed_edge(a, c, EdgeAttrs::new(140.0, "primary"));
        b.add_directed_edge(a, c, EdgeAttrs::new(140.0, "primary"));
        b.add_directed_edge(a, c, EdgeAttrs::new(110.0, "primary"));
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&b.build(), c).unwrap();
        assert_eq!(t.edge_count(), 1);
        let e = t.edge(EdgeKey::new(a, c)).unwrap();
        assert_eq!(e.length, 140.0);
        assert_eq!(e.key, 1, "equal lengths keep the lowest key");
    }

    #[test]
    fn away_orientation_swaps_endpoints() {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001));
        b.add_directed_edge(a, c, EdgeAttrs::new(100.0, "primary"));
        let t = EdgeTableBuilder::new(Orientation::AwayFromReference).build(&b.build(), a).unwrap();
        assert!(t.is_reversed());
        assert!(t.contains_edge(EdgeKey::new(c, a)));
        assert!(!t.contains_edge(EdgeKey::new(a, c)));
        assert_eq!(t.oriented_key(0), EdgeKey::new(a, c));
    }

    #[test]
    fn maxspeed_and_default_speed() {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001));
        b.add_directed_edge(a, c, EdgeAttrs::new(100.0, "primary").maxspeed("36"));
        b.add_directed_edge(c, a, EdgeAttrs::new(100.0, "primary").maxspeed("none"));
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&b.build(), a).unwrap();
        let fwd = t.edge(EdgeKey::new(a, c)).unwrap();
        assert!((fwd.maxspeed.unwrap() - 10.0).abs() < 1e-9);
        assert!((fwd.est_time() - 10.0).abs() < 1e-9);
        let back = t.edge(EdgeKey::new(c, a)).unwrap();
        assert_eq!(back.maxspeed, None);
        assert_eq!(back.speed_mps, DEFAULT_SPEED_MPS);
    }

    #[test]
    fn self_loops_dropped() {
        let mut b = RawGraphBuilder::new();
        let a = b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0));
        let c = b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001));
        b.add_directed_edge(a, a, EdgeAttrs::new(30.0, "residential"));
        b.add_road(a, c, EdgeAttrs::new(100.0, "residential"));
        let t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&b.build(), c).unwrap();
        assert_eq!(t.edge_count(), 2);
        assert!(!t.contains_edge(EdgeKey::new(a, a)));
    }

    #[test]
    fn missing_reference_errors() {
        let (g, _) = super::helpers::street();
        let err = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, NodeId(77)).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(NodeId(77))));
    }

    #[test]
    fn dangling_edge_errors() {
        let (mut g, [a, ..]) = super::helpers::street();
        let mut stray = g.edges[0].clone();
        stray.u = a;
        stray.v = NodeId(42);
        g.edges.push(stray);
        let err = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, a).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { v: NodeId(42), .. }));
    }

    #[test]
    fn empty_graph_errors() {
        let err = EdgeTableBuilder::new(Orientation::TowardsReference)
            .build(&crate::RawGraph::default(), NodeId(1))
            .unwrap_err();
        assert!(matches!(err, GraphError::Empty));
    }

    #[test]
    fn counts_track_resolution() {
        let (g, [a, b, c, r, _]) = super::helpers::street();
        let mut t = EdgeTableBuilder::new(Orientation::TowardsReference).build(&g, r).unwrap();
        t.edge_mut(EdgeKey::new(c, r)).unwrap().assign(NextHop::Sink, Resolution::HeuristicResolved);
        t.edge_mut(EdgeKey::new(a, b)).unwrap().assign(NextHop::Node(c), Resolution::HeuristicResolved);
        let counts = t.counts();
        assert_eq!(counts.sink, 1);
        assert_eq!(counts.heuristic, 1);
        assert_eq!(counts.unresolved, 6);
        assert_eq!(counts.resolved(), 2);
        assert_eq!(t.unresolved_edges().len(), 6);
        assert!(counts.to_string().contains("1 sink"));
    }
}

// ── Snapshot cache & sources ──────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use std::cell::Cell;
    use std::time::Duration;

    use ms_core::GeoPoint;
    use crate::{
        CachedSource, GraphRequest, GraphResult, NetworkGraphSource, RawGraph, SnapshotCache,
    };

    struct CountingSource {
        graph: RawGraph,
        calls: Cell<usize>,
    }

    impl NetworkGraphSource for CountingSource {
        fn fetch(&self, request: &GraphRequest) -> GraphResult<RawGraph> {
            self.calls.set(self.calls.get() + 1);
            self.graph.fetch(request)
        }
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path()).unwrap();
        let (g, _) = super::helpers::street();
        assert!(cache.load("hanover+5000").unwrap().is_none());
        cache.store("hanover+5000", &g).unwrap();
        assert_eq!(cache.load("hanover+5000").unwrap(), Some(g));
    }

    #[test]
    fn expired_snapshot_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path()).unwrap().with_ttl(Duration::ZERO);
        let (g, _) = super::helpers::street();
        cache.store("k", &g).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.load("k").unwrap().is_none());
    }

    #[test]
    fn cached_source_fetches_once() {
        let dir = tempfile::tempdir().unwrap();
        let (g, _) = super::helpers::street();
        let source = CachedSource::new(
            CountingSource { graph: g, calls: Cell::new(0) },
            SnapshotCache::new(dir.path()).unwrap(),
        );
        let req = GraphRequest::new(GeoPoint::new(43.601, -72.300), 1_000.0);
        let first = source.fetch(&req).unwrap();
        let second = source.fetch(&req).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.node_count(), 5);
        assert_eq!(source.inner().calls.get(), 1);
    }

    #[test]
    fn cache_key_depends_on_radius() {
        let c = GeoPoint::new(43.7, -72.2);
        assert_ne!(GraphRequest::new(c, 1_000.0).cache_key(), GraphRequest::new(c, 2_000.0).cache_key());
    }
}
