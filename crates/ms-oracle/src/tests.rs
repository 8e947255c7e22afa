//! Unit tests for ms-oracle.  No test touches the network.

#[cfg(test)]
mod helpers {
    use ms_core::{GeoPoint, NodeId};
    use ms_graph::{EdgeAttrs, RawGraph, RawGraphBuilder};

    /// One-way chain 1 → 2 → 3, 100 m per hop at 10 m/s, plus an isolated
    /// node 9 far away.
    pub fn chain() -> RawGraph {
        let mut b = RawGraphBuilder::new();
        let n1 = b.add_node(NodeId(1), GeoPoint::new(43.600, -72.300));
        let n2 = b.add_node(NodeId(2), GeoPoint::new(43.601, -72.300));
        let n3 = b.add_node(NodeId(3), GeoPoint::new(43.602, -72.300));
        b.add_node(NodeId(9), GeoPoint::new(44.000, -72.000));
        b.add_directed_edge(n1, n2, EdgeAttrs::new(100.0, "residential").maxspeed("36"));
        b.add_directed_edge(n2, n3, EdgeAttrs::new(100.0, "residential").maxspeed("36"));
        b.build()
    }

    pub fn pos(g: &RawGraph, id: i64) -> GeoPoint {
        g.node_pos(NodeId(id)).unwrap()
    }
}

// ── OSRM wire format ──────────────────────────────────────────────────────────

#[cfg(test)]
mod osrm {
    use ms_core::{GeoPoint, NodeId, Orientation, TravelMode};
    use crate::osrm::{parse_route, parse_table, route_url, table_url};
    use crate::{OracleError, OsrmConfig};

    const BASE: &str = "http://localhost:5000";

    fn pts() -> (GeoPoint, Vec<GeoPoint>) {
        (
            GeoPoint::new(43.7, -72.29),
            vec![GeoPoint::new(43.71, -72.28), GeoPoint::new(43.72, -72.27)],
        )
    }

    #[test]
    fn table_url_towards_and_away() {
        let (r, s) = pts();
        let towards = table_url(BASE, r, &s, Orientation::TowardsReference, TravelMode::Car);
        assert_eq!(
            towards,
            "http://localhost:5000/table/v1/driving/-72.290000,43.700000;-72.280000,43.710000;\
             -72.270000,43.720000?destinations=0"
        );
        let away = table_url(BASE, r, &s, Orientation::AwayFromReference, TravelMode::Walk);
        assert!(away.starts_with("http://localhost:5000/table/v1/walking/"));
        assert!(away.ends_with("?sources=0"));
    }

    #[test]
    fn route_url_format() {
        let (r, s) = pts();
        assert_eq!(
            route_url(BASE, s[0], r, TravelMode::Bike),
            "http://localhost:5000/route/v1/cycling/-72.280000,43.710000;-72.290000,43.700000\
             ?steps=true&annotations=true"
        );
    }

    #[test]
    fn table_towards_takes_first_column() {
        let body = r#"{"code":"Ok","durations":[[0.0],[12.5],[null]]}"#;
        let t = parse_table(body, Orientation::TowardsReference, 2).unwrap();
        assert_eq!(t, vec![Some(12.5), None]);
    }

    #[test]
    fn table_away_takes_first_row() {
        let body = r#"{"code":"Ok","durations":[[0.0,7.0,9.5]]}"#;
        let t = parse_table(body, Orientation::AwayFromReference, 2).unwrap();
        assert_eq!(t, vec![Some(7.0), Some(9.5)]);
    }

    #[test]
    fn table_length_mismatch() {
        let body = r#"{"code":"Ok","durations":[[0.0],[1.0]]}"#;
        let err = parse_table(body, Orientation::TowardsReference, 3).unwrap_err();
        assert!(matches!(err, OracleError::LengthMismatch { expected: 3, got: 1 }));
    }

    #[test]
    fn table_garbage_is_malformed() {
        let err = parse_table("<html>", Orientation::TowardsReference, 1).unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn route_joins_legs() {
        let (r, s) = pts();
        let body = r#"{"code":"Ok","routes":[{"duration":42.0,"legs":[
            {"annotation":{"nodes":[5,6,7]}},
            {"annotation":{"nodes":[7,8]}}]}]}"#;
        let path = parse_route(body, s[0], r).unwrap();
        assert_eq!(path.nodes, vec![NodeId(5), NodeId(6), NodeId(7), NodeId(8)]);
        assert_eq!(path.duration_secs, 42.0);
    }

    #[test]
    fn route_no_route_code() {
        let (r, s) = pts();
        let err = parse_route(r#"{"code":"NoRoute","routes":[]}"#, s[0], r).unwrap_err();
        assert!(matches!(err, OracleError::NoRoute { .. }));
        let err = parse_route(r#"{"code":"Ok","routes":[]}"#, s[0], r).unwrap_err();
        assert!(matches!(err, OracleError::NoRoute { .. }));
    }

    #[test]
    fn config_partial_json() {
        let cfg: OsrmConfig = serde_json::from_str(r#"{"base_url":"http://osrm.local"}"#).unwrap();
        assert_eq!(cfg.base_url, "http://osrm.local");
        assert_eq!(cfg.cache_path, None);
        assert_eq!(cfg.timeout, OsrmConfig::default().timeout);
    }

    #[test]
    fn transient_classification() {
        assert!(OracleError::Unavailable("refused".into()).is_transient());
        assert!(OracleError::Status { status: 503, url: String::new() }.is_transient());
    }
}

// ── Response cache ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use std::time::Duration;

    use crate::ResponseCache;
    use crate::cache::DEFAULT_RESPONSE_TTL;

    #[test]
    fn put_then_get() {
        let c = ResponseCache::in_memory(DEFAULT_RESPONSE_TTL).unwrap();
        assert!(c.is_empty().unwrap());
        assert_eq!(c.get("http://a").unwrap(), None);
        c.put("http://a", "{}").unwrap();
        c.put("http://a", "{\"code\":\"Ok\"}").unwrap();
        assert_eq!(c.get("http://a").unwrap().as_deref(), Some("{\"code\":\"Ok\"}"));
        assert_eq!(c.len().unwrap(), 1);
    }

    #[test]
    fn expired_entries_ignored_and_purged() {
        let c = ResponseCache::in_memory(Duration::ZERO).unwrap();
        c.put("http://a", "{}").unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(c.get("http://a").unwrap(), None);
        assert_eq!(c.purge_expired().unwrap(), 1);
        assert!(c.is_empty().unwrap());
    }

    #[test]
    fn persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.db");
        ResponseCache::open(&path, DEFAULT_RESPONSE_TTL).unwrap().put("u", "b").unwrap();
        let reopened = ResponseCache::open(&path, DEFAULT_RESPONSE_TTL).unwrap();
        assert_eq!(reopened.get("u").unwrap().as_deref(), Some("b"));
    }
}

// ── GraphOracle ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use ms_core::{NodeId, Orientation, TravelMode};
    use super::helpers::{chain, pos};
    use crate::{GraphOracle, OracleError, RoutingOracle};

    #[test]
    fn table_towards_reference() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let sources = [pos(&g, 1), pos(&g, 2), pos(&g, 3), pos(&g, 9)];
        let t = o.table(pos(&g, 3), &sources, Orientation::TowardsReference, TravelMode::Car).unwrap();
        assert_eq!(t, vec![Some(20.0), Some(10.0), Some(0.0), None]);
    }

    #[test]
    fn table_away_from_reference() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let sources = [pos(&g, 2), pos(&g, 3)];
        let t = o.table(pos(&g, 1), &sources, Orientation::AwayFromReference, TravelMode::Car).unwrap();
        assert_eq!(t, vec![Some(10.0), Some(20.0)]);
        // Nothing is reachable from the end of a one-way chain.
        let t = o.table(pos(&g, 3), &sources, Orientation::AwayFromReference, TravelMode::Car).unwrap();
        assert_eq!(t, vec![None, Some(0.0)]);
    }

    #[test]
    fn route_nodes_in_order() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let path = o.route(pos(&g, 1), pos(&g, 3), TravelMode::Car).unwrap();
        assert_eq!(path.nodes, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(path.duration_secs, 20.0);
    }

    #[test]
    fn walking_uses_fixed_speed() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let path = o.route(pos(&g, 1), pos(&g, 2), TravelMode::Walk).unwrap();
        assert!((path.duration_secs - 100.0 / 1.4).abs() < 1e-2);
    }

    #[test]
    fn trivial_route() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let path = o.route(pos(&g, 2), pos(&g, 2), TravelMode::Car).unwrap();
        assert_eq!(path.nodes, vec![NodeId(2)]);
        assert_eq!(path.duration_secs, 0.0);
    }

    #[test]
    fn against_one_way_is_no_route() {
        let g = chain();
        let o = GraphOracle::new(&g);
        let err = o.route(pos(&g, 3), pos(&g, 1), TravelMode::Car).unwrap_err();
        assert!(matches!(err, OracleError::NoRoute { .. }));
    }
}
