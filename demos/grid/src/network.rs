//! 12×12 synthetic street grid around Hanover, NH.
//!
//! Node layout (row = south→north, col = west→east):
//!
//! ```text
//!  col 0 … 5 | 6 = Main St (primary) | 7 … 10 | 11 = I-89 (motorway, one-way north)
//! ```
//!
//! Every other street is residential and two-way; row 3 additionally has a
//! service alley between cols 2 and 3 that the resolver ignores.

use ms_core::{GeoPoint, NodeId};
use ms_graph::{EdgeAttrs, RawGraph, RawGraphBuilder};

pub const ROWS: usize = 12;
pub const COLS: usize = 12;

/// Southern latitude and step between rows (~100 m/step).
const LAT_MIN:  f64 = 43.69;
const LAT_STEP: f64 = 0.0009;

/// Western longitude and step between columns (~100 m/step at this latitude).
const LON_MIN:  f64 = -72.30;
const LON_STEP: f64 = 0.00125;

const MAIN_ST_COL:  usize = 6;
const MOTORWAY_COL: usize = 11;

pub fn node_at(row: usize, col: usize) -> NodeId {
    NodeId((row * COLS + col + 1) as i64)
}

/// Build the grid; the reference node is [`reference`].
pub fn build_network() -> RawGraph {
    let mut b = RawGraphBuilder::with_capacity(ROWS * COLS + 1, 4 * ROWS * COLS);

    for row in 0..ROWS {
        for col in 0..COLS {
            let pos = GeoPoint::new(LAT_MIN + row as f64 * LAT_STEP, LON_MIN + col as f64 * LON_STEP);
            b.add_node(node_at(row, col), pos);
        }
    }

    // East-west streets.
    for row in 0..ROWS {
        for col in 0..COLS - 1 {
            let (a, c) = (node_at(row, col), node_at(row, col + 1));
            let len = segment_len(&b, a, c);
            b.add_road(a, c, EdgeAttrs::new(len, "residential").maxspeed("25 mph"));
        }
    }

    // North-south avenues.
    for row in 0..ROWS - 1 {
        for col in 0..COLS {
            let (a, c) = (node_at(row, col), node_at(row + 1, col));
            let len = segment_len(&b, a, c);
            match col {
                MOTORWAY_COL => {
                    b.add_directed_edge(a, c, EdgeAttrs::new(len, "motorway").maxspeed("65 mph"));
                }
                MAIN_ST_COL => {
                    b.add_road(a, c, EdgeAttrs::new(len, "primary").name("Main Street").maxspeed("30 mph"));
                }
                _ => b.add_road(a, c, EdgeAttrs::new(len, "residential")),
            }
        }
    }

    // Alley with a midpoint node.
    let alley = NodeId((ROWS * COLS + 1) as i64);
    let (w, e) = (node_at(3, 2), node_at(3, 3));
    b.add_node(alley, GeoPoint::new(LAT_MIN + 3.5 * LAT_STEP, LON_MIN + 2.5 * LON_STEP));
    for end in [w, e] {
        let len = segment_len(&b, end, alley);
        b.add_road(end, alley, EdgeAttrs::new(len, "service"));
    }

    b.build()
}

/// Downtown: the Main Street node in the middle row.
pub fn reference() -> NodeId {
    node_at(ROWS / 2, MAIN_ST_COL)
}

fn segment_len(b: &RawGraphBuilder, a: NodeId, c: NodeId) -> f64 {
    match (b.node_pos(a), b.node_pos(c)) {
        (Some(p), Some(q)) => p.distance_m(q),
        _ => 0.0,
    }
}
