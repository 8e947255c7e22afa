//! Road-class rules and `maxspeed` parsing.
//!
//! `highway` values are matched by substring because simplified graphs may
//! carry merged classes such as `"['residential', 'service']"`.

/// Classes that should not be inferred as through-routes.
const MINOR_CLASSES: [&str; 4] = ["footway", "service", "path", "driveway"];

/// Classes that generate extra local trips when seeding traffic.
const LOCAL_GENERATORS: [&str; 3] = ["residential", "tertiary", "secondary"];

const MPH_TO_MPS: f64 = 1_609.344 / 3_600.0;
const KMH_TO_MPS: f64 = 1_000.0 / 3_600.0;

/// Footways, service roads, paths and driveways.
pub fn is_minor(highway: &str) -> bool {
    MINOR_CLASSES.iter().any(|c| highway.contains(c))
}

/// `motorway` and `motorway_link`.
pub fn is_motorway(highway: &str) -> bool {
    highway.starts_with("motorway")
}

/// Residential, tertiary and secondary roads (exact match).
pub fn is_local_generator(highway: &str) -> bool {
    LOCAL_GENERATORS.contains(&highway)
}

/// Parse an OSM `maxspeed` tag into m/s.
///
/// Accepts `"25 mph"`, `"50"` and `"50 km/h"` and list-valued tags such as
/// `"['25 mph', '30 mph']"`, of which the first entry wins.  Bare numbers
/// are km/h per OSM convention, not mph: US extracts that omit the unit
/// suffix will read slow.  Non-numeric values (`"none"`, `"signals"`,
/// `"walk"`) yield `None`.
pub fn parse_maxspeed(tag: &str) -> Option<f64> {
    let first = tag
        .trim()
        .trim_start_matches('[')
        .split([',', ';'])
        .next()?
        .trim()
        .trim_matches(|c| c == '\'' || c == '"' || c == ']')
        .trim();

    let (number, factor) = if let Some(n) = first.strip_suffix("mph") {
        (n, MPH_TO_MPS)
    } else if let Some(n) = first.strip_suffix("km/h") {
        (n, KMH_TO_MPS)
    } else if let Some(n) = first.strip_suffix("kmh") {
        (n, KMH_TO_MPS)
    } else {
        (first, KMH_TO_MPS)
    };

    let value: f64 = number.trim().parse().ok()?;
    (value > 0.0).then_some(value * factor)
}

/// Assumed car speed (m/s) for a road class, or `None` if the class is not
/// drivable.  Used by loaders to filter ways and by the graph oracle when an
/// edge has no `maxspeed`.
pub fn class_speed_mps(highway: &str) -> Option<f64> {
    match highway {
        "motorway" | "motorway_link"         => Some(29.1), // ~65 mph
        "trunk"    | "trunk_link"            => Some(24.6), // ~55 mph
        "primary"  | "primary_link"          => Some(20.1), // ~45 mph
        "secondary"| "secondary_link"        => Some(17.9), // ~40 mph
        "tertiary" | "tertiary_link"         => Some(13.4), // ~30 mph
        "residential" | "living_street"      => Some(8.9),  // ~20 mph
        "service"  | "unclassified"          => Some(6.7),  // ~15 mph
        "footway" | "path" | "cycleway"
        | "pedestrian" | "steps" | "track"
        | "bridleway" | "corridor"           => None,
        _                                    => Some(8.9),
    }
}
