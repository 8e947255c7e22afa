//! Travel mode and flow orientation shared by the oracle and the engine.

use serde::{Deserialize, Serialize};

/// The travel profile requested from the routing oracle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    /// Private vehicle (default).
    #[default]
    Car,
    /// On foot.
    Walk,
    /// Bicycle.
    Bike,
}

impl TravelMode {
    /// OSRM profile name used in request paths.
    pub fn profile(self) -> &'static str {
        match self {
            TravelMode::Car  => "driving",
            TravelMode::Walk => "walking",
            TravelMode::Bike => "cycling",
        }
    }

    /// Assumed speed (m/s) for modes that ignore road speed limits.
    /// `None` means "use the edge's own speed".
    pub fn fixed_speed_mps(self) -> Option<f64> {
        match self {
            TravelMode::Car  => None,
            TravelMode::Walk => Some(1.4),
            TravelMode::Bike => Some(4.2),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Car  => "car",
            TravelMode::Walk => "walk",
            TravelMode::Bike => "bike",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether flows are measured towards the reference node or away from it.
///
/// For `AwayFromReference` the edge table is built with `(u, v)` swapped so
/// every resolver can reason "forward along `w`" in both cases.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    TowardsReference,
    AwayFromReference,
}

impl Orientation {
    #[inline]
    pub fn is_towards(self) -> bool {
        matches!(self, Orientation::TowardsReference)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::TowardsReference  => "towards",
            Orientation::AwayFromReference => "away",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
