//! `ms-core`: foundational types for the motorshed traffic-inference engine.
//!
//! This crate is a dependency of every other `ms-*` crate.  It has no `ms-*`
//! dependencies and only a handful of external ones (`rand`, `serde`,
//! `serde_json`, `thiserror`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeKey`                                     |
//! | [`geo`]       | `GeoPoint`, haversine distance, mercator projection     |
//! | [`hop`]       | `NextHop`, `Resolution`                                 |
//! | [`transport`] | `TravelMode`, `Orientation`                             |
//! | [`config`]    | `PipelineConfig`, `ConsensusConfig`, `TrafficConfig`    |
//! | [`rng`]       | `BatchRng` (seeded sampling for consensus batches)      |
//! | [`error`]     | `CoreError`, `CoreResult`                               |

pub mod config;
pub mod error;
pub mod geo;
pub mod hop;
pub mod ids;
pub mod rng;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ConsensusConfig, PipelineConfig, TrafficConfig, UnresolvedPolicy};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use hop::{NextHop, Resolution};
pub use ids::{EdgeKey, NodeId};
pub use rng::BatchRng;
pub use transport::{Orientation, TravelMode};
