//! `ms-oracle`: the routing-service seam.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`oracle`] | `RoutingOracle` trait, `RoutePath`                         |
//! | [`osrm`]   | `OsrmClient`, `OsrmConfig` (OSRM v1 HTTP API)              |
//! | [`cache`]  | `ResponseCache` (SQLite, URL-keyed, TTL)                   |
//! | [`graph`]  | `GraphOracle` (Dijkstra over a `RawGraph`)                 |
//! | [`error`]  | `OracleError`, `OracleResult<T>`                           |

pub mod cache;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod osrm;

#[cfg(test)]
mod tests;

pub use cache::ResponseCache;
pub use error::{OracleError, OracleResult};
pub use graph::GraphOracle;
pub use oracle::{RoutePath, RoutingOracle};
pub use osrm::{OsrmClient, OsrmConfig};
