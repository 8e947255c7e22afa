//! The routing-oracle trait.
//!
//! An oracle answers two questions about the real road network: how long it
//! takes to get between the reference and many points (`table`), and which
//! nodes a single trip passes through (`route`).  The engine only ever talks
//! to this trait, so tests swap in mock oracles and offline runs use
//! [`GraphOracle`](crate::GraphOracle).

use ms_core::{GeoPoint, NodeId, Orientation, TravelMode};

use crate::OracleResult;

/// A single routed trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePath {
    /// Graph node ids visited, in travel order.  May include ids the local
    /// table does not know about.
    pub nodes: Vec<NodeId>,
    pub duration_secs: f64,
}

/// Pluggable routing service.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; route calls are issued from a
/// worker pool.
pub trait RoutingOracle: Send + Sync {
    /// Durations between `reference` and each of `sources`, positionally.
    ///
    /// `TowardsReference` asks for source → reference, `AwayFromReference`
    /// for reference → source.  `None` marks an unreachable source.  The
    /// result must have exactly `sources.len()` entries.
    fn table(
        &self,
        reference: GeoPoint,
        sources: &[GeoPoint],
        orientation: Orientation,
        mode: TravelMode,
    ) -> OracleResult<Vec<Option<f64>>>;

    /// Route from `from` to `to`.  Returns [`OracleError::NoRoute`] when the
    /// service finds none.
    ///
    /// [`OracleError::NoRoute`]: crate::OracleError::NoRoute
    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> OracleResult<RoutePath>;
}

impl<O: RoutingOracle + ?Sized> RoutingOracle for &O {
    fn table(
        &self,
        reference: GeoPoint,
        sources: &[GeoPoint],
        orientation: Orientation,
        mode: TravelMode,
    ) -> OracleResult<Vec<Option<f64>>> {
        (**self).table(reference, sources, orientation, mode)
    }

    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> OracleResult<RoutePath> {
        (**self).route(from, to, mode)
    }
}

impl<O: RoutingOracle + ?Sized> RoutingOracle for Box<O> {
    fn table(
        &self,
        reference: GeoPoint,
        sources: &[GeoPoint],
        orientation: Orientation,
        mode: TravelMode,
    ) -> OracleResult<Vec<Option<f64>>> {
        (**self).table(reference, sources, orientation, mode)
    }

    fn route(&self, from: GeoPoint, to: GeoPoint, mode: TravelMode) -> OracleResult<RoutePath> {
        (**self).route(from, to, mode)
    }
}
