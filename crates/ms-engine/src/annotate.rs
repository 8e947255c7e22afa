//! Bulk transit-time annotation.

use tracing::{debug, info};

use ms_core::{GeoPoint, PipelineConfig, TravelMode};
use ms_graph::EdgeTable;
use ms_oracle::{OracleError, RoutingOracle};

use crate::{EngineError, EngineResult};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    /// Table requests issued.
    pub requests: usize,
    /// Nodes the oracle returned no duration for.
    pub unreachable: usize,
}

/// Fills `transit_time` on every node with one `table` call per chunk.
///
/// Durations are collected for all chunks before any is written, so a
/// failing chunk leaves the table untouched.
#[derive(Clone, Debug)]
pub struct TransitTimeAnnotator {
    chunk_size: usize,
    mode:       TravelMode,
}

impl TransitTimeAnnotator {
    pub fn new(chunk_size: usize, mode: TravelMode) -> Self {
        Self { chunk_size, mode }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.table_chunk_size, config.travel_mode)
    }

    pub fn annotate<O>(&self, table: &mut EdgeTable, oracle: &O) -> EngineResult<AnnotateReport>
    where
        O: RoutingOracle + ?Sized,
    {
        if self.chunk_size == 0 {
            return Err(EngineError::Config("table_chunk_size must be positive".into()));
        }
        let reference = table.reference();
        let origin = table
            .node(reference)
            .map(|n| n.pos)
            .ok_or(ms_graph::GraphError::NodeNotFound(reference))?;
        let positions: Vec<GeoPoint> = table.nodes.iter().map(|n| n.pos).collect();

        let mut times: Vec<Option<f64>> = Vec::with_capacity(positions.len());
        let mut report = AnnotateReport::default();
        for chunk in positions.chunks(self.chunk_size) {
            let got = oracle.table(origin, chunk, table.orientation(), self.mode)?;
            report.requests += 1;
            if got.len() != chunk.len() {
                return Err(OracleError::LengthMismatch { expected: chunk.len(), got: got.len() }.into());
            }
            debug!(request = report.requests, sources = chunk.len(), "transit time chunk");
            times.extend(got);
        }

        for (node, t) in table.nodes.iter_mut().zip(times) {
            node.transit_time = if node.id == reference { Some(0.0) } else { t };
            if node.transit_time.is_none() {
                report.unreachable += 1;
            }
        }

        info!(
            nodes = table.node_count(),
            requests = report.requests,
            unreachable = report.unreachable,
            "transit times annotated"
        );
        Ok(report)
    }
}
