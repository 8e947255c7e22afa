//! The pipeline driver: runs every stage over one table.

use tracing::{info, warn};

use ms_core::{NodeId, Orientation, PipelineConfig, UnresolvedPolicy};
use ms_graph::{EdgeTable, EdgeTableBuilder, RawGraph, TableCounts};
use ms_oracle::RoutingOracle;

use crate::{
    AnnotateReport, BruteForceReport, BruteForceRouter, ConsensusOracleResolver, ConsensusReport, EngineError, EngineResult,
    HeuristicReport, HeuristicResolver, PipelineObserver, PropagationReport,
    RecursiveSearchResolver, RoutePool, SearchReport, Stage, TrafficPropagator,
    TransitTimeAnnotator,
};

/// Per-stage results of one [`Pipeline::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineReport {
    pub annotate:    AnnotateReport,
    pub heuristic:   HeuristicReport,
    pub search:      SearchReport,
    pub consensus:   ConsensusReport,
    /// Edges marked `ignore` by [`UnresolvedPolicy::Ignore`].
    pub ignored_unresolved: usize,
    pub propagation: PropagationReport,
    /// Final resolution tally.
    pub counts:      TableCounts,
}

/// Finished table and report for one orientation.
#[derive(Clone, Debug)]
pub struct DirectionalRun {
    pub table:  EdgeTable,
    pub report: PipelineReport,
}

/// Result of [`Pipeline::run_both`].
#[derive(Clone, Debug)]
pub struct BidirectionalRun {
    pub towards: DirectionalRun,
    pub away:    DirectionalRun,
}

/// Owns the configuration and the route worker pool.
pub struct Pipeline {
    config: PipelineConfig,
    pool:   RoutePool,
}

impl Pipeline {
    /// Validate `config` and spin up the route pool.
    pub fn new(config: PipelineConfig) -> EngineResult<Self> {
        config.validate()?;
        let pool = RoutePool::new(config.consensus.workers)?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the table in the configured orientation.
    pub fn build_table(&self, raw: &RawGraph, reference: NodeId) -> EngineResult<EdgeTable> {
        self.build_table_in(raw, reference, self.config.orientation)
    }

    pub fn build_table_in(
        &self,
        raw: &RawGraph,
        reference: NodeId,
        orientation: Orientation,
    ) -> EngineResult<EdgeTable> {
        Ok(EdgeTableBuilder::new(orientation)
            .default_speed(self.config.default_speed_mps)
            .build(raw, reference)?)
    }

    /// Run the whole pipeline once per orientation, towards first.
    ///
    /// `config.orientation` is not consulted; each observer only sees its
    /// own run.
    pub fn run_both<O, A, B>(
        &self,
        raw: &RawGraph,
        reference: NodeId,
        oracle: &O,
        towards: &mut A,
        away: &mut B,
    ) -> EngineResult<BidirectionalRun>
    where
        O: RoutingOracle + ?Sized,
        A: PipelineObserver + ?Sized,
        B: PipelineObserver + ?Sized,
    {
        let mut table = self.build_table_in(raw, reference, Orientation::TowardsReference)?;
        let report = self.run(&mut table, oracle, towards)?;
        let towards = DirectionalRun { table, report };

        let mut table = self.build_table_in(raw, reference, Orientation::AwayFromReference)?;
        let report = self.run(&mut table, oracle, away)?;
        let away = DirectionalRun { table, report };

        Ok(BidirectionalRun { towards, away })
    }

    /// Brute-force baseline: route every node and count trips per edge.
    /// Uses the pipeline's travel mode and worker pool.
    pub fn brute_force<O>(
        &self,
        table: &mut EdgeTable,
        oracle: &O,
        max_requests: Option<usize>,
    ) -> EngineResult<BruteForceReport>
    where
        O: RoutingOracle + ?Sized,
    {
        BruteForceRouter::new(max_requests, self.config.travel_mode).route_all(table, oracle, &self.pool)
    }

    /// Run all stages in order.
    ///
    /// # Errors
    ///
    /// Oracle failures during annotation abort the run; consensus-stage
    /// route failures never do.  With [`UnresolvedPolicy::Fail`], edges left
    /// unresolved after consensus produce [`EngineError::UnresolvedEdges`].
    pub fn run<O, Obs>(
        &self,
        table: &mut EdgeTable,
        oracle: &O,
        observer: &mut Obs,
    ) -> EngineResult<PipelineReport>
    where
        O: RoutingOracle + ?Sized,
        Obs: PipelineObserver + ?Sized,
    {
        let cfg = &self.config;
        let mut report = PipelineReport::default();

        observer.on_stage_start(Stage::Annotate);
        report.annotate = TransitTimeAnnotator::from_config(cfg).annotate(table, oracle)?;
        observer.on_stage_end(Stage::Annotate, &table.counts());

        observer.on_stage_start(Stage::Heuristic);
        report.heuristic = HeuristicResolver::from_config(cfg).resolve(table);
        observer.on_stage_end(Stage::Heuristic, &table.counts());

        observer.on_stage_start(Stage::Search);
        report.search = RecursiveSearchResolver::new(cfg.search_depth).resolve(table);
        observer.on_stage_end(Stage::Search, &table.counts());

        observer.on_stage_start(Stage::Consensus);
        report.consensus = ConsensusOracleResolver::new(cfg.consensus.clone(), cfg.travel_mode)
            .resolve(table, oracle, &self.pool, observer)?;
        observer.on_stage_end(Stage::Consensus, &table.counts());

        report.ignored_unresolved = apply_unresolved_policy(table, cfg.unresolved_policy)?;

        observer.on_stage_start(Stage::Propagate);
        report.propagation = TrafficPropagator::new(cfg.traffic.clone()).propagate(table, observer);
        report.counts = table.counts();
        observer.on_stage_end(Stage::Propagate, &report.counts);

        info!(counts = %report.counts, "pipeline finished");
        observer.on_pipeline_end(table, &report);
        Ok(report)
    }
}

/// Handle edges still unresolved after every stage.  Returns how many were
/// newly ignored.
fn apply_unresolved_policy(table: &mut EdgeTable, policy: UnresolvedPolicy) -> EngineResult<usize> {
    let leftover = table.unresolved_edges();
    if leftover.is_empty() {
        return Ok(0);
    }
    match policy {
        UnresolvedPolicy::Fail => Err(EngineError::UnresolvedEdges { count: leftover.len() }),
        UnresolvedPolicy::Ignore => {
            warn!(count = leftover.len(), "ignoring edges left unresolved");
            for &i in &leftover {
                table.edges[i].ignore = true;
            }
            Ok(leftover.len())
        }
    }
}
