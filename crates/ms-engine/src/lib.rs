//! `ms-engine`: resolves a next hop for every edge, then propagates traffic.
//!
//! # Stages
//!
//! ```text
//! EdgeTable (from ms-graph)
//!   ① Annotate     bulk transit times per node via RoutingOracle::table
//!   ② Heuristic    best progress-making exit per node → w for inbound edges
//!   ③ Search       bounded DFS (depth ≤ search_depth) for ambiguous edges
//!   ④ Consensus    parallel oracle routes, majority vote per (u, v)
//!   ⑤ Policy       leftover unresolved edges are ignored or fatal
//!   ⑥ Propagate    relax seeded volumes along (v2, w) into through_traffic
//! ```
//!
//! [`Pipeline::run_both`] repeats all stages for both orientations.
//! [`BruteForceRouter`] is a baseline that routes every node instead.
//!
//! Only stage ④ and the brute-force baseline run concurrently; route results
//! are merged after the whole batch completes, so the table is never shared
//! with workers.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ms_core::PipelineConfig;
//! use ms_engine::{NoopObserver, Pipeline};
//! use ms_oracle::GraphOracle;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let mut table = pipeline.build_table(&raw, reference)?;
//! let report = pipeline.run(&mut table, &GraphOracle::new(&raw), &mut NoopObserver)?;
//! println!("{}", report.counts);
//! ```

pub mod annotate;
pub mod brute_force;
pub mod consensus;
pub mod error;
pub mod heuristic;
pub mod observer;
pub mod pipeline;
pub mod pool;
pub mod propagate;
pub mod search;


pub use annotate::{AnnotateReport, TransitTimeAnnotator};
pub use brute_force::{BruteForceReport, BruteForceRouter};
pub use consensus::{ConsensusOracleResolver, ConsensusReport};
pub use error::{EngineError, EngineResult};
pub use heuristic::{HeuristicReport, HeuristicResolver};
pub use observer::{NoopObserver, PipelineObserver, Stage};
pub use pipeline::{BidirectionalRun, DirectionalRun, Pipeline, PipelineReport};
pub use pool::{RouteJob, RouteOutcome, RoutePool};
pub use propagate::{PropagationReport, TrafficPropagator};
pub use search::{RecursiveSearchResolver, SearchReport};
