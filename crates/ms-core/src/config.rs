//! Pipeline configuration.
//!
//! Typically loaded from a JSON file by the application crate and passed to
//! the pipeline driver.  Every field has a default, so a config file only
//! needs to name what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Orientation, TravelMode};

/// 25 mph in m/s, the assumed speed of edges without a `maxspeed` tag.
pub const DEFAULT_SPEED_MPS: f64 = 25.0 * 1_609.344 / 3_600.0;

/// What to do with edges still unresolved after every resolver stage.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Mark them `ignore` and let them contribute no traffic.
    #[default]
    Ignore,
    /// Abort the pipeline with `EngineError::UnresolvedEdges`.
    Fail,
}

/// Top-level configuration for one pipeline run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Measure flows towards the reference node or away from it.
    pub orientation: Orientation,

    /// Profile requested from the routing oracle.
    pub travel_mode: TravelMode,

    /// Maximum number of source coordinates per table request.
    pub table_chunk_size: usize,

    /// Also ignore every edge that does not make progress (`dt >= 0`).
    pub strict_ignore: bool,

    /// Speed assumed for edges without a `maxspeed` tag, m/s.
    pub default_speed_mps: f64,

    /// Maximum number of hops past the edge itself explored by the
    /// recursive search.
    pub search_depth: usize,

    pub consensus: ConsensusConfig,

    pub traffic: TrafficConfig,

    pub unresolved_policy: UnresolvedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            orientation:       Orientation::TowardsReference,
            travel_mode:       TravelMode::Car,
            table_chunk_size:  300,
            strict_ignore:     false,
            default_speed_mps: DEFAULT_SPEED_MPS,
            search_depth:      3,
            consensus:         ConsensusConfig::default(),
            traffic:           TrafficConfig::default(),
            unresolved_policy: UnresolvedPolicy::Ignore,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file and validate it.
    pub fn from_json_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the resolvers cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.table_chunk_size == 0 {
            return Err(CoreError::Config("table_chunk_size must be at least 1".into()));
        }
        if self.search_depth == 0 {
            return Err(CoreError::Config("search_depth must be at least 1".into()));
        }
        if self.default_speed_mps.is_nan() || self.default_speed_mps <= 0.0 {
            return Err(CoreError::Config(format!(
                "default_speed_mps must be positive, got {}",
                self.default_speed_mps
            )));
        }
        self.consensus.validate()?;
        self.traffic.validate()
    }
}

/// Settings for the oracle consensus stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Edges per oracle batch (unresolved first, topped up with resolved ones).
    pub batch_size: usize,
    /// Concurrent oracle requests.
    pub workers: usize,
    /// Iterations that must run before an empty unresolved set is final.
    pub min_iter: usize,
    /// Hard cap on iterations.
    pub max_iter: usize,
    /// Seed for batch sampling.
    pub seed: u64,
    /// Maximum forward steps when repairing a `(v, w)` gap.
    pub gap_repair_limit: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            batch_size:       25,
            workers:          5,
            min_iter:         5,
            max_iter:         100,
            seed:             42,
            gap_repair_limit: 500,
        }
    }
}

impl ConsensusConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.batch_size == 0 {
            return Err(CoreError::Config("consensus.batch_size must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(CoreError::Config("consensus.workers must be at least 1".into()));
        }
        if self.min_iter > self.max_iter {
            return Err(CoreError::Config(format!(
                "consensus.min_iter ({}) exceeds max_iter ({})",
                self.min_iter, self.max_iter
            )));
        }
        Ok(())
    }
}

/// Settings for traffic seeding and relaxation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// One unit of seeded traffic per this many metres of edge length.
    pub meters_per_unit: f64,
    /// Seed multiplier for residential, tertiary and secondary roads.
    pub local_multiplier: f64,
    /// Motorways carry through-traffic only and seed nothing.
    pub motorways_seed_zero: bool,
    /// Iteration cap; `None` means edge count + 1.
    pub max_iterations: Option<usize>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            meters_per_unit:     50.0,
            local_multiplier:    5.0,
            motorways_seed_zero: true,
            max_iterations:      None,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.meters_per_unit.is_nan() || self.meters_per_unit <= 0.0 {
            return Err(CoreError::Config(format!(
                "traffic.meters_per_unit must be positive, got {}",
                self.meters_per_unit
            )));
        }
        if self.local_multiplier < 0.0 {
            return Err(CoreError::Config("traffic.local_multiplier must not be negative".into()));
        }
        Ok(())
    }
}
