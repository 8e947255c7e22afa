//! Fixed-size worker pool for route requests.
//!
//! Jobs are spawned inside a `rayon` scope on a dedicated pool; each worker
//! sends its outcome over a `crossbeam` channel.  The scope returning is the
//! barrier: [`RoutePool::run`] hands back only once every job has finished,
//! sorted by node id so completion order never leaks into later stages.

use crossbeam_channel::unbounded;
use rayon::{ThreadPool, ThreadPoolBuilder};

use ms_core::{GeoPoint, NodeId, TravelMode};
use ms_oracle::{OracleResult, RoutePath, RoutingOracle};

use crate::{EngineError, EngineResult};

/// One route request, tagged with the table node it was issued for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RouteJob {
    pub node: NodeId,
    pub from: GeoPoint,
    pub to:   GeoPoint,
}

#[derive(Debug)]
pub struct RouteOutcome {
    pub node:   NodeId,
    pub result: OracleResult<RoutePath>,
}

pub struct RoutePool {
    pool:    ThreadPool,
    workers: usize,
}

impl RoutePool {
    pub fn new(workers: usize) -> EngineResult<Self> {
        if workers == 0 {
            return Err(EngineError::Config("route pool needs at least one worker".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("route-{i}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job and wait for all of them.
    pub fn run<O>(&self, oracle: &O, jobs: &[RouteJob], mode: TravelMode) -> Vec<RouteOutcome>
    where
        O: RoutingOracle + ?Sized,
    {
        let (tx, rx) = unbounded();
        self.pool.scope(|scope| {
            for &job in jobs {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let result = oracle.route(job.from, job.to, mode);
                    // The receiver outlives the scope; a send cannot fail.
                    let _ = tx.send(RouteOutcome { node: job.node, result });
                });
            }
        });
        drop(tx);

        let mut outcomes: Vec<RouteOutcome> = rx.into_iter().collect();
        outcomes.sort_by_key(|o| o.node);
        outcomes
    }
}
