use thiserror::Error;

use ms_core::CoreError;
use ms_graph::GraphError;
use ms_oracle::OracleError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pipeline configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("{count} edges remain unresolved after all stages")]
    UnresolvedEdges { count: usize },

    #[error("route worker pool: {0}")]
    WorkerPool(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
