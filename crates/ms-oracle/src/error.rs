//! Oracle error type.

use thiserror::Error;

use ms_core::GeoPoint;

#[derive(Debug, Error)]
pub enum OracleError {
    /// Transport failure: connection refused, timeout, DNS.
    #[error("routing service unavailable: {0}")]
    Unavailable(String),

    #[error("routing service returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("malformed routing response: {0}")]
    Malformed(String),

    #[error("no route from {from:?} to {to:?}")]
    NoRoute { from: GeoPoint, to: GeoPoint },

    #[error("duration table has {got} entries, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("response cache error: {0}")]
    Cache(#[from] rusqlite::Error),
}

impl OracleError {
    /// Errors worth retrying on a later iteration.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Unavailable(_) | OracleError::Status { .. })
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(e: serde_json::Error) -> Self {
        OracleError::Malformed(e.to_string())
    }
}

pub type OracleResult<T> = Result<T, OracleError>;
