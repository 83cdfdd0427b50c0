//! Error types for fogmesh operations.

use thiserror::Error;

/// Errors surfaced by registry, index, and query operations.
#[derive(Error, Debug)]
pub enum FogmeshError {
    /// Request parameters are missing or malformed.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Fewer devices are registered than the requested result count.
    ///
    /// Distinguished from a successful empty result: the request was
    /// well-formed but the population cannot satisfy it.
    #[error("not enough devices registered: requested {requested}, available {available}")]
    Underflow { requested: usize, available: usize },

    /// The device store failed its connectivity probe.
    #[error("device store unavailable: {0}")]
    StoreUnavailable(String),

    /// The cluster admission collaborator refused the device.
    #[error("cluster admission failed: {0}")]
    AdmissionDenied(String),

    /// No device matches the given identifier.
    #[error("device not found")]
    NotFound,

    /// A persisted cell key could not be parsed.
    #[error("invalid cell key: {0}")]
    InvalidCellKey(String),

    /// Serialization failure in configuration or layout handling.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for fogmesh operations.
pub type Result<T> = std::result::Result<T, FogmeshError>;
