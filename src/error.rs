//! Error types for every seam of the lineage pipeline.
//!
//! Only `InstrumentError` ever reaches the instrumented program. Everything on
//! the emission path is logged and handed back as a value.

use thiserror::Error;

/// A dataset reference could not be turned into a namespaced dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("dataset path is empty")]
    EmptyPath,

    #[error("malformed scheme in path '{0}'")]
    MalformedScheme(String),

    #[error("object storage path '{0}' has no bucket")]
    MissingBucket(String),

    #[error("object storage path '{0}' has no key")]
    MissingKey(String),

    #[error("uri '{0}' has nothing after the scheme")]
    EmptyLocation(String),

    #[error("cannot resolve relative path '{path}': {reason}")]
    WorkingDirectory { path: String, reason: String },
}

/// Delivery of a run event failed.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialize run event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("collector rejected event with status {status}")]
    Status { status: u16 },
}

/// Errors reported by the run tracker. None of them is fatal to the host.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("emission failed: {0}")]
    Emit(#[from] EmitError),

    #[error("run already finalized")]
    AlreadyFinalized,
}

/// Errors surfaced to the caller of an instrumented I/O call.
#[derive(Debug, Error)]
pub enum InstrumentError {
    /// The intercepted call had no usable dataset path.
    #[error("argument '{argument}' not found in call to {operation}")]
    MissingPath {
        operation: &'static str,
        argument: &'static str,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("columns {found:?} do not match {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid OPENLINEAGE_TIMEOUT '{0}'")]
    InvalidTimeout(String),

    #[error("invalid OPENLINEAGE_URL '{0}'")]
    InvalidUrl(String),
}
