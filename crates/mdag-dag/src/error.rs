//! Error types for the DAG encoder and reader.

use std::path::PathBuf;

use mdag_types::{Digest, TypeError};

/// Errors that can occur while building or reading a DAG.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// The store's existence check or write failed.
    #[error("store error: {0}")]
    Store(#[from] mdag_store::StoreError),

    /// Canonical encoding failed. Object shapes are always well formed, so
    /// this indicates a bug rather than bad input.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Directory nesting went past the configured limit.
    #[error("directory depth {depth} exceeds maximum of {max}")]
    DepthExceeded {
        /// Depth at which the limit was hit (the root directory is depth 1).
        depth: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A chunk size of zero was requested.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// No value is stored under the digest.
    #[error("object not found: {0}")]
    NotFound(Digest),

    /// A stored value could not be decoded or disagrees with its link.
    #[error("corrupt object {digest}: {reason}")]
    Corrupt {
        /// The offending key.
        digest: Digest,
        /// What was wrong with it.
        reason: String,
    },

    /// Stored bytes do not hash to their key.
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        /// Key the value was stored under.
        expected: Digest,
        /// Digest of the bytes actually returned.
        computed: Digest,
    },

    /// The digest names a directory where a file was expected.
    #[error("not a file: {0}")]
    NotAFile(Digest),

    /// The digest names a file where a directory was expected.
    #[error("not a directory: {0}")]
    NotADirectory(Digest),

    /// Reading the local filesystem failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is invalid or could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<TypeError> for DagError {
    fn from(e: TypeError) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
