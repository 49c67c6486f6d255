//! Builder configuration, loadable from TOML.

use std::path::Path;

use mdag_crypto::HashAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};

/// Default chunk size in bytes (256 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 262_144;

/// Default limit on directory nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// When a file's aggregate object (its list of chunk links) is persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatePolicy {
    /// Persist only aggregates of files that produced more than one chunk.
    /// A single-chunk file is already fully described by its blob.
    #[default]
    MultiChunk,
    /// Persist every aggregate, so any file digest can be read back.
    Always,
}

impl AggregatePolicy {
    /// Whether an aggregate over `chunk_count` chunks is written to the store.
    pub fn persists(&self, chunk_count: usize) -> bool {
        match self {
            Self::MultiChunk => chunk_count > 1,
            Self::Always => true,
        }
    }
}

/// Configuration for [`DagBuilder`](crate::DagBuilder).
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DagConfig {
    /// Size of every chunk except possibly the last, in bytes.
    pub chunk_size: usize,
    /// Digest algorithm used for keys and links.
    pub hash: HashAlgorithm,
    /// Which file aggregates are persisted.
    pub aggregate_policy: AggregatePolicy,
    /// Maximum directory nesting; the root directory counts as depth 1.
    pub max_depth: usize,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: HashAlgorithm::default(),
            aggregate_policy: AggregatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DagConfig {
    /// Reject values the builder cannot work with.
    pub fn validate(&self) -> DagResult<()> {
        if self.chunk_size == 0 {
            return Err(DagError::InvalidChunkSize(0));
        }
        if self.max_depth == 0 {
            return Err(DagError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> DagResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DagError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> DagResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DagError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> DagResult<String> {
        toml::to_string(self).map_err(|e| DagError::Config(e.to_string()))
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_aggregate_policy(mut self, policy: AggregatePolicy) -> Self {
        self.aggregate_policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DagConfig::default();
        assert_eq!(c.chunk_size, 262_144);
        assert_eq!(c.hash, HashAlgorithm::Blake3);
        assert_eq!(c.aggregate_policy, AggregatePolicy::MultiChunk);
        assert_eq!(c.max_depth, 256);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DagConfig::from_toml_str("").unwrap(), DagConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let c = DagConfig::from_toml_str(
            r#"
            chunk_size = 1024
            hash = "sha256"
            aggregate_policy = "always"
            max_depth = 8
            "#,
        )
        .unwrap();
        assert_eq!(c.chunk_size, 1024);
        assert_eq!(c.hash, HashAlgorithm::Sha256);
        assert_eq!(c.aggregate_policy, AggregatePolicy::Always);
        assert_eq!(c.max_depth, 8);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(
            DagConfig::from_toml_str("chunk_size = 0"),
            Err(DagError::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn rejects_zero_depth() {
        assert!(matches!(
            DagConfig::from_toml_str("max_depth = 0"),
            Err(DagError::Config(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            DagConfig::from_toml_str("chunk_sise = 4"),
            Err(DagError::Config(_))
        ));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(DagConfig::from_toml_str(r#"hash = "md5""#).is_err());
    }

    #[test]
    fn toml_output_parses_back() {
        let c = DagConfig::default()
            .with_chunk_size(4096)
            .with_hash(HashAlgorithm::Sha256)
            .with_aggregate_policy(AggregatePolicy::Always)
            .with_max_depth(3);
        let text = c.to_toml_string().unwrap();
        assert!(text.contains("aggregate_policy = \"always\""));
        assert_eq!(DagConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdag.toml");
        std::fs::write(&path, "chunk_size = 16\n").unwrap();
        assert_eq!(DagConfig::load(&path).unwrap().chunk_size, 16);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DagConfig::load(dir.path().join("absent.toml")),
            Err(DagError::Io { .. })
        ));
    }

    #[test]
    fn policy_persistence_rule() {
        assert!(!AggregatePolicy::MultiChunk.persists(0));
        assert!(!AggregatePolicy::MultiChunk.persists(1));
        assert!(AggregatePolicy::MultiChunk.persists(2));
        assert!(AggregatePolicy::Always.persists(0));
        assert!(AggregatePolicy::Always.persists(1));
    }
}
