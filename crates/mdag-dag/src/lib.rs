//! Merkle DAG encoder for mdag.
//!
//! Turns a file-or-directory [`Node`] tree into content-addressed objects in
//! a [`KvStore`](mdag_store::KvStore). Files are split into fixed-size
//! chunks, every chunk is stored under its own digest, and files and
//! directories become objects whose links name their children by digest.
//!
//! # Pipeline
//!
//! - [`Chunker`] -- fixed-size splitting
//! - [`DagBuilder::encode_blob`] -- one chunk into a stored leaf and a link
//! - [`DagBuilder::assemble_file`] -- chunk links into a file aggregate
//! - [`DagBuilder::build_tree`] -- a directory into a stored tree object
//! - [`DagBuilder::add`] -- entry point, returns the root digest
//!
//! [`DagReader`] walks the stored DAG back, and [`fs::load_path`] builds a
//! node tree from the local filesystem.

pub mod builder;
pub mod chunker;
pub mod config;
pub mod error;
pub mod fs;
pub mod node;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{BuildStats, DagBuilder};
pub use chunker::{chunk, Chunker};
pub use config::{AggregatePolicy, DagConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_DEPTH};
pub use error::{DagError, DagResult};
pub use node::{DirNode, FileNode, Node, NodeKind};
pub use reader::{DagReader, DirEntry, WalkEntry};

pub use mdag_crypto::{DigestEngine, HashAlgorithm};
pub use mdag_types::{Digest, Link, LinkKind, Object};
