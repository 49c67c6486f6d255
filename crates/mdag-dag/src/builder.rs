//! Encoding a node tree into content-addressed objects.
//!
//! [`DagBuilder`] owns the store handle, the digest engine, and the
//! configuration for one or more `add` calls. Each logical hash takes a
//! fresh accumulator from the engine, so sibling subtrees never share hash
//! state.
//!
//! # Persistence
//!
//! - Chunks are stored as raw bytes under `digest(chunk)`.
//! - A file aggregate is stored according to [`AggregatePolicy`]; under the
//!   default only multi-chunk files get one.
//! - Directory objects are always stored.
//! - The root object returned by [`DagBuilder::add`] is always stored, even
//!   when it is a single-chunk file, so the returned digest can be fetched.
//!
//! Every write goes through an existence check first. A failed check or
//! write aborts the whole `add`; whatever was written before stays in place,
//! which is harmless because keys are content digests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mdag_crypto::{DigestEngine, HashAlgorithm};
use mdag_store::KvStore;
use mdag_types::{Digest, Link, LinkKind, Object};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::chunker::Chunker;
use crate::config::{AggregatePolicy, DagConfig};
use crate::error::{DagError, DagResult};
use crate::node::{DirNode, Node};

/// Counters describing the store traffic of a builder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Chunks written to the store.
    pub blobs_written: u64,
    /// File aggregates and directory objects written to the store.
    pub objects_written: u64,
    /// Writes skipped because the key was already present.
    pub dedup_hits: u64,
    /// Total bytes handed to `put`.
    pub bytes_written: u64,
}

#[derive(Debug, Default)]
struct Counters {
    blobs_written: AtomicU64,
    objects_written: AtomicU64,
    dedup_hits: AtomicU64,
    bytes_written: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> BuildStats {
        BuildStats {
            blobs_written: self.blobs_written.load(Ordering::Relaxed),
            objects_written: self.objects_written.load(Ordering::Relaxed),
            dedup_hits: self.dedup_hits.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// What a persisted value is, for counting and logging.
#[derive(Clone, Copy, Debug)]
enum Stored {
    Blob,
    Object,
}

/// Builds Merkle DAGs into a key-value store.
pub struct DagBuilder<E: DigestEngine = HashAlgorithm> {
    store: Arc<dyn KvStore>,
    engine: E,
    chunker: Chunker,
    policy: AggregatePolicy,
    max_depth: usize,
    counters: Counters,
}

impl DagBuilder<HashAlgorithm> {
    /// Builder using the digest algorithm named in `config`.
    pub fn new(store: Arc<dyn KvStore>, config: &DagConfig) -> DagResult<Self> {
        Self::with_engine(store, config.hash, config)
    }
}

impl<E: DigestEngine> DagBuilder<E> {
    /// Builder with an explicit digest engine. `config.hash` is ignored.
    pub fn with_engine(store: Arc<dyn KvStore>, engine: E, config: &DagConfig) -> DagResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            engine,
            chunker: Chunker::new(config.chunk_size)?,
            policy: config.aggregate_policy,
            max_depth: config.max_depth,
            counters: Counters::default(),
        })
    }

    /// The digest engine in use.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The chunker in use.
    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Store traffic so far.
    pub fn stats(&self) -> BuildStats {
        self.counters.snapshot()
    }

    // ---------------------------------------------------------------
    // Entry point
    // ---------------------------------------------------------------

    /// Encode `node` and return the digest of its top-level object.
    ///
    /// The top-level object is always persisted.
    pub fn add(&self, node: &Node) -> DagResult<Digest> {
        let digest = match node {
            Node::File(file) => {
                let (digest, object) = self.assemble_file(&self.chunker.chunk(file.bytes()))?;
                if !self.policy.persists(object.links.len()) {
                    let bytes = object.to_canonical_bytes()?;
                    self.persist(&digest, &bytes, Stored::Object)?;
                }
                digest
            }
            Node::Directory(dir) => self.build_tree(dir)?.0,
        };

        let stats = self.stats();
        info!(
            root = %digest.short_hex(),
            kind = ?node.kind(),
            blobs = stats.blobs_written,
            objects = stats.objects_written,
            dedup = stats.dedup_hits,
            "added node"
        );
        Ok(digest)
    }

    // ---------------------------------------------------------------
    // Blobs and files
    // ---------------------------------------------------------------

    /// Store one chunk under its digest and return an unnamed link to it.
    pub fn encode_blob(&self, chunk: &[u8]) -> DagResult<Link> {
        let digest = self.engine.digest(chunk);
        self.persist(&digest, chunk, Stored::Blob)?;
        Ok(Link::data(digest, chunk.len() as u64))
    }

    /// Encode every chunk in order and aggregate their links into a file
    /// object.
    ///
    /// The returned digest is that of the aggregate's canonical encoding.
    /// Whether the aggregate itself is written depends on the
    /// [`AggregatePolicy`].
    pub fn assemble_file(&self, chunks: &[&[u8]]) -> DagResult<(Digest, Object)> {
        let links = chunks
            .iter()
            .map(|chunk| self.encode_blob(chunk))
            .collect::<DagResult<Vec<_>>>()?;

        let object = Object::file(links);
        let bytes = object.to_canonical_bytes()?;
        let digest = self.engine.digest(&bytes);

        if self.policy.persists(object.links.len()) {
            self.persist(&digest, &bytes, Stored::Object)?;
        }
        Ok((digest, object))
    }

    // ---------------------------------------------------------------
    // Directories
    // ---------------------------------------------------------------

    /// Encode a directory and everything below it, and store its object.
    pub fn build_tree(&self, dir: &DirNode) -> DagResult<(Digest, Object)> {
        self.build_tree_at(dir, 1)
    }

    fn build_tree_at(&self, dir: &DirNode, depth: usize) -> DagResult<(Digest, Object)> {
        if depth > self.max_depth {
            return Err(DagError::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }

        let mut links = Vec::with_capacity(dir.len());
        let mut tags = Vec::with_capacity(dir.len());

        for child in dir.children() {
            match child {
                Node::File(file) => {
                    let chunks = self.chunker.chunk(file.bytes());
                    let (digest, object) = self.assemble_file(&chunks)?;
                    let kind = if self.policy.persists(object.links.len()) {
                        LinkKind::Link
                    } else {
                        LinkKind::Data
                    };
                    links.push(Link::named(file.name(), digest, file.size()));
                    tags.push(kind);
                }
                Node::Directory(sub) => {
                    let (digest, _) = self.build_tree_at(sub, depth + 1)?;
                    links.push(Link::named(sub.name(), digest, sub.size()));
                    tags.push(LinkKind::Tree);
                }
            }
        }

        let object = Object::directory(links, tags);
        let bytes = object.to_canonical_bytes()?;
        let digest = self.engine.digest(&bytes);
        self.persist(&digest, &bytes, Stored::Object)?;

        debug!(
            dir = dir.name(),
            digest = %digest.short_hex(),
            entries = object.links.len(),
            depth,
            "built tree"
        );
        Ok((digest, object))
    }

    // ---------------------------------------------------------------
    // Store access
    // ---------------------------------------------------------------

    /// Check-then-put.
    fn persist(&self, digest: &Digest, bytes: &[u8], what: Stored) -> DagResult<()> {
        if self.store.has(digest)? {
            self.counters.dedup_hits.fetch_add(1, Ordering::Relaxed);
            trace!(digest = %digest.short_hex(), ?what, "already stored");
            return Ok(());
        }

        self.store.put(digest, bytes)?;
        let counter = match what {
            Stored::Blob => &self.counters.blobs_written,
            Stored::Object => &self.counters.objects_written,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.counters
            .bytes_written
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        debug!(digest = %digest.short_hex(), ?what, size = bytes.len(), "stored");
        Ok(())
    }
}

impl<E: DigestEngine + std::fmt::Debug> std::fmt::Debug for DagBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagBuilder")
            .field("engine", &self.engine)
            .field("chunk_size", &self.chunker.chunk_size())
            .field("policy", &self.policy)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
