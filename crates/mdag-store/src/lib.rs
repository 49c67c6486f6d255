//! Content-addressed key-value storage for mdag.
//!
//! The DAG builder talks to storage through the narrow [`KvStore`] trait:
//! an existence check, a put, and a get for reading back. Keys are digests,
//! values are opaque bytes (raw chunks or canonical objects).
//!
//! # Storage Backends
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsKvStore`] -- one file per key under a two-level fan-out directory
//!
//! # Design Rules
//!
//! 1. Values are immutable once written (content-addressing guarantees this).
//! 2. The store never interprets values -- it does not know which digest
//!    algorithm produced a key.
//! 3. Concurrent `has`/`put` from unrelated writers are safe; two writers of
//!    one key always write identical bytes, so the last one wins harmlessly.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsKvStore;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
