//! Fixed-size chunker.

use std::num::NonZeroUsize;

use crate::error::{DagError, DagResult};

/// Splits byte sequences into ordered pieces of a fixed size.
///
/// The last piece may be shorter. Empty input produces no pieces. The
/// chunker neither copies nor hashes; it only hands out sub-slices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: NonZeroUsize,
}

impl Chunker {
    /// Create a chunker, rejecting a zero chunk size.
    pub fn new(chunk_size: usize) -> DagResult<Self> {
        NonZeroUsize::new(chunk_size)
            .map(|chunk_size| Self { chunk_size })
            .ok_or(DagError::InvalidChunkSize(chunk_size))
    }

    /// The configured chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    /// Split `data` into consecutive slices of at most `chunk_size` bytes.
    pub fn chunk<'a>(&self, data: &'a [u8]) -> Vec<&'a [u8]> {
        data.chunks(self.chunk_size.get()).collect()
    }

    /// Number of pieces `chunk` produces for input of length `len`.
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size.get())
    }
}

/// Split `data` into pieces of `size` bytes; see [`Chunker::chunk`].
pub fn chunk(data: &[u8], size: usize) -> DagResult<Vec<&[u8]>> {
    Ok(Chunker::new(size)?.chunk(data))
}
