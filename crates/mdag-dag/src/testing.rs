//! Store doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use mdag_store::{InMemoryKvStore, KvStore, StoreError, StoreResult};
use mdag_types::Digest;

/// In-memory store that counts calls.
#[derive(Debug, Default)]
pub(crate) struct CountingStore {
    pub inner: InMemoryKvStore,
    has_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

impl CountingStore {
    pub fn puts(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }
}

impl KvStore for CountingStore {
    fn has(&self, key: &Digest) -> StoreResult<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has(key)
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }
}

/// Which call a [`FailingStore`] fails on.
#[derive(Clone, Copy, Debug)]
pub(crate) enum FailOn {
    Has,
    /// Fail the n-th put (zero based); earlier puts succeed.
    Put(usize),
}

/// Store that fails on demand.
#[derive(Debug)]
pub(crate) struct FailingStore {
    pub inner: InMemoryKvStore,
    fail_on: FailOn,
    puts: AtomicUsize,
}

impl FailingStore {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: InMemoryKvStore::new(),
            fail_on,
            puts: AtomicUsize::new(0),
        }
    }
}

impl KvStore for FailingStore {
    fn has(&self, key: &Digest) -> StoreResult<bool> {
        match self.fail_on {
            FailOn::Has => Err(StoreError::Backend("has unavailable".into())),
            FailOn::Put(_) => self.inner.has(key),
        }
    }

    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst);
        match self.fail_on {
            FailOn::Put(at) if n == at => Err(StoreError::Backend("disk full".into())),
            _ => self.inner.put(key, value),
        }
    }

    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }
}
