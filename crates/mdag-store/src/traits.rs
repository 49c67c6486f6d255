use mdag_types::Digest;

use crate::error::StoreResult;

/// Content-addressed key-value store.
///
/// All implementations must satisfy these invariants:
/// - A value stored under a key is never replaced by different bytes.
/// - `has` reports a key only after its `put` has fully completed.
/// - Failures surface as `Err`; a failed `has` is never reported as absent.
pub trait KvStore: Send + Sync {
    /// Check whether a key exists.
    fn has(&self, key: &Digest) -> StoreResult<bool>;

    /// Store `value` under `key`.
    ///
    /// Writing a key that already exists is allowed and leaves the store
    /// unchanged in content.
    fn put(&self, key: &Digest, value: &[u8]) -> StoreResult<()>;

    /// Fetch the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &Digest) -> StoreResult<Option<Vec<u8>>>;
}
