use std::fmt;
use std::str::FromStr;

use mdag_types::Digest;
use serde::{Deserialize, Serialize};

/// Running hash state for a single logical digest.
///
/// `finalize` takes `self`, so an accumulator cannot be reused for a second
/// computation. Extending a prefix means moving the accumulator in.
pub trait Accumulator {
    /// Feed more bytes.
    fn update(&mut self, data: &[u8]);

    /// Produce the digest of everything fed so far.
    fn finalize(self) -> Digest;
}

/// A deterministic hash primitive that hands out fresh accumulators.
///
/// Engines carry no mutable state; every call to [`accumulator`] starts from
/// scratch. This is what lets sibling subtrees and concurrent builds share
/// one engine.
///
/// [`accumulator`]: DigestEngine::accumulator
pub trait DigestEngine: Send + Sync {
    /// Accumulator type produced by this engine.
    type Accumulator: Accumulator;

    /// A new, empty accumulator.
    fn accumulator(&self) -> Self::Accumulator;

    /// Short algorithm name, e.g. `"blake3"`.
    fn name(&self) -> &'static str;

    /// Digest of `data` using a fresh accumulator.
    fn digest(&self, data: &[u8]) -> Digest {
        let mut acc = self.accumulator();
        acc.update(data);
        acc.finalize()
    }

    /// Extend an existing accumulator with `data` and finalize it.
    fn digest_of_concat(&self, prefix: Self::Accumulator, data: &[u8]) -> Digest {
        let mut acc = prefix;
        acc.update(data);
        acc.finalize()
    }

    /// Verify that data produces the expected digest.
    fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.digest(data) == *expected
    }
}

// ---------------------------------------------------------------------------
// BLAKE3
// ---------------------------------------------------------------------------

/// BLAKE3 engine (the default).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3;

impl Accumulator for blake3::Hasher {
    fn update(&mut self, data: &[u8]) {
        blake3::Hasher::update(self, data);
    }

    fn finalize(self) -> Digest {
        Digest::from_hash(*blake3::Hasher::finalize(&self).as_bytes())
    }
}

impl DigestEngine for Blake3 {
    type Accumulator = blake3::Hasher;

    fn accumulator(&self) -> Self::Accumulator {
        blake3::Hasher::new()
    }

    fn name(&self) -> &'static str {
        "blake3"
    }

    fn digest(&self, data: &[u8]) -> Digest {
        Digest::from_hash(*blake3::hash(data).as_bytes())
    }
}

// ---------------------------------------------------------------------------
// SHA-256
// ---------------------------------------------------------------------------

/// SHA-256 engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256;

impl Accumulator for sha2::Sha256 {
    fn update(&mut self, data: &[u8]) {
        sha2::Digest::update(self, data);
    }

    fn finalize(self) -> Digest {
        let out = sha2::Digest::finalize(self);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&out);
        Digest::from_hash(hash)
    }
}

impl DigestEngine for Sha256 {
    type Accumulator = sha2::Sha256;

    fn accumulator(&self) -> Self::Accumulator {
        <sha2::Sha256 as sha2::Digest>::new()
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

// ---------------------------------------------------------------------------
// Runtime selection
// ---------------------------------------------------------------------------

/// Digest algorithm chosen at runtime (from configuration or the command line).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

/// Accumulator for whichever algorithm a [`HashAlgorithm`] selects.
pub enum AnyAccumulator {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl Accumulator for AnyAccumulator {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Blake3(h) => Accumulator::update(h.as_mut(), data),
            Self::Sha256(h) => Accumulator::update(h, data),
        }
    }

    fn finalize(self) -> Digest {
        match self {
            Self::Blake3(h) => Accumulator::finalize(*h),
            Self::Sha256(h) => Accumulator::finalize(h),
        }
    }
}

impl DigestEngine for HashAlgorithm {
    type Accumulator = AnyAccumulator;

    fn accumulator(&self) -> Self::Accumulator {
        match self {
            Self::Blake3 => AnyAccumulator::Blake3(Box::new(Blake3.accumulator())),
            Self::Sha256 => AnyAccumulator::Sha256(Sha256.accumulator()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Blake3 => Blake3.name(),
            Self::Sha256 => Sha256.name(),
        }
    }

    fn digest(&self, data: &[u8]) -> Digest {
        match self {
            Self::Blake3 => Blake3.digest(data),
            Self::Sha256 => Sha256.digest(data),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HasherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(HasherError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}
