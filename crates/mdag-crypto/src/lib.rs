//! Digest engines for mdag.
//!
//! The core never holds hash state of its own. It asks a [`DigestEngine`]
//! for a fresh [`Accumulator`] per logical hash, and the accumulator is
//! consumed when finalized, so one accumulator can never feed two digests.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::{
    Accumulator, AnyAccumulator, Blake3, DigestEngine, HashAlgorithm, HasherError, Sha256,
};
