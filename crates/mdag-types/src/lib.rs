//! Foundation types for mdag.
//!
//! This crate provides the identifiers and object shapes shared by every
//! other mdag crate. It does not hash anything itself: digests are produced
//! by `mdag-crypto` and merely carried here.
//!
//! # Key Types
//!
//! - [`Digest`] -- Fixed-width 32-byte content digest, used as store key and link target
//! - [`Link`] -- Named, sized reference to a child by digest
//! - [`LinkKind`] -- Type tag of a directory entry (`data`, `link`, `tree`)
//! - [`Object`] -- Node of the DAG: ordered links plus optional data
//! - [`ObjectData`] -- Raw leaf bytes or the per-link tag sequence of a directory

pub mod digest;
pub mod error;
pub mod object;

pub use digest::{Digest, DIGEST_LEN};
pub use error::TypeError;
pub use object::{Link, LinkKind, Object, ObjectData};
