use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::TypeError;

/// Type tag recorded for each entry of a directory object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// A file whose aggregate object was not persisted (at most one chunk).
    Data,
    /// A file whose aggregate object is in the store.
    Link,
    /// A subdirectory.
    Tree,
}

impl LinkKind {
    /// The tag as written in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Link => "link",
            Self::Tree => "tree",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a parent object to a child, by content digest.
///
/// `name` is empty for chunk links inside a file and carries the entry name
/// for directory links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub hash: Digest,
    pub size: u64,
}

impl Link {
    /// Unnamed link to a chunk.
    pub fn data(hash: Digest, size: u64) -> Self {
        Self {
            name: String::new(),
            hash,
            size,
        }
    }

    /// Named directory entry.
    pub fn named(name: impl Into<String>, hash: Digest, size: u64) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
        }
    }
}

/// Payload carried by an [`Object`] next to its links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectData {
    /// Raw chunk bytes of a leaf.
    Raw(Vec<u8>),
    /// One tag per link of a directory, in link order.
    Tags(Vec<LinkKind>),
}

/// A node of the Merkle DAG.
///
/// Objects come in three shapes:
///
/// - leaf: `data = Raw(..)` and no links,
/// - file aggregate: chunk links and no data,
/// - directory: entry links and `data = Tags(..)` with one tag per link.
///
/// Leaves are never serialized: a chunk is stored and hashed as its raw
/// bytes. Internal objects go through [`Object::to_canonical_bytes`], whose
/// output is what gets hashed and persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub links: Vec<Link>,
    pub data: Option<ObjectData>,
}

impl Object {
    /// Leaf holding a chunk.
    pub fn leaf(data: Vec<u8>) -> Self {
        Self {
            links: Vec::new(),
            data: Some(ObjectData::Raw(data)),
        }
    }

    /// File aggregate over its chunk links.
    pub fn file(links: Vec<Link>) -> Self {
        Self { links, data: None }
    }

    /// Directory over its entry links and their parallel tags.
    pub fn directory(links: Vec<Link>, tags: Vec<LinkKind>) -> Self {
        debug_assert_eq!(links.len(), tags.len());
        Self {
            links,
            data: Some(ObjectData::Tags(tags)),
        }
    }

    /// Returns `true` for a leaf object.
    pub fn is_leaf(&self) -> bool {
        self.links.is_empty() && matches!(self.data, Some(ObjectData::Raw(_)))
    }

    /// Returns `true` if this object lists directory entries.
    pub fn is_directory(&self) -> bool {
        matches!(self.data, Some(ObjectData::Tags(_)))
    }

    /// Returns `true` if this object is a file aggregate.
    pub fn is_file(&self) -> bool {
        self.data.is_none()
    }

    /// Directory tags, if this is a directory object.
    pub fn tags(&self) -> Option<&[LinkKind]> {
        match &self.data {
            Some(ObjectData::Tags(tags)) => Some(tags),
            _ => None,
        }
    }

    /// Sum of the sizes of all links, or `None` if it overflows `u64`.
    pub fn total_size(&self) -> Option<u64> {
        self.links
            .iter()
            .try_fold(0u64, |acc, l| acc.checked_add(l.size))
    }

    /// Canonical encoding used for hashing and storage.
    ///
    /// bincode with its default options: fixed-width little-endian integers,
    /// length-prefixed strings and sequences, digests as 32 raw bytes, fields
    /// in declaration order.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, TypeError> {
        bincode::serialize(self).map_err(|e| TypeError::Encode(e.to_string()))
    }

    /// Decode an object previously produced by [`Object::to_canonical_bytes`].
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let object: Self =
            bincode::deserialize(bytes).map_err(|e| TypeError::Decode(e.to_string()))?;
        if let Some(ObjectData::Tags(tags)) = &object.data {
            if tags.len() != object.links.len() {
                return Err(TypeError::MalformedDirectory {
                    links: object.links.len(),
                    tags: tags.len(),
                });
            }
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(b: u8) -> Digest {
        Digest::from_hash([b; 32])
    }

    #[test]
    fn shapes_are_disjoint() {
        let leaf = Object::leaf(b"abc".to_vec());
        assert!(leaf.is_leaf());
        assert!(!leaf.is_directory());
        assert!(!leaf.is_file());

        let file = Object::file(vec![Link::data(d(1), 3)]);
        assert!(file.is_file());
        assert!(!file.is_directory());

        let dir = Object::directory(vec![Link::named("a", d(1), 3)], vec![LinkKind::Data]);
        assert!(dir.is_directory());
        assert_eq!(dir.tags(), Some(&[LinkKind::Data][..]));
    }

    #[test]
    fn encoding_is_stable() {
        let obj = Object::directory(
            vec![Link::named("a", d(1), 5), Link::named("b", d(2), 5)],
            vec![LinkKind::Data, LinkKind::Tree],
        );
        let first = obj.to_canonical_bytes().unwrap();
        let second = obj.clone().to_canonical_bytes().unwrap();
        assert_eq!(first, second);
        assert_eq!(Object::from_canonical_bytes(&first).unwrap(), obj);
    }

    #[test]
    fn link_order_changes_encoding() {
        let a = Link::named("a", d(1), 5);
        let b = Link::named("b", d(2), 5);
        let ab = Object::directory(vec![a.clone(), b.clone()], vec![LinkKind::Data; 2]);
        let ba = Object::directory(vec![b, a], vec![LinkKind::Data; 2]);
        assert_ne!(
            ab.to_canonical_bytes().unwrap(),
            ba.to_canonical_bytes().unwrap()
        );
    }

    #[test]
    fn hash_bytes_appear_verbatim() {
        let obj = Object::file(vec![Link::data(d(0xee), 1)]);
        let bytes = obj.to_canonical_bytes().unwrap();
        assert!(bytes.windows(32).any(|w| w == [0xee; 32]));
    }

    #[test]
    fn empty_file_encodes() {
        let obj = Object::file(Vec::new());
        let bytes = obj.to_canonical_bytes().unwrap();
        assert_eq!(Object::from_canonical_bytes(&bytes).unwrap(), obj);
    }

    #[test]
    fn decode_rejects_mismatched_tags() {
        let bad = Object {
            links: vec![Link::named("a", d(1), 1)],
            data: Some(ObjectData::Tags(Vec::new())),
        };
        let bytes = bincode::serialize(&bad).unwrap();
        assert!(matches!(
            Object::from_canonical_bytes(&bytes),
            Err(TypeError::MalformedDirectory { links: 1, tags: 0 })
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Object::from_canonical_bytes(&[0xff; 3]),
            Err(TypeError::Decode(_))
        ));
    }

    #[test]
    fn link_kind_display() {
        assert_eq!(LinkKind::Data.to_string(), "data");
        assert_eq!(LinkKind::Link.to_string(), "link");
        assert_eq!(LinkKind::Tree.to_string(), "tree");
    }

    #[test]
    fn total_size_sums_links() {
        let obj = Object::file(vec![Link::data(d(1), 4), Link::data(d(2), 6)]);
        assert_eq!(obj.total_size(), Some(10));
    }

    #[test]
    fn total_size_overflow_is_none() {
        let obj = Object::file(vec![Link::data(d(1), u64::MAX), Link::data(d(2), 1)]);
        assert_eq!(obj.total_size(), None);
    }
}
