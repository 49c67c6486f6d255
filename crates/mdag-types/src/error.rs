/// Errors from parsing digests and encoding or decoding objects.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    /// A digest string was not valid hex.
    #[error("invalid hex digest: {0}")]
    InvalidHex(String),

    /// Digest bytes had the wrong width.
    #[error("digest must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("object encoding failed: {0}")]
    Encode(String),

    #[error("object decoding failed: {0}")]
    Decode(String),

    /// A directory object whose tag count differs from its link count.
    #[error("directory has {links} links but {tags} tags")]
    MalformedDirectory { links: usize, tags: usize },
}
