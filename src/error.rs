//! Error types for MessagePack encoding and decoding.

use crate::msgpack::marker::Category;

/// Errors that can occur while packing or unpacking MessagePack data.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("value has no MessagePack representation")]
    Unclassifiable,

    #[error("value declared as {category} but decomposed as {found}")]
    ShapeMismatch {
        category: Category,
        found: &'static str,
    },

    #[error("{category} of size {size} exceeds every available format")]
    SizeOverflow { category: Category, size: u64 },

    #[error("reserved tag byte {0:#04x}")]
    ReservedTag(u8),

    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("invalid UTF-8 in str payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("length {len} exceeds limit {limit}")]
    LengthExceeded { len: usize, limit: usize },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl PackError {
    /// Returns `true` if the error was caused by malformed input bytes.
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Self::ReservedTag(_)
                | Self::UnexpectedEnd { .. }
                | Self::InvalidUtf8(_)
                | Self::InvalidTimestamp(_)
        )
    }
}
