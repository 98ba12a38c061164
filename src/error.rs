//! Segment tree error types.

use thiserror::Error;

/// Result type for segment tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported when a caller violates a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Construction was attempted from an empty sequence.
    #[error("cannot build a segment tree from an empty sequence")]
    Empty,

    /// A point update targeted an index outside `[0, len)`.
    #[error("index {index} out of bounds for segment tree of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
