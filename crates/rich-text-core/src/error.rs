//! Error types shared by the document model and the position mapper.

use thiserror::Error;

/// Errors reported by [`Document`](crate::Document) operations and the line/column mapper.
///
/// Every variant carries the offending value. Validation happens before any mutation, so a
/// returned error always leaves the document untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("position {position} is out of range 0..={len}")]
    /// A character offset outside `0..=len`.
    OutOfRange {
        /// The rejected offset.
        position: usize,
        /// Character count of the text at the time of the call.
        len: usize,
    },

    #[error("line {line}, column {column} is outside the text")]
    /// A strict line/column lookup that does not name a position in the text.
    LineColumnOutOfRange {
        /// Requested line, as passed by the caller.
        line: isize,
        /// Requested column, as passed by the caller.
        column: isize,
    },

    #[error("invalid selection {start}..{end} for text of length {len}")]
    /// Selection bounds violating `start < end <= len`.
    InvalidRange {
        /// Inclusive start offset.
        start: usize,
        /// Exclusive end offset.
        end: usize,
        /// Character count of the text at the time of the call.
        len: usize,
    },

    #[error("seed spans cover {spans} characters but the text has {text}")]
    /// Seed spans whose lengths do not add up to the seed text.
    SeedLengthMismatch {
        /// Sum of the seed span lengths.
        spans: usize,
        /// Character count of the seed text.
        text: usize,
    },

    #[error("seed span {index} is empty")]
    /// A zero-length seed span.
    EmptySeedSpan {
        /// Position of the span in the seed sequence.
        index: usize,
    },
}
