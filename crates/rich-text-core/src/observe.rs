//! Change notifications
//!
//! A [`Document`](crate::Document) reports every completed public operation to the callbacks
//! registered with [`Document::subscribe`](crate::Document::subscribe). Callbacks run after the
//! document is back in a consistent state, so they may inspect it freely.

use std::ops::Range;

/// Kind of operation that produced a [`DocumentChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Text inserted at the cursor.
    Inserted,
    /// One character removed before the cursor.
    Deleted,
    /// Cursor moved without touching the text.
    CursorMoved,
    /// A selection was removed.
    SelectionDeleted,
    /// A selection was reformatted.
    SelectionFormatted,
}

/// Record of a completed document operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Operation kind.
    pub change_type: ChangeType,
    /// Affected character range, in offsets before the operation.
    pub region: Option<Range<usize>>,
    /// Cursor after the operation.
    pub cursor: Option<usize>,
    /// Live span count after the operation.
    pub span_count: usize,
    /// Character count after the operation.
    pub char_count: usize,
}

/// Document change callback function type
pub type ChangeCallback = Box<dyn FnMut(&DocumentChange) + Send>;

/// Callback that forwards every change to `tracing` at debug level.
///
/// ```rust
/// use rich_text_core::{Document, ReplaceFormat, trace_changes};
///
/// let mut doc = Document::new(ReplaceFormat::new("plain"));
/// doc.subscribe(trace_changes());
/// doc.edit("hello");
/// ```
pub fn trace_changes() -> impl FnMut(&DocumentChange) + Send + 'static {
    |change: &DocumentChange| {
        tracing::debug!(
            change = ?change.change_type,
            region = ?change.region,
            cursor = ?change.cursor,
            spans = change.span_count,
            chars = change.char_count,
            "document changed"
        );
    }
}
