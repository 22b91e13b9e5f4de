#![warn(missing_docs)]
//! Rich Text Core - Headless Rich-Text Document Model
//!
//! # Overview
//!
//! `rich-text-core` keeps a character buffer together with a run-length list of format spans.
//! It does not render anything and does not interpret formats: what a format means, how two
//! formats combine and when two spans may be merged is decided by a [`FormatPolicy`] supplied
//! by the embedding application.
//!
//! # Core Features
//!
//! - **Run-length spans**: consecutive characters sharing a format form one span
//! - **Arena-backed span list**: O(1) neighbor access, slot reuse and compaction
//! - **Rope text buffer**: char-indexed insertion and removal
//! - **Cursor tracking**: virtual end position, active span and current format
//! - **Selections**: range deletion and range re-formatting
//! - **Line/column mapping**: mixed line terminators, fault-tolerant navigation
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document (edit / delete / selections)      │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  SpanStore (arena)   │  Rope text buffer    │  ← Storage
//! └──────────────────────┴──────────────────────┘
//!   Position mapping (line/column ↔ offset)        ← Stateless helpers
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use rich_text_core::{Document, ReplaceFormat};
//!
//! let mut doc = Document::new(ReplaceFormat::new("regular"));
//! doc.edit("Hello, World!");
//!
//! // Make "World" bold.
//! doc.set_incremental_format(Some("bold"));
//! doc.change_selection_format(7, 12).unwrap();
//!
//! assert_eq!(
//!     doc.compile(false),
//!     vec![
//!         ("Hello, ".to_string(), "regular"),
//!         ("World".to_string(), "bold"),
//!         ("!".to_string(), "regular"),
//!     ]
//! );
//! assert_eq!(doc.cursor(), Some(7));
//! ```
//!
//! # Module Description
//!
//! - [`span_store`] - Arena of run-length spans forming an ordered linked list
//! - [`document`] - Text buffer, cursor and span editing operations
//! - [`position`] - Line/column and offset conversions
//! - [`format`] - Format merge/compare policy
//! - [`observe`] - Change notifications
//! - [`error`] - Error types
//!
//! # Unicode Support
//!
//! All offsets count Unicode scalar values (`char`s), never bytes.

pub mod document;
pub mod error;
pub mod format;
pub mod observe;
pub mod position;
pub mod span_store;

pub use document::{CURSOR_GLYPH, Document, DocumentConfig, MergeSides, SpanLocation};
pub use error::DocumentError;
pub use format::{FormatPolicy, ReplaceFormat};
pub use observe::{ChangeCallback, ChangeType, DocumentChange, trace_changes};
pub use position::{
    CoordinateBase, LineColumnOptions, line_column_to_offset, line_column_to_offset_in,
    offset_to_line_column, offset_to_line_column_in,
};
pub use span_store::{Compaction, Span, SpanId, SpanStore, StoreConfig};
