//! Rich-text document
//!
//! A [`Document`] pairs a character buffer with a [`SpanStore`] of run-length format spans and
//! tracks a cursor. Every public operation is a complete state transition: when it returns, the
//! span lengths add up to the text length, no two adjacent spans carry formats the policy
//! considers equal, and the cached active span is live.
//!
//! # Cursor model
//!
//! The cursor is `None` exactly when the text is empty. Otherwise it lies in `0..=len`, where
//! `len` is the *virtual end position*: no span owns it, and the active span is the one ending
//! just before it.
//!
//! # Example
//!
//! ```rust
//! use rich_text_core::{Document, ReplaceFormat};
//!
//! let mut doc = Document::new(ReplaceFormat::new("plain"));
//! doc.edit("Hello ");
//! doc.set_current_format("bold");
//! doc.edit("world");
//!
//! let pairs = doc.compile(false);
//! assert_eq!(
//!     pairs,
//!     vec![("Hello ".to_string(), "plain"), ("world".to_string(), "bold")]
//! );
//! ```

use crate::error::DocumentError;
use crate::format::FormatPolicy;
use crate::observe::{ChangeCallback, ChangeType, DocumentChange};
use crate::position::{self, CoordinateBase, LineColumnOptions};
use crate::span_store::{Span, SpanId, SpanStore, StoreConfig};
use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// Glyph inserted by [`Document::compile`] to show the cursor (`█`).
pub const CURSOR_GLYPH: char = '\u{2588}';

/// Document configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Configuration of the underlying span store.
    pub store: StoreConfig,
    /// Glyph used by [`Document::compile`] to mark the cursor.
    pub cursor_glyph: char,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            cursor_glyph: CURSOR_GLYPH,
        }
    }
}

/// A span together with the offset of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanLocation {
    /// Key of the span.
    pub id: SpanId,
    /// Offset of the first character covered by the span.
    pub start: usize,
}

/// Which neighbors [`Document::merge_both_sides`] absorbed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSides {
    /// The span was merged into its predecessor.
    pub left: bool,
    /// The successor was merged into the span.
    pub right: bool,
}

/// Rich-text document: text buffer, format spans and cursor.
pub struct Document<P: FormatPolicy> {
    policy: P,
    text: Rope,
    cursor: Option<usize>,
    /// Span owning the cursor, or ending right before it at the virtual end position
    active_span: Option<SpanId>,
    spans: SpanStore<P::Format>,
    current_format: P::Format,
    incremental_format: Option<P::Format>,
    config: DocumentConfig,
    callbacks: Vec<ChangeCallback>,
}

impl<P: FormatPolicy> Document<P> {
    /// Create an empty document.
    pub fn new(policy: P) -> Self {
        Self::with_config(policy, DocumentConfig::default())
    }

    /// Create an empty document with a custom configuration.
    pub fn with_config(policy: P, config: DocumentConfig) -> Self {
        let current_format = policy.default_format();
        let incremental_format = Some(policy.default_format());
        Self {
            policy,
            text: Rope::new(),
            cursor: None,
            active_span: None,
            spans: SpanStore::with_config(config.store),
            current_format,
            incremental_format,
            config,
            callbacks: Vec::new(),
        }
    }

    /// Create a document from `text` and the spans formatting it.
    ///
    /// The spans are copied as given: adjacent equal formats are not merged until an operation
    /// touches them. A non-empty document starts with its cursor at the virtual end position.
    pub fn from_spans(
        policy: P,
        text: &str,
        spans: &[Span<P::Format>],
    ) -> Result<Self, DocumentError> {
        Self::from_spans_with_config(policy, DocumentConfig::default(), text, spans)
    }

    /// [`Document::from_spans`] with a custom configuration.
    pub fn from_spans_with_config(
        policy: P,
        config: DocumentConfig,
        text: &str,
        spans: &[Span<P::Format>],
    ) -> Result<Self, DocumentError> {
        if let Some(index) = spans.iter().position(|span| span.len == 0) {
            return Err(DocumentError::EmptySeedSpan { index });
        }
        let text_len = text.chars().count();
        let spans_len: usize = spans.iter().map(|span| span.len).sum();
        if spans_len != text_len {
            return Err(DocumentError::SeedLengthMismatch {
                spans: spans_len,
                text: text_len,
            });
        }

        let mut doc = Self::with_config(policy, config);
        doc.text = Rope::from_str(text);
        doc.spans = SpanStore::from_spans_with_config(spans, config.store);
        if text_len > 0 {
            doc.place_cursor(text_len);
        }
        Ok(doc)
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The text buffer.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Number of characters.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Whether the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    /// Cursor offset; `None` when the document is empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Span holding the cursor (the span ending before it at the virtual end position).
    pub fn active_span(&self) -> Option<SpanId> {
        self.active_span
    }

    /// The format spans.
    pub fn spans(&self) -> &SpanStore<P::Format> {
        &self.spans
    }

    /// The format policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Configuration the document was created with.
    pub fn config(&self) -> DocumentConfig {
        self.config
    }

    /// Format given to newly typed text.
    pub fn current_format(&self) -> &P::Format {
        &self.current_format
    }

    /// Merge `format` into the current format.
    ///
    /// The policy decides what survives, so properties unrelated to `format` may be kept.
    pub fn set_current_format(&mut self, format: P::Format) {
        self.current_format = self.policy.merge(&self.current_format, &format);
    }

    /// Format merged into every span by [`Document::change_selection_format`].
    pub fn incremental_format(&self) -> Option<&P::Format> {
        self.incremental_format.as_ref()
    }

    /// Set or clear the incremental format. While unset, reformatting only re-merges spans.
    ///
    /// A new document starts with the policy's default format here.
    pub fn set_incremental_format(&mut self, format: Option<P::Format>) {
        self.incremental_format = format;
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Insert `s` before the character at the cursor, using the current format.
    ///
    /// The cursor ends up right after the inserted text. Inserting an empty string does nothing.
    pub fn edit(&mut self, s: &str) {
        let inserted = s.chars().count();
        if inserted == 0 {
            return;
        }
        let span = Span::new(inserted, self.current_format.clone());

        let offset = match self.cursor {
            None => {
                self.text.insert(0, s);
                self.cursor = Some(inserted);
                self.active_span = Some(self.spans.create(span, None));
                0
            }
            Some(pos) => {
                self.cut_span(pos);
                let before = match pos {
                    0 => None,
                    _ => Some(self.locate(pos - 1).id),
                };
                self.text.insert(pos, s);
                self.cursor = Some(pos + inserted);
                self.active_span = Some(self.spans.create(span, before));
                pos
            }
        };

        if let Some(id) = self.active_span {
            self.merge_sides(id);
        }
        self.finish(ChangeType::Inserted, Some(offset..offset + inserted));
    }

    /// Remove the character before the cursor. Does nothing at offset 0 or on an empty document.
    ///
    /// The current format is left untouched, so repeated deletions keep typing in the same
    /// format.
    pub fn delete(&mut self) {
        let Some(pos) = self.cursor.filter(|&pos| pos >= 1) else {
            return;
        };

        let owner = self.locate(pos - 1).id;
        self.text.remove(pos - 1..pos);
        self.cursor = Some(pos - 1);

        let remaining = {
            let span = &mut self.spans[owner];
            span.len -= 1;
            span.len
        };
        if remaining == 0 {
            let prev = self.spans.previous(owner);
            let next = self.spans.next(owner);
            self.spans.unlink(owner);
            match prev {
                Some(prev) => {
                    if self.active_span == Some(owner) {
                        self.active_span = Some(prev);
                    }
                    self.merge_right(prev);
                }
                None if self.text.len_chars() == 0 => {
                    self.cursor = None;
                    self.active_span = None;
                }
                // The successor became the root and now holds the cursor.
                None => {
                    if self.active_span == Some(owner) {
                        self.active_span = next;
                    }
                }
            }
        }

        self.finish(ChangeType::Deleted, Some(pos - 1..pos));
    }

    /// Move the cursor to `pos` and pick up the format found there.
    ///
    /// On an empty document only `0` is accepted and the cursor stays unset.
    pub fn change_position(&mut self, pos: usize) -> Result<(), DocumentError> {
        self.check_pos(pos)?;
        if !self.is_empty() {
            self.place_cursor(pos);
        }
        self.finish(ChangeType::CursorMoved, None);
        Ok(())
    }

    /// Remove the characters in `start..end` and put the cursor at `start`.
    pub fn delete_selection(&mut self, start: usize, end: usize) -> Result<(), DocumentError> {
        self.check_range(start, end)?;

        self.cut_span(start);
        self.cut_span(end);
        for id in self.select_spans(start, end) {
            self.spans.unlink(id);
        }
        self.text.remove(start..end);

        if self.is_empty() {
            self.cursor = None;
            self.active_span = None;
        } else {
            self.place_cursor(start);
            // Rejoin the spans around the removed range. At offset 0 there is no left side.
            if let Some(id) = self.active_span {
                self.merge_sides(id);
            }
        }

        self.finish(ChangeType::SelectionDeleted, Some(start..end));
        Ok(())
    }

    /// Merge the incremental format into every span of `start..end`, then put the cursor at
    /// `start`.
    ///
    /// Spans inside the selection are only unified when their updated formats compare equal.
    /// Each span is merged with its predecessor once updated; the right side is checked when the
    /// successor has been updated too, and for the last span against the text after the
    /// selection.
    pub fn change_selection_format(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<(), DocumentError> {
        self.check_range(start, end)?;

        self.cut_span(start);
        self.cut_span(end);
        let mut last = None;
        for id in self.select_spans(start, end) {
            if let Some(incremental) = &self.incremental_format {
                let merged = self.policy.merge(&self.spans[id].format, incremental);
                self.spans[id].format = merged;
            }
            let survivor = match self.spans.previous(id) {
                Some(prev) => {
                    if self.merge_right(prev) {
                        prev
                    } else {
                        id
                    }
                }
                None => id,
            };
            last = Some(survivor);
        }
        if let Some(id) = last {
            self.merge_right(id);
        }
        self.place_cursor(start);

        self.finish(ChangeType::SelectionFormatted, Some(start..end));
        Ok(())
    }

    /// Render the document as `(text, format)` pairs, one per span.
    ///
    /// With `display_cursor`, the cursor glyph is inserted in the pair holding the cursor, or
    /// appended to the last pair at the virtual end position. An empty document then yields a
    /// single pair made of the glyph and the current format.
    pub fn compile(&self, display_cursor: bool) -> Vec<(String, P::Format)> {
        let glyph = self.config.cursor_glyph;
        let cursor = self.cursor.filter(|_| display_cursor);
        let mut pairs = Vec::with_capacity(self.spans.len() + 1);

        let mut start = 0;
        for (_, span) in &self.spans {
            let end = start + span.len;
            let mut chunk = String::new();
            match cursor {
                Some(c) if start <= c && c < end => {
                    chunk.extend(self.text.slice(start..c).chunks());
                    chunk.push(glyph);
                    chunk.extend(self.text.slice(c..end).chunks());
                }
                _ => chunk.extend(self.text.slice(start..end).chunks()),
            }
            pairs.push((chunk, span.format.clone()));
            start = end;
        }

        if display_cursor {
            match self.cursor {
                None => pairs.push((glyph.to_string(), self.current_format.clone())),
                Some(c) if c == self.len_chars() => {
                    if let Some((chunk, _)) = pairs.last_mut() {
                        chunk.push(glyph);
                    }
                }
                Some(_) => {}
            }
        }
        pairs
    }

    /// Span owning the character at `pos`, with the offset it starts at.
    ///
    /// Returns `None` for `pos >= len`: the virtual end position belongs to no span. The lookup
    /// walks the spans from the root, so it costs one step per preceding span.
    pub fn span_at(&self, pos: usize) -> Option<SpanLocation> {
        let mut start = 0;
        for (id, span) in &self.spans {
            if pos < start + span.len {
                return Some(SpanLocation { id, start });
            }
            start += span.len;
        }
        None
    }

    /// Merge `id` with its successor, then its predecessor with it, where the policy allows.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn merge_both_sides(&mut self, id: SpanId) -> MergeSides {
        let sides = self.merge_sides(id);
        self.compact_spans();
        sides
    }

    /// Line and column of the cursor; the base itself on an empty document.
    pub fn cursor_line_column(&self, base: CoordinateBase) -> (usize, usize) {
        position::offset_to_line_column_in(self.text.slice(..), self.cursor, base)
            .unwrap_or((base.line, base.column))
    }

    /// Character offset of `(line, column)` in this document's text.
    pub fn line_column_to_offset(
        &self,
        line: isize,
        column: isize,
        options: &LineColumnOptions,
    ) -> Result<usize, DocumentError> {
        position::line_column_to_offset_in(self.text.slice(..), line, column, options)
    }

    /// Move the cursor to `(line, column)`, see [`Document::change_position`].
    pub fn move_to_line_column(
        &mut self,
        line: isize,
        column: isize,
        options: &LineColumnOptions,
    ) -> Result<(), DocumentError> {
        let offset = self.line_column_to_offset(line, column, options)?;
        self.change_position(offset)
    }

    /// Assert the structural invariants of the document.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    pub fn check_invariants(&self) {
        let len = self.len_chars();
        assert_eq!(
            self.cursor.is_none(),
            len == 0,
            "cursor {:?} inconsistent with text length {len}",
            self.cursor
        );
        assert_eq!(
            self.active_span.is_none(),
            len == 0,
            "active span {:?} inconsistent with text length {len}",
            self.active_span
        );
        if let Some(cursor) = self.cursor {
            assert!(cursor <= len, "cursor {cursor} beyond text length {len}");
        }
        if let Some(id) = self.active_span {
            assert!(self.spans.contains(id), "active span {id:?} is stale");
        }

        let mut total = 0;
        let mut previous: Option<&P::Format> = None;
        for (id, span) in &self.spans {
            assert!(span.len > 0, "span {id:?} is empty");
            if let Some(prev) = previous {
                assert!(
                    !self.policy.compare(prev, &span.format),
                    "span {id:?} could be merged with its predecessor"
                );
            }
            previous = Some(&span.format);
            total += span.len;
        }
        assert_eq!(total, len, "span lengths do not add up to the text length");
    }

    /// Ensure a span boundary exists at `pos`. Returns whether a span was split.
    fn cut_span(&mut self, pos: usize) -> bool {
        if pos >= self.len_chars() {
            return false;
        }
        let SpanLocation { id, start } = self.locate(pos);
        if start == pos {
            return false;
        }

        let span = &mut self.spans[id];
        let remainder = span.len - (pos - start);
        span.len = pos - start;
        let format = span.format.clone();
        self.spans.create(Span::new(remainder, format), Some(id));
        true
    }

    /// Spans intersecting `start..end`, in order.
    fn select_spans(&self, start: usize, end: usize) -> Vec<SpanId> {
        let first = self.locate(start).id;
        let last = if end > start + 1 {
            self.locate(end - 1).id
        } else {
            first
        };

        let mut selected = vec![first];
        let mut current = first;
        while current != last {
            match self.spans.next(current) {
                Some(next) => {
                    selected.push(next);
                    current = next;
                }
                None => panic!("span {last:?} is not reachable from {first:?}"),
            }
        }
        selected
    }

    fn merge_sides(&mut self, id: SpanId) -> MergeSides {
        let prev = self.spans.previous(id);
        let right = self.merge_right(id);
        let left = prev.is_some_and(|prev| self.merge_right(prev));
        MergeSides { left, right }
    }

    /// Absorb the successor of `left` if the policy considers their formats equal.
    fn merge_right(&mut self, left: SpanId) -> bool {
        let Some(right) = self.spans.next(left) else {
            return false;
        };
        if !self
            .policy
            .compare(&self.spans[left].format, &self.spans[right].format)
        {
            return false;
        }

        let absorbed = self.spans.unlink(right);
        self.spans[left].len += absorbed.len;
        if self.active_span == Some(right) {
            self.active_span = Some(left);
        }
        true
    }

    /// Set the cursor on a non-empty document and refresh the active span and current format.
    fn place_cursor(&mut self, pos: usize) {
        let owner = if pos == self.len_chars() {
            self.locate(pos - 1)
        } else {
            self.locate(pos)
        };
        self.cursor = Some(pos);
        self.active_span = Some(owner.id);
        let format = self.spans[owner.id].format.clone();
        self.set_current_format(format);
    }

    fn locate(&self, pos: usize) -> SpanLocation {
        match self.span_at(pos) {
            Some(location) => location,
            None => panic!(
                "no span covers offset {pos} (text length {})",
                self.len_chars()
            ),
        }
    }

    fn check_pos(&self, pos: usize) -> Result<(), DocumentError> {
        let len = self.len_chars();
        if pos > len {
            return Err(DocumentError::OutOfRange { position: pos, len });
        }
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), DocumentError> {
        let len = self.len_chars();
        if start >= end || end > len {
            return Err(DocumentError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    fn compact_spans(&mut self) {
        if let Some(compaction) = self.spans.compact_if_sparse() {
            self.active_span = self.active_span.and_then(|id| compaction.translate(id));
        }
    }

    fn finish(&mut self, change_type: ChangeType, region: Option<Range<usize>>) {
        self.compact_spans();
        if self.callbacks.is_empty() {
            return;
        }

        let change = DocumentChange {
            change_type,
            region,
            cursor: self.cursor,
            span_count: self.spans.len(),
            char_count: self.len_chars(),
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

impl<P: FormatPolicy> fmt::Display for Document<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cursor {
            Some(cursor) => writeln!(f, "cursor {cursor}")?,
            None => writeln!(f, "cursor none")?,
        }
        writeln!(f, "active span {:?}", self.active_span)?;
        writeln!(f, "current format {:?}", self.current_format)?;
        for (chunk, format) in self.compile(true) {
            writeln!(f, "{chunk:?} {format:?}")?;
        }
        Ok(())
    }
}

impl<P: FormatPolicy> fmt::Debug for Document<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text)
            .field("cursor", &self.cursor)
            .field("active_span", &self.active_span)
            .field("spans", &self.spans)
            .field("current_format", &self.current_format)
            .field("incremental_format", &self.incremental_format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ReplaceFormat;

    type TestDoc = Document<ReplaceFormat<&'static str>>;

    fn policy() -> ReplaceFormat<&'static str> {
        ReplaceFormat::new("default")
    }

    fn seeded(spans: &[(usize, &'static str)]) -> TestDoc {
        let spans: Vec<_> = spans.iter().map(|&(len, f)| Span::new(len, f)).collect();
        let len = spans.iter().map(|s| s.len).sum();
        Document::from_spans(policy(), &"x".repeat(len), &spans).unwrap()
    }

    fn ids(doc: &TestDoc) -> Vec<SpanId> {
        doc.spans().iter().map(|(id, _)| id).collect()
    }

    fn layout(doc: &TestDoc) -> Vec<(usize, &'static str)> {
        doc.spans()
            .iter()
            .map(|(_, span)| (span.len, span.format))
            .collect()
    }

    #[test]
    fn test_span_at() {
        let doc = seeded(&[(2, "1"), (4, "2"), (8, "3")]);
        let ids = ids(&doc);

        assert_eq!(
            doc.span_at(2),
            Some(SpanLocation {
                id: ids[1],
                start: 2
            })
        );
        assert_eq!(
            doc.span_at(5),
            Some(SpanLocation {
                id: ids[1],
                start: 2
            })
        );
        assert_eq!(
            doc.span_at(6),
            Some(SpanLocation {
                id: ids[2],
                start: 6
            })
        );
        assert_eq!(doc.span_at(13).map(|loc| loc.start), Some(6));
        assert_eq!(doc.span_at(14), None);
    }

    #[test]
    fn test_merge_right() {
        let mut doc = seeded(&[(2, "1"), (4, "2"), (8, "2")]);
        let ids = ids(&doc);
        assert!(!doc.merge_right(ids[0]));
        assert_eq!(layout(&doc), vec![(2, "1"), (4, "2"), (8, "2")]);

        assert!(doc.merge_right(ids[1]));
        assert_eq!(layout(&doc), vec![(2, "1"), (12, "2")]);
    }

    #[test]
    fn test_merge_right_rehomes_active_span() {
        let mut doc = seeded(&[(2, "1"), (4, "2"), (8, "2")]);
        let ids = ids(&doc);
        assert_eq!(doc.active_span(), Some(ids[2]));
        doc.merge_right(ids[1]);
        assert_eq!(doc.active_span(), Some(ids[1]));
    }

    #[test]
    fn test_merge_both_sides() {
        let mut doc = seeded(&[(2, "7"), (4, "7"), (8, "7")]);
        let ids = ids(&doc);
        let sides = doc.merge_both_sides(ids[1]);
        assert_eq!(layout(&doc), vec![(14, "7")]);
        assert_eq!(
            sides,
            MergeSides {
                left: true,
                right: true
            }
        );
    }

    #[test]
    fn test_cut_span() {
        let mut doc = Document::new(policy());
        doc.set_current_format("X");
        doc.edit(&"a".repeat(10));

        assert!(doc.cut_span(2));
        assert!(doc.cut_span(8));
        assert!(!doc.cut_span(8));
        assert!(!doc.cut_span(10));
        assert!(!doc.cut_span(0));
        assert_eq!(layout(&doc), vec![(2, "X"), (6, "X"), (2, "X")]);
    }

    #[test]
    fn test_select_spans() {
        let doc = seeded(&[(2, "7"), (4, "7"), (8, "7")]);
        let all = ids(&doc);
        assert_eq!(doc.select_spans(1, 10), all);
        assert_eq!(doc.select_spans(2, 7), all[1..].to_vec());
        assert_eq!(doc.select_spans(2, 3), vec![all[1]]);
        assert_eq!(doc.select_spans(13, 14), vec![all[2]]);
    }

    #[test]
    fn test_incremental_format_updates_middle_span() {
        let mut doc = seeded(&[(2, "7"), (4, "7"), (8, "7")]);
        doc.set_incremental_format(Some("new"));
        doc.change_selection_format(2, 6).unwrap();
        assert_eq!(layout(&doc), vec![(2, "7"), (4, "new"), (8, "7")]);
    }

    #[test]
    fn test_reformat_absorbing_span_still_merges_after_selection() {
        // "aa" plain then "zzzz" bold; bolding 0..4 must leave a single bold span.
        let mut doc = seeded(&[(2, "plain"), (4, "bold")]);
        doc.set_incremental_format(Some("bold"));
        doc.change_selection_format(0, 4).unwrap();
        assert_eq!(layout(&doc), vec![(6, "bold")]);
        doc.check_invariants();
    }

    #[test]
    fn test_delete_first_span_rehomes_active_to_successor() {
        let mut doc = seeded(&[(3, "b")]);
        doc.change_position(0).unwrap();
        doc.set_current_format("a");
        doc.edit("x");
        assert_eq!(layout(&doc), vec![(1, "a"), (3, "b")]);

        doc.delete();
        assert_eq!(doc.cursor(), Some(0));
        assert_eq!(layout(&doc), vec![(3, "b")]);
        assert_eq!(doc.active_span(), doc.spans().root());
        doc.check_invariants();
    }

    #[test]
    fn test_edit_at_span_start_goes_before_span() {
        let mut doc = seeded(&[(2, "a"), (3, "b")]);
        doc.change_position(2).unwrap();
        doc.set_current_format("c");
        doc.edit("!");
        assert_eq!(layout(&doc), vec![(2, "a"), (1, "c"), (3, "b")]);
        assert_eq!(doc.cursor(), Some(3));
    }

    #[test]
    fn test_empty_document_position_zero() {
        let mut doc = Document::new(policy());
        doc.change_position(0).unwrap();
        assert_eq!(doc.cursor(), None);
        assert_eq!(
            doc.change_position(1),
            Err(DocumentError::OutOfRange {
                position: 1,
                len: 0
            })
        );
        doc.edit("a");
        assert_eq!(doc.text(), "a");
    }

    #[test]
    fn test_new_document_reformats_to_default() {
        let mut doc = Document::new(policy());
        assert_eq!(doc.incremental_format(), Some(&"default"));
        doc.set_current_format("1");
        doc.edit("abcdef");

        doc.change_selection_format(2, 4).unwrap();
        assert_eq!(layout(&doc), vec![(2, "1"), (2, "default"), (2, "1")]);
        doc.check_invariants();
    }

    #[test]
    fn test_seeded_document_keeps_store_config() {
        let config = DocumentConfig {
            store: StoreConfig {
                compaction_ratio: 0,
            },
            ..DocumentConfig::default()
        };
        let spans = [Span::new(2, "a"), Span::new(2, "b")];
        let doc = Document::from_spans_with_config(policy(), config, "abcd", &spans).unwrap();
        assert_eq!(doc.spans().config(), config.store);
        assert_eq!(doc.incremental_format(), Some(&"default"));
    }

    #[test]
    fn test_display_dump() {
        let mut doc = Document::new(policy());
        doc.edit("ab");
        let dump = doc.to_string();
        assert!(dump.starts_with("cursor 2\n"));
        assert!(dump.contains("current format \"default\""));
        assert!(dump.contains("\"ab\u{2588}\" \"default\""));
    }
}
