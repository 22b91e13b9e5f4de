//! Line/column mapping
//!
//! Stateless conversions between linear character offsets and `(line, column)` coordinates.
//!
//! Lines follow the Rope line model: LF, CRLF, CR, VT, FF, NEL, LS and PS all end a line, with
//! CRLF counting as a single terminator. A text ending with a terminator has a trailing empty
//! line, so the position right after the last character always has coordinates. The ASCII
//! separators `\x1c`, `\x1d` and `\x1e` are ordinary characters, not terminators.
//!
//! ```rust
//! use rich_text_core::{CoordinateBase, LineColumnOptions, line_column_to_offset, offset_to_line_column};
//!
//! let text = "This\r\nis\n\nthe\nsource\ncode.";
//! let offset = line_column_to_offset(text, 2, 1, &LineColumnOptions::default()).unwrap();
//! assert_eq!(&text[offset..offset + 1], "s");
//! assert_eq!(offset_to_line_column(text, Some(offset), CoordinateBase::default()), Ok((2, 1)));
//! ```

use crate::error::DocumentError;
use ropey::{Rope, RopeSlice};

/// Numbering origin of lines and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateBase {
    /// Number given to the first line.
    pub line: usize,
    /// Number given to the first column.
    pub column: usize,
}

impl CoordinateBase {
    /// Zero-based lines and columns.
    pub const ZERO: Self = Self { line: 0, column: 0 };

    /// Create a base from explicit origins.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for CoordinateBase {
    /// One-based lines, zero-based columns.
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// How [`line_column_to_offset`] interprets its coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineColumnOptions {
    /// Numbering origin of the coordinates.
    pub base: CoordinateBase,
    /// Count line terminators as columns of the line they end.
    pub keepends: bool,
    /// Reject coordinates outside the text instead of resolving them.
    pub strict: bool,
    /// When resolving, keep the column on the requested line instead of spilling over.
    pub line_is_important: bool,
}

impl LineColumnOptions {
    /// Set the numbering origin.
    pub fn with_base(mut self, base: CoordinateBase) -> Self {
        self.base = base;
        self
    }

    /// Set whether terminators count as columns.
    pub fn keepends(mut self, keepends: bool) -> Self {
        self.keepends = keepends;
        self
    }

    /// Set strict validation.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set whether out-of-range columns stay on their line.
    pub fn line_is_important(mut self, line_is_important: bool) -> Self {
        self.line_is_important = line_is_important;
        self
    }
}

/// Convert a character offset of `text` into `(line, column)`.
///
/// `offset` may equal the character count of `text` (the position after the last character).
/// `None` stands for the position before any text and maps to the base itself.
pub fn offset_to_line_column(
    text: &str,
    offset: Option<usize>,
    base: CoordinateBase,
) -> Result<(usize, usize), DocumentError> {
    let rope = Rope::from_str(text);
    offset_to_line_column_in(rope.slice(..), offset, base)
}

/// [`offset_to_line_column`] over a rope slice.
pub fn offset_to_line_column_in(
    text: RopeSlice<'_>,
    offset: Option<usize>,
    base: CoordinateBase,
) -> Result<(usize, usize), DocumentError> {
    let Some(offset) = offset else {
        return Ok((base.line, base.column));
    };
    let len = text.len_chars();
    if offset > len {
        return Err(DocumentError::OutOfRange {
            position: offset,
            len,
        });
    }

    let last = text.len_lines() - 1;
    let mut line_start = 0;
    for line_nb in 0..last {
        let line_end = line_start + text.line(line_nb).len_chars();
        if offset < line_end {
            return Ok((line_nb + base.line, offset - line_start + base.column));
        }
        line_start = line_end;
    }
    Ok((last + base.line, offset - line_start + base.column))
}

/// Convert `(line, column)` into a character offset of `text`.
///
/// In strict mode the coordinates must name an existing position, otherwise
/// [`DocumentError::LineColumnOutOfRange`] is returned.
///
/// Without `strict`, the line is clamped to the text. An out-of-range column is clamped to its
/// line when `line_is_important` is set; otherwise it spills over line boundaries, each
/// terminator counting as one column, until it fits or the first/last line is reached. This lets
/// cursor navigation compute `column - 1` or `column + 1` without checking bounds first.
pub fn line_column_to_offset(
    text: &str,
    line: isize,
    column: isize,
    options: &LineColumnOptions,
) -> Result<usize, DocumentError> {
    let rope = Rope::from_str(text);
    line_column_to_offset_in(rope.slice(..), line, column, options)
}

/// [`line_column_to_offset`] over a rope slice.
pub fn line_column_to_offset_in(
    text: RopeSlice<'_>,
    line: isize,
    column: isize,
    options: &LineColumnOptions,
) -> Result<usize, DocumentError> {
    let full_lengths: Vec<usize> = (0..text.len_lines())
        .map(|i| text.line(i).len_chars())
        .collect();
    let lengths: Vec<isize> = (0..text.len_lines())
        .map(|i| {
            let len = if options.keepends {
                full_lengths[i]
            } else {
                full_lengths[i] - terminator_len(text.line(i))
            };
            len as isize
        })
        .collect();
    let last = lengths.len() as isize - 1;

    let mut line_nb = line.saturating_sub_unsigned(options.base.line);
    let mut col = column.saturating_sub_unsigned(options.base.column);

    if options.strict {
        if !(0..=last).contains(&line_nb) || !(0..=lengths[line_nb as usize]).contains(&col) {
            return Err(DocumentError::LineColumnOutOfRange { line, column });
        }
    } else {
        line_nb = line_nb.clamp(0, last);
        if options.line_is_important {
            col = col.clamp(0, lengths[line_nb as usize]);
        } else {
            while col < 0 && line_nb > 0 {
                line_nb -= 1;
                col = col.saturating_add(lengths[line_nb as usize] + 1);
            }
            col = col.max(0);
            while col > lengths[line_nb as usize] {
                if line_nb < last {
                    col = col.saturating_sub(lengths[line_nb as usize] + 1);
                    line_nb += 1;
                } else {
                    col = lengths[line_nb as usize];
                }
            }
        }
    }

    let line_start: usize = full_lengths[..line_nb as usize].iter().sum();
    Ok(line_start + col as usize)
}

/// Number of characters of the terminator ending `line` (0 for the last line).
fn terminator_len(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => 2,
        c if is_line_break(c) => 1,
        _ => 0,
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}
