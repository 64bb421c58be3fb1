//! Editor change descriptors and their translation into tree-sitter edits.
//!
//! Positions follow the editor-protocol convention: zero-based lines and
//! `character` counted in UTF-16 code units. Tree-sitter wants byte offsets and
//! byte columns, so every ranged change is resolved against the current text.

use serde::{Deserialize, Serialize};
use tree_sitter::{InputEdit, Point};

use crate::core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// One content change: ranged replacement, or full replacement when `range` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub text: String,
}

impl ContentChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn ranged(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// A ranged change applied to the text, plus the edit to replay on the old tree.
#[derive(Debug)]
pub(crate) struct AppliedChange {
    pub edit: InputEdit,
    /// Set when the range did not fit the text and had to be clamped.
    pub malformed: Option<Error>,
}

/// Apply a ranged replacement to `text` in place.
///
/// Characters past the end of a line clamp to the line end. A line past the
/// end of the document, or a reversed range, is malformed: offsets are clamped
/// (and reordered) so the text is still updated, and the problem is reported.
pub(crate) fn apply_ranged(text: &mut String, range: Range, new_text: &str) -> AppliedChange {
    let mut malformed = None;

    let (mut start, start_fits) = offset_at(text, range.start);
    let (mut end, end_fits) = offset_at(text, range.end);
    if !start_fits || !end_fits {
        malformed = Some(Error::malformed_edit(format!(
            "range {}:{}-{}:{} exceeds document of {} lines",
            range.start.line,
            range.start.character,
            range.end.line,
            range.end.character,
            line_count(text)
        )));
    }
    if start > end {
        if malformed.is_none() {
            malformed = Some(Error::malformed_edit("range start is after range end"));
        }
        std::mem::swap(&mut start, &mut end);
    }

    let start_position = point_at(text, start);
    let old_end_position = point_at(text, end);
    text.replace_range(start..end, new_text);

    AppliedChange {
        edit: InputEdit {
            start_byte: start,
            old_end_byte: end,
            new_end_byte: start + new_text.len(),
            start_position,
            old_end_position,
            new_end_position: advance(start_position, new_text),
        },
        malformed,
    }
}

fn line_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count() + 1
}

/// Byte offset of `position`, and whether its line exists.
fn offset_at(text: &str, position: Position) -> (usize, bool) {
    let Some(line_start) = line_start(text, position.line as usize) else {
        return (text.len(), false);
    };

    let rest = &text[line_start..];
    let line = rest.split('\n').next().unwrap_or_default();
    let line = line.strip_suffix('\r').unwrap_or(line);

    (line_start + utf16_to_byte(line, position.character), true)
}

fn line_start(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    text.match_indices('\n').nth(line - 1).map(|(idx, _)| idx + 1)
}

fn utf16_to_byte(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= character {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}

/// Tree-sitter point (row, byte column) of a byte offset.
fn point_at(text: &str, offset: usize) -> Point {
    let before = &text[..offset];
    let row = before.bytes().filter(|&b| b == b'\n').count();
    let column = before.rfind('\n').map_or(offset, |idx| offset - idx - 1);
    Point::new(row, column)
}

/// Point reached after inserting `inserted` at `start`.
fn advance(start: Point, inserted: &str) -> Point {
    match inserted.rfind('\n') {
        Some(last) => Point::new(
            start.row + inserted.bytes().filter(|&b| b == b'\n').count(),
            inserted.len() - last - 1,
        ),
        None => Point::new(start.row, start.column + inserted.len()),
    }
}
