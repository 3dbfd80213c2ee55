//! Immutable document snapshots and version-anchored positions.
//!
//! A [`TextBuffer`] owns the current [`Snapshot`] together with the log of
//! edits that produced it. Every applied [`Edit`] yields a new snapshot with
//! the next [`VersionId`]; older snapshots stay valid for whoever still holds
//! them.
//!
//! Offsets are only meaningful relative to the version that produced them. A
//! [`PositionRef`] records that version explicitly, and moving it forward to a
//! newer version is a fallible operation ([`TextBuffer::translate`]): if the
//! text the position pointed into has been deleted, translation fails with
//! [`TranslateError::Deleted`].
//!
//! ## Lines
//!
//! Lines are split on `\n`. A line's range excludes its terminator, and a
//! trailing `\r` before the `\n` is treated as part of the terminator. A
//! document always has at least one line, possibly empty.
//!
//! ```
//! use texlens_syntax::{Affinity, Edit, TextBuffer, TextRange, TextSize};
//!
//! let mut buffer = TextBuffer::new("(a)\n(b)").unwrap();
//! let caret = buffer.current().position(TextSize::from(4), Affinity::After);
//!
//! buffer
//!     .apply(Edit::insert(TextSize::from(0), "xx"))
//!     .unwrap();
//!
//! let moved = buffer.translate(caret, buffer.current().version()).unwrap();
//! assert_eq!(moved.offset, TextSize::from(6));
//! assert_eq!(buffer.current().line(1).unwrap().text, "(b)");
//! # let _ = TextRange::empty(TextSize::from(0));
//! ```

use std::fmt;
use std::sync::Arc;

use line_index::{LineCol, LineIndex};
use serde::{Deserialize, Serialize};

use crate::{TextRange, TextSize};

/// Identifies one immutable version of a buffer's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(pub u64);

impl VersionId {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Which neighbouring character a position sticks to when text is inserted
/// exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Affinity {
    /// Stay attached to the character before; insertions land after the position.
    Before,
    /// Stay attached to the character after; insertions push the position right.
    #[default]
    After,
}

/// An offset tied to the document version it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionRef {
    pub version: VersionId,
    pub offset: TextSize,
    pub affinity: Affinity,
}

impl PositionRef {
    pub fn new(version: VersionId, offset: TextSize, affinity: Affinity) -> Self {
        Self {
            version,
            offset,
            affinity,
        }
    }
}

/// Errors raised by buffer operations a host can get wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("range {range:?} lies outside the document (length {len:?})")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("offset {0:?} is not on a character boundary")]
    NotCharBoundary(TextSize),
    #[error("document exceeds the 4 GiB offset limit")]
    TooLarge,
}

/// Why a [`PositionRef`] could not be carried to another version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("the referenced text was deleted")]
    Deleted,
    #[error("version {0} is unknown to this buffer")]
    UnknownVersion(VersionId),
    #[error("cannot translate from {from} back to {to}")]
    Backwards { from: VersionId, to: VersionId },
    #[error("offset {0:?} lies outside the document")]
    OutOfBounds(TextSize),
}

/// A single line of a snapshot, without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub range: TextRange,
    pub text: &'a str,
}

/// The full text of one document version.
pub struct Snapshot {
    version: VersionId,
    text: Arc<str>,
    lines: Vec<TextRange>,
    line_index: LineIndex,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("len", &self.text.len())
            .field("lines", &self.lines.len())
            .finish()
    }
}

impl Snapshot {
    fn new(version: VersionId, text: Arc<str>) -> Result<Self, TextError> {
        if u32::try_from(text.len()).is_err() {
            return Err(TextError::TooLarge);
        }
        let lines = split_lines(&text);
        let line_index = LineIndex::new(&text);
        Ok(Self {
            version,
            text,
            lines,
            line_index,
        })
    }

    pub fn version(&self) -> VersionId {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> TextSize {
        crate::size(self.text.len())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The whole document as a range.
    pub fn full_range(&self) -> TextRange {
        TextRange::up_to(self.len())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, number: usize) -> Option<Line<'_>> {
        let range = *self.lines.get(number)?;
        Some(Line {
            number,
            range,
            text: &self.text[usize::from(range.start())..usize::from(range.end())],
        })
    }

    /// Number of the line containing `offset`. A terminator belongs to the
    /// line it ends; offsets past the end map to the last line.
    ///
    /// Any byte offset is accepted, including one inside a multi-byte
    /// character.
    pub fn line_of(&self, offset: TextSize) -> usize {
        self.lines
            .partition_point(|range| range.start() <= offset)
            .saturating_sub(1)
    }

    /// Line and byte column of `offset`, or `None` past the end or inside a
    /// character.
    pub fn line_col(&self, offset: TextSize) -> Option<LineCol> {
        if offset > self.len() || !self.text.is_char_boundary(usize::from(offset)) {
            return None;
        }
        Some(self.line_index.line_col(offset))
    }

    /// Offset of a 0-based line and byte column. The column may address the
    /// end of the line but not its terminator, nor the inside of a character.
    pub fn offset(&self, line: u32, col: u32) -> Option<TextSize> {
        let range = self.lines.get(line as usize)?;
        if TextSize::from(col) > range.len() {
            return None;
        }
        let offset = self.line_index.offset(LineCol { line, col })?;
        self.text
            .is_char_boundary(usize::from(offset))
            .then_some(offset)
    }

    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text
            .get(usize::from(range.start())..usize::from(range.end()))
    }

    /// A position in this version.
    pub fn position(&self, offset: TextSize, affinity: Affinity) -> PositionRef {
        PositionRef::new(self.version, offset, affinity)
    }
}

fn split_lines(text: &str) -> Vec<TextRange> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices('\n') {
        let end = if idx > start && text.as_bytes()[idx - 1] == b'\r' {
            idx - 1
        } else {
            idx
        };
        lines.push(TextRange::new(crate::size(start), crate::size(end)));
        start = idx + 1;
    }
    lines.push(TextRange::new(crate::size(start), crate::size(text.len())));
    lines
}

/// Replace `range` of the current version with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: TextRange,
    pub insert: String,
}

impl Edit {
    pub fn new(range: TextRange, insert: impl Into<String>) -> Self {
        Self {
            range,
            insert: insert.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }
}

/// What one version step did to the text, kept for position translation.
#[derive(Debug, Clone, Copy)]
struct Change {
    /// Length of the version the change was applied to.
    len_before: TextSize,
    replaced: TextRange,
    inserted: TextSize,
}

impl Change {
    fn map(&self, offset: TextSize, affinity: Affinity) -> Result<TextSize, TranslateError> {
        if offset > self.len_before {
            return Err(TranslateError::OutOfBounds(offset));
        }
        let start = self.replaced.start();
        let end = self.replaced.end();
        let past_insert = |base: TextSize| {
            base.checked_add(self.inserted)
                .ok_or(TranslateError::OutOfBounds(offset))
        };
        if offset < start {
            return Ok(offset);
        }
        if offset > end {
            return past_insert(start + (offset - end));
        }
        if self.replaced.is_empty() {
            return match affinity {
                Affinity::Before => Ok(offset),
                Affinity::After => past_insert(offset),
            };
        }
        if offset == start {
            Ok(start)
        } else if offset == end {
            past_insert(start)
        } else {
            Err(TranslateError::Deleted)
        }
    }
}

/// A mutable document: the current snapshot plus the history needed to
/// translate positions taken from older versions.
#[derive(Debug)]
pub struct TextBuffer {
    current: Arc<Snapshot>,
    base: VersionId,
    changes: Vec<Change>,
}

impl TextBuffer {
    pub fn new(text: impl Into<Arc<str>>) -> Result<Self, TextError> {
        let base = VersionId(0);
        Ok(Self {
            current: Arc::new(Snapshot::new(base, text.into())?),
            base,
            changes: Vec::new(),
        })
    }

    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    pub fn version(&self) -> VersionId {
        self.current.version
    }

    /// Applies `edit` to the current version and returns the new snapshot.
    pub fn apply(&mut self, edit: Edit) -> Result<Arc<Snapshot>, TextError> {
        let text = self.current.text();
        let range = edit.range;
        if range.end() > self.current.len() {
            return Err(TextError::OutOfBounds {
                range,
                len: self.current.len(),
            });
        }
        for boundary in [range.start(), range.end()] {
            if !text.is_char_boundary(usize::from(boundary)) {
                return Err(TextError::NotCharBoundary(boundary));
            }
        }

        let mut next = String::with_capacity(text.len() - usize::from(range.len()) + edit.insert.len());
        next.push_str(&text[..usize::from(range.start())]);
        next.push_str(&edit.insert);
        next.push_str(&text[usize::from(range.end())..]);

        let inserted = TextSize::try_from(edit.insert.len()).map_err(|_| TextError::TooLarge)?;
        let snapshot = Snapshot::new(self.current.version.next(), next.into())?;
        log::debug!(
            "applied edit {:?} (+{:?}) producing {}",
            range,
            inserted,
            snapshot.version
        );

        self.changes.push(Change {
            len_before: self.current.len(),
            replaced: range,
            inserted,
        });
        self.current = Arc::new(snapshot);
        Ok(self.current())
    }

    /// Replaces the whole document, as a full-sync editor change does.
    pub fn replace_all(&mut self, text: impl Into<String>) -> Result<Arc<Snapshot>, TextError> {
        let range = self.current.full_range();
        self.apply(Edit::new(range, text))
    }

    /// Carries `position` forward to `target`.
    pub fn translate(
        &self,
        position: PositionRef,
        target: VersionId,
    ) -> Result<PositionRef, TranslateError> {
        let current = self.current.version;
        for version in [position.version, target] {
            if version < self.base || version > current {
                return Err(TranslateError::UnknownVersion(version));
            }
        }
        if position.version > target {
            return Err(TranslateError::Backwards {
                from: position.version,
                to: target,
            });
        }

        let from = (position.version.0 - self.base.0) as usize;
        let to = (target.0 - self.base.0) as usize;
        let mut offset = position.offset;
        for change in &self.changes[from..to] {
            offset = change.map(offset, position.affinity)?;
        }

        if target == current && offset > self.current.len() {
            return Err(TranslateError::OutOfBounds(offset));
        }
        Ok(PositionRef::new(target, offset, position.affinity))
    }

    /// Oldest version positions can still be translated from.
    pub fn oldest_version(&self) -> VersionId {
        self.base
    }

    /// Drops the history older than `version`. Positions taken from those
    /// versions become [`TranslateError::UnknownVersion`].
    pub fn forget_before(&mut self, version: VersionId) {
        let version = version.min(self.current.version);
        if version <= self.base {
            return;
        }
        let count = (version.0 - self.base.0) as usize;
        self.changes.drain(..count);
        self.base = version;
        log::debug!("forgot {} change(s), history now starts at {}", count, version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(n: u32) -> TextSize {
        TextSize::from(n)
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(at(start), at(end))
    }

    #[test]
    fn test_lines_exclude_terminators() {
        let buffer = TextBuffer::new("ab\r\ncd\n\nef").unwrap();
        let snapshot = buffer.current();
        assert_eq!(snapshot.line_count(), 4);
        assert_eq!(snapshot.line(0).unwrap().text, "ab");
        assert_eq!(snapshot.line(1).unwrap().range, range(4, 6));
        assert_eq!(snapshot.line(2).unwrap().text, "");
        assert_eq!(snapshot.line(3).unwrap().text, "ef");
        assert!(snapshot.line(4).is_none());
    }

    #[test]
    fn test_empty_document_has_one_line() {
        let buffer = TextBuffer::new("").unwrap();
        let snapshot = buffer.current();
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.line(0).unwrap().range, range(0, 0));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_line_of_and_offset() {
        let buffer = TextBuffer::new("one\ntwo\nthree").unwrap();
        let snapshot = buffer.current();
        assert_eq!(snapshot.line_of(at(0)), 0);
        assert_eq!(snapshot.line_of(at(3)), 0); // the newline itself
        assert_eq!(snapshot.line_of(at(4)), 1);
        assert_eq!(snapshot.line_of(at(100)), 2);
        assert_eq!(snapshot.offset(2, 5), Some(at(13)));
        assert_eq!(snapshot.offset(1, 4), None);
        assert_eq!(snapshot.offset(3, 0), None);
        let lc = snapshot.line_col(at(9)).unwrap();
        assert_eq!((lc.line, lc.col), (2, 1));
    }

    #[test]
    fn test_line_lookups_inside_characters() {
        let buffer = TextBuffer::new("é(ü)\n日本").unwrap();
        let snapshot = buffer.current();
        // é 0..2, ( 2, ü 3..5, ) 5, newline 6, 日 7..10, 本 10..13
        assert_eq!(snapshot.line_of(at(1)), 0);
        assert_eq!(snapshot.line_of(at(4)), 0);
        assert_eq!(snapshot.line_of(at(6)), 0);
        assert_eq!(snapshot.line_of(at(7)), 1);
        assert_eq!(snapshot.line_of(at(8)), 1);
        assert!(snapshot.line_col(at(1)).is_none());
        assert!(snapshot.line_col(at(8)).is_none());
        let lc = snapshot.line_col(at(10)).unwrap();
        assert_eq!((lc.line, lc.col), (1, 3));
        assert_eq!(snapshot.offset(0, 1), None);
        assert_eq!(snapshot.offset(1, 3), Some(at(10)));
    }

    #[test]
    fn test_apply_produces_new_version() {
        let mut buffer = TextBuffer::new("hello world").unwrap();
        let old = buffer.current();
        let new = buffer.apply(Edit::new(range(0, 5), "goodbye")).unwrap();
        assert_eq!(old.text(), "hello world");
        assert_eq!(new.text(), "goodbye world");
        assert_eq!(old.version(), VersionId(0));
        assert_eq!(new.version(), VersionId(1));
    }

    #[test]
    fn test_apply_rejects_bad_edits() {
        let mut buffer = TextBuffer::new("héllo").unwrap();
        assert_eq!(
            buffer.apply(Edit::delete(range(0, 10))).unwrap_err(),
            TextError::OutOfBounds {
                range: range(0, 10),
                len: at(6)
            }
        );
        assert_eq!(
            buffer.apply(Edit::delete(range(0, 2))).unwrap_err(),
            TextError::NotCharBoundary(at(2))
        );
        assert_eq!(buffer.version(), VersionId(0));
    }

    #[test]
    fn test_translate_shifts_past_edits() {
        let mut buffer = TextBuffer::new("abcdef").unwrap();
        let before = buffer.current().position(at(1), Affinity::After);
        let after = buffer.current().position(at(5), Affinity::After);
        buffer.apply(Edit::new(range(2, 4), "XYZW")).unwrap();
        let target = buffer.version();
        assert_eq!(buffer.translate(before, target).unwrap().offset, at(1));
        assert_eq!(buffer.translate(after, target).unwrap().offset, at(7));
    }

    #[test]
    fn test_translate_insertion_respects_affinity() {
        let mut buffer = TextBuffer::new("ab").unwrap();
        let sticky_before = buffer.current().position(at(1), Affinity::Before);
        let sticky_after = buffer.current().position(at(1), Affinity::After);
        buffer.apply(Edit::insert(at(1), "---")).unwrap();
        let target = buffer.version();
        assert_eq!(buffer.translate(sticky_before, target).unwrap().offset, at(1));
        assert_eq!(buffer.translate(sticky_after, target).unwrap().offset, at(4));
    }

    #[test]
    fn test_translate_fails_inside_deleted_text() {
        let mut buffer = TextBuffer::new("abcdef").unwrap();
        let inside = buffer.current().position(at(3), Affinity::After);
        let edge = buffer.current().position(at(4), Affinity::After);
        buffer.apply(Edit::delete(range(2, 4))).unwrap();
        let target = buffer.version();
        assert_eq!(buffer.translate(inside, target), Err(TranslateError::Deleted));
        assert_eq!(buffer.translate(edge, target).unwrap().offset, at(2));
    }

    #[test]
    fn test_translate_across_several_versions() {
        let mut buffer = TextBuffer::new("(x)").unwrap();
        let caret = buffer.current().position(at(2), Affinity::After);
        buffer.apply(Edit::insert(at(0), "ab")).unwrap();
        buffer.apply(Edit::insert(at(5), "!")).unwrap();
        buffer.apply(Edit::delete(range(0, 1))).unwrap();
        let moved = buffer.translate(caret, buffer.version()).unwrap();
        assert_eq!(moved.version, VersionId(3));
        assert_eq!(moved.offset, at(3));
        assert_eq!(buffer.current().text(), "b(x)!");
    }

    #[test]
    fn test_translate_rejects_unknown_or_older_versions() {
        let mut buffer = TextBuffer::new("abc").unwrap();
        buffer.apply(Edit::insert(at(0), "z")).unwrap();
        let newer = buffer.current().position(at(1), Affinity::After);
        assert_eq!(
            buffer.translate(newer, VersionId(0)),
            Err(TranslateError::Backwards {
                from: VersionId(1),
                to: VersionId(0)
            })
        );
        let stale = PositionRef::new(VersionId(9), at(0), Affinity::After);
        assert_eq!(
            buffer.translate(stale, VersionId(1)),
            Err(TranslateError::UnknownVersion(VersionId(9)))
        );
    }

    #[test]
    fn test_replace_all_keeps_document_edges() {
        let mut buffer = TextBuffer::new("old text").unwrap();
        let start = buffer.current().position(at(0), Affinity::After);
        let middle = buffer.current().position(at(4), Affinity::After);
        let end = buffer.current().position(at(8), Affinity::After);
        buffer.replace_all("\\section{Changed}").unwrap();
        let target = buffer.version();
        assert_eq!(buffer.translate(start, target).unwrap().offset, at(0));
        assert_eq!(buffer.translate(middle, target), Err(TranslateError::Deleted));
        assert_eq!(buffer.translate(end, target).unwrap().offset, at(17));
    }

    #[test]
    fn test_translate_rejects_offsets_past_their_version() {
        let mut buffer = TextBuffer::new("abc").unwrap();
        let huge = PositionRef::new(VersionId(0), TextSize::from(u32::MAX - 1), Affinity::After);
        let past = buffer.current().position(at(4), Affinity::After);
        buffer.apply(Edit::insert(at(0), "xyz")).unwrap();
        let target = buffer.version();
        assert_eq!(
            buffer.translate(huge, target),
            Err(TranslateError::OutOfBounds(TextSize::from(u32::MAX - 1)))
        );
        assert_eq!(buffer.translate(past, target), Err(TranslateError::OutOfBounds(at(4))));
    }

    #[test]
    fn test_forget_before_trims_history() {
        let mut buffer = TextBuffer::new("(x)").unwrap();
        let old = buffer.current().position(at(0), Affinity::After);
        buffer.apply(Edit::insert(at(0), "a")).unwrap();
        let kept = buffer.current().position(at(1), Affinity::After);
        buffer.apply(Edit::insert(at(0), "b")).unwrap();

        buffer.forget_before(VersionId(1));
        assert_eq!(buffer.oldest_version(), VersionId(1));
        let target = buffer.version();
        assert_eq!(
            buffer.translate(old, target),
            Err(TranslateError::UnknownVersion(VersionId(0)))
        );
        assert_eq!(buffer.translate(kept, target).unwrap().offset, at(2));

        // Forgetting past the current version stops at it.
        buffer.forget_before(VersionId(40));
        assert_eq!(buffer.oldest_version(), VersionId(2));
        let here = buffer.current().position(at(3), Affinity::After);
        assert_eq!(buffer.translate(here, target).unwrap().offset, at(3));
    }
}
