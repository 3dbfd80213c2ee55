//! Snippet catalogue offered by a host's completion popup.
//!
//! The list is fixed and unranked: every request returns the whole
//! catalogue together with the span of the word being typed, and the host
//! filters against it.

use crate::{Snapshot, TextRange, TextSize};

/// Title of the completion tab.
pub const TITLE: &str = "TeX";

/// Snippets in ordinal order.
pub const SNIPPETS: &[&str] = &[
    r"\begin{}",
    "\\begin{}\n\\end{}",
    r"\bibitem{}",
    r"\chapter{}",
    r"\cite{}",
    r"\end{}",
    r"\frac{}{}",
    r"\label{}",
    r"\part{}",
    r"\ref{}",
    r"\section{}",
    r"\subsection{}",
    r"\subsubsection{}",
    r"\{\}",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: &'static str,
    pub insert_text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSet {
    pub title: &'static str,
    /// Text the chosen item replaces.
    pub applicable_to: TextRange,
    pub items: Vec<CompletionItem>,
}

/// The completion set for a caret, or `None` if the caret lies outside the
/// document.
pub fn completions(snapshot: &Snapshot, caret: TextSize) -> Option<CompletionSet> {
    let applicable_to = word_extent(snapshot, caret)?;
    Some(CompletionSet {
        title: TITLE,
        applicable_to,
        items: SNIPPETS
            .iter()
            .map(|&snippet| CompletionItem {
                label: snippet,
                insert_text: snippet,
            })
            .collect(),
    })
}

/// Extent of the word around `caret` on its line: an ASCII-letter run,
/// extended by one leading backslash. Empty at the caret when there is no
/// such word.
pub fn word_extent(snapshot: &Snapshot, caret: TextSize) -> Option<TextRange> {
    if caret > snapshot.len() {
        return None;
    }
    let line = snapshot.line(snapshot.line_of(caret))?;
    let bytes = line.text.as_bytes();
    let col = usize::from(caret.checked_sub(line.range.start())?).min(bytes.len());

    let mut start = col;
    while start > 0 && bytes[start - 1].is_ascii_alphabetic() {
        start -= 1;
    }
    if start > 0 && bytes[start - 1] == b'\\' {
        start -= 1;
    }
    let mut end = col;
    if start < col {
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }
    }

    let base = line.range.start();
    Some(TextRange::new(
        base + crate::size(start),
        base + crate::size(end),
    ))
}
