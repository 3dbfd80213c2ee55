//! Nesting-aware searches for the partner of a delimiter.
//!
//! Both scans walk the document line by line, looking only for the two
//! literals of one [`DelimiterPair`]. A depth counter tracks same-pair
//! delimiters opened (forward) or closed (backward) since the starting
//! token; the partner is the first opposite token met at depth 0. Deeper
//! pairs are skipped two at a time, so the two directions agree: whatever
//! [`find_close`] returns for an open token, [`find_open`] maps back to it.
//!
//! Scans stop in failure at the document edge or after `max_lines` lines
//! past the starting one. `None` and `Some(0)` leave the scan unbounded.

use texlens_syntax::{Snapshot, TextRange, size};

use crate::pairs::DelimiterPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open,
    Close,
}

/// Occurrences of either literal of `pair` in `line`, leftmost first.
fn occurrences(line: &str, pair: DelimiterPair) -> Vec<(usize, Token)> {
    let bytes = line.as_bytes();
    let mut found: Vec<(usize, Token)> = line
        .match_indices(pair.open())
        .map(|(idx, _)| (idx, Token::Open))
        .chain(
            line.match_indices(pair.close())
                .map(|(idx, _)| (idx, Token::Close)),
        )
        .filter(|&(idx, _)| pair.accepts(bytes, idx))
        .collect();
    found.sort_unstable_by_key(|&(idx, _)| idx);
    found
}

fn bound(max_lines: Option<u32>) -> Option<usize> {
    max_lines.filter(|&n| n > 0).map(|n| n as usize)
}

/// Finds the close token matching the open token at `open`.
pub fn find_close(
    snapshot: &Snapshot,
    pair: DelimiterPair,
    open: TextRange,
    max_lines: Option<u32>,
) -> Option<TextRange> {
    let first = snapshot.line_of(open.start());
    let mut last = snapshot.line_count().saturating_sub(1);
    if let Some(limit) = bound(max_lines) {
        last = last.min(first.saturating_add(limit));
    }

    let close_len = size(pair.close().len());
    let mut depth = 0usize;
    for number in first..=last {
        let line = snapshot.line(number)?;
        let from = if number == first {
            usize::from(open.end().checked_sub(line.range.start())?)
        } else {
            0
        };
        for (idx, token) in occurrences(line.text, pair) {
            if idx < from {
                continue;
            }
            match token {
                Token::Open => depth += 1,
                Token::Close if depth == 0 => {
                    let range = TextRange::at(line.range.start() + size(idx), close_len);
                    log::debug!("{:?} at {:?} closes at {:?}", pair, open, range);
                    return Some(range);
                }
                Token::Close => depth -= 1,
            }
        }
        log::trace!("line {} exhausted at depth {}", number, depth);
    }
    log::debug!("no close for {:?} at {:?} (lines {}..={})", pair, open, first, last);
    None
}

/// Finds the open token matching the close token at `close`.
pub fn find_open(
    snapshot: &Snapshot,
    pair: DelimiterPair,
    close: TextRange,
    max_lines: Option<u32>,
) -> Option<TextRange> {
    let first = snapshot.line_of(close.start());
    let stop = match bound(max_lines) {
        Some(limit) => first.saturating_sub(limit),
        None => 0,
    };

    let open_len = pair.open().len();
    let mut depth = 0usize;
    for number in (stop..=first).rev() {
        let line = snapshot.line(number)?;
        let until = if number == first {
            usize::from(close.start().checked_sub(line.range.start())?)
        } else {
            line.text.len()
        };
        for (idx, token) in occurrences(line.text, pair).into_iter().rev() {
            let len = match token {
                Token::Open => open_len,
                Token::Close => pair.close().len(),
            };
            if idx + len > until {
                continue;
            }
            match token {
                Token::Close => depth += 1,
                Token::Open if depth == 0 => {
                    let range = TextRange::at(line.range.start() + size(idx), size(open_len));
                    log::debug!("{:?} at {:?} opens at {:?}", pair, close, range);
                    return Some(range);
                }
                Token::Open => depth -= 1,
            }
        }
        log::trace!("line {} exhausted at depth {}", number, depth);
    }
    log::debug!("no open for {:?} at {:?} (lines {}..={})", pair, close, stop, first);
    None
}
