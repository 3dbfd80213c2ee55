//! Delimiter pairs and the probes that find one next to the caret.
//!
//! Probing is table driven. [`OPEN_PROBES`] and [`CLOSE_PROBES`] list the
//! pairs in priority order; the first rule whose literal covers the probed
//! character wins. Which characters of a literal may be probed depends on
//! the mode:
//!
//! - outer: only the anchor character, the first one for opens and the last
//!   one for closes;
//! - inner: any character of the literal, so a caret inside `\left` still
//!   finds it.
//!
//! A bare `{` or `}` directly preceded by a backslash never counts as the
//! plain brace pair; it belongs to the escaped pair.

use serde::{Deserialize, Serialize};
use texlens_syntax::{Snapshot, TextRange, TextSize, size};

/// A balanced `(open, close)` token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterPair {
    Paren,
    Bracket,
    Brace,
    EscapedBrace,
    LeftRight,
}

impl DelimiterPair {
    pub const ALL: [DelimiterPair; 5] = [
        DelimiterPair::Paren,
        DelimiterPair::Bracket,
        DelimiterPair::Brace,
        DelimiterPair::EscapedBrace,
        DelimiterPair::LeftRight,
    ];

    pub fn open(self) -> &'static str {
        match self {
            DelimiterPair::Paren => "(",
            DelimiterPair::Bracket => "[",
            DelimiterPair::Brace => "{",
            DelimiterPair::EscapedBrace => r"\{",
            DelimiterPair::LeftRight => r"\left",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            DelimiterPair::Paren => ")",
            DelimiterPair::Bracket => "]",
            DelimiterPair::Brace => "}",
            DelimiterPair::EscapedBrace => r"\}",
            DelimiterPair::LeftRight => r"\right",
        }
    }

    pub fn literal(self, side: Side) -> &'static str {
        match side {
            Side::Open => self.open(),
            Side::Close => self.close(),
        }
    }

    /// Whether an occurrence at `start` of `line` belongs to this pair.
    ///
    /// Only the plain brace pair is picky: its occurrences must not follow a
    /// backslash.
    pub(crate) fn accepts(self, line: &[u8], start: usize) -> bool {
        self != DelimiterPair::Brace || !follows_backslash(line, start)
    }
}

fn follows_backslash(line: &[u8], start: usize) -> bool {
    start > 0 && line[start - 1] == b'\\'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Open,
    Close,
}

/// Open probes in priority order.
pub const OPEN_PROBES: &[DelimiterPair] = &[
    DelimiterPair::EscapedBrace,
    DelimiterPair::LeftRight,
    DelimiterPair::Brace,
    DelimiterPair::Bracket,
    DelimiterPair::Paren,
];

/// Close probes in priority order, mirroring [`OPEN_PROBES`].
pub const CLOSE_PROBES: &[DelimiterPair] = &[
    DelimiterPair::EscapedBrace,
    DelimiterPair::LeftRight,
    DelimiterPair::Brace,
    DelimiterPair::Bracket,
    DelimiterPair::Paren,
];

/// A delimiter found next to the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub pair: DelimiterPair,
    pub side: Side,
    /// Full span of the delimiter token, reconstructed even when the probed
    /// character sat in its middle.
    pub range: TextRange,
}

/// Looks for an open delimiter covering the character at `caret`.
pub fn probe_open(snapshot: &Snapshot, caret: TextSize, inner: bool) -> Option<Probe> {
    probe(snapshot, caret, Side::Open, inner)
}

/// Looks for a close delimiter covering the character just before `caret`.
pub fn probe_close(snapshot: &Snapshot, caret: TextSize, inner: bool) -> Option<Probe> {
    let at = caret.checked_sub(TextSize::from(1))?;
    probe(snapshot, at, Side::Close, inner)
}

fn probe(snapshot: &Snapshot, at: TextSize, side: Side, inner: bool) -> Option<Probe> {
    let line = snapshot.line(snapshot.line_of(at))?;
    let col = usize::from(at.checked_sub(line.range.start())?);
    let bytes = line.text.as_bytes();
    if col >= bytes.len() {
        return None;
    }

    let rules = match side {
        Side::Open => OPEN_PROBES,
        Side::Close => CLOSE_PROBES,
    };
    for &pair in rules {
        let literal = pair.literal(side).as_bytes();
        let anchor = match side {
            Side::Open => 0,
            Side::Close => literal.len() - 1,
        };
        let candidates = if inner {
            0..literal.len()
        } else {
            anchor..anchor + 1
        };
        for index in candidates {
            let Some(start) = col.checked_sub(index) else {
                continue;
            };
            if bytes[start..].starts_with(literal) && pair.accepts(bytes, start) {
                let start = line.range.start() + size(start);
                let range = TextRange::at(start, size(literal.len()));
                log::debug!("probe {:?} hit {:?} at {:?}", side, pair, range);
                return Some(Probe { pair, side, range });
            }
        }
    }
    None
}
