//! # texlens-match
//!
//! Finds the partner of the delimiter the caret touches so a host can
//! highlight both.
//!
//! ## Overview
//!
//! Every query runs two independent probes (see [`pairs`]):
//!
//! - the **open probe** looks at the character at the caret for `\{`,
//!   `\left`, `{`, `[` or `(` and scans forward for its close;
//! - the **close probe** looks at the character before the caret for `\}`,
//!   `\right`, `}`, `]` or `)` and scans backward for its open.
//!
//! Each successful probe whose scan (see [`scan`]) finds a partner adds one
//! [`MatchedPair`] to the [`MatchSet`], so a query yields zero, one or two
//! pairs. Nothing here ever fails loudly: no delimiter, no partner, a caret
//! at the document end or a stale caret all mean an empty result.
//!
//! [`recompute`] is the pure entry point. [`BraceTagger`] wraps it for hosts
//! that deliver caret and layout notifications and re-query afterwards.
//!
//! ## Example
//!
//! ```
//! use texlens_match::{DelimiterPair, MatchConfig, recompute};
//! use texlens_syntax::{TextBuffer, TextRange, TextSize};
//!
//! let buffer = TextBuffer::new(r"\left(x\right)").unwrap();
//! let matches = recompute(&buffer.current(), TextSize::from(2), &MatchConfig::default());
//!
//! let pair = matches.iter().next().unwrap();
//! assert_eq!(pair.pair, DelimiterPair::LeftRight);
//! assert_eq!(pair.open, TextRange::new(0.into(), 5.into()));
//! assert_eq!(pair.close, TextRange::new(7.into(), 13.into()));
//! ```

pub mod pairs;
pub mod scan;
pub mod tagger;

use serde::{Deserialize, Serialize};
use texlens_syntax::palette::{Rgb, Style};
use texlens_syntax::{Snapshot, TextRange, TextSize};

pub use pairs::{DelimiterPair, Probe, Side, probe_close, probe_open};
pub use tagger::{BraceTagger, TagsChanged};

/// Tuning for delimiter searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Lines past the open token the forward scan may visit.
    pub forward_max_lines: Option<u32>,
    /// Lines before the close token the backward scan may visit.
    pub backward_max_lines: Option<u32>,
    /// Recognize multi-character delimiters from any of their characters.
    pub inner: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            forward_max_lines: None,
            backward_max_lines: None,
            inner: true,
        }
    }
}

/// An open token and the close token that balances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub pair: DelimiterPair,
    pub open: TextRange,
    pub close: TextRange,
}

/// The pairs found for one caret position: at most one per probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pairs: Vec<MatchedPair>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchedPair> {
        self.pairs.iter()
    }

    /// Flattens the pairs into highlight tags, open before close.
    pub fn tags(&self) -> Vec<Tag> {
        self.pairs
            .iter()
            .flat_map(|m| [m.open, m.close])
            .map(|range| Tag {
                range,
                kind: TagKind::MatchedDelimiter,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a MatchedPair;
    type IntoIter = std::slice::Iter<'a, MatchedPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagKind {
    MatchedDelimiter,
}

impl TagKind {
    pub fn style(self) -> Style {
        match self {
            TagKind::MatchedDelimiter => Style {
                name: "matched-delimiter",
                display_name: "matched delimiter",
                foreground: Some(Rgb::BLUE),
            },
        }
    }
}

/// A span the host should mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub range: TextRange,
    pub kind: TagKind,
}

/// Computes the matched pairs around `caret` in `snapshot`.
pub fn recompute(snapshot: &Snapshot, caret: TextSize, config: &MatchConfig) -> MatchSet {
    let mut set = MatchSet::default();
    if caret >= snapshot.len() {
        return set;
    }

    if let Some(open) = probe_open(snapshot, caret, config.inner) {
        if let Some(close) = scan::find_close(snapshot, open.pair, open.range, config.forward_max_lines)
        {
            set.pairs.push(MatchedPair {
                pair: open.pair,
                open: open.range,
                close,
            });
        }
    }
    if let Some(close) = probe_close(snapshot, caret, config.inner) {
        if let Some(open) = scan::find_open(snapshot, close.pair, close.range, config.backward_max_lines)
        {
            set.pairs.push(MatchedPair {
                pair: close.pair,
                open,
                close: close.range,
            });
        }
    }
    set
}
