use serde::{Deserialize, Serialize};

use crate::{Snapshot, TextRange, TextSize};

/// Lexical category of a classified span.
///
/// Characters that need no highlighting are not classified at all; that
/// "default" outcome has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Run of code points above U+00FF.
    PlainText,
    /// Body after a `%` run.
    Comment,
    /// `=` `+` `-` `/` `*`
    Operator,
    /// `\foo`, `\\` and a lone `\`.
    ControlSequence,
    /// Greek letters and friends: `\alpha`, `\varPhi`, `\gimel`.
    RegisteredSymbol,
    /// `\begin{`, `\end{`, `\left`, `\right`, `\section{` and similar.
    Environment,
    /// `\{` `\}` `[` `]` `(` `)`
    Bracket,
    /// `$` `\(` `\)`
    InlineMath,
    /// `$$` `\[` `\]`
    DisplayMath,
    /// `{` `}` `^` `_`
    Group,
    /// `~` `&` `#` and the `%` run opening a comment.
    Special,
}

/// A classified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub range: TextRange,
    pub category: Category,
}

/// Characters that form a complete span on their own.
const SINGLE_CHAR_RULES: &[(char, Category)] = &[
    ('=', Category::Operator),
    ('+', Category::Operator),
    ('-', Category::Operator),
    ('/', Category::Operator),
    ('*', Category::Operator),
    ('^', Category::Group),
    ('_', Category::Group),
    ('{', Category::Group),
    ('}', Category::Group),
    ('[', Category::Bracket),
    (']', Category::Bracket),
    ('(', Category::Bracket),
    (')', Category::Bracket),
    ('~', Category::Special),
    ('&', Category::Special),
    ('#', Category::Special),
];

#[derive(Debug, Clone, Copy)]
enum EscapeAction {
    /// Only the backslash is classified; the next character is scanned normally.
    Lone,
    /// Backslash and the next character form one span.
    Pair(Category),
}

/// What a backslash followed by one of `follows` turns into. Checked in
/// order; a backslash matching none of them starts a command name.
const ESCAPE_RULES: &[(&[char], EscapeAction)] = &[
    (&[' ', '%', '^', '_', '&', '#', '$'], EscapeAction::Lone),
    (&['{', '}'], EscapeAction::Pair(Category::Bracket)),
    (&['[', ']'], EscapeAction::Pair(Category::DisplayMath)),
    (&['(', ')'], EscapeAction::Pair(Category::InlineMath)),
    (&['\\'], EscapeAction::Pair(Category::ControlSequence)),
];

/// Greek letters and related symbols highlighted as registered names.
pub const REGISTERED_SYMBOLS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi",
    "omega", "varepsilon", "vartheta", "varpi", "varrho", "varsigma", "varphi", "Gamma", "Delta",
    "Theta", "Lambda", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega", "varGamma", "varDelta",
    "varSigma", "varUpsilon", "varTheta", "varPhi", "varLambda", "varPsi", "varXi", "varOmega",
    "varPi", "digamma", "beth", "deleth", "gimel",
];

struct KeywordRule {
    names: &'static [&'static str],
    /// Characters one of which must directly follow the name; empty matches
    /// unconditionally.
    followed_by: &'static [char],
    category: Category,
}

/// Command names with a category other than [`Category::ControlSequence`],
/// checked in order.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        names: &["begin", "end", "label", "include"],
        followed_by: &['{'],
        category: Category::Environment,
    },
    KeywordRule {
        names: &["includegraphics"],
        followed_by: &['{', '['],
        category: Category::Environment,
    },
    KeywordRule {
        names: &["if", "fi", "left", "right"],
        followed_by: &[],
        category: Category::Environment,
    },
    KeywordRule {
        names: &["part", "chapter", "section", "subsection", "subsubsection"],
        followed_by: &['{'],
        category: Category::Environment,
    },
    KeywordRule {
        names: REGISTERED_SYMBOLS,
        followed_by: &[],
        category: Category::RegisteredSymbol,
    },
];

fn keyword_category(name: &str, next: Option<char>) -> Category {
    KEYWORD_RULES
        .iter()
        .find(|rule| {
            rule.names.contains(&name)
                && (rule.followed_by.is_empty()
                    || next.is_some_and(|c| rule.followed_by.contains(&c)))
        })
        .map_or(Category::ControlSequence, |rule| rule.category)
}

fn single_char_category(c: char) -> Option<Category> {
    SINGLE_CHAR_RULES
        .iter()
        .find(|(rule, _)| *rule == c)
        .map(|(_, category)| *category)
}

/// Highest code point still treated as part of the single-byte range.
const PLAIN_TEXT_THRESHOLD: char = '\u{ff}';

/// A single-pass classifier over one text range.
///
/// Produces ordered, non-overlapping [`Classified`] spans. Characters outside
/// every rule are skipped. A `%` ends classification: everything after the
/// `%` run is one [`Category::Comment`] span reaching the end of the range,
/// since the classifier only ever sees the range it was given.
///
/// ## Examples
///
/// ```
/// use texlens_syntax::{Category, Classifier};
///
/// let spans: Vec<_> = Classifier::new(r"\alpha + \section{A}").collect();
/// let categories: Vec<_> = spans.iter().map(|s| s.category).collect();
/// assert_eq!(
///     categories,
///     [
///         Category::RegisteredSymbol,
///         Category::Operator,
///         Category::Environment,
///         Category::Group,
///         Category::Group,
///     ]
/// );
/// ```
pub struct Classifier<'a> {
    input: &'a str,
    position: usize,
    /// Absolute offset of `input` within its document.
    base: TextSize,
    pending: Option<Classified>,
}

impl<'a> Classifier<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, TextSize::from(0))
    }

    /// Classifies `input` reporting ranges shifted by `base`.
    pub fn with_offset(input: &'a str, base: TextSize) -> Self {
        Self {
            input,
            position: 0,
            base,
            pending: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn span(&self, start: usize, category: Category) -> Classified {
        Classified {
            range: TextRange::new(
                self.base + crate::size(start),
                self.base + crate::size(self.position),
            ),
            category,
        }
    }

    fn comment(&mut self, start: usize) -> Classified {
        self.position += 1;
        while self.peek() == Some('%') {
            self.position += 1;
        }
        let marker = self.span(start, Category::Special);
        if self.position < self.input.len() {
            let body = self.position;
            self.position = self.input.len();
            self.pending = Some(self.span(body, Category::Comment));
        }
        marker
    }

    fn control_sequence(&mut self, start: usize) -> Classified {
        self.position += 1;
        let Some(next) = self.peek() else {
            return self.span(start, Category::ControlSequence);
        };

        for (follows, action) in ESCAPE_RULES {
            if follows.contains(&next) {
                return match *action {
                    EscapeAction::Lone => self.span(start, Category::ControlSequence),
                    EscapeAction::Pair(category) => {
                        self.position += next.len_utf8();
                        self.span(start, category)
                    }
                };
            }
        }

        let name_start = self.position;
        while self.input.as_bytes().get(self.position).is_some_and(u8::is_ascii_alphabetic) {
            self.position += 1;
        }
        let name = &self.input[name_start..self.position];
        let category = keyword_category(name, self.peek());
        self.span(start, category)
    }

    /// Returns the next classified span, or `None` once the range is exhausted.
    pub fn next_span(&mut self) -> Option<Classified> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        while let Some(c) = self.peek() {
            let start = self.position;
            match c {
                c if c > PLAIN_TEXT_THRESHOLD => {
                    while let Some(n) = self.peek().filter(|n| *n > PLAIN_TEXT_THRESHOLD) {
                        self.position += n.len_utf8();
                    }
                    return Some(self.span(start, Category::PlainText));
                }
                '%' => return Some(self.comment(start)),
                '\\' => return Some(self.control_sequence(start)),
                '$' => {
                    self.position += 1;
                    if self.peek() == Some('$') {
                        self.position += 1;
                        return Some(self.span(start, Category::DisplayMath));
                    }
                    return Some(self.span(start, Category::InlineMath));
                }
                c => {
                    self.position += c.len_utf8();
                    if let Some(category) = single_char_category(c) {
                        return Some(self.span(start, category));
                    }
                }
            }
        }
        None
    }
}

impl Iterator for Classifier<'_> {
    type Item = Classified;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_span()
    }
}

/// Classifies a free-standing string; ranges are relative to its start.
pub fn classify(text: &str) -> Vec<Classified> {
    Classifier::new(text).collect()
}

/// Classifies `range` of `snapshot`; ranges are absolute document offsets.
///
/// A range outside the document, or one that splits a character, yields no
/// spans.
pub fn classify_range(snapshot: &Snapshot, range: TextRange) -> Vec<Classified> {
    match snapshot.slice(range) {
        Some(text) => Classifier::with_offset(text, range.start()).collect(),
        None => {
            log::debug!(
                "classify_range: {:?} is not a valid range of {}",
                range,
                snapshot.version()
            );
            Vec::new()
        }
    }
}
