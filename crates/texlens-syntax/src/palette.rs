//! Display metadata for classified spans.
//!
//! The engine never renders anything; hosts look up a [`Style`] per
//! [`Category`] to label settings pages and pick default colors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Category;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const TAN: Rgb = Rgb(0xD2, 0xB4, 0x8C);
    pub const AQUAMARINE: Rgb = Rgb(0x7F, 0xFF, 0xD4);
    pub const GRAY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const LIGHT_SKY_BLUE: Rgb = Rgb(0x87, 0xCE, 0xFA);
    pub const ORANGE: Rgb = Rgb(0xFF, 0xA5, 0x00);
    pub const CYAN: Rgb = Rgb(0x00, 0xFF, 0xFF);
    pub const SEA_GREEN: Rgb = Rgb(0x2E, 0x8B, 0x57);
    pub const BURLY_WOOD: Rgb = Rgb(0xDE, 0xB8, 0x87);
    pub const CORNFLOWER_BLUE: Rgb = Rgb(0x64, 0x95, 0xED);
    pub const INDIAN_RED: Rgb = Rgb(0xCD, 0x5C, 0x5C);
    pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xFF);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// How a host should present one kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    /// Stable identifier, suitable as a settings key.
    pub name: &'static str,
    /// Human-readable name listing what the style covers.
    pub display_name: &'static str,
    /// Default foreground color; `None` keeps the editor's text color.
    pub foreground: Option<Rgb>,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::PlainText,
        Category::ControlSequence,
        Category::RegisteredSymbol,
        Category::Comment,
        Category::Operator,
        Category::Special,
        Category::Environment,
        Category::Bracket,
        Category::InlineMath,
        Category::DisplayMath,
        Category::Group,
    ];

    pub fn style(self) -> Style {
        let (name, display_name, foreground) = match self {
            Category::PlainText => ("plain-text", "plain text (>U+FF)", None),
            Category::ControlSequence => {
                ("control-sequence", r"control sequence (\...)", Some(Rgb::TAN))
            }
            Category::RegisteredSymbol => (
                "registered-symbol",
                r"registered sequence (\alpha, ...)",
                Some(Rgb::AQUAMARINE),
            ),
            Category::Comment => ("comment", "comment (%...)", Some(Rgb::GRAY)),
            Category::Operator => (
                "operator",
                "operator (=, +, -, /, *)",
                Some(Rgb::LIGHT_SKY_BLUE),
            ),
            Category::Special => (
                "special",
                "special character (&, #, ~)",
                Some(Rgb::ORANGE),
            ),
            Category::Environment => (
                "environment",
                r"environment (\begin, \end, \left, \right, \label)",
                Some(Rgb::CYAN),
            ),
            Category::Bracket => (
                "bracket",
                r"bracket (\{, \}, [, ], (, ))",
                Some(Rgb::SEA_GREEN),
            ),
            Category::InlineMath => (
                "inline-math",
                r"inline formula ($, \(, \))",
                Some(Rgb::BURLY_WOOD),
            ),
            Category::DisplayMath => (
                "display-math",
                r"display formula ($$, \[, \])",
                Some(Rgb::CORNFLOWER_BLUE),
            ),
            Category::Group => ("group", "group ({, }, ^, _)", Some(Rgb::INDIAN_RED)),
        };
        Style {
            name,
            display_name,
            foreground,
        }
    }
}
