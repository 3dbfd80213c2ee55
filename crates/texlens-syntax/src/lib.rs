//! # texlens-syntax
//!
//! Lexical layer of the texlens editor engine:
//!
//! - [`text`]: immutable [`Snapshot`]s, the [`TextBuffer`] that produces them,
//!   and version-anchored [`PositionRef`]s.
//! - [`classifier`]: single-pass scanner assigning a [`Category`] to the
//!   interesting spans of a text range, for syntax highlighting.
//! - [`palette`]: display names and default colors for each category.
//! - [`completion`]: the fixed snippet catalogue offered while typing.
//!
//! Offsets are UTF-8 byte offsets ([`TextSize`]) and spans are half-open
//! [`TextRange`]s.

pub mod classifier;
pub mod completion;
pub mod palette;
pub mod text;

pub use classifier::{Category, Classified, Classifier, classify, classify_range};
pub use rowan::{TextRange, TextSize};
pub use text::{
    Affinity, Edit, Line, PositionRef, Snapshot, TextBuffer, TextError, TranslateError, VersionId,
};

/// Converts a byte length or index into a [`TextSize`], saturating at
/// `u32::MAX`.
///
/// Snapshots reject text past that limit, so the saturation only matters for
/// free-standing strings handed to [`classify`].
pub fn size(len: usize) -> TextSize {
    TextSize::try_from(len).unwrap_or_else(|_| TextSize::from(u32::MAX))
}
