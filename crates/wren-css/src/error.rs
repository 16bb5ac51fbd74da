//! Error types for stylesheet processing and painting.
//!
//! Parse-level errors are fatal to the stylesheet/document being processed:
//! no partial render tree is ever returned. Numeric parsing, by contrast,
//! never errors (see [`crate::layout::parse_px`]).

use thiserror::Error;

/// Errors raised while parsing a stylesheet or building a render tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// A selector that does not conform to any supported form, including
    /// attribute selectors with an unknown operator.
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    /// A selector form that is recognizable CSS but outside the supported
    /// subset (combinators, pseudo-classes, multi-part compounds).
    #[error("unsupported selector type: {0:?}")]
    UnsupportedSelectorType(String),

    /// A rule that is not a plain style rule (e.g. an at-rule).
    #[error("unsupported CSS rule: {0:?}")]
    UnsupportedCssRule(String),
}

/// Errors raised while building paint commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaintError {
    /// A text box was found with no element ancestor. Text has no color of
    /// its own, so this indicates a malformed box tree; it cannot occur for
    /// trees produced by [`crate::layout::LayoutBox::build`].
    #[error("text box has no element ancestor to resolve its color")]
    MissingParentContext,
}
