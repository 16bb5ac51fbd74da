//! CSS cascade, render tree, block layout, and paint commands for the
//! Wren rendering engine.
//!
//! # Scope
//!
//! This crate is the core of the engine — the three-stage pipeline from a
//! parsed DOM to drawing primitives:
//!
//! ```text
//! DomTree → RenderNode tree → LayoutBox tree → (laid out) → PaintCommands
//! ```
//!
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/),
//!   simple-selector subset): universal, type, id, class, and single
//!   attribute selectors with `=` / `~=`.
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/),
//!   simplified): default rules then document rules in source order, last
//!   declaration wins; no specificity, no inheritance.
//! - **Render tree**: DOM pruned of non-rendered nodes, annotated with
//!   flattened computed style.
//! - **Layout** ([CSS 2.1 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)):
//!   block flow only — width constraint solving with auto margins,
//!   vertical stacking, anonymous block synthesis for inline runs.
//! - **Paint**: ordered `Line`/`Rect`/`Text` primitives carrying raw CSS
//!   color strings.
//!
//! # Not implemented
//!
//! - Selector specificity and property inheritance
//! - Floats and positioning schemes other than normal flow
//! - Inline line-breaking (inline boxes stack like blocks)
//! - Font shaping (text measurement is a delegated capability)

/// Built-in default stylesheet.
pub mod default_styles;
/// Error types for stylesheet processing and painting.
pub mod error;
/// Block-flow layout engine.
pub mod layout;
/// Paint command generation.
pub mod paint;
/// Render tree construction (the cascade).
pub mod render_tree;
/// Selector parsing and matching.
pub mod selector;
/// Stylesheet parsing.
pub mod style;

// Re-exports for convenience
pub use default_styles::default_stylesheet;
pub use error::{PaintError, StyleError};
pub use layout::{
    BoxKind, Dimensions, EdgeSizes, HeuristicTextMetrics, LayoutBox, Rect, TextMeasurement,
    TextMetrics, layout_tree, parse_px,
};
pub use paint::{BorderStyle, PaintCommand, build_paint_commands};
pub use render_tree::{RenderNode, StyleMap, build_render_tree};
pub use selector::{AttributeOperator, Selector, parse_selector_list};
pub use style::{Declaration, StyleRule, Stylesheet, parse_stylesheet};
