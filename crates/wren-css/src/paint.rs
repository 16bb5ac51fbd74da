//! Paint command generation from a laid-out box tree.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! The paint builder walks the box tree depth-first in pre-order and emits
//! an ordered list of drawing primitives: for each element box its
//! background rectangle, then its border lines, then its descendants'
//! commands. The commands carry raw CSS color strings; the executor is
//! responsible for resolving them.

use serde::Serialize;
use strum_macros::EnumString;
use wren_common::warning::warn_once;

use crate::error::PaintError;
use crate::layout::{LayoutBox, parse_px};
use crate::render_tree::StyleMap;

/// A single drawing primitive.
///
/// Commands are an immutable value list, consumed once by the executor in
/// emission order (back to front) and discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PaintCommand {
    /// Stroke a straight line segment of the given width.
    Line {
        /// X coordinate of the start point.
        x1: f32,
        /// Y coordinate of the start point.
        y1: f32,
        /// X coordinate of the end point.
        x2: f32,
        /// Y coordinate of the end point.
        y2: f32,
        /// Stroke width in pixels.
        width: f32,
        /// Stroke color (raw CSS color string).
        color: String,
    },

    /// Fill a rectangle with a solid color.
    Rect {
        /// X coordinate of the top-left corner.
        x: f32,
        /// Y coordinate of the top-left corner.
        y: f32,
        /// Width of the rectangle.
        width: f32,
        /// Height of the rectangle.
        height: f32,
        /// Fill color (raw CSS color string).
        color: String,
    },

    /// Draw a text run.
    Text {
        /// X coordinate of the text origin.
        x: f32,
        /// Y coordinate of the baseline.
        y: f32,
        /// The text content.
        text: String,
        /// Text color (raw CSS color string).
        color: String,
    },
}

/// [CSS Backgrounds and Borders § 3.2 border-style](https://www.w3.org/TR/css-backgrounds-3/#border-style)
///
/// Recognized `border-style` keywords. Every visible style renders as a
/// solid stroke; `none` and `hidden` suppress the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BorderStyle {
    /// No border.
    None,
    /// Same as `none`, with different conflict-resolution in real CSS.
    Hidden,
    /// A single solid line.
    Solid,
    /// A series of dashes (rendered solid here).
    Dashed,
    /// A series of dots (rendered solid here).
    Dotted,
    /// Two parallel lines (rendered solid here).
    Double,
    /// Carved appearance (rendered solid here).
    Groove,
    /// Extruded appearance (rendered solid here).
    Ridge,
    /// Inset appearance (rendered solid here).
    Inset,
    /// Outset appearance (rendered solid here).
    Outset,
}

impl BorderStyle {
    /// Whether a border side with this style is drawn at all.
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// Build the ordered paint command list for a laid-out box tree.
///
/// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
///
/// # Errors
///
/// Returns [`PaintError::MissingParentContext`] for a text box with no
/// element ancestor — text carries no color of its own, so such a tree is
/// malformed by contract.
pub fn build_paint_commands(root: &LayoutBox<'_>) -> Result<Vec<PaintCommand>, PaintError> {
    let mut commands = Vec::new();
    paint_box(root, None, &mut commands)?;
    Ok(commands)
}

/// Emit the commands for one box and recurse into its children.
/// `ancestor_style` is the computed style of the nearest element ancestor,
/// used to resolve text color.
fn paint_box<'a>(
    layout_box: &LayoutBox<'a>,
    ancestor_style: Option<&'a StyleMap>,
    out: &mut Vec<PaintCommand>,
) -> Result<(), PaintError> {
    if let Some(text) = layout_box.text_contents() {
        let style = ancestor_style.ok_or(PaintError::MissingParentContext)?;
        let color = style.get("color").map_or("black", String::as_str);

        // The baseline sits one font ascent below the content-box origin;
        // the ascent was recorded on the box during layout.
        let ascent = layout_box.text_run.map_or(0.0, |run| run.ascent);
        let content = layout_box.dimensions.content;
        out.push(PaintCommand::Text {
            x: content.x,
            y: content.y + ascent,
            text: text.to_string(),
            color: color.to_string(),
        });
        return Ok(());
    }

    // [Appendix E.2] background first, border second, descendants last.
    let style = layout_box.style();
    if let Some(style) = style {
        paint_background(style, layout_box, out);
        paint_borders(style, layout_box, out);
    }

    let next_ancestor = style.or(ancestor_style);
    for child in &layout_box.children {
        paint_box(child, next_ancestor, out)?;
    }
    Ok(())
}

/// [CSS Backgrounds § 3.7](https://www.w3.org/TR/css-backgrounds-3/#background-painting-area)
///
/// "The background is painted within the border box."
fn paint_background(style: &StyleMap, layout_box: &LayoutBox<'_>, out: &mut Vec<PaintCommand>) {
    let Some(color) = style.get("background-color") else {
        return;
    };
    let rect = layout_box.dimensions.border_box();
    out.push(PaintCommand::Rect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        color: color.clone(),
    });
}

/// [CSS Backgrounds § 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// Emit up to four border lines (top, right, bottom, left) along the
/// border-box edges. Each side resolves its width, style, and color
/// independently: the `border-<side>-*` longhand wins over the unqualified
/// `border-*` property, and the color additionally falls back to the
/// element's `color`, then to black. A side is skipped when its resolved
/// width is not positive or its style is `none`/`hidden`; an unrecognized
/// style keyword logs a diagnostic and degrades to no border.
fn paint_borders(style: &StyleMap, layout_box: &LayoutBox<'_>, out: &mut Vec<PaintCommand>) {
    let rect = layout_box.dimensions.border_box();
    let sides = [
        ("top", rect.x, rect.y, rect.x + rect.width, rect.y),
        (
            "right",
            rect.x + rect.width,
            rect.y,
            rect.x + rect.width,
            rect.y + rect.height,
        ),
        (
            "bottom",
            rect.x + rect.width,
            rect.y + rect.height,
            rect.x,
            rect.y + rect.height,
        ),
        ("left", rect.x, rect.y + rect.height, rect.x, rect.y),
    ];

    for (side, x1, y1, x2, y2) in sides {
        let Some(width_raw) = border_property(style, side, "width") else {
            continue;
        };
        let width = parse_px(width_raw).unwrap_or(0.0);
        if width <= 0.0 {
            continue;
        }

        // An absent border-style draws (the property predates border-style
        // support and plain width+color borders must keep rendering); an
        // explicit keyword is honored, unknown keywords degrade.
        if let Some(style_raw) = border_property(style, side, "style") {
            match style_raw.parse::<BorderStyle>() {
                Ok(border_style) if border_style.is_visible() => {}
                Ok(_) => continue,
                Err(_) => {
                    warn_once(
                        "Paint",
                        &format!("unknown border-style {style_raw:?}; drawing no border"),
                    );
                    continue;
                }
            }
        }

        let color = border_property(style, side, "color")
            .or_else(|| style.get("color").map(String::as_str))
            .unwrap_or("black");

        out.push(PaintCommand::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color: color.to_string(),
        });
    }
}

/// Per-side border property lookup: `border-<side>-<suffix>` falling back
/// to `border-<suffix>`.
fn border_property<'a>(style: &'a StyleMap, side: &str, suffix: &str) -> Option<&'a str> {
    style
        .get(&format!("border-{side}-{suffix}"))
        .or_else(|| style.get(&format!("border-{suffix}")))
        .map(String::as_str)
}
