//! Layout box tree construction and the block-flow solver.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! A fresh box tree is built from the render tree on every paint cycle;
//! it borrows the render tree and does not survive across navigations.
//! The layout pass takes exclusive `&mut` ownership of the tree and
//! resolves every box's dimensions in place — nothing else observes the
//! tree mid-layout.

use crate::render_tree::{RenderNode, StyleMap};

use super::box_model::{Dimensions, Rect};
use super::text::{TextMeasurement, TextMetrics};
use super::parse_px;

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "The following sections describe the types of boxes that may be
/// generated in CSS 2.1."
#[derive(Debug, Clone, Copy)]
pub enum BoxKind<'a> {
    /// A block-level element box.
    Block(&'a RenderNode),

    /// An inline-level box: an element with `display: inline`, or a text
    /// run. Inline boxes are never laid out on their own; they are sized
    /// and positioned as part of their parent's child-layout pass.
    Inline(&'a RenderNode),

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "...the line boxes before the break and after the break are
    /// enclosed in anonymous block boxes."
    ///
    /// A synthesized container with no render node, hosting a maximal run
    /// of consecutive inline-level siblings inside a block container.
    AnonymousBlock,
}

/// A node in the layout tree: box classification, resolved geometry, and
/// child boxes.
#[derive(Debug, Clone)]
pub struct LayoutBox<'a> {
    /// The kind of box (block, inline, anonymous).
    pub kind: BoxKind<'a>,

    /// The box geometry. Fully resolved (no pending values) once the
    /// layout pass has returned for this subtree.
    pub dimensions: Dimensions,

    /// Child boxes in the layout tree.
    pub children: Vec<LayoutBox<'a>>,

    /// The text measurement recorded during layout, for text boxes only.
    /// The paint builder uses the ascent to place the baseline.
    pub text_run: Option<TextMeasurement>,
}

impl<'a> LayoutBox<'a> {
    fn new(kind: BoxKind<'a>) -> Self {
        Self {
            kind,
            dimensions: Dimensions::default(),
            children: Vec::new(),
            text_run: None,
        }
    }

    /// Build the layout box tree for a render tree.
    ///
    /// [§ 9.2.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// Block children are appended directly; runs of consecutive
    /// inline-level children inside a block container are wrapped in a
    /// shared anonymous block box.
    #[must_use]
    pub fn build(node: &'a RenderNode) -> Self {
        let kind = match node {
            RenderNode::Text { .. } => BoxKind::Inline(node),
            RenderNode::Element { .. } => {
                if node.is_block() {
                    BoxKind::Block(node)
                } else {
                    BoxKind::Inline(node)
                }
            }
        };

        let mut root = Self::new(kind);
        for child in node.children() {
            let child_box = Self::build(child);
            if child.is_block() {
                root.children.push(child_box);
            } else {
                root.inline_container().children.push(child_box);
            }
        }
        root
    }

    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// Where a new inline-level child goes. An inline or anonymous box
    /// hosts inline children directly; a block box routes them into its
    /// last anonymous block child, creating one only when the previous
    /// sibling is not already an anonymous block (so a run of inline
    /// children shares a single wrapper).
    fn inline_container(&mut self) -> &mut LayoutBox<'a> {
        match self.kind {
            BoxKind::Inline(_) | BoxKind::AnonymousBlock => self,
            BoxKind::Block(_) => {
                if !matches!(
                    self.children.last(),
                    Some(LayoutBox {
                        kind: BoxKind::AnonymousBlock,
                        ..
                    })
                ) {
                    self.children.push(Self::new(BoxKind::AnonymousBlock));
                }
                self.children
                    .last_mut()
                    .expect("an anonymous block was just ensured")
            }
        }
    }

    /// The render node generating this box, if any.
    #[must_use]
    pub fn render_node(&self) -> Option<&'a RenderNode> {
        match self.kind {
            BoxKind::Block(node) | BoxKind::Inline(node) => Some(node),
            BoxKind::AnonymousBlock => None,
        }
    }

    /// The computed style of the generating element. Anonymous boxes and
    /// text boxes have no style of their own.
    #[must_use]
    pub fn style(&self) -> Option<&'a StyleMap> {
        self.render_node().and_then(RenderNode::style)
    }

    /// The text contents, for text boxes.
    #[must_use]
    pub fn text_contents(&self) -> Option<&'a str> {
        match self.kind {
            BoxKind::Inline(RenderNode::Text { contents }) => Some(contents.as_str()),
            _ => None,
        }
    }

    /// Lay out this box and its descendants against a containing block.
    ///
    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "In a block formatting context, boxes are laid out one after the
    /// other, vertically, beginning at the top of a containing block."
    ///
    /// Four sequential steps: width resolution, position resolution,
    /// children layout, height resolution. The containing block is passed
    /// by value: its `content.height` is the flow cursor at which this box
    /// is placed, advanced by the caller between siblings.
    pub fn layout(&mut self, containing: Dimensions, metrics: &dyn TextMetrics) {
        self.calculate_width(&containing, metrics);
        self.calculate_position(&containing);
        self.layout_children(metrics);
        self.calculate_height();
    }

    /// STEP 1 — width resolution.
    ///
    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
    /// 'padding-right' + 'border-right-width' + 'margin-right' = width of
    /// containing block"
    ///
    /// The underflow (containing width minus the sum above) is distributed
    /// into `auto` values. When nothing is auto, margin-right absorbs the
    /// remainder even if it was given explicitly, so the constraint always
    /// balances.
    fn calculate_width(&mut self, containing: &Dimensions, metrics: &dyn TextMetrics) {
        // Text boxes report their rendered glyph extents as their width
        // and skip the constraint solving entirely.
        if let Some(text) = self.text_contents() {
            let run = metrics.measure(text);
            self.dimensions.content.width = run.width;
            self.text_run = Some(run);
            return;
        }

        let style = self.style();

        // Explicit longhands win over the shorthand. The padding longhand
        // spellings (`padding-left-width` etc.) are non-standard but
        // contractual; see the property table in the crate docs.
        let mut margin_left = lookup(style, "margin-left", "margin");
        let mut margin_right = lookup(style, "margin-right", "margin");
        let border_left = lookup(style, "border-left-width", "border-width");
        let border_right = lookup(style, "border-right-width", "border-width");
        let padding_left = lookup(style, "padding-left-width", "padding");
        let padding_right = lookup(style, "padding-right-width", "padding");
        let width = style
            .and_then(|s| s.get("width"))
            .map_or("auto", String::as_str);

        let total: f32 = [
            margin_left,
            border_left,
            padding_left,
            width,
            padding_right,
            border_right,
            margin_right,
        ]
        .iter()
        .map(|v| parse_px(v).unwrap_or(0.0))
        .sum();

        // "If 'width' is not 'auto' and [the total] is larger than the
        // width of the containing block, then any 'auto' values for
        // 'margin-left' or 'margin-right' are... treated as zero."
        if width != "auto" && total > containing.content.width {
            if margin_left == "auto" {
                margin_left = "0";
            }
            if margin_right == "auto" {
                margin_right = "0";
            }
        }

        let underflow = containing.content.width - total;

        let mut width_px = parse_px(width).unwrap_or(0.0);
        let mut margin_left_px = parse_px(margin_left).unwrap_or(0.0);
        let mut margin_right_px = parse_px(margin_right).unwrap_or(0.0);

        if width == "auto" {
            // Auto margins resolve to zero when width itself is auto; the
            // box then takes all remaining space. Negative underflow makes
            // margin-right absorb the overflow instead.
            if underflow >= 0.0 {
                width_px = underflow;
            } else {
                width_px = 0.0;
                margin_right_px += underflow;
            }
        } else {
            match (margin_left == "auto", margin_right == "auto") {
                (true, true) => {
                    margin_left_px = underflow / 2.0;
                    margin_right_px = underflow / 2.0;
                }
                (true, false) => margin_left_px = underflow,
                (false, true) => margin_right_px = underflow,
                // Over-constrained: margin-right gives way.
                (false, false) => margin_right_px += underflow,
            }
        }

        let d = &mut self.dimensions;
        d.content.width = width_px;
        d.padding.left = parse_px(padding_left).unwrap_or(0.0);
        d.padding.right = parse_px(padding_right).unwrap_or(0.0);
        d.border.left = parse_px(border_left).unwrap_or(0.0);
        d.border.right = parse_px(border_right).unwrap_or(0.0);
        d.margin.left = margin_left_px;
        d.margin.right = margin_right_px;
    }

    /// STEP 2 — position resolution.
    ///
    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Each box's left outer edge touches the left edge of the containing
    /// block." Vertically the box lands at the containing block's current
    /// flow cursor (`content.height`). There is no auto-margin logic on
    /// this axis; `auto` simply parses to zero.
    fn calculate_position(&mut self, containing: &Dimensions) {
        let style = self.style();
        let d = &mut self.dimensions;

        d.margin.top = parse_px(lookup(style, "margin-top", "margin")).unwrap_or(0.0);
        d.margin.bottom = parse_px(lookup(style, "margin-bottom", "margin")).unwrap_or(0.0);
        d.border.top = parse_px(lookup(style, "border-top-width", "border-width")).unwrap_or(0.0);
        d.border.bottom =
            parse_px(lookup(style, "border-bottom-width", "border-width")).unwrap_or(0.0);
        d.padding.top = parse_px(lookup(style, "padding-top-width", "padding")).unwrap_or(0.0);
        d.padding.bottom =
            parse_px(lookup(style, "padding-bottom-width", "padding")).unwrap_or(0.0);

        d.content.x = containing.content.x + d.margin.left + d.border.left + d.padding.left;
        d.content.y = containing.content.y
            + containing.content.height
            + d.margin.top
            + d.border.top
            + d.padding.top;
    }

    /// STEP 3 — children layout.
    ///
    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// Children are laid out in order against this box's content area, each
    /// one's margin-box height accumulating into this box's content height,
    /// so children stack vertically with no overlap.
    fn layout_children(&mut self, metrics: &dyn TextMetrics) {
        let d = &mut self.dimensions;
        for child in &mut self.children {
            child.layout(*d, metrics);
            d.content.height += child.dimensions.margin_box().height;
        }
    }

    /// STEP 4 — height resolution.
    ///
    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// An explicit non-`auto` height overrides the height accumulated from
    /// the children; otherwise the accumulated value stands (0 for a
    /// childless box). Text boxes take the font's vertical extents.
    fn calculate_height(&mut self) {
        if let Some(run) = &self.text_run {
            self.dimensions.content.height = run.ascent + run.descent;
            return;
        }

        if let Some(height) = self.style().and_then(|s| s.get("height"))
            && height != "auto"
        {
            self.dimensions.content.height = parse_px(height).unwrap_or(0.0);
        }
    }
}

/// Property lookup with the longhand-over-shorthand rule: the explicit
/// longhand always wins when both are present; a missing pair yields `"0"`.
fn lookup<'a>(style: Option<&'a StyleMap>, longhand: &str, shorthand: &str) -> &'a str {
    style
        .and_then(|s| s.get(longhand).or_else(|| s.get(shorthand)))
        .map_or("0", String::as_str)
}

/// Lay out a whole box tree against a viewport.
///
/// [§ 9.1.1 The viewport](https://www.w3.org/TR/CSS2/visuren.html#viewport)
///
/// The viewport becomes the initial containing block. Its height does not
/// constrain block flow — the containing block's `content.height` field is
/// the flow cursor and therefore starts at zero.
pub fn layout_tree(root: &mut LayoutBox<'_>, viewport: Rect, metrics: &dyn TextMetrics) {
    let containing = Dimensions {
        content: Rect {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: 0.0,
        },
        ..Dimensions::default()
    };
    root.layout(containing, metrics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_tree::RenderNode;
    use std::collections::HashMap;

    fn block(children: Vec<RenderNode>) -> RenderNode {
        let mut style = HashMap::new();
        let _ = style.insert("display".to_string(), "block".to_string());
        RenderNode::Element {
            tag_name: "div".to_string(),
            style,
            children,
        }
    }

    fn inline(children: Vec<RenderNode>) -> RenderNode {
        let mut style = HashMap::new();
        let _ = style.insert("display".to_string(), "inline".to_string());
        RenderNode::Element {
            tag_name: "span".to_string(),
            style,
            children,
        }
    }

    fn text(s: &str) -> RenderNode {
        RenderNode::Text {
            contents: s.to_string(),
        }
    }

    #[test]
    fn block_children_attach_directly() {
        let tree = block(vec![block(vec![]), block(vec![])]);
        let root = LayoutBox::build(&tree);
        assert_eq!(root.children.len(), 2);
        assert!(matches!(root.children[0].kind, BoxKind::Block(_)));
        assert!(matches!(root.children[1].kind, BoxKind::Block(_)));
    }

    #[test]
    fn inline_run_shares_one_anonymous_block() {
        // block > [inline, text, block, inline]
        let tree = block(vec![
            inline(vec![]),
            text("hi"),
            block(vec![]),
            inline(vec![]),
        ]);
        let root = LayoutBox::build(&tree);

        assert_eq!(root.children.len(), 3);
        assert!(matches!(root.children[0].kind, BoxKind::AnonymousBlock));
        assert!(matches!(root.children[1].kind, BoxKind::Block(_)));
        assert!(matches!(root.children[2].kind, BoxKind::AnonymousBlock));

        // The leading inline run (inline + text) shares one wrapper.
        assert_eq!(root.children[0].children.len(), 2);
        assert!(matches!(root.children[0].children[0].kind, BoxKind::Inline(_)));
        assert!(matches!(root.children[0].children[1].kind, BoxKind::Inline(_)));
        assert_eq!(root.children[2].children.len(), 1);
    }

    #[test]
    fn inline_box_hosts_its_own_inline_children() {
        // span > text: no anonymous wrapper inside an inline box.
        let tree = inline(vec![text("x")]);
        let root = LayoutBox::build(&tree);
        assert_eq!(root.children.len(), 1);
        assert!(matches!(root.children[0].kind, BoxKind::Inline(_)));
    }

    #[test]
    fn anonymous_blocks_contain_only_inline_children() {
        let tree = block(vec![text("a"), text("b")]);
        let root = LayoutBox::build(&tree);
        assert_eq!(root.children.len(), 1);
        let anon = &root.children[0];
        assert!(matches!(anon.kind, BoxKind::AnonymousBlock));
        assert!(
            anon.children
                .iter()
                .all(|c| matches!(c.kind, BoxKind::Inline(_)))
        );
    }
}
