//! Render tree construction: the cascade applied to the DOM.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! The render tree is a pruned, annotated copy of the DOM: text nodes kept
//! verbatim (whitespace-collapsed), element nodes carrying only their tag
//! name, a flattened computed-style map, and children. Nodes whose computed
//! `display` is `none` are omitted entirely, together with their subtrees.
//!
//! The cascade here is intentionally simpler than CSS proper: rules are
//! scanned in order — built-in default rules first, then document rules in
//! source order — and for every rule whose selector group matches, all of
//! its declarations are overlaid. The last written value for a property
//! wins. There is no specificity computation and no inheritance.

use std::collections::HashMap;

use wren_common::warning::warn_once;
use wren_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::default_styles::default_stylesheet;
use crate::error::StyleError;
use crate::style::{StyleRule, parse_stylesheet};

/// Flattened computed style for one element: property name → raw value.
/// Keys are unique; the last writer during the cascade scan wins.
pub type StyleMap = HashMap<String, String>;

/// A node of the render tree.
///
/// Built once per document parse and immutable afterwards; the interactive
/// editing path rebuilds the whole tree from scratch on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// A rendered element with its flattened computed style.
    Element {
        /// The element's tag name.
        tag_name: String,
        /// Computed style mapping (property name → raw value).
        style: StyleMap,
        /// Rendered children, in document order.
        children: Vec<RenderNode>,
    },
    /// A run of document text, whitespace-collapsed.
    Text {
        /// The text content.
        contents: String,
    },
}

impl RenderNode {
    /// The element's tag name, for element nodes.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Element { tag_name, .. } => Some(tag_name),
            Self::Text { .. } => None,
        }
    }

    /// The computed style map, for element nodes. Text nodes carry no style
    /// of their own.
    #[must_use]
    pub fn style(&self) -> Option<&StyleMap> {
        match self {
            Self::Element { style, .. } => Some(style),
            Self::Text { .. } => None,
        }
    }

    /// Look up a computed property value on an element node.
    #[must_use]
    pub fn style_value(&self, name: &str) -> Option<&str> {
        self.style().and_then(|s| s.get(name)).map(String::as_str)
    }

    /// [CSS Display Level 3 § 2](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Whether this node is block-level: an element whose computed
    /// `display` is exactly `block`. Text is always inline-level.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.style_value("display") == Some("block")
    }

    /// The rendered children. Text nodes have none.
    #[must_use]
    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text { .. } => &[],
        }
    }
}

/// Build the render tree for a document.
///
/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// Collects every `<style>` element's text in document order, parses it
/// into rules appended after the built-in default rules, then walks the
/// DOM applying the cascade. Returns the first rendered top-level element
/// (`None` for a document with no renderable content); extra top-level
/// elements are dropped with a diagnostic.
///
/// # Errors
///
/// Propagates any [`StyleError`] from stylesheet parsing. Parse errors are
/// fatal for the whole document: no partial render tree is returned.
pub fn build_render_tree(dom: &DomTree) -> Result<Option<RenderNode>, StyleError> {
    let mut rules: Vec<StyleRule> = default_stylesheet().rules.clone();
    collect_style_rules(dom, dom.root(), &mut rules)?;

    // Only the first top-level element is rendered. This mirrors the
    // reference engine; multi-root documents get a diagnostic.
    let element_roots = dom
        .children(dom.root())
        .iter()
        .filter(|&&id| dom.as_element(id).is_some())
        .count();
    if element_roots > 1 {
        warn_once(
            "CSS",
            "document has multiple top-level elements; only the first is rendered",
        );
    }

    for &child in dom.children(dom.root()) {
        if let Some(node) = build_node(dom, child, &rules) {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// [HTML § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
///
/// Recursively collect and parse the text content of every `<style>`
/// element, in document order, appending the parsed rules to `rules`.
/// Only descends into element/document nodes; text and comment nodes have
/// no element children.
fn collect_style_rules(
    dom: &DomTree,
    id: NodeId,
    rules: &mut Vec<StyleRule>,
) -> Result<(), StyleError> {
    let Some(node) = dom.get(id) else {
        return Ok(());
    };

    match &node.node_type {
        NodeType::Element(data) if data.tag_name.eq_ignore_ascii_case("style") => {
            // The style element's content must be a single text node;
            // anything else is skipped with a diagnostic.
            let children = dom.children(id);
            match children {
                [] => {}
                [only] if dom.as_text(*only).is_some() => {
                    let css = dom.as_text(*only).unwrap_or_default();
                    rules.extend(parse_stylesheet(css)?.rules);
                }
                _ => warn_once(
                    "CSS",
                    "<style> content is not a single text node; skipping it",
                ),
            }
        }
        NodeType::Document | NodeType::Element(_) => {
            for &child in dom.children(id) {
                collect_style_rules(dom, child, rules)?;
            }
        }
        NodeType::Text(_) | NodeType::Comment(_) | NodeType::Doctype(_) => {}
    }

    Ok(())
}

/// Build the render tree node for one DOM node, or `None` if the node does
/// not render (comments, doctypes, whitespace-only text, `display: none`
/// subtrees).
fn build_node(dom: &DomTree, id: NodeId, rules: &[StyleRule]) -> Option<RenderNode> {
    let node = dom.get(id)?;

    match &node.node_type {
        // [CSS Text Level 3 § 4.1](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
        //
        // Collapse whitespace runs to a single space. A node that collapses
        // to exactly one space is pure inter-element formatting and is
        // dropped so it cannot pollute layout.
        NodeType::Text(text) => {
            let contents = collapse_whitespace(text);
            if contents == " " {
                return None;
            }
            Some(RenderNode::Text { contents })
        }

        NodeType::Comment(_) | NodeType::Doctype(_) | NodeType::Document => None,

        NodeType::Element(data) => {
            let style = computed_style(data, rules);

            // [CSS Display Level 3 § 2.6](https://www.w3.org/TR/css-display-3/#valdef-display-none)
            //
            // "The element and its descendants generate no boxes or text
            // runs." The subtree is pruned without recursing.
            if style.get("display").map(String::as_str) == Some("none") {
                return None;
            }

            let children = dom
                .children(id)
                .iter()
                .filter_map(|&child| build_node(dom, child, rules))
                .collect();

            Some(RenderNode::Element {
                tag_name: data.tag_name.clone(),
                style,
                children,
            })
        }
    }
}

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
///
/// Overlay every matching rule's declarations onto an empty map, in scan
/// order. The rule list already has default rules before document rules,
/// so a later document declaration overrides an earlier default one.
fn computed_style(element: &ElementData, rules: &[StyleRule]) -> StyleMap {
    let mut style = StyleMap::new();
    for rule in rules {
        if rule.selectors.iter().any(|sel| sel.matches(element)) {
            for decl in &rule.declarations {
                let _ = style.insert(decl.name.clone(), decl.value.clone());
            }
        }
    }
    style
}

/// Collapse every run of whitespace to a single space character.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_dom::{DomTree, ElementData, NodeType};

    /// Build `<html><head><style>{css}</style></head><body>{child}</body></html>`
    /// with `child` attached by the given closure.
    fn dom_with_css(css: &str, attach_body_children: impl FnOnce(&mut DomTree, NodeId)) -> DomTree {
        let mut dom = DomTree::new();
        let html = dom.alloc(NodeType::Element(ElementData::new("html", &[])));
        dom.append_child(dom.root(), html);

        let head = dom.alloc(NodeType::Element(ElementData::new("head", &[])));
        dom.append_child(html, head);
        let style = dom.alloc(NodeType::Element(ElementData::new("style", &[])));
        dom.append_child(head, style);
        let css_text = dom.alloc(NodeType::Text(css.to_string()));
        dom.append_child(style, css_text);

        let body = dom.alloc(NodeType::Element(ElementData::new("body", &[])));
        dom.append_child(html, body);
        attach_body_children(&mut dom, body);
        dom
    }

    /// Find the rendered `<body>` under the root. With the default rules
    /// alone the head is pruned and body is the only child, but a document
    /// `* { display: inline; }` rule overrides the default
    /// `head { display: none; }` (last declaration wins), so the body is
    /// located by tag rather than by index.
    fn body_of(root: &RenderNode) -> &RenderNode {
        root.children()
            .iter()
            .find(|c| c.tag_name() == Some("body"))
            .expect("body should render")
    }

    #[test]
    fn default_display_is_block() {
        let dom = dom_with_css("", |dom, body| {
            let p = dom.alloc(NodeType::Element(ElementData::new(
                "p",
                &[("id", "test")],
            )));
            dom.append_child(body, p);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        assert!(root.is_block());
        let p = &body_of(&root).children()[0];
        assert!(p.is_block());
        assert!(p.children().is_empty());
    }

    #[test]
    fn universal_rule_overrides_default_display() {
        let dom = dom_with_css("* { display: inline; }", |dom, body| {
            let p = dom.alloc(NodeType::Element(ElementData::new("p", &[])));
            dom.append_child(body, p);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert!(!p.is_block());
        assert_eq!(p.style_value("display"), Some("inline"));
    }

    #[test]
    fn rule_for_other_tag_does_not_apply() {
        let dom = dom_with_css("div { display: block; }", |dom, body| {
            let span = dom.alloc(NodeType::Element(ElementData::new("span", &[])));
            dom.append_child(body, span);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let span = &body_of(&root).children()[0];
        // span stays at its default inline display.
        assert_eq!(span.style_value("display"), Some("inline"));
    }

    #[test]
    fn later_matching_rule_wins() {
        let dom = dom_with_css(
            "* { display: block; } p { display: inline; color: red; }",
            |dom, body| {
                let p = dom.alloc(NodeType::Element(ElementData::new("p", &[])));
                dom.append_child(body, p);
            },
        );
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert_eq!(p.style_value("display"), Some("inline"));
        assert_eq!(p.style_value("color"), Some("red"));
    }

    #[test]
    fn cascade_is_source_order_not_specificity() {
        // The id rule appears first; the class rule appears later and wins
        // even though an id selector is more specific in real CSS.
        let dom = dom_with_css(
            "#test { color: red; } .test { color: blue; }",
            |dom, body| {
                let p = dom.alloc(NodeType::Element(ElementData::new(
                    "p",
                    &[("id", "test"), ("class", "test")],
                )));
                dom.append_child(body, p);
            },
        );
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert_eq!(p.style_value("color"), Some("blue"));
    }

    #[test]
    fn attribute_selector_matches_by_value() {
        let dom = dom_with_css(
            "* { display: inline; } p[id=test] { color: red; }",
            |dom, body| {
                let p = dom.alloc(NodeType::Element(ElementData::new(
                    "p",
                    &[("id", "test")],
                )));
                dom.append_child(body, p);
            },
        );
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert_eq!(p.style_value("color"), Some("red"));
    }

    #[test]
    fn attribute_selector_mismatch_does_not_apply() {
        let dom = dom_with_css(
            "* { display: inline; } p[id=hello] { color: red; }",
            |dom, body| {
                let p = dom.alloc(NodeType::Element(ElementData::new(
                    "p",
                    &[("id", "test")],
                )));
                dom.append_child(body, p);
            },
        );
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert_eq!(p.style_value("color"), None);
    }

    #[test]
    fn display_none_prunes_the_whole_subtree() {
        let dom = dom_with_css("p { display: none; }", |dom, body| {
            let div = dom.alloc(NodeType::Element(ElementData::new("div", &[])));
            dom.append_child(body, div);
            let p = dom.alloc(NodeType::Element(ElementData::new("p", &[])));
            dom.append_child(div, p);
            let inner = dom.alloc(NodeType::Text("hidden".to_string()));
            dom.append_child(p, inner);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let div = &body_of(&root).children()[0];
        assert_eq!(
            div.children().len(),
            0,
            "the display:none subtree must vanish entirely"
        );
    }

    #[test]
    fn display_none_root_yields_empty_tree() {
        let mut dom = DomTree::new();
        let html = dom.alloc(NodeType::Element(ElementData::new("html", &[])));
        dom.append_child(dom.root(), html);
        let style = dom.alloc(NodeType::Element(ElementData::new("style", &[])));
        dom.append_child(html, style);
        let css = dom.alloc(NodeType::Text("html { display: none; }".to_string()));
        dom.append_child(style, css);

        assert_eq!(build_render_tree(&dom).unwrap(), None);
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let dom = dom_with_css("", |dom, body| {
            let ws = dom.alloc(NodeType::Text("\n    ".to_string()));
            dom.append_child(body, ws);
            let text = dom.alloc(NodeType::Text("  hello\n  world  ".to_string()));
            dom.append_child(body, text);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let body = body_of(&root);
        assert_eq!(body.children().len(), 1);
        assert_eq!(
            body.children()[0],
            RenderNode::Text {
                contents: " hello world ".to_string()
            }
        );
    }

    #[test]
    fn comments_and_doctypes_are_dropped() {
        let mut dom = DomTree::new();
        let doctype = dom.alloc(NodeType::Doctype("html".to_string()));
        dom.append_child(dom.root(), doctype);
        let html = dom.alloc(NodeType::Element(ElementData::new("html", &[])));
        dom.append_child(dom.root(), html);
        let comment = dom.alloc(NodeType::Comment("nothing".to_string()));
        dom.append_child(html, comment);

        let root = build_render_tree(&dom).unwrap().expect("tree");
        assert!(root.children().is_empty());
    }

    #[test]
    fn first_top_level_element_wins() {
        let mut dom = DomTree::new();
        let first = dom.alloc(NodeType::Element(ElementData::new("div", &[])));
        dom.append_child(dom.root(), first);
        let second = dom.alloc(NodeType::Element(ElementData::new("p", &[])));
        dom.append_child(dom.root(), second);

        let root = build_render_tree(&dom).unwrap().expect("tree");
        match root {
            RenderNode::Element { tag_name, .. } => assert_eq!(tag_name, "div"),
            RenderNode::Text { .. } => panic!("expected an element root"),
        }
    }

    #[test]
    fn malformed_css_aborts_with_no_tree() {
        let dom = dom_with_css("@import url(x);", |_, _| {});
        assert!(matches!(
            build_render_tree(&dom),
            Err(StyleError::UnsupportedCssRule(_))
        ));
    }

    #[test]
    fn default_paragraph_margins_apply() {
        let dom = dom_with_css("", |dom, body| {
            let p = dom.alloc(NodeType::Element(ElementData::new("p", &[])));
            dom.append_child(body, p);
        });
        let root = build_render_tree(&dom).unwrap().expect("tree");
        let p = &body_of(&root).children()[0];
        assert_eq!(p.style_value("margin-top"), Some("16"));
        assert_eq!(p.style_value("margin-bottom"), Some("16"));
    }
}
