//! HTML parsing for the Wren rendering engine.
//!
//! Parsing proper is delegated to [html5ever](https://github.com/servo/html5ever),
//! the spec-compliant parser used across the Rust browser ecosystem; this
//! crate only converts html5ever's reference-counted DOM into the arena
//! [`DomTree`] the rest of the engine consumes.
//!
//! Text, comment, and doctype nodes are preserved verbatim — whitespace
//! collapsing and node pruning are cascade policy, not parser policy.

use html5ever::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use wren_dom::{DomTree, ElementData, NodeId, NodeType};

/// Parse an HTML string into a [`DomTree`].
///
/// html5ever performs full tree construction per the WHATWG HTML standard,
/// including the implied `html`/`head`/`body` elements.
#[must_use]
pub fn parse_html(html: &str) -> DomTree {
    let rcdom: RcDom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

    let mut tree = DomTree::new();
    for child in rcdom.document.children.borrow().iter() {
        convert_node(child, &mut tree, NodeId::ROOT);
    }
    tree
}

/// Convert one html5ever node (and its subtree) into the arena tree under
/// `parent`.
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        // A nested Document cannot occur below the root; nothing to do.
        NodeData::Document => {}

        NodeData::Doctype { name, .. } => {
            let id = tree.alloc(NodeType::Doctype(name.to_string()));
            tree.append_child(parent, id);
        }

        NodeData::Text { contents } => {
            let id = tree.alloc(NodeType::Text(contents.borrow().to_string()));
            tree.append_child(parent, id);
        }

        NodeData::Comment { contents } => {
            let id = tree.alloc(NodeType::Comment(contents.to_string()));
            tree.append_child(parent, id);
        }

        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let id = tree.alloc(NodeType::Element(ElementData {
                tag_name: name.local.to_string(),
                attrs,
            }));
            tree.append_child(parent, id);

            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id);
            }
        }

        NodeData::ProcessingInstruction { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_by_tag(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
        if tree.as_element(from).is_some_and(|e| e.tag_name == tag) {
            return Some(from);
        }
        for &child in tree.children(from) {
            if let Some(found) = find_by_tag(tree, child, tag) {
                return Some(found);
            }
        }
        None
    }

    #[test]
    fn parses_implied_document_structure() {
        let tree = parse_html("<p>hello</p>");
        let html = find_by_tag(&tree, tree.root(), "html").expect("html");
        let body = find_by_tag(&tree, tree.root(), "body").expect("body");
        let p = find_by_tag(&tree, tree.root(), "p").expect("p");

        assert_eq!(tree.parent(body), Some(html));
        assert_eq!(tree.parent(p), Some(body));
        assert_eq!(tree.as_text(tree.children(p)[0]), Some("hello"));
    }

    #[test]
    fn preserves_attributes() {
        let tree = parse_html(r#"<p id="test" class="a b"></p>"#);
        let p = find_by_tag(&tree, tree.root(), "p").expect("p");
        let data = tree.as_element(p).expect("element");
        assert_eq!(data.id().map(String::as_str), Some("test"));
        assert!(data.classes().contains("a"));
        assert!(data.classes().contains("b"));
    }

    #[test]
    fn preserves_style_element_text_verbatim() {
        let tree = parse_html("<style>p { color: red; }</style>");
        let style = find_by_tag(&tree, tree.root(), "style").expect("style");
        let children = tree.children(style);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.as_text(children[0]), Some("p { color: red; }"));
    }

    #[test]
    fn preserves_doctype_and_comment_nodes() {
        let tree = parse_html("<!DOCTYPE html><!-- note --><p></p>");
        let has_doctype = (0..tree.len())
            .any(|i| matches!(tree.get(NodeId(i)).map(|n| &n.node_type), Some(NodeType::Doctype(name)) if name == "html"));
        let has_comment = (0..tree.len())
            .any(|i| matches!(tree.get(NodeId(i)).map(|n| &n.node_type), Some(NodeType::Comment(_))));
        assert!(has_doctype);
        assert!(has_comment);
    }

    #[test]
    fn keeps_whitespace_text_nodes() {
        let tree = parse_html("<body><div></div>\n   <div></div></body>");
        let body = find_by_tag(&tree, tree.root(), "body").expect("body");
        let has_ws_text = tree
            .children(body)
            .iter()
            .any(|&c| tree.as_text(c).is_some_and(|t| t.trim().is_empty()));
        assert!(has_ws_text);
    }
}
