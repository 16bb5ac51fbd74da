//! Stylesheet parsing: rules, selectors, and declarations.
//!
//! [CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/)
//!
//! This is a deliberately small parser for the supported subset: a
//! stylesheet is a sequence of style rules, each a comma-separated selector
//! list followed by a `{ name: value; ... }` declaration block. Comments
//! are stripped; at-rules are rejected as unsupported (fatal for the whole
//! stylesheet, matching the reference behavior of treating any non-style
//! rule as an error).

use serde::Serialize;

use crate::error::StyleError;
use crate::selector::{Selector, parse_selector_list};

/// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
///
/// A CSS declaration (e.g. `color: red`). Values are kept as raw trimmed
/// strings; interpretation happens at the consumer (layout parses lengths
/// leniently, paint parses border keywords and colors).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The property name.
    pub name: String,
    /// The property value, verbatim.
    pub value: String,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
///
/// A style rule: selector list plus an ordered declaration list.
/// Declaration order within a stylesheet determines cascade precedence —
/// the later declaration for a property wins; there is no specificity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    /// The comma-separated selector group of this rule.
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block, in source order.
    pub declarations: Vec<Declaration>,
}

/// [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// A parsed CSS stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Stylesheet {
    /// The style rules, in source order.
    pub rules: Vec<StyleRule>,
}

/// Parse CSS text into a [`Stylesheet`].
///
/// # Errors
///
/// Any malformed rule aborts the whole parse: selector errors propagate
/// from [`parse_selector_list`], at-rules yield
/// [`StyleError::UnsupportedCssRule`], and a rule prelude without a
/// declaration block is also reported as an unsupported rule. No partial
/// stylesheet is returned.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, StyleError> {
    let source = strip_comments(css);
    let mut rules = Vec::new();
    let mut rest = source.trim_start();

    while !rest.is_empty() {
        // [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
        //
        // At-rules are outside the supported subset. Report the at-keyword.
        if let Some(after_at) = rest.strip_prefix('@') {
            let name: String = after_at
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            return Err(StyleError::UnsupportedCssRule(format!("@{name}")));
        }

        // Selector prelude runs up to the opening brace.
        let Some(brace) = rest.find('{') else {
            return Err(StyleError::UnsupportedCssRule(rest.trim().to_string()));
        };
        let prelude = &rest[..brace];
        let after_prelude = &rest[brace + 1..];

        // Declaration block runs up to the closing brace.
        let Some(close) = after_prelude.find('}') else {
            return Err(StyleError::UnsupportedCssRule(prelude.trim().to_string()));
        };
        let block = &after_prelude[..close];

        let selectors = parse_selector_list(prelude)?;
        let declarations = parse_declarations(block);
        rules.push(StyleRule {
            selectors,
            declarations,
        });

        rest = after_prelude[close + 1..].trim_start();
    }

    Ok(Stylesheet { rules })
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
///
/// Split a declaration block on `;`, then each entry on the first `:`.
/// Entries without a colon are dropped (lenient, per the CSS error
/// recovery rules for declarations).
fn parse_declarations(block: &str) -> Vec<Declaration> {
    block
        .split(';')
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
///
/// Remove `/* ... */` comments. An unterminated comment swallows the rest
/// of the input, per the spec's EOF error recovery.
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
