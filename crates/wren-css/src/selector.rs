//! CSS selector parsing and matching.
//!
//! This module implements the simple-selector subset per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/): universal, type,
//! class, id, and single attribute selectors with the `=` and `~=`
//! operators. Combinators and pseudo-classes are rejected at parse time.

use serde::Serialize;
use wren_dom::ElementData;

use crate::error::StyleError;

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// The attribute comparison operators supported by [`Selector::Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeOperator {
    /// `[attr=value]` — exact value equality.
    Equals,
    /// `[attr~=value]` — value *contains* the target as a substring.
    ///
    /// NOTE: real CSS defines `~=` as whitespace-token containment; this
    /// engine deliberately matches on substring containment instead.
    Includes,
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element. Selectors are
/// immutable and produced once per stylesheet parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selector {
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type."
    Type {
        /// The element tag name to match exactly.
        tag_name: String,
    },

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value."
    Id {
        /// The required value of the element's `id` attribute.
        id: String,
    },

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class {
        /// The class token that must appear in the `class` attribute.
        class_name: String,
    },

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// `tag[attr=value]` / `tag[attr~=value]` — a type selector qualified by
    /// a single attribute condition.
    Attribute {
        /// The element tag name to match exactly.
        tag_name: String,
        /// The comparison operator between attribute value and target.
        operator: AttributeOperator,
        /// The attribute name to look up.
        attribute: String,
        /// The target value for the comparison.
        value: String,
    },
}

impl Selector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Check whether this selector matches the given element. Pure, no side
    /// effects.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            // "The universal selector... represents the qualified name of
            // any element type."
            Self::Universal => true,

            // "A type selector... represents an instance of that element
            // type in the document tree."
            Self::Type { tag_name } => element.tag_name == *tag_name,

            // "An ID selector represents an element instance that has an
            // identifier that matches the identifier in the ID selector."
            Self::Id { id } => element.id().is_some_and(|el_id| el_id == id),

            // "The class selector... authors can use the 'period' (.)
            // notation." Absent class attribute never matches.
            Self::Class { class_name } => element.classes().contains(class_name.as_str()),

            // Attribute selectors require the tag name to match as well as
            // the attribute condition.
            Self::Attribute {
                tag_name,
                operator,
                attribute,
                value,
            } => {
                if element.tag_name != *tag_name {
                    return false;
                }
                let Some(actual) = element.attrs.get(attribute) else {
                    return false;
                };
                match operator {
                    AttributeOperator::Equals => actual == value,
                    AttributeOperator::Includes => actual.contains(value.as_str()),
                }
            }
        }
    }
}

/// Parse a comma-separated selector list (the prelude of a style rule).
///
/// [§ 5.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A comma-separated list of selectors represents the union of all
/// elements selected by each of the individual selectors in the list."
///
/// # Errors
///
/// Returns [`StyleError::InvalidSelector`] for selectors that conform to no
/// supported form (including attribute selectors with unknown operators),
/// and [`StyleError::UnsupportedSelectorType`] for recognizable CSS that is
/// outside the supported subset (combinators, pseudo-classes, compound
/// suffixes).
pub fn parse_selector_list(selector_text: &str) -> Result<Vec<Selector>, StyleError> {
    selector_text.split(',').map(parse_simple_selector).collect()
}

/// Parse one simple selector (a single entry of a comma-separated list).
fn parse_simple_selector(raw: &str) -> Result<Selector, StyleError> {
    let trimmed = raw.trim();

    match trimmed.chars().next() {
        None => Err(StyleError::InvalidSelector(raw.to_string())),

        // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
        Some('*') => Ok(Selector::Universal),

        // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
        Some('#') => Ok(Selector::Id {
            id: trimmed[1..].to_string(),
        }),

        // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
        Some('.') => Ok(Selector::Class {
            class_name: trimmed[1..].to_string(),
        }),

        // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
        // possibly qualified by a single attribute condition.
        Some(first) => {
            // Tag names start with a letter; digits may follow (h1..h6).
            if !first.is_ascii_alphabetic() {
                return Err(StyleError::InvalidSelector(trimmed.to_string()));
            }
            let tag_len = trimmed
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .count();
            let tag_name = &trimmed[..tag_len];
            let after_tag = trimmed[tag_len..].trim_start();

            if after_tag.is_empty() {
                return Ok(Selector::Type {
                    tag_name: tag_name.to_string(),
                });
            }

            match after_tag.chars().next() {
                // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
                Some('[') => parse_attribute_suffix(trimmed, tag_name, after_tag),

                // Combinators, pseudo-classes, and compound suffixes are
                // recognizable CSS but outside the supported subset.
                Some(':' | '>' | '+' | '~' | '.' | '#') => {
                    Err(StyleError::UnsupportedSelectorType(trimmed.to_string()))
                }
                Some(c) if c.is_ascii_alphanumeric() || c == '*' => {
                    // A second compound after whitespace is a descendant
                    // combinator (`div p`).
                    Err(StyleError::UnsupportedSelectorType(trimmed.to_string()))
                }
                _ => Err(StyleError::InvalidSelector(trimmed.to_string())),
            }
        }
    }
}

/// Parse the `[attr=value]` / `[attr~=value]` suffix of an attribute
/// selector. `full` is the whole selector text, used for error reporting.
fn parse_attribute_suffix(
    full: &str,
    tag_name: &str,
    suffix: &str,
) -> Result<Selector, StyleError> {
    let invalid = || StyleError::InvalidSelector(full.to_string());

    let inner = suffix
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;

    // Attribute name: one or more ASCII letters.
    let name_len = inner
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if name_len == 0 {
        return Err(invalid());
    }
    let attribute = &inner[..name_len];
    let rest = &inner[name_len..];

    // Operator: `=` or `~=`. Anything else is an invalid selector.
    let (operator, rest) = if let Some(rest) = rest.strip_prefix("~=") {
        (AttributeOperator::Includes, rest)
    } else if let Some(rest) = rest.strip_prefix('=') {
        (AttributeOperator::Equals, rest)
    } else {
        return Err(invalid());
    };

    // Value, optionally double-quoted. Quotes and `]` cannot appear inside.
    let value = rest
        .strip_prefix('"')
        .map_or(rest, |v| v.strip_suffix('"').unwrap_or(v));
    if value.is_empty() || value.contains('"') {
        return Err(invalid());
    }

    Ok(Selector::Attribute {
        tag_name: tag_name.to_string(),
        operator,
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_type_selector() {
        assert_eq!(
            parse_selector_list("rule").unwrap(),
            vec![Selector::Type {
                tag_name: "rule".to_string()
            }]
        );
    }

    #[test]
    fn parse_attribute_selector_with_whitespace() {
        assert_eq!(
            parse_selector_list("test   [foo=bar]").unwrap(),
            vec![Selector::Attribute {
                tag_name: "test".to_string(),
                operator: AttributeOperator::Equals,
                attribute: "foo".to_string(),
                value: "bar".to_string(),
            }]
        );
    }

    #[test]
    fn parse_comma_separated_attribute_selectors() {
        assert_eq!(
            parse_selector_list("test [bar=baz], testtest[piyo~=guoo]").unwrap(),
            vec![
                Selector::Attribute {
                    tag_name: "test".to_string(),
                    operator: AttributeOperator::Equals,
                    attribute: "bar".to_string(),
                    value: "baz".to_string(),
                },
                Selector::Attribute {
                    tag_name: "testtest".to_string(),
                    operator: AttributeOperator::Includes,
                    attribute: "piyo".to_string(),
                    value: "guoo".to_string(),
                },
            ]
        );
    }

    #[test]
    fn parse_class_and_id_list() {
        assert_eq!(
            parse_selector_list(".klass,#id").unwrap(),
            vec![
                Selector::Class {
                    class_name: "klass".to_string()
                },
                Selector::Id {
                    id: "id".to_string()
                },
            ]
        );
    }

    #[test]
    fn parse_universal_selector() {
        assert_eq!(parse_selector_list("*").unwrap(), vec![Selector::Universal]);
    }

    #[test]
    fn parse_quoted_attribute_value() {
        assert_eq!(
            parse_selector_list(r#"a[href="x"]"#).unwrap(),
            vec![Selector::Attribute {
                tag_name: "a".to_string(),
                operator: AttributeOperator::Equals,
                attribute: "href".to_string(),
                value: "x".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_attribute_operator_is_invalid() {
        assert!(matches!(
            parse_selector_list("a[href^=x]"),
            Err(StyleError::InvalidSelector(_))
        ));
    }

    #[test]
    fn combinators_are_unsupported() {
        assert!(matches!(
            parse_selector_list("div p"),
            Err(StyleError::UnsupportedSelectorType(_))
        ));
        assert!(matches!(
            parse_selector_list("ul > li"),
            Err(StyleError::UnsupportedSelectorType(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            parse_selector_list("123"),
            Err(StyleError::InvalidSelector(_))
        ));
        assert!(matches!(
            parse_selector_list(""),
            Err(StyleError::InvalidSelector(_))
        ));
    }

    #[test]
    fn type_selector_matches_exact_tag() {
        let p = ElementData::new("p", &[]);
        let div = ElementData::new("div", &[]);
        let sel = Selector::Type {
            tag_name: "p".to_string(),
        };
        assert!(sel.matches(&p));
        assert!(!sel.matches(&div));
    }

    #[test]
    fn class_selector_matches_token_in_class_list() {
        let el = ElementData::new("p", &[("class", "a b c")]);
        let hit = Selector::Class {
            class_name: "b".to_string(),
        };
        let miss = Selector::Class {
            class_name: "d".to_string(),
        };
        assert!(hit.matches(&el));
        assert!(!miss.matches(&el));

        // Absent class attribute never matches.
        let bare = ElementData::new("p", &[]);
        assert!(!hit.matches(&bare));
    }

    #[test]
    fn id_selector_requires_exact_match() {
        let el = ElementData::new("p", &[("id", "main")]);
        assert!(
            Selector::Id {
                id: "main".to_string()
            }
            .matches(&el)
        );
        assert!(
            !Selector::Id {
                id: "mai".to_string()
            }
            .matches(&el)
        );
    }

    #[test]
    fn attribute_equals_requires_exact_value_and_tag() {
        let el = ElementData::new("input", &[("type", "text")]);
        let sel = Selector::Attribute {
            tag_name: "input".to_string(),
            operator: AttributeOperator::Equals,
            attribute: "type".to_string(),
            value: "text".to_string(),
        };
        assert!(sel.matches(&el));

        let wrong_tag = ElementData::new("button", &[("type", "text")]);
        assert!(!sel.matches(&wrong_tag));
    }

    #[test]
    fn attribute_includes_is_substring_containment() {
        // Substring containment, not whitespace-token containment: "ab"
        // matches inside "slab" even though it is not a standalone token.
        let el = ElementData::new("div", &[("data", "slab")]);
        let sel = Selector::Attribute {
            tag_name: "div".to_string(),
            operator: AttributeOperator::Includes,
            attribute: "data".to_string(),
            value: "ab".to_string(),
        };
        assert!(sel.matches(&el));
    }
}
