//! Built-in default stylesheet.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents
//! elements of HTML documents in ways consistent with general user
//! expectations."
//!
//! Default rules always precede document rules in the cascade scan, so any
//! document declaration for the same property overrides them (there is no
//! specificity here — later declarations simply win).

use std::sync::OnceLock;

use crate::style::{Stylesheet, parse_stylesheet};

/// [WHATWG HTML § 15.3 Rendering — suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// Baseline rules for the elements this engine understands. Lengths are
/// pixels; bare numbers are accepted by the lenient length parser. The
/// `margin-block` entries are kept for table fidelity even though block
/// layout reads only the `margin`/`margin-*` spellings.
const DEFAULT_CSS: &str = "
* { display: block; }
head, style { display: none; }
span { display: inline; }
body { display: block; margin: 8; }
p, dl { display: block; margin-top: 16; margin-bottom: 16; }
dd { display: block; margin-left: 40px; }
blockquote, figure { display: block; margin-block: 16; }
address, center { display: block; }
h1 { margin-top: 26; margin-bottom: 26; }
h2 { margin-top: 26; margin-bottom: 26; }
h3 { margin-top: 25; margin-bottom: 25; }
h4 { margin-top: 25; margin-bottom: 25; }
h5 { margin-top: 24; margin-bottom: 24; }
h6 { margin-top: 24; margin-bottom: 24; }
";

/// Return the parsed default stylesheet, parsing only once.
///
/// # Panics
///
/// Panics if the built-in CSS source fails to parse; that is a bug in the
/// table above, not an input error.
pub fn default_stylesheet() -> &'static Stylesheet {
    static STYLESHEET: OnceLock<Stylesheet> = OnceLock::new();
    STYLESHEET.get_or_init(|| {
        parse_stylesheet(DEFAULT_CSS).expect("built-in default stylesheet must parse")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    #[test]
    fn default_stylesheet_parses() {
        let sheet = default_stylesheet();
        assert!(!sheet.rules.is_empty());
    }

    #[test]
    fn universal_block_rule_comes_first() {
        let sheet = default_stylesheet();
        let first = &sheet.rules[0];
        assert_eq!(first.selectors, vec![Selector::Universal]);
        assert_eq!(first.declarations[0].name, "display");
        assert_eq!(first.declarations[0].value, "block");
    }

    #[test]
    fn head_and_style_are_hidden() {
        let sheet = default_stylesheet();
        let hidden = sheet
            .rules
            .iter()
            .find(|r| {
                r.selectors.contains(&Selector::Type {
                    tag_name: "head".to_string(),
                })
            })
            .expect("head rule should exist");
        assert!(
            hidden
                .declarations
                .iter()
                .any(|d| d.name == "display" && d.value == "none")
        );
    }
}
