//! Selector sanitisation (§4.2 step 3). A selector that cannot be
//! cleaned into something safe becomes `undefined`, never cached.

use clipper_types::text_patterns::looks_like_textual_content;
use once_cell::sync::Lazy;
use regex::Regex;

static UNSUPPORTED_PSEUDO: Lazy<Regex> = Lazy::new(|| Regex::new(r":(contains|has)\([^)]*\)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub const UNDEFINED: &str = "undefined";

/// Strip unsupported pseudo-classes, collapse whitespace, and reject
/// any selector that reads like page text rather than a CSS query.
/// This is idempotent: sanitising an already-sanitised selector
/// returns the same selector (§8 round-trip law).
pub fn sanitize_selector(raw: &str) -> String {
    let without_pseudo = UNSUPPORTED_PSEUDO.replace_all(raw, "");
    let collapsed = WHITESPACE.replace_all(without_pseudo.trim(), " ").trim().to_string();

    if collapsed.is_empty() || looks_like_textual_content(&collapsed) {
        return UNDEFINED.to_string();
    }

    collapsed
}

pub fn is_undefined(selector: &str) -> bool {
    selector.trim().eq_ignore_ascii_case(UNDEFINED) || selector.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_contains_and_has() {
        assert_eq!(sanitize_selector("div:contains(Login)"), "div");
        assert_eq!(sanitize_selector("article:has(.ad)"), "article");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_selector("  article   .body  "), "article .body");
    }

    #[test]
    fn rejects_textual_content_to_undefined() {
        assert_eq!(sanitize_selector("By Jane Smith"), UNDEFINED);
    }

    #[test]
    fn sanitisation_is_idempotent() {
        let once = sanitize_selector("div:contains(x)  .body");
        let twice = sanitize_selector(&once);
        assert_eq!(once, twice);
    }
}
