//! Shared textual-content detection used to reject selectors (and
//! extracted author/date strings) that are actually page text rather
//! than a CSS query — month names, "By ...", date/time formats.

use once_cell::sync::Lazy;
use regex::Regex;

static MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\b").unwrap()
});

static BY_AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*by\s+\S").unwrap());

static PUBLISHED_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*published\s*:").unwrap());

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,4}[-/]\d{1,2}[-/]\d{1,4}\b").unwrap()
});

static TIME_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}:\d{2}(:\d{2})?\s*(am|pm|AM|PM)?\b").unwrap());

static PARENTHESISED_TZ: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([A-Z]{2,5}\)").unwrap());

/// True when `s` reads like prose/date content rather than a CSS
/// selector. Used both to reject LLM-returned selectors (§4.2 step 3)
/// and to enforce the `SelectorConfig` cache invariant (§3).
pub fn looks_like_textual_content(s: &str) -> bool {
    // A real CSS selector is made of identifiers, combinators and
    // punctuation; free text contains spaces between words that are
    // not selector syntax. Cheap heuristic: multiple space-separated
    // alphabetic words combined with any of the patterns below.
    if BY_AUTHOR.is_match(s) || PUBLISHED_PREFIX.is_match(s) {
        return true;
    }
    if MONTH_NAME.is_match(s) && s.contains(' ') {
        return true;
    }
    if DATE_LIKE.is_match(s) || TIME_LIKE.is_match(s) || PARENTHESISED_TZ.is_match(s) {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_author_line() {
        assert!(looks_like_textual_content("By Jane Smith"));
    }

    #[test]
    fn detects_month_name_phrase() {
        assert!(looks_like_textual_content("Published January 5, 2024"));
    }

    #[test]
    fn detects_date_formats() {
        assert!(looks_like_textual_content("2024-01-05"));
        assert!(looks_like_textual_content("01/05/2024"));
    }

    #[test]
    fn detects_time_and_timezone() {
        assert!(looks_like_textual_content("3:45 PM (EST)"));
    }

    #[test]
    fn accepts_real_selectors() {
        assert!(!looks_like_textual_content("h1.article-title"));
        assert!(!looks_like_textual_content(".post-content p"));
        assert!(!looks_like_textual_content("article > div.body"));
        assert!(!looks_like_textual_content("[data-testid=author]"));
    }
}
