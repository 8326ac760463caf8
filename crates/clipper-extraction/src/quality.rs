//! Content quality gate (§4.3 step 3): a content result is acceptable
//! iff it is long enough and does not read like navigation chrome.

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum acceptable content length in characters.
pub const MIN_CONTENT_CHARS: usize = 100;

static LOW_QUALITY_PREFIXES: &[&str] = &[
    "home about contact",
    "menu",
    "skip to content",
    "subscribe",
    "sign in",
    "log in",
    "advertisement",
    "cookie",
];

static REPEATED_SHORT_PHRASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w{1,8})\b(?:\s+\1\b){2,}").unwrap());

/// True when `text` passes the quality gate: long enough, not
/// menu/nav/footer-like, not dominated by repeated short phrases or
/// non-alphanumeric characters.
pub fn passes_quality_gate(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < MIN_CONTENT_CHARS {
        return false;
    }
    if looks_like_navigation(trimmed) {
        return false;
    }
    if has_repeated_short_phrases(trimmed) {
        return false;
    }
    if mostly_non_alphanumeric(trimmed) {
        return false;
    }
    true
}

fn looks_like_navigation(text: &str) -> bool {
    let lower = text.to_lowercase();
    LOW_QUALITY_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

fn has_repeated_short_phrases(text: &str) -> bool {
    REPEATED_SHORT_PHRASE.is_match(&text.to_lowercase())
}

fn mostly_non_alphanumeric(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return true;
    }
    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    (alnum as f64 / total as f64) < 0.5
}
