//! Multi-attempt recovery (§4.3 step 5): used when AI re-analysis is
//! unavailable or too weak. Confidence decreases per attempt.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

const MIN_PARAGRAPH_LEN: usize = 20;

static NAVIGATION_PHRASES: &[&str] = &[
    "home",
    "about",
    "contact",
    "subscribe",
    "sign in",
    "privacy policy",
    "terms of service",
    "all rights reserved",
    "follow us",
];

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());
static SCRIPT_STYLE_NOSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</\1>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// A recovered body plus the confidence assigned to it (§4.3 step 5:
/// "confidence decreases per attempt").
pub struct RecoveryResult {
    pub text: String,
    pub confidence: f32,
}

/// Attempt (a): re-parse in a lenient "XML-mode" pass and pull out
/// any element text, in document order. Distinct from the main
/// extractor pass in that it does not rely on any selector matching —
/// it reads the whole body.
pub fn attempt_xml_mode(html: &str) -> Option<RecoveryResult> {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").ok()?;
    let body = document.select(&body_selector).next()?;
    let text: String = body.text().collect::<Vec<_>>().join(" ");
    let cleaned = collapse_whitespace(&text);
    if cleaned.is_empty() {
        return None;
    }
    Some(RecoveryResult { text: cleaned, confidence: 0.45 })
}

/// Attempt (b): aggressively strip script/style/noscript/comments,
/// then pull semantic-element (`article`, `main`, `section`) text.
pub fn attempt_semantic_strip(html: &str) -> Option<RecoveryResult> {
    let stripped = COMMENT.replace_all(html, "");
    let stripped = SCRIPT_STYLE_NOSCRIPT.replace_all(&stripped, "");
    let document = Html::parse_document(&stripped);
    let selector = Selector::parse("article, main, section").ok()?;
    let mut parts = Vec::new();
    for el in document.select(&selector) {
        let text: String = el.text().collect::<Vec<_>>().join(" ");
        let cleaned = collapse_whitespace(&text);
        if !cleaned.is_empty() {
            parts.push(cleaned);
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(RecoveryResult { text: parts.join("\n\n"), confidence: 0.35 })
}

/// Attempt (c): aggregate every `<p>` longer than 20 chars, filtered
/// against common navigation phrases.
pub fn attempt_paragraph_aggregation(html: &str) -> Option<RecoveryResult> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").ok()?;
    let mut parts = Vec::new();
    for el in document.select(&selector) {
        let text: String = el.text().collect::<Vec<_>>().join(" ");
        let cleaned = collapse_whitespace(&text);
        if cleaned.len() < MIN_PARAGRAPH_LEN {
            continue;
        }
        if is_navigation_phrase(&cleaned) {
            continue;
        }
        parts.push(cleaned);
    }
    if parts.is_empty() {
        return None;
    }
    Some(RecoveryResult { text: parts.join("\n\n"), confidence: 0.25 })
}

fn is_navigation_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    NAVIGATION_PHRASES.iter().any(|phrase| lower == *phrase || lower.starts_with(phrase))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Strip any remaining tags from text already pulled from the DOM
/// (defensive; the recovery attempts above use `.text()` which already
/// excludes markup, but a raw-HTML caller might not).
#[allow(dead_code)]
fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_mode_reads_whole_body() {
        let html = "<html><body><div>Some <b>bold</b> text here</div></body></html>";
        let result = attempt_xml_mode(html).unwrap();
        assert!(result.text.contains("Some bold text here"));
    }

    #[test]
    fn semantic_strip_ignores_scripts() {
        let html = "<html><body><script>evil()</script><article>Real content here</article></body></html>";
        let result = attempt_semantic_strip(html).unwrap();
        assert!(!result.text.contains("evil"));
        assert!(result.text.contains("Real content here"));
    }

    #[test]
    fn paragraph_aggregation_filters_short_and_nav() {
        let html = "<html><body><p>Home</p><p>This is a sufficiently long real paragraph of text.</p></body></html>";
        let result = attempt_paragraph_aggregation(html).unwrap();
        assert!(!result.text.contains("Home"));
        assert!(result.text.contains("sufficiently long"));
    }

    #[test]
    fn confidence_decreases_per_attempt() {
        let html = "<html><body><article>A long enough article body for this test case.</article></body></html>";
        let xml = attempt_xml_mode(html).unwrap();
        let semantic = attempt_semantic_strip(html).unwrap();
        assert!(xml.confidence > semantic.confidence);
    }
}
