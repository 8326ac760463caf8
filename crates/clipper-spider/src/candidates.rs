//! Candidate anchor collection (§4.4 step 1): `<a href>` elements
//! with enough visible text to plausibly be an article link, plus
//! HTMX-triggered navigation elements, each carrying surrounding
//! context for downstream ranking.

use scraper::{ElementRef, Html, Selector};

const MIN_TEXT_CHARS: usize = 15;
const MIN_WORDS: usize = 2;
const MAX_CONTEXT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct LinkCandidate {
    pub href: String,
    pub text: String,
    /// Parent element's text, truncated to 200 chars, preserved for
    /// downstream ranking (e.g. the AI link filter's context field).
    pub context: String,
}

/// Collect every `<a href>` whose visible text is at least 15 chars
/// and at least 2 words, plus elements declaring an HTMX trigger
/// (`hx-get`/`hx-post`/`data-hx-get`/`data-hx-post`).
pub fn collect_candidates(html: &str) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for el in document.select(&selector) {
            if let Some(href) = el.value().attr("href") {
                let text = element_text(el);
                if is_substantial(&text) {
                    candidates.push(LinkCandidate {
                        href: href.to_string(),
                        text,
                        context: parent_context(el),
                    });
                }
            }
        }
    }

    for attr in ["hx-get", "hx-post", "data-hx-get", "data-hx-post"] {
        if let Ok(selector) = Selector::parse(&format!("[{attr}]")) {
            for el in document.select(&selector) {
                if let Some(href) = el.value().attr(attr) {
                    let text = element_text(el);
                    if is_substantial(&text) {
                        candidates.push(LinkCandidate {
                            href: href.to_string(),
                            text,
                            context: parent_context(el),
                        });
                    }
                }
            }
        }
    }

    candidates
}

fn is_substantial(text: &str) -> bool {
    text.len() >= MIN_TEXT_CHARS && text.split_whitespace().count() >= MIN_WORDS
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

fn parent_context(el: ElementRef) -> String {
    let parent_text = el
        .parent()
        .and_then(ElementRef::wrap)
        .map(element_text)
        .unwrap_or_default();
    if parent_text.len() > MAX_CONTEXT_CHARS {
        parent_text.chars().take(MAX_CONTEXT_CHARS).collect()
    } else {
        parent_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_anchor_with_enough_text() {
        let html = r#"<html><body><a href="/a">A proper article headline</a></body></html>"#;
        let candidates = collect_candidates(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].href, "/a");
    }

    #[test]
    fn skips_short_single_word_links() {
        let html = r#"<html><body><a href="/x">More</a></body></html>"#;
        assert!(collect_candidates(html).is_empty());
    }

    #[test]
    fn collects_htmx_triggered_elements() {
        let html = r#"<html><body><div hx-get="/media/items/">Load more cybersecurity articles</div></body></html>"#;
        let candidates = collect_candidates(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].href, "/media/items/");
    }

    #[test]
    fn context_capped_at_200_chars() {
        let long_parent_text = "word ".repeat(100);
        let html = format!(
            r#"<html><body><div>{long_parent_text}<a href="/a">A proper article headline here</a></div></body></html>"#
        );
        let candidates = collect_candidates(&html);
        assert!(candidates[0].context.chars().count() <= 200);
    }
}
