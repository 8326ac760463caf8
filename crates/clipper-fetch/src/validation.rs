//! Content validity scoring applied after either fetch tier (§4.1
//! "Content validation").

use clipper_types::{FetchIntent, ProtectionSignal};
use scraper::{Html, Selector};
use std::collections::HashSet;

const MIN_COUNTABLE_LINKS: usize = 10;
const MIN_ARTICLE_CHARS: usize = 500;
const MIN_CONFIDENCE_FOR_VALID: u8 = 30;

static EXCLUDED_URL_WORDS: &[&str] = &["search", "filter", "login", "signup"];

pub struct ContentValidator;

impl ContentValidator {
    /// True when `html` passes the validity gate for `intent` given the
    /// protection signal already derived for this response. A page
    /// whose protection confidence exceeds the not-blocked threshold
    /// cannot be valid regardless of its structural content.
    pub fn is_valid(html: &str, intent: FetchIntent, protection: &ProtectionSignal) -> bool {
        if protection.confidence as usize > MIN_CONFIDENCE_FOR_VALID {
            return false;
        }
        match intent {
            FetchIntent::Source => Self::countable_links(html) >= MIN_COUNTABLE_LINKS,
            FetchIntent::Article => Self::visible_text_len(html) > MIN_ARTICLE_CHARS,
        }
    }

    /// Links counted per §4.1: non-anchor, non-empty `<a href>` plus
    /// HTMX-triggered navigation elements, excluding search/filter/
    /// login/signup URLs, unified across both sets.
    pub fn countable_links(html: &str) -> usize {
        let document = Html::parse_document(html);
        let mut urls: HashSet<String> = HashSet::new();

        let anchor_selector = Selector::parse("a[href]").unwrap();
        for el in document.select(&anchor_selector) {
            if let Some(href) = el.value().attr("href") {
                let href = href.trim();
                if href.is_empty() || href.starts_with('#') {
                    continue;
                }
                if Self::is_excluded_url(href) {
                    continue;
                }
                urls.insert(href.to_string());
            }
        }

        for attr in ["hx-get", "hx-post", "data-hx-get", "data-hx-post"] {
            let selector = Selector::parse(&format!("[{attr}]")).unwrap();
            for el in document.select(&selector) {
                if let Some(value) = el.value().attr(attr) {
                    let value = value.trim();
                    if value.is_empty() || Self::is_excluded_url(value) {
                        continue;
                    }
                    urls.insert(value.to_string());
                }
            }
        }

        urls.len()
    }

    fn is_excluded_url(url: &str) -> bool {
        let lower = url.to_lowercase();
        EXCLUDED_URL_WORDS.iter().any(|w| lower.contains(w))
    }

    /// Visible text length within `{p, article, div.content, main,
    /// section}`, summed across all matches. A `<p>` nested inside an
    /// `<article>` match only counts once: only the outermost matching
    /// ancestor in a nested chain contributes its text, so overlapping
    /// containers never double-count the same characters.
    pub fn visible_text_len(html: &str) -> usize {
        let document = Html::parse_document(html);
        let selector = Selector::parse("p, article, div.content, main, section").unwrap();
        let matches: HashSet<_> = document.select(&selector).map(|el| el.id()).collect();

        document
            .select(&selector)
            .filter(|el| !el.ancestors().any(|a| matches.contains(&a.id())))
            .map(|el| el.text().collect::<String>().trim().len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper_types::ProtectionKind;

    fn confident_signal() -> ProtectionSignal {
        ProtectionSignal {
            kind: ProtectionKind::None,
            confidence: 0,
            indicators: Vec::new(),
        }
    }

    fn html_with_n_links(n: usize) -> String {
        let mut links = String::new();
        for i in 0..n {
            links.push_str(&format!("<a href=\"/article/{i}\">Article {i}</a>"));
        }
        format!("<html><body>{links}</body></html>")
    }

    #[test]
    fn exactly_ten_links_accepted_nine_rejected() {
        assert!(ContentValidator::is_valid(&html_with_n_links(10), FetchIntent::Source, &confident_signal()));
        assert!(!ContentValidator::is_valid(&html_with_n_links(9), FetchIntent::Source, &confident_signal()));
    }

    #[test]
    fn search_and_login_links_excluded_from_count() {
        let html = format!(
            "{}<a href=\"/search?q=x\">Search</a><a href=\"/login\">Login</a>",
            html_with_n_links(10)
        );
        assert_eq!(ContentValidator::countable_links(&html), 10);
    }

    #[test]
    fn htmx_triggers_count_toward_links() {
        let html = format!(
            "{}<div hx-get=\"/media/items/\">more</div>",
            html_with_n_links(9)
        );
        assert_eq!(ContentValidator::countable_links(&html), 10);
    }

    #[test]
    fn duplicate_urls_across_anchor_and_htmx_unified() {
        let html = "<a href=\"/a\">a</a><div hx-get=\"/a\"></div>\
            <a href=\"/b\">b</a><a href=\"/c\">c</a><a href=\"/d\">d</a>\
            <a href=\"/e\">e</a><a href=\"/f\">f</a><a href=\"/g\">g</a>\
            <a href=\"/h\">h</a><a href=\"/i\">i</a>";
        assert_eq!(ContentValidator::countable_links(html), 9);
    }

    #[test]
    fn article_boundary_500_vs_501_chars() {
        let body_500 = "x".repeat(500);
        let body_501 = "x".repeat(501);
        let html_500 = format!("<article><p>{body_500}</p></article>");
        let html_501 = format!("<article><p>{body_501}</p></article>");
        assert!(!ContentValidator::is_valid(&html_500, FetchIntent::Article, &confident_signal()));
        assert!(ContentValidator::is_valid(&html_501, FetchIntent::Article, &confident_signal()));
    }
}
