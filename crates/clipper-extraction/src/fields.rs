//! Per-field selector application with the recovery order from §4.3
//! step 1: configured selector, then generated variations, then the
//! field's fallback list.

use crate::variations::generate_variations;
use scraper::{ElementRef, Html, Selector};

/// How a field's text was ultimately obtained, for the extractor to
/// fold into the overall `ExtractionMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    ConfiguredSelector,
    Variation,
    Fallback,
    NotFound,
}

pub struct FieldResult {
    pub text: Option<String>,
    pub source: FieldSource,
}

/// Try `configured`, then its variations, then each of `fallbacks` in
/// order. Returns the first non-empty match.
pub fn select_field(document: &Html, configured: Option<&str>, fallbacks: &[&str]) -> FieldResult {
    if let Some(selector) = configured {
        if let Some(text) = query_text(document, selector) {
            return FieldResult { text: Some(text), source: FieldSource::ConfiguredSelector };
        }
        for variant in generate_variations(selector) {
            if let Some(text) = query_text(document, &variant) {
                return FieldResult { text: Some(text), source: FieldSource::Variation };
            }
        }
    }

    for candidate in fallbacks {
        if let Some(text) = query_text(document, candidate) {
            return FieldResult { text: Some(text), source: FieldSource::Fallback };
        }
    }

    FieldResult { text: None, source: FieldSource::NotFound }
}

/// Query `selector` against `document` and return the first match's
/// trimmed text, or `attr("datetime"/"content")` when the element
/// carries no inner text worth collecting (e.g. `<meta>`, `<time>`).
pub fn query_text(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    let element = document.select(&parsed).next()?;
    element_text(element)
}

fn element_text(element: ElementRef) -> Option<String> {
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return Some(trimmed.to_string());
    }
    for attr in ["datetime", "content"] {
        if let Some(value) = element.value().attr(attr) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// §4.3 step 2: when the content selector yields too little, fall
/// back to concatenating all `<p>` descendants of the article
/// container.
pub fn container_paragraph_text(document: &Html, container_selector: &str) -> Option<String> {
    let container = Selector::parse(container_selector).ok()?;
    let paragraph = Selector::parse("p").ok()?;
    let mut parts = Vec::new();
    for container_el in document.select(&container) {
        for p in container_el.select(&paragraph) {
            let text: String = p.text().collect();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_selector_matches_directly() {
        let doc = Html::parse_document("<html><body><h1>Title Here</h1></body></html>");
        let result = select_field(&doc, Some("h1"), &[]);
        assert_eq!(result.text.as_deref(), Some("Title Here"));
        assert_eq!(result.source, FieldSource::ConfiguredSelector);
    }

    #[test]
    fn falls_back_to_variation_on_underscore_hyphen_mismatch() {
        let doc = Html::parse_document(r#"<html><body><div class="article_body">Body text</div></body></html>"#);
        let result = select_field(&doc, Some(".article-body"), &[]);
        assert_eq!(result.text.as_deref(), Some("Body text"));
        assert_eq!(result.source, FieldSource::Variation);
    }

    #[test]
    fn falls_back_to_field_fallback_list() {
        let doc = Html::parse_document("<html><body><article>Fallback content</article></body></html>");
        let result = select_field(&doc, Some(".nonexistent"), &["article"]);
        assert_eq!(result.text.as_deref(), Some("Fallback content"));
        assert_eq!(result.source, FieldSource::Fallback);
    }

    #[test]
    fn container_paragraphs_join_with_blank_line() {
        let doc = Html::parse_document(
            "<html><body><div class=\"container\"><p>One</p><p>Two</p></div></body></html>",
        );
        let text = container_paragraph_text(&doc, ".container").unwrap();
        assert_eq!(text, "One\n\nTwo");
    }
}
