//! Selector validation against the live page (§4.2 step 4).

use scraper::{Html, Selector};

/// Selectors broad enough to match almost any document are rejected
/// even when they technically parse and match something.
const TOO_BROAD: &[&str] = &["body", "div", "span", "p", "*"];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub title_matches: usize,
    pub content_matches: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn title_ok(&self) -> bool {
        self.title_matches > 0
    }

    pub fn content_ok(&self) -> bool {
        self.content_matches > 0
    }

    /// Confidence derated per warning (-0.1) and error (-0.25),
    /// floored at 0.3 so a config stays usable rather than zeroed out.
    pub fn derate(&self, base: f32) -> f32 {
        let penalty = self.warnings.len() as f32 * 0.1 + self.errors.len() as f32 * 0.25;
        (base - penalty).max(0.3)
    }
}

pub fn validate(document: &Html, title_selector: &str, content_selector: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.title_matches = count_matches(document, title_selector, &mut report.warnings, &mut report.errors, "title");
    report.content_matches =
        count_matches(document, content_selector, &mut report.warnings, &mut report.errors, "content");

    if TOO_BROAD.contains(&title_selector.trim()) {
        report.warnings.push("title selector too broad".to_string());
        report.title_matches = 0;
    }
    if TOO_BROAD.contains(&content_selector.trim()) {
        report.warnings.push("content selector too broad".to_string());
        report.content_matches = 0;
    }

    report
}

fn count_matches(
    document: &Html,
    selector: &str,
    warnings: &mut Vec<String>,
    errors: &mut Vec<String>,
    field: &str,
) -> usize {
    match Selector::parse(selector) {
        Ok(parsed) => {
            let count = document.select(&parsed).count();
            if count == 0 {
                warnings.push(format!("{field} selector matched nothing"));
            }
            count
        }
        Err(_) => {
            errors.push(format!("{field} selector failed to parse"));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_broad_selector() {
        let document = Html::parse_document("<html><body><p>a</p><p>b</p></body></html>");
        let report = validate(&document, "h1", "p");
        assert!(report.title_matches == 0);
        assert!(!report.content_ok());
    }

    #[test]
    fn accepts_specific_matching_selector() {
        let document = Html::parse_document("<html><body><h1>Title</h1><article>body</article></body></html>");
        let report = validate(&document, "h1", "article");
        assert!(report.title_ok());
        assert!(report.content_ok());
        assert!(report.warnings.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn unparseable_selector_is_an_error() {
        let document = Html::parse_document("<html><body></body></html>");
        let report = validate(&document, ":::bad", "article");
        assert!(!report.errors.is_empty());
    }
}
