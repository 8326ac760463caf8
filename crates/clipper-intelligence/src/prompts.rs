//! The three strict-JSON prompt shapes from §6 "External Interfaces".

use crate::provider::{CompletionRequest, Message};

/// Hard cap on preprocessed HTML forwarded to the model (§4.2 step 2).
pub const HTML_TRUNCATION_LIMIT: usize = 45_000;
const TRUNCATION_MARKER: &str = "\n<!-- truncated -->";

/// Truncate `html` to the model's context budget, appending a marker
/// so the model knows the document was cut off.
pub fn truncate_html(html: &str) -> String {
    if html.len() <= HTML_TRUNCATION_LIMIT {
        return html.to_string();
    }
    let mut cut = HTML_TRUNCATION_LIMIT;
    while !html.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{TRUNCATION_MARKER}", &html[..cut])
}

pub fn detect_structure_request(model: &str, url: &str, html: &str) -> CompletionRequest {
    let truncated = truncate_html(html);
    let system = "You analyse HTML documents and return ONLY CSS selectors, never prose. \
        Respond with a single JSON object and nothing else.";
    let user = format!(
        "URL: {url}\n\n\
        Return a JSON object with exactly these keys: titleSelector, contentSelector, \
        authorSelector (nullable), dateSelector (nullable), articleSelector (nullable), \
        dateAlternatives (array of selector strings), confidence (number between 0.1 and 1.0).\n\
        Each selector must be a valid CSS selector string, never a snippet of the page's \
        own text (no author names, no dates, no \"By ...\" lines).\n\n\
        HTML:\n{truncated}"
    );
    CompletionRequest::new(model, vec![Message::system(system), Message::user(user)])
}

pub fn extract_content_request(model: &str, url: &str, html: &str) -> CompletionRequest {
    let truncated = truncate_html(html);
    let system = "You extract the main article content from HTML. \
        Respond with a single JSON object and nothing else.";
    let user = format!(
        "URL: {url}\n\n\
        Return a JSON object with exactly these keys: title, content, author (nullable), \
        date (nullable, format YYYY-MM-DD), confidence (number between 0 and 1).\n\
        `content` must be the article body text only, with navigation, ads and related-links \
        sections removed.\n\n\
        HTML:\n{truncated}"
    );
    CompletionRequest::new(model, vec![Message::system(system), Message::user(user)])
}

/// `pairs` encodes `<a href="abs">text</a>` lines, one per candidate
/// link, already collected by the link-discovery engine.
pub fn identify_article_links_request(model: &str, pairs: &[String]) -> CompletionRequest {
    let system = "You select which links point to individual articles, as opposed to \
        category pages, tag pages, or site navigation. Respond with a single JSON array of \
        the chosen href strings and nothing else.";
    let joined = pairs.join("\n");
    let user = format!(
        "Candidate links:\n{joined}\n\n\
        Return a JSON array containing only the href values that point to individual articles."
    );
    CompletionRequest::new(model, vec![Message::system(system), Message::user(user)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_limit_and_marks_cut() {
        let html = "a".repeat(HTML_TRUNCATION_LIMIT + 500);
        let truncated = truncate_html(&html);
        assert!(truncated.len() <= HTML_TRUNCATION_LIMIT + TRUNCATION_MARKER.len());
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn short_html_is_untouched() {
        let html = "<html></html>";
        assert_eq!(truncate_html(html), html);
    }

    #[test]
    fn detect_structure_prompt_includes_url_and_html() {
        let req = detect_structure_request("gpt-4", "https://example.com", "<h1>Title</h1>");
        let combined: String = req.messages.iter().map(|m| m.content.clone()).collect();
        assert!(combined.contains("https://example.com"));
        assert!(combined.contains("<h1>Title</h1>"));
    }
}
