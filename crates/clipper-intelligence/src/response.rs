//! Strict validation of LLM completions into typed records (§9:
//! "Dynamic LLM-returned shape with `any`... validate into a strict
//! record; reject and fall back on shape mismatch").

use clipper_types::{ClipperError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DetectStructureResponse {
    #[serde(rename = "titleSelector")]
    pub title_selector: String,
    #[serde(rename = "contentSelector")]
    pub content_selector: String,
    #[serde(rename = "authorSelector", default)]
    pub author_selector: Option<String>,
    #[serde(rename = "dateSelector", default)]
    pub date_selector: Option<String>,
    #[serde(rename = "articleSelector", default)]
    pub article_selector: Option<String>,
    #[serde(rename = "dateAlternatives", default)]
    pub date_alternatives: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractContentResponse {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyArticleLinksResponse(pub Vec<String>);

/// LLMs routinely wrap JSON in markdown code fences; strip them before
/// parsing rather than asking the model to never do it.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.trim().trim_end_matches("```").trim()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.trim().trim_end_matches("```").trim()
    } else {
        trimmed
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| ClipperError::Ai(format!("invalid JSON shape: {e}")))
}

pub fn parse_detect_structure(raw: &str) -> Result<DetectStructureResponse> {
    let parsed: DetectStructureResponse = parse_json(raw)?;
    if !(0.1..=1.0).contains(&parsed.confidence) {
        return Err(ClipperError::Ai(format!(
            "detectStructure confidence {} out of range [0.1, 1.0]",
            parsed.confidence
        )));
    }
    Ok(parsed)
}

pub fn parse_extract_content(raw: &str) -> Result<ExtractContentResponse> {
    let parsed: ExtractContentResponse = parse_json(raw)?;
    if let Some(date) = &parsed.date {
        if !is_plausible_iso_date(date) {
            return Err(ClipperError::Ai(format!("extractContent date '{date}' is not YYYY-MM-DD")));
        }
    }
    Ok(parsed)
}

pub fn parse_identify_article_links(raw: &str) -> Result<Vec<String>> {
    let parsed: IdentifyArticleLinksResponse = parse_json(raw)?;
    Ok(parsed.0)
}

fn is_plausible_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && s[0..4].chars().all(|c| c.is_ascii_digit())
        && s[5..7].chars().all(|c| c.is_ascii_digit())
        && s[8..10].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_detect_structure_response() {
        let raw = "```json\n{\"titleSelector\":\"h1\",\"contentSelector\":\".body\",\"confidence\":0.8}\n```";
        let parsed = parse_detect_structure(raw).unwrap();
        assert_eq!(parsed.title_selector, "h1");
        assert_eq!(parsed.confidence, 0.8);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let raw = r#"{"titleSelector":"h1","contentSelector":".body","confidence":1.5}"#;
        assert!(parse_detect_structure(raw).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let raw = "not json at all";
        assert!(parse_detect_structure(raw).is_err());
    }

    #[test]
    fn rejects_non_iso_date() {
        let raw = r#"{"title":"t","content":"c","date":"Jan 5 2024","confidence":0.9}"#;
        assert!(parse_extract_content(raw).is_err());
    }

    #[test]
    fn accepts_iso_date() {
        let raw = r#"{"title":"t","content":"c","date":"2024-01-05","confidence":0.9}"#;
        assert!(parse_extract_content(raw).is_ok());
    }

    #[test]
    fn parses_link_array() {
        let raw = r#"["https://example.com/a", "https://example.com/b"]"#;
        let links = parse_identify_article_links(raw).unwrap();
        assert_eq!(links.len(), 2);
    }
}
