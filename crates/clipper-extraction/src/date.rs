//! Date extraction (§4.3 step 6): try the detected selector's
//! `datetime` attribute or text, then a prioritised list of
//! well-known date locations, finally JSON-LD `datePublished`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Ordered fallback locations, tried after the configured date
/// selector comes up empty.
const FALLBACK_SELECTORS: &[&str] = &[
    "time[datetime]",
    ".date",
    ".published",
    "meta[property='article:published_time']",
    "meta[name='date']",
];

static DATE_PUBLISHED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""datePublished"\s*:\s*"([^"]+)""#).unwrap());

/// Extract and parse a publish date, trying `configured_selector`
/// first, then the fallback list, then any JSON-LD `datePublished`.
pub fn extract_date(document: &Html, configured_selector: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(selector) = configured_selector {
        if let Some(raw) = extract_from_selector(document, selector) {
            if let Some(parsed) = parse_date(&raw) {
                return Some(parsed);
            }
        }
    }

    for selector in FALLBACK_SELECTORS {
        if let Some(raw) = extract_from_selector(document, selector) {
            if let Some(parsed) = parse_date(&raw) {
                return Some(parsed);
            }
        }
    }

    extract_json_ld_date(document).and_then(|raw| parse_date(&raw))
}

fn extract_from_selector(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    let element = document.select(&parsed).next()?;

    if let Some(datetime) = element.value().attr("datetime") {
        let trimmed = datetime.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(content) = element.value().attr("content") {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let text: String = element.text().collect();
    let trimmed = text.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn extract_json_ld_date(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    for el in document.select(&selector) {
        let text: String = el.text().collect();
        if let Some(captures) = DATE_PUBLISHED_KEY.captures(&text) {
            if let Some(m) = captures.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

/// Parse a date string in any of the formats this source plausibly
/// emits: full RFC3339, plain `YYYY-MM-DD`, or an RFC2822-like string.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(DateTime::from_naive_utc_and_offset(naive.and_hms_opt(0, 0, 0)?, Utc));
    }
    None
}
