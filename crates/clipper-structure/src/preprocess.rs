//! Size-bounded HTML preprocessing before it is sent to the model
//! (§4.2 step 2).

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static SCRIPT_OR_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</\1>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Strip `<script>`/`<style>`/comments, prefer `<body>` content, and
/// hand off to [`clipper_intelligence::truncate_html`] for the hard
/// size cap.
pub fn preprocess(html: &str) -> String {
    let stripped = COMMENT.replace_all(html, "");
    let stripped = SCRIPT_OR_STYLE.replace_all(&stripped, "");

    let document = Html::parse_document(&stripped);
    let body_selector = Selector::parse("body").unwrap();
    let body_html = document
        .select(&body_selector)
        .next()
        .map(|el| el.html())
        .unwrap_or_else(|| stripped.to_string());

    clipper_intelligence::truncate_html(&body_html)
}
