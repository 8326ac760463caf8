//! Optional LLM link filter (§4.4 step 4): the model receives
//! `(title, href, context)` tuples as `<a href="abs">text</a>` lines
//! and returns the subset of hrefs it judges to be individual
//! articles. The invariant is that every href shown to the model is
//! already absolute.

use clipper_intelligence::{identify_article_links_request, parse_identify_article_links, LlmProvider};
use clipper_types::Result;
use std::collections::HashSet;
use url::Url;

pub struct LinkContext<'a> {
    pub url: &'a Url,
    pub text: &'a str,
}

/// Render `(title, href, context)` tuples as `<a href="abs">text</a>`
/// lines and ask the model which ones are article links.
pub async fn filter_article_links(
    llm: &dyn LlmProvider,
    model: &str,
    candidates: &[LinkContext<'_>],
) -> Result<HashSet<String>> {
    let pairs: Vec<String> = candidates
        .iter()
        .map(|c| format!(r#"<a href="{}">{}</a>"#, c.url, c.text))
        .collect();

    let request = identify_article_links_request(model, &pairs);
    let response = llm.complete(request).await?;
    let chosen = parse_identify_article_links(&response.content)?;
    Ok(chosen.into_iter().collect())
}
