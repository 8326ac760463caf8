//! `discover(html, base_url, options) -> orderedList<absoluteUrl>`
//! (§4.4 contract).

use crate::ai_filter::{self, LinkContext};
use crate::candidates::{self, LinkCandidate};
use crate::filters::passes_patterns;
use crate::normalize::normalize;
use clipper_intelligence::LlmProvider;
use clipper_types::{FetchOptions, Result};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

pub struct LinkDiscovery {
    llm: Option<Arc<dyn LlmProvider>>,
    model: String,
}

struct NormalizedCandidate {
    url: Url,
    text: String,
    context: String,
}

impl LinkDiscovery {
    pub fn new() -> Self {
        Self { llm: None, model: String::new() }
    }

    pub fn with_llm(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self { llm: Some(llm), model: model.into() }
    }

    /// Collect, filter, normalise and (optionally) AI-filter
    /// candidate links, preserving discovery order and enforcing
    /// `options.max_links`.
    pub async fn discover(&self, html: &str, base_url: &Url, options: &FetchOptions) -> Result<Vec<String>> {
        let raw_candidates = candidates::collect_candidates(html);
        let normalized = self.normalize_and_filter(&raw_candidates, base_url, options);

        let use_ai = options.ai_context.as_ref().map(|c| c.enabled).unwrap_or(false);
        let selected = if use_ai {
            if let Some(llm) = &self.llm {
                self.apply_ai_filter(llm.as_ref(), &normalized).await?
            } else {
                normalized
            }
        } else {
            normalized
        };

        let cap = if options.max_links == 0 { selected.len() } else { options.max_links };
        Ok(selected.into_iter().take(cap).map(|c| c.url.to_string()).collect())
    }

    fn normalize_and_filter(
        &self,
        raw_candidates: &[LinkCandidate],
        base_url: &Url,
        options: &FetchOptions,
    ) -> Vec<NormalizedCandidate> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for candidate in raw_candidates {
            let Some(url) = normalize(&candidate.href, base_url) else { continue };
            let url_string = url.to_string();
            if !passes_patterns(&url_string, &options.include_patterns, &options.exclude_patterns) {
                continue;
            }
            if !seen.insert(url_string) {
                continue;
            }
            out.push(NormalizedCandidate {
                url,
                text: candidate.text.clone(),
                context: candidate.context.clone(),
            });
        }

        out
    }

    async fn apply_ai_filter(
        &self,
        llm: &dyn LlmProvider,
        normalized: &[NormalizedCandidate],
    ) -> Result<Vec<NormalizedCandidate>> {
        let contexts: Vec<LinkContext> = normalized
            .iter()
            .map(|c| LinkContext { url: &c.url, text: &c.text })
            .collect();

        match ai_filter::filter_article_links(llm, &self.model, &contexts).await {
            Ok(chosen) => Ok(normalized
                .iter()
                .filter(|c| chosen.contains(c.url.as_str()))
                .map(|c| NormalizedCandidate { url: c.url.clone(), text: c.text.clone(), context: c.context.clone() })
                .collect()),
            Err(e) => {
                tracing::warn!(error = %e, "ai link filter failed, falling back to unfiltered candidates");
                Ok(normalized
                    .iter()
                    .map(|c| NormalizedCandidate { url: c.url.clone(), text: c.text.clone(), context: c.context.clone() })
                    .collect())
            }
        }
    }
}

impl Default for LinkDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipper_intelligence::{CompletionRequest, CompletionResponse, Usage};
    use clipper_types::{AiLinkContext, FetchOptions};

    fn html_with_links(n: usize) -> String {
        let mut links = String::new();
        for i in 0..n {
            links.push_str(&format!(r#"<a href="/article/{i}">Article headline number {i}</a>"#));
        }
        format!("<html><body>{links}</body></html>")
    }

    #[tokio::test]
    async fn discovers_and_caps_links_in_order() {
        let discovery = LinkDiscovery::new();
        let base = Url::parse("https://example.com/").unwrap();
        let html = html_with_links(60);
        let mut options = FetchOptions::for_source();
        options.max_links = 50;
        let links = discovery.discover(&html, &base, &options).await.unwrap();
        assert_eq!(links.len(), 50);
        assert_eq!(links[0], "https://example.com/article/0");
    }

    #[tokio::test]
    async fn applies_include_exclude_patterns() {
        let discovery = LinkDiscovery::new();
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<html><body>
            <a href="/articles/1">Great article about rust programming</a>
            <a href="/tags/rust">Tag page for rust content</a>
        </body></html>"#;
        let mut options = FetchOptions::for_source();
        options.include_patterns = vec!["/articles/".to_string()];
        let links = discovery.discover(html, &base, &options).await.unwrap();
        assert_eq!(links, vec!["https://example.com/articles/1"]);
    }

    #[tokio::test]
    async fn deduplicates_same_resolved_url() {
        let discovery = LinkDiscovery::new();
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<html><body>
            <a href="/articles/1">Great article about rust programming</a>
            <a href="https://example.com/articles/1">Great article about rust programming</a>
        </body></html>"#;
        let options = FetchOptions::for_source();
        let links = discovery.discover(html, &base, &options).await.unwrap();
        assert_eq!(links.len(), 1);
    }

    struct StubLlm;

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                request_id: request.id,
                content: r#"["https://example.com/articles/1"]"#.to_string(),
                usage: Usage { prompt_tokens: 0, completion_tokens: 0, total_tokens: 0 },
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn ai_filter_narrows_candidates_when_enabled() {
        let discovery = LinkDiscovery::with_llm(Arc::new(StubLlm), "gpt-4");
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<html><body>
            <a href="/articles/1">Great article about rust programming</a>
            <a href="/tags/rust">Tag page for rust content</a>
        </body></html>"#;
        let mut options = FetchOptions::for_source();
        options.ai_context = Some(AiLinkContext { enabled: true });
        let links = discovery.discover(html, &base, &options).await.unwrap();
        assert_eq!(links, vec!["https://example.com/articles/1"]);
    }
}
