//! `getSelectors(url, html) → SelectorConfig` (§4.2).

use crate::cache::SelectorCache;
use crate::fallback::{AUTHOR_FALLBACKS, CONTENT_FALLBACKS, DATE_FALLBACKS, TITLE_FALLBACKS};
use crate::preprocess::preprocess;
use crate::sanitize::{is_undefined, sanitize_selector};
use crate::validate::validate;
use clipper_intelligence::{detect_structure_request, parse_detect_structure, DetectStructureResponse, LlmProvider};
use clipper_types::{Result, SelectorConfig};
use scraper::Html;
use std::collections::HashMap;
use std::sync::Arc;

/// Confidence floor applied once fallbacks are substituted (§4.2
/// step 5).
const FALLBACK_CONFIDENCE: f32 = 0.3;

pub struct StructureEngine {
    cache: SelectorCache,
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl StructureEngine {
    pub fn new(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            cache: SelectorCache::new(),
            llm,
            model: model.into(),
        }
    }

    pub fn evict(&self, url: &str) {
        if let Some(domain) = SelectorCache::domain_key(url) {
            self.cache.evict(&domain);
        }
    }

    /// Seed the cache with a config learned in a previous process
    /// (e.g. the `Source` record's persisted `selector_config`), so a
    /// restart doesn't throw away what was already learned (§3
    /// lifecycle: "SelectorConfig is learned lazily").
    pub fn seed(&self, url: &str, config: SelectorConfig) {
        if let Some(domain) = SelectorCache::domain_key(url) {
            self.cache.put(domain, config);
        }
    }

    /// The currently cached config for `url`'s domain, if any, so the
    /// caller can persist it onto the `Source` record (§3: "Source is
    /// mutated only by the extraction pipeline").
    pub fn cached_config(&self, url: &str) -> Option<SelectorConfig> {
        let domain = SelectorCache::domain_key(url)?;
        self.cache.get(&domain)
    }

    pub async fn get_selectors(&self, url: &str, html: &str) -> Result<SelectorConfig> {
        let domain = SelectorCache::domain_key(url);

        if let Some(domain) = &domain {
            if let Some(cached) = self.cache.get(domain) {
                return Ok(cached);
            }
        }

        let document = Html::parse_document(html);
        let mut config = self.detect_via_llm(url, html, &document).await?;

        if !self.is_usable(&document, &config) {
            tracing::debug!(url, "structure re-debug: first pass unusable, retrying once");
            config = self.detect_via_llm(url, html, &document).await.unwrap_or(config);
            if !self.is_usable(&document, &config) {
                config = self.with_fallbacks(config, &document);
            }
        }

        if let Some(domain) = domain {
            self.cache.put(domain, config.clone());
        }

        Ok(config)
    }

    async fn detect_via_llm(&self, url: &str, html: &str, document: &Html) -> Result<SelectorConfig> {
        let preprocessed = preprocess(html);
        let request = detect_structure_request(&self.model, url, &preprocessed);
        let response = self.llm.complete(request).await?;
        let parsed = parse_detect_structure(&response.content)?;
        Ok(self.sanitise_and_validate(parsed, document))
    }

    fn sanitise_and_validate(&self, parsed: DetectStructureResponse, document: &Html) -> SelectorConfig {
        let title_selector = sanitize_selector(&parsed.title_selector);
        let content_selector = sanitize_selector(&parsed.content_selector);
        let author_selector = parsed.author_selector.as_deref().map(sanitize_selector);
        let date_selector = parsed.date_selector.as_deref().map(sanitize_selector);
        let article_container_selector = parsed.article_selector.as_deref().map(sanitize_selector);

        let report = validate(document, &title_selector, &content_selector);
        let confidence = report.derate(parsed.confidence);

        let mut alternatives = HashMap::new();
        if !parsed.date_alternatives.is_empty() {
            alternatives.insert("date".to_string(), parsed.date_alternatives);
        }

        let mut config = SelectorConfig {
            title_selector,
            content_selector,
            author_selector: author_selector.filter(|s| !is_undefined(s)),
            date_selector: date_selector.filter(|s| !is_undefined(s)),
            article_container_selector: article_container_selector.filter(|s| !is_undefined(s)),
            alternatives,
            confidence,
        };

        if !report.title_ok() || is_undefined(&config.title_selector) {
            config.title_selector = TITLE_FALLBACKS[0].to_string();
            config.confidence = config.confidence.min(FALLBACK_CONFIDENCE);
        }
        if !report.content_ok() || is_undefined(&config.content_selector) {
            config.content_selector = CONTENT_FALLBACKS[0].to_string();
            config.confidence = config.confidence.min(FALLBACK_CONFIDENCE);
        }

        config
    }

    fn with_fallbacks(&self, mut config: SelectorConfig, document: &Html) -> SelectorConfig {
        for candidate in TITLE_FALLBACKS {
            if validate(document, candidate, &config.content_selector).title_ok() {
                config.title_selector = candidate.to_string();
                break;
            }
        }
        for candidate in CONTENT_FALLBACKS {
            if validate(document, &config.title_selector, candidate).content_ok() {
                config.content_selector = candidate.to_string();
                break;
            }
        }
        if config.author_selector.is_none() {
            config.author_selector = AUTHOR_FALLBACKS.first().map(|s| s.to_string());
        }
        if config.date_selector.is_none() {
            config.date_selector = DATE_FALLBACKS.first().map(|s| s.to_string());
        }
        config.confidence = FALLBACK_CONFIDENCE;
        config
    }

    fn is_usable(&self, document: &Html, config: &SelectorConfig) -> bool {
        if !config.is_valid() {
            return false;
        }
        let report = validate(document, &config.title_selector, &config.content_selector);
        report.title_ok() && report.content_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipper_intelligence::{CompletionRequest, CompletionResponse, Usage};

    struct StubLlm {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                request_id: request.id,
                content: self.response.clone(),
                usage: Usage { prompt_tokens: 0, completion_tokens: 0, total_tokens: 0 },
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn html_fixture() -> &'static str {
        "<html><body><h1>My Title</h1><article>Plenty of article body text here.</article></body></html>"
    }

    #[tokio::test]
    async fn uses_llm_selectors_when_they_validate() {
        let llm = Arc::new(StubLlm {
            response: r#"{"titleSelector":"h1","contentSelector":"article","confidence":0.9}"#.to_string(),
        });
        let engine = StructureEngine::new(llm, "gpt-4");
        let config = engine.get_selectors("https://example.com/a", html_fixture()).await.unwrap();
        assert_eq!(config.title_selector, "h1");
        assert_eq!(config.content_selector, "article");
    }

    #[tokio::test]
    async fn textual_title_selector_falls_back_to_h1() {
        let llm = Arc::new(StubLlm {
            response: r#"{"titleSelector":"By Jane Smith","contentSelector":"article","confidence":0.9}"#.to_string(),
        });
        let engine = StructureEngine::new(llm, "gpt-4");
        let config = engine.get_selectors("https://example.com/a", html_fixture()).await.unwrap();
        assert_eq!(config.title_selector, "h1");
    }

    #[tokio::test]
    async fn second_fetch_on_same_domain_is_served_from_cache() {
        let llm = Arc::new(StubLlm {
            response: r#"{"titleSelector":"h1","contentSelector":"article","confidence":0.9}"#.to_string(),
        });
        let engine = StructureEngine::new(llm, "gpt-4");
        let first = engine.get_selectors("https://example.com/a", html_fixture()).await.unwrap();
        let second = engine.get_selectors("https://example.com/b", html_fixture()).await.unwrap();
        assert_eq!(first.title_selector, second.title_selector);
        assert_eq!(second.content_selector, "article");
    }

    #[tokio::test]
    async fn seeded_config_is_served_without_calling_the_llm() {
        let llm = Arc::new(StubLlm {
            response: r#"{"titleSelector":"garbage","contentSelector":"garbage","confidence":0.1}"#.to_string(),
        });
        let engine = StructureEngine::new(llm, "gpt-4");
        engine.seed(
            "https://example.com/a",
            SelectorConfig {
                title_selector: "h1.headline".to_string(),
                content_selector: "div.body".to_string(),
                author_selector: None,
                date_selector: None,
                article_container_selector: None,
                alternatives: HashMap::new(),
                confidence: 0.9,
            },
        );
        let config = engine.get_selectors("https://example.com/a", html_fixture()).await.unwrap();
        assert_eq!(config.title_selector, "h1.headline");
    }

    #[tokio::test]
    async fn cached_config_is_retrievable_after_detection() {
        let llm = Arc::new(StubLlm {
            response: r#"{"titleSelector":"h1","contentSelector":"article","confidence":0.9}"#.to_string(),
        });
        let engine = StructureEngine::new(llm, "gpt-4");
        assert!(engine.cached_config("https://example.com/a").is_none());
        engine.get_selectors("https://example.com/a", html_fixture()).await.unwrap();
        assert!(engine.cached_config("https://example.com/a").is_some());
    }
}
