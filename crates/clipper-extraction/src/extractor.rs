//! `extract(html, config) -> ArticleContent` (§4.3 contract).
//!
//! The selector/variation/fallback pass in [`Self::extract_pure`] is
//! pure over `(html, config)`, matching the Extractor's ownership rule
//! in §3. AI re-analysis (§4.3 step 4) and multi-attempt recovery
//! (§4.3 step 5) are escalations the pipeline reaches for when that
//! pure pass is too weak; see DESIGN.md for how this reconciles with
//! the "pure; no I/O" contract.

use crate::ai::{self, ReanalysisResult};
use crate::date;
use crate::fields::{self, FieldSource};
use crate::quality;
use crate::recovery;
use chrono::{DateTime, Utc};
use clipper_intelligence::LlmProvider;
use clipper_types::{
    ArticleContent, ClipperError, ExtractionMethod, Result, SelectorConfig, AUTHOR_FALLBACKS,
    CONTENT_FALLBACKS, TITLE_FALLBACKS,
};
use scraper::Html;
use std::sync::Arc;

/// §8 concrete scenario 5: "if no recovery reaches >= 200 chars, the
/// article is skipped with a `parsing` error logged."
const RECOVERY_MIN_CHARS: usize = 200;

pub struct Extractor {
    llm: Option<Arc<dyn LlmProvider>>,
    model: String,
}

/// The pure selector pass's result, kept around so recovery can reuse
/// whatever title/author/date it already found.
struct PureExtraction {
    content: ArticleContent,
    used_variation: bool,
}

impl Extractor {
    /// An extractor with no AI re-analysis escalation: selectors,
    /// variations, fallbacks and multi-attempt recovery only.
    pub fn new() -> Self {
        Self { llm: None, model: String::new() }
    }

    pub fn with_llm(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self { llm: Some(llm), model: model.into() }
    }

    /// The pure core: selectors, generated variations, and the
    /// field's fallback list, with the content-container-paragraph
    /// accept rule from §4.3 step 2. No I/O.
    pub fn extract_pure(&self, html: &str, config: &SelectorConfig) -> ArticleContent {
        self.extract_pure_inner(html, config).content
    }

    fn extract_pure_inner(&self, html: &str, config: &SelectorConfig) -> PureExtraction {
        let document = Html::parse_document(html);

        let title_result = fields::select_field(&document, Some(&config.title_selector), TITLE_FALLBACKS);
        let mut content_result =
            fields::select_field(&document, Some(&config.content_selector), CONTENT_FALLBACKS);

        if content_result.text.as_deref().map(str::len).unwrap_or(0) < quality::MIN_CONTENT_CHARS {
            if let Some(container_selector) = &config.article_container_selector {
                if let Some(container_text) = fields::container_paragraph_text(&document, container_selector) {
                    if container_text.len() > content_result.text.as_deref().map(str::len).unwrap_or(0) {
                        content_result.text = Some(container_text);
                    }
                }
            }
        }

        let author_result = fields::select_field(&document, config.author_selector.as_deref(), AUTHOR_FALLBACKS);
        let publish_date = date::extract_date(&document, config.date_selector.as_deref());

        let used_variation = matches!(
            (title_result.source, content_result.source),
            (FieldSource::Variation, _) | (_, FieldSource::Variation)
        );

        let body = content_result.text.unwrap_or_default();
        let quality_ok = quality::passes_quality_gate(&body);

        let mut confidence = config.confidence;
        if used_variation {
            confidence *= 0.85;
        }
        if !quality_ok {
            confidence = confidence.min(0.4);
        }

        let method = if used_variation {
            ExtractionMethod::SelectorsVariation
        } else {
            ExtractionMethod::Selectors
        };

        PureExtraction {
            content: ArticleContent {
                title: title_result.text.unwrap_or_default(),
                body,
                author: author_result.text,
                publish_date,
                method,
                confidence,
            },
            used_variation,
        }
    }

    /// The full pipeline entry point: the pure pass, escalating to AI
    /// re-analysis and then multi-attempt recovery when it is too
    /// weak (§4.3 steps 4-5). Returns a `parsing` error when nothing
    /// recovers to an acceptable result, so the caller can log and
    /// skip the article per §7.
    pub async fn extract(&self, url: &str, html: &str, config: &SelectorConfig) -> Result<ArticleContent> {
        let pure = self.extract_pure_inner(html, config);

        let quality_ok = quality::passes_quality_gate(&pure.content.body);
        if !ai::should_reanalyze(pure.content.body.len(), pure.content.confidence, pure.content.title.len(), quality_ok) {
            return Ok(pure.content);
        }

        if let Some(llm) = &self.llm {
            match ai::reanalyze(llm.as_ref(), &self.model, url, html).await {
                Ok(result) if ai::reanalysis_is_acceptable(result.confidence) => {
                    return Ok(Self::from_reanalysis(result));
                }
                Ok(result) => {
                    tracing::debug!(url, confidence = result.confidence, "ai re-analysis below acceptance threshold");
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "ai re-analysis failed, falling back to multi-attempt recovery");
                }
            }
        }

        self.recover(html, &pure.content)
    }

    fn from_reanalysis(result: ReanalysisResult) -> ArticleContent {
        let publish_date = result.date_raw.as_deref().and_then(parse_plain_date);
        ArticleContent {
            title: result.title,
            body: result.content,
            author: result.author,
            publish_date,
            method: ExtractionMethod::AiReanalysis,
            confidence: result.confidence,
        }
    }

    fn recover(&self, html: &str, pure: &ArticleContent) -> Result<ArticleContent> {
        let attempts: [(fn(&str) -> Option<recovery::RecoveryResult>, ExtractionMethod); 3] = [
            (recovery::attempt_xml_mode, ExtractionMethod::MultiAttempt1),
            (recovery::attempt_semantic_strip, ExtractionMethod::MultiAttempt2),
            (recovery::attempt_paragraph_aggregation, ExtractionMethod::MultiAttempt3),
        ];

        for (attempt_fn, method) in attempts {
            if let Some(result) = attempt_fn(html) {
                if result.text.len() >= RECOVERY_MIN_CHARS {
                    return Ok(ArticleContent {
                        title: pure.title.clone(),
                        body: result.text,
                        author: pure.author.clone(),
                        publish_date: pure.publish_date,
                        method,
                        confidence: result.confidence,
                    });
                }
            }
        }

        Err(ClipperError::Parsing(
            "no recovery attempt produced content over the minimum acceptable length".to_string(),
        ))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_plain_date(raw: &str) -> Option<DateTime<Utc>> {
    let naive = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive.and_hms_opt(0, 0, 0)?, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipper_intelligence::{CompletionRequest, CompletionResponse, Usage};
    use std::collections::HashMap;

    fn config() -> SelectorConfig {
        SelectorConfig {
            title_selector: "h1".to_string(),
            content_selector: "article".to_string(),
            author_selector: None,
            date_selector: None,
            article_container_selector: None,
            alternatives: HashMap::new(),
            confidence: 0.9,
        }
    }

    #[test]
    fn extracts_via_configured_selectors() {
        let extractor = Extractor::new();
        let html = format!(
            "<html><body><h1>Headline</h1><article>{}</article></body></html>",
            "Real article body content. ".repeat(10)
        );
        let result = extractor.extract_pure(&html, &config());
        assert_eq!(result.title, "Headline");
        assert_eq!(result.method, ExtractionMethod::Selectors);
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn recovers_via_variation_when_selector_misses() {
        let extractor = Extractor::new();
        let mut cfg = config();
        cfg.content_selector = ".article-body".to_string();
        let html = format!(
            "<html><body><h1>Headline</h1><div class=\"article_body\">{}</div></body></html>",
            "Real article body content. ".repeat(10)
        );
        let result = extractor.extract_pure(&html, &cfg);
        assert_eq!(result.method, ExtractionMethod::SelectorsVariation);
    }

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

    #[tokio::test]
    async fn low_quality_extraction_escalates_to_ai_reanalysis() {
        let llm = Arc::new(StubLlm {
            response: r#"{"title":"Real Headline","content":"A much longer, properly extracted article body that clears the quality bar easily.","confidence":0.8}"#.to_string(),
        });
        let extractor = Extractor::with_llm(llm, "gpt-4");
        let mut cfg = config();
        cfg.content_selector = ".menu".to_string();
        let html = "<html><body><h1>H</h1><div class=\"menu\">Home About Contact Menu</div></body></html>";
        let result = extractor.extract("https://example.com/a", html, &cfg).await.unwrap();
        assert_eq!(result.method, ExtractionMethod::AiReanalysis);
        assert_eq!(result.title, "Real Headline");
    }

    #[tokio::test]
    async fn falls_back_to_multi_attempt_recovery_without_llm() {
        let extractor = Extractor::new();
        let mut cfg = config();
        cfg.content_selector = ".missing".to_string();
        let html = format!(
            "<html><body><h1>Headline</h1><div class=\"something\"><p>Home</p><p>{}</p></div></body></html>",
            "A sufficiently long paragraph of real article prose for recovery. ".repeat(5)
        );
        let result = extractor.extract("https://example.com/a", &html, &cfg).await.unwrap();
        assert!(matches!(
            result.method,
            ExtractionMethod::MultiAttempt1 | ExtractionMethod::MultiAttempt2 | ExtractionMethod::MultiAttempt3
        ));
    }

    #[tokio::test]
    async fn skips_when_nothing_recovers() {
        let extractor = Extractor::new();
        let mut cfg = config();
        cfg.content_selector = ".missing".to_string();
        cfg.title_selector = "h1".to_string();
        let html = "<html><body><h1>Headline</h1></body></html>";
        let result = extractor.extract("https://example.com/a", html, &cfg).await;
        assert!(result.is_err());
    }
}
