//! Core data model shared across the ingestion pipeline.

use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A registered content source. Persisted; mutated only by the
/// extraction pipeline (`selector_config` learned, `last_scraped_at`
/// stamped on completion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub selector_config: Option<SelectorConfig>,
}

/// Flags derived during or after extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleFlags {
    pub cybersecurity: bool,
    pub security_score: Option<f32>,
}

/// An extracted article. Created once per unique URL; immutable
/// afterwards except for derived tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub source_id: Uuid,
    pub url: String,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub flags: ArticleFlags,
}

/// Selectors learned for a domain, with alternatives kept around for
/// the extractor's recovery passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub title_selector: String,
    pub content_selector: String,
    pub author_selector: Option<String>,
    pub date_selector: Option<String>,
    pub article_container_selector: Option<String>,
    pub alternatives: HashMap<String, Vec<String>>,
    pub confidence: f32,
}

impl SelectorConfig {
    /// §3 invariant: title/content selectors must be non-empty,
    /// non-"undefined", and not textual content. A config failing
    /// this must never enter the cache.
    pub fn is_valid(&self) -> bool {
        Self::is_valid_selector(&self.title_selector) && Self::is_valid_selector(&self.content_selector)
    }

    pub fn is_valid_selector(selector: &str) -> bool {
        let trimmed = selector.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("undefined") {
            return false;
        }
        !crate::text_patterns::looks_like_textual_content(trimmed)
    }
}

/// A derived classification of the remote server's anti-bot posture.
/// Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtectionKind {
    None,
    Cloudflare,
    Datadome,
    Recaptcha,
    GenericChallenge,
    RateLimited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionSignal {
    pub kind: ProtectionKind,
    /// Confidence in [0, 100].
    pub confidence: u8,
    pub indicators: Vec<String>,
}

impl ProtectionSignal {
    pub fn none() -> Self {
        Self {
            kind: ProtectionKind::None,
            confidence: 0,
            indicators: Vec::new(),
        }
    }

    pub fn blocks_content(&self) -> bool {
        self.confidence >= 50
    }
}

/// The fetch method actually used to obtain a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    Http,
    Headless,
}

/// Transient result of a single `fetch` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub success: bool,
    pub html: Option<String>,
    pub final_url: String,
    pub status_code: Option<u16>,
    pub protection: ProtectionSignal,
    pub method: FetchMethod,
}

/// The recovery path an extraction took (§4.3 step 7). Named rather
/// than numbered so a log line is self-explanatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    Selectors,
    SelectorsVariation,
    AiReanalysis,
    MultiAttempt1,
    MultiAttempt2,
    MultiAttempt3,
    HeadlessPreExtracted,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExtractionMethod::Selectors => "selectors",
            ExtractionMethod::SelectorsVariation => "selectors+variation",
            ExtractionMethod::AiReanalysis => "ai-reanalysis",
            ExtractionMethod::MultiAttempt1 => "multi-attempt-1",
            ExtractionMethod::MultiAttempt2 => "multi-attempt-2",
            ExtractionMethod::MultiAttempt3 => "multi-attempt-3",
            ExtractionMethod::HeadlessPreExtracted => "headless-pre-extracted",
        };
        f.write_str(s)
    }
}

/// `extract(html, config) -> ArticleContent` (§4.3 contract). Pure;
/// carries no I/O state, unlike `Article` which additionally has
/// identity and storage fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub method: ExtractionMethod,
    pub confidence: f32,
}

/// Append-only error log record. Written from every component on
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogRecord {
    pub user_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
    pub source_url: String,
    pub article_url: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
    pub method: String,
    pub step: String,
    pub retry_count: u32,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorLogRecord {
    pub fn new(source_url: impl Into<String>, kind: ErrorKind, step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: None,
            source_id: None,
            source_url: source_url.into(),
            article_url: None,
            kind,
            message: message.into(),
            method: String::new(),
            step: step.into(),
            retry_count: 0,
            details: None,
            timestamp: Utc::now(),
        }
    }
}
