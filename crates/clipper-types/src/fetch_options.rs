//! The enumerated fetch options from §6 "External Interfaces".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchIntent {
    Source,
    Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceMethod {
    Http,
    Headless,
    Auto,
}

/// Per-request overrides for link discovery, threaded through from
/// `FetchOptions` into the spider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiLinkContext {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOptions {
    pub intent: FetchIntent,
    pub force_method: ForceMethod,
    pub timeout_ms: u64,
    pub handle_dynamic: bool,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_links: usize,
    pub ai_context: Option<AiLinkContext>,
}

impl FetchOptions {
    pub fn for_source() -> Self {
        Self {
            intent: FetchIntent::Source,
            force_method: ForceMethod::Auto,
            timeout_ms: 30_000,
            handle_dynamic: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            max_links: 50,
            ai_context: None,
        }
    }

    pub fn for_article() -> Self {
        Self {
            intent: FetchIntent::Article,
            force_method: ForceMethod::Auto,
            timeout_ms: 30_000,
            handle_dynamic: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            max_links: 50,
            ai_context: None,
        }
    }
}
