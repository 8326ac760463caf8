//! Per-domain selector cache, exclusively owned by the Structure
//! Engine (§3 "Ownership").

use clipper_types::SelectorConfig;
use dashmap::DashMap;

pub struct SelectorCache {
    entries: DashMap<String, SelectorConfig>,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Registrable domain key: host with any leading `www.` stripped.
    pub fn domain_key(url: &str) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Returns the cached config only if it still passes validity
    /// (§4.2 step 1: "If cache hit and stored config passes validity
    /// checks, return it").
    pub fn get(&self, domain: &str) -> Option<SelectorConfig> {
        let entry = self.entries.get(domain)?;
        if entry.is_valid() {
            Some(entry.clone())
        } else {
            drop(entry);
            self.entries.remove(domain);
            None
        }
    }

    /// Only configs passing validity ever enter the cache (§4.2
    /// step 7, §3 invariant).
    pub fn put(&self, domain: impl Into<String>, config: SelectorConfig) {
        if config.is_valid() {
            self.entries.insert(domain.into(), config);
        }
    }

    pub fn evict(&self, domain: &str) {
        self.entries.remove(domain);
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(title: &str) -> SelectorConfig {
        SelectorConfig {
            title_selector: title.to_string(),
            content_selector: "article".to_string(),
            author_selector: None,
            date_selector: None,
            article_container_selector: None,
            alternatives: HashMap::new(),
            confidence: 0.8,
        }
    }

    #[test]
    fn strips_www_prefix() {
        assert_eq!(SelectorCache::domain_key("https://www.example.com/a").unwrap(), "example.com");
        assert_eq!(SelectorCache::domain_key("https://example.com/a").unwrap(), "example.com");
    }

    #[test]
    fn invalid_config_never_cached() {
        let cache = SelectorCache::new();
        cache.put("example.com", config("By Jane Smith"));
        assert!(cache.get("example.com").is_none());
    }

    #[test]
    fn valid_config_round_trips() {
        let cache = SelectorCache::new();
        cache.put("example.com", config("h1"));
        assert!(cache.get("example.com").is_some());
        cache.evict("example.com");
        assert!(cache.get("example.com").is_none());
    }
}
