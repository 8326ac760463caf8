//! The engine's top-level configuration, assembled from environment
//! signals (§6). Each deployment overrides these via `CLIPPER_*` env
//! vars; unset values fall back to the literal defaults below.

use crate::env::EnvConfigLoader;
use crate::resource_mode::ResourceMode;
use std::str::FromStr;
use tracing::warn;

/// Default ordered search path for a system/embedded Chromium binary,
/// checked before falling back to `PATH` lookup and then an embedded
/// download (§6).
const DEFAULT_BROWSER_SEARCH_PATHS: &[&str] = &[
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

#[derive(Debug, Clone)]
pub struct VirtualDisplayConfig {
    pub enabled: bool,
    /// Xvfb/Xvnc binary name used to verify the dependency is present.
    pub server_binary: String,
}

impl Default for VirtualDisplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_binary: "Xvfb".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClipperConfig {
    pub max_concurrent_requests: usize,
    pub request_timeout_ms: u64,
    pub enable_advanced_fingerprinting: bool,
    pub resource_mode: ResourceMode,
    pub browser_search_paths: Vec<String>,
    pub virtual_display: VirtualDisplayConfig,
    /// Default per-source article concurrency (§4.5 "concurrency").
    pub concurrency: usize,
    /// Scheduler period in hours (§4.5, default 3).
    pub interval_hours: u64,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 3,
            request_timeout_ms: 30_000,
            enable_advanced_fingerprinting: true,
            resource_mode: ResourceMode::Balanced,
            browser_search_paths: DEFAULT_BROWSER_SEARCH_PATHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            virtual_display: VirtualDisplayConfig::default(),
            concurrency: 3,
            interval_hours: 3,
        }
    }
}

impl ClipperConfig {
    /// Load configuration from the environment, falling back to
    /// `Self::default()`'s literal values for anything unset.
    pub fn from_env() -> Self {
        let loader = EnvConfigLoader::new().with_prefix("CLIPPER_");
        let defaults = Self::default();

        let max_concurrent_requests = loader
            .get_uint("max_concurrent_requests")
            .unwrap_or(defaults.max_concurrent_requests as u64) as usize;
        let request_timeout_ms = loader
            .get_uint("request_timeout_ms")
            .unwrap_or(defaults.request_timeout_ms);
        let enable_advanced_fingerprinting = loader
            .get_bool("enable_advanced_fingerprinting")
            .unwrap_or(defaults.enable_advanced_fingerprinting);
        let resource_mode = loader
            .get("resource_mode")
            .ok()
            .and_then(|v| {
                ResourceMode::from_str(&v)
                    .map_err(|e| warn!(value = %v, error = %e, "invalid CLIPPER_RESOURCE_MODE"))
                    .ok()
            })
            .unwrap_or(defaults.resource_mode);
        let browser_search_paths = loader
            .get_list("browser_search_paths")
            .unwrap_or(defaults.browser_search_paths.clone());
        let virtual_display_enabled = loader
            .get_bool("virtual_display_enabled")
            .unwrap_or(defaults.virtual_display.enabled);
        let concurrency = loader
            .get_uint("concurrency")
            .unwrap_or(defaults.concurrency as u64) as usize;
        let interval_hours = loader
            .get_uint("interval_hours")
            .unwrap_or(defaults.interval_hours);

        Self {
            max_concurrent_requests,
            request_timeout_ms,
            enable_advanced_fingerprinting,
            resource_mode,
            browser_search_paths,
            virtual_display: VirtualDisplayConfig {
                enabled: virtual_display_enabled,
                ..defaults.virtual_display
            },
            concurrency,
            interval_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_literals() {
        let cfg = ClipperConfig::default();
        assert_eq!(cfg.concurrency, 3);
        assert_eq!(cfg.interval_hours, 3);
        assert_eq!(cfg.request_timeout_ms, 30_000);
        assert!(cfg.enable_advanced_fingerprinting);
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        let cfg = ClipperConfig::from_env();
        assert_eq!(cfg.max_concurrent_requests, 3);
    }
}
