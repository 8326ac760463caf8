//! User-agent rotation and the realistic header set that travels with
//! every HTTP-tier request (§4.1 "rotated realistic headers").

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// A pool of modern Chrome/Safari desktop user-agent strings. Kept
/// small and current rather than exhaustive — breadth beyond "looks
/// like a real recent browser" buys nothing against header/body based
/// detection.
pub fn default_user_agents() -> Vec<&'static str> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    fn from_user_agent(ua: &str) -> Self {
        if ua.contains("Windows") {
            Platform::Windows
        } else if ua.contains("Macintosh") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn navigator_platform(&self) -> &'static str {
        match self {
            Platform::Windows => "Win32",
            Platform::MacOs => "MacIntel",
            Platform::Linux => "Linux x86_64",
        }
    }
}

/// Rotates through the user-agent pool and derives the matching
/// Sec-CH-UA / Sec-Fetch header set for each request.
pub struct UserAgentRotator {
    pool: Vec<String>,
}

impl UserAgentRotator {
    pub fn new() -> Self {
        Self {
            pool: default_user_agents().into_iter().map(String::from).collect(),
        }
    }

    pub fn with_pool(pool: Vec<String>) -> Self {
        Self { pool }
    }

    pub fn next(&self) -> &str {
        let mut rng = rand::thread_rng();
        self.pool.choose(&mut rng).map(String::as_str).unwrap_or(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        )
    }

    pub fn platform_for(ua: &str) -> Platform {
        Platform::from_user_agent(ua)
    }

    /// Build the realistic header set for a request carrying `user_agent`
    /// (§4.1: UA pool plus `Accept-Language`, `Sec-CH-UA-*`, `Sec-Fetch-*`).
    pub fn headers_for(&self, user_agent: &str) -> HashMap<String, String> {
        let platform = Self::platform_for(user_agent);
        let is_chrome = user_agent.contains("Chrome") && !user_agent.contains("Edg");

        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), user_agent.to_string());
        headers.insert(
            "Accept-Language".to_string(),
            Self::random_accept_language(),
        );
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
        );
        headers.insert("Sec-Fetch-Site".to_string(), "none".to_string());
        headers.insert("Sec-Fetch-Mode".to_string(), "navigate".to_string());
        headers.insert("Sec-Fetch-User".to_string(), "?1".to_string());
        headers.insert("Sec-Fetch-Dest".to_string(), "document".to_string());

        if is_chrome {
            headers.insert(
                "Sec-CH-UA".to_string(),
                r#""Chromium";v="124", "Google Chrome";v="124", "Not-A.Brand";v="99""#.to_string(),
            );
            headers.insert("Sec-CH-UA-Mobile".to_string(), "?0".to_string());
            let ch_platform = match platform {
                Platform::Windows => "\"Windows\"",
                Platform::MacOs => "\"macOS\"",
                Platform::Linux => "\"Linux\"",
            };
            headers.insert("Sec-CH-UA-Platform".to_string(), ch_platform.to_string());
        }

        headers
    }

    fn random_accept_language() -> String {
        let mut rng = rand::thread_rng();
        let pool = [
            "en-US,en;q=0.9",
            "en-GB,en;q=0.9",
            "en-US,en;q=0.9,es;q=0.8",
        ];
        pool[rng.gen_range(0..pool.len())].to_string()
    }
}

impl Default for UserAgentRotator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_include_ch_ua_for_chrome() {
        let rotator = UserAgentRotator::new();
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
        let headers = rotator.headers_for(ua);
        assert!(headers.contains_key("Sec-CH-UA"));
        assert!(headers.contains_key("Sec-Fetch-Mode"));
        assert_eq!(headers["Sec-CH-UA-Platform"], "\"Windows\"");
    }

    #[test]
    fn safari_headers_omit_ch_ua() {
        let rotator = UserAgentRotator::new();
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
        let headers = rotator.headers_for(ua);
        assert!(!headers.contains_key("Sec-CH-UA"));
    }

    #[test]
    fn platform_detection() {
        assert_eq!(
            UserAgentRotator::platform_for("... Linux x86_64 ..."),
            Platform::Linux
        );
    }
}
