//! Bot-protection detection from response status, headers and body
//! (§4.1 "Protection detection").

use clipper_types::{ProtectionKind, ProtectionSignal};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static BODY_MARKERS: &[&str] = &[
    "challenge-form",
    "cf-chl-bypass",
    "cf-browser-verification",
    "_cf_chl_jschl_tk",
    "datadome",
    "recaptcha",
];

static TITLE_WORDS: &[&str] = &["just a moment", "checking your browser", "access denied"];

static RATE_LIMIT_SUBSTRINGS: &[&str] = &["rate limit", "too many requests", "please slow down"];

static TITLE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?is)<script[^>]+src=["']([^"']+)["']"#).unwrap());

pub struct ProtectionDetector;

impl ProtectionDetector {
    /// Derive a `ProtectionSignal` from a response's status, headers
    /// and body. Confidence accumulates per matched indicator and is
    /// capped to `[0, 100]`.
    pub fn detect(status: u16, headers: &HashMap<String, String>, body: &str) -> ProtectionSignal {
        let mut confidence: i32 = 0;
        let mut indicators = Vec::new();
        let mut kind = ProtectionKind::None;

        if matches!(status, 403 | 503 | 429) {
            confidence += 30;
            indicators.push(format!("status:{status}"));
        }

        let headers_lower: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{} ", k.to_lowercase(), v.to_lowercase()))
            .collect();

        if headers_lower.contains("cloudflare") || headers_lower.contains("cf-ray") {
            kind = ProtectionKind::Cloudflare;
            confidence += 40;
            indicators.push("header:cloudflare".to_string());
        }

        if headers_lower.contains("datadome") {
            kind = ProtectionKind::Datadome;
            confidence += 40;
            indicators.push("header:datadome".to_string());
        }

        let body_lower = body.to_lowercase();
        for marker in BODY_MARKERS {
            if body_lower.contains(marker) {
                confidence += 15;
                indicators.push(format!("body:{marker}"));
                if *marker == "recaptcha" && kind == ProtectionKind::None {
                    kind = ProtectionKind::Recaptcha;
                }
                if *marker == "datadome" && kind == ProtectionKind::None {
                    kind = ProtectionKind::Datadome;
                }
            }
        }

        if let Some(captures) = TITLE_TAG.captures(body) {
            let title = captures.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            for word in TITLE_WORDS {
                if title.contains(word) {
                    confidence += 20;
                    indicators.push(format!("title:{word}"));
                    if kind == ProtectionKind::None {
                        kind = ProtectionKind::GenericChallenge;
                    }
                }
            }
        }

        for m in SCRIPT_SRC.captures_iter(body) {
            if let Some(src) = m.get(1) {
                let src = src.as_str().to_lowercase();
                if src.contains("cloudflare") || src.contains("challenge") || src.contains("recaptcha") {
                    confidence += 20;
                    indicators.push(format!("script-src:{src}"));
                }
            }
        }

        let is_rate_limited = headers.contains_key("retry-after")
            || matches!(status, 429 | 503)
            || RATE_LIMIT_SUBSTRINGS.iter().any(|s| body_lower.contains(s));

        if is_rate_limited {
            confidence += if matches!(status, 429 | 503) { 0 } else { 25 };
            indicators.push("rate-limited".to_string());
            if kind == ProtectionKind::None {
                kind = ProtectionKind::RateLimited;
            }
        }

        if kind == ProtectionKind::None && confidence > 0 {
            kind = ProtectionKind::GenericChallenge;
        }

        ProtectionSignal {
            kind,
            confidence: confidence.clamp(0, 100) as u8,
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn cloudflare_challenge_scores_high_confidence() {
        let h = headers(&[("cf-ray", "8abc123")]);
        let body = "<html><body><div class=\"challenge-form\">verifying</div></body></html>";
        let sig = ProtectionDetector::detect(403, &h, body);
        assert_eq!(sig.kind, ProtectionKind::Cloudflare);
        assert!(sig.confidence >= 70);
    }

    #[test]
    fn clean_response_has_no_protection() {
        let sig = ProtectionDetector::detect(200, &HashMap::new(), "<html><body>hello</body></html>");
        assert_eq!(sig.kind, ProtectionKind::None);
        assert_eq!(sig.confidence, 0);
    }

    #[test]
    fn rate_limit_via_retry_after_header() {
        let h = headers(&[("retry-after", "30")]);
        let sig = ProtectionDetector::detect(429, &h, "too many requests, please wait");
        assert_eq!(sig.kind, ProtectionKind::RateLimited);
        assert!(sig.confidence > 0);
    }

    #[test]
    fn challenge_title_bumps_confidence() {
        let body = "<html><head><title>Just a moment...</title></head><body></body></html>";
        let sig = ProtectionDetector::detect(503, &HashMap::new(), body);
        assert!(sig.confidence >= 50);
    }
}
