//! The tiered fetch engine (§4.1): HTTP tier with rotated headers and
//! per-host circuit breaking, escalating to the headless tier, and
//! finally giving up with a classified `FetchOutcome`.

use crate::circuit::{self, CircuitBreaker};
use crate::protection::ProtectionDetector;
use crate::retry::RetryConfig;
use crate::tiers::HeadlessTier;
use clipper_stealth::StealthController;
use clipper_types::{ClipperError, FetchIntent, FetchMethod, FetchOptions, FetchOutcome, ForceMethod, ProtectionSignal, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const MIN_CANDIDATE_BODY_BYTES: usize = 1024;
const HEADLESS_ESCALATION_CONFIDENCE: u8 = 50;

pub struct FetchEngine {
    client: reqwest::Client,
    stealth: StealthController,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    retry: RetryConfig,
    headless: Option<Arc<dyn HeadlessTier>>,
}

impl FetchEngine {
    pub fn new(headless: Option<Arc<dyn HeadlessTier>>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client builds with default TLS backend"),
            stealth: StealthController::new(),
            breakers: DashMap::new(),
            retry: RetryConfig::default(),
            headless,
        }
    }

    fn breaker_for_host(&self, host: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(host.to_string())
            .or_insert_with(|| CircuitBreaker::new(circuit::Config::default(), Arc::new(circuit::RealClock)))
            .clone()
    }

    /// `fetch(url, intent, options) -> FetchOutcome` (§4.1 contract).
    pub async fn fetch(&self, url: &str, intent: FetchIntent, options: &FetchOptions) -> Result<FetchOutcome> {
        let _ = intent;
        let parsed = url::Url::parse(url)?;
        let host = parsed.host_str().unwrap_or(url).to_string();

        match options.force_method {
            ForceMethod::Http => {
                return Ok(self
                    .try_http_tier(url, &host, options)
                    .await
                    .unwrap_or_else(|| Self::gave_up(url)));
            }
            ForceMethod::Headless => {
                return Ok(self
                    .try_headless_tier(url, options)
                    .await
                    .unwrap_or_else(|| Self::gave_up(url)));
            }
            ForceMethod::Auto => {}
        }

        if let Some(http_outcome) = self.try_http_tier(url, &host, options).await {
            let body_len = http_outcome.html.as_deref().map(str::len).unwrap_or(0);
            if http_outcome.success && body_len >= MIN_CANDIDATE_BODY_BYTES {
                return Ok(http_outcome);
            }
            let needs_headless = !http_outcome.success
                || body_len < MIN_CANDIDATE_BODY_BYTES
                || (http_outcome.protection.confidence >= HEADLESS_ESCALATION_CONFIDENCE && body_len == 0);
            if needs_headless {
                if let Some(outcome) = self.try_headless_tier(url, options).await {
                    return Ok(outcome);
                }
            }
            // §4.1 step 3 / §8: method=http must never carry a sub-1KB
            // body with success=true — no headless outcome recovered
            // it, so this is a give-up, not a usable candidate.
            if body_len < MIN_CANDIDATE_BODY_BYTES {
                return Ok(Self::gave_up(url));
            }
            return Ok(http_outcome);
        }

        if let Some(outcome) = self.try_headless_tier(url, options).await {
            return Ok(outcome);
        }

        Ok(Self::gave_up(url))
    }

    /// §4.1 step 3: "give up" — a failed, unclassified outcome with no
    /// further retry within this call.
    fn gave_up(url: &str) -> FetchOutcome {
        FetchOutcome {
            success: false,
            html: None,
            final_url: url.to_string(),
            status_code: None,
            protection: ProtectionSignal::none(),
            method: FetchMethod::Http,
        }
    }

    async fn try_http_tier(&self, url: &str, host: &str, options: &FetchOptions) -> Option<FetchOutcome> {
        let breaker = self.breaker_for_host(host);
        let mut last_outcome: Option<FetchOutcome> = None;

        for attempt in 1..=self.retry.max_attempts {
            let permit = match breaker.try_acquire() {
                Ok(permit) => permit,
                Err(_) => return last_outcome,
            };

            let headers = self.stealth.next_headers();
            let mut request = self.client.get(url).timeout(Duration::from_millis(options.timeout_ms));
            for (key, value) in &headers {
                request = request.header(key, value);
            }

            let response = request.send().await;
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let header_map: HashMap<String, String> = resp
                        .headers()
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                        .collect();
                    let final_url = resp.url().to_string();
                    let body = resp.text().await.unwrap_or_default();
                    let protection = ProtectionDetector::detect(status, &header_map, &body);
                    let success = (200..300).contains(&status);

                    if success {
                        breaker.on_success();
                        drop(permit);
                        return Some(FetchOutcome {
                            success: true,
                            html: Some(body),
                            final_url,
                            status_code: Some(status),
                            protection,
                            method: FetchMethod::Http,
                        });
                    }

                    last_outcome = Some(FetchOutcome {
                        success: false,
                        html: if body.is_empty() { None } else { Some(body) },
                        final_url,
                        status_code: Some(status),
                        protection,
                        method: FetchMethod::Http,
                    });

                    if RetryConfig::is_retryable_status(status) && attempt < self.retry.max_attempts {
                        breaker.on_failure();
                        drop(permit);
                        tokio::time::sleep(self.retry.calculate_delay(attempt)).await;
                        continue;
                    }
                    breaker.on_failure();
                    drop(permit);
                    return last_outcome;
                }
                Err(e) => {
                    tracing::warn!(error = %e, url, attempt, "http tier transport error");
                    breaker.on_failure();
                    drop(permit);
                    last_outcome = None;
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.calculate_delay(attempt)).await;
                        continue;
                    }
                }
            }
        }

        last_outcome
    }

    async fn try_headless_tier(&self, url: &str, options: &FetchOptions) -> Option<FetchOutcome> {
        let headless = self.headless.as_ref()?;
        match headless.fetch(url, options).await {
            Ok(result) => {
                let protection = ProtectionDetector::detect(result.status_code.unwrap_or(200), &HashMap::new(), &result.html);
                Some(FetchOutcome {
                    success: true,
                    html: Some(result.html),
                    final_url: result.final_url,
                    status_code: result.status_code,
                    protection,
                    method: FetchMethod::Headless,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, url, "headless tier failed");
                match e {
                    ClipperError::ShuttingDown => None,
                    _ => Some(FetchOutcome {
                        success: false,
                        html: None,
                        final_url: url.to_string(),
                        status_code: None,
                        protection: ProtectionSignal::none(),
                        method: FetchMethod::Headless,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn http_tier_accepts_large_body() {
        let server = MockServer::start().await;
        let body = "x".repeat(2048);
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(None);
        let url = format!("{}/ok", server.uri());
        let outcome = engine.fetch(&url, FetchIntent::Article, &FetchOptions::for_article()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.method, FetchMethod::Http);
        assert_eq!(outcome.html.unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn http_tier_reports_protection_but_still_uses_large_body() {
        let server = MockServer::start().await;
        let body = format!("<html><body>{}challenge-form</body></html>", "x".repeat(2048));
        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(403).insert_header("cf-ray", "8abc").set_body_string(body))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(None);
        let url = format!("{}/blocked", server.uri());
        let outcome = engine.fetch(&url, FetchIntent::Article, &FetchOptions::for_article()).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.protection.confidence >= 70);
    }

    #[tokio::test]
    async fn tiny_body_without_headless_tier_gives_up_gracefully() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tiny"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(None);
        let url = format!("{}/tiny", server.uri());
        let outcome = engine.fetch(&url, FetchIntent::Article, &FetchOptions::for_article()).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.html.is_none());
    }

    #[tokio::test]
    async fn force_method_http_never_tries_headless_tier_with_none_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tiny"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(None);
        let mut options = FetchOptions::for_article();
        options.force_method = ForceMethod::Http;
        let url = format!("{}/tiny", server.uri());
        let outcome = engine.fetch(&url, FetchIntent::Article, &options).await.unwrap();
        assert_eq!(outcome.method, FetchMethod::Http);
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn force_method_headless_gives_up_cleanly_with_no_headless_tier_configured() {
        let engine = FetchEngine::new(None);
        let mut options = FetchOptions::for_article();
        options.force_method = ForceMethod::Headless;
        let outcome = engine.fetch("https://example.com/a", FetchIntent::Article, &options).await.unwrap();
        assert!(!outcome.success);
    }
}
