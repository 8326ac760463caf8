//! Bounded exponential backoff with jitter for HTTP-tier retries.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Delay before retry attempt `attempt` (1-indexed). Exponential
    /// growth capped at `max_delay`, with up to ±25% jitter to avoid
    /// synchronised retries across callers.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay.as_millis() as f64);
        let millis = if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.75..1.25);
            (capped * jitter_factor).min(self.max_delay.as_millis() as f64)
        } else {
            capped
        };
        Duration::from_millis(millis.max(0.0) as u64)
    }

    /// Whether a given HTTP status code warrants a retry attempt.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_without_jitter() {
        let cfg = RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        };
        assert_eq!(cfg.calculate_delay(1), Duration::from_millis(500));
        assert_eq!(cfg.calculate_delay(2), Duration::from_millis(1000));
        assert_eq!(cfg.calculate_delay(3), Duration::from_millis(2000));
    }

    #[test]
    fn delay_capped_at_max() {
        let cfg = RetryConfig {
            jitter: false,
            max_delay: Duration::from_millis(1200),
            ..RetryConfig::default()
        };
        assert_eq!(cfg.calculate_delay(5), Duration::from_millis(1200));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let cfg = RetryConfig::default();
        for _ in 0..200 {
            let d = cfg.calculate_delay(2);
            assert!(d.as_millis() <= cfg.max_delay.as_millis());
        }
    }

    #[test]
    fn retryable_status_classification() {
        assert!(RetryConfig::is_retryable_status(503));
        assert!(RetryConfig::is_retryable_status(429));
        assert!(!RetryConfig::is_retryable_status(404));
        assert!(!RetryConfig::is_retryable_status(200));
    }
}
