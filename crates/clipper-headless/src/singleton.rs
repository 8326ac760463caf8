//! The one shared headless-browser instance per process (§4.1.2).
//! Guarded lazy init, a health probe before every handout, launch
//! retries with exponential backoff, and page-count capping.

use chromiumoxide::{Browser, BrowserConfig, Page};
use clipper_types::{ClipperError, Result};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const MAX_OPEN_PAGES: usize = 5;
const LAUNCH_RETRY_DELAYS_SECS: [u64; 3] = [5, 10, 15];
const PROTOCOL_TIMEOUTS_MINS: [u64; 3] = [10, 20, 30];
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const GRACEFUL_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

struct BrowserHandle {
    browser: Browser,
    _handler: tokio::task::JoinHandle<()>,
}

/// The process-wide singleton. One launch attempt in flight at a time
/// is enforced by holding the mutex across the entire init-or-reuse
/// path, rather than a separate "once" cell, so a health-check
/// failure mid-handout can recreate without racing a second caller.
pub struct BrowserSingleton {
    inner: Mutex<Option<BrowserHandle>>,
    browser_search_paths: Vec<String>,
    default_page_timeout: Duration,
}

impl BrowserSingleton {
    pub fn new(browser_search_paths: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(None),
            browser_search_paths,
            default_page_timeout: Duration::from_secs(60),
        }
    }

    /// Per-page operation timeout enforced by callers (§4.1.2: capped
    /// at 60s).
    pub fn default_page_timeout(&self) -> Duration {
        self.default_page_timeout
    }

    /// Hand out a fresh page for `url`, launching or recreating the
    /// shared browser as needed.
    pub async fn checkout_page(&self, url: &str) -> Result<Page> {
        let mut guard = self.inner.lock().await;

        let needs_recreate = match guard.as_ref() {
            None => true,
            Some(handle) => !Self::probe_healthy(handle).await,
        };

        if needs_recreate {
            if let Some(mut stale) = guard.take() {
                Self::graceful_close(&mut stale).await;
            }
            *guard = Some(Self::launch_with_retry(&self.browser_search_paths).await?);
        }

        let handle = guard.as_ref().expect("just ensured a browser handle exists");
        Self::enforce_page_cap(&handle.browser).await;

        let page = handle
            .browser
            .new_page(url)
            .await
            .map_err(|e| ClipperError::Headless(format!("failed to open page: {e}")))?;

        Ok(page)
    }

    async fn probe_healthy(handle: &BrowserHandle) -> bool {
        match tokio::time::timeout(HEALTH_PROBE_TIMEOUT, handle.browser.version()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "browser health probe returned an error");
                false
            }
            Err(_) => {
                warn!("browser health probe timed out");
                false
            }
        }
    }

    async fn graceful_close(handle: &mut BrowserHandle) {
        match tokio::time::timeout(GRACEFUL_CLOSE_TIMEOUT, handle.browser.close()).await {
            Ok(Ok(_)) => debug!("browser closed gracefully"),
            Ok(Err(e)) => warn!(error = %e, "error closing stale browser"),
            Err(_) => warn!("graceful close timed out, dropping handle anyway"),
        }
    }

    async fn enforce_page_cap(browser: &Browser) {
        let pages = match browser.pages().await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to list open pages for capping");
                return;
            }
        };
        if pages.len() <= MAX_OPEN_PAGES {
            return;
        }
        // Keep the first and last two; close everything in between.
        let keep_last_from = pages.len().saturating_sub(2);
        for (idx, page) in pages.iter().enumerate() {
            if idx == 0 || idx >= keep_last_from {
                continue;
            }
            if let Err(e) = page.close().await {
                warn!(error = %e, "failed to close excess page");
            }
        }
    }

    async fn launch_with_retry(browser_search_paths: &[String]) -> Result<BrowserHandle> {
        let mut last_error = None;
        for (attempt, delay_secs) in std::iter::once(0).chain(LAUNCH_RETRY_DELAYS_SECS).enumerate() {
            if attempt > 0 {
                info!(attempt, delay_secs, "retrying headless browser launch");
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }

            let protocol_timeout = Duration::from_secs(60 * PROTOCOL_TIMEOUTS_MINS[attempt.min(2)]);
            match Self::launch_once(browser_search_paths, protocol_timeout).await {
                Ok(handle) => return Ok(handle),
                Err(e) => {
                    warn!(attempt, error = %e, "headless browser launch failed");
                    last_error = Some(e);
                }
            }

            if attempt == LAUNCH_RETRY_DELAYS_SECS.len() {
                break;
            }
        }

        Err(last_error.unwrap_or_else(|| ClipperError::Headless("browser launch exhausted retries".to_string())))
    }

    async fn launch_once(browser_search_paths: &[String], protocol_timeout: Duration) -> Result<BrowserHandle> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .request_timeout(protocol_timeout);

        if let Some(path) = browser_search_paths.iter().find(|p| std::path::Path::new(p).exists()) {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| ClipperError::Headless(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ClipperError::Headless(format!("browser launch failed: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "headless browser event error");
                }
            }
        });

        Ok(BrowserHandle {
            browser,
            _handler: handler_task,
        })
    }
}
