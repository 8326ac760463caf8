//! Implements `clipper_fetch::HeadlessTier` over the browser singleton,
//! applying stealth injection before navigation and the HTMX loader
//! for source pages afterwards.

use crate::htmx;
use crate::singleton::BrowserSingleton;
use crate::virtual_display::VirtualDisplayGuard;
use async_trait::async_trait;
use clipper_config::ClipperConfig;
use clipper_fetch::{HeadlessFetchResult, HeadlessTier};
use clipper_stealth::StealthController;
use clipper_types::{ClipperError, FetchIntent, FetchOptions, Result};
use tokio::sync::Mutex;

pub struct HeadlessBrowserTier {
    singleton: BrowserSingleton,
    stealth: StealthController,
    http_client: reqwest::Client,
    _virtual_display: Mutex<Option<VirtualDisplayGuard>>,
}

impl HeadlessBrowserTier {
    pub async fn new(config: &ClipperConfig) -> Result<Self> {
        let virtual_display = VirtualDisplayGuard::acquire(&config.virtual_display).await?;
        if let Some(guard) = &virtual_display {
            std::env::set_var("DISPLAY", &guard.display);
        }

        Ok(Self {
            singleton: BrowserSingleton::new(config.browser_search_paths.clone()),
            stealth: StealthController::new(),
            http_client: reqwest::Client::new(),
            _virtual_display: Mutex::new(virtual_display),
        })
    }
}

#[async_trait]
impl HeadlessTier for HeadlessBrowserTier {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<HeadlessFetchResult> {
        let page = self.singleton.checkout_page(url).await?;

        let headers = self.stealth.next_headers();
        let user_agent = headers.get("User-Agent").cloned().unwrap_or_default();
        let (_profile, init_script) = self.stealth.prepare_page(&user_agent);

        page.evaluate_on_new_document(init_script.as_str())
            .await
            .map_err(|e| ClipperError::Headless(format!("failed to inject stealth script: {e}")))?;

        let timeout = self.singleton.default_page_timeout();
        tokio::time::timeout(timeout, page.wait_for_navigation())
            .await
            .map_err(|_| ClipperError::Timeout(timeout.as_secs()))?
            .map_err(|e| ClipperError::Headless(format!("navigation failed: {e}")))?;

        if options.intent == FetchIntent::Source && options.handle_dynamic {
            if let Err(e) = htmx::detect_and_probe(&page, &self.http_client).await {
                tracing::warn!(error = %e, url, "htmx loader failed, continuing with rendered DOM");
            }
        }

        let html = page
            .content()
            .await
            .map_err(|e| ClipperError::Headless(format!("failed to read page content: {e}")))?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        let _ = page.close().await;

        Ok(HeadlessFetchResult {
            html,
            final_url,
            status_code: Some(200),
        })
    }
}
