//! The headless-browser tier contract. Implemented by `clipper-headless`;
//! kept here so `clipper-fetch` owns the tiered dispatch logic without
//! depending on the (heavy) browser crate.

use async_trait::async_trait;
use clipper_types::{FetchOptions, Result};

#[derive(Debug, Clone)]
pub struct HeadlessFetchResult {
    pub html: String,
    pub final_url: String,
    pub status_code: Option<u16>,
}

/// Abstraction over the headless-browser fetch path (§4.1.2, §4.1.3).
#[async_trait]
pub trait HeadlessTier: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<HeadlessFetchResult>;
}
