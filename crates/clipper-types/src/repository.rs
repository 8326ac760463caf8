//! Narrow repository boundaries to persistence. Implemented elsewhere
//! (§6 "Repository") — the engine only ever talks to these traits.

use crate::error::Result;
use crate::model::{Article, ErrorLogRecord, Source, SelectorConfig};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Source>>;
    async fn update_scraped(&self, id: Uuid, at: chrono::DateTime<chrono::Utc>) -> Result<()>;
    async fn update_config(&self, id: Uuid, cfg: SelectorConfig) -> Result<()>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn exists_by_url(&self, url: &str) -> Result<bool>;
    async fn insert(&self, record: Article) -> Result<()>;
}

#[async_trait]
pub trait ErrorLog: Send + Sync {
    async fn append(&self, record: ErrorLogRecord) -> Result<()>;
}
