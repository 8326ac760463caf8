//! A flat-file `SourceRepository`/`ArticleRepository`/`ErrorLog` for
//! operators running the engine standalone, without a database behind
//! it. Not meant to scale; it exists so `clipper-cli` has somewhere to
//! persist to out of the box (§6 "Repository" is a narrow trait —
//! this is one concrete, file-backed implementation of it).

use async_trait::async_trait;
use clipper_types::{Article, ArticleRepository, ClipperError, ErrorLog, ErrorLogRecord, Result, SelectorConfig, Source};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    sources: Vec<Source>,
    articles: Vec<Article>,
}

fn load(path: &Path) -> Snapshot {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|e| ClipperError::Other(anyhow::anyhow!(e)))
}

/// A single JSON file holding both tables. `sources.json` and
/// `articles.json` would be more "real" but operators running this
/// standalone care about one file they can glance at, not schema
/// purity.
pub struct JsonStore {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = load(&path);
        Self { path, snapshot: Mutex::new(snapshot) }
    }

    pub fn add_source(&self, url: String, name: String) -> Source {
        let source = Source {
            id: Uuid::new_v4(),
            url,
            name,
            last_scraped_at: None,
            selector_config: None,
        };
        let mut snapshot = self.snapshot.lock().unwrap();
        snapshot.sources.push(source.clone());
        let _ = save(&self.path, &snapshot);
        source
    }

    pub fn remove_source(&self, id: Uuid) -> bool {
        let mut snapshot = self.snapshot.lock().unwrap();
        let before = snapshot.sources.len();
        snapshot.sources.retain(|s| s.id != id);
        let removed = snapshot.sources.len() != before;
        if removed {
            let _ = save(&self.path, &snapshot);
        }
        removed
    }

    pub fn list_sources(&self) -> Vec<Source> {
        self.snapshot.lock().unwrap().sources.clone()
    }

    pub fn list_articles(&self) -> Vec<Article> {
        self.snapshot.lock().unwrap().articles.clone()
    }
}

#[async_trait]
impl clipper_types::SourceRepository for JsonStore {
    async fn list(&self) -> Result<Vec<Source>> {
        Ok(self.snapshot.lock().unwrap().sources.clone())
    }

    async fn update_scraped(&self, id: Uuid, at: chrono::DateTime<chrono::Utc>) -> Result<()> {
        let mut snapshot = self.snapshot.lock().unwrap();
        if let Some(s) = snapshot.sources.iter_mut().find(|s| s.id == id) {
            s.last_scraped_at = Some(at);
        }
        save(&self.path, &snapshot)
    }

    async fn update_config(&self, id: Uuid, cfg: SelectorConfig) -> Result<()> {
        let mut snapshot = self.snapshot.lock().unwrap();
        if let Some(s) = snapshot.sources.iter_mut().find(|s| s.id == id) {
            s.selector_config = Some(cfg);
        }
        save(&self.path, &snapshot)
    }
}

#[async_trait]
impl ArticleRepository for JsonStore {
    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        Ok(self.snapshot.lock().unwrap().articles.iter().any(|a| a.url == url))
    }

    async fn insert(&self, record: Article) -> Result<()> {
        let mut snapshot = self.snapshot.lock().unwrap();
        // ON CONFLICT DO NOTHING semantics on url (§5 idempotence).
        if snapshot.articles.iter().any(|a| a.url == record.url) {
            return Ok(());
        }
        snapshot.articles.push(record);
        save(&self.path, &snapshot)
    }
}

/// Error log sink that appends one JSON line per record next to the
/// store file, mirroring the append-only contract in §3 without
/// pulling in a database.
pub struct JsonlErrorLog {
    path: PathBuf,
}

impl JsonlErrorLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ErrorLog for JsonlErrorLog {
    async fn append(&self, record: ErrorLogRecord) -> Result<()> {
        use std::io::Write;
        let line = serde_json::to_string(&record)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ClipperError::Other(anyhow::anyhow!(e)))?;
        writeln!(file, "{line}").map_err(|e| ClipperError::Other(anyhow::anyhow!(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_is_idempotent_on_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("store.json"));
        let source = store.add_source("https://example.com".into(), "example".into());

        let article = Article {
            id: Uuid::new_v4(),
            source_id: source.id,
            url: "https://example.com/a".into(),
            title: "A".into(),
            body: "b".repeat(600),
            author: None,
            publish_date: None,
            summary: None,
            tags: vec![],
            flags: Default::default(),
        };

        store.insert(article.clone()).await.unwrap();
        let mut dup = article;
        dup.id = Uuid::new_v4();
        dup.title = "different title".into();
        store.insert(dup).await.unwrap();

        assert_eq!(store.list_articles().len(), 1);
        assert_eq!(store.list_articles()[0].title, "A");
    }

    #[tokio::test]
    async fn remove_source_reports_whether_it_existed() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("store.json"));
        let source = store.add_source("https://example.com".into(), "example".into());
        assert!(store.remove_source(source.id));
        assert!(!store.remove_source(source.id));
    }
}
