//! The engine context (§9 "plain context record instead of a class
//! hierarchy"): the collaborators a scrape run needs, bundled flat
//! rather than behind an inheritance chain. `Engine` is both that
//! context and the `ScrapeRunner` the scheduler drives.

use crate::source::process_source;
use async_trait::async_trait;
use clipper_extraction::Extractor;
use clipper_fetch::FetchEngine;
use clipper_scheduler::{ActiveFlags, RunSummary, ScrapeRunner};
use clipper_spider::LinkDiscovery;
use clipper_structure::StructureEngine;
use clipper_types::{ArticleRepository, ErrorLog, Result, SourceRepository};
use std::sync::Arc;
use tracing::{error, info};

/// Bounded per-source article concurrency (§4.5, §5 default).
pub const DEFAULT_ARTICLE_CONCURRENCY: usize = 3;

pub struct Engine {
    pub fetch: Arc<FetchEngine>,
    pub structure: Arc<StructureEngine>,
    pub extractor: Arc<Extractor>,
    pub discovery: Arc<LinkDiscovery>,
    pub sources: Arc<dyn SourceRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub error_log: Arc<dyn ErrorLog>,
    pub article_concurrency: usize,
}

impl Engine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetch: Arc<FetchEngine>,
        structure: Arc<StructureEngine>,
        extractor: Arc<Extractor>,
        discovery: Arc<LinkDiscovery>,
        sources: Arc<dyn SourceRepository>,
        articles: Arc<dyn ArticleRepository>,
        error_log: Arc<dyn ErrorLog>,
        article_concurrency: usize,
    ) -> Self {
        Self {
            fetch,
            structure,
            extractor,
            discovery,
            sources,
            articles,
            error_log,
            article_concurrency,
        }
    }
}

#[async_trait]
impl ScrapeRunner for Engine {
    /// Runs every registered source, lexicographically by name for
    /// reproducibility (§5 "Ordering"), logging and skipping failed
    /// sources so the run as a whole only fails when listing sources
    /// itself fails.
    async fn scrape_all(&self, active_flags: &ActiveFlags) -> Result<RunSummary> {
        let mut sources = self.sources.list().await?;
        sources.sort_by(|a, b| a.name.cmp(&b.name));

        let mut summary = RunSummary::default();
        info!(source_count = sources.len(), "starting scrapeAll");

        for source in sources {
            let source_id = source.id;
            let source_name = source.name.clone();

            match process_source(self, &source, active_flags).await {
                Ok(source_summary) => {
                    summary.record_source(source_name, source_summary);
                }
                Err(e) => {
                    error!(source = %source.url, error = %e, "source failed, continuing to next source");
                    let record = clipper_types::ErrorLogRecord::new(
                        source.url.clone(),
                        e.kind(),
                        "scrapeAll:source",
                        e.to_string(),
                    );
                    let _ = self.error_log.append(record).await;
                    summary.record_source(
                        source_name,
                        clipper_scheduler::SourceRunSummary { processed: 0, saved: 0, errors: 1 },
                    );
                }
            }

            active_flags.reset(source_id);
        }

        Ok(summary)
    }
}

