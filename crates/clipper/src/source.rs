//! Per-source processing: Fetch Engine → Link Discovery → bounded
//! per-article fan-out, with the per-source stop flag consulted
//! before each article (§4.5, §5).

use crate::article::process_article;
use crate::engine::Engine;
use chrono::Utc;
use clipper_fetch::ContentValidator;
use clipper_scheduler::{ActiveFlags, SourceRunSummary};
use clipper_types::{ErrorLogRecord, FetchIntent, FetchOptions, Result, Source};
use futures::stream::{self, StreamExt};

pub async fn process_source(engine: &Engine, source: &Source, active_flags: &ActiveFlags) -> Result<SourceRunSummary> {
    let outcome = engine.fetch.fetch(&source.url, FetchIntent::Source, &FetchOptions::for_source()).await?;
    if !outcome.success {
        return Err(clipper_types::ClipperError::Network(format!(
            "source fetch failed for {}: status {:?}",
            source.url, outcome.status_code
        )));
    }
    let html = outcome
        .html
        .ok_or_else(|| clipper_types::ClipperError::Parsing(format!("empty body for {}", source.url)))?;

    // §4.1 "Content validation … applied after either tier": a source
    // page must clear the countable-links/confidence gate before link
    // discovery runs against it.
    if !ContentValidator::is_valid(&html, FetchIntent::Source, &outcome.protection) {
        return Err(clipper_types::ClipperError::Parsing(format!(
            "source page failed content validation for {}",
            source.url
        )));
    }

    let base_url = url::Url::parse(&outcome.final_url)?;

    if let Some(config) = &source.selector_config {
        engine.structure.seed(&source.url, config.clone());
    }

    let links = engine.discovery.discover(&html, &base_url, &FetchOptions::for_source()).await?;
    tracing::info!(source = %source.name, link_count = links.len(), "discovered candidate links");

    let summary = stream::iter(links.into_iter())
        .map(|link| {
            let source_id = source.id;
            let source_url = source.url.clone();
            async move {
                if !active_flags.is_active(source_id) {
                    return None;
                }
                match process_article(engine, source_id, &link).await {
                    Ok(saved) => Some(Ok(saved)),
                    Err(e) => {
                        tracing::warn!(url = %link, error = %e, "article failed, skipping");
                        let record = ErrorLogRecord::new(source_url, e.kind(), "scrapeAll:article", e.to_string());
                        Some(Err((link, record)))
                    }
                }
            }
        })
        .buffer_unordered(engine.article_concurrency)
        .fold(SourceRunSummary::default(), |mut acc, result| {
            let error_log = engine.error_log.clone();
            async move {
                match result {
                    Some(Ok(saved)) => {
                        acc.processed += 1;
                        if saved {
                            acc.saved += 1;
                        }
                    }
                    Some(Err((link_url, mut record))) => {
                        acc.processed += 1;
                        acc.errors += 1;
                        record.article_url = Some(link_url);
                        let _ = error_log.append(record).await;
                    }
                    None => {}
                }
                acc
            }
        })
        .await;

    if let Some(learned) = engine.structure.cached_config(&source.url) {
        engine.sources.update_config(source.id, learned).await?;
    }
    engine.sources.update_scraped(source.id, Utc::now()).await?;

    Ok(summary)
}
