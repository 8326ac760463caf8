//! The ingestion engine's main orchestrator: wires the Scheduler to
//! the Fetch Engine, Link Discovery, Structure Engine, Extractor and
//! repository boundaries (§2 data flow).

pub mod article;
pub mod engine;
pub mod source;

use clipper_config::ClipperConfig;
use clipper_extraction::Extractor;
use clipper_fetch::FetchEngine;
use clipper_headless::HeadlessBrowserTier;
use clipper_intelligence::LlmProvider;
use clipper_scheduler::Scheduler;
use clipper_spider::LinkDiscovery;
use clipper_structure::StructureEngine;
use clipper_types::{ArticleRepository, ErrorLog, SourceRepository};
use std::sync::Arc;

pub use engine::Engine;

/// Assemble every collaborator named in §2's data flow and hand back
/// a `Scheduler` ready for `initialize()`.
///
/// The headless tier is best-effort: if no browser binary can be
/// found or launched, the engine falls back to the HTTP tier only
/// rather than failing startup outright.
pub async fn build_scheduler(
    config: ClipperConfig,
    llm: Arc<dyn LlmProvider>,
    model: impl Into<String>,
    sources: Arc<dyn SourceRepository>,
    articles: Arc<dyn ArticleRepository>,
    error_log: Arc<dyn ErrorLog>,
) -> Arc<Scheduler<Engine>> {
    let model = model.into();

    let headless = match HeadlessBrowserTier::new(&config).await {
        Ok(tier) => Some(Arc::new(tier) as Arc<dyn clipper_fetch::HeadlessTier>),
        Err(e) => {
            tracing::warn!(error = %e, "headless tier unavailable, falling back to HTTP tier only");
            None
        }
    };

    let fetch = Arc::new(FetchEngine::new(headless));
    let structure = Arc::new(StructureEngine::new(llm.clone(), model.clone()));
    let extractor = Arc::new(Extractor::with_llm(llm.clone(), model.clone()));
    let discovery = Arc::new(LinkDiscovery::with_llm(llm, model));

    let engine = Engine::new(
        fetch,
        structure,
        extractor,
        discovery,
        sources,
        articles,
        error_log,
        config.concurrency,
    );

    Scheduler::new(Arc::new(engine), config.interval_hours)
}
