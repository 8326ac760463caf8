//! `clipper` — run the adaptive web-content ingestion engine
//! standalone, without the API server, billing, or Auth0 collaborators
//! named out of scope in §1.

use clap::{Parser, Subcommand};
use clipper_cli::llm::HttpLlmProvider;
use clipper_cli::store::{JsonStore, JsonlErrorLog};
use clipper_config::ClipperConfig;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "clipper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Adaptive web-content ingestion engine", long_about = None)]
struct Cli {
    /// Path to the flat-file source/article store.
    #[arg(long, env = "CLIPPER_STORE_PATH", default_value = "clipper-store.json")]
    store: String,

    /// Path to the append-only error log.
    #[arg(long, env = "CLIPPER_ERROR_LOG_PATH", default_value = "clipper-errors.jsonl")]
    error_log: String,

    /// Base URL of an OpenAI-chat-completions-compatible endpoint.
    #[arg(long, env = "CLIPPER_LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// Bearer token for the LLM endpoint.
    #[arg(long, env = "CLIPPER_LLM_API_KEY")]
    llm_api_key: Option<String>,

    /// Model name passed to the LLM endpoint.
    #[arg(long, env = "CLIPPER_LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise the scheduler and let it run forever (initial kick,
    /// then every `interval_hours`, §4.5).
    Run,

    /// Run exactly one `scrapeAll()` pass and exit.
    Once,

    /// Print the scheduler's status after one pass (mainly useful
    /// piped with `once` in a script).
    Status,

    /// Register a new source.
    AddSource {
        url: String,
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a registered source by id.
    RemoveSource { id: Uuid },

    /// List registered sources.
    ListSources,

    /// List extracted articles.
    ListArticles,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = ClipperConfig::from_env();

    let store = Arc::new(JsonStore::open(&cli.store));
    let error_log = Arc::new(JsonlErrorLog::open(&cli.error_log));
    let llm = Arc::new(HttpLlmProvider::new(cli.llm_base_url, cli.llm_api_key)?);

    match cli.command {
        Commands::Run => {
            let scheduler =
                clipper::build_scheduler(config, llm, cli.llm_model, store.clone(), store, error_log).await;
            scheduler.initialize().await?;
            tracing::info!("scheduler running, interval_hours={}", scheduler.status().await.interval_hours);
            tokio::signal::ctrl_c().await?;
            scheduler.stop().await;
        }
        Commands::Once => {
            let scheduler =
                clipper::build_scheduler(config, llm, cli.llm_model, store.clone(), store, error_log).await;
            scheduler.initialize().await?;
            scheduler.stop().await;
            let status = scheduler.status().await;
            print_status(&status);
        }
        Commands::Status => {
            let scheduler =
                clipper::build_scheduler(config, llm, cli.llm_model, store.clone(), store, error_log).await;
            let status = scheduler.status().await;
            print_status(&status);
        }
        Commands::AddSource { url, name } => {
            let name = name.unwrap_or_else(|| {
                url::Url::parse(&url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .unwrap_or_else(|| url.clone())
            });
            let source = store.add_source(url, name);
            println!("added source {} ({})", source.id, source.url);
        }
        Commands::RemoveSource { id } => {
            if store.remove_source(id) {
                println!("removed source {id}");
            } else {
                println!("no such source: {id}");
            }
        }
        Commands::ListSources => {
            for source in store.list_sources() {
                println!(
                    "{}\t{}\t{}\tlast_scraped={:?}",
                    source.id, source.name, source.url, source.last_scraped_at
                );
            }
        }
        Commands::ListArticles => {
            for article in store.list_articles() {
                println!("{}\t{}\t{}", article.id, article.title, article.url);
            }
        }
    }

    Ok(())
}

fn print_status(status: &clipper_scheduler::SchedulerStatus) {
    println!(
        "initialized={} running={} last_run={:?} next_run={:?} consecutive_failures={} interval_hours={}",
        status.initialized,
        status.is_running,
        status.last_run,
        status.next_run,
        status.consecutive_failures,
        status.interval_hours
    );
    if let Some(summary) = &status.last_run_summary {
        println!("processed={} saved={}", summary.processed, summary.saved);
        for (source, s) in &summary.per_source {
            println!("  {source}: processed={} saved={} errors={}", s.processed, s.saved, s.errors);
        }
    }
}
