/*
newscanner - single-binary main.rs
This binary wires the news and LLM providers into the search and summary pipelines and
starts the Rocket HTTP server.
*/

use anyhow::Context;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newscanner::categories::CategoryCatalog;
use newscanner::llm::remote::RemoteLlmProvider;
use newscanner::llm::summarizer::SummaryNormalizer;
use newscanner::news::remote::NewsApiClient;
use newscanner::news::search::{SearchOrchestrator, SearchSettings};
use newscanner::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "newscanner", about = "News Scanner search + AI summary server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen port from configuration
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // API keys usually live in .env during development
    if let Err(e) = dotenv::dotenv() {
        info!(reason = %e, "no .env file loaded");
    }

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    let mut config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return Err(e);
        }
    };
    config.apply_env_overrides();
    if let Some(port) = args.port {
        config.server.port = Some(port);
    }
    info!(default_file = ?default_path, override_file = ?override_path, "configuration loaded");

    let state = build_state(&config)?;

    if let Err(e) = launch_rocket(&config, state).await {
        error!(error = %e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Composition root: construct each provider once and hand it to the pipelines.
fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let news_key = common::require_secret(config.news.api_key_env())
        .context("news provider API key is required at startup")?;

    let news_client = NewsApiClient::new(config.news.api_url(), news_key)
        .with_timeout(config.news.timeout_seconds());
    let settings = SearchSettings::from(&config.news);
    info!(
        api_url = %config.news.api_url(),
        language = %settings.language,
        country = %settings.country,
        page_size = settings.page_size,
        max_sources = settings.max_sources,
        on_empty_scope = ?settings.on_empty_scope,
        "news provider initialized"
    );
    let search = SearchOrchestrator::new(Arc::new(news_client), settings);

    let llm_key = common::read_secret(config.llm.api_key_env());
    if llm_key.is_none() {
        warn!(
            env = %config.llm.api_key_env(),
            "LLM API key not set; /ai-summary will fail until it is configured"
        );
    }
    let llm = RemoteLlmProvider::new(config.llm.api_url(), llm_key, config.llm.model())
        .with_virtual_key(common::read_secret(config.llm.virtual_key_env()))
        .with_defaults(
            config.llm.timeout_seconds(),
            config.llm.max_tokens(),
            config.llm.temperature(),
        );
    info!(model = %llm.model(), api_url = %config.llm.api_url(), "LLM provider initialized");
    let summarizer = SummaryNormalizer::new(Arc::new(llm))
        .with_limits(config.llm.temperature(), config.llm.max_tokens());

    Ok(AppState {
        search,
        summarizer,
        categories: CategoryCatalog::from_config(&config.categories),
    })
}
