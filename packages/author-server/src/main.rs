//! Author Server Binary
//!
//! Serves a content directory for authoring: resolves views against the
//! corpus and applies structural edits to the persisted views config.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: port 3001, content in ./content
//! cargo run -p viewtree-author-server
//!
//! # Custom port and content directory
//! AUTHOR_SERVER_PORT=3002 VIEWTREE_DATA_DIR=~/site/content cargo run -p viewtree-author-server
//! ```
//!
//! # Environment Variables
//!
//! - `AUTHOR_SERVER_PORT`: Server port (default: 3001)
//! - `VIEWTREE_DATA_DIR`: Content directory holding `views.json`, `corpus.json`
//!   and `posts/` (default: `./content`)
//! - `CORS_ALLOW_ORIGIN`: Single allowed origin for the authoring UI
//! - `VIEWTREE_*`: Engine settings, see `EngineConfig::from_env`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use viewtree_author_server::{start_server, AppState};
use viewtree_core::{
    EngineConfig, JsonFilePersistence, MutationPipeline, PulldownRenderer, RetryingPersistence,
    SiteService, StaticCorpus, ViewResolver,
};

const PERSIST_RETRIES: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = env::var("AUTHOR_SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);
    let data_dir: PathBuf = env::var("VIEWTREE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./content"));
    let config = EngineConfig::from_env();

    tracing::info!("Content directory: {}", data_dir.display());
    tracing::info!("Mode: {}", config.mode);

    let persistence = Arc::new(RetryingPersistence::new(
        JsonFilePersistence::new(&data_dir),
        PERSIST_RETRIES,
    ));
    let pipeline = Arc::new(MutationPipeline::load(persistence, config.clone()).await?);
    let corpus = StaticCorpus::load_dir(&data_dir).await?;
    let resolver = ViewResolver::new(Arc::new(PulldownRenderer::new()), Arc::new(corpus), &config);

    let state = AppState::new(SiteService::new(pipeline, resolver));
    start_server(state, port).await
}
