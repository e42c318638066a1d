//! HTTP server for campaign brief intake and pitch-deck generation.
//!
//! This server:
//! - Stores intake form submissions (in memory, or as JSON files under DATA_DIR)
//! - Generates a customised deck from a stored brief or from form fields
//! - Streams the generated .pptx back as a download
//! - Sweeps orphaned working directories in the background

use std::sync::Arc;

use clap::Parser;
use deck_pptx::{spawn_reaper, DeckGenerator, GeneratorConfig};
use log::{info, warn};
use tokio::net::TcpListener;
use tokio::signal;

mod config;
mod error;
mod handlers;
mod store;
mod upload;

use config::Config;
use handlers::AppState;
use store::{FileStore, MemoryStore, SharedStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    info!("Starting deck-server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Host: {}", config.host);
    info!("  Port: {}", config.port);
    info!("  Template: {}", config.template_path.display());
    info!("  Output: {}", config.output_dir.display());

    if !config.template_path.exists() {
        warn!(
            "  Template {} does not exist; generation requests will fail",
            config.template_path.display()
        );
    }

    let store: SharedStore = match &config.data_dir {
        Some(dir) => {
            info!("  Briefs: {}", dir.display());
            Arc::new(FileStore::open(dir).await?)
        }
        None => {
            warn!("  Briefs: in memory (set DATA_DIR to persist)");
            Arc::new(MemoryStore::new())
        }
    };

    let generator_config = GeneratorConfig::new(
        &config.template_path,
        &config.work_dir,
        &config.output_dir,
    )
    .with_strict_fields(config.strict_fields);

    let reaper = spawn_reaper(
        config.work_dir.clone(),
        config.reaper_interval(),
        config.reaper_grace(),
    );

    let state = AppState {
        store,
        generator: DeckGenerator::new(generator_config),
        upload_dir: Arc::new(config.upload_dir.clone()),
    };
    let app = handlers::router(state);

    // Bind and serve
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, initiating shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        info!("Received SIGTERM, initiating shutdown");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
