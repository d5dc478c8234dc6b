use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use imgstream_core::{BatchConfig, ProgressHub, TargetFormat};

mod handlers;

/// Shared server state: the progress hub plus the fixed batch configuration.
/// At most one batch is active at a time; `active` gates the trigger.
pub struct AppState {
    pub hub: ProgressHub,
    pub active: AtomicBool,
    pub config: BatchConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config_from_env();
    log::info!(
        "converting {} → {} ({}, quality {}, {} jobs)",
        config.source_dir.display(),
        config.dest_dir.display(),
        config.target,
        config.quality,
        config.concurrency
    );

    let dest_dir = config.dest_dir.clone();
    let state = Arc::new(AppState {
        hub: ProgressHub::default(),
        active: AtomicBool::new(false),
        config,
    });

    // Build router
    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/sse", get(handlers::progress))
        .nest_service("/compressed", ServeDir::new(dest_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Server address
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    log::info!("🚀 Imgstream server running on http://{}", addr);
    log::info!("📖 Endpoints:");
    log::info!("   GET  /           - Landing page");
    log::info!("   GET  /sse        - Start a batch, stream progress");
    log::info!("   GET  /compressed - Browse converted files");
    log::info!("   GET  /health     - Health check");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Read the batch configuration from the environment, fixed at startup.
fn config_from_env() -> BatchConfig {
    let defaults = BatchConfig::default();
    BatchConfig {
        source_dir: env_path("IMGSTREAM_SOURCE_DIR", defaults.source_dir),
        dest_dir: env_path("IMGSTREAM_DEST_DIR", defaults.dest_dir),
        target: env::var("IMGSTREAM_FORMAT")
            .ok()
            .and_then(|s| TargetFormat::from_str(&s).ok())
            .unwrap_or(defaults.target),
        quality: env::var("IMGSTREAM_QUALITY")
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
            .map(|q| q.clamp(0, 100))
            .unwrap_or(defaults.quality),
        concurrency: env::var("IMGSTREAM_JOBS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.concurrency),
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}
