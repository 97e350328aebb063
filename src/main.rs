use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use notepost::config::{Cli, Config};
use notepost::db::Database;
use notepost::handler::AppState;
use notepost::render::Renderer;
use notepost::routes::routes;
use notepost::unpack_error;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // a missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("notepost.svc starting");

    let cfg = Config::resolve(&args).unwrap_or_else(|e| {
        tracing::error!(error = %format!("{e:#}"), "failed to load config file");
        std::process::exit(1);
    });

    let renderer = Arc::new(Renderer::load(&cfg.app.templates_dir()).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), "failed to parse templates");
        std::process::exit(1);
    }));

    let db = Arc::new(Database::open(cfg.app.get_db()).await.unwrap_or_else(|e| {
        tracing::error!(error = %format!("{e:#}"), "failed to setup database");
        std::process::exit(1);
    }));

    let state = AppState {
        store: db,
        renderer,
        assets: Arc::new(PathBuf::from(cfg.app.get_assets())),
    };

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("notepost.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, routes(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server stopped unexpectedly");
        std::process::exit(1);
    }

    tracing::info!("notepost.svc going off, graceful shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl+c");
        return;
    }
    tracing::info!("ctrl+c signal received, preparing to shutdown");
}
