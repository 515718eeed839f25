mod analyzer;
mod config;
mod fetcher;
mod model;
mod normalizer;
mod parser;
mod presenter;
mod utils;

use config::{load_config, API_KEY_VAR, CONFIG_PATH_VAR};
use fetcher::AlphaVantageClient;
use presenter::routes::{router, AppState};
use presenter::Dashboard;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Pick up ALPHAVANTAGE_API_KEY and friends from a local .env if there is one
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let api_key = match config::api_key(env::var(API_KEY_VAR).ok()) {
        Ok(key) => key,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let client = match AlphaVantageClient::new(&config.base_url, api_key, config.request_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    // Both were validated by load_config
    let (addr, defaults) = match (config.socket_addr(), config.form_defaults()) {
        (Ok(addr), Ok(defaults)) => (addr, defaults),
        (Err(e), _) | (_, Err(e)) => {
            error!("Config error: {}", e);
            return;
        }
    };

    let state = Arc::new(AppState {
        dashboard: Dashboard::new(Box::new(client)),
        defaults,
        refresh_seconds: config.refresh_seconds,
    });

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };

    info!("Dashboard listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping...");
}
