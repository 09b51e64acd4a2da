//! Taskman API Server
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use std::sync::Arc;
use taskman_api::{create_router, state::AppState};
use taskman_core::{AppConfig, LoggingConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    if config.auth.uses_dev_secret() {
        tracing::warn!("JWT_SECRET is not set; tokens are signed with the public development secret");
    }

    let state = Arc::new(AppState::new(config));
    if let Some(admin) = state
        .bootstrap_admin()
        .await
        .context("Failed to create bootstrap administrator")?
    {
        tracing::info!(email = %admin.email, "Administrator account ready");
    }

    let addr = state.config.bind_address();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Taskman API Server starting on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `CONFIG_FILE` with environment overrides, or the environment alone
fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {path}"))?
            .with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", logging.level)));

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
