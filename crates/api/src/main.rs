use std::sync::Arc;

use anyhow::Context;

use pharmatrack_api::app::{build_app, services};
use pharmatrack_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pharmatrack_observability::init().context("invalid logging configuration")?;

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(services::build_services(&config.backend).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
