//! prompt-arcade server entry point.

use std::sync::Arc;

use prompt_arcade_server::{api, app::App, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting prompt-arcade server");

    let config = config::ServerConfig::from_env();
    let app = Arc::new(App::from_config(&config)?);
    tracing::info!(
        categories = app.forge.catalog().categories().len(),
        store_capacity = app.store.capacity(),
        embellish = app.llm.is_some(),
        "Game forge ready"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on {}", config.bind_addr());
    axum::serve(listener, api::router(app)).await?;

    Ok(())
}
