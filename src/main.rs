use std::sync::Arc;

use anyhow::Context;
use quidproquo::{AppState, Config, db};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting tracing subscriber")?;

    let config = Config::from_env().context("reading configuration")?;

    let db_pool = db::connect(&config.database_url, config.max_connections)
        .await
        .context("opening database")?;

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(%address, "listening");

    let app = quidproquo::app(AppState {
        db_pool,
        config: Arc::new(config),
    });
    axum::serve(listener, app).await?;
    Ok(())
}
