use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use snapvault_server::config::AppConfig;
use snapvault_server::state::AppState;
use snapvault_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    seed::seed_mail_settings(&db, &config.mail).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db, config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("SnapVault listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
