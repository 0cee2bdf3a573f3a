use anyhow::Context;
use autoplay_server::{app, config::settings::AppConfig, state::AppState};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    let port = config.server_port;

    let state = AppState::from_config(config).context("failed to build application state")?;
    state
        .storage
        .ensure_dirs()
        .await
        .context("failed to create storage directories")?;

    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🚀 Server running on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
