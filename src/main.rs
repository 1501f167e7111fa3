mod config;
mod errors;
mod models;
mod routes;
mod service;
mod state;

use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kashif_chat=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();
    if std::env::var("CHAT_PASSWORD").is_err() {
        warn!("CHAT_PASSWORD not set, using the built-in default password");
    }
    if !config.frontend_dist.join("index.html").exists() {
        warn!(
            "No frontend bundle at {} (run `trunk build` in frontend/)",
            config.frontend_dist.display()
        );
    }

    // ── Router ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let app = routes::app(AppState::new(config));

    // ── Listen ────────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
