/**
 * OVERCLOUDED KERNEL - Service entry point
 *
 * ROLE : Loads configuration, installs logging, serves the HTTP API until
 * Ctrl-C. All acquisition logic lives in the library crate.
 */

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use overclouded_kernel::config::load_config;
use overclouded_kernel::http::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("overclouded_kernel=info")),
        )
        .init();

    let cfg = load_config().await;
    let listen = cfg.listen.clone();
    info!(
        management_url = %cfg.management_url,
        synthetic_fallback = cfg.synthetic_fallback,
        api_key = cfg.api_key.is_some(),
        "configuration loaded"
    );

    let state = AppState::new(cfg).context("failed to build the HTTP client")?;
    let app = build_router(state);

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!("listening on http://{listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
