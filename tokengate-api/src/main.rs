//! # Tokengate API Server
//!
//! Issues access tokens at login and guards protected routes with a
//! bearer-token gate. The token engine (signed JWT or encrypted PASETO) is
//! picked by configuration.
//!
//! ## Usage
//!
//! ```bash
//! TOKEN_SYMMETRIC_KEY=12345678901234567890123456789012 cargo run -p tokengate-api
//! ```

use tokengate_api::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokengate_api=debug,tokengate_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Tokengate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    tracing::info!(
        token_type = %config.token.kind,
        access_token_duration_secs = config.token.access_token_duration.num_seconds(),
        "configuration loaded"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(config).map_err(|e| {
        tracing::error!("cannot create token maker: {}", e);
        e
    })?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
