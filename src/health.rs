//! Liveness endpoint — a static acknowledgment for external supervisors.

use axum::{routing::get, Router};

use wildywatch_core::config::HealthConfig;

async fn home() -> &'static str {
    "Wildywatch is running!"
}

/// Serve the liveness endpoint on a background task. Bind failures are
/// loud but do not take the bot down — the probe is not business logic.
pub fn spawn(config: HealthConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let addr = format!("{}:{}", config.host, config.port);
        let app = Router::new().route("/", get(home));

        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("Liveness endpoint failed to bind {addr}: {e}");
                return;
            }
        };
        tracing::info!("Liveness endpoint on http://{addr}");

        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Liveness endpoint stopped: {e}");
        }
    })
}
