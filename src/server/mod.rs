//! HTTP server exposing the dashboard.
//!
//! A single unauthenticated `GET /` endpoint regenerates the full page on
//! every request. Aggregation and chart drawing are blocking work, so the
//! handler moves them onto the blocking thread pool; each invocation owns
//! its drawing surfaces, so concurrent requests never share rendering
//! state.

use crate::config::Config;
use crate::report;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Build the application router.
pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .with_state(AppState { config })
}

/// Bind and run the server until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving dashboard on http://{}", addr);
    axum::serve(listener, router(Arc::new(config)))
        .await
        .context("Server failed")?;
    Ok(())
}

/// `GET /` — regenerate and return the dashboard page.
async fn dashboard(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || report::build_dashboard(&config)).await;

    match result {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            error!("Dashboard generation failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Dashboard generation failed: {:#}", e),
            )
                .into_response()
        }
        Err(e) => {
            error!("Dashboard task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Dashboard generation failed".to_string(),
            )
                .into_response()
        }
    }
}
