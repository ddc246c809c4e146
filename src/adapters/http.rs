use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::core::{MintCore, MintError};
use crate::protocol::error::ErrorCode;

/// Start the HTTP adapter on the given address and port.
pub async fn start(core: Arc<MintCore>, bind: IpAddr, port: u16) -> anyhow::Result<()> {
    let app = router(core);

    let addr = std::net::SocketAddr::from((bind, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP adapter listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router (public for testing).
/// The code route answers any verb — the original clients only speak GET,
/// but one invocation always means one code.
pub fn router(core: Arc<MintCore>) -> Router {
    Router::new()
        .route("/v1/code", any(code_handler))
        .route("/v1/status", get(status_handler))
        .route("/healthz", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(core)
}

/// One call, one code. The body is the bare canonical form, no framing.
async fn code_handler(State(core): State<Arc<MintCore>>) -> impl IntoResponse {
    match core.next_code() {
        Ok(code) => (axum::http::StatusCode::OK, code.to_string()).into_response(),
        Err(e) => error_json(&e).into_response(),
    }
}

async fn status_handler(State(core): State<Arc<MintCore>>) -> impl IntoResponse {
    Json(core.status())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"ok": true}))
}

fn error_json(e: &MintError) -> impl IntoResponse {
    let code = ErrorCode::from(e);
    let status = axum::http::StatusCode::from_u16(code.http_status())
        .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
        "error": code,
        "message": e.to_string(),
    });
    (status, Json(body))
}
