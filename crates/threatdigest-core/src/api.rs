use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::digest::{DigestEntry, DigestRecord};
use crate::scheduler::{SchedulerService, SchedulerStatus};
use crate::{Error, Result};

#[derive(Clone)]
pub struct AppState {
    scheduler: Arc<SchedulerService>,
}

impl AppState {
    pub fn new(scheduler: Arc<SchedulerService>) -> Self {
        Self { scheduler }
    }
}

/// HTTP surface over the pipeline, the digest store and the scheduler
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/generate", post(generate))
        .route("/api/latest", get(latest))
        .route("/api/history", get(history))
        .route("/api/digest/{filename}", get(digest))
        .route("/api/scheduler/status", get(scheduler_status))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `addr` until the shutdown signal flips to true
pub async fn serve(addr: &str, state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("HTTP API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    tracing::info!("HTTP API stopped");
    Ok(())
}

/// Error response carrying a JSON body
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            Error::DigestNotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": "Digest not found" })),
            Error::InvalidDigestName(name) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Invalid digest name: {}", name) }),
            ),
            other => {
                tracing::error!("API request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": other.to_string() }))
            }
        };
        (status, Json(body)).into_response()
    }
}

async fn generate(State(state): State<AppState>) -> Json<DigestRecord> {
    Json(state.scheduler.run_now().await)
}

async fn latest(State(state): State<AppState>) -> std::result::Result<Response, ApiError> {
    match state.scheduler.pipeline().store().latest().await? {
        Some(record) => Ok(Json(record).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "No digests found",
                "message": "Generate a new digest to get started",
            })),
        )
            .into_response()),
    }
}

async fn history(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<DigestEntry>>, ApiError> {
    Ok(Json(state.scheduler.pipeline().store().list().await?))
}

async fn digest(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> std::result::Result<Json<DigestRecord>, ApiError> {
    state
        .scheduler
        .pipeline()
        .store()
        .get(&filename)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError(Error::DigestNotFound(filename)))
}

async fn scheduler_status(State(state): State<AppState>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}
