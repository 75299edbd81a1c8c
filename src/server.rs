//! HTTP surface: `GET /` health and `POST /chat`.

use crate::error::ServiceError;
use crate::service::{ChatRequest, ChatResponse, QaService};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QaService>,
}

/// Error body mirrors `{"detail": "..."}`.
struct ApiError(ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            ServiceError::EmptyMessage => (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string()),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing query: {other}"),
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "College Q&A API is running",
        "vector_space_fit": state.service.is_fit(),
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let service = state.service.clone();
    let message = request.message;
    let result = tokio::task::spawn_blocking(move || service.answer(&message))
        .await
        .map_err(|e| ServiceError::Unexpected(format!("retrieval task failed: {e}")))
        .and_then(|inner| inner);

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "chat request failed");
            Err(ApiError(e))
        }
    }
}

pub fn build_router(service: Arc<QaService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

pub async fn serve(service: Arc<QaService>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, build_router(service)).await?;
    Ok(())
}
