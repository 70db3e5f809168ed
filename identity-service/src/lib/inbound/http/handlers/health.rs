use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Report whether the database answers.
pub async fn health<US: UserServicePort>(State(state): State<AppState<US>>) -> Response {
    match state.user_service.check_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "info": { "database": { "status": "up" } }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "error": { "database": { "status": "down" } }
                })),
            )
                .into_response()
        }
    }
}
