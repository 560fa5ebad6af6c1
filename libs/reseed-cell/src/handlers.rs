use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use shared_models::flash::Flash;

use crate::models::{ReseedError, ResetResponse};
use crate::services::catalog::SchemaSnapshot;
use crate::services::ReseedEngine;

#[derive(Clone)]
pub struct ReseedState {
    pub engine: Arc<ReseedEngine>,
}

/// Failures end here: they become a flash message, never a propagated error.
#[axum::debug_handler]
pub async fn reset_demo(
    State(state): State<ReseedState>,
) -> (StatusCode, Json<ResetResponse>) {
    match state.engine.reset_demo().await {
        Ok(report) => (
            StatusCode::OK,
            Json(ResetResponse {
                flash: Flash::success("Demo database has been reset!"),
                report: Some(report),
            }),
        ),
        Err(err) => {
            error!("Demo reset failed: {}", err);
            let status = match err {
                ReseedError::InProgress => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ResetResponse {
                    flash: Flash::danger(format!("Error resetting demo database: {}", err)),
                    report: None,
                }),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn get_schema(State(state): State<ReseedState>) -> Json<SchemaSnapshot> {
    Json(state.engine.catalog().snapshot().await)
}
