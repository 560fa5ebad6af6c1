use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::flash::Flash;

use crate::models::{PatientDashboard, RefillRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn patient_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<PatientDashboard>, AppError> {
    let patient_id = user.require_entity()?;
    let dashboard = PatientService::new(&state.pool).dashboard(patient_id).await?;
    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn request_refill(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(prescription_id): Path<i64>,
    Json(request): Json<RefillRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient_id = user.require_entity()?;
    let order = PatientService::new(&state.pool)
        .request_refill(patient_id, prescription_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "flash": Flash::success("Refill requested"),
            "order": order,
        })),
    ))
}
