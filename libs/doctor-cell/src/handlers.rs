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

use crate::models::{
    CreatePrescriptionRequest, DoctorDashboard, PatientHistoryView, PatientPrescriptions,
    UpdateHistoryRequest,
};
use crate::services::{DoctorService, HistoryService, PrescriptionService};

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<DoctorDashboard>, AppError> {
    let doctor_id = user.require_entity()?;
    let dashboard = DoctorService::new(&state.pool).dashboard(doctor_id).await?;
    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn patient_prescriptions(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PatientPrescriptions>, AppError> {
    let prescriptions = PrescriptionService::new(&state.pool)
        .for_patient_name(&name)
        .await?;
    Ok(Json(prescriptions))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor_id = user.require_entity()?;
    let prescription = PrescriptionService::new(&state.pool)
        .create(doctor_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "flash": Flash::success("Prescription created"),
            "prescription": prescription,
        })),
    ))
}

#[axum::debug_handler]
pub async fn patient_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PatientHistoryView>, AppError> {
    let view = HistoryService::new(&state.pool).for_patient_name(&name).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn update_patient_history(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdateHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    let history = HistoryService::new(&state.pool)
        .upsert(patient_id, request)
        .await?;

    Ok(Json(json!({
        "flash": Flash::success("Patient history updated"),
        "history": history,
    })))
}
