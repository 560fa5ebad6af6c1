use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use auth_cell::auth_routes;
use doctor_cell::doctor_routes;
use patient_cell::patient_routes;
use pharmacist_cell::pharmacist_routes;
use reseed_cell::{reseed_routes, ReseedEngine};
use shared_database::{pool, AppState};
use shared_models::error::AppError;

pub fn create_router(state: AppState, engine: Arc<ReseedEngine>) -> Router {
    let service_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .with_state(state.clone());

    Router::new()
        .merge(service_routes)
        .merge(auth_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(pharmacist_routes(state.clone()))
        .merge(reseed_routes(state, engine))
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "Pharmacy demo API",
        "dashboards": ["/doctor_dashboard", "/patient_dashboard", "/pharmacist_dashboard"],
        "login": "/login",
        "register": "/register",
        "reset": "/reset_demo",
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    pool::ping(&state.pool).await?;
    Ok(Json(json!({
        "status": "ok",
        "schema": state.config.database_schema,
    })))
}
