use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, RoleGuard};

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    Router::new()
        .route("/doctor_dashboard", get(handlers::doctor_dashboard))
        .route("/prescriptions/{name}", get(handlers::patient_prescriptions))
        .route("/prescription/create", post(handlers::create_prescription))
        .route("/patient/history/{name}", get(handlers::patient_history))
        .route("/patient/history/update/{id}", post(handlers::update_patient_history))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::role(state.config.clone(), Role::Doctor),
            auth_middleware,
        ))
        .with_state(state)
}
