use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, RoleGuard};

use crate::handlers::*;

pub fn patient_routes(state: AppState) -> Router {
    Router::new()
        .route("/patient_dashboard", get(patient_dashboard))
        .route("/refill/{id}", post(request_refill))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::role(state.config.clone(), Role::Patient),
            auth_middleware,
        ))
        .with_state(state)
}
