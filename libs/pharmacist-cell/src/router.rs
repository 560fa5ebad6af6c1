use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_models::auth::Role;
use shared_utils::extractor::{auth_middleware, RoleGuard};

use crate::handlers;

pub fn pharmacist_routes(state: AppState) -> Router {
    Router::new()
        .route("/pharmacist_dashboard", get(handlers::pharmacist_dashboard))
        .route("/order/process/{id}", post(handlers::process_order))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::role(state.config.clone(), Role::Pharmacist),
            auth_middleware,
        ))
        .with_state(state)
}
