use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::{auth_middleware, RoleGuard};

use crate::handlers::{self, ReseedState};
use crate::services::ReseedEngine;

pub fn reseed_routes(state: AppState, engine: Arc<ReseedEngine>) -> Router {
    let mut reset_routes = Router::new().route("/reset_demo", post(handlers::reset_demo));

    if state.config.reset_requires_auth {
        reset_routes = reset_routes.route_layer(middleware::from_fn_with_state(
            RoleGuard::authenticated(state.config.clone()),
            auth_middleware,
        ));
    }

    Router::new()
        .route("/schema", get(handlers::get_schema))
        .merge(reset_routes)
        .with_state(ReseedState { engine })
}
