use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::flash::Flash;

use crate::models::PharmacistDashboard;
use crate::services::OrderService;

#[axum::debug_handler]
pub async fn pharmacist_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<PharmacistDashboard>, AppError> {
    let pharmacist_id = user.require_entity()?;
    let dashboard = OrderService::new(&state.pool).dashboard(pharmacist_id).await?;
    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn process_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let pharmacist_id = user.require_entity()?;
    let order = OrderService::new(&state.pool)
        .process_order(order_id, pharmacist_id)
        .await?;

    Ok(Json(json!({
        "flash": Flash::success(format!("Order {} completed", order.id)),
        "order": order,
    })))
}
