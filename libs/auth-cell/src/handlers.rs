use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_models::flash::Flash;
use shared_utils::jwt::issue_token;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::AccountService;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AccountService::new(&state.pool);
    let user = service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "flash": Flash::success("Registration successful. Please log in."),
            "user": user,
        })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Login attempt for {}", request.username);

    let service = AccountService::new(&state.pool);
    let user = service.authenticate(&request).await?;

    let (token, expires_at) =
        issue_token(&user, &state.config.secret_key, state.config.session_ttl_hours)
            .map_err(AppError::Internal)?;

    Ok(Json(TokenResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
        expires_at,
        dashboard: user.role.dashboard_path().to_string(),
    }))
}

/// Tokens are not stored server-side; the client drops its copy.
pub async fn logout(Extension(user): Extension<User>) -> Json<Value> {
    debug!("{} logged out", user.username);
    Json(json!({ "flash": Flash::info("You have been logged out.") }))
}
