use serde::{Deserialize, Serialize};

use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::services::password::MIN_PASSWORD_LENGTH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Doctor, patient or pharmacist id, matching `role`.
    pub entity_id: Option<i64>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        if matches!(self.entity_id, Some(id) if id <= 0) {
            return Err(AppError::ValidationError("entity_id must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub entity_id: Option<i64>,
}
