use tracing::{debug, info, instrument};

use shared_database::DbPool;
use shared_models::auth::{Role, User, UserRecord};
use shared_models::error::AppError;

use crate::models::{LoginRequest, RegisterRequest, RegisteredUser};
use crate::services::password::{hash_password, verify_password};

pub struct AccountService {
    pool: DbPool,
}

impl AccountService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    #[instrument(skip(self, request), fields(username = %request.username, role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser, AppError> {
        request.validate()?;
        let username = request.username.trim().to_string();

        if let Some(entity_id) = request.entity_id {
            self.ensure_entity_exists(request.role, entity_id).await?;
        }

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(&username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!("Username {} is already taken", username)));
        }

        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let (patient_id, doctor_id, pharmacist_id) = match request.role {
            Role::Patient => (request.entity_id, None, None),
            Role::Doctor => (None, request.entity_id, None),
            Role::Pharmacist => (None, None, request.entity_id),
        };

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password, role, patient_id, doctor_id, pharmacist_id) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(request.role.as_str())
        .bind(patient_id)
        .bind(doctor_id)
        .bind(pharmacist_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Registered {} as {} (user {})", username, request.role, id);

        Ok(RegisteredUser {
            id,
            username,
            role: request.role,
            entity_id: request.entity_id,
        })
    }

    /// Returns the principal for a correct username/password pair. Unknown
    /// users and wrong passwords produce the same error.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<User, AppError> {
        let invalid = || AppError::Auth("Invalid username or password".to_string());

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password, role, patient_id, doctor_id, pharmacist_id \
             FROM users WHERE username = ?",
        )
        .bind(request.username.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(invalid)?;

        let password = request.password.clone();
        let stored_hash = record.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Stored password hash is unusable: {}", e)))?;
        if !matches {
            debug!("Password mismatch for {}", record.username);
            return Err(invalid());
        }

        let role = record.role().map_err(AppError::Internal)?;
        Ok(User {
            id: record.id,
            username: record.username.clone(),
            role,
            entity_id: record.entity_id(),
        })
    }

    async fn ensure_entity_exists(&self, role: Role, entity_id: i64) -> Result<(), AppError> {
        let sql = match role {
            Role::Doctor => "SELECT COUNT(*) FROM doctor WHERE id = ?",
            Role::Patient => "SELECT COUNT(*) FROM patient WHERE id = ?",
            Role::Pharmacist => "SELECT COUNT(*) FROM pharmacist WHERE id = ?",
        };
        let found: i64 = sqlx::query_scalar(sql)
            .bind(entity_id)
            .fetch_one(&self.pool)
            .await?;

        if found == 0 {
            return Err(AppError::NotFound(format!("No {} with id {}", role, entity_id)));
        }
        Ok(())
    }
}
