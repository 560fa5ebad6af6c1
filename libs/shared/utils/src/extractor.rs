use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// State for [`auth_middleware`]: which capability a route group requires.
/// `required: None` admits any authenticated user.
#[derive(Clone)]
pub struct RoleGuard {
    pub config: Arc<AppConfig>,
    pub required: Option<Role>,
}

impl RoleGuard {
    pub fn authenticated(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            required: None,
        }
    }

    pub fn role(config: Arc<AppConfig>, role: Role) -> Self {
        Self {
            config,
            required: Some(role),
        }
    }

    pub fn check(&self, user: &User) -> Result<(), AppError> {
        match self.required {
            Some(role) if user.role != role => Err(AppError::Forbidden(format!(
                "This page requires the {} role",
                role
            ))),
            _ => Ok(()),
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

// Runs before handler dispatch: authenticate, then check the role.
pub async fn auth_middleware(
    State(guard): State<RoleGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let user = validate_token(token, &guard.config.secret_key).map_err(AppError::Auth)?;
    guard.check(&user)?;

    debug!("{} ({}) admitted to {}", user.username, user.role, request.uri().path());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{http::HeaderValue, middleware, routing::get, Extension, Router};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::jwt::issue_token;

    fn config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            database_url: "sqlite::memory:".to_string(),
            database_schema: "pharmacy_testing".to_string(),
            database_max_connections: 1,
            secret_key: "guard-test-secret".to_string(),
            session_ttl_hours: 1,
            seed_script_path: "insert_create.sql".into(),
            reset_requires_auth: true,
            bind_addr: ([127, 0, 0, 1], 0).into(),
        })
    }

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "tester".to_string(),
            role,
            entity_id: Some(1),
        }
    }

    fn app(guard: RoleGuard) -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(user): Extension<User>| async move { user.username }),
            )
            .layer(middleware::from_fn_with_state(guard, auth_middleware))
    }

    async fn status_for(guard: RoleGuard, token: Option<String>) -> StatusCode {
        let mut builder = Request::builder().uri("/");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let response = app(guard)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[test]
    fn bearer_token_requires_prefix() {
        let mut headers = HeaderMap::new();
        assert_matches!(bearer_token(&headers), Err(AppError::Auth(_)));

        headers.insert("Authorization", HeaderValue::from_static("Token abc"));
        assert_matches!(bearer_token(&headers), Err(AppError::Auth(_)));

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[tokio::test]
    async fn guard_admits_matching_role() {
        let config = config();
        let (token, _) = issue_token(&user(Role::Doctor), &config.secret_key, 1).unwrap();
        let status = status_for(RoleGuard::role(config, Role::Doctor), Some(token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn guard_rejects_other_roles_with_forbidden() {
        let config = config();
        let (token, _) = issue_token(&user(Role::Patient), &config.secret_key, 1).unwrap();
        let status = status_for(RoleGuard::role(config, Role::Doctor), Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn guard_rejects_missing_or_forged_tokens() {
        let config = config();
        assert_eq!(
            status_for(RoleGuard::authenticated(config.clone()), None).await,
            StatusCode::UNAUTHORIZED
        );

        let (forged, _) = issue_token(&user(Role::Doctor), "someone-else", 1).unwrap();
        assert_eq!(
            status_for(RoleGuard::authenticated(config), Some(forged)).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
