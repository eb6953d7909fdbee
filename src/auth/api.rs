//! Authentication API Endpoints
//! Mission: Provide registration and login endpoints

use crate::auth::{
    jwt::JwtHandler,
    models::{LoginRequest, LoginResponse, RegisterRequest, Role, UserResponse},
    user_store::UserStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum password length, matching the relaxed policy of the identity
/// store this API replaces.
const MIN_PASSWORD_LEN: usize = 4;

/// Role granted to self-registered accounts.
const DEFAULT_ROLE: Role = Role::Customer;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Registration endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthApiError> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }

    if state
        .user_store
        .get_user_by_username(&payload.username)
        .map_err(|_| AuthApiError::InternalError)?
        .is_some()
    {
        return Err(AuthApiError::UserAlreadyExists);
    }

    let user = state
        .user_store
        .create_user(
            &payload.username,
            &payload.password,
            &payload.full_name,
            &payload.email,
            &[DEFAULT_ROLE],
        )
        .map_err(|e| {
            warn!("Failed to create user: {}", e);
            AuthApiError::UserAlreadyExists
        })?;

    info!("User registered: {}", user.username);

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("Login attempt: {}", payload.username);

    // Unknown username and wrong password fall through to the same error.
    let valid = state
        .user_store
        .verify_password(&payload.username, &payload.password)
        .map_err(|_| AuthApiError::InternalError)?;

    if !valid {
        warn!("Failed login attempt: {}", payload.username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_username(&payload.username)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let (token, expires_in) = state
        .jwt_handler
        .issue(&user)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("Login successful: {}", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    UserNotFound,
    UserAlreadyExists,
    WeakPassword,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, "Username already exists"),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 4 characters",
            ),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_user_response_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            password_hash: "hash123".to_string(),
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            roles: vec![Role::Customer],
            created_at: Utc::now().to_rfc3339(),
        };

        let response = UserResponse::from_user(&user);
        assert_eq!(response.username, "testuser");
        assert_eq!(response.roles, vec![Role::Customer]);
    }

    #[test]
    fn test_auth_api_error_responses() {
        let invalid_creds = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid_creds.status(), StatusCode::UNAUTHORIZED);

        let not_found = AuthApiError::UserNotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = AuthApiError::UserAlreadyExists.into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let weak = AuthApiError::WeakPassword.into_response();
        assert_eq!(weak.status(), StatusCode::BAD_REQUEST);
    }
}
