//! User profile endpoints.
//!
//! The profile handler re-fetches the caller's record from the store on
//! each request; only the subject claim is trusted from the token.

use crate::auth::{
    api::{AuthApiError, AuthState},
    models::AuthContext,
};
use axum::{extract::State, Extension, Json};
use serde::Serialize;

/// Profile payload for the authenticated caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub full_name: String,
    pub email: String,
    pub user_name: String,
}

/// GET /api/UserProfile - any authenticated identity
pub async fn get_user_profile(
    State(state): State<AuthState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AuthApiError> {
    let user = state
        .user_store
        .find_by_id(&ctx.user_id)
        .map_err(|_| AuthApiError::InternalError)?
        .ok_or(AuthApiError::UserNotFound)?;

    Ok(Json(ProfileResponse {
        full_name: user.full_name,
        email: user.email,
        user_name: user.username,
    }))
}

/// GET /api/UserProfile/ForAdmin - role Admin
pub async fn get_for_admin() -> &'static str {
    "web method for Admin"
}

/// GET /api/UserProfile/ForCustomer - role Customer
pub async fn get_for_customer() -> &'static str {
    "web method for Customer"
}

/// GET /api/UserProfile/ForUsersOrCustomer - role Admin or Customer
pub async fn get_for_admin_or_customer() -> &'static str {
    "web method for Admin or customer"
}
