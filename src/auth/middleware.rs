//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role gates

use crate::auth::{
    jwt::JwtHandler,
    models::{AuthContext, Role},
};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Auth middleware that validates JWT bearer tokens.
///
/// On success the request gains an [`AuthContext`] extension consumed by
/// handlers and role gates downstream.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)?;

    // Invalid signature and expired tokens are both terminal here.
    let claims = jwt_handler
        .validate(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    let ctx = AuthContext::from_claims(&claims).ok_or(AuthError::InvalidToken)?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Extract the identity context from a request (use after auth middleware)
pub fn extract_context(req: &Request) -> Option<&AuthContext> {
    req.extensions().get::<AuthContext>()
}

/// Shared role predicate: the identity must hold at least one of the
/// required roles. An empty requirement admits any authenticated identity.
pub fn has_any_role(held: &[Role], required: &[Role]) -> bool {
    required.is_empty() || required.iter().any(|r| held.contains(r))
}

type RoleGateFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>;

/// Middleware factory requiring any of the listed roles.
/// Must run after `auth_middleware`.
pub fn require_roles(
    required: &'static [Role],
) -> impl Fn(Request, Next) -> RoleGateFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let ctx = extract_context(&req).ok_or(AuthError::MissingToken)?;

            if !has_any_role(&ctx.roles, required) {
                return Err(AuthError::InsufficientRole);
            }

            Ok(next.run(req).await)
        })
    }
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InsufficientRole,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::InsufficientRole => (StatusCode::FORBIDDEN, "Insufficient role"),
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
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use uuid::Uuid;

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = AuthError::InvalidToken.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::InsufficientRole.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_role_predicate_union_semantics() {
        let customer = vec![Role::Customer];

        assert!(!has_any_role(&customer, &[Role::Admin]));
        assert!(has_any_role(&customer, &[Role::Customer]));
        // "Admin,Customer" chaining admits either role
        assert!(has_any_role(&customer, &[Role::Admin, Role::Customer]));
    }

    #[test]
    fn test_role_predicate_empty_cases() {
        // No required roles: any authenticated identity passes
        assert!(has_any_role(&[], &[]));
        assert!(has_any_role(&[Role::Admin], &[]));

        // No held roles: every non-empty requirement fails
        assert!(!has_any_role(&[], &[Role::Admin]));
        assert!(!has_any_role(&[], &[Role::Customer]));
        assert!(!has_any_role(&[], &[Role::Admin, Role::Customer]));
    }

    #[test]
    fn test_extract_context_from_request() {
        let mut req = HttpRequest::new(Body::empty());

        // No context initially
        assert!(extract_context(&req).is_none());

        let ctx = AuthContext {
            user_id: Uuid::new_v4(),
            roles: vec![Role::Customer],
        };
        req.extensions_mut().insert(ctx.clone());

        let extracted = extract_context(&req);
        assert!(extracted.is_some());
        assert_eq!(extracted.unwrap().user_id, ctx.user_id);
    }
}
