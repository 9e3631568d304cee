//! Authentication middleware for API routes
//!
//! Resolves the Bearer access token to a live user and stores it in the
//! request extensions for the role extractors.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;

use crate::error::{AppError, Result};
use crate::models::user;
use crate::services::identity::session_user;
use crate::services::security::{decode_token, TokenType};
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Auth middleware that validates Bearer tokens.
/// Returns 401 if the token is missing, invalid, expired or revoked.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match extract_bearer_token(req.headers()) {
        Some(t) => t,
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let user = match validate_token_and_get_user(&state.db, &token).await {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(AuthenticatedUser(user));

    next.run(req).await
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Validate an access token and fetch its live, unblocked user
pub async fn validate_token_and_get_user(
    db: &DatabaseConnection,
    token: &str,
) -> Result<user::Model> {
    let claims = decode_token(token, TokenType::Access)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let found = session_user(db, &claims).await?;
    if found.is_blocked {
        return Err(AppError::Unauthorized("Account is blocked".to_string()));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }
}
