use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::dto::TokenQuery;
use crate::error::AppError;
use crate::state::AppState;

const UNAUTHORIZED: &str = "Could not validate credentials";

/// The authenticated caller of a protected route.
///
/// Subject and token id are only used for logging; every valid token may
/// access every protected route.
pub struct AuthUser {
    pub sub: String,
    pub jti: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_query(parts)
            .or_else(|| token_from_header(parts))
            .ok_or_else(|| {
                tracing::debug!("Rejected request without token");
                AppError::Auth(UNAUTHORIZED.to_string())
            })?;

        let identity = state.tokens.validate(&token).map_err(|e| {
            tracing::debug!("Rejected token: {e}");
            AppError::Auth(UNAUTHORIZED.to_string())
        })?;

        Ok(AuthUser {
            sub: identity.subject,
            jti: identity.token_id,
        })
    }
}

fn token_from_query(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

fn token_from_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
