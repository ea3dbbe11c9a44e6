use alertgate_core::auth::password::{verify_password, verify_unknown_user};
use axum::extract::State;
use axum::{Form, Json};

use crate::dto::{TokenRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn issue_token(
    State(state): State<AppState>,
    Form(body): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let TokenRequest { username, password } = body;

    let stored_hash = state.credentials.password_hash(&username).await?;

    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => Ok(verify_unknown_user(&password)),
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    let valid = verified.unwrap_or_else(|e| {
        tracing::error!("Stored password hash for {username} is unusable: {e}");
        false
    });

    if !valid {
        tracing::warn!("Failed login attempt for user: {username}");
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let issued = state
        .tokens
        .issue(&username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("Issued token for user: {username}");

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer",
        expires_at: issued.expires_at,
    }))
}
