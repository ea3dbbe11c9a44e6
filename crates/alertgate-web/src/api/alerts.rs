use alertgate_core::AlertSnapshot;
use axum::extract::State;
use axum::Json;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn alerts_state(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AlertSnapshot>, AppError> {
    tracing::info!(token_id = %user.jti, "User {} requested alerts", user.sub);

    let snapshot = state.gateway.fetch_alerts().await?;
    Ok(Json(snapshot))
}
