mod alerts;
mod token;

use axum::routing::{get, post};
use axum::Json;
use axum::Router;

use crate::dto::StatusResponse;
use crate::state::AppState;

/// `POST /token`. Kept separate so the login throttle only wraps this route.
pub fn token_router() -> Router<AppState> {
    Router::new().route("/token", post(token::issue_token))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/alerts-state", get(alerts::alerts_state))
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Alertgate with alerts.in.ua integration is running!",
    })
}
