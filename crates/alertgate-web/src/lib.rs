//! Alertgate HTTP service.
//!
//! Issues bearer tokens to administrators (`POST /token`) and serves the
//! current air raid alert statuses (`GET /alerts-state`) from a short-lived
//! cache in front of the rate-limited upstream API.

pub mod api;
pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod state;
pub mod store;
pub mod upstream;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::middleware::from_fn;
use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Assembles the full application router.
///
/// The per-IP login throttle needs the peer address, so serve the result with
/// `into_make_service_with_connect_info::<SocketAddr>()` unless
/// `login_requests_per_minute` is `0`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let rate_limit_rpm = state.config.rate_limit.login_requests_per_minute;

    let token_routes = if rate_limit_rpm > 0 {
        let period_per_request = 60 / rate_limit_rpm;
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(period_per_request.max(1).into())
                .burst_size(rate_limit_rpm)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid login rate limit configuration"))?,
        );
        api::token_router().layer(GovernorLayer::<_, _, axum::body::Body>::new(governor_config))
    } else {
        api::token_router()
    };

    // CORS: same-origin only by default (no cross-origin requests allowed)
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let base_router = Router::new()
        .merge(token_routes)
        .merge(api::public_router());

    let app = if state.config.tls_enabled() {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers_with_hsts))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    } else {
        base_router
            .layer(from_fn(middleware::security_headers::security_headers))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    };

    Ok(app)
}
