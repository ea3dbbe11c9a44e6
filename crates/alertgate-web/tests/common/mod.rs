//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alertgate_core::auth::password::hash_password;
use alertgate_core::{
    AlertSnapshot, AlertSource, CredentialStore, ManualClock, StoreError, UpstreamError,
};
use alertgate_web::config::ServerConfig;
use alertgate_web::state::AppState;
use alertgate_web::store::StaticCredentialStore;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Upstream stand-in that counts how often it is called.
#[derive(Default)]
pub struct FakeUpstream {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
    pub fail_with: Option<UpstreamError>,
}

impl FakeUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSource for FakeUpstream {
    async fn fetch_statuses(&self) -> Result<AlertSnapshot, UpstreamError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(AlertSnapshot(serde_json::json!({
            "states": "ANNNNNNNNNNNANNNNNNNNNNNNNP",
            "fetch": n,
        })))
    }
}

/// A credential store whose backend is down.
pub struct UnreachableStore;

#[async_trait]
impl CredentialStore for UnreachableStore {
    async fn password_hash(&self, _username: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config.rate_limit.login_requests_per_minute = 0;
    config
}

pub fn admin_store() -> Arc<StaticCredentialStore> {
    let hash = hash_password(ADMIN_PASSWORD).expect("hash admin password");
    Arc::new([(ADMIN.to_string(), hash)].into_iter().collect())
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub upstream: Arc<FakeUpstream>,
}

impl TestApp {
    pub fn new(config: ServerConfig, upstream: FakeUpstream) -> Self {
        Self::with_store(config, upstream, admin_store())
    }

    pub fn with_store(
        config: ServerConfig,
        upstream: FakeUpstream,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new());
        let upstream = Arc::new(upstream);
        let state = AppState::new(config, store, upstream.clone(), clock.clone());
        let router = alertgate_web::build_router(state.clone()).expect("build router");

        Self {
            router,
            state,
            clock,
            upstream,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn post_token(&self, username: &str, password: &str) -> Response<Body> {
        self.send(token_request().body(form(username, password)).unwrap())
            .await
    }

    /// `POST /token` as if sent by the client at `ip` through a proxy.
    pub async fn post_token_from(
        &self,
        ip: &str,
        username: &str,
        password: &str,
    ) -> Response<Body> {
        let request = token_request()
            .header("x-forwarded-for", ip)
            .body(form(username, password))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn alerts(&self, token: &str) -> Response<Body> {
        self.get(&format!("/alerts-state?token={token}")).await
    }

    /// Logs in as the admin and returns the access token.
    pub async fn login(&self) -> String {
        let response = self.post_token(ADMIN, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), 200);
        let body = body_json(response).await;
        body["access_token"].as_str().unwrap().to_string()
    }
}

fn token_request() -> axum::http::request::Builder {
    Request::post("/token").header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

fn form(username: &str, password: &str) -> Body {
    Body::from(format!(
        "username={username}&password={}",
        password.replace(' ', "+")
    ))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
