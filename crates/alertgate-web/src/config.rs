use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alertgate_core::GatewaySettings;
use serde::Deserialize;

/// An administrator listed directly in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub administrators: Vec<AdminConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime. `0` issues tokens that never expire.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_freshness_ms")]
    pub freshness_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_upstream_requests")]
    pub upstream_requests: usize,
    #[serde(default = "default_upstream_window_secs")]
    pub upstream_window_secs: u64,
    /// Per-IP throttle on `POST /token`. `0` disables it.
    #[serde(default = "default_login_rpm")]
    pub login_requests_per_minute: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the `administrator` table. When unset, the
    /// `[[administrators]]` entries of this file are used instead.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}
fn default_token_ttl_minutes() -> u64 { 24 * 60 }
fn default_upstream_url() -> String { "https://api.alerts.in.ua".to_string() }
fn default_upstream_timeout_secs() -> u64 { 10 }
fn default_freshness_ms() -> u64 { 8570 }
fn default_upstream_requests() -> usize { 7 }
fn default_upstream_window_secs() -> u64 { 60 }
fn default_login_rpm() -> u32 { 5 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            api_token: String::new(),
            timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { freshness_ms: default_freshness_ms() }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            upstream_requests: default_upstream_requests(),
            upstream_window_secs: default_upstream_window_secs(),
            login_requests_per_minute: default_login_rpm(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            database: DatabaseConfig::default(),
            tls: TlsConfig::default(),
            administrators: Vec::new(),
        }
    }
}

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn token_ttl(&self) -> Option<Duration> {
        match self.auth.token_ttl_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes.saturating_mul(60))),
        }
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            freshness_window: Duration::from_millis(self.cache.freshness_ms),
            rate_limit: self.rate_limit.upstream_requests,
            rate_window: Duration::from_secs(self.rate_limit.upstream_window_secs),
            upstream_timeout: Duration::from_secs(self.upstream.timeout_secs),
        }
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.cert_path.is_some() && self.tls.key_path.is_some()
    }

    /// Reads `ALERTGATE_CONFIG` (if set), applies environment overrides and
    /// validates secrets.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os("ALERTGATE_CONFIG").map(PathBuf::from);
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// [`ServerConfig::load`] with the file path and variable lookup supplied
    /// by the caller. Without a path the defaults are used.
    pub fn load_from<F>(path: Option<&Path>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read config {}: {e}", path.display())
                })?;
                Self::from_toml(&contents)?
            }
            None => Self::default(),
        };

        config.apply_overrides(lookup)?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `ALERTGATE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ALERTGATE_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(secret) = lookup("ALERTGATE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(token) = lookup("ALERTGATE_ALERTS_API_TOKEN") {
            self.upstream.api_token = token;
        }
        if let Some(url) = lookup("ALERTGATE_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Some(path) = lookup("ALERTGATE_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(cert) = lookup("ALERTGATE_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = lookup("ALERTGATE_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        Ok(())
    }

    /// Fills in a random signing secret if none is set and rejects
    /// placeholder secrets.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.is_empty() {
            self.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (tokens will not survive a restart)."
            );
        }

        if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random secret via ALERTGATE_JWT_SECRET."
            );
        }
        if self.auth.jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT secret is shorter than 32 characters. \
                 Consider using a stronger secret via ALERTGATE_JWT_SECRET."
            );
        }

        if self.upstream.api_token.is_empty() {
            tracing::warn!(
                "No alerts API token configured (ALERTGATE_ALERTS_API_TOKEN). Upstream calls will be rejected."
            );
        }

        if self.database.path.is_none() && self.administrators.is_empty() {
            tracing::warn!("No administrators configured. POST /token will always fail.");
        }

        Ok(())
    }
}
