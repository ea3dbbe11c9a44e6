//! Alertgate core library — authentication and the cached, rate-limited
//! gateway in front of the upstream alert source.
//!
//! `alertgate-core` knows nothing about HTTP. The web crate (`alertgate-web`)
//! wires these pieces behind axum routes; tests drive them directly with a
//! [`ManualClock`] and fake collaborators.
//!
//! # Modules
//!
//! - [`auth`] — Password verification ([`auth::password`]) and signed bearer tokens ([`TokenIssuer`]).
//! - [`cache`] — Single-slot [`FreshnessCache`] holding the last alert snapshot.
//! - [`ratelimit`] — Sliding-log [`RateLimiter`] guarding upstream fetches.
//! - [`gateway`] — [`AlertGateway`]: cache → rate limit → upstream → cache.
//! - [`upstream`] — The [`AlertSource`] trait and the [`AlertSnapshot`] payload.
//! - [`credentials`] — The [`CredentialStore`] trait consumed by the login flow.
//! - [`clock`] — Injectable time source.
//! - [`error`] — Error enums for every fallible operation.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod ratelimit;
pub mod upstream;

pub use auth::token::{Identity, TokenIssuer};
pub use cache::FreshnessCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::CredentialStore;
pub use error::{GatewayError, StoreError, TokenError, UpstreamError, VerificationError};
pub use gateway::{AlertGateway, GatewaySettings};
pub use ratelimit::RateLimiter;
pub use upstream::{AlertSnapshot, AlertSource};
