//! Error types for `alertgate-core`.
//!
//! Each component owns a small enum. The web crate maps them onto HTTP
//! status codes; nothing here knows about status codes.

use std::time::Duration;

/// A stored password hash could not be checked.
///
/// A plain mismatch is *not* an error: [`crate::auth::password::verify_password`]
/// returns `Ok(false)` for that.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The stored hash is neither an argon2 PHC string nor a bcrypt hash.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// Producing a new hash failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Why a bearer token was rejected.
///
/// All variants end up as the same unauthorized response; the distinction
/// exists for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or an undecodable payload.
    #[error("invalid token signature or payload")]
    InvalidSignature,

    /// The payload decoded but carries no subject.
    #[error("token has no subject")]
    MissingSubject,

    /// The `exp` claim is in the past.
    #[error("token expired")]
    Expired,

    /// Signing a new token failed.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Failure talking to the upstream alert source (other than a timeout).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

/// Failure reading from the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or queried.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of [`crate::AlertGateway::fetch_alerts`] when no snapshot is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The sliding window is full. `retry_after` is when the oldest call expires.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The upstream call did not finish within the configured timeout.
    #[error("upstream request timed out after {0:?}")]
    UpstreamTimeout(Duration),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
