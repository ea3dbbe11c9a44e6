//! Alert gateway: serves alert snapshots from the freshness cache, and only
//! reaches the upstream source when the cache is cold and the rate limiter
//! has budget left.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::cache::FreshnessCache;
use crate::clock::Clock;
use crate::error::GatewayError;
use crate::ratelimit::RateLimiter;
use crate::upstream::{AlertSnapshot, AlertSource};

type Outcome = Result<AlertSnapshot, GatewayError>;

/// Tunables for [`AlertGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Maximum age of a servable cached snapshot.
    pub freshness_window: Duration,
    /// Upstream calls allowed per `rate_window`.
    pub rate_limit: usize,
    pub rate_window: Duration,
    /// Hard deadline for a single upstream call.
    pub upstream_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_millis(8570),
            rate_limit: 7,
            rate_window: Duration::from_secs(60),
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

pub struct AlertGateway {
    cache: FreshnessCache<AlertSnapshot>,
    limiter: RateLimiter,
    source: Arc<dyn AlertSource>,
    upstream_timeout: Duration,
    // Outcome of the refresh in flight, if any. Concurrent misses subscribe
    // here instead of starting their own upstream call.
    inflight: Mutex<Option<watch::Receiver<Option<Outcome>>>>,
}

enum Role {
    Leader(watch::Sender<Option<Outcome>>),
    Follower(watch::Receiver<Option<Outcome>>),
}

/// Clears the in-flight slot when the leader finishes or is dropped.
struct Flight<'a> {
    slot: &'a Mutex<Option<watch::Receiver<Option<Outcome>>>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AlertGateway {
    pub fn new(
        source: Arc<dyn AlertSource>,
        settings: GatewaySettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache: FreshnessCache::new(settings.freshness_window, clock.clone()),
            limiter: RateLimiter::new(settings.rate_limit, settings.rate_window, clock),
            source,
            upstream_timeout: settings.upstream_timeout,
            inflight: Mutex::new(None),
        }
    }

    /// Returns the current alert snapshot.
    ///
    /// 1. A fresh cached snapshot is returned without touching the limiter.
    /// 2. Otherwise the limiter must allow the call, or [`GatewayError::RateLimited`].
    /// 3. The upstream call runs under `upstream_timeout`; on success the
    ///    result is cached. Timeouts and failures leave the cache untouched.
    ///
    /// Misses that arrive while a refresh is running wait for that refresh
    /// and get its outcome, success or failure.
    pub async fn fetch_alerts(&self) -> Result<AlertSnapshot, GatewayError> {
        loop {
            if let Some(snapshot) = self.cache.get() {
                tracing::debug!("Serving alert snapshot from cache");
                return Ok(snapshot);
            }

            match self.join_or_lead() {
                Role::Leader(tx) => {
                    let _flight = Flight {
                        slot: &self.inflight,
                    };
                    let outcome = self.refresh().await;
                    tx.send_replace(Some(outcome.clone()));
                    return outcome;
                }
                Role::Follower(mut rx) => {
                    let shared = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|outcome| (*outcome).clone());
                    if let Some(outcome) = shared {
                        tracing::debug!("Sharing outcome of concurrent refresh");
                        return outcome;
                    }
                    // The leader was dropped before finishing.
                    tracing::debug!("Concurrent refresh abandoned, retrying");
                }
            }
        }
    }

    fn join_or_lead(&self) -> Role {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = slot.as_ref() {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        *slot = Some(rx);
        Role::Leader(tx)
    }

    async fn refresh(&self) -> Outcome {
        // A previous leader may have filled the cache after our miss.
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot);
        }

        if let Err(retry_after) = self.limiter.try_acquire() {
            tracing::warn!(?retry_after, "Upstream rate limit exceeded");
            return Err(GatewayError::RateLimited { retry_after });
        }

        tracing::debug!("Fetching alert statuses from upstream");
        match tokio::time::timeout(self.upstream_timeout, self.source.fetch_statuses()).await {
            Ok(Ok(snapshot)) => {
                self.cache.put(snapshot.clone());
                Ok(snapshot)
            }
            Ok(Err(e)) => {
                tracing::error!("Upstream alert fetch failed: {e}");
                Err(e.into())
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.upstream_timeout, "Upstream alert fetch timed out");
                Err(GatewayError::UpstreamTimeout(self.upstream_timeout))
            }
        }
    }

    pub fn cache(&self) -> &FreshnessCache<AlertSnapshot> {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
