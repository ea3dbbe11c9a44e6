//! Sliding-log rate limiter for upstream fetches.
//!
//! Every allowed call is recorded with its timestamp. Before each decision,
//! timestamps that have left the trailing window are pruned; if `limit`
//! timestamps remain, the call is denied and *not* recorded. The result is
//! "at most `limit` allowed calls in any trailing `window`".

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::Clock;

/// Process-wide limiter. Prune, count and append happen under one lock.
pub struct RateLimiter {
    log: Mutex<VecDeque<Instant>>,
    limit: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Mutex::new(VecDeque::with_capacity(limit)),
            limit,
            window,
            clock,
        }
    }

    /// Records the call if the window has room. Otherwise returns how long
    /// until a slot opens, computed under the same lock as the decision.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        prune(&mut log, now, self.window);

        if log.len() >= self.limit {
            let wait = self.wait(&log, now);
            tracing::debug!(
                recorded = log.len(),
                limit = self.limit,
                ?wait,
                "Upstream rate limit reached"
            );
            return Err(wait);
        }

        log.push_back(now);
        Ok(())
    }

    /// Returns `true` and records the call if the window has room.
    pub fn allow(&self) -> bool {
        self.try_acquire().is_ok()
    }

    /// How long until the next call would be allowed. `None` if one would be now.
    pub fn retry_after(&self) -> Option<Duration> {
        let now = self.clock.now();
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        prune(&mut log, now, self.window);

        (log.len() >= self.limit).then(|| self.wait(&log, now))
    }

    // Room opens once the oldest of the last `limit` entries expires.
    // With a zero limit there is no such entry and the full window applies.
    fn wait(&self, log: &VecDeque<Instant>, now: Instant) -> Duration {
        log.len()
            .checked_sub(self.limit)
            .and_then(|i| log.get(i))
            .map_or(self.window, |&oldest| {
                self.window.saturating_sub(now.duration_since(oldest))
            })
    }

    /// Calls currently counted against the window.
    pub fn recorded(&self) -> usize {
        let now = self.clock.now();
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        prune(&mut log, now, self.window);
        log.len()
    }
}

fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = log.front() {
        if now.duration_since(oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const WINDOW: Duration = Duration::from_secs(60);

    fn limiter(limit: usize) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (RateLimiter::new(limit, WINDOW, clock.clone()), clock)
    }

    #[test]
    fn allows_up_to_limit_then_denies() {
        let (limiter, _) = limiter(7);
        for i in 0..7 {
            assert!(limiter.allow(), "call {} should be allowed", i + 1);
        }
        assert!(!limiter.allow(), "8th call should be denied");
    }

    #[test]
    fn denied_calls_are_not_recorded() {
        let (limiter, _) = limiter(2);
        assert!(limiter.allow());
        assert!(limiter.allow());
        for _ in 0..5 {
            assert!(!limiter.allow());
        }
        assert_eq!(limiter.recorded(), 2);
    }

    #[test]
    fn window_slides_rather_than_resets() {
        let (limiter, clock) = limiter(2);
        assert!(limiter.allow()); // t=0
        clock.advance(Duration::from_secs(30));
        assert!(limiter.allow()); // t=30
        clock.advance(Duration::from_secs(29));
        assert!(!limiter.allow()); // t=59: both still inside

        clock.advance(Duration::from_secs(1));
        assert!(limiter.allow()); // t=60: first one left the window
        assert!(!limiter.allow());
    }

    #[test]
    fn entry_exactly_window_old_is_pruned() {
        let (limiter, clock) = limiter(1);
        assert!(limiter.allow());
        clock.advance(WINDOW);
        assert_eq!(limiter.recorded(), 0);
        assert!(limiter.allow());
    }

    #[test]
    fn retry_after_points_at_oldest_entry() {
        let (limiter, clock) = limiter(2);
        assert!(limiter.retry_after().is_none());

        limiter.allow();
        clock.advance(Duration::from_secs(10));
        limiter.allow();
        clock.advance(Duration::from_secs(5));

        assert_eq!(limiter.retry_after(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn zero_limit_denies_everything() {
        let (limiter, _) = limiter(0);
        assert!(!limiter.allow());
        assert_eq!(limiter.try_acquire(), Err(WINDOW));
    }

    #[test]
    fn denied_acquire_reports_wait_from_same_decision() {
        let (limiter, clock) = limiter(2);
        assert_eq!(limiter.try_acquire(), Ok(()));
        clock.advance(Duration::from_secs(10));
        assert_eq!(limiter.try_acquire(), Ok(()));
        clock.advance(Duration::from_secs(5));

        assert_eq!(limiter.try_acquire(), Err(Duration::from_secs(45)));
        assert_eq!(limiter.recorded(), 2);
    }

    #[test]
    fn denied_acquire_never_reports_zero_wait() {
        let (limiter, clock) = limiter(1);
        assert_eq!(limiter.try_acquire(), Ok(()));

        // One nanosecond before the entry leaves the window.
        clock.advance(WINDOW - Duration::from_nanos(1));
        assert_eq!(limiter.try_acquire(), Err(Duration::from_nanos(1)));

        clock.advance(Duration::from_nanos(1));
        assert_eq!(limiter.try_acquire(), Ok(()));
    }

    #[test]
    fn concurrent_callers_never_exceed_limit() {
        let clock = Arc::new(ManualClock::new());
        let limiter = Arc::new(RateLimiter::new(7, WINDOW, clock));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.allow())
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(allowed, 7);
        assert_eq!(limiter.recorded(), 7);
    }
}
