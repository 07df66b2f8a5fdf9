//! Request pacing for quota-limited providers

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Shared gate enforcing a minimum interval between calls to one provider
///
/// Backed by a GCRA limiter with a burst of one, so checking and claiming a slot is a
/// single atomic step and concurrent callers are released one interval apart. Clones
/// share the same gate. A zero interval leaves the gate open.
#[derive(Debug, Clone)]
pub struct RequestGate {
    provider: &'static str,
    min_interval: Duration,
    limiter: Option<SharedRateLimiter>,
}

impl RequestGate {
    pub fn new(provider: &'static str, min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval).map(|quota| Arc::new(RateLimiter::direct(quota)));

        Self {
            provider,
            min_interval,
            limiter,
        }
    }

    /// Gate that never waits
    pub fn open(provider: &'static str) -> Self {
        Self::new(provider, Duration::ZERO)
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call is allowed and claim the slot
    pub async fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };

        if limiter.check().is_err() {
            tracing::debug!(
                provider = self.provider,
                interval_ms = self.min_interval.as_millis() as u64,
                "waiting for rate limit slot"
            );
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_sequential_calls_are_spaced() {
        let gate = RequestGate::new("Alpha Vantage", Duration::from_millis(40));
        let started = Instant::now();

        let mut released = Vec::new();
        for _ in 0..3 {
            gate.acquire().await;
            released.push(started.elapsed());
        }

        assert!(released[0] < Duration::from_millis(40));
        for pair in released.windows(2) {
            // allow a little scheduler slack below the nominal interval
            assert!(pair[1] - pair[0] >= Duration::from_millis(35), "{released:?}");
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let gate = RequestGate::new("Alpha Vantage", Duration::from_millis(30));
        let started = Instant::now();

        let waits = (0..4).map(|_| {
            let gate = gate.clone();
            async move {
                gate.acquire().await;
                started.elapsed()
            }
        });
        let mut released = futures::future::join_all(waits).await;
        released.sort();

        // four slots one interval apart span at least three intervals
        assert!(released[3] >= Duration::from_millis(85), "{released:?}");
    }

    #[tokio::test]
    async fn test_open_gate_never_waits() {
        let gate = RequestGate::open("NewsAPI");
        let started = Instant::now();
        for _ in 0..100 {
            gate.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(gate.min_interval(), Duration::ZERO);
    }
}
