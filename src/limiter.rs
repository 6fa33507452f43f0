//! Process-wide token bucket for outbound page fetches.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use nonzero_ext::nonzero;
use tokio_util::sync::CancellationToken;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Global token bucket: `rate` tokens per second, capacity 1.
///
/// Every worker takes one token before a page fetch, so the whole process
/// never exceeds the configured request rate no matter how many workers run.
pub struct RateLimiter {
    limiter: DirectLimiter,
}

impl RateLimiter {
    pub fn new(rate_per_sec: u32) -> Self {
        let rate = NonZeroU32::new(rate_per_sec).unwrap_or(nonzero!(1u32));
        let period = Duration::from_secs(1) / rate.get();
        let quota = Quota::with_period(period).unwrap().allow_burst(nonzero!(1u32));

        Self {
            limiter: GovernorRateLimiter::direct(quota),
        }
    }

    /// Wait for one token. Returns false when the run was cancelled before a
    /// token became available; the caller abandons the request.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = self.limiter.until_ready() => true,
        }
    }
}
