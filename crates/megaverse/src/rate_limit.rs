//! Minimum-gap rate limiting between outgoing API calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a fixed minimum interval between consecutive throttled calls.
///
/// There is no burst allowance. The last-call timestamp is recorded after
/// any wait, so the gap is measured from one release to the next. The lock
/// is held across the wait, which keeps the gap intact even when callers
/// share one limiter from several tasks.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until at least `interval` has passed since the previous release,
    /// then record now as the latest release. The first call never waits.
    pub async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                tracing::debug!("Rate limit: waiting {} ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}
