//! Courtesy delay between requests
//!
//! Every request after the first waits for the configured delay. The pause
//! sits between requests rather than after the last one, so a run does not
//! end on an idle sleep.

use std::time::Duration;

/// Paces consecutive requests by a fixed delay
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    requests: u64,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, requests: 0 }
    }

    /// Waits until the next request may be sent, then counts it
    pub async fn wait_turn(&mut self) {
        if self.requests > 0 && !self.delay.is_zero() {
            tracing::trace!("Waiting {:?} before the next request", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        self.requests += 1;
    }

    /// Number of requests paced so far
    pub fn requests(&self) -> u64 {
        self.requests
    }
}
