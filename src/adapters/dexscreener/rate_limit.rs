//! Request pacing for the DexScreener public API

use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window limiter with a minimum spacing between requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per minute
    rpm_limit: u32,
    /// Minimum gap between two requests
    min_interval: Duration,
    last_request: Option<Instant>,
    requests_in_window: u32,
    window_start: Instant,
}

impl RateLimiter {
    /// Spacing is derived from the limit, e.g. 60 RPM -> one request per second
    pub fn new(rpm_limit: u32) -> Self {
        let rpm = rpm_limit.max(1);
        Self {
            rpm_limit: rpm,
            min_interval: WINDOW / rpm,
            last_request: None,
            requests_in_window: 0,
            window_start: Instant::now(),
        }
    }

    /// How long to wait before the next request, if at all
    pub fn check_rate_limit(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.window_start);

        if elapsed >= WINDOW {
            self.window_start = now;
            self.requests_in_window = 0;
        }

        if self.requests_in_window >= self.rpm_limit {
            return Some(WINDOW.saturating_sub(elapsed));
        }

        if let Some(last) = self.last_request {
            let since_last = now.duration_since(last);
            if since_last < self.min_interval {
                return Some(self.min_interval - since_last);
            }
        }

        None
    }

    pub fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
        self.requests_in_window += 1;
    }

    /// Wait until a request can be made, then record it
    pub async fn wait_if_needed(&mut self) {
        if let Some(wait) = self.check_rate_limit() {
            tracing::debug!("DexScreener rate limit: waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request();
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
