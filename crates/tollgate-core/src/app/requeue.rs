//! Requeue policy: how long a blocked dependent waits before the next try.

use std::time::Duration;

/// Backoff for requeueing blocked reconciles.
///
/// delay = min(base_delay * multiplier^(attempt - 1), max_delay), then
/// spread by up to `jitter` (a fraction, 0.0..=1.0) in either direction so
/// many dependents of one owner don't all come back in the same tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RequeuePolicy {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub jitter: f64,
}

impl Default for RequeuePolicy {
    /// 5s base, doubling, capped at 5 minutes, 10% jitter.
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(5),
            multiplier: 2.0,
            max_delay: Duration::from_secs(300),
            jitter: 0.1,
        }
    }
}

impl RequeuePolicy {
    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// Delay before the next reconcile.
    ///
    /// `attempt` counts consecutive blocked reconciles, starting at 1;
    /// 0 is treated like 1.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let raw = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());

        let jitter = self.jitter.clamp(0.0, 1.0);
        let spread = if jitter > 0.0 {
            // [-jitter, +jitter)
            (rand::random::<f64>() * 2.0 - 1.0) * jitter
        } else {
            0.0
        };

        let secs = (capped * (1.0 + spread)).max(0.0);
        if secs.is_finite() {
            Duration::from_secs_f64(secs)
        } else {
            self.max_delay
        }
    }
}
