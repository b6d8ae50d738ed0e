//! Bounded retry with a fixed delay.
//!
//! Used for two waits: a render layer that does not exist yet, and a pipe
//! network fetch that failed. Neither blocks; callers record a failure and
//! check back once the returned deadline has passed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again once the clock reaches this time.
    RetryAt(Duration),
    GiveUp,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Decide what to do after `attempts` failed attempts observed at `now`.
    pub fn after_failure(&self, attempts: u32, now: Duration) -> RetryDecision {
        if attempts >= self.max_attempts {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAt(now + self.delay())
        }
    }
}
