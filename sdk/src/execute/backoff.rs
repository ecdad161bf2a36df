//! Retry delays: exponential backoff with jitter.

use std::time::Duration;

use crate::config::{ClientSettings, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF, DEFAULT_MIN_BACKOFF};

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Delay ceiling, jitter included.
    pub max_delay: Duration,
    /// Growth factor per attempt.
    pub multiplier: f64,
    /// Add up to 25% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_MIN_BACKOFF,
            max_delay: DEFAULT_MAX_BACKOFF,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Default::default()
        }
    }

    /// Policy for submitting requests, from client settings.
    pub fn for_requests(settings: &ClientSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: settings.min_backoff,
            max_delay: settings.max_backoff,
            ..Default::default()
        }
    }

    /// Policy for polling receipts and records, from client settings.
    pub fn for_receipts(settings: &ClientSettings) -> Self {
        Self {
            max_attempts: settings.receipt_max_attempts,
            initial_delay: settings.min_backoff,
            max_delay: settings.max_backoff,
            ..Default::default()
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Delay to wait after attempt number `attempt` (1-based) failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.initial_delay.as_millis() as f64;
        let exponent = (attempt - 1).min(i32::MAX as u32) as i32;
        let delay_ms = (base_ms * self.multiplier.powi(exponent)).min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            delay_ms * (1.0 + rand::random::<f64>() * 0.25)
        } else {
            delay_ms
        };
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}
