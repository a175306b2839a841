//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Retry backoff schedule for the exporter delivery core
//!
//! Capped exponential backoff with jitter and a wall-time budget. The
//! schedule only measures time; sleeping and cancellation are the
//! caller's concern, which keeps the budget arithmetic testable without
//! a clock.

use std::time::{Duration, Instant};

/// Retry configuration for the send path
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Initial backoff interval in milliseconds
    pub initial_backoff_ms: u64,

    /// Backoff multiplier applied after each attempt
    pub multiplier: f64,

    /// Cap on a single backoff interval in milliseconds
    pub max_backoff_ms: u64,

    /// Total wall-time budget per request in milliseconds
    pub max_elapsed_ms: u64,

    /// Jitter factor (0.0 to 1.0) applied to each interval
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 500,
            multiplier: 1.5,
            max_backoff_ms: 60_000,
            // Plenty of time for typical quick transient errors to resolve.
            max_elapsed_ms: 15 * 60 * 1000,
            jitter_factor: 0.2,
        }
    }
}

/// A live backoff schedule for one request
pub struct BackoffSchedule {
    config: RetryConfig,
    next_ms: f64,
    started: Instant,
}

impl BackoffSchedule {
    /// Start a schedule; the wall-time budget begins now
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            config: config.clone(),
            next_ms: config.initial_backoff_ms as f64,
            started: Instant::now(),
        }
    }

    /// The next interval to wait, or `None` once the budget is exhausted.
    ///
    /// The budget is checked before handing out an interval, so total
    /// wall time never exceeds the budget by more than one interval.
    pub fn next_interval(&mut self) -> Option<Duration> {
        if self.started.elapsed() >= Duration::from_millis(self.config.max_elapsed_ms) {
            return None;
        }

        let base = self.next_ms;
        self.next_ms = (self.next_ms * self.config.multiplier)
            .min(self.config.max_backoff_ms as f64);

        let jitter = base * self.config.jitter_factor * (rand::random::<f64>() * 2.0 - 1.0);
        let interval_ms = (base + jitter).max(1.0);

        Some(Duration::from_millis(interval_ms as u64))
    }
}
