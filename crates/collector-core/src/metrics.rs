//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Internal accounting counters for the rheo collector core
//!
//! The counters record per-component item flow: accepted into a pipeline,
//! refused by admission control, dropped by an exporter. Exposure of the
//! recorder (Prometheus endpoint, statsd, ...) is the embedding process's
//! concern; the core only emits.

use metrics::{counter, gauge};

/// Items accepted by a pipeline on behalf of a receiver
pub fn record_items_accepted(component: &str, count: u64) {
    counter!(
        "collector_items_accepted_total",
        count,
        "component" => component.to_string()
    );
}

/// Items refused by admission control (memory-limiter backpressure)
pub fn record_items_refused(component: &str, count: u64) {
    counter!(
        "collector_items_refused_total",
        count,
        "component" => component.to_string()
    );
}

/// Items dropped on an exporter error path
pub fn record_items_dropped(component: &str, count: u64) {
    counter!(
        "collector_items_dropped_total",
        count,
        "component" => component.to_string()
    );
}

/// A single send attempt against an exporter endpoint
pub fn record_send_attempt(component: &str) {
    counter!(
        "collector_send_attempts_total",
        1,
        "component" => component.to_string()
    );
}

/// A reconnect attempt by an exporter connection manager
pub fn record_reconnect_attempt(component: &str) {
    counter!(
        "collector_reconnect_attempts_total",
        1,
        "component" => component.to_string()
    );
}

/// Current memory-limiter throttling state (1 = throttling)
pub fn record_throttling_state(throttling: bool) {
    gauge!(
        "collector_memory_limiter_throttling",
        if throttling { 1.0 } else { 0.0 }
    );
}
