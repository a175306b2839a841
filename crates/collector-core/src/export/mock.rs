//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Mock export channel for testing the delivery core
//!
//! A scriptable channel: queue up send failures and connect failures,
//! then observe attempt counts. With an empty script every operation
//! succeeds.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::status::SendFailure;
use super::ExportChannel;
use crate::error::{CollectorError, CollectorResult};
use crate::types::TelemetryBatch;

/// Scriptable export channel for tests
#[derive(Default)]
pub struct MockChannel {
    send_script: Mutex<VecDeque<SendFailure>>,
    always: Mutex<Option<SendFailure>>,
    connect_failures: AtomicU64,
    connect_attempts: AtomicU64,
    send_attempts: AtomicU64,
    sent_items: AtomicU64,
}

impl MockChannel {
    /// Create a channel that succeeds at everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next send attempt
    pub fn script_failure(&self, failure: SendFailure) {
        self.send_script
            .lock()
            .expect("send script lock")
            .push_back(failure);
    }

    /// Fail every send attempt from now on
    pub fn always_fail(&self, failure: SendFailure) {
        *self.always.lock().expect("always lock") = Some(failure);
    }

    /// Fail the next `count` connect attempts
    pub fn fail_connects(&self, count: u64) {
        self.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Number of send attempts observed
    pub fn send_attempts(&self) -> u64 {
        self.send_attempts.load(Ordering::SeqCst)
    }

    /// Number of connect attempts observed
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Total items across successfully sent batches
    pub fn sent_items(&self) -> u64 {
        self.sent_items.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExportChannel for MockChannel {
    async fn connect(&self) -> CollectorResult<()> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CollectorError::transient("scripted connect failure"));
        }
        Ok(())
    }

    async fn send(&self, batch: &TelemetryBatch) -> Result<(), SendFailure> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(failure) = self.always.lock().expect("always lock").clone() {
            return Err(failure);
        }

        if let Some(failure) = self.send_script.lock().expect("send script lock").pop_front() {
            return Err(failure);
        }

        self.sent_items
            .fetch_add(batch.item_count() as u64, Ordering::SeqCst);
        Ok(())
    }
}
