//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Collector host implementation for the rheo collector core
//!
//! The host hands components a cancellation handle tied to process
//! shutdown and collects fatal error reports; the service loop watches
//! the report channel and initiates shutdown on the first one.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::component::Host;
use crate::error::CollectorError;

/// Host implementation backing the collector service
pub struct CollectorHost {
    cancellation: CancellationToken,
    fatal_tx: mpsc::UnboundedSender<CollectorError>,
}

impl CollectorHost {
    /// Create a host and the receiving end of its fatal-error reports
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CollectorError>) {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                cancellation: CancellationToken::new(),
                fatal_tx,
            }),
            fatal_rx,
        )
    }

    /// Cancel the process-wide handle, signalling shutdown to background
    /// work.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

impl Host for CollectorHost {
    fn report_fatal_error(&self, err: CollectorError) {
        error!(error = %err, "component reported fatal error");
        // The service loop may already be gone during teardown; the log
        // line above is the report of record then.
        let _ = self.fatal_tx.send(err);
    }

    fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}
