//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Send status classification for the exporter delivery core
//!
//! Channels report failures with a gRPC-shaped status code; the code
//! decides whether the delivery core retries or drops. Servers may attach
//! a throttle hint directing how long to wait before the next attempt.

use std::time::Duration;
use thiserror::Error;

/// Status code of a send attempt, mirroring gRPC status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendCode {
    Ok,
    Cancelled,
    DeadlineExceeded,
    PermissionDenied,
    Unauthenticated,
    ResourceExhausted,
    Aborted,
    OutOfRange,
    Unavailable,
    DataLoss,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    Unimplemented,
    Internal,
    Unknown,
}

impl SendCode {
    /// An OK-like code carried inside an error value is still success
    pub fn is_ok(&self) -> bool {
        matches!(self, SendCode::Ok)
    }

    /// Whether the delivery core may retry after this code.
    ///
    /// Unknown codes are not retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SendCode::Cancelled
                | SendCode::DeadlineExceeded
                | SendCode::PermissionDenied
                | SendCode::Unauthenticated
                | SendCode::ResourceExhausted
                | SendCode::Aborted
                | SendCode::OutOfRange
                | SendCode::Unavailable
                | SendCode::DataLoss
        )
    }
}

/// A failed send attempt as reported by an `ExportChannel`
#[derive(Debug, Clone, Error)]
#[error("send failed with {code:?}: {message}")]
pub struct SendFailure {
    /// Status code of the attempt
    pub code: SendCode,

    /// Server or transport message
    pub message: String,

    /// Server-directed wait before the next attempt, if any
    pub throttle_hint: Option<Duration>,
}

impl SendFailure {
    /// A failure without throttling information
    pub fn new(code: SendCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            throttle_hint: None,
        }
    }

    /// A failure carrying a server throttle hint
    pub fn throttled(code: SendCode, message: impl Into<String>, wait: Duration) -> Self {
        Self {
            code,
            message: message.into(),
            throttle_hint: Some(wait),
        }
    }
}
