//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error types for the rheo collector core
//!
//! This module provides the main error type and its constructor helpers.
//! The variants map one-to-one onto the delivery contract of the pipeline:
//! transient errors may be re-offered upstream, permanent errors must be
//! accounted as dropped, forced drops are memory-pressure backpressure.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Main error type for the collector
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Configuration errors, surfaced before any component starts
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Component startup errors, trigger rollback of started components
    #[error("Start error: {message}")]
    Start {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Transient delivery errors, the emitter may re-offer the batch
    #[error("Transient error: {message}")]
    Transient {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Permanent delivery errors, the emitter must not retry
    #[error("Permanent error: {message}")]
    Permanent {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Memory-limiter backpressure, translated by receivers into
    /// protocol-level backpressure
    #[error("data dropped due to high memory usage")]
    ForcedDrop,

    /// The operation's cancellation handle fired
    #[error("Operation cancelled: {message}")]
    Cancelled { message: String },

    /// The owning component was stopped while the operation was in flight
    #[error("Component stopped: {message}")]
    Stopped { message: String },

    /// Deadline or retry budget exhausted
    #[error("Timeout: {message}")]
    Timeout {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// A factory does not support the requested telemetry data type
    #[error("Data type not supported: {message}")]
    DataTypeNotSupported { message: String },

    /// Aggregated failures from teardown; logged but never blocks exit
    #[error("Shutdown failed with {} error(s): [{}]", .errors.len(), render_error_list(.errors))]
    Shutdown { errors: Vec<CollectorError> },

    /// Aggregated failures from a fan-out junction
    #[error("{} downstream error(s): [{}]", .errors.len(), render_error_list(.errors))]
    Multiple { errors: Vec<CollectorError> },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

fn render_error_list(errors: &[CollectorError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CollectorError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        CollectorError::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CollectorError::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a start error
    pub fn start(message: impl Into<String>) -> Self {
        CollectorError::Start {
            message: message.into(),
            source: None,
        }
    }

    /// Create a start error with source
    pub fn start_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CollectorError::Start {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transient error
    pub fn transient(message: impl Into<String>) -> Self {
        CollectorError::Transient {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transient error with source
    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CollectorError::Transient {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a permanent error
    pub fn permanent(message: impl Into<String>) -> Self {
        CollectorError::Permanent {
            message: message.into(),
            source: None,
        }
    }

    /// Create a permanent error with source
    pub fn permanent_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CollectorError::Permanent {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a forced-drop error
    pub fn forced_drop() -> Self {
        CollectorError::ForcedDrop
    }

    /// Create a cancelled error
    pub fn cancelled(message: impl Into<String>) -> Self {
        CollectorError::Cancelled {
            message: message.into(),
        }
    }

    /// Create a stopped error
    pub fn stopped(message: impl Into<String>) -> Self {
        CollectorError::Stopped {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        CollectorError::Timeout {
            message: message.into(),
            source: None,
        }
    }

    /// Create a data-type-not-supported error
    pub fn data_type_not_supported(message: impl Into<String>) -> Self {
        CollectorError::DataTypeNotSupported {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CollectorError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with source
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CollectorError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Combine a list of errors into a single error.
    ///
    /// Returns `Ok(())` for an empty list, the error itself for a single
    /// entry, and a `Multiple` aggregate otherwise.
    pub fn combine(mut errors: Vec<CollectorError>) -> CollectorResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(CollectorError::Multiple { errors }),
        }
    }

    /// Aggregate teardown failures into a shutdown error.
    pub fn shutdown(errors: Vec<CollectorError>) -> CollectorResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CollectorError::Shutdown { errors })
        }
    }

    /// Check if the emitter may re-offer the batch after this error
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CollectorError::Transient { .. } | CollectorError::ForcedDrop
        )
    }

    /// Check if the error is permanent
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            CollectorError::Permanent { .. }
                | CollectorError::Configuration { .. }
                | CollectorError::DataTypeNotSupported { .. }
        )
    }

    /// Check if the error is a memory-pressure forced drop
    pub fn is_forced_drop(&self) -> bool {
        matches!(self, CollectorError::ForcedDrop)
    }

    /// Get error context for logging
    pub fn context(&self) -> crate::error::ErrorContext {
        crate::error::ErrorContext {
            error_type: self.error_type(),
            transient: self.is_transient(),
            permanent: self.is_permanent(),
        }
    }

    /// Get the error type as a string
    pub fn error_type(&self) -> &'static str {
        match self {
            CollectorError::Configuration { .. } => "Configuration",
            CollectorError::Start { .. } => "Start",
            CollectorError::Transient { .. } => "Transient",
            CollectorError::Permanent { .. } => "Permanent",
            CollectorError::ForcedDrop => "ForcedDrop",
            CollectorError::Cancelled { .. } => "Cancelled",
            CollectorError::Stopped { .. } => "Stopped",
            CollectorError::Timeout { .. } => "Timeout",
            CollectorError::DataTypeNotSupported { .. } => "DataTypeNotSupported",
            CollectorError::Shutdown { .. } => "Shutdown",
            CollectorError::Multiple { .. } => "Multiple",
            CollectorError::Internal { .. } => "Internal",
        }
    }
}
