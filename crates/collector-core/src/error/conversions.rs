//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error conversions for the rheo collector core
//!
//! This module provides error conversion implementations for common error types.

use super::types::CollectorError;

/// Error conversion traits for common error types
impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        CollectorError::transient_with_source("IO error", err)
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::configuration_with_source("JSON deserialization error", err)
    }
}

impl From<serde_yaml::Error> for CollectorError {
    fn from(err: serde_yaml::Error) -> Self {
        CollectorError::configuration_with_source("YAML deserialization error", err)
    }
}

impl From<config::ConfigError> for CollectorError {
    fn from(err: config::ConfigError) -> Self {
        CollectorError::configuration_with_source("Configuration error", err)
    }
}

impl From<validator::ValidationErrors> for CollectorError {
    fn from(err: validator::ValidationErrors) -> Self {
        CollectorError::configuration_with_source("Configuration validation failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let collector_err: CollectorError = io_err.into();
        assert!(matches!(collector_err, CollectorError::Transient { .. }));
    }
}
