//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error types for the rheo collector core
//!
//! This module provides the main error types and structures used throughout
//! the collector.

pub mod context;
pub mod conversions;
pub mod types;

// Re-export commonly used types
pub use context::ErrorContext;
pub use types::{CollectorError, CollectorResult};
