//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry processors for the rheo collector core
//!
//! This module provides the in-tree processor implementations: admission
//! control under memory pressure, resource attribute enrichment, and a
//! scriptable mock for tests.

pub mod memory_limiter;
pub mod mock;
pub mod resource;

// Re-export commonly used processors
pub use memory_limiter::{MemoryLimiterConfig, MemoryLimiterFactory, MemoryLimiterProcessor};
pub use mock::{MockProcessor, MockProcessorFactory};
pub use resource::{ResourceProcessor, ResourceProcessorFactory};
