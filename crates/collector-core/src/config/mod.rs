//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Configuration management for the rheo collector core
//!
//! This module provides the declarative service configuration: component
//! sections, pipeline wiring, and structural validation performed before
//! any component is built.

pub mod service;

// Re-export commonly used types
pub use service::{
    parse_pipeline_id, ComponentSettings, PipelineSettings, ServiceConfig, ServiceSection,
};
