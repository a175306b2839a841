//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Core trait definitions for the rheo collector core
//!
//! This module provides the foundational traits that define the pipeline
//! graph: the consume contract, the component contracts for receivers,
//! processors, exporters and extensions, and the factory interfaces used
//! during assembly.

pub mod consumer;
pub mod exporter;
pub mod extension;
pub mod factory;
pub mod processor;
pub mod receiver;

// Re-export commonly used traits
pub use consumer::*;
pub use exporter::*;
pub use extension::*;
pub use factory::*;
pub use processor::*;
pub use receiver::*;
