//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Telemetry receivers for the rheo collector core
//!
//! Wire-protocol receivers live in their own crates and plug in through
//! the factory registry; this module carries the in-tree push-driven
//! mock used by tests and demos.

pub mod mock;

// Re-export commonly used receivers
pub use mock::{MockReceiver, MockReceiverFactory};
