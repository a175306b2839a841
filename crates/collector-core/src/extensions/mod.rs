//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Service extensions for the rheo collector core
//!
//! Extensions live outside the data path (health endpoints, ballast
//! allocators, auth helpers) and plug in through the factory registry;
//! this module carries the in-tree mock used by lifecycle tests.

pub mod mock;

// Re-export commonly used extensions
pub use mock::{MockExtension, MockExtensionFactory};
