//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Extension contract for the rheo collector core
//!
//! Extensions are service-level components outside the data path. They are
//! started before and stopped after every pipeline component.

use async_trait::async_trait;
use std::sync::Arc;

use crate::component::Host;
use crate::error::CollectorResult;

/// Extension contract.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Extension name for logs and error reports
    fn name(&self) -> &str;

    /// Invoked during service startup, before pipeline components.
    async fn start(&self, host: Arc<dyn Host>) -> CollectorResult<()>;

    /// Invoked during service shutdown, after pipeline components.
    async fn shutdown(&self) -> CollectorResult<()>;
}
