//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Component identity and host contract for the rheo collector core
//!
//! Every pipeline node carries a stable `(kind, type, name)` identity used
//! in configuration references, logs, and startup failure reports. The
//! `Host` trait is the minimal surface a running component sees of the
//! process hosting it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::error::CollectorError;

/// Kinds of pipeline components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Receiver,
    Processor,
    Exporter,
    Extension,
}

impl ComponentKind {
    /// The string form used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Receiver => "receiver",
            ComponentKind::Processor => "processor",
            ComponentKind::Exporter => "exporter",
            ComponentKind::Extension => "extension",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a pipeline node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Component kind
    pub kind: ComponentKind,

    /// Factory type name
    pub type_name: String,

    /// Instance name, disambiguates multiple instances of one type
    pub name: String,
}

impl ComponentDescriptor {
    /// Create a new component descriptor
    pub fn new(
        kind: ComponentKind,
        type_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.type_name, self.name)
    }
}

/// The entity hosting a component.
///
/// Components use the host to report unrecoverable errors discovered after
/// `start` has returned and to obtain the cancellation handle tied to
/// process shutdown for long-running background work.
pub trait Host: Send + Sync {
    /// Report an unrecoverable error; the host is expected to initiate
    /// shutdown.
    fn report_fatal_error(&self, err: CollectorError);

    /// Cancellation handle tied to process shutdown.
    fn cancellation(&self) -> CancellationToken;
}
