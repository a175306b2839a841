//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! rheo collector main binary

use std::path::Path;

use collector_core::builder::PipelineGraphBuilder;
use collector_core::{
    default_registry, CollectorResult, CollectorService, ServiceConfig, ServiceSettings,
    COLLECTOR_VERSION, DEFAULT_CONFIG_PATH,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Collector failed");
        std::process::exit(1);
    }
}

async fn run() -> CollectorResult<()> {
    info!("Starting rheo collector v{}", COLLECTOR_VERSION);

    // Load configuration
    let config_path =
        std::env::var("RHEO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ServiceConfig::from_file(Path::new(&config_path))?;
    info!(path = %config_path, "Configuration loaded");

    // Assemble the pipeline graph. Vendor component crates would extend
    // the registry here, before assembly.
    let registry = default_registry()?;
    let assembly = PipelineGraphBuilder::new(&config, &registry).build().await?;

    // Start the service
    let service = CollectorService::new(assembly, ServiceSettings::default());
    service.start().await?;

    // Run until a shutdown signal or a fatal component error
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        Some(err) = service.wait_for_fatal_error() => {
            error!(error = %err, "Fatal component error, shutting down");
        }
    }

    // Teardown failures are logged but never block exit
    if let Err(e) = service.shutdown().await {
        error!(error = %e, "Errors during shutdown");
    }

    info!("rheo collector shutdown completed");
    Ok(())
}
