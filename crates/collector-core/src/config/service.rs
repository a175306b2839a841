//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Service configuration for the rheo collector core
//!
//! The schema is a nested mapping with four component sections
//! (`receivers`, `processors`, `exporters`, `extensions`, each
//! `name -> settings`) and a `service` section wiring pipelines.
//! Pipeline ids have the form `<data_type>` or `<data_type>/<suffix>`.
//!
//! Validation combines declarative field constraints (a component's
//! `type` must be non-empty, a pipeline needs at least one receiver and
//! one exporter) with structural reference checks: every referenced
//! component must be defined in its section (the assembler adds the
//! type- and capability-level checks). Violations fail before anything
//! is built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use validator::Validate;

use crate::error::{CollectorError, CollectorResult};
use crate::types::DataType;

/// Component settings: a required `type` plus component-specific fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComponentSettings {
    /// Factory type name
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub type_name: String,

    /// Component-specific fields, handed to the factory as-is
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl ComponentSettings {
    /// Settings with no component-specific fields
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            options: serde_json::Map::new(),
        }
    }

    /// The component-specific fields as one JSON value
    pub fn options_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.options.clone())
    }
}

/// One pipeline: receiver and exporter sets plus an ordered processor chain
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineSettings {
    /// Source receivers (a set; order is irrelevant)
    #[validate(length(min = 1))]
    pub receivers: Vec<String>,

    /// Ordered processor chain
    #[serde(default)]
    pub processors: Vec<String>,

    /// Sink exporters (a set; order is irrelevant)
    #[validate(length(min = 1))]
    pub exporters: Vec<String>,
}

/// The `service` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    /// Extensions to run, by name
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Pipelines keyed by id (`<data_type>` or `<data_type>/<suffix>`)
    #[serde(default)]
    pub pipelines: HashMap<String, PipelineSettings>,
}

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Configured receivers by name
    #[serde(default)]
    pub receivers: HashMap<String, ComponentSettings>,

    /// Configured processors by name
    #[serde(default)]
    pub processors: HashMap<String, ComponentSettings>,

    /// Configured exporters by name
    #[serde(default)]
    pub exporters: HashMap<String, ComponentSettings>,

    /// Configured extensions by name
    #[serde(default)]
    pub extensions: HashMap<String, ComponentSettings>,

    /// Pipeline wiring
    #[serde(default)]
    pub service: ServiceSection,
}

/// Parse a pipeline id into its data type
pub fn parse_pipeline_id(id: &str) -> CollectorResult<DataType> {
    let data_type = id.split('/').next().unwrap_or_default();
    data_type.parse::<DataType>().map_err(|_| {
        CollectorError::configuration(format!(
            "pipeline id {} must start with one of traces, metrics, logs",
            id
        ))
    })
}

impl ServiceConfig {
    /// Load configuration from a file, with `RHEO_`-prefixed environment
    /// variables layered on top.
    pub fn from_file(path: &Path) -> CollectorResult<Self> {
        let loaded = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("RHEO").separator("__"))
            .build()?;

        let service_config: ServiceConfig = loaded.try_deserialize()?;
        service_config.validate_structure()?;
        Ok(service_config)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml(content: &str) -> CollectorResult<Self> {
        let service_config: ServiceConfig = serde_yaml::from_str(content)?;
        service_config.validate_structure()?;
        Ok(service_config)
    }

    /// Validate the wiring: component and pipeline settings satisfy
    /// their declared field constraints, pipeline ids parse, and every
    /// reference resolves to a configured component.
    pub fn validate_structure(&self) -> CollectorResult<()> {
        if self.service.pipelines.is_empty() {
            return Err(CollectorError::configuration(
                "service must define at least one pipeline",
            ));
        }

        for (name, settings) in self
            .receivers
            .iter()
            .chain(self.processors.iter())
            .chain(self.exporters.iter())
            .chain(self.extensions.iter())
        {
            settings.validate().map_err(|e| {
                CollectorError::configuration_with_source(
                    format!("component {} has invalid settings", name),
                    e,
                )
            })?;
        }

        for (id, pipeline) in &self.service.pipelines {
            parse_pipeline_id(id)?;

            pipeline.validate().map_err(|e| {
                CollectorError::configuration_with_source(
                    format!("pipeline {} has invalid settings", id),
                    e,
                )
            })?;

            for name in &pipeline.receivers {
                if !self.receivers.contains_key(name) {
                    return Err(CollectorError::configuration(format!(
                        "pipeline {} references undefined receiver {}",
                        id, name
                    )));
                }
            }
            for name in &pipeline.processors {
                if !self.processors.contains_key(name) {
                    return Err(CollectorError::configuration(format!(
                        "pipeline {} references undefined processor {}",
                        id, name
                    )));
                }
            }
            for name in &pipeline.exporters {
                if !self.exporters.contains_key(name) {
                    return Err(CollectorError::configuration(format!(
                        "pipeline {} references undefined exporter {}",
                        id, name
                    )));
                }
            }
        }

        for name in &self.service.extensions {
            if !self.extensions.contains_key(name) {
                return Err(CollectorError::configuration(format!(
                    "service references undefined extension {}",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
receivers:
  in:
    type: mock

processors:
  limiter:
    type: memory_limiter
    check_interval_ms: 1000
    limit_bytes: 268435456

exporters:
  out:
    type: logging

service:
  pipelines:
    traces:
      receivers: [in]
      processors: [limiter]
      exporters: [out]
    metrics/internal:
      receivers: [in]
      exporters: [out]
"#;

    #[test]
    fn test_valid_config_parses() {
        let config = ServiceConfig::from_yaml(VALID_CONFIG).unwrap();
        assert_eq!(config.receivers.len(), 1);
        assert_eq!(config.service.pipelines.len(), 2);

        let limiter = &config.processors["limiter"];
        assert_eq!(limiter.type_name, "memory_limiter");
        assert_eq!(
            limiter.options_value()["limit_bytes"],
            serde_json::json!(268435456u64)
        );
    }

    #[test]
    fn test_pipeline_id_parsing() {
        assert_eq!(parse_pipeline_id("traces").unwrap(), DataType::Traces);
        assert_eq!(
            parse_pipeline_id("metrics/internal").unwrap(),
            DataType::Metrics
        );
        assert!(parse_pipeline_id("spans/x").is_err());
    }

    #[test]
    fn test_undefined_receiver_is_rejected() {
        let config = r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: logging
service:
  pipelines:
    traces:
      receivers: [ghost]
      exporters: [out]
"#;
        let err = ServiceConfig::from_yaml(config).unwrap_err();
        assert!(err.to_string().contains("undefined receiver"));
    }

    #[test]
    fn test_blank_component_type_is_rejected() {
        let config = r#"
receivers:
  in:
    type: ""
exporters:
  out:
    type: logging
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: [out]
"#;
        let err = ServiceConfig::from_yaml(config).unwrap_err();
        assert!(err.to_string().contains("invalid settings"));
    }

    #[test]
    fn test_pipeline_without_exporters_is_rejected() {
        let config = r#"
receivers:
  in:
    type: mock
exporters:
  out:
    type: logging
service:
  pipelines:
    traces:
      receivers: [in]
      exporters: []
"#;
        assert!(ServiceConfig::from_yaml(config).is_err());
    }

    #[test]
    fn test_empty_service_is_rejected() {
        let config = r#"
receivers:
  in:
    type: mock
"#;
        assert!(ServiceConfig::from_yaml(config).is_err());
    }
}
