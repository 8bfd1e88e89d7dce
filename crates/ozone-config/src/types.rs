// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Every struct maps to a section of `ozone_configuration.toml`. All
//! sections and fields are optional in the file; missing values take the
//! defaults below.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OzoneConfig {
    pub neural: NeuralConfig,
    pub gates: GatesConfig,
    pub cascade: CascadeConfig,
    pub tiers: TiersConfig,
    pub logging: LoggingConfig,
}

/// Neuron defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuralConfig {
    pub sensory_threshold: f32,
    pub memory_threshold: f32,
    pub regulatory_threshold: f32,
    /// Threshold for every other neuron type
    pub default_threshold: f32,
    pub default_connection_weight: f32,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            sensory_threshold: 0.3,
            memory_threshold: 0.7,
            regulatory_threshold: 0.4,
            default_threshold: 0.5,
            default_connection_weight: 1.0,
        }
    }
}

/// Gate defaults and adaptation bounds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatesConfig {
    pub default_threshold: f32,
    pub adaptation_rate: f32,
    pub adaptation_floor: f32,
    pub adaptation_ceiling: f32,
    pub modulator_factor: f32,
}

impl Default for GatesConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.5,
            adaptation_rate: 0.1,
            adaptation_floor: 0.1,
            adaptation_ceiling: 0.9,
            modulator_factor: 1.0,
        }
    }
}

/// Propagation budget per cascade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub max_deliveries: usize,
    pub max_depth: u32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_deliveries: 10_000,
            max_depth: 256,
        }
    }
}

/// Tier policy strengths
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TiersConfig {
    pub attention_strength: f32,
    pub response_strength: f32,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            attention_strength: 0.5,
            response_strength: 0.8,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// "text" or "json"
    pub format: String,
    /// Crates to log at debug level (same names as `--debug-<crate>`)
    pub debug_crates: Vec<String>,
    /// Also write logs to files (requires the `file-logging` feature)
    pub file_output: bool,
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            debug_crates: Vec::new(),
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OzoneConfig = toml::from_str(
            r#"
            [cascade]
            max_depth = 12

            [tiers]
            response_strength = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.cascade.max_depth, 12);
        assert_eq!(config.cascade.max_deliveries, 10_000);
        assert_eq!(config.tiers.response_strength, 0.6);
        assert_eq!(config.tiers.attention_strength, 0.5);
        assert_eq!(config.neural, NeuralConfig::default());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(OzoneConfig::default()).unwrap();
        assert_eq!(json["gates"]["adaptation_ceiling"], serde_json::json!(0.9f32));
        assert_eq!(json["logging"]["format"], "text");
    }
}
