// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem before failing so a single run reports all of them.

use crate::{ConfigError, ConfigResult, OzoneConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfUnitRange { field: String, value: f32 },
    InvertedBounds { floor: f32, ceiling: f32 },
    ZeroBudget { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{} = {} is outside [0, 1]", field, value)
            }
            Self::InvertedBounds { floor, ceiling } => {
                write!(
                    f,
                    "gates.adaptation_floor ({}) is above gates.adaptation_ceiling ({})",
                    floor, ceiling
                )
            }
            Self::ZeroBudget { field } => write!(f, "{} must be greater than zero", field),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - thresholds and strengths inside `[0, 1]`
/// - adaptation floor not above the ceiling
/// - non-zero cascade budgets
/// - finite weights and factors
/// - known logging level and format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failure
pub fn validate_config(config: &OzoneConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every validation failure in `config`, in section order
pub fn collect_errors(config: &OzoneConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_unit_ranges(config, &mut errors);
    validate_adaptation_bounds(config, &mut errors);
    validate_budgets(config, &mut errors);
    validate_finite(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_unit_ranges(config: &OzoneConfig, errors: &mut Vec<ConfigValidationError>) {
    let fields = [
        ("neural.sensory_threshold", config.neural.sensory_threshold),
        ("neural.memory_threshold", config.neural.memory_threshold),
        ("neural.regulatory_threshold", config.neural.regulatory_threshold),
        ("neural.default_threshold", config.neural.default_threshold),
        ("gates.default_threshold", config.gates.default_threshold),
        ("gates.adaptation_rate", config.gates.adaptation_rate),
        ("gates.adaptation_floor", config.gates.adaptation_floor),
        ("gates.adaptation_ceiling", config.gates.adaptation_ceiling),
        ("tiers.attention_strength", config.tiers.attention_strength),
        ("tiers.response_strength", config.tiers.response_strength),
    ];

    for (field, value) in fields {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigValidationError::OutOfUnitRange {
                field: field.to_string(),
                value,
            });
        }
    }
}

fn validate_adaptation_bounds(config: &OzoneConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.gates.adaptation_floor > config.gates.adaptation_ceiling {
        errors.push(ConfigValidationError::InvertedBounds {
            floor: config.gates.adaptation_floor,
            ceiling: config.gates.adaptation_ceiling,
        });
    }
}

fn validate_budgets(config: &OzoneConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.cascade.max_deliveries == 0 {
        errors.push(ConfigValidationError::ZeroBudget {
            field: "cascade.max_deliveries".to_string(),
        });
    }
    if config.cascade.max_depth == 0 {
        errors.push(ConfigValidationError::ZeroBudget {
            field: "cascade.max_depth".to_string(),
        });
    }
}

fn validate_finite(config: &OzoneConfig, errors: &mut Vec<ConfigValidationError>) {
    if !config.neural.default_connection_weight.is_finite() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "neural.default_connection_weight".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    let factor = config.gates.modulator_factor;
    if !factor.is_finite() || factor < 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "gates.modulator_factor".to_string(),
            reason: format!("{} must be finite and non-negative", factor),
        });
    }
}

fn validate_logging(config: &OzoneConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {:?}", config.logging.level, LOG_LEVELS),
        });
    }
    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("'{}' is not one of {:?}", config.logging.format, LOG_FORMATS),
        });
    }
}
