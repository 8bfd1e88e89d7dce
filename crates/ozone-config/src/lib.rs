// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Ozone Configuration System
//!
//! Type-safe configuration loader for Ozone with support for:
//! - TOML file parsing (`ozone_configuration.toml`)
//! - Environment variable overrides (`OZONE_*`)
//! - CLI `key=value` overrides
//! - Validation of ranges and budgets
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ozone_config::{load_config_or_default, OzoneConfig};
//!
//! let config: OzoneConfig = load_config_or_default(None, None).expect("Failed to load config");
//! println!("Cascade budget: {} deliveries", config.cascade.max_deliveries);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, apply_overrides_from, find_config_file,
    load_config, load_config_or_default, parse_cli_overrides, set_value, CONFIG_FILE_NAME,
    ENV_OVERRIDES,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OzoneConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: ConfigError = toml::from_str::<OzoneConfig>("[cascade\nmax_depth = ")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
