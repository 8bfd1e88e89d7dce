// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values; missing keys take defaults)
//! 2. Environment variables (`OZONE_*`)
//! 3. CLI arguments (`section.key=value`)
//!
//! The merged result is validated before it is returned.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::validation::validate_config;
use crate::{ConfigError, ConfigResult, OzoneConfig};

/// Name of the configuration file searched for on disk
pub const CONFIG_FILE_NAME: &str = "ozone_configuration.toml";

/// Environment variable -> dotted configuration key
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("OZONE_LOG_LEVEL", "logging.level"),
    ("OZONE_LOG_FORMAT", "logging.format"),
    ("OZONE_LOG_DIR", "logging.log_dir"),
    ("OZONE_CASCADE_MAX_DELIVERIES", "cascade.max_deliveries"),
    ("OZONE_CASCADE_MAX_DEPTH", "cascade.max_depth"),
    ("OZONE_ATTENTION_STRENGTH", "tiers.attention_strength"),
    ("OZONE_RESPONSE_STRENGTH", "tiers.response_strength"),
    ("OZONE_GATE_ADAPTATION_RATE", "gates.adaptation_rate"),
    ("OZONE_DEFAULT_WEIGHT", "neural.default_connection_weight"),
];

/// Find the Ozone configuration file
///
/// Search order:
/// 1. `OZONE_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("OZONE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by OZONE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet OZONE_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file, apply overrides and validate
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI overrides keyed by dotted path (`cascade.max_depth`)
///
/// # Errors
///
/// Returns error if the file is missing or unreadable, contains invalid TOML,
/// a CLI override is malformed, or validation fails
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OzoneConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: OzoneConfig = toml::from_str(&content)?;
    finish(config, cli_args)
}

/// Like [`load_config`], but falls back to built-in defaults when no file is
/// found by the search. An explicit `config_path` must exist.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OzoneConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) => finish(OzoneConfig::default(), cli_args),
        Err(e) => Err(e),
    }
}

fn finish(mut config: OzoneConfig, cli_args: Option<&HashMap<String, String>>) -> ConfigResult<OzoneConfig> {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }
    validate_config(&config)?;
    Ok(config)
}

/// Apply `OZONE_*` environment variable overrides (see [`ENV_OVERRIDES`]).
///
/// Values that fail to parse are ignored, leaving the file value in place.
pub fn apply_environment_overrides(config: &mut OzoneConfig) {
    apply_overrides_from(config, |name| env::var(name).ok());
}

/// Apply [`ENV_OVERRIDES`] using `lookup` as the variable source
pub fn apply_overrides_from<F>(config: &mut OzoneConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for &(var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var) {
            let _ = set_value(config, key, &value);
        }
    }
}

/// Apply CLI overrides keyed by dotted path
///
/// # Errors
///
/// Unknown keys and unparseable values are rejected
pub fn apply_cli_overrides(config: &mut OzoneConfig, cli_args: &HashMap<String, String>) -> ConfigResult<()> {
    let mut keys: Vec<&String> = cli_args.keys().collect();
    keys.sort();
    for key in keys {
        set_value(config, key, &cli_args[key])?;
    }
    Ok(())
}

/// Parse `key=value` arguments into an override map
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for an argument without `=`
pub fn parse_cli_overrides<I, S>(args: I) -> ConfigResult<HashMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut overrides = HashMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidValue(format!("expected key=value, got '{}'", arg)))?;
        overrides.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(overrides)
}

fn parse<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!("{} = '{}'", key, value))),
    }
}

/// Set one configuration value by dotted key
pub fn set_value(config: &mut OzoneConfig, key: &str, value: &str) -> ConfigResult<()> {
    match key {
        "neural.sensory_threshold" => config.neural.sensory_threshold = parse(key, value)?,
        "neural.memory_threshold" => config.neural.memory_threshold = parse(key, value)?,
        "neural.regulatory_threshold" => config.neural.regulatory_threshold = parse(key, value)?,
        "neural.default_threshold" => config.neural.default_threshold = parse(key, value)?,
        "neural.default_connection_weight" => config.neural.default_connection_weight = parse(key, value)?,

        "gates.default_threshold" => config.gates.default_threshold = parse(key, value)?,
        "gates.adaptation_rate" => config.gates.adaptation_rate = parse(key, value)?,
        "gates.adaptation_floor" => config.gates.adaptation_floor = parse(key, value)?,
        "gates.adaptation_ceiling" => config.gates.adaptation_ceiling = parse(key, value)?,
        "gates.modulator_factor" => config.gates.modulator_factor = parse(key, value)?,

        "cascade.max_deliveries" => config.cascade.max_deliveries = parse(key, value)?,
        "cascade.max_depth" => config.cascade.max_depth = parse(key, value)?,

        "tiers.attention_strength" => config.tiers.attention_strength = parse(key, value)?,
        "tiers.response_strength" => config.tiers.response_strength = parse(key, value)?,

        "logging.level" => config.logging.level = value.trim().to_string(),
        "logging.format" => config.logging.format = value.trim().to_lowercase(),
        "logging.file_output" => config.logging.file_output = parse_bool(key, value)?,
        "logging.log_dir" => config.logging.log_dir = PathBuf::from(value.trim()),
        "logging.debug_crates" => {
            config.logging.debug_crates = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }

        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }
    Ok(())
}
