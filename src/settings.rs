// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversions from the loaded configuration into engine and logging settings

use ozone_config::{LoggingConfig, OzoneConfig};
use ozone_neural::{CascadeBudget, GateSettings, NetworkSettings, TypeThresholds};
use ozone_observability::{CrateDebugFlags, LoggingOptions};

/// Engine tunables taken from `[neural]`, `[gates]`, `[cascade]` and `[tiers]`
pub fn network_settings(config: &OzoneConfig) -> NetworkSettings {
    NetworkSettings {
        thresholds: TypeThresholds {
            sensory: config.neural.sensory_threshold,
            memory: config.neural.memory_threshold,
            regulatory: config.neural.regulatory_threshold,
            default: config.neural.default_threshold,
        },
        gates: GateSettings {
            default_threshold: config.gates.default_threshold,
            adaptation_rate: config.gates.adaptation_rate,
            adaptation_floor: config.gates.adaptation_floor,
            adaptation_ceiling: config.gates.adaptation_ceiling,
            modulator_factor: config.gates.modulator_factor,
        },
        cascade: CascadeBudget {
            max_deliveries: config.cascade.max_deliveries,
            max_depth: config.cascade.max_depth,
        },
        default_weight: config.neural.default_connection_weight,
        attention_strength: config.tiers.attention_strength,
        response_strength: config.tiers.response_strength,
    }
}

/// Logging options for `init_logging`
///
/// # Errors
///
/// Fails on an unknown `logging.format`
pub fn logging_options(logging: &LoggingConfig) -> anyhow::Result<LoggingOptions> {
    Ok(LoggingOptions {
        level: logging.level.clone(),
        format: logging.format.parse()?,
        file_output: logging.file_output,
        log_dir: logging.log_dir.clone(),
        ..LoggingOptions::default()
    })
}

/// Debug flags from `logging.debug_crates` merged with flags given on the
/// command line or through `OZONE_DEBUG`
pub fn debug_flags(logging: &LoggingConfig, from_cli: &CrateDebugFlags) -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_names(&logging.debug_crates);
    flags.extend_names(from_cli.enabled_crates());
    flags
}
