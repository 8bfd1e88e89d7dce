// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `ozone` - run the scripted demo networks
//!
//! Per-crate debug logging uses `--debug-<crate>` flags (see `--help`), which
//! are split off before clap sees the arguments.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ozone::config::{load_config_or_default, parse_cli_overrides, OzoneConfig};
use ozone::demos::{run_pathway, run_reflex};
use ozone::neural::{NetworkFactory, NetworkKind, NetworkSettings};
use ozone::observability::{debug_flags_help, init_logging, parse_debug_flags_from};
use ozone::{debug_flags, logging_options, network_settings};

/// Ozone - signal-gated neuron graph demos
#[derive(Parser, Debug)]
#[command(name = "ozone", version, about, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Path to ozone_configuration.toml (searched for when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override a configuration value, e.g. `--set cascade.max_depth=32`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sensor -> processing -> motor reflex network, low and high touch
    Simple,
    /// Emotional association learning through fire listeners
    Pathway,
    /// Version, effective configuration and available network tiers
    Info,
}

fn main() -> Result<()> {
    let (debug_args, clap_args): (Vec<String>, Vec<String>) =
        env::args().partition(|arg| arg.starts_with("--debug-"));
    let args = Args::parse_from(clap_args);

    let overrides = parse_cli_overrides(&args.overrides).context("Invalid --set override")?;
    let config = load_config_or_default(args.config.as_deref(), Some(&overrides))
        .context("Failed to load configuration")?;

    let flags = debug_flags(&config.logging, &parse_debug_flags_from(debug_args));
    let _guard = init_logging(&flags, &logging_options(&config.logging)?)?;
    info!(target: "ozone", "[OZONE] Starting {} v{}", env!("CARGO_PKG_NAME"), ozone::VERSION);

    let settings = network_settings(&config);
    match args.command {
        Command::Simple => simple(settings),
        Command::Pathway => pathway(settings),
        Command::Info => print_info(&config, settings),
    }
    Ok(())
}

fn simple(settings: NetworkSettings) {
    let (demo, scenarios) = run_reflex(settings);

    for scenario in &scenarios {
        println!("\n--- {} ---", scenario.name);
        println!("Arm activation: {:.3}", scenario.arm_activation);
        println!("Leg activation: {:.3}", scenario.leg_activation);
        println!(
            "Deliveries: {}, fires: {}",
            scenario.report.deliveries,
            scenario.report.fire_count()
        );
    }

    println!("\n{}", demo.network().summary());
}

fn pathway(settings: NetworkSettings) {
    let (demo, probes) = run_pathway(settings);

    println!("\n=== Training Phase ===");
    for event in demo.events() {
        println!("{}", event);
    }

    println!("\nLearned connections:");
    for (source, target, weight) in demo.learned_connections() {
        println!("  {} -> {} ({:.2})", source, target, weight);
    }

    println!("\n=== Testing Phase ===");
    for probe in &probes {
        println!(
            "{} -> {}: {} (potential: {:.3})",
            probe.stimulus,
            probe.emotion,
            if probe.fired { "FIRED" } else { "INACTIVE" },
            probe.potential
        );
    }

    println!("\n{}", demo.network().summary());
}

fn print_info(config: &OzoneConfig, settings: NetworkSettings) {
    println!("ozone {}", ozone::VERSION);
    println!("  ozone-neural {}", ozone::neural::VERSION);
    println!("  ozone-config {}", ozone::config::VERSION);
    println!("  ozone-observability {}", ozone::observability::VERSION);

    println!("\nNetwork tiers:");
    for kind in [
        NetworkKind::Basic,
        NetworkKind::Conscious,
        NetworkKind::Subconscious,
        NetworkKind::Unconscious,
    ] {
        let network = NetworkFactory::create_with_settings(kind, format!("{}_probe", kind.as_str()), settings);
        println!("  {:<12} -> {}", kind.as_str(), network.id());
    }

    println!("\nEffective configuration:\n{:#?}", config);
}
