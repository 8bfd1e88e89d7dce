// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Ozone - Signal-Gated Neuron Graphs
//!
//! Ozone models a network of neurons that exchange discrete signals. Each
//! neuron runs incoming signals through its gates, accumulates potential and
//! fires weighted copies along its edges once the threshold is crossed.
//! Networks come in three tiers that wrap the base processing pass with
//! their own policy.
//!
//! ## Quick Start
//!
//! ```rust
//! use ozone::prelude::*;
//!
//! let network = Network::new("reflex");
//! network.add_input_neuron("touch", NeuronType::Sensory);
//! network.add_output_neuron("arm", NeuronType::Output);
//! network.connect_neurons("touch", "arm", 0.9);
//!
//! let report = network.inject(Signal::stimulus(0.9), Some("touch")).unwrap();
//! assert_eq!(report.fire_count(), 2);
//! ```
//!
//! ## Crates
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: ozone-config, ozone-observability          │
//! │  (TOML + overrides, logging and debug flags)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: ozone-neural                                   │
//! │  (Signal, Gate, Neuron, Network, tiers)                 │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  ozone: settings bridge, demo scenarios, `ozone` binary │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use ozone_config as config;
pub use ozone_neural as neural;
pub use ozone_observability as observability;

pub mod demos;
pub mod settings;

pub use settings::{debug_flags, logging_options, network_settings};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::OzoneConfig;
    pub use crate::neural::{
        CascadeReport, FireEvent, Gate, GateType, Network, NetworkFactory, NetworkKind,
        NetworkSettings, NeuronHandle, NeuronState, NeuronType, PassOutcome, Signal,
        SignalProcessing, SignalType, TieredNetwork,
    };
    pub use crate::settings::network_settings;
}
