// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Ozone Neural Engine
//!
//! Signal-gated neuron graphs:
//! - **Signal**: strength, type, payload and tags
//! - **Gate**: per-neuron transformer (AND, OR, NOT, XOR, THRESHOLD, MODULATOR, CUSTOM)
//! - **Neuron**: potential, threshold and the RESTING/REFRACTORY state machine
//! - **Network**: arena-backed registry, breadth-first cascades, processing passes
//! - **Tiers**: conscious, subconscious and unconscious pass policies
//!
//! Everything runs synchronously on the calling thread.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod arena;
pub mod cascade;
pub mod diagnostics;
pub mod gate;
pub mod network;
pub mod neuron;
pub mod signal;
pub mod tiers;

pub use arena::{ArenaCounters, NeuronArena};
pub use cascade::{CascadeBudget, CascadeReport, FireEvent};
pub use diagnostics::NeuronSnapshot;
pub use gate::{Gate, GateLogic, GateSettings, GateTransform, GateType};
pub use network::{Network, NetworkSettings, PassOutcome, ProcessObserver};
pub use neuron::{
    contribution, Connection, FireListener, Neuron, NeuronState, NeuronType, StateChange,
    StateListener, TypeThresholds, DEFAULT_CONTRIBUTION,
};
pub use signal::{Signal, SignalType};
pub use tiers::{
    ConsciousNetwork, NetworkFactory, NetworkKind, PatternRule, SignalProcessing,
    SubconsciousNetwork, TieredNetwork, UnconsciousNetwork,
};
pub use types::{clamp_unit, mint_signal_id, Error, NeuralError, NeuronHandle, PayloadValue, Result};
