// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuron State Machine
//!
//! A neuron buffers incoming signals, runs them through its gate pipeline,
//! folds the results into its potential and fires once the potential
//! reaches its threshold.
//!
//! ```text
//! RESTING --(potential >= threshold)--> fire --> REFRACTORY --> RESTING
//!                                                (potential = 0)
//! ```
//!
//! Neurons never reach each other directly. Outgoing edges hold arena
//! handles, and delivery of emitted signals is driven by the cascade queue
//! owned by the network.

use ahash::AHashMap;
use tracing::debug;

use crate::cascade::FireEvent;
use crate::gate::{Gate, GateSettings, GateType};
use crate::signal::{Signal, SignalType};
use crate::types::{clamp_unit, NeuronHandle};

/// Contribution of a signal without a usable `strength` payload entry
pub const DEFAULT_CONTRIBUTION: f32 = 0.5;

/// Neuron role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeuronType {
    Sensory,
    Processing,
    Memory,
    Integration,
    Association,
    Output,
    Regulatory,
}

impl NeuronType {
    pub const ALL: [NeuronType; 7] = [
        NeuronType::Sensory,
        NeuronType::Processing,
        NeuronType::Memory,
        NeuronType::Integration,
        NeuronType::Association,
        NeuronType::Output,
        NeuronType::Regulatory,
    ];

    /// Lowercase tag every neuron of this type carries
    pub fn as_tag(&self) -> &'static str {
        match self {
            NeuronType::Sensory => "sensory",
            NeuronType::Processing => "processing",
            NeuronType::Memory => "memory",
            NeuronType::Integration => "integration",
            NeuronType::Association => "association",
            NeuronType::Output => "output",
            NeuronType::Regulatory => "regulatory",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NeuronType::Sensory => "SENSORY",
            NeuronType::Processing => "PROCESSING",
            NeuronType::Memory => "MEMORY",
            NeuronType::Integration => "INTEGRATION",
            NeuronType::Association => "ASSOCIATION",
            NeuronType::Output => "OUTPUT",
            NeuronType::Regulatory => "REGULATORY",
        }
    }
}

/// Activation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NeuronState {
    #[default]
    Resting,
    Active,
    Refractory,
    Inhibited,
}

impl NeuronState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeuronState::Resting => "RESTING",
            NeuronState::Active => "ACTIVE",
            NeuronState::Refractory => "REFRACTORY",
            NeuronState::Inhibited => "INHIBITED",
        }
    }

    /// Whether pending signals are held back in this state
    pub fn blocks_processing(&self) -> bool {
        matches!(self, NeuronState::Refractory | NeuronState::Inhibited)
    }
}

/// Initial thresholds per neuron type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeThresholds {
    pub sensory: f32,
    pub memory: f32,
    pub regulatory: f32,
    /// Every other type
    pub default: f32,
}

impl Default for TypeThresholds {
    fn default() -> Self {
        Self {
            sensory: 0.3,
            memory: 0.7,
            regulatory: 0.4,
            default: 0.5,
        }
    }
}

impl TypeThresholds {
    pub fn for_type(&self, kind: NeuronType) -> f32 {
        match kind {
            NeuronType::Sensory => self.sensory,
            NeuronType::Memory => self.memory,
            NeuronType::Regulatory => self.regulatory,
            _ => self.default,
        }
    }
}

/// Outgoing weighted edge
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub target: NeuronHandle,
    pub target_id: String,
    pub weight: f32,
}

/// Payload of a state-change notification
#[derive(Debug, Clone, Copy)]
pub struct StateChange<'a> {
    pub neuron_id: &'a str,
    pub from: NeuronState,
    pub to: NeuronState,
}

/// Runs once per fire, after the weighted signals have been queued
pub type FireListener = Box<dyn FnMut(&mut FireEvent<'_>) + Send>;

/// Runs on every state transition
pub type StateListener = Box<dyn FnMut(&StateChange<'_>) + Send>;

/// Result of draining the pending buffer
#[derive(Debug)]
pub(crate) enum Integration {
    /// Refractory or inhibited; buffer retained
    Blocked,
    /// Nothing buffered
    Idle,
    /// Potential raised but below threshold; outputs already retained
    Charged,
    /// Threshold reached; caller must fire, settle, then retain `processed`
    Crossed { processed: Vec<Signal> },
}

/// A weighted signal on its way to `target`
#[derive(Debug, Clone)]
pub(crate) struct Emission {
    pub target: NeuronHandle,
    pub signal: Signal,
}

/// Strength a signal contributes to potential and to weighted copies
pub fn contribution(signal: &Signal) -> f32 {
    signal
        .try_data_float("strength")
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_CONTRIBUTION)
}

/// A stateful graph node
pub struct Neuron {
    id: String,
    kind: NeuronType,
    state: NeuronState,
    threshold: f32,
    potential: f32,
    gates: Vec<Gate>,
    gate_settings: GateSettings,
    connections: Vec<Connection>,
    inputs: Vec<NeuronHandle>,
    tags: Vec<String>,
    metadata: AHashMap<String, String>,
    pending: Vec<Signal>,
    outputs: Vec<Signal>,
    fire_listeners: Vec<FireListener>,
    state_listeners: Vec<StateListener>,
}

impl std::fmt::Debug for Neuron {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neuron")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("threshold", &self.threshold)
            .field("potential", &self.potential)
            .field("gates", &self.gates.len())
            .field("connections", &self.connections)
            .field("pending", &self.pending.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

impl Neuron {
    pub fn new(id: impl Into<String>, kind: NeuronType) -> Self {
        Self::with_thresholds(id, kind, &TypeThresholds::default())
    }

    pub fn with_thresholds(id: impl Into<String>, kind: NeuronType, thresholds: &TypeThresholds) -> Self {
        Self {
            id: id.into(),
            kind,
            state: NeuronState::Resting,
            threshold: clamp_unit(thresholds.for_type(kind)),
            potential: 0.0,
            gates: Vec::new(),
            gate_settings: GateSettings::default(),
            connections: Vec::new(),
            inputs: Vec::new(),
            tags: vec![kind.as_tag().to_string()],
            metadata: AHashMap::new(),
            pending: Vec::new(),
            outputs: Vec::new(),
            fire_listeners: Vec::new(),
            state_listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NeuronType {
        self.kind
    }

    pub fn state(&self) -> NeuronState {
        self.state
    }

    /// Transition to `state`, notifying state listeners in registration order
    pub fn set_state(&mut self, state: NeuronState) {
        let change = StateChange {
            neuron_id: &self.id,
            from: self.state,
            to: state,
        };
        self.state = state;
        for listener in self.state_listeners.iter_mut() {
            listener(&change);
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_unit(threshold);
    }

    pub fn potential(&self) -> f32 {
        self.potential
    }

    pub fn set_potential(&mut self, potential: f32) {
        self.potential = clamp_unit(potential);
    }

    // ------------------------------------------------------------------
    // Gates
    // ------------------------------------------------------------------

    /// Create and attach a gate named `<id>_gate_<n>`; returns it for tuning
    pub fn create_gate(&mut self, kind: GateType) -> &mut Gate {
        let gate_id = format!("{}_gate_{}", self.id, self.gates.len());
        let index = self.gates.len();
        self.gates
            .push(Gate::with_settings(gate_id, kind, &self.gate_settings));
        &mut self.gates[index]
    }

    pub fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate_mut(&mut self, index: usize) -> Option<&mut Gate> {
        self.gates.get_mut(index)
    }

    pub fn gate_settings(&self) -> &GateSettings {
        &self.gate_settings
    }

    pub fn set_gate_settings(&mut self, settings: GateSettings) {
        self.gate_settings = settings;
    }

    // ------------------------------------------------------------------
    // Tags & metadata
    // ------------------------------------------------------------------

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Metadata value, empty string when absent
    pub fn metadata(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Handles of neurons with an edge into this one
    pub fn inputs(&self) -> &[NeuronHandle] {
        &self.inputs
    }

    /// Handles of neurons this one has an edge to
    pub fn outputs(&self) -> Vec<NeuronHandle> {
        self.connections.iter().map(|c| c.target).collect()
    }

    pub fn is_connected_to(&self, target: NeuronHandle) -> bool {
        self.connections.iter().any(|c| c.target == target)
    }

    /// Weight of the edge to `target`, 0.0 when not connected
    pub fn connection_weight(&self, target: NeuronHandle) -> f32 {
        self.connections
            .iter()
            .find(|c| c.target == target)
            .map(|c| c.weight)
            .unwrap_or(0.0)
    }

    /// Returns false when not connected
    pub fn set_connection_weight(&mut self, target: NeuronHandle, weight: f32) -> bool {
        match self.connections.iter_mut().find(|c| c.target == target) {
            Some(connection) => {
                connection.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Insert or re-weight an outgoing edge. Returns true if the edge is new.
    pub(crate) fn upsert_connection(&mut self, target: NeuronHandle, target_id: &str, weight: f32) -> bool {
        if self.set_connection_weight(target, weight) {
            return false;
        }
        self.connections.push(Connection {
            target,
            target_id: target_id.to_string(),
            weight,
        });
        true
    }

    pub(crate) fn remove_connection(&mut self, target: NeuronHandle) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.target != target);
        before != self.connections.len()
    }

    pub(crate) fn add_input(&mut self, source: NeuronHandle) {
        self.inputs.push(source);
    }

    pub(crate) fn remove_input(&mut self, source: NeuronHandle) {
        self.inputs.retain(|h| *h != source);
    }

    pub(crate) fn clear_edges(&mut self) -> (Vec<Connection>, Vec<NeuronHandle>) {
        (
            std::mem::take(&mut self.connections),
            std::mem::take(&mut self.inputs),
        )
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    pub fn pending_signals(&self) -> &[Signal] {
        &self.pending
    }

    /// Signals produced by earlier passes; reused by every subsequent fire
    pub fn output_signals(&self) -> &[Signal] {
        &self.outputs
    }

    pub fn on_fire<F>(&mut self, listener: F)
    where
        F: FnMut(&mut FireEvent<'_>) + Send + 'static,
    {
        self.fire_listeners.push(Box::new(listener));
    }

    pub fn on_state_change<F>(&mut self, listener: F)
    where
        F: FnMut(&StateChange<'_>) + Send + 'static,
    {
        self.state_listeners.push(Box::new(listener));
    }

    /// Clear potential and both signal buffers, returning to RESTING
    pub fn reset(&mut self) {
        self.potential = 0.0;
        self.pending.clear();
        self.outputs.clear();
        self.set_state(NeuronState::Resting);
    }

    pub(crate) fn buffer(&mut self, signal: Signal) {
        self.pending.push(signal);
    }

    /// Run pending signals through the gates and fold them into potential.
    pub(crate) fn integrate(&mut self) -> Integration {
        if self.state.blocks_processing() {
            return Integration::Blocked;
        }
        if self.pending.is_empty() {
            return Integration::Idle;
        }

        let pending = std::mem::take(&mut self.pending);
        let mut processed = Vec::with_capacity(pending.len());
        for signal in pending {
            let claimed = self
                .gates
                .iter()
                .filter(|g| g.is_active())
                .find_map(|g| g.process(std::slice::from_ref(&signal)));
            processed.push(claimed.unwrap_or(signal));
        }

        let total: f32 = processed.iter().map(contribution).sum();
        self.potential = clamp_unit(self.potential + total / processed.len() as f32);

        debug!(
            target: "ozone_neural::neuron",
            "[NEURON] {} integrated {} signal(s), potential {:.3}/{:.3}",
            self.id,
            processed.len(),
            self.potential,
            self.threshold
        );

        if self.potential >= self.threshold {
            Integration::Crossed { processed }
        } else {
            self.outputs.extend(processed);
            Integration::Charged
        }
    }

    /// Build the weighted copies for every edge and every output signal.
    pub(crate) fn emit(&mut self) -> Vec<Emission> {
        if self.outputs.is_empty() {
            let mut signal = Signal::with_id(
                format!("{}_output", self.id),
                SignalType::Excitatory,
                self.potential,
            );
            signal.set_source_id(self.id.as_str());
            signal.set_data("source", self.id.as_str());
            signal.set_data("strength", self.potential);
            self.outputs.push(signal);
        }

        let mut emissions = Vec::with_capacity(self.connections.len() * self.outputs.len());
        for connection in &self.connections {
            for output in &self.outputs {
                let strength = clamp_unit(contribution(output) * connection.weight);
                let mut weighted = output.derive(Some(strength));
                weighted.set_data("strength", strength);
                weighted.set_data("from", self.id.as_str());
                weighted.set_data("to", connection.target_id.as_str());
                weighted.set_source_id(self.id.as_str());
                weighted.set_target_id(connection.target_id.as_str());
                emissions.push(Emission {
                    target: connection.target,
                    signal: weighted,
                });
            }
        }
        emissions
    }

    /// Post-fire transition: REFRACTORY, potential cleared, then RESTING
    pub(crate) fn settle(&mut self) {
        self.set_state(NeuronState::Refractory);
        self.potential = 0.0;
        self.set_state(NeuronState::Resting);
    }

    pub(crate) fn retain_outputs(&mut self, processed: Vec<Signal>) {
        self.outputs.extend(processed);
    }

    pub(crate) fn take_fire_listeners(&mut self) -> Vec<FireListener> {
        std::mem::take(&mut self.fire_listeners)
    }

    /// Put listeners back in front of any registered while they were running
    pub(crate) fn restore_fire_listeners(&mut self, mut listeners: Vec<FireListener>) {
        listeners.append(&mut self.fire_listeners);
        self.fire_listeners = listeners;
    }
}
