// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Network
//!
//! Owns the neuron arena behind a single per-instance lock, tracks the
//! input/output subsets and runs whole-network processing passes.
//!
//! ## Processing pass
//! 1. input neurons
//! 2. neurons in neither list
//! 3. output neurons
//! 4. process observers
//!
//! A neuron registered as both input and output is visited in steps 1 and 3.
//!
//! A pass started while another is running on the same network is dropped.
//!
//! Fire listeners run while the network lock is held. They must work through
//! the [`FireEvent`](crate::cascade::FireEvent) they are given and never call
//! back into the owning `Network`.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::arena::{ArenaCounters, NeuronArena};
use crate::cascade::{Cascade, CascadeBudget, CascadeReport};
use crate::gate::GateSettings;
use crate::neuron::{Neuron, NeuronState, NeuronType, TypeThresholds};
use crate::signal::Signal;
use crate::types::NeuronHandle;

/// Observer invoked at the end of every completed pass
pub type ProcessObserver = Box<dyn FnMut(&Network) + Send>;

/// Tunables applied to neurons, gates and cascades created by a network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSettings {
    pub thresholds: TypeThresholds,
    pub gates: GateSettings,
    pub cascade: CascadeBudget,
    /// Weight used by [`Network::connect_neurons_default`]
    pub default_weight: f32,
    /// Strength of the conscious tier's attention signal
    pub attention_strength: f32,
    /// Strength of the subconscious tier's response signal
    pub response_strength: f32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            thresholds: TypeThresholds::default(),
            gates: GateSettings::default(),
            cascade: CascadeBudget::default(),
            default_weight: 1.0,
            attention_strength: 0.5,
            response_strength: 0.8,
        }
    }
}

/// Result of [`Network::process_signals`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Another pass was already running
    Skipped,
    Completed(CascadeReport),
}

impl PassOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, PassOutcome::Skipped)
    }

    pub fn report(&self) -> Option<&CascadeReport> {
        match self {
            PassOutcome::Completed(report) => Some(report),
            PassOutcome::Skipped => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Graph {
    pub(crate) arena: NeuronArena,
    pub(crate) inputs: Vec<NeuronHandle>,
    pub(crate) outputs: Vec<NeuronHandle>,
}

/// Clears the processing flag even if a pass unwinds
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A registry of neurons with input/output subsets
pub struct Network {
    id: String,
    settings: NetworkSettings,
    graph: Mutex<Graph>,
    processing: AtomicBool,
    observers: Mutex<Vec<ProcessObserver>>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("neurons", &self.neuron_count())
            .field("processing", &self.is_processing())
            .finish()
    }
}

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_settings(id, NetworkSettings::default())
    }

    pub fn with_settings(id: impl Into<String>, settings: NetworkSettings) -> Self {
        let id = id.into();
        info!(target: "ozone_neural::network", "[NETWORK] Created network '{}'", id);
        Self {
            id,
            settings,
            graph: Mutex::new(Graph::default()),
            processing: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Create a neuron, or return the existing handle if `id` is taken
    pub fn create_neuron(&self, id: &str, kind: NeuronType) -> NeuronHandle {
        let mut graph = self.graph.lock();
        Self::create_locked(&mut graph, &self.settings, id, kind)
    }

    fn create_locked(graph: &mut Graph, settings: &NetworkSettings, id: &str, kind: NeuronType) -> NeuronHandle {
        graph.arena.get_or_insert_with(id, || {
            debug!(target: "ozone_neural::network", "[NETWORK] Created neuron {} ({})", id, kind.as_str());
            let mut neuron = Neuron::with_thresholds(id, kind, &settings.thresholds);
            neuron.set_gate_settings(settings.gates);
            neuron
        })
    }

    /// Insert a neuron built elsewhere; false if its id is already taken
    pub fn add_neuron(&self, neuron: Neuron) -> bool {
        self.graph.lock().arena.insert(neuron).is_some()
    }

    pub fn get_neuron(&self, id: &str) -> Option<NeuronHandle> {
        self.graph.lock().arena.handle_of(id)
    }

    pub fn contains(&self, handle: NeuronHandle) -> bool {
        self.graph.lock().arena.contains(handle)
    }

    /// Remove a neuron after unlinking every edge and list membership
    pub fn remove_neuron(&self, id: &str) -> bool {
        let mut graph = self.graph.lock();
        let Some(handle) = graph.arena.handle_of(id) else {
            return false;
        };
        graph.inputs.retain(|h| *h != handle);
        graph.outputs.retain(|h| *h != handle);
        let removed = graph.arena.remove(handle).is_some();
        if removed {
            info!(target: "ozone_neural::network", "[NETWORK] Removed neuron {} from '{}'", id, self.id);
        }
        removed
    }

    /// All neuron handles in slot order
    pub fn get_all_neurons(&self) -> Vec<NeuronHandle> {
        self.graph.lock().arena.handles()
    }

    pub fn neurons_by_type(&self, kind: NeuronType) -> Vec<NeuronHandle> {
        self.find_neurons(|n| n.kind() == kind)
    }

    pub fn neurons_by_tag(&self, tag: &str) -> Vec<NeuronHandle> {
        self.find_neurons(|n| n.has_tag(tag))
    }

    pub fn find_neurons<F>(&self, mut predicate: F) -> Vec<NeuronHandle>
    where
        F: FnMut(&Neuron) -> bool,
    {
        self.graph
            .lock()
            .arena
            .iter()
            .filter(|entry| predicate(entry.1))
            .map(|(h, _)| h)
            .collect()
    }

    pub fn any_neuron<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&Neuron) -> bool,
    {
        self.graph.lock().arena.iter().map(|(_, n)| n).any(predicate)
    }

    pub fn with_neuron<R>(&self, id: &str, f: impl FnOnce(&Neuron) -> R) -> Option<R> {
        let graph = self.graph.lock();
        let handle = graph.arena.handle_of(id)?;
        graph.arena.get(handle).map(f)
    }

    pub fn with_neuron_mut<R>(&self, id: &str, f: impl FnOnce(&mut Neuron) -> R) -> Option<R> {
        let mut graph = self.graph.lock();
        let handle = graph.arena.handle_of(id)?;
        graph.arena.get_mut(handle).map(f)
    }

    pub fn with_neuron_at<R>(&self, handle: NeuronHandle, f: impl FnOnce(&Neuron) -> R) -> Option<R> {
        self.graph.lock().arena.get(handle).map(f)
    }

    pub fn with_neuron_at_mut<R>(&self, handle: NeuronHandle, f: impl FnOnce(&mut Neuron) -> R) -> Option<R> {
        self.graph.lock().arena.get_mut(handle).map(f)
    }

    pub fn neuron_id(&self, handle: NeuronHandle) -> Option<String> {
        self.with_neuron_at(handle, |n| n.id().to_string())
    }

    pub fn neuron_state(&self, handle: NeuronHandle) -> Option<NeuronState> {
        self.with_neuron_at(handle, Neuron::state)
    }

    pub fn neuron_potential(&self, handle: NeuronHandle) -> Option<f32> {
        self.with_neuron_at(handle, Neuron::potential)
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    pub fn connect(&self, source: NeuronHandle, target: NeuronHandle, weight: f32) -> bool {
        self.graph.lock().arena.connect(source, target, weight)
    }

    pub fn disconnect(&self, source: NeuronHandle, target: NeuronHandle) -> bool {
        self.graph.lock().arena.disconnect(source, target)
    }

    pub fn connect_neurons(&self, source_id: &str, target_id: &str, weight: f32) -> bool {
        let mut graph = self.graph.lock();
        match (graph.arena.handle_of(source_id), graph.arena.handle_of(target_id)) {
            (Some(source), Some(target)) => graph.arena.connect(source, target, weight),
            _ => false,
        }
    }

    /// Connect with the network's default weight
    pub fn connect_neurons_default(&self, source_id: &str, target_id: &str) -> bool {
        self.connect_neurons(source_id, target_id, self.settings.default_weight)
    }

    pub fn disconnect_neurons(&self, source_id: &str, target_id: &str) -> bool {
        let mut graph = self.graph.lock();
        match (graph.arena.handle_of(source_id), graph.arena.handle_of(target_id)) {
            (Some(source), Some(target)) => graph.arena.disconnect(source, target),
            _ => false,
        }
    }

    /// Edge weight, 0.0 when either neuron or the edge is missing
    pub fn connection_weight(&self, source_id: &str, target_id: &str) -> f32 {
        let graph = self.graph.lock();
        let (Some(source), Some(target)) = (graph.arena.handle_of(source_id), graph.arena.handle_of(target_id)) else {
            return 0.0;
        };
        graph
            .arena
            .get(source)
            .map(|n| n.connection_weight(target))
            .unwrap_or(0.0)
    }

    pub fn set_connection_weight(&self, source_id: &str, target_id: &str, weight: f32) -> bool {
        let mut graph = self.graph.lock();
        let (Some(source), Some(target)) = (graph.arena.handle_of(source_id), graph.arena.handle_of(target_id)) else {
            return false;
        };
        graph
            .arena
            .get_mut(source)
            .map(|n| n.set_connection_weight(target, weight))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Input / output subsets
    // ------------------------------------------------------------------

    /// Mark a neuron as input, creating it if absent. Idempotent.
    pub fn add_input_neuron(&self, id: &str, kind: NeuronType) -> NeuronHandle {
        let mut graph = self.graph.lock();
        let handle = Self::create_locked(&mut graph, &self.settings, id, kind);
        if !graph.inputs.contains(&handle) {
            graph.inputs.push(handle);
        }
        handle
    }

    /// Mark a neuron as output, creating it if absent. Idempotent.
    ///
    /// Input membership is left alone, so a neuron may sit in both lists.
    pub fn add_output_neuron(&self, id: &str, kind: NeuronType) -> NeuronHandle {
        let mut graph = self.graph.lock();
        let handle = Self::create_locked(&mut graph, &self.settings, id, kind);
        if !graph.outputs.contains(&handle) {
            graph.outputs.push(handle);
        }
        handle
    }

    pub fn input_neurons(&self) -> Vec<NeuronHandle> {
        self.graph.lock().inputs.clone()
    }

    pub fn output_neurons(&self) -> Vec<NeuronHandle> {
        self.graph.lock().outputs.clone()
    }

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Deliver `signal` to one neuron and propagate; `None` if it is gone
    pub fn receive_signal(&self, handle: NeuronHandle, signal: Signal) -> Option<CascadeReport> {
        let mut graph = self.graph.lock();
        if !graph.arena.contains(handle) {
            return None;
        }
        Some(Cascade::new(&mut graph.arena, self.settings.cascade).deliver(handle, signal))
    }

    /// Deliver to `target`, or to every input neuron when no target is
    /// given. `None` when nothing was delivered.
    pub fn inject(&self, signal: Signal, target: Option<&str>) -> Option<CascadeReport> {
        let mut graph = self.graph.lock();
        let targets = match target {
            Some(id) => vec![graph.arena.handle_of(id)?],
            None => graph.inputs.clone(),
        };
        if targets.is_empty() {
            return None;
        }

        let mut report = CascadeReport::default();
        for handle in targets {
            let mut copy = signal.clone();
            if let Some(neuron) = graph.arena.get(handle) {
                copy.set_target_id(neuron.id());
            }
            report.absorb(Cascade::new(&mut graph.arena, self.settings.cascade).deliver(handle, copy));
        }
        Some(report)
    }

    pub fn inject_signal(&self, signal: Signal, target: Option<&str>) -> bool {
        self.inject(signal, target).is_some()
    }

    /// Integrate whatever one neuron has buffered
    pub fn process_neuron(&self, id: &str) -> Option<CascadeReport> {
        let mut graph = self.graph.lock();
        let handle = graph.arena.handle_of(id)?;
        Some(Cascade::new(&mut graph.arena, self.settings.cascade).process(handle))
    }

    /// Fire a neuron regardless of its potential; its state is left unchanged
    pub fn fire_neuron(&self, id: &str) -> Option<CascadeReport> {
        let mut graph = self.graph.lock();
        let handle = graph.arena.handle_of(id)?;
        Some(Cascade::new(&mut graph.arena, self.settings.cascade).fire(handle))
    }

    // ------------------------------------------------------------------
    // Passes
    // ------------------------------------------------------------------

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Run one processing pass over every neuron, then the observers
    pub fn process_signals(&self) -> PassOutcome {
        if self.processing.swap(true, Ordering::AcqRel) {
            warn!(
                target: "ozone_neural::network",
                "[NETWORK] Pass on '{}' already running, nested pass dropped",
                self.id
            );
            return PassOutcome::Skipped;
        }
        let _guard = PassGuard(&self.processing);

        let report = self.run_pass();
        debug!(
            target: "ozone_neural::network",
            "[NETWORK] Pass on '{}': {} deliveries, {} fires",
            self.id,
            report.deliveries,
            report.fire_count()
        );
        self.notify_observers();
        PassOutcome::Completed(report)
    }

    fn run_pass(&self) -> CascadeReport {
        let mut graph = self.graph.lock();
        let Graph { arena, inputs, outputs } = &mut *graph;

        let middle: Vec<NeuronHandle> = arena
            .handles()
            .into_iter()
            .filter(|h| !inputs.contains(h) && !outputs.contains(h))
            .collect();
        let order: Vec<NeuronHandle> = inputs
            .iter()
            .chain(middle.iter())
            .chain(outputs.iter())
            .copied()
            .collect();

        let mut report = CascadeReport::default();
        for handle in order {
            report.absorb(Cascade::new(arena, self.settings.cascade).process(handle));
        }
        report
    }

    fn notify_observers(&self) {
        let mut observers = std::mem::take(&mut *self.observers.lock());
        for observer in observers.iter_mut() {
            observer(self);
        }
        let mut slot = self.observers.lock();
        observers.append(&mut slot);
        *slot = observers;
    }

    /// Register an observer for completed passes
    pub fn on_process<F>(&self, observer: F)
    where
        F: FnMut(&Network) + Send + 'static,
    {
        self.observers.lock().push(Box::new(observer));
    }

    /// Put every neuron back into RESTING
    pub fn reset(&self) {
        let mut graph = self.graph.lock();
        for handle in graph.arena.handles() {
            if let Some(neuron) = graph.arena.get_mut(handle) {
                neuron.set_state(NeuronState::Resting);
            }
        }
    }

    /// Fully reset one neuron: potential, both buffers and state
    pub fn reset_neuron(&self, id: &str) -> bool {
        self.with_neuron_mut(id, Neuron::reset).is_some()
    }

    pub fn set_neuron_state(&self, id: &str, state: NeuronState) -> bool {
        self.with_neuron_mut(id, |n| n.set_state(state)).is_some()
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    pub fn neuron_count(&self) -> usize {
        self.graph.lock().arena.len()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.lock().arena.connection_count()
    }

    pub fn counters(&self) -> ArenaCounters {
        self.graph.lock().arena.counters
    }

    pub(crate) fn with_graph<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        f(&self.graph.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn reflex() -> Network {
        let network = Network::new("reflex");
        network.add_input_neuron("a", NeuronType::Processing);
        network.create_neuron("b", NeuronType::Processing);
        network.connect_neurons("a", "b", 0.9);
        network
    }

    #[test]
    fn test_create_neuron_is_idempotent() {
        let network = Network::new("n");
        let first = network.create_neuron("x", NeuronType::Sensory);
        let second = network.create_neuron("x", NeuronType::Memory);
        assert_eq!(first, second);
        assert_eq!(network.neuron_count(), 1);
        assert_eq!(network.neuron_state(first), Some(NeuronState::Resting));
        assert_eq!(network.with_neuron("x", Neuron::kind), Some(NeuronType::Sensory));
    }

    #[test]
    fn test_add_neuron_rejects_duplicates() {
        let network = Network::new("n");
        assert!(network.add_neuron(Neuron::new("x", NeuronType::Output)));
        assert!(!network.add_neuron(Neuron::new("x", NeuronType::Output)));
    }

    #[test]
    fn test_connect_by_id() {
        let network = reflex();
        assert!(network.connect_neurons("a", "b", 0.4));
        assert_eq!(network.connection_count(), 1);
        assert_eq!(network.connection_weight("a", "b"), 0.4);
        assert!(!network.connect_neurons("a", "missing", 0.4));
        assert!(!network.connect_neurons("a", "a", 0.4));
        assert!(network.set_connection_weight("a", "b", 0.6));
        assert!(!network.set_connection_weight("b", "a", 0.6));
        assert!(network.disconnect_neurons("a", "b"));
        assert!(!network.disconnect_neurons("a", "b"));
        assert_eq!(network.connection_weight("a", "b"), 0.0);
    }

    #[test]
    fn test_neuron_in_both_lists_is_visited_twice() {
        let network = Network::new("n");
        let relay = network.add_input_neuron("relay", NeuronType::Processing);
        network.add_output_neuron("relay", NeuronType::Processing);
        assert_eq!(network.input_neurons(), vec![relay]);
        assert_eq!(network.output_neurons(), vec![relay]);

        network.set_neuron_state("relay", NeuronState::Inhibited);
        network.inject(Signal::stimulus(0.9), Some("relay"));
        network.set_neuron_state("relay", NeuronState::Resting);

        // the second visit finds an empty buffer
        let outcome = network.process_signals();
        assert_eq!(outcome.report().unwrap().fires_of(relay), 1);
    }

    #[test]
    fn test_connect_with_default_weight() {
        let network = reflex();
        network.create_neuron("c", NeuronType::Processing);
        assert!(network.connect_neurons_default("b", "c"));
        assert_eq!(network.connection_weight("b", "c"), 1.0);
        assert!(!network.connect_neurons_default("b", "missing"));

        let settings = NetworkSettings {
            default_weight: 0.25,
            ..NetworkSettings::default()
        };
        let tuned = Network::with_settings("tuned", settings);
        tuned.create_neuron("x", NeuronType::Processing);
        tuned.create_neuron("y", NeuronType::Processing);
        assert!(tuned.connect_neurons_default("x", "y"));
        assert_eq!(tuned.connection_weight("x", "y"), 0.25);
    }

    #[test]
    fn test_input_output_registration_is_idempotent() {
        let network = Network::new("n");
        let a = network.add_input_neuron("a", NeuronType::Sensory);
        assert_eq!(network.add_input_neuron("a", NeuronType::Sensory), a);
        network.add_output_neuron("z", NeuronType::Output);
        assert_eq!(network.input_neurons(), vec![a]);
        assert_eq!(network.output_neurons().len(), 1);
        assert_eq!(network.neuron_count(), 2);
    }

    #[test]
    fn test_inject_to_inputs_and_named_target() {
        let network = reflex();
        let report = network.inject(Signal::stimulus(0.9), None).unwrap();
        assert_eq!(report.fire_count(), 2);

        assert!(network.inject_signal(Signal::stimulus(0.1), Some("b")));
        assert!(!network.inject_signal(Signal::stimulus(0.1), Some("nope")));

        let empty = Network::new("empty");
        empty.create_neuron("x", NeuronType::Processing);
        assert!(!empty.inject_signal(Signal::stimulus(0.9), None));
    }

    #[test]
    fn test_pass_processes_buffered_inhibited_neuron_after_release() {
        let network = reflex();
        let a = network.get_neuron("a").unwrap();
        network.set_neuron_state("a", NeuronState::Inhibited);
        let report = network.receive_signal(a, Signal::stimulus(0.9)).unwrap();
        assert_eq!(report.fire_count(), 0);
        assert_eq!(network.with_neuron("a", |n| n.pending_signals().len()), Some(1));

        network.reset();
        let outcome = network.process_signals();
        assert_eq!(outcome.report().map(CascadeReport::fire_count), Some(2));
    }

    #[test]
    fn test_reset_only_restores_state() {
        let network = reflex();
        network.inject_signal(Signal::stimulus(0.2), Some("a"));
        network.set_neuron_state("a", NeuronState::Active);
        network.reset();
        let a = network.get_neuron("a").unwrap();
        assert_eq!(network.neuron_state(a), Some(NeuronState::Resting));
        assert!((network.neuron_potential(a).unwrap() - 0.2).abs() < 1e-6);

        assert!(network.reset_neuron("a"));
        assert_eq!(network.neuron_potential(a), Some(0.0));
        assert!(!network.reset_neuron("missing"));
    }

    #[test]
    fn test_nested_pass_is_dropped() {
        let network = Arc::new(reflex());
        let nested = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&nested);
        network.on_process(move |net| {
            assert!(net.is_processing());
            seen.lock().push(net.process_signals().is_skipped());
        });

        assert!(!network.process_signals().is_skipped());
        assert!(!network.is_processing());
        assert!(!network.process_signals().is_skipped());
        assert_eq!(*nested.lock(), vec![true, true]);
    }

    #[test]
    fn test_observers_run_in_order_and_may_register_more() {
        let network = Arc::new(Network::new("n"));
        let calls = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&calls);
        network.on_process(move |net| {
            first.fetch_add(1, Ordering::SeqCst);
            if first.load(Ordering::SeqCst) == 1 {
                let late = Arc::clone(&first);
                net.on_process(move |_| {
                    late.fetch_add(10, Ordering::SeqCst);
                });
            }
        });

        network.process_signals();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        network.process_signals();
        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_remove_neuron_clears_membership() {
        let network = reflex();
        network.add_output_neuron("b", NeuronType::Processing);
        assert!(network.remove_neuron("a"));
        assert!(!network.remove_neuron("a"));
        assert!(network.input_neurons().is_empty());
        assert_eq!(network.connection_count(), 0);
        assert!(network.remove_neuron("b"));
        assert!(network.output_neurons().is_empty());
        assert_eq!(network.counters().live_neurons, 0);
    }

    #[test]
    fn test_queries_by_type_and_tag() {
        let network = Network::new("n");
        let s = network.create_neuron("s", NeuronType::Sensory);
        network.create_neuron("m", NeuronType::Memory);
        network.with_neuron_mut("m", |n| n.add_tag("recall"));
        assert_eq!(network.neurons_by_type(NeuronType::Sensory), vec![s]);
        assert_eq!(network.neurons_by_tag("recall").len(), 1);
        assert_eq!(network.neurons_by_tag("memory").len(), 1);
        assert!(network.any_neuron(|n| n.has_tag("sensory")));
        assert_eq!(network.get_all_neurons().len(), 2);
    }
}
