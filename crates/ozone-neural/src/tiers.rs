// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Tiered Networks
//!
//! Processing policies layered around the base pass.
//!
//! | Tier         | Before the base pass                                    |
//! |--------------|---------------------------------------------------------|
//! | Conscious    | attention signal into the focused neuron                |
//! | Subconscious | response signal to every output for each matching rule |
//! | Unconscious  | nothing; filter rules are held but not consulted        |
//!
//! Each tier derefs to its [`Network`], so registry and edge operations are
//! called on the tier directly.

use std::ops::Deref;

use parking_lot::Mutex;
use tracing::debug;

use crate::cascade::CascadeReport;
use crate::network::{Network, NetworkSettings, PassOutcome};
use crate::signal::{Signal, SignalType};

/// Anything that can run a whole-network processing pass
pub trait SignalProcessing {
    fn network(&self) -> &Network;

    fn process_signals(&self) -> PassOutcome;
}

impl SignalProcessing for Network {
    fn network(&self) -> &Network {
        self
    }

    fn process_signals(&self) -> PassOutcome {
        Network::process_signals(self)
    }
}

/// Prefix `before` onto a completed pass report
fn merge(before: CascadeReport, outcome: PassOutcome) -> PassOutcome {
    match outcome {
        PassOutcome::Completed(report) => {
            let mut merged = before;
            merged.absorb(report);
            PassOutcome::Completed(merged)
        }
        PassOutcome::Skipped => PassOutcome::Skipped,
    }
}

// ----------------------------------------------------------------------
// Conscious
// ----------------------------------------------------------------------

/// Network that boosts one focused neuron before every pass
#[derive(Debug)]
pub struct ConsciousNetwork {
    base: Network,
    focus: Mutex<Option<String>>,
}

impl ConsciousNetwork {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_settings(id, NetworkSettings::default())
    }

    pub fn with_settings(id: impl Into<String>, settings: NetworkSettings) -> Self {
        Self {
            base: Network::with_settings(id, settings),
            focus: Mutex::new(None),
        }
    }

    pub fn set_attention_focus(&self, neuron_id: impl Into<String>) {
        *self.focus.lock() = Some(neuron_id.into());
    }

    pub fn clear_attention_focus(&self) {
        *self.focus.lock() = None;
    }

    pub fn attention_focus(&self) -> Option<String> {
        self.focus.lock().clone()
    }

    pub fn attention_strength(&self) -> f32 {
        self.base.settings().attention_strength
    }

    /// Only the strength field is set; without a `strength` payload the
    /// focused neuron integrates the default contribution
    fn attention_signal(&self) -> Signal {
        let mut signal = Signal::with_id("attention_signal", SignalType::Excitatory, self.attention_strength());
        signal.set_data("type", "attention");
        signal.set_data("source", "conscious_control");
        signal.add_tag("attention");
        signal
    }

    pub fn process_signals(&self) -> PassOutcome {
        if self.base.is_processing() {
            return PassOutcome::Skipped;
        }

        let mut before = CascadeReport::default();
        if let Some(focus) = self.attention_focus() {
            if let Some(report) = self.base.inject(self.attention_signal(), Some(&focus)) {
                debug!(target: "ozone_neural::tiers", "[CONSCIOUS] Attention signal sent to {}", focus);
                before = report;
            }
        }

        merge(before, self.base.process_signals())
    }
}

impl Deref for ConsciousNetwork {
    type Target = Network;

    fn deref(&self) -> &Network {
        &self.base
    }
}

impl SignalProcessing for ConsciousNetwork {
    fn network(&self) -> &Network {
        &self.base
    }

    fn process_signals(&self) -> PassOutcome {
        ConsciousNetwork::process_signals(self)
    }
}

// ----------------------------------------------------------------------
// Subconscious
// ----------------------------------------------------------------------

/// A pattern and the response it triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    /// Every item must be a tag or metadata key on at least one neuron
    pub pattern: Vec<String>,
    pub response: Vec<String>,
}

/// Network that answers recognised patterns with response signals
#[derive(Debug)]
pub struct SubconsciousNetwork {
    base: Network,
    rules: Mutex<Vec<PatternRule>>,
}

impl SubconsciousNetwork {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_settings(id, NetworkSettings::default())
    }

    pub fn with_settings(id: impl Into<String>, settings: NetworkSettings) -> Self {
        Self {
            base: Network::with_settings(id, settings),
            rules: Mutex::new(Vec::new()),
        }
    }

    pub fn add_pattern<P, R>(&self, pattern: P, response: R)
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.rules.lock().push(PatternRule {
            pattern: pattern.into_iter().map(Into::into).collect(),
            response: response.into_iter().map(Into::into).collect(),
        });
    }

    pub fn patterns(&self) -> Vec<PatternRule> {
        self.rules.lock().clone()
    }

    /// True when every item is a tag or metadata key somewhere in the graph.
    /// An empty pattern always matches.
    pub fn matches_pattern(&self, pattern: &[String]) -> bool {
        pattern.iter().all(|item| {
            self.base
                .any_neuron(|n| n.has_metadata(item) || n.has_tag(item))
        })
    }

    fn response_signal(&self, response: &[String]) -> Signal {
        let mut signal = Signal::with_id(
            "response_signal",
            SignalType::Excitatory,
            self.base.settings().response_strength,
        );
        for (i, item) in response.iter().enumerate() {
            signal.set_data(format!("response_{}", i), item.as_str());
        }
        signal.add_tag("response");
        signal
    }

    /// Send one response signal to every output neuron
    pub fn generate_response(&self, response: &[String]) -> CascadeReport {
        let mut report = CascadeReport::default();
        for handle in self.base.output_neurons() {
            if let Some(r) = self.base.receive_signal(handle, self.response_signal(response)) {
                report.absorb(r);
            }
        }
        report
    }

    pub fn process_signals(&self) -> PassOutcome {
        if self.base.is_processing() {
            return PassOutcome::Skipped;
        }

        let mut before = CascadeReport::default();
        for rule in self.patterns() {
            if self.matches_pattern(&rule.pattern) {
                debug!(
                    target: "ozone_neural::tiers",
                    "[SUBCONSCIOUS] Pattern {:?} matched, responding with {:?}",
                    rule.pattern,
                    rule.response
                );
                before.absorb(self.generate_response(&rule.response));
            }
        }

        merge(before, self.base.process_signals())
    }
}

impl Deref for SubconsciousNetwork {
    type Target = Network;

    fn deref(&self) -> &Network {
        &self.base
    }
}

impl SignalProcessing for SubconsciousNetwork {
    fn network(&self) -> &Network {
        &self.base
    }

    fn process_signals(&self) -> PassOutcome {
        SubconsciousNetwork::process_signals(self)
    }
}

// ----------------------------------------------------------------------
// Unconscious
// ----------------------------------------------------------------------

/// Network carrying `(key, value)` filter rules.
///
/// The rules are exposed through [`UnconsciousNetwork::passes_filters`] but
/// the processing pass does not apply them.
#[derive(Debug)]
pub struct UnconsciousNetwork {
    base: Network,
    filters: Mutex<Vec<(String, String)>>,
}

impl UnconsciousNetwork {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_settings(id, NetworkSettings::default())
    }

    pub fn with_settings(id: impl Into<String>, settings: NetworkSettings) -> Self {
        Self {
            base: Network::with_settings(id, settings),
            filters: Mutex::new(Vec::new()),
        }
    }

    pub fn add_filter_rule(&self, key: impl Into<String>, value: impl Into<String>) {
        self.filters.lock().push((key.into(), value.into()));
    }

    pub fn filter_rules(&self) -> Vec<(String, String)> {
        self.filters.lock().clone()
    }

    /// No rules: pass. Otherwise pass if any rule key is present with an
    /// equal text value.
    pub fn passes_filters(&self, signal: &Signal) -> bool {
        let filters = self.filters.lock();
        filters.is_empty()
            || filters
                .iter()
                .any(|(key, value)| signal.has_data(key) && signal.data_text(key) == *value)
    }

    pub fn process_signals(&self) -> PassOutcome {
        if self.base.is_processing() {
            return PassOutcome::Skipped;
        }
        self.base.process_signals()
    }
}

impl Deref for UnconsciousNetwork {
    type Target = Network;

    fn deref(&self) -> &Network {
        &self.base
    }
}

impl SignalProcessing for UnconsciousNetwork {
    fn network(&self) -> &Network {
        &self.base
    }

    fn process_signals(&self) -> PassOutcome {
        UnconsciousNetwork::process_signals(self)
    }
}

// ----------------------------------------------------------------------
// Factory
// ----------------------------------------------------------------------

/// Which processing policy a network uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkKind {
    Basic,
    Conscious,
    Subconscious,
    Unconscious,
}

impl NetworkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::Basic => "BASIC",
            NetworkKind::Conscious => "CONSCIOUS",
            NetworkKind::Subconscious => "SUBCONSCIOUS",
            NetworkKind::Unconscious => "UNCONSCIOUS",
        }
    }
}

/// A network of any tier
#[derive(Debug)]
pub enum TieredNetwork {
    Basic(Network),
    Conscious(ConsciousNetwork),
    Subconscious(SubconsciousNetwork),
    Unconscious(UnconsciousNetwork),
}

impl TieredNetwork {
    pub fn kind(&self) -> NetworkKind {
        match self {
            TieredNetwork::Basic(_) => NetworkKind::Basic,
            TieredNetwork::Conscious(_) => NetworkKind::Conscious,
            TieredNetwork::Subconscious(_) => NetworkKind::Subconscious,
            TieredNetwork::Unconscious(_) => NetworkKind::Unconscious,
        }
    }

    pub fn as_conscious(&self) -> Option<&ConsciousNetwork> {
        match self {
            TieredNetwork::Conscious(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_subconscious(&self) -> Option<&SubconsciousNetwork> {
        match self {
            TieredNetwork::Subconscious(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_unconscious(&self) -> Option<&UnconsciousNetwork> {
        match self {
            TieredNetwork::Unconscious(n) => Some(n),
            _ => None,
        }
    }
}

impl SignalProcessing for TieredNetwork {
    fn network(&self) -> &Network {
        match self {
            TieredNetwork::Basic(n) => n,
            TieredNetwork::Conscious(n) => &n.base,
            TieredNetwork::Subconscious(n) => &n.base,
            TieredNetwork::Unconscious(n) => &n.base,
        }
    }

    fn process_signals(&self) -> PassOutcome {
        TieredNetwork::process_signals(self)
    }
}

impl TieredNetwork {
    /// Run the pass of whichever tier this is
    pub fn process_signals(&self) -> PassOutcome {
        match self {
            TieredNetwork::Basic(n) => n.process_signals(),
            TieredNetwork::Conscious(n) => n.process_signals(),
            TieredNetwork::Subconscious(n) => n.process_signals(),
            TieredNetwork::Unconscious(n) => n.process_signals(),
        }
    }
}

impl Deref for TieredNetwork {
    type Target = Network;

    fn deref(&self) -> &Network {
        self.network()
    }
}

/// Builds networks by [`NetworkKind`]
pub struct NetworkFactory;

impl NetworkFactory {
    pub fn create(kind: NetworkKind, id: impl Into<String>) -> TieredNetwork {
        Self::create_with_settings(kind, id, NetworkSettings::default())
    }

    pub fn create_with_settings(kind: NetworkKind, id: impl Into<String>, settings: NetworkSettings) -> TieredNetwork {
        match kind {
            NetworkKind::Basic => TieredNetwork::Basic(Network::with_settings(id, settings)),
            NetworkKind::Conscious => TieredNetwork::Conscious(ConsciousNetwork::with_settings(id, settings)),
            NetworkKind::Subconscious => {
                TieredNetwork::Subconscious(SubconsciousNetwork::with_settings(id, settings))
            }
            NetworkKind::Unconscious => {
                TieredNetwork::Unconscious(UnconsciousNetwork::with_settings(id, settings))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::{NeuronState, NeuronType};
    use std::sync::Arc;

    #[test]
    fn test_factory_selects_tier() {
        for kind in [
            NetworkKind::Basic,
            NetworkKind::Conscious,
            NetworkKind::Subconscious,
            NetworkKind::Unconscious,
        ] {
            let network = NetworkFactory::create(kind, "n");
            assert_eq!(network.kind(), kind);
            assert_eq!(network.id(), "n");
        }
        assert!(NetworkFactory::create(NetworkKind::Basic, "b").as_conscious().is_none());
    }

    #[test]
    fn test_attention_reaches_focused_neuron() {
        let network = ConsciousNetwork::new("c");
        network.create_neuron("focus", NeuronType::Memory);
        network.create_neuron("other", NeuronType::Processing);
        network.set_attention_focus("focus");

        let outcome = network.process_signals();
        assert_eq!(outcome.report().map(|r| r.deliveries), Some(1));
        let received = network
            .with_neuron("focus", |n| n.output_signals()[0].clone())
            .unwrap();
        assert_eq!(received.data_text("type"), "attention");
        assert_eq!(received.data_text("source"), "conscious_control");
        assert!((received.strength() - 0.5).abs() < 1e-6);
        assert_eq!(received.id(), "attention_signal");
        assert!(!received.has_data("strength"));
        assert_eq!(network.with_neuron("other", |n| n.potential()), Some(0.0));
    }

    #[test]
    fn test_attention_ignores_missing_focus() {
        let network = ConsciousNetwork::new("c");
        network.set_attention_focus("ghost");
        let outcome = network.process_signals();
        assert_eq!(outcome.report().map(|r| r.deliveries), Some(0));
        network.clear_attention_focus();
        assert_eq!(network.attention_focus(), None);
    }

    #[test]
    fn test_conscious_pass_skipped_while_processing() {
        let network = Arc::new(ConsciousNetwork::new("c"));
        network.create_neuron("focus", NeuronType::Memory);
        network.set_attention_focus("focus");

        let inner = Arc::clone(&network);
        let skipped = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&skipped);
        network.on_process(move |_| {
            *seen.lock() = Some(inner.process_signals().is_skipped());
        });

        network.process_signals();
        assert_eq!(*skipped.lock(), Some(true));
        // Only the outer pass delivered attention
        assert!((network.with_neuron("focus", |n| n.potential()).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pattern_matching_uses_tags_and_metadata() {
        let network = SubconsciousNetwork::new("s");
        network.create_neuron("eye", NeuronType::Sensory);
        network.with_neuron_mut("eye", |n| n.set_metadata("color", "red"));

        assert!(network.matches_pattern(&["sensory".to_string(), "color".to_string()]));
        assert!(!network.matches_pattern(&["sensory".to_string(), "sound".to_string()]));
        assert!(network.matches_pattern(&[]));
    }

    #[test]
    fn test_matching_pattern_drives_outputs() {
        let network = SubconsciousNetwork::new("s");
        network.create_neuron("eye", NeuronType::Sensory);
        network.add_output_neuron("hand", NeuronType::Output);
        network.add_output_neuron("foot", NeuronType::Output);
        network.add_pattern(["sensory"], ["grab", "hold"]);
        network.add_pattern(["sound"], ["duck"]);

        let outcome = network.process_signals();
        let report = outcome.report().unwrap();
        assert_eq!(report.deliveries, 2);
        assert_eq!(report.fire_count(), 2);

        let hand = network.get_neuron("hand").unwrap();
        assert_eq!(network.neuron_state(hand), Some(NeuronState::Resting));
        let response = network
            .with_neuron("hand", |n| n.output_signals().last().cloned())
            .flatten()
            .unwrap();
        assert_eq!(response.data_text("response_0"), "grab");
        assert_eq!(response.data_text("response_1"), "hold");
        assert!((response.strength() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_response_charges_default_contribution() {
        let network = SubconsciousNetwork::new("s");
        network.create_neuron("eye", NeuronType::Sensory);
        let recall = network.add_output_neuron("recall", NeuronType::Memory);
        network.add_pattern(["sensory"], ["remember"]);

        let outcome = network.process_signals();
        assert_eq!(outcome.report().unwrap().fires_of(recall), 0);
        assert!((network.neuron_potential(recall).unwrap() - 0.5).abs() < 1e-6);

        let response = network
            .with_neuron("recall", |n| n.output_signals()[0].clone())
            .unwrap();
        assert_eq!(response.id(), "response_signal");
        assert!(!response.has_data("strength"));
        assert!((response.strength() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_filter_predicate() {
        let network = UnconsciousNetwork::new("u");
        let mut signal = Signal::stimulus(0.5);
        signal.set_data("channel", "pain");
        assert!(network.passes_filters(&signal));

        network.add_filter_rule("channel", "heat");
        assert!(!network.passes_filters(&signal));
        network.add_filter_rule("channel", "pain");
        assert!(network.passes_filters(&signal));
        assert_eq!(network.filter_rules().len(), 2);
    }

    #[test]
    fn test_unconscious_pass_ignores_filters() {
        let network = UnconsciousNetwork::new("u");
        network.add_input_neuron("in", NeuronType::Processing);
        network.add_filter_rule("channel", "never");

        let handle = network.get_neuron("in").unwrap();
        network.set_neuron_state("in", NeuronState::Inhibited);
        network.receive_signal(handle, Signal::stimulus(0.9));
        network.reset();

        let outcome = network.process_signals();
        assert_eq!(outcome.report().map(|r| r.fire_count()), Some(1));
    }
}
