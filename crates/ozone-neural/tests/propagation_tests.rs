// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Listener, gate and counter behaviour observed through `Network`

use std::sync::Arc;

use parking_lot::Mutex;

use ozone_neural::{Gate, GateType, Network, NeuronState, NeuronType, Signal};

#[test]
fn test_fire_walks_refractory_back_to_resting() {
    let network = Network::new("states");
    network.create_neuron("n", NeuronType::Processing);

    let transitions = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&transitions);
    network.with_neuron_mut("n", move |neuron| {
        neuron.on_state_change(move |change| {
            log.lock().push((change.neuron_id.to_string(), change.from, change.to));
        });
    });

    network.inject(Signal::stimulus(0.9), Some("n"));

    assert_eq!(
        *transitions.lock(),
        vec![
            ("n".to_string(), NeuronState::Resting, NeuronState::Refractory),
            ("n".to_string(), NeuronState::Refractory, NeuronState::Resting),
        ]
    );
}

#[test]
fn test_fire_listener_runs_once_per_crossing() {
    let network = Network::new("listeners");
    let n = network.create_neuron("n", NeuronType::Processing);

    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    network.with_neuron_mut("n", move |neuron| {
        neuron.on_fire(move |_| *counter.lock() += 1);
    });

    let first = network.inject(Signal::stimulus(0.2), Some("n")).unwrap();
    assert_eq!(first.fire_count(), 0);
    assert_eq!(*calls.lock(), 0);

    let second = network.inject(Signal::stimulus(0.35), Some("n")).unwrap();
    assert_eq!(second.fires_of(n), 1);
    assert_eq!(*calls.lock(), 1);
    assert_eq!(network.neuron_potential(n), Some(0.0));
}

#[test]
fn test_gated_signal_charges_default_contribution() {
    let network = Network::new("inverted");
    let n = network.create_neuron("n", NeuronType::Processing);
    network.with_neuron_mut("n", |neuron| neuron.add_gate(Gate::new("invert", GateType::Not)));

    let report = network.inject(Signal::stimulus(0.9), Some("n")).unwrap();
    assert_eq!(report.fires_of(n), 1);

    let inverted = network.with_neuron("n", |n| n.output_signals()[1].clone()).unwrap();
    assert!((inverted.strength() - 0.1).abs() < 1e-5);
    assert!(!inverted.has_data("strength"));
}

#[test]
fn test_listener_edges_apply_from_next_fire() {
    let network = Network::new("growth");
    let a = network.create_neuron("a", NeuronType::Processing);
    let c = network.create_neuron("c", NeuronType::Processing);

    network.with_neuron_mut("a", |neuron| {
        neuron.on_fire(|event| {
            if let Some(target) = event.lookup("c") {
                if event.connection_weight(target) == 0.0 {
                    event.connect_to(target, 1.0);
                }
            }
        });
    });

    let first = network.inject(Signal::stimulus(0.9), Some("a")).unwrap();
    assert_eq!(first.fires_of(a), 1);
    assert_eq!(first.deliveries, 1);
    assert_eq!(network.connection_weight("a", "c"), 1.0);

    let second = network.inject(Signal::stimulus(0.9), Some("a")).unwrap();
    assert_eq!(second.fires_of(a), 1);
    // both retained outputs of `a` travel the new edge
    assert_eq!(second.fires_of(c), 2);
    assert!(network.with_neuron("c", |n| n.inputs().contains(&a)).unwrap());
}

#[test]
fn test_custom_gate_transforms_signals() {
    let network = Network::new("custom");
    let n = network.create_neuron("n", NeuronType::Processing);
    network.with_neuron_mut("n", |neuron| {
        neuron.add_gate(Gate::custom("boost", |inputs: &[Signal]| {
            let first = inputs.first()?;
            let mut boosted = first.derive(Some(first.strength() + 0.4));
            boosted.add_tag("boosted");
            Some(boosted)
        }));
    });

    let report = network.inject(Signal::stimulus(0.2), Some("n")).unwrap();
    assert_eq!(report.fires_of(n), 1);

    let kept = network.with_neuron("n", |n| n.output_signals()[1].clone()).unwrap();
    assert!(kept.has_tag("boosted"));
    assert!((kept.strength() - 0.6).abs() < 1e-5);
}

#[test]
fn test_counters_and_snapshots() {
    let network = Network::new("counters");
    network.create_neuron("a", NeuronType::Processing);
    network.create_neuron("b", NeuronType::Memory);
    network.connect_neurons("a", "b", 0.5);

    network.inject(Signal::stimulus(1.0), Some("a"));

    let counters = network.counters();
    assert_eq!(counters.live_neurons, 2);
    assert_eq!(counters.fires, 1);
    assert_eq!(counters.signals_delivered, 2);

    let b = network.snapshot("b").unwrap();
    assert_eq!(b.kind, NeuronType::Memory);
    assert_eq!(b.state, NeuronState::Resting);
    assert!((b.potential - 0.5).abs() < 1e-5);
    assert_eq!(b.output_signals, 1);
    assert_eq!(b.pending_signals, 0);

    let a = network.snapshot("a").unwrap();
    assert_eq!(a.outputs, vec![("b".to_string(), 0.5)]);
    assert_eq!(network.snapshots().len(), 2);
    assert!(network.snapshot("missing").is_none());
}

#[test]
fn test_queries_by_type_and_tag() {
    let network = Network::new("queries");
    let s = network.create_neuron("s", NeuronType::Sensory);
    network.create_neuron("m", NeuronType::Memory);
    network.with_neuron_mut("m", |n| n.add_tag("recall"));

    assert_eq!(network.neurons_by_type(NeuronType::Sensory), vec![s]);
    assert_eq!(network.neurons_by_tag("recall").len(), 1);
    assert_eq!(network.neurons_by_tag("memory").len(), 1);
    assert_eq!(network.find_neurons(|n| n.threshold() > 0.6).len(), 1);
    assert!(network.any_neuron(|n| n.has_tag("sensory")));
}
