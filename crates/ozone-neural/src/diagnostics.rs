// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only views of a network for logging and demo output

use std::fmt::Write;

use crate::network::Network;
use crate::neuron::{Neuron, NeuronState, NeuronType};
use crate::types::NeuronHandle;

/// Point-in-time copy of one neuron's observable state
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronSnapshot {
    pub handle: NeuronHandle,
    pub id: String,
    pub kind: NeuronType,
    pub state: NeuronState,
    pub threshold: f32,
    pub potential: f32,
    pub tags: Vec<String>,
    /// `(target id, weight)` per outgoing edge
    pub outputs: Vec<(String, f32)>,
    pub pending_signals: usize,
    pub output_signals: usize,
}

impl NeuronSnapshot {
    fn capture(handle: NeuronHandle, neuron: &Neuron) -> Self {
        Self {
            handle,
            id: neuron.id().to_string(),
            kind: neuron.kind(),
            state: neuron.state(),
            threshold: neuron.threshold(),
            potential: neuron.potential(),
            tags: neuron.tags().to_vec(),
            outputs: neuron
                .connections()
                .iter()
                .map(|c| (c.target_id.clone(), c.weight))
                .collect(),
            pending_signals: neuron.pending_signals().len(),
            output_signals: neuron.output_signals().len(),
        }
    }
}

impl Network {
    pub fn snapshot(&self, id: &str) -> Option<NeuronSnapshot> {
        self.with_graph(|graph| {
            let handle = graph.arena.handle_of(id)?;
            graph
                .arena
                .get(handle)
                .map(|n| NeuronSnapshot::capture(handle, n))
        })
    }

    /// Snapshots of every neuron in slot order
    pub fn snapshots(&self) -> Vec<NeuronSnapshot> {
        self.with_graph(|graph| {
            graph
                .arena
                .iter()
                .map(|(h, n)| NeuronSnapshot::capture(h, n))
                .collect()
        })
    }

    /// Plain-text rendering of the graph: counts, input/output ids and
    /// every neuron's outgoing edges with weights.
    pub fn summary(&self) -> String {
        self.with_graph(|graph| {
            let id_of = |h: &NeuronHandle| graph.arena.get(*h).map(|n| n.id().to_string());
            let inputs: Vec<String> = graph.inputs.iter().filter_map(id_of).collect();
            let outputs: Vec<String> = graph.outputs.iter().filter_map(id_of).collect();

            let mut out = String::new();
            let _ = writeln!(out, "Network: {}", self.id());
            let _ = writeln!(out, "Neurons: {}", graph.arena.len());
            let _ = writeln!(out, "Connections: {}", graph.arena.connection_count());
            let _ = writeln!(out);
            let _ = writeln!(out, "Input Neurons: {}", inputs.join(" "));
            let _ = writeln!(out, "Output Neurons: {}", outputs.join(" "));
            let _ = writeln!(out);
            let _ = writeln!(out, "Connections:");
            for (_, neuron) in graph.arena.iter() {
                if neuron.connections().is_empty() {
                    continue;
                }
                let edges: Vec<String> = neuron
                    .connections()
                    .iter()
                    .map(|c| format!("{}({})", c.target_id, c.weight))
                    .collect();
                let _ = writeln!(out, "{} -> {}", neuron.id(), edges.join(" "));
            }
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    #[test]
    fn test_summary_lists_counts_and_edges() {
        let network = Network::new("reflex");
        network.add_input_neuron("touch", NeuronType::Sensory);
        network.create_neuron("relay", NeuronType::Processing);
        network.add_output_neuron("motor", NeuronType::Output);
        network.connect_neurons("touch", "relay", 0.9);
        network.connect_neurons("relay", "motor", 0.75);

        let text = network.summary();
        assert!(text.starts_with("Network: reflex\nNeurons: 3\nConnections: 2\n"));
        assert!(text.contains("Input Neurons: touch\n"));
        assert!(text.contains("Output Neurons: motor\n"));
        assert!(text.contains("touch -> relay(0.9)\n"));
        assert!(text.contains("relay -> motor(0.75)\n"));
        assert!(!text.contains("motor ->"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let network = Network::new("n");
        network.create_neuron("a", NeuronType::Memory);
        network.create_neuron("b", NeuronType::Output);
        network.connect_neurons("a", "b", 0.3);
        network.inject_signal(Signal::stimulus(0.4), Some("a"));

        let snap = network.snapshot("a").unwrap();
        assert_eq!(snap.kind, NeuronType::Memory);
        assert_eq!(snap.state, NeuronState::Resting);
        assert!((snap.potential - 0.4).abs() < 1e-6);
        assert_eq!(snap.outputs, vec![("b".to_string(), 0.3)]);
        assert_eq!(snap.output_signals, 1);
        assert!(network.snapshot("zzz").is_none());
        assert_eq!(network.snapshots().len(), 2);
    }
}
