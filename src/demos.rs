// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted networks driven by the `ozone` binary
//!
//! - **Reflex**: sensors feed processors and an integration neuron; a direct
//!   touch-to-arm edge produces a reflex on strong touch.
//! - **Pathway**: fire listeners on two association points connect to (or
//!   strengthen edges towards) whichever emotion neurons fired earlier in the
//!   same scenario.
//!
//! Every scenario starts from fully reset neurons; edges persist.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use ozone_neural::{
    CascadeReport, FireEvent, GateType, Network, NetworkSettings, NeuronType, Signal,
};

/// Reset potential, buffers and state of every neuron, keeping edges
pub fn reset_all(network: &Network) {
    for handle in network.get_all_neurons() {
        if let Some(id) = network.neuron_id(handle) {
            network.reset_neuron(&id);
        }
    }
}

/// Build a stimulus tagged with its origin
pub fn sensor_signal(sensor_type: &str, value: f32) -> Signal {
    let mut signal = Signal::stimulus(value);
    signal.set_data("sensor_type", sensor_type);
    signal.set_data("value", value);
    signal.add_tag("stimulus");
    signal
}

// ----------------------------------------------------------------------
// Reflex
// ----------------------------------------------------------------------

/// Motor activations observed during one reflex scenario
#[derive(Debug, Clone)]
pub struct ReflexScenario {
    pub name: &'static str,
    /// Potential of the arm motor when it last fired, 0 if it did not
    pub arm_activation: f32,
    pub leg_activation: f32,
    pub report: CascadeReport,
}

/// Sensor -> processor -> integration -> motor network with a touch reflex
pub struct ReflexDemo {
    network: Network,
    arm: Arc<Mutex<f32>>,
    leg: Arc<Mutex<f32>>,
}

impl ReflexDemo {
    pub fn new(settings: NetworkSettings) -> Self {
        let network = Network::with_settings("Simple_Reflex_Network", settings);

        for (id, sensor) in [
            ("light_sensor", "light"),
            ("temp_sensor", "temperature"),
            ("touch_sensor", "touch"),
        ] {
            network.add_input_neuron(id, NeuronType::Sensory);
            network.with_neuron_mut(id, |n| {
                n.add_tag("sensor");
                n.add_tag(sensor);
            });
        }

        // integrator, threshold and differentiator processors
        for (id, threshold) in [
            ("visual_processor", 0.3),
            ("thermal_processor", 0.5),
            ("tactile_processor", 0.7),
        ] {
            network.create_neuron(id, NeuronType::Processing);
            network.with_neuron_mut(id, |n| {
                n.set_threshold(threshold);
                n.create_gate(GateType::Threshold);
            });
        }
        network.create_neuron("integration", NeuronType::Integration);

        let arm = Arc::new(Mutex::new(0.0));
        let leg = Arc::new(Mutex::new(0.0));
        for (id, motor, slot) in [("arm_motor", "arm", &arm), ("leg_motor", "leg", &leg)] {
            network.add_output_neuron(id, NeuronType::Output);
            let slot = Arc::clone(slot);
            network.with_neuron_mut(id, move |n| {
                n.add_tag("motor");
                n.add_tag(motor);
                n.on_fire(move |event: &mut FireEvent<'_>| {
                    *slot.lock() = event.potential();
                    debug!(target: "ozone::demos", "[REFLEX] {} motor activated at {:.3}", motor, event.potential());
                });
            });
        }

        for (source, target, weight) in [
            ("light_sensor", "visual_processor", 0.8),
            ("temp_sensor", "thermal_processor", 0.7),
            ("touch_sensor", "tactile_processor", 0.9),
            ("visual_processor", "integration", 0.6),
            ("thermal_processor", "integration", 0.6),
            ("tactile_processor", "integration", 0.8),
            ("integration", "arm_motor", 0.7),
            ("integration", "leg_motor", 0.5),
            // reflex
            ("touch_sensor", "arm_motor", 0.95),
        ] {
            network.connect_neurons(source, target, weight);
        }

        Self { network, arm, leg }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Feed one reading to a sensor neuron
    pub fn sense(&self, sensor_id: &str, sensor_type: &str, value: f32) -> CascadeReport {
        self.network
            .inject(sensor_signal(sensor_type, value), Some(sensor_id))
            .unwrap_or_default()
    }

    /// Reset, feed all three sensors, then run one processing pass
    pub fn run_scenario(&self, name: &'static str, light: f32, temperature: f32, touch: f32) -> ReflexScenario {
        reset_all(&self.network);
        *self.arm.lock() = 0.0;
        *self.leg.lock() = 0.0;

        let mut report = self.sense("light_sensor", "light", light);
        report.absorb(self.sense("temp_sensor", "temperature", temperature));
        report.absorb(self.sense("touch_sensor", "touch", touch));
        if let Some(pass) = self.network.process_signals().report() {
            report.absorb(pass.clone());
        }

        let scenario = ReflexScenario {
            name,
            arm_activation: *self.arm.lock(),
            leg_activation: *self.leg.lock(),
            report,
        };
        info!(
            target: "ozone::demos",
            "[REFLEX] {}: arm {:.3}, leg {:.3}, {} fires",
            name,
            scenario.arm_activation,
            scenario.leg_activation,
            scenario.report.fire_count()
        );
        scenario
    }
}

/// Low-intensity inputs followed by a strong touch
pub fn run_reflex(settings: NetworkSettings) -> (ReflexDemo, Vec<ReflexScenario>) {
    let demo = ReflexDemo::new(settings);
    let scenarios = vec![
        demo.run_scenario("Low-intensity inputs", 0.3, 0.2, 0.1),
        demo.run_scenario("High touch input (reflex)", 0.3, 0.2, 0.9),
    ];
    (demo, scenarios)
}

// ----------------------------------------------------------------------
// Pathway learning
// ----------------------------------------------------------------------

pub const EMOTIONS: [&str; 4] = ["happy_emotion", "sad_emotion", "angry_emotion", "fear_emotion"];

/// Listener that links the firing neuron to every recently fired emotion
fn associate(
    initial_weight: f32,
    step: f32,
    recent: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<String>>>,
) -> impl FnMut(&mut FireEvent<'_>) + Send + 'static {
    move |event| {
        let active = recent.lock().clone();
        let source = event.neuron().map(|n| n.id().to_string()).unwrap_or_default();

        for emotion in active {
            let Some(target) = event.lookup(&emotion) else {
                continue;
            };
            let current = event.connection_weight(target);
            let line = if current > 0.0 {
                let weight = (current + step).min(1.0);
                event.set_connection_weight(target, weight);
                format!("Strengthened connection from {} to {} (weight: {:.2})", source, emotion, weight)
            } else {
                event.connect_to(target, initial_weight);
                format!("Formed new connection from {} to {}", source, emotion)
            };
            debug!(target: "ozone::demos", "[PATHWAY] {}", line);
            events.lock().push(line);
        }
    }
}

/// How an emotion responded to a stimulus after training
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationProbe {
    pub stimulus: &'static str,
    pub emotion: &'static str,
    pub fired: bool,
    pub potential: f32,
}

/// Emotional association network whose edges grow from coincident firing
pub struct PathwayDemo {
    network: Network,
    recent: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl PathwayDemo {
    pub fn new(settings: NetworkSettings) -> Self {
        let network = Network::with_settings("Emotional_Learning_Network", settings);

        network.add_input_neuron("visual_sensor", NeuronType::Sensory);
        network.add_input_neuron("auditory_sensor", NeuronType::Sensory);
        network.create_neuron("visual_processor", NeuronType::Processing);
        network.create_neuron("auditory_processor", NeuronType::Processing);
        network.create_neuron("tone_association", NeuronType::Association);
        for emotion in EMOTIONS {
            network.create_neuron(emotion, NeuronType::Memory);
        }
        network.create_neuron("emotion_processor", NeuronType::Integration);
        network.add_output_neuron("emotion_output", NeuronType::Output);
        network.add_output_neuron("behavior_output", NeuronType::Output);
        network.create_neuron("attention_regulator", NeuronType::Regulatory);

        let mut edges = vec![
            ("visual_sensor", "visual_processor", 0.8),
            ("auditory_sensor", "auditory_processor", 0.7),
            ("auditory_processor", "tone_association", 0.9),
            ("emotion_processor", "emotion_output", 0.9),
            ("emotion_processor", "behavior_output", 0.8),
            ("attention_regulator", "visual_processor", 0.5),
            ("attention_regulator", "auditory_processor", 0.5),
            ("attention_regulator", "tone_association", 0.5),
        ];
        edges.extend(EMOTIONS.iter().map(|e| (*e, "emotion_processor", 0.7)));
        for (source, target, weight) in edges {
            network.connect_neurons(source, target, weight);
        }

        let recent = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));

        for emotion in EMOTIONS {
            let recent = Arc::clone(&recent);
            network.with_neuron_mut(emotion, move |n| {
                n.on_fire(move |_event: &mut FireEvent<'_>| recent.lock().push(emotion.to_string()));
            });
        }

        // tones form stronger associations than light
        let visual = associate(0.3, 0.1, Arc::clone(&recent), Arc::clone(&events));
        network.with_neuron_mut("visual_processor", move |n| n.on_fire(visual));
        let tonal = associate(0.4, 0.15, Arc::clone(&recent), Arc::clone(&events));
        network.with_neuron_mut("tone_association", move |n| n.on_fire(tonal));

        Self { network, recent, events }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Learning events recorded so far
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn stimulate(&self, target: &str, value: f32) -> CascadeReport {
        self.network
            .inject(sensor_signal(target, value), Some(target))
            .unwrap_or_default()
    }

    /// Fire the emotions first, then present the stimuli so the listeners
    /// see them as coincident
    pub fn train(&self, name: &str, emotions: &[(&str, f32)], stimuli: &[(&str, f32)]) -> CascadeReport {
        reset_all(&self.network);
        self.recent.lock().clear();
        info!(target: "ozone::demos", "[PATHWAY] Training: {}", name);

        let mut report = CascadeReport::default();
        for (emotion, strength) in emotions {
            report.absorb(self.stimulate(emotion, *strength));
        }
        for (input, strength) in stimuli {
            report.absorb(self.stimulate(input, *strength));
        }
        if let Some(pass) = self.network.process_signals().report() {
            report.absorb(pass.clone());
        }
        report
    }

    /// Present one stimulus with no emotion primed and read back an emotion
    pub fn probe(&self, stimulus: &'static str, value: f32, emotion: &'static str) -> AssociationProbe {
        reset_all(&self.network);
        self.recent.lock().clear();

        let report = self.stimulate(stimulus, value);
        let fired = self
            .network
            .get_neuron(emotion)
            .map(|h| report.fires_of(h) > 0)
            .unwrap_or(false);
        let potential = self
            .network
            .get_neuron(emotion)
            .and_then(|h| self.network.neuron_potential(h))
            .unwrap_or(0.0);

        AssociationProbe {
            stimulus,
            emotion,
            fired,
            potential,
        }
    }

    /// Learned edges from the two association points, as (source, target, weight)
    pub fn learned_connections(&self) -> Vec<(String, String, f32)> {
        let mut learned = Vec::new();
        for source in ["visual_processor", "tone_association"] {
            for emotion in EMOTIONS {
                let weight = self.network.connection_weight(source, emotion);
                if weight > 0.0 {
                    learned.push((source.to_string(), emotion.to_string(), weight));
                }
            }
        }
        learned
    }
}

/// Four training scenarios followed by two probes
pub fn run_pathway(settings: NetworkSettings) -> (PathwayDemo, Vec<AssociationProbe>) {
    let demo = PathwayDemo::new(settings);

    demo.train(
        "Visual input (light) + happiness",
        &[("happy_emotion", 0.8)],
        &[("visual_sensor", 0.9)],
    );
    demo.train(
        "Auditory input (tone) + fear",
        &[("fear_emotion", 0.9)],
        &[("auditory_sensor", 0.85)],
    );
    demo.train(
        "Visual + auditory inputs + anger (multimodal)",
        &[("angry_emotion", 0.75), ("attention_regulator", 0.8)],
        &[("visual_sensor", 0.9), ("auditory_sensor", 0.85)],
    );
    demo.train(
        "Visual input (light) + happiness, repeated",
        &[("happy_emotion", 0.8)],
        &[("visual_sensor", 0.9)],
    );

    let probes = vec![
        demo.probe("visual_sensor", 0.9, "happy_emotion"),
        demo.probe("auditory_sensor", 0.85, "fear_emotion"),
    ];
    (demo, probes)
}
