// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted demo networks

use ozone::demos::{run_pathway, run_reflex, ReflexDemo};
use ozone::neural::NetworkSettings;

fn weight_of(learned: &[(String, String, f32)], source: &str, target: &str) -> Option<f32> {
    learned
        .iter()
        .find(|(s, t, _)| s == source && t == target)
        .map(|(_, _, w)| *w)
}

#[test]
fn test_reflex_needs_strong_touch() {
    let (demo, scenarios) = run_reflex(NetworkSettings::default());
    assert_eq!(scenarios.len(), 2);

    let low = &scenarios[0];
    assert_eq!(low.arm_activation, 0.0);
    assert_eq!(low.leg_activation, 0.0);

    let high = &scenarios[1];
    assert!(high.arm_activation > 0.8, "arm: {}", high.arm_activation);
    assert_eq!(high.leg_activation, 0.0);

    let arm = demo.network().get_neuron("arm_motor").unwrap();
    assert_eq!(high.report.fires_of(arm), 1);
    assert_eq!(demo.network().neuron_count(), 9);
    assert_eq!(demo.network().connection_count(), 9);
}

#[test]
fn test_reflex_scenarios_start_fresh() {
    let demo = ReflexDemo::new(NetworkSettings::default());
    let first = demo.run_scenario("strong", 0.0, 0.0, 0.9);
    let second = demo.run_scenario("strong again", 0.0, 0.0, 0.9);
    assert!((first.arm_activation - second.arm_activation).abs() < 1e-6);
    assert_eq!(first.report.fire_count(), second.report.fire_count());
}

#[test]
fn test_pathway_learns_associations() {
    let (demo, probes) = run_pathway(NetworkSettings::default());
    let learned = demo.learned_connections();

    let happy = weight_of(&learned, "visual_processor", "happy_emotion").unwrap();
    assert!((happy - 0.4).abs() < 1e-5, "happy: {}", happy);
    let fear = weight_of(&learned, "tone_association", "fear_emotion").unwrap();
    assert!((fear - 0.4).abs() < 1e-5);
    assert!(weight_of(&learned, "visual_processor", "angry_emotion").is_some());
    assert!(weight_of(&learned, "tone_association", "angry_emotion").is_some());
    assert!(weight_of(&learned, "visual_processor", "sad_emotion").is_none());

    let events = demo.events();
    assert_eq!(events[0], "Formed new connection from visual_processor to happy_emotion");
    assert!(events.iter().any(|e| e.starts_with("Strengthened connection from visual_processor to happy_emotion")));

    assert_eq!(probes.len(), 2);
    assert_eq!(probes[0].emotion, "happy_emotion");
    assert!(probes[0].potential > 0.0);
    assert!(probes[1].potential > 0.0);
}
