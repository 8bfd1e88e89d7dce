// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Signals
//!
//! The unit of transfer between neurons. A signal carries a strength in
//! `[0, 1]`, a type tag, a key/value payload and free-form tags.
//!
//! ```text
//! derive(s)      -> fresh id, same type, strength s (or inherited), tags copied,
//!                   payload["derived_from"] = origin id
//! combine(other) -> fresh id, strength = mean, source(self), target(other),
//!                   tags unioned, payload keys copied as <key>_1 / <key>_2
//! ```

use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};

use crate::types::{clamp_unit, mint_signal_id, PayloadValue};

/// Payload keys that `combine` never copies
const RESERVED_KEYS: [&str; 3] = ["source", "target", "strength"];

/// Fixed seeds so fingerprints are stable for a given build
const FINGERPRINT_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Signal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalType {
    /// Increases activation
    #[default]
    Excitatory,
    /// Decreases activation
    Inhibitory,
    /// Changes behavior
    Modulatory,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Excitatory => "EXCITATORY",
            SignalType::Inhibitory => "INHIBITORY",
            SignalType::Modulatory => "MODULATORY",
        }
    }

    fn ordinal(&self) -> u8 {
        match self {
            SignalType::Excitatory => 0,
            SignalType::Inhibitory => 1,
            SignalType::Modulatory => 2,
        }
    }
}

/// A discrete message exchanged between neurons
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    id: String,
    source_id: String,
    target_id: String,
    signal_type: SignalType,
    strength: f32,
    payload: BTreeMap<String, PayloadValue>,
    tags: Vec<String>,
}

impl Signal {
    /// Create a signal with a freshly minted id
    pub fn new(signal_type: SignalType, strength: f32) -> Self {
        Self::with_id(mint_signal_id(), signal_type, strength)
    }

    /// Create a signal with an explicit id
    pub fn with_id(id: impl Into<String>, signal_type: SignalType, strength: f32) -> Self {
        Self {
            id: id.into(),
            source_id: String::new(),
            target_id: String::new(),
            signal_type,
            strength: clamp_unit(strength),
            payload: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// External stimulus: excitatory signal whose `strength` payload matches
    /// its strength field, so receiving neurons integrate the full value.
    pub fn stimulus(strength: f32) -> Self {
        let mut signal = Self::new(SignalType::Excitatory, strength);
        let strength = signal.strength;
        signal.set_data("strength", strength);
        signal
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn set_source_id(&mut self, source_id: impl Into<String>) {
        self.source_id = source_id.into();
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn set_target_id(&mut self, target_id: impl Into<String>) {
        self.target_id = target_id.into();
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Set strength, clamped to `[0, 1]`
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = clamp_unit(strength);
    }

    // ------------------------------------------------------------------
    // Payload
    // ------------------------------------------------------------------

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.payload.insert(key.into(), value.into());
    }

    pub fn data(&self, key: &str) -> Option<&PayloadValue> {
        self.payload.get(key)
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.payload.contains_key(key)
    }

    pub fn remove_data(&mut self, key: &str) -> Option<PayloadValue> {
        self.payload.remove(key)
    }

    /// Payload keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        self.payload.keys().map(String::as_str).collect()
    }

    /// Text value, empty string when absent
    pub fn data_text(&self, key: &str) -> String {
        self.payload.get(key).map(PayloadValue::as_text).unwrap_or_default()
    }

    /// Integer value, 0 when absent or unconvertible
    pub fn data_int(&self, key: &str) -> i64 {
        self.payload.get(key).and_then(PayloadValue::as_int).unwrap_or_default()
    }

    /// Float value, 0.0 when absent or unconvertible
    pub fn data_float(&self, key: &str) -> f32 {
        self.try_data_float(key).unwrap_or_default()
    }

    /// Bool value, false when absent
    pub fn data_bool(&self, key: &str) -> bool {
        self.payload.get(key).and_then(PayloadValue::as_bool).unwrap_or_default()
    }

    /// Float value if present and convertible
    pub fn try_data_float(&self, key: &str) -> Option<f32> {
        self.payload.get(key).and_then(PayloadValue::as_float)
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Add a tag (no duplicates)
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

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// New signal derived from this one.
    ///
    /// `strength` overrides the inherited strength when given (clamped).
    pub fn derive(&self, strength: Option<f32>) -> Signal {
        let mut derived = Signal::new(self.signal_type, strength.unwrap_or(self.strength));
        derived.source_id = self.source_id.clone();
        derived.target_id = self.target_id.clone();
        derived.tags = self.tags.clone();
        derived.set_data("derived_from", self.id.as_str());
        derived
    }

    /// Merge two signals into a new one
    pub fn combine(&self, other: &Signal) -> Signal {
        let mut combined = Signal::new(self.signal_type, (self.strength + other.strength) / 2.0);
        combined.source_id = self.source_id.clone();
        combined.target_id = other.target_id.clone();

        for tag in self.tags.iter().chain(other.tags.iter()) {
            combined.add_tag(tag.as_str());
        }

        combined.set_data("combined_from_1", self.id.as_str());
        combined.set_data("combined_from_2", other.id.as_str());

        for (suffix, side) in [("_1", self), ("_2", other)] {
            for (key, value) in side.payload.iter() {
                if RESERVED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                combined
                    .payload
                    .insert(format!("{}{}", key, suffix), value.clone());
            }
        }

        combined
    }

    /// Deterministic, non-cryptographic fingerprint of every field.
    ///
    /// Intended for audit/equality comparison only.
    pub fn digital_signature(&self) -> String {
        let state = ahash::RandomState::with_seeds(
            FINGERPRINT_SEEDS[0],
            FINGERPRINT_SEEDS[1],
            FINGERPRINT_SEEDS[2],
            FINGERPRINT_SEEDS[3],
        );
        let mut hasher = state.build_hasher();

        hasher.write(self.id.as_bytes());
        hasher.write_u8(0xff);
        hasher.write(self.source_id.as_bytes());
        hasher.write_u8(0xff);
        hasher.write(self.target_id.as_bytes());
        hasher.write_u8(self.signal_type.ordinal());
        hasher.write_u32(self.strength.to_bits());

        for tag in &self.tags {
            hasher.write(tag.as_bytes());
            hasher.write_u8(0xfe);
        }

        // BTreeMap iterates in key order
        for (key, value) in &self.payload {
            hasher.write(key.as_bytes());
            hasher.write_u8(0xfd);
            hasher.write(value.as_text().as_bytes());
            hasher.write_u8(0xfc);
        }

        format!("{:016x}", hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_always_clamped() {
        for (input, expected) in [(-0.5, 0.0), (0.0, 0.0), (0.42, 0.42), (1.0, 1.0), (3.7, 1.0)] {
            let mut signal = Signal::new(SignalType::Excitatory, 0.5);
            signal.set_strength(input);
            assert_eq!(signal.strength(), expected);
        }
        assert_eq!(Signal::new(SignalType::Inhibitory, 2.0).strength(), 1.0);
        assert_eq!(Signal::new(SignalType::Inhibitory, f32::NAN).strength(), 0.0);
    }

    #[test]
    fn test_typed_payload_defaults() {
        let mut signal = Signal::new(SignalType::Excitatory, 0.5);
        signal.set_data("count", 3);
        signal.set_data("label", "high");
        signal.set_data("ratio", "0.25");

        assert_eq!(signal.data_int("count"), 3);
        assert_eq!(signal.data_float("ratio"), 0.25);
        assert_eq!(signal.data_text("label"), "high");

        // Missing or unparseable keys fall back to the type default
        assert_eq!(signal.data_int("missing"), 0);
        assert_eq!(signal.data_float("label"), 0.0);
        assert_eq!(signal.data_text("missing"), "");
        assert!(!signal.data_bool("missing"));
        assert_eq!(signal.try_data_float("label"), None);
    }

    #[test]
    fn test_payload_keys_unique() {
        let mut signal = Signal::new(SignalType::Excitatory, 0.5);
        signal.set_data("k", 1);
        signal.set_data("k", 2);
        assert_eq!(signal.keys(), vec!["k"]);
        assert_eq!(signal.data_int("k"), 2);
    }

    #[test]
    fn test_tags_deduplicated() {
        let mut signal = Signal::new(SignalType::Excitatory, 0.5);
        signal.add_tag("a");
        signal.add_tag("b");
        signal.add_tag("a");
        assert_eq!(signal.tags(), &["a".to_string(), "b".to_string()]);
        assert!(signal.has_tag("b"));
        assert!(!signal.has_tag("c"));
    }

    #[test]
    fn test_stimulus_carries_strength_payload() {
        let signal = Signal::stimulus(0.9);
        assert_eq!(signal.strength(), 0.9);
        assert_eq!(signal.try_data_float("strength"), Some(0.9));
        assert_eq!(signal.signal_type(), SignalType::Excitatory);
    }

    #[test]
    fn test_derive_inherits_and_records_provenance() {
        let mut origin = Signal::new(SignalType::Modulatory, 0.7);
        origin.set_source_id("a");
        origin.add_tag("sensor");

        let inherited = origin.derive(None);
        assert_ne!(inherited.id(), origin.id());
        assert_eq!(inherited.signal_type(), SignalType::Modulatory);
        assert_eq!(inherited.strength(), 0.7);
        assert_eq!(inherited.source_id(), "a");
        assert!(inherited.has_tag("sensor"));
        assert_eq!(inherited.data_text("derived_from"), origin.id());

        let overridden = origin.derive(Some(1.4));
        assert_eq!(overridden.strength(), 1.0);
    }

    #[test]
    fn test_combine_merges_both_sides() {
        let mut left = Signal::new(SignalType::Excitatory, 0.2);
        left.set_source_id("left-src");
        left.set_target_id("left-dst");
        left.add_tag("x");
        left.set_data("value", "1");
        left.set_data("strength", 0.2);

        let mut right = Signal::new(SignalType::Inhibitory, 0.6);
        right.set_source_id("right-src");
        right.set_target_id("right-dst");
        right.add_tag("x");
        right.add_tag("y");
        right.set_data("value", "2");
        right.set_data("source", "ignored");

        let combined = left.combine(&right);
        assert!((combined.strength() - 0.4).abs() < 1e-6);
        assert_eq!(combined.signal_type(), SignalType::Excitatory);
        assert_eq!(combined.source_id(), "left-src");
        assert_eq!(combined.target_id(), "right-dst");
        assert_eq!(combined.tags(), &["x".to_string(), "y".to_string()]);
        assert_eq!(combined.data_text("value_1"), "1");
        assert_eq!(combined.data_text("value_2"), "2");
        assert_eq!(combined.data_text("combined_from_1"), left.id());
        assert_eq!(combined.data_text("combined_from_2"), right.id());
        assert!(!combined.has_data("strength_1"));
        assert!(!combined.has_data("source_2"));
    }

    #[test]
    fn test_signature_is_deterministic_and_field_sensitive() {
        let mut a = Signal::with_id("sig", SignalType::Excitatory, 0.5);
        a.set_data("k", "v");
        a.add_tag("t");
        let b = a.clone();
        assert_eq!(a.digital_signature(), b.digital_signature());
        assert_eq!(a.digital_signature().len(), 16);

        let mut c = a.clone();
        c.set_strength(0.6);
        assert_ne!(a.digital_signature(), c.digital_signature());

        let mut d = a.clone();
        d.set_data("k", "w");
        assert_ne!(a.digital_signature(), d.digital_signature());
    }
}
