// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gates
//!
//! Per-neuron signal transformers. A gate consumes a slice of incoming
//! signals and produces at most one outgoing signal.
//!
//! Six kinds are fixed policies; `Custom` wraps an injected transform. All
//! kinds are dispatched by a single `match` in [`Gate::process`].

use std::fmt;
use std::sync::Arc;

use crate::signal::Signal;
use crate::types::clamp_unit;

/// Injected transform for custom gates
pub type GateTransform = Arc<dyn Fn(&[Signal]) -> Option<Signal> + Send + Sync>;

/// Gate kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    And,
    Or,
    Not,
    Xor,
    Threshold,
    Modulator,
    Custom,
}

impl GateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Not => "NOT",
            GateType::Xor => "XOR",
            GateType::Threshold => "THRESHOLD",
            GateType::Modulator => "MODULATOR",
            GateType::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults applied to newly created gates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSettings {
    pub default_threshold: f32,
    pub adaptation_rate: f32,
    pub adaptation_floor: f32,
    pub adaptation_ceiling: f32,
    pub modulator_factor: f32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            default_threshold: 0.5,
            adaptation_rate: 0.1,
            adaptation_floor: 0.1,
            adaptation_ceiling: 0.9,
            modulator_factor: 1.0,
        }
    }
}

/// Gate policy
#[derive(Clone)]
pub enum GateLogic {
    And,
    Or,
    Not,
    Xor,
    Threshold,
    Modulator { factor: f32 },
    Custom(GateTransform),
}

impl GateLogic {
    pub fn kind(&self) -> GateType {
        match self {
            GateLogic::And => GateType::And,
            GateLogic::Or => GateType::Or,
            GateLogic::Not => GateType::Not,
            GateLogic::Xor => GateType::Xor,
            GateLogic::Threshold => GateType::Threshold,
            GateLogic::Modulator { .. } => GateType::Modulator,
            GateLogic::Custom(_) => GateType::Custom,
        }
    }

    /// Pass-through transform used when a custom gate is created without one
    pub fn derive_first() -> GateTransform {
        Arc::new(|inputs: &[Signal]| inputs.first().map(|s| s.derive(None)))
    }
}

impl fmt::Debug for GateLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateLogic::Modulator { factor } => {
                f.debug_struct("Modulator").field("factor", factor).finish()
            }
            GateLogic::Custom(_) => f.write_str("Custom(<transform>)"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// A signal gate owned by a neuron
#[derive(Debug, Clone)]
pub struct Gate {
    id: String,
    logic: GateLogic,
    threshold: f32,
    active: bool,
    adaptation_rate: f32,
    floor: f32,
    ceiling: f32,
}

impl Gate {
    /// Create a gate of `kind` with default settings
    pub fn new(id: impl Into<String>, kind: GateType) -> Self {
        Self::with_settings(id, kind, &GateSettings::default())
    }

    pub fn with_settings(id: impl Into<String>, kind: GateType, settings: &GateSettings) -> Self {
        let logic = match kind {
            GateType::And => GateLogic::And,
            GateType::Or => GateLogic::Or,
            GateType::Not => GateLogic::Not,
            GateType::Xor => GateLogic::Xor,
            GateType::Threshold => GateLogic::Threshold,
            GateType::Modulator => GateLogic::Modulator {
                factor: settings.modulator_factor,
            },
            GateType::Custom => GateLogic::Custom(GateLogic::derive_first()),
        };
        Self::from_logic(id, logic, settings)
    }

    pub fn from_logic(id: impl Into<String>, logic: GateLogic, settings: &GateSettings) -> Self {
        Self {
            id: id.into(),
            logic,
            threshold: clamp_unit(settings.default_threshold),
            active: true,
            adaptation_rate: settings.adaptation_rate,
            floor: settings.adaptation_floor,
            ceiling: settings.adaptation_ceiling,
        }
    }

    /// Threshold gate with an explicit threshold
    pub fn threshold(id: impl Into<String>, threshold: f32) -> Self {
        let mut gate = Self::new(id, GateType::Threshold);
        gate.set_threshold(threshold);
        gate
    }

    /// Modulator gate with an explicit factor
    pub fn modulator(id: impl Into<String>, factor: f32) -> Self {
        Self::from_logic(id, GateLogic::Modulator { factor }, &GateSettings::default())
    }

    /// Custom gate delegating to `transform`
    pub fn custom<F>(id: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&[Signal]) -> Option<Signal> + Send + Sync + 'static,
    {
        Self::from_logic(id, GateLogic::Custom(Arc::new(transform)), &GateSettings::default())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> GateType {
        self.logic.kind()
    }

    pub fn logic(&self) -> &GateLogic {
        &self.logic
    }

    pub fn threshold_value(&self) -> f32 {
        self.threshold
    }

    /// Set threshold, clamped to `[0, 1]`
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_unit(threshold);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn adaptation_rate(&self) -> f32 {
        self.adaptation_rate
    }

    pub fn set_adaptation_rate(&mut self, rate: f32) {
        self.adaptation_rate = rate;
    }

    /// Modulation factor, `None` for non-modulator gates
    pub fn factor(&self) -> Option<f32> {
        match self.logic {
            GateLogic::Modulator { factor } => Some(factor),
            _ => None,
        }
    }

    /// Returns false if this is not a modulator gate
    pub fn set_factor(&mut self, new_factor: f32) -> bool {
        match &mut self.logic {
            GateLogic::Modulator { factor } => {
                *factor = new_factor;
                true
            }
            _ => false,
        }
    }

    /// Replace the transform of a custom gate. Returns false for fixed kinds.
    pub fn set_transform<F>(&mut self, transform: F) -> bool
    where
        F: Fn(&[Signal]) -> Option<Signal> + Send + Sync + 'static,
    {
        match &mut self.logic {
            GateLogic::Custom(current) => {
                *current = Arc::new(transform);
                true
            }
            _ => false,
        }
    }

    /// Move the threshold after an outcome: success makes the gate more
    /// permissive, failure more restrictive.
    pub fn adapt(&mut self, success: bool) {
        self.threshold = if success {
            (self.threshold - self.adaptation_rate).max(self.floor)
        } else {
            (self.threshold + self.adaptation_rate).min(self.ceiling)
        };
    }

    /// Run the gate policy over `inputs`.
    ///
    /// Returns `None` when the gate does not activate or is inactive.
    pub fn process(&self, inputs: &[Signal]) -> Option<Signal> {
        if !self.active {
            return None;
        }

        let threshold = self.threshold;
        let mut output = match &self.logic {
            GateLogic::And => {
                let first = inputs.first()?;
                if inputs.iter().any(|s| s.strength() < threshold) {
                    return None;
                }
                let mean = inputs.iter().map(Signal::strength).sum::<f32>() / inputs.len() as f32;
                first.derive(Some(mean))
            }
            GateLogic::Or => {
                let mut strongest: Option<&Signal> = None;
                for signal in inputs.iter().filter(|s| s.strength() >= threshold) {
                    match strongest {
                        Some(best) if signal.strength() <= best.strength() => {}
                        _ => strongest = Some(signal),
                    }
                }
                strongest?.derive(None)
            }
            GateLogic::Not => {
                let first = inputs.first()?;
                first.derive(Some(1.0 - first.strength()))
            }
            GateLogic::Xor => {
                let [a, b] = inputs else {
                    return None;
                };
                let a_above = a.strength() >= threshold;
                let b_above = b.strength() >= threshold;
                if a_above == b_above {
                    return None;
                }
                let winner = if a_above { a } else { b };
                winner.derive(Some((a.strength() - b.strength()).abs()))
            }
            GateLogic::Threshold => {
                let first = inputs.first()?;
                if first.strength() < threshold {
                    return None;
                }
                first.derive(None)
            }
            GateLogic::Modulator { factor } => {
                let first = inputs.first()?;
                let mut modulated = first.derive(Some(first.strength() * factor));
                modulated.set_data("modulation_factor", *factor);
                modulated
            }
            GateLogic::Custom(transform) => transform(inputs)?,
        };

        output.set_data("gate_id", self.id.as_str());
        output.set_data("gate_type", self.kind().as_str());
        output.add_tag("gate_processed");
        Some(output)
    }
}
