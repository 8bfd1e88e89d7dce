// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for neurons and signals

use core::fmt;

use uuid::Uuid;

/// Stable handle to a neuron slot inside a network arena.
///
/// The generation is bumped every time a slot is released, so a handle kept
/// after `remove_neuron` never aliases a neuron created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NeuronHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NeuronHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neuron({}#{})", self.index, self.generation)
    }
}

/// Mint a fresh signal identifier (time-ordered UUID)
pub fn mint_signal_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_ids_are_unique() {
        let a = mint_signal_id();
        let b = mint_signal_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_handle_equality_includes_generation() {
        assert_ne!(NeuronHandle::new(3, 0), NeuronHandle::new(3, 1));
        assert_eq!(NeuronHandle::new(3, 1).to_string(), "Neuron(3#1)");
    }
}
