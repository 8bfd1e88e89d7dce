// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuron Arena
//!
//! Slot storage for neurons addressed by generational [`NeuronHandle`]s.
//! Edges are handle lists on both ends, so the graph holds no reference
//! cycles and removal is a matter of unlinking handles before the slot is
//! released.

use ahash::AHashMap;
use tracing::debug;

use crate::neuron::Neuron;
use crate::types::NeuronHandle;

/// Allocation and traffic counters owned by one arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaCounters {
    pub live_neurons: usize,
    pub total_allocated: u64,
    pub total_released: u64,
    pub signals_delivered: u64,
    pub fires: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    neuron: Option<Neuron>,
}

/// Neuron storage with id lookup
#[derive(Debug, Default)]
pub struct NeuronArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: AHashMap<String, NeuronHandle>,
    pub counters: ArenaCounters,
}

impl NeuronArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Store `neuron`; `None` if its id is already taken
    pub fn insert(&mut self, neuron: Neuron) -> Option<NeuronHandle> {
        if self.index.contains_key(neuron.id()) {
            return None;
        }
        Some(self.store(neuron))
    }

    /// Handle for `id`, building and storing the neuron only when absent
    pub fn get_or_insert_with<F>(&mut self, id: &str, make: F) -> NeuronHandle
    where
        F: FnOnce() -> Neuron,
    {
        match self.handle_of(id) {
            Some(handle) => handle,
            None => self.store(make()),
        }
    }

    fn store(&mut self, neuron: Neuron) -> NeuronHandle {
        let id = neuron.id().to_string();
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.neuron = Some(neuron);
                NeuronHandle::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    neuron: Some(neuron),
                });
                NeuronHandle::new(index, 0)
            }
        };

        self.index.insert(id, handle);
        self.counters.live_neurons += 1;
        self.counters.total_allocated += 1;
        handle
    }

    pub fn handle_of(&self, id: &str) -> Option<NeuronHandle> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, handle: NeuronHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: NeuronHandle) -> Option<&Neuron> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.neuron.as_ref())
    }

    pub fn get_mut(&mut self, handle: NeuronHandle) -> Option<&mut Neuron> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.neuron.as_mut())
    }

    /// Live handles in slot order
    pub fn handles(&self) -> Vec<NeuronHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.neuron.is_some())
            .map(|(index, slot)| NeuronHandle::new(index as u32, slot.generation))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeuronHandle, &Neuron)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.neuron
                .as_ref()
                .map(|n| (NeuronHandle::new(index as u32, slot.generation), n))
        })
    }

    /// Sever every edge touching `handle`, then release its slot
    pub fn remove(&mut self, handle: NeuronHandle) -> Option<Neuron> {
        let (connections, inputs) = self.get_mut(handle)?.clear_edges();

        for connection in &connections {
            if let Some(target) = self.get_mut(connection.target) {
                target.remove_input(handle);
            }
        }
        for source in inputs {
            if let Some(source) = self.get_mut(source) {
                source.remove_connection(handle);
            }
        }

        let slot = &mut self.slots[handle.index as usize];
        let neuron = slot.neuron.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.index.remove(neuron.id());

        self.counters.live_neurons -= 1;
        self.counters.total_released += 1;
        debug!(
            target: "ozone_neural::arena",
            "[ARENA] Released {} ({} edges out, slot {})",
            neuron.id(),
            connections.len(),
            handle.index
        );
        Some(neuron)
    }

    /// Create or re-weight the edge `source -> target`.
    ///
    /// Self-loops and missing endpoints are rejected.
    pub fn connect(&mut self, source: NeuronHandle, target: NeuronHandle, weight: f32) -> bool {
        if source == target || !self.contains(target) {
            return false;
        }
        let target_id = match self.get(target) {
            Some(t) => t.id().to_string(),
            None => return false,
        };
        let is_new = match self.get_mut(source) {
            Some(s) => s.upsert_connection(target, &target_id, weight),
            None => return false,
        };
        if is_new {
            if let Some(t) = self.get_mut(target) {
                t.add_input(source);
            }
        }
        true
    }

    /// Remove the edge `source -> target`; false if it did not exist
    pub fn disconnect(&mut self, source: NeuronHandle, target: NeuronHandle) -> bool {
        let removed = self
            .get_mut(source)
            .map(|s| s.remove_connection(target))
            .unwrap_or(false);
        if removed {
            if let Some(t) = self.get_mut(target) {
                t.remove_input(source);
            }
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.iter().map(|(_, n)| n.connections().len()).sum()
    }
}
