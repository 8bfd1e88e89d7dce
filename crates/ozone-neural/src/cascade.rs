// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cascade Propagation
//!
//! Breadth-first delivery of signals through the arena. Every fire pushes
//! its weighted copies onto one FIFO queue; the queue is drained until the
//! graph quiesces or the budget runs out.
//!
//! ## Ordering per crossing
//! 1. `emit`: weighted copies queued at `depth + 1`
//! 2. fire listeners (once, registration order)
//! 3. `settle`: REFRACTORY, potential 0, RESTING
//! 4. processed signals retained as outputs
//!
//! Cycles in the graph are legal; the budget bounds how far they run.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::arena::NeuronArena;
use crate::neuron::{Integration, Neuron};
use crate::signal::Signal;
use crate::types::{NeuralError, NeuronHandle, Result};

/// Limits for one cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeBudget {
    /// Deliveries processed before the queue is abandoned
    pub max_deliveries: usize,
    /// Deliveries deeper than this are dropped
    pub max_depth: u32,
}

impl Default for CascadeBudget {
    fn default() -> Self {
        Self {
            max_deliveries: 10_000,
            max_depth: 256,
        }
    }
}

/// What happened during one cascade (or several, when absorbed)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Signals handed to a neuron
    pub deliveries: usize,
    /// Neurons that fired, in firing order (repeats allowed)
    pub fired: Vec<NeuronHandle>,
    /// Deepest delivery processed
    pub max_depth: u32,
    /// The budget stopped the cascade before it quiesced
    pub exhausted: bool,
    /// Deliveries discarded because of the budget
    pub dropped: usize,
}

impl CascadeReport {
    pub fn fire_count(&self) -> usize {
        self.fired.len()
    }

    /// How many times `handle` fired
    pub fn fires_of(&self, handle: NeuronHandle) -> usize {
        self.fired.iter().filter(|h| **h == handle).count()
    }

    pub fn absorb(&mut self, other: CascadeReport) {
        self.deliveries += other.deliveries;
        self.fired.extend(other.fired);
        self.max_depth = self.max_depth.max(other.max_depth);
        self.exhausted |= other.exhausted;
        self.dropped += other.dropped;
    }

    /// Turn an exhausted report into an error
    pub fn into_result(self) -> Result<CascadeReport> {
        if self.exhausted {
            return Err(NeuralError::CascadeBudgetExceeded {
                deliveries: self.deliveries,
                depth: self.max_depth,
                dropped: self.dropped,
            });
        }
        Ok(self)
    }
}

/// Mutable view handed to fire listeners.
///
/// Listeners may re-wire or retag the firing neuron and inspect the rest of
/// the graph. Edges added here take effect from the next fire.
pub struct FireEvent<'a> {
    arena: &'a mut NeuronArena,
    handle: NeuronHandle,
    potential: f32,
}

impl<'a> FireEvent<'a> {
    pub fn handle(&self) -> NeuronHandle {
        self.handle
    }

    /// Potential at the moment of firing
    pub fn potential(&self) -> f32 {
        self.potential
    }

    pub fn neuron(&self) -> Option<&Neuron> {
        self.arena.get(self.handle)
    }

    pub fn neuron_mut(&mut self) -> Option<&mut Neuron> {
        self.arena.get_mut(self.handle)
    }

    pub fn neuron_at(&self, handle: NeuronHandle) -> Option<&Neuron> {
        self.arena.get(handle)
    }

    pub fn lookup(&self, id: &str) -> Option<NeuronHandle> {
        self.arena.handle_of(id)
    }

    pub fn connect_to(&mut self, target: NeuronHandle, weight: f32) -> bool {
        self.arena.connect(self.handle, target, weight)
    }

    pub fn disconnect_from(&mut self, target: NeuronHandle) -> bool {
        self.arena.disconnect(self.handle, target)
    }

    pub fn connection_weight(&self, target: NeuronHandle) -> f32 {
        self.neuron().map(|n| n.connection_weight(target)).unwrap_or(0.0)
    }

    pub fn set_connection_weight(&mut self, target: NeuronHandle, weight: f32) -> bool {
        self.neuron_mut()
            .map(|n| n.set_connection_weight(target, weight))
            .unwrap_or(false)
    }
}

#[derive(Debug)]
struct Delivery {
    target: NeuronHandle,
    signal: Signal,
    depth: u32,
}

/// One propagation run over an arena
pub(crate) struct Cascade<'a> {
    arena: &'a mut NeuronArena,
    budget: CascadeBudget,
    queue: VecDeque<Delivery>,
    report: CascadeReport,
}

impl<'a> Cascade<'a> {
    pub(crate) fn new(arena: &'a mut NeuronArena, budget: CascadeBudget) -> Self {
        Self {
            arena,
            budget,
            queue: VecDeque::new(),
            report: CascadeReport::default(),
        }
    }

    /// Deliver `signal` to `target` and propagate
    pub(crate) fn deliver(mut self, target: NeuronHandle, signal: Signal) -> CascadeReport {
        self.queue.push_back(Delivery {
            target,
            signal,
            depth: 0,
        });
        self.run()
    }

    /// Integrate whatever `target` already has buffered and propagate
    pub(crate) fn process(mut self, target: NeuronHandle) -> CascadeReport {
        self.integrate(target, 0);
        self.run()
    }

    /// Fire `target` unconditionally (no state transition) and propagate
    pub(crate) fn fire(mut self, target: NeuronHandle) -> CascadeReport {
        self.fire_at(target, 0);
        self.run()
    }

    fn run(mut self) -> CascadeReport {
        while let Some(delivery) = self.queue.pop_front() {
            if self.report.deliveries >= self.budget.max_deliveries {
                self.report.exhausted = true;
                self.report.dropped += self.queue.len() + 1;
                self.queue.clear();
                break;
            }
            if delivery.depth > self.budget.max_depth {
                self.report.exhausted = true;
                self.report.dropped += 1;
                continue;
            }

            let Some(neuron) = self.arena.get_mut(delivery.target) else {
                continue;
            };
            neuron.buffer(delivery.signal);
            self.report.deliveries += 1;
            self.report.max_depth = self.report.max_depth.max(delivery.depth);
            self.arena.counters.signals_delivered += 1;

            self.integrate(delivery.target, delivery.depth);
        }

        if self.report.exhausted {
            warn!(
                target: "ozone_neural::cascade",
                "[CASCADE] Budget exhausted after {} deliveries (depth {}), {} dropped",
                self.report.deliveries,
                self.report.max_depth,
                self.report.dropped
            );
        }
        self.report
    }

    fn integrate(&mut self, handle: NeuronHandle, depth: u32) {
        let outcome = match self.arena.get_mut(handle) {
            Some(neuron) => neuron.integrate(),
            None => return,
        };

        if let Integration::Crossed { processed } = outcome {
            self.fire_at(handle, depth);
            if let Some(neuron) = self.arena.get_mut(handle) {
                neuron.settle();
                neuron.retain_outputs(processed);
            }
        }
    }

    fn fire_at(&mut self, handle: NeuronHandle, depth: u32) {
        let Some(neuron) = self.arena.get_mut(handle) else {
            return;
        };

        let emissions = neuron.emit();
        let potential = neuron.potential();
        let mut listeners = neuron.take_fire_listeners();

        debug!(
            target: "ozone_neural::cascade",
            "[CASCADE] {} fired at potential {:.3}, {} signal(s) queued at depth {}",
            neuron.id(),
            potential,
            emissions.len(),
            depth + 1
        );

        self.queue.extend(emissions.into_iter().map(|e| Delivery {
            target: e.target,
            signal: e.signal,
            depth: depth + 1,
        }));
        self.report.fired.push(handle);
        self.arena.counters.fires += 1;

        if listeners.is_empty() {
            return;
        }
        let mut event = FireEvent {
            arena: &mut *self.arena,
            handle,
            potential,
        };
        for listener in listeners.iter_mut() {
            listener(&mut event);
        }
        if let Some(neuron) = self.arena.get_mut(handle) {
            neuron.restore_fire_listeners(listeners);
        }
    }
}
