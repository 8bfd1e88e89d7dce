// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Core Types
//!
//! Handles, identifiers, payload values and errors shared by every engine module.

pub mod error;
pub mod ids;
pub mod payload;

// Re-export commonly used types
pub use error::{Error, NeuralError, Result};
pub use ids::{mint_signal_id, NeuronHandle};
pub use payload::PayloadValue;

/// Clamp a value into the unit interval; NaN collapses to 0
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
