// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for engine operations
//!
//! Local graph operations stay total (booleans, `Option`, clamping). These
//! errors exist for callers that want to turn a reported condition, such as
//! an exhausted cascade budget, into a `Result`.

/// Error types for engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NeuralError {
    #[error("Cascade budget exceeded after {deliveries} deliveries (depth {depth}, {dropped} dropped)")]
    CascadeBudgetExceeded {
        deliveries: usize,
        depth: u32,
        dropped: usize,
    },
}

pub type Result<T> = core::result::Result<T, NeuralError>;
pub type Error = NeuralError;
