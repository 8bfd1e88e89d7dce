// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ozone-observability
//!
//! Logging setup shared by the Ozone crates and the `ozone` binary.
//!
//! Provides per-crate debug flags (`--debug-ozone-neural`, `OZONE_DEBUG`)
//! and a single `init_logging` entry point for console and file output.
//!
//! ## Features
//! - `file-logging`: timestamped, daily-rotated JSON log files

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Ozone crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "ozone",
    "ozone-neural",
    "ozone-config",
    "ozone-observability",
];
