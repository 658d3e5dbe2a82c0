// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # libsab4z
//!
//! User-space access to the SAB4Z device node.
//!
//! This crate provides:
//! - [`Device`]: an open node with `ioctl`, `read` and `write`
//! - [`Client`]: one-shot register calls (status read, general-purpose
//!   read and write), each opening and closing the node
//! - [`compat`]: the same calls with the classic sentinel-on-failure
//!   surface
//!
//! The node path defaults to `/run/sab4z/sab4z` and can be overridden
//! with `SAB4Z_NODE`.

use std::path::PathBuf;

use sab4z_abi::registers::DEFAULT_NODE_PATH;

pub mod client;
pub mod compat;
pub mod device;
pub mod error;

// Re-export commonly used types at crate root
pub use client::Client;
pub use device::Device;
pub use error::ClientError;
pub use sab4z_abi::{AccessRecord, Command, Sab4zError};

/// Environment variable overriding the node path.
pub const NODE_ENV: &str = "SAB4Z_NODE";

/// Node path from `SAB4Z_NODE`, or the default location.
#[must_use]
pub fn default_node_path() -> PathBuf {
    std::env::var_os(NODE_ENV).map_or_else(|| PathBuf::from(DEFAULT_NODE_PATH), PathBuf::from)
}
