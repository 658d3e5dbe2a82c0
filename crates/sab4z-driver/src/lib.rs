// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # SAB4Z Driver
//!
//! Register-access driver for the SAB4Z programmable-logic design on Zynq
//! boards. The hardware exposes a small window of 32-bit registers; this
//! crate claims that window, maps it, publishes a device node and services
//! client requests against it.
//!
//! This crate provides:
//! - Register window acquisition and release ([`window`])
//! - Typed 8/16/32-bit access with barriers ([`dispatch`])
//! - Device node publication with strict reverse-order unwind ([`node`])
//! - Fixed-register stream read/write ([`stream`])
//! - The driver context tying it all together ([`driver`])
//! - A framed request server for the node transport ([`server`])
//!
//! Everything that touches the outside world goes through the
//! [`platform::Platform`] trait. The mock backend makes the whole lifecycle
//! testable on the host; the `host` feature adds a Linux backend that maps
//! `/dev/mem` and publishes the node as a Unix socket.
//!
//! # Lifecycle
//!
//! ```text
//! Unregistered --probe--> ClaimedWindow --publish--> NodePublished
//!      ^                                                  |
//!      +------------------------remove--------------------+
//! ```
//!
//! A failed probe unwinds every acquired resource in reverse order and
//! leaves the platform exactly as it found it.

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod node;
pub mod platform;
pub mod server;
pub mod stream;
pub mod types;
pub mod usercopy;
pub mod window;

// Re-export commonly used types at crate root
pub use binding::PlatformBinding;
pub use driver::{DriverConfig, OpenFile, Sab4z};
pub use sab4z_abi::Sab4zError;
pub use stream::CompositeOrder;
pub use types::{ClassId, DevT, Paddr};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
