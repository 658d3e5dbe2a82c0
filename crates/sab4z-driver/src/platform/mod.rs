// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform abstraction for the SAB4Z driver.
//!
//! Every resource the driver acquires (memory region, mapping, device
//! number, char-dev registration, class, node) and every register access
//! goes through the traits in this module, so the driver logic can be
//! tested on the host.
//!
//! | Backend | Registers | Node | Availability |
//! |---------|-----------|------|--------------|
//! | [`MockPlatform`] | [`MemoryRegisters`] | in-process | always |
//! | `HostPlatform` | `/dev/mem` or memory | Unix socket | `host` feature |

#[cfg(test)]
mod memory_test;


pub mod barrier;
mod memory;
mod mock;
mod traits;

#[cfg(feature = "host")]
pub mod host;

pub use memory::{Access, MemoryRegisters};
pub use mock::{Ledger, LedgerEvent, MockError, MockNode, MockPlatform, Resource};
pub use traits::{Platform, RegisterIo};

#[cfg(feature = "host")]
pub use host::{HostIo, HostNode, HostPlatform};
