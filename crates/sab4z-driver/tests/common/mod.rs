// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared fixtures for driver integration tests.

// Not every test file uses every fixture
#![allow(dead_code)]

use sab4z_driver::platform::{MemoryRegisters, MockPlatform};
use sab4z_driver::{DriverConfig, Paddr, PlatformBinding, Sab4z};

/// Physical base of the SAB4Z window on the reference board.
pub const BASE: u64 = 0x43C0_0000;

/// Length of the SAB4Z window.
pub const LEN: u64 = 8;

/// Status value the reference design reports after configuration.
pub const STATUS_READY: u32 = 0x0000_0001;

/// The reference board binding.
pub fn binding() -> PlatformBinding {
    PlatformBinding::new(Paddr::new(BASE), LEN)
}

/// A mock board whose status register reads `STATUS_READY`.
pub fn board() -> MockPlatform {
    let registers = MemoryRegisters::traced(8);
    registers.set32(0, STATUS_READY);
    MockPlatform::new(registers)
}

/// Probe the reference binding on a clone of `platform`.
pub fn probe(platform: &MockPlatform) -> Sab4z<MockPlatform> {
    Sab4z::probe(platform.clone(), &binding(), DriverConfig::default())
        .expect("probe on a healthy mock board")
}
