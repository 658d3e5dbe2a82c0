// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Register access through an attached driver.
//!
//! Covers the reference board session (status reads ready, a value written
//! to the general-purpose register reads back) and the width/offset laws of
//! the dispatcher.

// Test code prioritizes clarity over defensive programming
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

mod common;

use proptest::prelude::*;
use sab4z_abi::registers::{GP_OFFSET, STATUS_OFFSET};
use sab4z_abi::{AccessRecord, Command, Width};
use sab4z_driver::{OpenFile, Sab4zError};
use sab4z_driver::dispatch::{self, AccessRequest};
use sab4z_driver::platform::{Access, MockPlatform, RegisterIo};

// ============================================================================
// Reference session
// ============================================================================

fn ioctl_read32(file: &OpenFile<'_, MockPlatform>, addr: u64) -> u32 {
    let mut arg = AccessRecord::read_at(addr).to_bytes();
    file.ioctl(Command::READ32.raw(), &mut arg).unwrap();
    u32::try_from(AccessRecord::from_bytes(&arg).unwrap().data).unwrap()
}

#[test]
fn reference_board_session() {
    let platform = common::board();
    let driver = common::probe(&platform);
    let file = driver.open();

    assert_eq!(ioctl_read32(&file, STATUS_OFFSET), common::STATUS_READY);

    let mut arg = AccessRecord::new(GP_OFFSET, 0x4242_4242).to_bytes();
    file.ioctl(Command::WRITE32.raw(), &mut arg).unwrap();
    assert_eq!(ioctl_read32(&file, GP_OFFSET), 0x4242_4242);

    // The stream view sees the same registers
    let mut buf = [0u8; 8];
    assert_eq!(file.read(&mut buf), Ok(8));
    assert_eq!(u64::from_ne_bytes(buf), 0x4242_4242_0000_0001);

    drop(file);
    drop(driver.remove());
}

#[test]
fn every_store_is_preceded_by_a_write_barrier() {
    let platform = common::board();
    let driver = common::probe(&platform);
    let file = driver.open();

    for command in [Command::WRITE8, Command::WRITE16, Command::WRITE32] {
        let mut arg = AccessRecord::new(GP_OFFSET, 0xFF).to_bytes();
        file.ioctl(command.raw(), &mut arg).unwrap();
    }
    file.write(&1u32.to_ne_bytes()).unwrap();

    let trace = platform.registers().trace();
    for (i, access) in trace.iter().enumerate() {
        if matches!(access, Access::Store { .. }) {
            assert_eq!(trace[i - 1], Access::WriteBarrier, "store #{i}");
        }
        if matches!(access, Access::Load { .. }) {
            assert!(
                trace[..i].iter().rev().take(2).any(|a| *a == Access::ReadBarrier),
                "load #{i}"
            );
        }
    }

    drop(file);
    drop(driver.remove());
}

#[test]
fn unknown_opcode_changes_nothing() {
    let platform = common::board();
    let driver = common::probe(&platform);
    let before = platform.registers().bytes();
    platform.registers().clear_trace();

    let mut arg = AccessRecord::new(GP_OFFSET, 0xDEAD).to_bytes();
    assert_eq!(
        driver.open().ioctl(0xC008_2A07, &mut arg),
        Err(Sab4zError::InvalidOperation)
    );
    assert_eq!(platform.registers().bytes(), before);
    assert!(platform.registers().trace().is_empty());
    drop(driver.remove());
}

// ============================================================================
// Width / offset laws
// ============================================================================

fn width() -> impl Strategy<Value = Width> {
    prop_oneof![Just(Width::Bits8), Just(Width::Bits16), Just(Width::Bits32)]
}

proptest! {
    #[test]
    fn write_then_read_returns_truncated_value(
        width in width(),
        slot in 0u64..8,
        value in any::<u64>(),
    ) {
        let bytes = u64::try_from(width.bytes()).unwrap();
        let offset = (slot * bytes) % 8;

        let platform = common::board();
        let driver = common::probe(&platform);
        let window = driver.window();

        let stored = dispatch::access(window, AccessRequest::write(offset, width, value)).unwrap();
        let loaded = dispatch::access(window, AccessRequest::read(offset, width)).unwrap();
        prop_assert_eq!(stored, width.truncate(value));
        prop_assert_eq!(loaded, width.truncate(value));

        drop(driver.remove());
    }

    #[test]
    fn invalid_offsets_never_reach_hardware(
        width in width(),
        offset in 0u64..64,
        value in any::<u64>(),
    ) {
        let bytes = u64::try_from(width.bytes()).unwrap();
        prop_assume!(offset + bytes > 8 || !offset.is_multiple_of(bytes));

        let platform = common::board();
        let driver = common::probe(&platform);
        platform.registers().clear_trace();

        let result = dispatch::access(driver.window(), AccessRequest::write(offset, width, value));
        prop_assert_eq!(result, Err(Sab4zError::InvalidArgument));
        prop_assert!(platform.registers().trace().is_empty());
        prop_assert_eq!(driver.window().io().read32(0), common::STATUS_READY);

        drop(driver.remove());
    }

    #[test]
    fn raw_widths_outside_the_set_are_rejected(
        bits in any::<u32>().prop_filter("not a valid width", |b| ![8, 16, 32].contains(b)),
    ) {
        let platform = common::board();
        let driver = common::probe(&platform);
        platform.registers().clear_trace();

        let result = dispatch::access_raw(driver.window(), 0, bits, 0, 0);
        prop_assert_eq!(result, Err(Sab4zError::InvalidArgument));
        prop_assert!(platform.registers().trace().is_empty());

        drop(driver.remove());
    }
}
