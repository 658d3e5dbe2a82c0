// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the in-memory register file.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use sab4z_abi::Width;

#[test]
fn starts_zeroed() {
    let regs = MemoryRegisters::new(8);
    assert_eq!(regs.len(), 8);
    assert!(!regs.is_empty());
    assert_eq!(regs.bytes(), vec![0; 8]);
    assert_eq!(regs.read32(0), 0);
    assert_eq!(regs.read32(4), 0);
}

#[test]
fn widths_share_native_layout() {
    let regs = MemoryRegisters::new(8);
    regs.write32(4, 0x1234_5678);

    let bytes = 0x1234_5678u32.to_ne_bytes();
    assert_eq!(regs.read8(4), bytes[0]);
    assert_eq!(regs.read8(7), bytes[3]);
    assert_eq!(
        regs.read16(4),
        u16::from_ne_bytes([bytes[0], bytes[1]])
    );
    assert_eq!(regs.get32(4), 0x1234_5678);
}

#[test]
fn narrow_store_touches_only_its_bytes() {
    let regs = MemoryRegisters::new(8);
    regs.set32(0, 0xFFFF_FFFF);
    regs.write8(1, 0);
    let mut expected = 0xFFFF_FFFFu32.to_ne_bytes();
    expected[1] = 0;
    assert_eq!(regs.get32(0), u32::from_ne_bytes(expected));
}

#[test]
fn clones_share_storage() {
    let regs = MemoryRegisters::new(8);
    let other = regs.clone();
    other.write32(0, 7);
    assert_eq!(regs.read32(0), 7);
}

#[test]
fn out_of_range_is_inert() {
    let regs = MemoryRegisters::new(4);
    regs.write32(4, 0xDEAD_BEEF);
    assert_eq!(regs.read32(4), 0);
    assert_eq!(regs.read32(usize::MAX), 0);
    assert_eq!(regs.bytes(), vec![0; 4]);
}

#[test]
fn untraced_records_nothing() {
    let regs = MemoryRegisters::new(8);
    regs.write_barrier();
    regs.write32(0, 1);
    assert!(regs.trace().is_empty());
}

#[test]
fn traced_records_in_order() {
    let regs = MemoryRegisters::traced(8);
    regs.set32(0, 1);
    regs.write_barrier();
    regs.write16(4, 0xBEEF);
    regs.read_barrier();
    let _ = regs.read32(0);

    assert_eq!(
        regs.trace(),
        vec![
            Access::WriteBarrier,
            Access::Store {
                offset: 4,
                width: Width::Bits16,
                value: 0xBEEF,
            },
            Access::ReadBarrier,
            Access::Load {
                offset: 0,
                width: Width::Bits32,
                value: 1,
            },
        ]
    );

    regs.clear_trace();
    assert!(regs.trace().is_empty());
}

#[test]
fn debug_output_shows_shared_storage() {
    let regs = MemoryRegisters::new(4);
    regs.set32(0, 0x0101_0101);
    let text = format!("{regs:?}");
    assert!(text.starts_with("MemoryRegisters"), "{text}");
    assert!(text.contains("bytes: [1, 1, 1, 1]"), "{text}");

    // Results carrying a mapping can be unwrapped in tests
    let result: Result<(), MemoryRegisters> = Err(regs);
    assert!(result.unwrap_err().trace().is_empty());
}
