// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the typed access dispatcher.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::binding::PlatformBinding;
use crate::platform::{Access, MemoryRegisters, MockPlatform};
use crate::types::Paddr;
use crate::window;

fn window(regs: &MemoryRegisters) -> RegisterWindow<MemoryRegisters> {
    let mut platform = MockPlatform::new(regs.clone());
    let binding = PlatformBinding::new(Paddr::new(0x43C0_0000), 8);
    let claim = window::acquire(&mut platform, &binding).unwrap();
    let io = window::map(&mut platform, &claim).unwrap();
    RegisterWindow::new(claim, io)
}

#[test]
fn write_then_read_32() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    assert_eq!(
        access(&window, AccessRequest::write(4, Width::Bits32, 0x4242_4242)),
        Ok(0x4242_4242)
    );
    assert_eq!(access(&window, AccessRequest::read(4, Width::Bits32)), Ok(0x4242_4242));

    assert_eq!(
        regs.trace(),
        vec![
            Access::WriteBarrier,
            Access::Store {
                offset: 4,
                width: Width::Bits32,
                value: 0x4242_4242,
            },
            Access::ReadBarrier,
            Access::Load {
                offset: 4,
                width: Width::Bits32,
                value: 0x4242_4242,
            },
        ]
    );
}

#[test]
fn narrow_write_truncates() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    assert_eq!(
        access(&window, AccessRequest::write(0, Width::Bits8, 0x1FF)),
        Ok(0xFF)
    );
    assert_eq!(
        access(&window, AccessRequest::write(2, Width::Bits16, 0xABCD_1234)),
        Ok(0x1234)
    );
    assert_eq!(regs.bytes()[0], 0xFF);
    assert_eq!(
        u16::from_ne_bytes([regs.bytes()[2], regs.bytes()[3]]),
        0x1234
    );
}

#[test]
fn narrow_read_zero_extends() {
    let regs = MemoryRegisters::new(8);
    regs.set32(0, 0xFFFF_FFFF);
    let window = window(&regs);

    assert_eq!(access(&window, AccessRequest::read(0, Width::Bits8)), Ok(0xFF));
    assert_eq!(access(&window, AccessRequest::read(2, Width::Bits16)), Ok(0xFFFF));
    assert_eq!(access(&window, AccessRequest::read(0, Width::Bits32)), Ok(0xFFFF_FFFF));
}

#[test]
fn invalid_offset_touches_nothing() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    for request in [
        AccessRequest::write(8, Width::Bits8, 1),
        AccessRequest::read(6, Width::Bits32),
        AccessRequest::read(1, Width::Bits16),
        AccessRequest::write(u64::MAX, Width::Bits32, 1),
    ] {
        assert_eq!(access(&window, request), Err(Sab4zError::InvalidArgument));
    }
    assert!(regs.trace().is_empty());
}

#[test]
fn raw_width_and_direction_are_validated() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    assert_eq!(access_raw(&window, 0, 12, 0, 0), Err(Sab4zError::InvalidArgument));
    assert_eq!(access_raw(&window, 0, 64, 1, 0), Err(Sab4zError::InvalidArgument));
    assert_eq!(access_raw(&window, 0, 32, 2, 0), Err(Sab4zError::InvalidArgument));
    assert!(regs.trace().is_empty());

    assert_eq!(access_raw(&window, 4, 32, 1, 7), Ok(7));
    assert_eq!(access_raw(&window, 4, 32, 0, 0), Ok(7));
}

#[test]
fn control_call_read_fills_data() {
    let regs = MemoryRegisters::new(8);
    regs.set32(0, 0x0000_0001);
    let window = window(&regs);

    let mut buf = AccessRecord::new(0x0, 0xDEAD).to_bytes();
    control_call(&window, Command::READ32.raw(), UserMutPtr::new(&mut buf)).unwrap();
    assert_eq!(AccessRecord::from_bytes(&buf), Some(AccessRecord::new(0x0, 1)));
}

#[test]
fn control_call_write_leaves_buffer() {
    let regs = MemoryRegisters::new(8);
    let window = window(&regs);

    let record = AccessRecord::new(0x4, 0x1234_5678);
    let mut buf = record.to_bytes();
    control_call(&window, Command::WRITE32.raw(), UserMutPtr::new(&mut buf)).unwrap();
    assert_eq!(buf, record.to_bytes());
    assert_eq!(regs.get32(4), 0x1234_5678);
}

#[test]
fn control_call_every_width() {
    let regs = MemoryRegisters::new(8);
    let window = window(&regs);

    for (write, read, value) in [
        (Command::WRITE8, Command::READ8, 0xA5),
        (Command::WRITE16, Command::READ16, 0xA5A5),
        (Command::WRITE32, Command::READ32, 0xA5A5_A5A5),
    ] {
        let mut buf = AccessRecord::new(0x4, value).to_bytes();
        control_call(&window, write.raw(), UserMutPtr::new(&mut buf)).unwrap();

        let mut buf = AccessRecord::read_at(0x4).to_bytes();
        control_call(&window, read.raw(), UserMutPtr::new(&mut buf)).unwrap();
        assert_eq!(AccessRecord::from_bytes(&buf).unwrap().data, value, "{read:?}");
    }
}

#[test]
fn control_call_unknown_opcode() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    let before = AccessRecord::new(0x4, 1).to_bytes();
    let mut buf = before;
    assert_eq!(
        control_call(&window, 0xDEAD_BEEF, UserMutPtr::new(&mut buf)),
        Err(Sab4zError::InvalidOperation)
    );
    assert_eq!(buf, before);
    assert!(regs.trace().is_empty());
}

#[test]
fn control_call_short_buffer_faults_before_hardware() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    let mut buf = [0u8; AccessRecord::SIZE - 1];
    assert_eq!(
        control_call(&window, Command::READ32.raw(), UserMutPtr::new(&mut buf)),
        Err(Sab4zError::AccessFault)
    );
    assert!(regs.trace().is_empty());
}

#[test]
fn control_call_bad_offset() {
    let regs = MemoryRegisters::traced(8);
    let window = window(&regs);

    let mut buf = AccessRecord::read_at(0x40).to_bytes();
    assert_eq!(
        control_call(&window, Command::READ32.raw(), UserMutPtr::new(&mut buf)),
        Err(Sab4zError::InvalidArgument)
    );
    assert!(regs.trace().is_empty());
}
