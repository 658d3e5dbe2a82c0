// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the driver context.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::platform::{MemoryRegisters, MockPlatform, RegisterIo, Resource};
use crate::types::Paddr;
use sab4z_abi::{AccessRecord, Command};
use std::thread;

const BASE: Paddr = Paddr::new(0x43C0_0000);

fn binding() -> PlatformBinding {
    PlatformBinding::new(BASE, 8)
}

fn probe(platform: &MockPlatform) -> Sab4z<MockPlatform> {
    Sab4z::probe(platform.clone(), &binding(), DriverConfig::default()).unwrap()
}

#[test]
fn probe_publishes_and_remove_releases() {
    let platform = MockPlatform::new(MemoryRegisters::new(8));
    let driver = probe(&platform);

    assert_eq!(driver.state(), LifecycleState::NodePublished);
    assert_eq!(driver.window().physical_base(), BASE);
    assert_eq!(driver.window().len(), 8);
    assert_eq!(driver.identity().node().name(), "sab4z");
    assert_eq!(platform.ledger().outstanding(), Resource::ALL.to_vec());

    let returned = driver.remove();
    assert!(returned.ledger().is_balanced());
    assert!(platform.claims().is_empty());
}

#[test]
fn failed_probe_leaves_nothing() {
    let platform = MockPlatform::new(MemoryRegisters::new(8)).fail_at(Resource::Class);
    let result = Sab4z::probe(platform.clone(), &binding(), DriverConfig::default());
    assert!(matches!(result, Err(Sab4zError::AllocFailed)));
    assert!(platform.ledger().is_balanced());
    assert!(platform.claims().is_empty());
}

#[test]
fn second_probe_on_same_range_conflicts() {
    let platform = MockPlatform::new(MemoryRegisters::new(8));
    let driver = probe(&platform);

    let second = Sab4z::probe(platform.clone(), &binding(), DriverConfig::default());
    assert_eq!(second.err(), Some(Sab4zError::AddressConflict));

    drop(driver.remove());
    assert!(platform.ledger().is_balanced());
}

#[test]
fn open_file_ioctl_read_write() {
    let regs = MemoryRegisters::new(8);
    regs.set32(0, 0x0000_0001);
    let platform = MockPlatform::new(regs.clone());
    let driver = probe(&platform);
    let file = driver.open();

    let mut arg = AccessRecord::new(0x4, 0x4242_4242).to_bytes();
    file.ioctl(Command::WRITE32.raw(), &mut arg).unwrap();

    let mut arg = AccessRecord::read_at(0x4).to_bytes();
    file.ioctl(Command::READ32.raw(), &mut arg).unwrap();
    assert_eq!(AccessRecord::from_bytes(&arg).unwrap().data, 0x4242_4242);

    let mut buf = [0u8; 8];
    assert_eq!(file.read(&mut buf), Ok(8));
    assert_eq!(u64::from_ne_bytes(buf), 0x4242_4242_0000_0001);

    assert_eq!(file.write(&0x1234_5678u32.to_ne_bytes()), Ok(4));
    assert_eq!(regs.get32(4), 0x1234_5678);

    drop(file);
    drop(driver.remove());
}

#[test]
fn open_file_errors() {
    let platform = MockPlatform::new(MemoryRegisters::new(8));
    let driver = probe(&platform);
    let file = driver.open();

    let mut arg = AccessRecord::read_at(0).to_bytes();
    assert_eq!(file.ioctl(0x1234, &mut arg), Err(Sab4zError::InvalidOperation));
    assert_eq!(
        file.ioctl(Command::READ32.raw(), &mut arg[..8]),
        Err(Sab4zError::AccessFault)
    );
    assert_eq!(file.read(&mut [0u8; 4]), Err(Sab4zError::AccessFault));
    assert_eq!(file.write(&[1]), Err(Sab4zError::AccessFault));

    drop(file);
    drop(driver.remove());
}

#[test]
fn composite_order_follows_config() {
    let regs = MemoryRegisters::new(8);
    regs.set32(0, 0x1);
    regs.set32(4, 0x2);
    let platform = MockPlatform::new(regs);
    let config = DriverConfig {
        composite_order: CompositeOrder::StatusHigh,
    };
    let driver = Sab4z::probe(platform, &binding(), config).unwrap();
    assert_eq!(driver.config().composite_order, CompositeOrder::StatusHigh);

    let mut buf = [0u8; 8];
    driver.open().read(&mut buf).unwrap();
    assert_eq!(u64::from_ne_bytes(buf), 0x0000_0001_0000_0002);
    drop(driver.remove());
}

#[test]
fn concurrent_clients_do_not_tear_requests() {
    let regs = MemoryRegisters::new(8);
    let platform = MockPlatform::new(regs.clone());
    let driver = probe(&platform);

    thread::scope(|scope| {
        for client in 0..4u32 {
            let driver = &driver;
            scope.spawn(move || {
                let file = driver.open();
                for i in 0..200u32 {
                    let value = (client << 16) | i;
                    file.write(&value.to_ne_bytes()).unwrap();
                    let mut buf = [0u8; 8];
                    file.read(&mut buf).unwrap();
                }
            });
        }
    });

    // Last value written by some client survives intact
    let last = driver.window().io().read32(4);
    assert!(last >> 16 < 4);
    assert!(last & 0xFFFF < 200);
    drop(driver.remove());
}
