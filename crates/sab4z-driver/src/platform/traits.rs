// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform traits.

use core::fmt;

use crate::types::{ClassId, DevT, Paddr};

use super::barrier;

/// A mapped register window.
///
/// Offsets are relative to the start of the mapping. Callers validate every
/// offset against the window length and natural alignment before calling a
/// load or store; implementations may treat an out-of-range offset as a bug.
///
/// Loads and stores are volatile: each call is exactly one bus transaction
/// of the stated width.
pub trait RegisterIo: Send + Sync {
    /// Length of the mapping in bytes.
    fn len(&self) -> usize;

    /// Whether the mapping is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 8-bit load.
    fn read8(&self, offset: usize) -> u8;

    /// 16-bit load.
    fn read16(&self, offset: usize) -> u16;

    /// 32-bit load.
    fn read32(&self, offset: usize) -> u32;

    /// 8-bit store.
    fn write8(&self, offset: usize, value: u8);

    /// 16-bit store.
    fn write16(&self, offset: usize, value: u16);

    /// 32-bit store.
    fn write32(&self, offset: usize, value: u32);

    /// Barrier issued before a load.
    fn read_barrier(&self) {
        barrier::read_barrier();
    }

    /// Barrier issued before a store.
    fn write_barrier(&self) {
        barrier::write_barrier();
    }
}

/// Resource provider for the driver lifecycle.
///
/// Acquisition methods come in pairs with their release counterpart. The
/// driver guarantees that every successful acquisition is released exactly
/// once, in reverse order, whether the probe fails half-way or the device
/// is removed normally.
///
/// Failures are reported with the backend's own error type; the driver maps
/// them onto its error taxonomy per lifecycle step.
pub trait Platform {
    /// Mapped register window.
    type Io: RegisterIo;

    /// Published device node.
    type Node: Send + Sync;

    /// Backend failure detail.
    type Error: fmt::Display;

    /// Claim exclusive ownership of a physical address range.
    fn request_mem_region(&mut self, base: Paddr, len: u64, owner: &str)
    -> Result<(), Self::Error>;

    /// Give up a claim made by `request_mem_region`.
    fn release_mem_region(&mut self, base: Paddr, len: u64);

    /// Map a claimed range for register access.
    fn ioremap(&mut self, base: Paddr, len: u64) -> Result<Self::Io, Self::Error>;

    /// Tear down a mapping.
    fn iounmap(&mut self, io: Self::Io);

    /// Allocate a device number with a dynamic major.
    fn alloc_chrdev_region(&mut self, name: &str) -> Result<DevT, Self::Error>;

    /// Return a device number.
    fn unregister_chrdev_region(&mut self, devt: DevT);

    /// Register the character device under a device number.
    fn cdev_add(&mut self, devt: DevT) -> Result<(), Self::Error>;

    /// Unregister the character device.
    fn cdev_del(&mut self, devt: DevT);

    /// Create a device class.
    fn class_create(&mut self, name: &str) -> Result<ClassId, Self::Error>;

    /// Destroy a device class.
    fn class_destroy(&mut self, class: ClassId);

    /// Publish the device node.
    fn device_create(
        &mut self,
        class: ClassId,
        devt: DevT,
        name: &str,
    ) -> Result<Self::Node, Self::Error>;

    /// Withdraw the device node.
    fn device_destroy(&mut self, class: ClassId, node: Self::Node);
}
