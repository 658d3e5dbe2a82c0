// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Memory barriers for register access.
//!
//! A write barrier is issued before every register store and a read barrier
//! before every register load, so that accesses issued by one request are
//! never reordered with the memory traffic that prepared them.
//!
//! | Target | `write_barrier` | `read_barrier` |
//! |--------|-----------------|----------------|
//! | aarch64 | `dsb st` | `dsb ld` |
//! | arm (Zynq-7000) | `dsb st` | `dsb sy` |
//! | other | release fence | acquire fence |
//!
//! Device memory is outside the coherence domain the atomic fences talk
//! about, so the ARM targets use data synchronisation barriers.

#[cfg(not(any(target_arch = "aarch64", target_arch = "arm")))]
use core::sync::atomic::{Ordering, fence};

/// Read barrier: earlier memory accesses complete before later loads.
#[cfg(target_arch = "aarch64")]
#[inline]
pub fn read_barrier() {
    // SAFETY: DSB has no operands and no side effects beyond ordering.
    unsafe { core::arch::asm!("dsb ld", options(nostack, preserves_flags)) }
}

/// Write barrier: earlier stores complete before later stores.
#[cfg(target_arch = "aarch64")]
#[inline]
pub fn write_barrier() {
    // SAFETY: DSB has no operands and no side effects beyond ordering.
    unsafe { core::arch::asm!("dsb st", options(nostack, preserves_flags)) }
}

/// Read barrier: earlier memory accesses complete before later loads.
#[cfg(target_arch = "arm")]
#[inline]
pub fn read_barrier() {
    // SAFETY: DSB has no operands and no side effects beyond ordering.
    unsafe { core::arch::asm!("dsb sy", options(nostack, preserves_flags)) }
}

/// Write barrier: earlier stores complete before later stores.
#[cfg(target_arch = "arm")]
#[inline]
pub fn write_barrier() {
    // SAFETY: DSB has no operands and no side effects beyond ordering.
    unsafe { core::arch::asm!("dsb st", options(nostack, preserves_flags)) }
}

/// Read barrier: earlier memory accesses complete before later loads.
#[cfg(not(any(target_arch = "aarch64", target_arch = "arm")))]
#[inline]
pub fn read_barrier() {
    fence(Ordering::Acquire);
}

/// Write barrier: earlier stores complete before later stores.
#[cfg(not(any(target_arch = "aarch64", target_arch = "arm")))]
#[inline]
pub fn write_barrier() {
    fence(Ordering::Release);
}
