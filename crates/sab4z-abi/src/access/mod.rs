// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The access record exchanged by every control call.
//!
//! A control call carries a single `{ data, addr }` record. `addr` is the
//! register offset relative to the window base. On writes `data` carries the
//! value to store; on reads the driver overwrites `data` with the loaded value
//! and copies the record back to the caller.
//!
//! # Wire Layout
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..8  | `data` (u64, little-endian) |
//! | 8..16 | `addr` (u64, little-endian) |


/// Request/response payload of a control call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct AccessRecord {
    /// Value to write, or the value read back.
    pub data: u64,
    /// Register offset relative to the window base.
    pub addr: u64,
}

impl AccessRecord {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Create a record for the given register offset and value.
    #[inline]
    #[must_use]
    pub const fn new(addr: u64, data: u64) -> Self {
        Self { data, addr }
    }

    /// Create a record for a read at the given register offset.
    #[inline]
    #[must_use]
    pub const fn read_at(addr: u64) -> Self {
        Self { data: 0, addr }
    }

    /// Encode into the fixed wire layout.
    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..8].copy_from_slice(&self.data.to_le_bytes());
        out[8..].copy_from_slice(&self.addr.to_le_bytes());
        out
    }

    /// Decode from the wire layout.
    ///
    /// Returns `None` if `bytes` is shorter than [`Self::SIZE`]. Trailing
    /// bytes are ignored.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let data = bytes.get(..8)?.try_into().ok()?;
        let addr = bytes.get(8..Self::SIZE)?.try_into().ok()?;
        Some(Self {
            data: u64::from_le_bytes(data),
            addr: u64::from_le_bytes(addr),
        })
    }
}
