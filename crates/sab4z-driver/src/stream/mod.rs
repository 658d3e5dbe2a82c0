// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Fixed-register stream view.
//!
//! A plain `read` returns the status and general-purpose registers as one
//! 64-bit composite; a plain `write` stores 32 bits into the
//! general-purpose register. Offsets supplied by the caller are ignored.
//!
//! # Composite layout
//!
//! | Order | Bits 0..32 | Bits 32..64 | Load order |
//! |-------|------------|-------------|------------|
//! | `StatusLow` (default) | status | general purpose | GP, then status |
//! | `StatusHigh` | general purpose | status | status, then GP |
//!
//! The high half is always loaded first. The composite leaves the driver
//! as eight native-endian bytes.


use core::fmt;
use core::str::FromStr;

use sab4z_abi::{Sab4zError, Width};
use sab4z_abi::registers::{COMPOSITE_LEN, GP_OFFSET, STATUS_OFFSET, STREAM_WRITE_LEN};
use tracing::debug;

use crate::platform::RegisterIo;
use crate::usercopy::{UserMutPtr, UserPtr};
use crate::window::RegisterWindow;

/// Which register lands in the low half of the composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeOrder {
    /// Status in bits 0..32, general purpose in bits 32..64.
    #[default]
    StatusLow,
    /// General purpose in bits 0..32, status in bits 32..64.
    StatusHigh,
}

impl CompositeOrder {
    /// Combine the two register values.
    #[must_use]
    pub fn compose(self, status: u32, gp: u32) -> u64 {
        let (low, high) = match self {
            Self::StatusLow => (status, gp),
            Self::StatusHigh => (gp, status),
        };
        (u64::from(high) << 32) | u64::from(low)
    }

    /// Split a composite back into `(status, gp)`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "halves are extracted by shift and truncation"
    )]
    #[must_use]
    pub const fn split(self, composite: u64) -> (u32, u32) {
        let low = composite as u32;
        let high = (composite >> 32) as u32;
        match self {
            Self::StatusLow => (low, high),
            Self::StatusHigh => (high, low),
        }
    }

    /// Configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusLow => "status-low",
            Self::StatusHigh => "status-high",
        }
    }
}

impl fmt::Display for CompositeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown composite order spelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOrderError;

impl fmt::Display for ParseOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected `status-low` or `status-high`")
    }
}

impl std::error::Error for ParseOrderError {}

impl FromStr for CompositeOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status-low" => Ok(Self::StatusLow),
            "status-high" => Ok(Self::StatusHigh),
            _ => Err(ParseOrderError),
        }
    }
}

/// Load both registers and combine them.
pub fn read_composite<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    order: CompositeOrder,
) -> Result<u64, Sab4zError> {
    let status = window.check(STATUS_OFFSET, Width::Bits32)?;
    let gp = window.check(GP_OFFSET, Width::Bits32)?;
    let io = window.io();

    io.read_barrier();
    let (status, gp) = match order {
        CompositeOrder::StatusLow => {
            let gp = io.read32(gp);
            (io.read32(status), gp)
        }
        CompositeOrder::StatusHigh => {
            let status = io.read32(status);
            (status, io.read32(gp))
        }
    };

    let composite = order.compose(status, gp);
    debug!(
        status = format_args!("{status:#x}"),
        gp = format_args!("{gp:#x}"),
        %order,
        "stream read"
    );
    Ok(composite)
}

/// Service a stream read into `buf`.
///
/// Always produces [`COMPOSITE_LEN`] bytes, whatever the buffer size; a
/// buffer too small to hold them faults before the registers are read.
pub fn stream_read<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    order: CompositeOrder,
    mut buf: UserMutPtr<'_>,
) -> Result<usize, Sab4zError> {
    buf.check_writable(COMPOSITE_LEN)?;
    let composite = read_composite(window, order)?;
    buf.copy_to_user(&composite.to_ne_bytes())?;
    Ok(COMPOSITE_LEN)
}

/// Service a stream write from `buf`.
///
/// Stores the first [`STREAM_WRITE_LEN`] bytes, as a native-endian value,
/// into the general-purpose register.
pub fn stream_write<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    buf: UserPtr<'_>,
) -> Result<usize, Sab4zError> {
    let value = u32::from_ne_bytes(buf.copy_from_user::<STREAM_WRITE_LEN>()?);
    let gp = window.check(GP_OFFSET, Width::Bits32)?;
    let io = window.io();

    io.write_barrier();
    io.write32(gp, value);

    debug!(value = format_args!("{value:#x}"), "stream write");
    Ok(STREAM_WRITE_LEN)
}
