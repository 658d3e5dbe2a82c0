// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Typed access dispatcher.
//!
//! Turns `{offset, width, direction, value}` into exactly one register load
//! or store, with the matching barrier in front of it:
//!
//! | Direction | Sequence |
//! |-----------|----------|
//! | Write | `write_barrier`, store of `width` bits |
//! | Read | `read_barrier`, load of `width` bits, zero-extend |
//!
//! Nothing reaches the hardware until the request has been fully
//! validated: width, direction, bounds, alignment and (for control calls)
//! the client buffer. No byte swapping happens here; the value has the
//! layout of the register.

#[cfg(test)]
mod dispatch_test;

use sab4z_abi::{AccessRecord, Command, Direction, Sab4zError, Width};
use tracing::debug;

use crate::platform::RegisterIo;
use crate::usercopy::UserMutPtr;
use crate::window::RegisterWindow;

/// A validated access request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRequest {
    /// Byte offset from the window base.
    pub offset: u64,
    /// Access width.
    pub width: Width,
    /// Load or store.
    pub direction: Direction,
    /// Value to store; ignored for loads. Truncated to `width`.
    pub value: u64,
}

impl AccessRequest {
    /// A load of `width` bits at `offset`.
    #[must_use]
    pub const fn read(offset: u64, width: Width) -> Self {
        Self {
            offset,
            width,
            direction: Direction::Read,
            value: 0,
        }
    }

    /// A store of `value` (truncated to `width`) at `offset`.
    #[must_use]
    pub const fn write(offset: u64, width: Width, value: u64) -> Self {
        Self {
            offset,
            width,
            direction: Direction::Write,
            value,
        }
    }

    /// The request a control call describes.
    #[must_use]
    pub const fn from_command(command: Command, record: &AccessRecord) -> Self {
        Self {
            offset: record.addr,
            width: command.width(),
            direction: command.direction(),
            value: record.data,
        }
    }
}

/// Perform one register access.
///
/// Returns the loaded value (zero-extended) for reads and the stored value
/// (after truncation) for writes.
#[expect(
    clippy::cast_possible_truncation,
    reason = "value is truncated to the access width first"
)]
pub fn access<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    request: AccessRequest,
) -> Result<u32, Sab4zError> {
    let offset = window.check(request.offset, request.width)?;
    let io = window.io();

    let value = match request.direction {
        Direction::Write => {
            let value = request.width.truncate(request.value);
            io.write_barrier();
            match request.width {
                Width::Bits8 => io.write8(offset, value as u8),
                Width::Bits16 => io.write16(offset, value as u16),
                Width::Bits32 => io.write32(offset, value),
            }
            value
        }
        Direction::Read => {
            io.read_barrier();
            match request.width {
                Width::Bits8 => u32::from(io.read8(offset)),
                Width::Bits16 => u32::from(io.read16(offset)),
                Width::Bits32 => io.read32(offset),
            }
        }
    };

    debug!(
        offset = format_args!("{offset:#x}"),
        width = request.width.bits(),
        direction = ?request.direction,
        value = format_args!("{value:#x}"),
        "register access"
    );
    Ok(value)
}

/// [`access`] with width and direction still in their raw encodings.
///
/// A width other than 8, 16 or 32, or an unknown direction, is
/// [`Sab4zError::InvalidArgument`].
pub fn access_raw<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    offset: u64,
    width_bits: u32,
    direction: u32,
    value: u64,
) -> Result<u32, Sab4zError> {
    let width = Width::from_bits(width_bits).ok_or(Sab4zError::InvalidArgument)?;
    let direction = Direction::from_raw(direction).ok_or(Sab4zError::InvalidArgument)?;
    access(
        window,
        AccessRequest {
            offset,
            width,
            direction,
            value,
        },
    )
}

/// Service a control call.
///
/// `arg` holds an [`AccessRecord`]. Reads store the loaded value into its
/// `data` field; writes leave the buffer as it was.
pub fn control_call<Io: RegisterIo>(
    window: &RegisterWindow<Io>,
    cmd: u32,
    mut arg: UserMutPtr<'_>,
) -> Result<(), Sab4zError> {
    let command = Command::from_raw(cmd).ok_or(Sab4zError::InvalidOperation)?;
    let mut record = arg.as_const().read_record()?;

    let value = access(window, AccessRequest::from_command(command, &record))?;

    match command.direction() {
        Direction::Read => {
            record.data = u64::from(value);
            arg.write_record(&record)
        }
        Direction::Write => Ok(()),
    }
}
