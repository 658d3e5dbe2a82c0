// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Error taxonomy shared by the driver and its clients.
//!
//! Errors fall into two groups:
//! - **Lifecycle** errors are raised while attaching the device. They unwind
//!   every resource acquired so far and abort the attach.
//! - **Request** errors are local to one client request. They never tear
//!   down the register window or the device node.

use core::fmt;


/// Errors raised by the SAB4Z driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sab4zError {
    /// The physical register range is unavailable.
    NoResource,
    /// The physical register range is already claimed.
    AddressConflict,
    /// The physical register range could not be mapped.
    MapFailed,
    /// Char-dev number or class allocation failed.
    AllocFailed,
    /// The char-dev or its node could not be published.
    RegisterFailed,
    /// Unsupported access width, direction or register offset.
    InvalidArgument,
    /// Unrecognized control-call opcode.
    InvalidOperation,
    /// Copying the request in or the result out failed.
    AccessFault,
}

impl Sab4zError {
    /// All error kinds.
    pub const ALL: [Self; 8] = [
        Self::NoResource,
        Self::AddressConflict,
        Self::MapFailed,
        Self::AllocFailed,
        Self::RegisterFailed,
        Self::InvalidArgument,
        Self::InvalidOperation,
        Self::AccessFault,
    ];

    /// Linux errno value for this error (positive).
    #[must_use]
    pub const fn errno(self) -> i32 {
        match self {
            Self::NoResource => 19,                      // ENODEV
            Self::AddressConflict => 6,                  // ENXIO
            Self::MapFailed | Self::AllocFailed => 12,   // ENOMEM
            Self::RegisterFailed => 17,                  // EEXIST
            Self::InvalidArgument | Self::InvalidOperation => 22, // EINVAL
            Self::AccessFault => 13,                     // EACCES
        }
    }

    /// Returns true for errors raised while attaching the device.
    #[must_use]
    pub const fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::NoResource
                | Self::AddressConflict
                | Self::MapFailed
                | Self::AllocFailed
                | Self::RegisterFailed
        )
    }

    /// Returns true for errors local to a single client request.
    #[must_use]
    pub const fn is_request(self) -> bool {
        !self.is_lifecycle()
    }
}

impl fmt::Display for Sab4zError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResource => write!(f, "no memory resource"),
            Self::AddressConflict => write!(f, "register range already claimed"),
            Self::MapFailed => write!(f, "cannot map register range"),
            Self::AllocFailed => write!(f, "cannot allocate device number or class"),
            Self::RegisterFailed => write!(f, "cannot publish device node"),
            Self::InvalidArgument => write!(f, "invalid access argument"),
            Self::InvalidOperation => write!(f, "invalid control-call opcode"),
            Self::AccessFault => write!(f, "bad client buffer"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Sab4zError {}
