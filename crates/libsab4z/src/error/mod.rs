// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Client error type.


use core::fmt;
use std::io;

use sab4z_abi::Sab4zError;

/// Why a call on the device node failed.
#[derive(Debug)]
pub enum ClientError {
    /// Opening or talking to the node failed.
    Io(io::Error),
    /// The driver rejected the request.
    Device(Sab4zError),
    /// The node answered with something that is not a valid response.
    Protocol(&'static str),
}

impl ClientError {
    /// The driver error, if the driver rejected the request.
    #[must_use]
    pub const fn device_error(&self) -> Option<Sab4zError> {
        match self {
            Self::Device(e) => Some(*e),
            Self::Io(_) | Self::Protocol(_) => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "device node I/O: {e}"),
            Self::Device(e) => write!(f, "driver: {e} (errno {})", e.errno()),
            Self::Protocol(what) => write!(f, "protocol: {what}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::Protocol(_) => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<Sab4zError> for ClientError {
    fn from(e: Sab4zError) -> Self {
        Self::Device(e)
    }
}
