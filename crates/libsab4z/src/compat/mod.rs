// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Sentinel-returning register calls.
//!
//! These mirror the classic C library surface: no error type, a failure is
//! logged and reported as [`SENTINEL`]. A status or general-purpose
//! register that really holds `0xFFFF_FFFF` is indistinguishable from a
//! failure here; use [`Client`] when that matters.
//!
//! The node path comes from `SAB4Z_NODE`, falling back to the default node.


use sab4z_abi::registers::SENTINEL;
use tracing::error;

use crate::client::Client;
use crate::error::ClientError;

/// Read the status register, or [`SENTINEL`] on failure.
#[must_use]
pub fn sab4z_read_status() -> u32 {
    or_sentinel(Client::from_env().read_status(), "read status register")
}

/// Read the general-purpose register, or [`SENTINEL`] on failure.
#[must_use]
pub fn sab4z_read_general_purpose() -> u32 {
    or_sentinel(
        Client::from_env().read_general_purpose(),
        "read general-purpose register",
    )
}

/// Write the general-purpose register.
///
/// Returns 0 on success and [`SENTINEL`] on failure.
#[must_use = "failure is only reported through the return value"]
pub fn sab4z_write_general_purpose(value: u32) -> u32 {
    or_sentinel(
        Client::from_env().write_general_purpose(value).map(|()| 0),
        "write general-purpose register",
    )
}

/// Collapse a call result into the sentinel convention, logging failures.
#[must_use]
pub fn or_sentinel(result: Result<u32, ClientError>, what: &str) -> u32 {
    result.unwrap_or_else(|e| {
        error!(error = %e, "sab4z: {what} failed");
        SENTINEL
    })
}
