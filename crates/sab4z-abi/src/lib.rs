// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared ABI definitions between the SAB4Z driver and its user-space library.
//!
//! This crate defines the contract between the driver and its clients:
//! - The access record carried by every control call
//! - Control-call command numbers (Linux ioctl compatible)
//! - Register offsets and device names
//! - The error taxonomy shared by both sides
//! - Frame format for the local node transport
//!
//! # Design Principles
//!
//! - **No dependencies**: Pure data types, 100% host-testable
//! - **Stable layout**: The access record uses `#[repr(C)]`
//! - **Explicit wire format**: Every multi-byte field on the wire has a
//!   fixed byte order, independent of the host
//!
//! # Modules
//!
//! - [`access`]: The `{ data, addr }` access record
//! - [`command`]: Access widths, directions and command numbers
//! - [`registers`]: Register offsets and device identity strings
//! - [`error`]: Error taxonomy
//! - [`wire`]: Request/response framing

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod access;
pub mod command;
pub mod error;
pub mod registers;
pub mod wire;

// Re-export commonly used types at crate root
pub use access::AccessRecord;
pub use command::{Command, Direction, Width};
pub use error::Sab4zError;
pub use wire::{DecodeError, Request, RequestTag, Response, ResponseTag};
