// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Register offsets and device identity strings.
//!
//! All offsets are relative to the base of the register window.

/// Status register.
pub const STATUS_OFFSET: u64 = 0x0;

/// Data / general-purpose register.
pub const GP_OFFSET: u64 = 0x4;

/// Bytes produced by a stream read (status and general-purpose registers).
pub const COMPOSITE_LEN: usize = 8;

/// Bytes consumed by a stream write.
pub const STREAM_WRITE_LEN: usize = 4;

/// Device tree compatible string the driver binds to.
pub const COMPATIBLE: &str = "tpt,sab4z";

/// Driver name used in log messages and as the region owner.
pub const DRIVER_NAME: &str = "SAB4Z";

/// Name of the published device node.
pub const NODE_NAME: &str = "sab4z";

/// Name of the device class (and of the char-dev region).
pub const CLASS_NAME: &str = "sab4z";

/// Default location of the device node.
pub const DEFAULT_NODE_PATH: &str = "/run/sab4z/sab4z";

/// Value returned by the compatibility library calls when they fail.
pub const SENTINEL: u32 = 0xFFFF_FFFF;
