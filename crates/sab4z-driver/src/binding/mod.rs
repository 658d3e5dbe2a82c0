// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform binding: where the register window lives.
//!
//! The binding is the first memory resource of the device node whose
//! `compatible` property lists `tpt,sab4z`. It can also be given directly,
//! which is what tests and the daemon's `--base/--len` flags do.

#[cfg(test)]
mod binding_test;

use core::fmt;

use fdt::Fdt;
use sab4z_abi::Sab4zError;
use sab4z_abi::registers::COMPATIBLE;
use tracing::{debug, error};

use crate::types::Paddr;

/// Physical location of the register window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformBinding {
    base: Paddr,
    len: u64,
}

impl PlatformBinding {
    /// A binding for `len` bytes at `base`.
    #[must_use]
    pub const fn new(base: Paddr, len: u64) -> Self {
        Self { base, len }
    }

    /// Find the SAB4Z node in a flattened device tree.
    ///
    /// Fails with [`Sab4zError::NoResource`] if the blob does not parse, no
    /// node is compatible, or the node has no sized memory resource.
    pub fn from_fdt(blob: &[u8]) -> Result<Self, Sab4zError> {
        let fdt = Fdt::new(blob).map_err(|e| {
            error!(error = ?e, "device tree blob does not parse");
            Sab4zError::NoResource
        })?;

        let Some(node) = fdt.find_compatible(&[COMPATIBLE]) else {
            error!(compatible = COMPATIBLE, "no compatible device tree node");
            return Err(Sab4zError::NoResource);
        };

        let region = node.reg().and_then(|mut reg| reg.next()).ok_or_else(|| {
            error!(node = node.name, "device tree node has no reg property");
            Sab4zError::NoResource
        })?;

        let Some(size) = region.size else {
            error!(node = node.name, "device tree reg entry has no size");
            return Err(Sab4zError::NoResource);
        };

        let binding = Self::new(
            Paddr::new(region.starting_address.addr() as u64),
            size as u64,
        );
        debug!(node = node.name, %binding, "found platform binding");
        Ok(binding)
    }

    /// Physical base address.
    #[must_use]
    pub const fn base(&self) -> Paddr {
        self.base
    }

    /// Window length in bytes.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Whether the window is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for PlatformBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{:#x}", self.base, self.len)
    }
}
