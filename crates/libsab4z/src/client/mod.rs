// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! One-shot register calls.
//!
//! Each call opens the node, issues one 32-bit control call and closes the
//! node again, so a [`Client`] holds no open file between calls.

#[cfg(test)]
mod client_test;

use std::path::{Path, PathBuf};

use sab4z_abi::registers::{GP_OFFSET, STATUS_OFFSET};
use sab4z_abi::{AccessRecord, Command};

use crate::default_node_path;
use crate::device::Device;
use crate::error::ClientError;

/// Register access through the device node at a fixed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    path: PathBuf,
}

impl Client {
    /// A client for the node at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A client for the node named by `SAB4Z_NODE`, or the default node.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(default_node_path())
    }

    /// Path of the device node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the status register.
    pub fn read_status(&self) -> Result<u32, ClientError> {
        self.read32(STATUS_OFFSET)
    }

    /// Read the general-purpose register.
    pub fn read_general_purpose(&self) -> Result<u32, ClientError> {
        self.read32(GP_OFFSET)
    }

    /// Write the general-purpose register.
    pub fn write_general_purpose(&self, value: u32) -> Result<(), ClientError> {
        let mut device = Device::open(&self.path)?;
        let mut record = AccessRecord::new(GP_OFFSET, u64::from(value));
        device.ioctl(Command::WRITE32, &mut record)
    }

    fn read32(&self, addr: u64) -> Result<u32, ClientError> {
        let mut device = Device::open(&self.path)?;
        let mut record = AccessRecord::read_at(addr);
        device.ioctl(Command::READ32, &mut record)?;
        u32::try_from(record.data).map_err(|_| ClientError::Protocol("32-bit read returned a wider value"))
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::from_env()
    }
}
