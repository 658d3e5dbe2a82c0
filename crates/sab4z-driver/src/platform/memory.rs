// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Register file backed by host memory.
//!
//! Stands in for the hardware window in tests and in the daemon's `memory`
//! backend. Values are stored in native byte order, the same way a 32-bit
//! register appears to a CPU load. Clones share the same storage, so a test
//! can keep a handle after the driver has taken the mapping.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sab4z_abi::Width;

use super::traits::RegisterIo;

/// One recorded register-file operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// `read_barrier` was issued.
    ReadBarrier,
    /// `write_barrier` was issued.
    WriteBarrier,
    /// A load returned `value`.
    Load {
        /// Byte offset.
        offset: usize,
        /// Access width.
        width: Width,
        /// Value observed.
        value: u32,
    },
    /// A store wrote `value`.
    Store {
        /// Byte offset.
        offset: usize,
        /// Access width.
        width: Width,
        /// Value written.
        value: u32,
    },
}

#[derive(Debug)]
struct RegisterFile {
    bytes: Vec<u8>,
    trace: Option<Vec<Access>>,
}

/// Shared, in-memory register window.
#[derive(Clone, Debug)]
pub struct MemoryRegisters {
    inner: Arc<Mutex<RegisterFile>>,
}

impl MemoryRegisters {
    /// A zero-filled register file of `len` bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self::build(len, None)
    }

    /// Like [`new`](Self::new), but every access and barrier is recorded.
    #[must_use]
    pub fn traced(len: usize) -> Self {
        Self::build(len, Some(Vec::new()))
    }

    fn build(len: usize, trace: Option<Vec<Access>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegisterFile {
                bytes: vec![0; len],
                trace,
            })),
        }
    }

    fn file(&self) -> MutexGuard<'_, RegisterFile> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Preset a 32-bit register without recording it.
    pub fn set32(&self, offset: usize, value: u32) {
        self.file().put(offset, &value.to_ne_bytes());
    }

    /// Peek at a 32-bit register without recording it.
    #[must_use]
    pub fn get32(&self, offset: usize) -> u32 {
        u32::from_ne_bytes(self.file().get(offset))
    }

    /// Snapshot of the raw register bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.file().bytes.clone()
    }

    /// Recorded operations, oldest first. Empty unless built with
    /// [`traced`](Self::traced).
    #[must_use]
    pub fn trace(&self) -> Vec<Access> {
        self.file().trace.clone().unwrap_or_default()
    }

    /// Forget recorded operations.
    pub fn clear_trace(&self) {
        if let Some(trace) = self.file().trace.as_mut() {
            trace.clear();
        }
    }

    fn load<const N: usize>(
        &self,
        offset: usize,
        width: Width,
        widen: fn([u8; N]) -> u32,
    ) -> [u8; N] {
        let mut file = self.file();
        let bytes = file.get(offset);
        file.record(Access::Load {
            offset,
            width,
            value: widen(bytes),
        });
        bytes
    }

    fn store<const N: usize>(&self, offset: usize, width: Width, bytes: [u8; N], value: u32) {
        let mut file = self.file();
        file.put(offset, &bytes);
        file.record(Access::Store {
            offset,
            width,
            value,
        });
    }

    fn barrier(&self, access: Access) {
        self.file().record(access);
    }
}

impl RegisterFile {
    // Out-of-range loads read as zero and stores are dropped; the
    // dispatcher never issues them.
    fn get<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0; N];
        if let Some(src) = offset
            .checked_add(N)
            .and_then(|end| self.bytes.get(offset..end))
        {
            out.copy_from_slice(src);
        }
        out
    }

    fn put(&mut self, offset: usize, src: &[u8]) {
        if let Some(dst) = offset
            .checked_add(src.len())
            .and_then(|end| self.bytes.get_mut(offset..end))
        {
            dst.copy_from_slice(src);
        }
    }

    fn record(&mut self, access: Access) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(access);
        }
    }
}

impl RegisterIo for MemoryRegisters {
    fn len(&self) -> usize {
        self.file().bytes.len()
    }

    fn read8(&self, offset: usize) -> u8 {
        let [b] = self.load(offset, Width::Bits8, |b: [u8; 1]| u32::from(b[0]));
        b
    }

    fn read16(&self, offset: usize) -> u16 {
        u16::from_ne_bytes(self.load(offset, Width::Bits16, |b| {
            u32::from(u16::from_ne_bytes(b))
        }))
    }

    fn read32(&self, offset: usize) -> u32 {
        u32::from_ne_bytes(self.load(offset, Width::Bits32, u32::from_ne_bytes))
    }

    fn write8(&self, offset: usize, value: u8) {
        self.store(offset, Width::Bits8, [value], u32::from(value));
    }

    fn write16(&self, offset: usize, value: u16) {
        self.store(offset, Width::Bits16, value.to_ne_bytes(), u32::from(value));
    }

    fn write32(&self, offset: usize, value: u32) {
        self.store(offset, Width::Bits32, value.to_ne_bytes(), value);
    }

    fn read_barrier(&self) {
        super::barrier::read_barrier();
        self.barrier(Access::ReadBarrier);
    }

    fn write_barrier(&self) {
        super::barrier::write_barrier();
        self.barrier(Access::WriteBarrier);
    }
}
