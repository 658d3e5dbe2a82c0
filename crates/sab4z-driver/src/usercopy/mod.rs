// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Client buffer access.
//!
//! Every request carries a client-supplied buffer. These wrappers are the
//! only way the driver reads from or writes to one, and they check the
//! buffer is large enough before a single byte moves. A short buffer is an
//! [`Sab4zError::AccessFault`], the equivalent of a failed user copy.
//!
//! # Design
//!
//! - **Validation first**: lengths are checked before any copy
//! - **All or nothing**: a failed copy leaves the destination untouched
//! - **Prefix semantics**: only the leading bytes a request needs are used;
//!   anything beyond is ignored


use sab4z_abi::{AccessRecord, Sab4zError};

/// Read-only client buffer.
#[derive(Debug, Clone, Copy)]
pub struct UserPtr<'a> {
    buf: &'a [u8],
}

impl<'a> UserPtr<'a> {
    /// Wrap a client buffer.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Buffer length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Copy the first `N` bytes in.
    pub fn copy_from_user<const N: usize>(&self) -> Result<[u8; N], Sab4zError> {
        copy_prefix(self.buf)
    }

    /// Copy an access record in.
    pub fn read_record(&self) -> Result<AccessRecord, Sab4zError> {
        AccessRecord::from_bytes(self.buf).ok_or(Sab4zError::AccessFault)
    }
}

/// Read-write client buffer.
#[derive(Debug)]
pub struct UserMutPtr<'a> {
    buf: &'a mut [u8],
}

impl<'a> UserMutPtr<'a> {
    /// Wrap a client buffer.
    #[must_use]
    pub const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf }
    }

    /// Buffer length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read-only view of the same buffer.
    #[must_use]
    pub fn as_const(&self) -> UserPtr<'_> {
        UserPtr { buf: &*self.buf }
    }

    /// Fail unless `len` bytes can be copied out.
    pub fn check_writable(&self, len: usize) -> Result<(), Sab4zError> {
        if self.buf.len() < len {
            return Err(Sab4zError::AccessFault);
        }
        Ok(())
    }

    /// Copy `src` out to the start of the buffer.
    pub fn copy_to_user(&mut self, src: &[u8]) -> Result<(), Sab4zError> {
        let dst = self
            .buf
            .get_mut(..src.len())
            .ok_or(Sab4zError::AccessFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Copy an access record out.
    pub fn write_record(&mut self, record: &AccessRecord) -> Result<(), Sab4zError> {
        self.copy_to_user(&record.to_bytes())
    }
}

fn copy_prefix<const N: usize>(buf: &[u8]) -> Result<[u8; N], Sab4zError> {
    buf.get(..N)
        .and_then(|prefix| <[u8; N]>::try_from(prefix).ok())
        .ok_or(Sab4zError::AccessFault)
}
