// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Register window manager.
//!
//! Claims the physical range named by the platform binding, maps it, and
//! gives both back. The two halves are separate so a failed mapping can
//! release just the claim.
//!
//! ```text
//! acquire -> RegionClaim -> map -> RegisterWindow -> release
//!                 |
//!                 +-> release_claim (mapping failed)
//! ```
//!
//! Ownership does the bookkeeping: a [`RegionClaim`] can only be consumed
//! once, by [`RegisterWindow::new`] or [`release_claim`], and a
//! [`RegisterWindow`] only by [`release`].


use sab4z_abi::registers::DRIVER_NAME;
use sab4z_abi::{Sab4zError, Width};
use tracing::{debug, error};

use crate::binding::PlatformBinding;
use crate::platform::{Platform, RegisterIo};
use crate::types::Paddr;

/// Exclusive claim on a physical address range.
#[derive(Debug, PartialEq, Eq)]
pub struct RegionClaim {
    base: Paddr,
    len: usize,
}

impl RegionClaim {
    /// Base of the claimed range.
    #[must_use]
    pub const fn base(&self) -> Paddr {
        self.base
    }

    /// Length of the claimed range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the claim is empty (never true for a successful acquire).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A claimed and mapped register window.
pub struct RegisterWindow<Io> {
    claim: RegionClaim,
    io: Io,
}

impl<Io: RegisterIo> RegisterWindow<Io> {
    /// Combine a claim with the mapping made for it.
    #[must_use]
    pub const fn new(claim: RegionClaim, io: Io) -> Self {
        Self { claim, io }
    }

    /// Physical base address.
    #[must_use]
    pub const fn physical_base(&self) -> Paddr {
        self.claim.base
    }

    /// Window length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.claim.len
    }

    /// Whether the window is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.claim.is_empty()
    }

    /// The mapping.
    #[must_use]
    pub const fn io(&self) -> &Io {
        &self.io
    }

    /// Validate an access and turn its offset into a mapping index.
    ///
    /// The access must lie entirely inside the window and be naturally
    /// aligned for its width.
    pub fn check(&self, offset: u64, width: Width) -> Result<usize, Sab4zError> {
        let offset = usize::try_from(offset).map_err(|_| Sab4zError::InvalidArgument)?;
        let in_bounds = offset
            .checked_add(width.bytes())
            .is_some_and(|end| end <= self.len());
        if !in_bounds || !offset.is_multiple_of(width.bytes()) {
            return Err(Sab4zError::InvalidArgument);
        }
        Ok(offset)
    }
}

/// Claim the range named by `binding`.
///
/// An empty or unaddressable range is [`Sab4zError::NoResource`]; a range
/// someone else holds is [`Sab4zError::AddressConflict`].
pub fn acquire<P: Platform>(
    platform: &mut P,
    binding: &PlatformBinding,
) -> Result<RegionClaim, Sab4zError> {
    let len = usize::try_from(binding.len()).map_err(|_| Sab4zError::NoResource)?;
    if len == 0 || binding.base().checked_add(binding.len()).is_none() {
        error!(%binding, "unusable memory resource");
        return Err(Sab4zError::NoResource);
    }

    platform
        .request_mem_region(binding.base(), binding.len(), DRIVER_NAME)
        .map_err(|e| {
            error!(%binding, error = %e, "could not lock memory region");
            Sab4zError::AddressConflict
        })?;

    debug!(%binding, "claimed memory region");
    Ok(RegionClaim {
        base: binding.base(),
        len,
    })
}

/// Map a claimed range.
///
/// On failure the claim is still held; the caller releases it.
pub fn map<P: Platform>(platform: &mut P, claim: &RegionClaim) -> Result<P::Io, Sab4zError> {
    let io = platform
        .ioremap(claim.base, claim.len as u64)
        .map_err(|e| {
            error!(base = %claim.base, error = %e, "could not map register window");
            Sab4zError::MapFailed
        })?;
    debug!(base = %claim.base, len = claim.len, "mapped register window");
    Ok(io)
}

/// Give up a claim that was never mapped.
pub fn release_claim<P: Platform>(platform: &mut P, claim: RegionClaim) {
    platform.release_mem_region(claim.base, claim.len as u64);
    debug!(base = %claim.base, "released memory region");
}

/// Unmap and release a window, in that order.
pub fn release<P: Platform>(platform: &mut P, window: RegisterWindow<P::Io>) {
    let RegisterWindow { claim, io } = window;
    platform.iounmap(io);
    release_claim(platform, claim);
}
