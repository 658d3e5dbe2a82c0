// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Address and identity newtypes.
//!
//! These newtypes keep physical addresses, device numbers and class handles
//! from being mixed up at compile time.


use core::fmt;

/// A physical memory address (bus visible).
///
/// Used for the base of the register window as reported by the platform
/// binding. Never dereferenced directly; it has to be mapped first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Paddr(u64);

impl Paddr {
    /// Create a new physical address.
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw address value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Add an offset, returning `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, offset: u64) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// Align this address down to the given alignment.
    ///
    /// Returns `None` if alignment is zero or not a power of two.
    #[inline]
    #[must_use]
    pub const fn align_down(self, alignment: u64) -> Option<Self> {
        if !alignment.is_power_of_two() {
            return None;
        }
        Some(Self(self.0 & !(alignment - 1)))
    }

    /// Check whether `[self, self + len)` and `[other, other + other_len)`
    /// share at least one byte.
    #[inline]
    #[must_use]
    pub const fn overlaps(self, len: u64, other: Self, other_len: u64) -> bool {
        let end = self.0.saturating_add(len);
        let other_end = other.0.saturating_add(other_len);
        self.0 < other_end && other.0 < end
    }
}

impl fmt::Debug for Paddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Paddr({:#x})", self.0)
    }
}

impl fmt::Display for Paddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A device number: dynamically allocated major plus minor.
///
/// Packs the same way the Linux `MKDEV` macro does, with 20 minor bits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DevT {
    major: u32,
    minor: u32,
}

impl DevT {
    /// Number of bits reserved for the minor number.
    pub const MINOR_BITS: u32 = 20;

    /// Largest representable minor number.
    pub const MINOR_MASK: u32 = (1 << Self::MINOR_BITS) - 1;

    /// Largest representable major number.
    pub const MAX_MAJOR: u32 = u32::MAX >> Self::MINOR_BITS;

    /// Create a device number.
    ///
    /// Returns `None` if either half does not fit its bit field.
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Option<Self> {
        if major > Self::MAX_MAJOR || minor > Self::MINOR_MASK {
            return None;
        }
        Some(Self { major, minor })
    }

    /// Unpack a raw `dev_t` value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            major: raw >> Self::MINOR_BITS,
            minor: raw & Self::MINOR_MASK,
        }
    }

    /// The packed `dev_t` value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        (self.major << Self::MINOR_BITS) | self.minor
    }

    /// The major number.
    #[inline]
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// The minor number.
    #[inline]
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }
}

impl fmt::Debug for DevT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevT({}:{})", self.major, self.minor)
    }
}

impl fmt::Display for DevT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Handle to a device class created by the platform.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    /// Create a class handle.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class:{}", self.0)
    }
}
