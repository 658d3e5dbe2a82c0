// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Access widths, directions and control-call command numbers.
//!
//! A control call is identified by a (width, direction) pair. On the wire it
//! travels as a Linux-style ioctl number so that the numbering stays
//! compatible with existing clients:
//!
//! | Command   | nr | Encoding |
//! |-----------|----|----------|
//! | `READ8`   | 1  | `_IOR(42, 1, access_struct *)` |
//! | `WRITE8`  | 2  | `_IOW(42, 2, access_struct *)` |
//! | `READ16`  | 3  | `_IOR(42, 3, access_struct *)` |
//! | `WRITE16` | 4  | `_IOW(42, 4, access_struct *)` |
//! | `READ32`  | 5  | `_IOR(42, 5, access_struct *)` |
//! | `WRITE32` | 6  | `_IOW(42, 6, access_struct *)` |

use core::fmt;


/// Ioctl type byte reserved for the SAB4Z node.
pub const IOCTL_TYPE: u32 = 42;

// Linux asm-generic ioctl encoding.
const IOC_TYPE_SHIFT: u32 = 8;
const IOC_SIZE_SHIFT: u32 = 16;
const IOC_DIR_SHIFT: u32 = 30;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

/// Size field of the command: the argument is a pointer on a 64-bit target.
const IOC_ARG_SIZE: u32 = 8;

const fn ioc(dir: u32, nr: u32) -> u32 {
    (dir << IOC_DIR_SHIFT) | (IOC_ARG_SIZE << IOC_SIZE_SHIFT) | (IOCTL_TYPE << IOC_TYPE_SHIFT) | nr
}

// =============================================================================
// Width
// =============================================================================

/// Width of a single register access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Width {
    /// 8-bit load/store.
    Bits8 = 8,
    /// 16-bit load/store.
    Bits16 = 16,
    /// 32-bit load/store.
    Bits32 = 32,
}

impl Width {
    /// All supported widths, narrowest first.
    pub const ALL: [Self; 3] = [Self::Bits8, Self::Bits16, Self::Bits32];

    /// Try to convert from a bit count.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            32 => Some(Self::Bits32),
            _ => None,
        }
    }

    /// Width in bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Width in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        (self as usize) / 8
    }

    /// Truncate a value to this width.
    #[inline]
    #[must_use]
    pub const fn truncate(self, value: u64) -> u32 {
        match self {
            Self::Bits8 => (value & 0xFF) as u32,
            Self::Bits16 => (value & 0xFFFF) as u32,
            Self::Bits32 => (value & 0xFFFF_FFFF) as u32,
        }
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Direction of a register access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Load from the register.
    Read = 0,
    /// Store to the register.
    Write = 1,
}

impl Direction {
    /// Try to convert from a raw value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            _ => None,
        }
    }
}

// =============================================================================
// Command
// =============================================================================

/// A control-call opcode: one (width, direction) pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    width: Width,
    direction: Direction,
}

impl Command {
    /// 8-bit read.
    pub const READ8: Self = Self::new(Width::Bits8, Direction::Read);
    /// 8-bit write.
    pub const WRITE8: Self = Self::new(Width::Bits8, Direction::Write);
    /// 16-bit read.
    pub const READ16: Self = Self::new(Width::Bits16, Direction::Read);
    /// 16-bit write.
    pub const WRITE16: Self = Self::new(Width::Bits16, Direction::Write);
    /// 32-bit read.
    pub const READ32: Self = Self::new(Width::Bits32, Direction::Read);
    /// 32-bit write.
    pub const WRITE32: Self = Self::new(Width::Bits32, Direction::Write);

    /// All six commands in ioctl number order.
    pub const ALL: [Self; 6] = [
        Self::READ8,
        Self::WRITE8,
        Self::READ16,
        Self::WRITE16,
        Self::READ32,
        Self::WRITE32,
    ];

    /// Create a command from its width and direction.
    #[inline]
    #[must_use]
    pub const fn new(width: Width, direction: Direction) -> Self {
        Self { width, direction }
    }

    /// Width of the access.
    #[inline]
    #[must_use]
    pub const fn width(self) -> Width {
        self.width
    }

    /// Direction of the access.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> Direction {
        self.direction
    }

    /// The ioctl sequence number (1..=6).
    #[must_use]
    pub const fn number(self) -> u32 {
        match (self.width, self.direction) {
            (Width::Bits8, Direction::Read) => 1,
            (Width::Bits8, Direction::Write) => 2,
            (Width::Bits16, Direction::Read) => 3,
            (Width::Bits16, Direction::Write) => 4,
            (Width::Bits32, Direction::Read) => 5,
            (Width::Bits32, Direction::Write) => 6,
        }
    }

    /// The full ioctl command number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        let dir = match self.direction {
            Direction::Read => IOC_READ,
            Direction::Write => IOC_WRITE,
        };
        ioc(dir, self.number())
    }

    /// Try to convert from a raw ioctl command number.
    ///
    /// Only the six SAB4Z command numbers are accepted.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.raw() == raw)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Read => "Read",
            Direction::Write => "Write",
        };
        write!(f, "{dir}{}", self.width.bits())
    }
}
