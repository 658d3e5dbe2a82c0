// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Frame format for the local node transport.
//!
//! Clients talk to the device node over a stream transport. Every message is
//! a length-prefixed frame; the first payload byte is the message tag.
//!
//! # Frame Layout
//!
//! | Bytes    | Content |
//! |----------|---------|
//! | 0..4     | payload length (u32, little-endian, at most `MAX_FRAME_LEN`) |
//! | 4..      | payload |
//!
//! ## Requests (client → node)
//!
//! | Tag | Payload after the tag |
//! |-----|-----------------------|
//! | `Ioctl` | `cmd` (u32 LE), then the argument buffer |
//! | `Read`  | requested byte count (u32 LE) |
//! | `Write` | bytes to write |
//!
//! ## Responses (node → client)
//!
//! | Tag | Payload after the tag |
//! |-----|-----------------------|
//! | `Success` | updated argument buffer, stream bytes, or written count (u32 LE) |
//! | `Error*`  | empty |
//!
//! The argument buffer of a control call is carried verbatim. The driver
//! validates its length when copying the access record in and out, exactly
//! where a kernel driver validates the user pointer.

use crate::error::Sab4zError;
use core::fmt;

#[cfg(any(test, feature = "std"))]
use std::io::{self, Read, Write};
#[cfg(any(test, feature = "std"))]
use std::vec::Vec;


/// Size of the length prefix in bytes.
pub const LEN_PREFIX: usize = 4;

/// Largest accepted frame payload.
pub const MAX_FRAME_LEN: usize = 4096;

// =============================================================================
// Tags
// =============================================================================

/// Request tag (1-127).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestTag {
    /// Control call with a command number and argument buffer.
    Ioctl = 1,
    /// Stream read of the composite status/data value.
    Read = 2,
    /// Stream write to the data register.
    Write = 3,
}

impl RequestTag {
    /// Try to convert from a raw tag byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Ioctl),
            2 => Some(Self::Read),
            3 => Some(Self::Write),
            _ => None,
        }
    }
}

/// Response tag (128-255).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseTag {
    /// Request succeeded.
    Success = 128,
    /// Request failed: invalid argument.
    ErrorInvalidArgument = 129,
    /// Request failed: unrecognized opcode.
    ErrorInvalidOperation = 130,
    /// Request failed: bad client buffer.
    ErrorAccessFault = 131,
    /// Request frame could not be decoded.
    ErrorMalformed = 132,
    /// Request failed: no resource.
    ErrorNoResource = 133,
    /// Request failed: address conflict.
    ErrorAddressConflict = 134,
    /// Request failed: mapping failed.
    ErrorMapFailed = 135,
    /// Request failed: allocation failed.
    ErrorAllocFailed = 136,
    /// Request failed: registration failed.
    ErrorRegisterFailed = 137,
}

impl ResponseTag {
    /// Try to convert from a raw tag byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            128 => Some(Self::Success),
            129 => Some(Self::ErrorInvalidArgument),
            130 => Some(Self::ErrorInvalidOperation),
            131 => Some(Self::ErrorAccessFault),
            132 => Some(Self::ErrorMalformed),
            133 => Some(Self::ErrorNoResource),
            134 => Some(Self::ErrorAddressConflict),
            135 => Some(Self::ErrorMapFailed),
            136 => Some(Self::ErrorAllocFailed),
            137 => Some(Self::ErrorRegisterFailed),
            _ => None,
        }
    }

    /// Response tag reporting the given error.
    #[must_use]
    pub const fn from_error(error: Sab4zError) -> Self {
        match error {
            Sab4zError::InvalidArgument => Self::ErrorInvalidArgument,
            Sab4zError::InvalidOperation => Self::ErrorInvalidOperation,
            Sab4zError::AccessFault => Self::ErrorAccessFault,
            Sab4zError::NoResource => Self::ErrorNoResource,
            Sab4zError::AddressConflict => Self::ErrorAddressConflict,
            Sab4zError::MapFailed => Self::ErrorMapFailed,
            Sab4zError::AllocFailed => Self::ErrorAllocFailed,
            Sab4zError::RegisterFailed => Self::ErrorRegisterFailed,
        }
    }

    /// The driver error carried by this tag.
    ///
    /// Returns `None` for `Success` and `ErrorMalformed`, which are not
    /// driver errors.
    #[must_use]
    pub const fn to_error(self) -> Option<Sab4zError> {
        match self {
            Self::Success | Self::ErrorMalformed => None,
            Self::ErrorInvalidArgument => Some(Sab4zError::InvalidArgument),
            Self::ErrorInvalidOperation => Some(Sab4zError::InvalidOperation),
            Self::ErrorAccessFault => Some(Sab4zError::AccessFault),
            Self::ErrorNoResource => Some(Sab4zError::NoResource),
            Self::ErrorAddressConflict => Some(Sab4zError::AddressConflict),
            Self::ErrorMapFailed => Some(Sab4zError::MapFailed),
            Self::ErrorAllocFailed => Some(Sab4zError::AllocFailed),
            Self::ErrorRegisterFailed => Some(Sab4zError::RegisterFailed),
        }
    }

    /// Returns true if this is a success response.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors that can occur while decoding a frame payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is empty.
    Empty,
    /// The tag byte is not known.
    UnknownTag(u8),
    /// The payload is shorter than its tag requires.
    Truncated,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownTag(tag) => write!(f, "unknown tag {tag}"),
            Self::Truncated => write!(f, "truncated frame"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for DecodeError {}

fn read_u32(bytes: &[u8]) -> Result<u32, DecodeError> {
    let raw = bytes.get(..4).ok_or(DecodeError::Truncated)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(raw);
    Ok(u32::from_le_bytes(word))
}

// =============================================================================
// Requests
// =============================================================================

/// A decoded client request, borrowing from the frame payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    /// Control call.
    Ioctl {
        /// Raw command number.
        cmd: u32,
        /// Argument buffer as supplied by the client.
        arg: &'a [u8],
    },
    /// Stream read.
    Read {
        /// Byte count requested by the client.
        count: u32,
    },
    /// Stream write.
    Write {
        /// Bytes to write.
        data: &'a [u8],
    },
}

impl<'a> Request<'a> {
    /// The tag of this request.
    #[must_use]
    pub const fn tag(&self) -> RequestTag {
        match self {
            Self::Ioctl { .. } => RequestTag::Ioctl,
            Self::Read { .. } => RequestTag::Read,
            Self::Write { .. } => RequestTag::Write,
        }
    }

    /// Decode a request from a frame payload.
    pub fn decode(payload: &'a [u8]) -> Result<Self, DecodeError> {
        let (&tag, body) = payload.split_first().ok_or(DecodeError::Empty)?;
        match RequestTag::from_u8(tag).ok_or(DecodeError::UnknownTag(tag))? {
            RequestTag::Ioctl => {
                let cmd = read_u32(body)?;
                Ok(Self::Ioctl {
                    cmd,
                    arg: &body[4..],
                })
            }
            RequestTag::Read => Ok(Self::Read {
                count: read_u32(body)?,
            }),
            RequestTag::Write => Ok(Self::Write { data: body }),
        }
    }

    /// Encode this request into a frame payload.
    #[cfg(any(test, feature = "std"))]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.push(self.tag() as u8);
        match *self {
            Self::Ioctl { cmd, arg } => {
                out.extend_from_slice(&cmd.to_le_bytes());
                out.extend_from_slice(arg);
            }
            Self::Read { count } => out.extend_from_slice(&count.to_le_bytes()),
            Self::Write { data } => out.extend_from_slice(data),
        }
        out
    }
}

// =============================================================================
// Responses
// =============================================================================

/// A node response, borrowing its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response<'a> {
    /// Response tag.
    pub tag: ResponseTag,
    /// Payload after the tag (empty for errors).
    pub payload: &'a [u8],
}

impl<'a> Response<'a> {
    /// A success response carrying `payload`.
    #[must_use]
    pub const fn success(payload: &'a [u8]) -> Self {
        Self {
            tag: ResponseTag::Success,
            payload,
        }
    }

    /// An error response for a driver error.
    #[must_use]
    pub const fn error(error: Sab4zError) -> Self {
        Self {
            tag: ResponseTag::from_error(error),
            payload: &[],
        }
    }

    /// An error response for an undecodable request.
    #[must_use]
    pub const fn malformed() -> Self {
        Self {
            tag: ResponseTag::ErrorMalformed,
            payload: &[],
        }
    }

    /// Decode a response from a frame payload.
    pub fn decode(payload: &'a [u8]) -> Result<Self, DecodeError> {
        let (&tag, body) = payload.split_first().ok_or(DecodeError::Empty)?;
        let tag = ResponseTag::from_u8(tag).ok_or(DecodeError::UnknownTag(tag))?;
        Ok(Self { tag, payload: body })
    }

    /// Encode this response into a frame payload.
    #[cfg(any(test, feature = "std"))]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.tag as u8);
        out.extend_from_slice(self.payload);
        out
    }
}

// =============================================================================
// Frame I/O
// =============================================================================

/// Write one length-prefixed frame.
///
/// Fails with `InvalidInput` if the payload exceeds [`MAX_FRAME_LEN`].
#[cfg(any(test, feature = "std"))]
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "frame exceeds maximum length",
        ));
    }
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame length overflow"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read one length-prefixed frame into `buf`.
///
/// Returns `Ok(false)` if the peer closed the stream cleanly before a new
/// frame started. A length above [`MAX_FRAME_LEN`] fails with `InvalidData`
/// without reading the payload.
#[cfg(any(test, feature = "std"))]
pub fn read_frame<R: Read>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    let mut prefix = [0u8; LEN_PREFIX];
    let mut filled = 0;
    while filled < LEN_PREFIX {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    let len = u32::from_le_bytes(prefix) as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame exceeds maximum length",
        ));
    }
    buf.clear();
    buf.resize(len, 0);
    reader.read_exact(buf)?;
    Ok(true)
}
