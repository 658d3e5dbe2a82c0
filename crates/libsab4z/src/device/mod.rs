// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! An open device node.
//!
//! A [`Device`] is one open file on the driver: every call sends one
//! request frame and waits for its response. Dropping the device closes
//! the file.


use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use sab4z_abi::wire::{self, Request, Response, ResponseTag};
use sab4z_abi::{AccessRecord, Command};
use tracing::{debug, trace};

use crate::error::ClientError;

/// An open SAB4Z device node.
#[derive(Debug)]
pub struct Device<S = UnixStream> {
    stream: S,
    frame: Vec<u8>,
}

impl Device<UnixStream> {
    /// Open the device node at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path)?;
        debug!(path = %path.display(), "opened device node");
        Ok(Self::from_stream(stream))
    }
}

impl<S: Read + Write> Device<S> {
    /// Wrap an already connected stream.
    #[must_use]
    pub const fn from_stream(stream: S) -> Self {
        Self {
            stream,
            frame: Vec::new(),
        }
    }

    /// Issue a control call with an access record.
    ///
    /// On success the record holds whatever the driver copied back: the
    /// loaded value for reads, the unchanged record for writes.
    pub fn ioctl(&mut self, command: Command, record: &mut AccessRecord) -> Result<(), ClientError> {
        let mut arg = record.to_bytes();
        self.ioctl_raw(command.raw(), &mut arg)?;
        *record = AccessRecord::from_bytes(&arg)
            .ok_or(ClientError::Protocol("short access record in response"))?;
        Ok(())
    }

    /// Issue a control call with a raw command number and argument buffer.
    ///
    /// The argument is sent as-is and overwritten with the returned bytes.
    pub fn ioctl_raw(&mut self, cmd: u32, arg: &mut [u8]) -> Result<(), ClientError> {
        trace!(cmd, len = arg.len(), "ioctl");
        let payload = self.call(&Request::Ioctl { cmd, arg })?;
        if payload.len() != arg.len() {
            return Err(ClientError::Protocol("argument length changed in response"));
        }
        arg.copy_from_slice(&payload);
        Ok(())
    }

    /// Stream read into `buf`, returning the number of bytes stored.
    ///
    /// The driver always produces one 8-byte composite; a shorter `buf`
    /// receives its leading bytes.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ClientError> {
        let count = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let payload = self.call(&Request::Read { count })?;
        let n = payload.len().min(buf.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), payload.get(..n)) {
            dst.copy_from_slice(src);
        }
        Ok(n)
    }

    /// Stream write from `data`, returning the number of bytes consumed.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, ClientError> {
        let payload = self.call(&Request::Write { data })?;
        let written: [u8; 4] = payload
            .as_slice()
            .try_into()
            .map_err(|_| ClientError::Protocol("write count has wrong length"))?;
        usize::try_from(u32::from_le_bytes(written))
            .map_err(|_| ClientError::Protocol("write count out of range"))
    }

    /// Take back the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Send one request and return the payload of a success response.
    fn call(&mut self, request: &Request<'_>) -> Result<Vec<u8>, ClientError> {
        wire::write_frame(&mut self.stream, &request.encode())?;
        self.stream.flush()?;

        if !wire::read_frame(&mut self.stream, &mut self.frame)? {
            return Err(ClientError::Protocol("node closed the connection"));
        }
        let response =
            Response::decode(&self.frame).map_err(|_| ClientError::Protocol("undecodable response"))?;

        match response.tag {
            ResponseTag::Success => Ok(response.payload.to_vec()),
            ResponseTag::ErrorMalformed => Err(ClientError::Protocol("request rejected as malformed")),
            tag => Err(tag
                .to_error()
                .map_or(ClientError::Protocol("unknown error response"), ClientError::Device)),
        }
    }
}
