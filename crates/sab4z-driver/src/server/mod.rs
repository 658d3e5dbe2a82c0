// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Request server for the node transport.
//!
//! Each client connection is one open file: requests arrive as frames, run
//! to completion against the driver, and are answered with one frame each.
//!
//! # Error handling
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Driver rejects the request | error response, connection stays open |
//! | Undecodable frame | `ErrorMalformed`, connection stays open |
//! | Oversize or truncated frame | connection closed |
//! | More than [`MAX_CLIENTS`] connections | new connection closed |


use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use sab4z_abi::registers::COMPOSITE_LEN;
use sab4z_abi::wire::{self, Request, Response};
use tracing::{debug, info, warn};

use crate::driver::{OpenFile, Sab4z};
use crate::platform::Platform;

/// Connections served at the same time.
pub const MAX_CLIENTS: usize = 64;

/// How often the accept loop checks for shutdown.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Run one request against an open file and encode the response.
pub fn handle_request<P: Platform>(file: &OpenFile<'_, P>, payload: &[u8]) -> Vec<u8> {
    let request = match Request::decode(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed request");
            return Response::malformed().encode();
        }
    };

    match request {
        Request::Ioctl { cmd, arg } => {
            let mut arg = arg.to_vec();
            match file.ioctl(cmd, &mut arg) {
                Ok(()) => Response::success(&arg).encode(),
                Err(e) => Response::error(e).encode(),
            }
        }
        Request::Read { count } => {
            // Exactly one composite is produced whatever count the client
            // asked for.
            let mut buf = [0u8; COMPOSITE_LEN];
            match file.read(&mut buf) {
                Ok(n) => Response::success(buf.get(..n).unwrap_or(&buf)).encode(),
                Err(e) => {
                    debug!(count, "read not serviced");
                    Response::error(e).encode()
                }
            }
        }
        Request::Write { data } => match file.write(data) {
            Ok(n) => {
                let written = u32::try_from(n).unwrap_or(u32::MAX);
                Response::success(&written.to_le_bytes()).encode()
            }
            Err(e) => Response::error(e).encode(),
        },
    }
}

/// Serve one client until it disconnects.
pub fn serve_connection<P, S>(driver: &Sab4z<P>, stream: &mut S) -> io::Result<()>
where
    P: Platform,
    S: Read + Write,
{
    let file = driver.open();
    let mut frame = Vec::new();
    while wire::read_frame(stream, &mut frame)? {
        let response = handle_request(&file, &frame);
        wire::write_frame(stream, &response)?;
    }
    Ok(())
}

/// Accept clients on `listener` until `shutdown` is set.
///
/// Every client gets its own thread, up to [`MAX_CLIENTS`] at a time;
/// further connections are closed right away. On shutdown, open
/// connections are shut down so their threads finish, and all threads are
/// joined before this returns.
pub fn serve<P>(
    driver: &Sab4z<P>,
    listener: &UnixListener,
    shutdown: &AtomicBool,
) -> io::Result<()>
where
    P: Platform + Sync,
{
    listener.set_nonblocking(true)?;
    info!("serving device node");

    let clients = ClientTable::new(MAX_CLIENTS);
    thread::scope(|scope| {
        let result = accept_clients(listener, shutdown, |stream| {
            let id = match stream.try_clone() {
                Ok(handle) => match clients.insert(handle) {
                    Some(id) => id,
                    None => {
                        warn!(max = MAX_CLIENTS, "too many clients, connection refused");
                        return;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "connection dropped");
                    return;
                }
            };

            let clients = &clients;
            scope.spawn(move || {
                let mut stream = stream;
                debug!(id, clients = clients.len(), "client connected");
                match serve_connection(driver, &mut stream) {
                    Ok(()) => debug!(id, "client disconnected"),
                    Err(e) => warn!(id, error = %e, "client connection failed"),
                }
                clients.remove(id);
            });
        });

        clients.shutdown_all();
        result
    })
}

/// Connected clients, keyed by connection id.
///
/// Holds a second handle on every live connection so shutdown can
/// interrupt a blocked read. A connection's entry is dropped as soon as its
/// thread finishes.
struct ClientTable {
    streams: Mutex<HashMap<u64, UnixStream>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl ClientTable {
    fn new(capacity: usize) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            capacity,
        }
    }

    fn streams(&self) -> MutexGuard<'_, HashMap<u64, UnixStream>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection, or `None` when the table is full.
    fn insert(&self, stream: UnixStream) -> Option<u64> {
        let mut streams = self.streams();
        if streams.len() >= self.capacity {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        streams.insert(id, stream);
        Some(id)
    }

    fn remove(&self, id: u64) {
        self.streams().remove(&id);
    }

    fn len(&self) -> usize {
        self.streams().len()
    }

    fn shutdown_all(&self) {
        for stream in self.streams().values() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!(error = %e, "client already gone");
            }
        }
    }
}

fn accept_clients(
    listener: &UnixListener,
    shutdown: &AtomicBool,
    mut on_client: impl FnMut(UnixStream),
) -> io::Result<()> {
    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                on_client(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    info!("stopped serving device node");
    Ok(())
}
