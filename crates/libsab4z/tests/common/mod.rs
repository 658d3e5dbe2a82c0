// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared fixtures for library integration tests.
//!
//! A mock SAB4Z board is probed by the real driver and served on a
//! temporary socket, so the library talks to the same request server the
//! daemon runs.

// Not every test file uses every fixture
#![allow(dead_code)]

use std::fs;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;

use sab4z_driver::platform::{MemoryRegisters, MockPlatform};
use sab4z_driver::{DriverConfig, Paddr, PlatformBinding, Sab4z, server};

/// Physical base of the SAB4Z window on the reference board.
pub const BASE: u64 = 0x43C0_0000;

/// Status value the reference design reports after configuration.
pub const STATUS_READY: u32 = 0x0000_0001;

/// Registers of a configured board: status ready, general purpose zero.
pub fn registers() -> MemoryRegisters {
    let registers = MemoryRegisters::new(8);
    registers.set32(0, STATUS_READY);
    registers
}

/// A socket path no other test uses.
pub fn socket_path() -> PathBuf {
    static NEXT: AtomicU32 = AtomicU32::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("libsab4z-{}-{n}.sock", process::id()))
}

/// Sets the shutdown flag when dropped, so a failing test still stops the
/// server thread.
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Probe a mock board over `registers`, serve it on a fresh socket and run
/// `test` with the node path.
pub fn with_node<R>(registers: &MemoryRegisters, test: impl FnOnce(&Path) -> R) -> R {
    let platform = MockPlatform::new(registers.clone());
    let binding = PlatformBinding::new(Paddr::new(BASE), 8);
    let driver =
        Sab4z::probe(platform, &binding, DriverConfig::default()).expect("probe mock board");

    let path = socket_path();
    let _ = fs::remove_file(&path);
    let listener = UnixListener::bind(&path).expect("bind node socket");
    let shutdown = AtomicBool::new(false);

    let result = thread::scope(|scope| {
        let server = scope.spawn(|| server::serve(&driver, &listener, &shutdown));
        let result = {
            let _stop = StopOnDrop(&shutdown);
            test(&path)
        };
        server.join().expect("server thread").expect("serve node");
        result
    });

    let platform = driver.remove();
    assert!(platform.ledger().is_balanced());
    let _ = fs::remove_file(&path);
    result
}
