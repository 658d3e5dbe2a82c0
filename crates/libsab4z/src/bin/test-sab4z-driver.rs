// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Exercise a running SAB4Z driver.
//!
//! Reads both registers, writes a known value into the general-purpose
//! register and reads both registers again.
//!
//! Usage: `test-sab4z-driver [NODE]`. Without `NODE`, `SAB4Z_NODE` or the
//! default node path is used.

use std::process::ExitCode;

use anyhow::{Context, Result};
use libsab4z::Client;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Value written into the general-purpose register.
const SECRET: u32 = 0x1234_5678;

fn print_registers(client: &Client) -> Result<()> {
    let status = client.read_status().context("reading status register")?;
    println!("status register : 0x{status:08x}");
    let gp = client
        .read_general_purpose()
        .context("reading general purpose register")?;
    println!("General purpose register : 0x{gp:08x}");
    Ok(())
}

fn run(client: &Client) -> Result<()> {
    print_registers(client)?;

    println!("writing some ultra secret code in General purpose register...");
    client
        .write_general_purpose(SECRET)
        .context("writing general purpose register")?;

    print_registers(client)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let client = std::env::args_os()
        .nth(1)
        .map_or_else(Client::from_env, Client::new);

    match run(&client) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(node = %client.path().display(), "{e:#}");
            ExitCode::FAILURE
        }
    }
}
