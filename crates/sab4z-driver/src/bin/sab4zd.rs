// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! SAB4Z daemon.
//!
//! Probes the device on the Linux host platform, serves the device node
//! until SIGINT or SIGTERM, then removes the device.

use std::fs;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use sab4z_driver::config::{BindingSource, ConfigError, DaemonConfig};
use sab4z_driver::platform::HostPlatform;
use sab4z_driver::{DriverConfig, PlatformBinding, Sab4z, server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::Release);
}

fn install_signal_handlers() -> Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is
        // async-signal-safe.
        let previous = unsafe { libc::signal(signal, on_signal as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error()).context("installing signal handler");
        }
    }
    Ok(())
}

fn binding(source: &BindingSource) -> Result<PlatformBinding> {
    match source {
        BindingSource::Fixed(binding) => Ok(*binding),
        BindingSource::Dtb(path) => {
            let blob = fs::read(path)
                .with_context(|| format!("reading device tree {}", path.display()))?;
            PlatformBinding::from_fdt(&blob)
                .with_context(|| format!("no SAB4Z node in {}", path.display()))
        }
    }
}

fn run(config: &DaemonConfig) -> Result<()> {
    install_signal_handlers()?;

    let binding = binding(&config.binding)?;
    let platform = HostPlatform::new(&config.run_dir, config.backend);
    let driver = Sab4z::probe(
        platform,
        &binding,
        DriverConfig {
            composite_order: config.composite_order,
        },
    )
    .context("probing SAB4Z")?;

    let node = driver.identity().node();
    info!(path = %node.path().display(), backend = ?config.backend, "device node ready");

    let served = server::serve(&driver, node.listener(), &SHUTDOWN);
    drop(driver.remove());
    served.context("serving device node")
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match DaemonConfig::from_process() {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{}", sab4z_driver::config::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("sab4zd: {e}\n{}", sab4z_driver::config::USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
