// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Daemon configuration.
//!
//! Settings come from command-line flags, then `SAB4Z_*` environment
//! variables, then defaults. Parsing is a pure function over the argument
//! list and an environment lookup, so it can be tested without touching
//! the process environment.
//!
//! | Flag | Variable | Default |
//! |------|----------|---------|
//! | `--dtb PATH` | `SAB4Z_DTB` | `/sys/firmware/fdt` |
//! | `--base ADDR` | `SAB4Z_BASE` | (from the device tree) |
//! | `--len BYTES` | `SAB4Z_LEN` | (from the device tree) |
//! | `--run-dir DIR` | `SAB4Z_RUN_DIR` | `/run` |
//! | `--backend devmem\|memory` | `SAB4Z_BACKEND` | `devmem` |
//! | `--composite-order ORDER` | `SAB4Z_COMPOSITE_ORDER` | `status-low` |
//!
//! `--base` and `--len` go together and take precedence over the device
//! tree. Numbers accept a `0x` prefix.


use core::fmt;
use std::path::PathBuf;

use crate::binding::PlatformBinding;
use crate::stream::CompositeOrder;
use crate::types::Paddr;

/// Device tree blob exported by the running kernel.
pub const DEFAULT_DTB: &str = "/sys/firmware/fdt";

/// Parent of the class directory.
pub const DEFAULT_RUN_DIR: &str = "/run";

/// Where the register window comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingSource {
    /// Search a device tree blob for the compatible node.
    Dtb(PathBuf),
    /// Use a fixed range.
    Fixed(PlatformBinding),
}

/// What backs the register mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Map the physical range through `/dev/mem`.
    #[default]
    DevMem,
    /// Plain memory, for running without the hardware.
    Memory,
}

impl Backend {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "devmem" => Some(Self::DevMem),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Daemon settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Source of the platform binding.
    pub binding: BindingSource,
    /// Parent of the class directory holding the node.
    pub run_dir: PathBuf,
    /// Register backend.
    pub backend: Backend,
    /// Stream-read composite layout.
    pub composite_order: CompositeOrder,
}

/// Configuration error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Flag not recognised.
    UnknownFlag(String),
    /// Flag given without its value.
    MissingValue(String),
    /// Value does not parse.
    InvalidValue {
        /// Flag or variable name.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Only one of `--base` and `--len` was given.
    IncompleteRange,
    /// `--help` was requested.
    HelpRequested,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "unknown flag `{flag}`"),
            Self::MissingValue(flag) => write!(f, "`{flag}` needs a value"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::IncompleteRange => f.write_str("--base and --len must be given together"),
            Self::HelpRequested => f.write_str(USAGE),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command-line usage.
pub const USAGE: &str = "\
usage: sab4zd [--dtb PATH | --base ADDR --len BYTES] [--run-dir DIR]
              [--backend devmem|memory] [--composite-order status-low|status-high]";

#[derive(Default)]
struct Raw {
    dtb: Option<String>,
    base: Option<String>,
    len: Option<String>,
    run_dir: Option<String>,
    backend: Option<String>,
    composite_order: Option<String>,
}

impl DaemonConfig {
    /// Build the configuration from the process arguments and environment.
    pub fn from_process() -> Result<Self, ConfigError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Build the configuration from `args` (without the program name) and
    /// an environment lookup.
    pub fn parse<I, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut raw = Raw::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let slot = match flag.as_str() {
                "--dtb" => Some(&mut raw.dtb),
                "--base" => Some(&mut raw.base),
                "--len" => Some(&mut raw.len),
                "--run-dir" => Some(&mut raw.run_dir),
                "--backend" => Some(&mut raw.backend),
                "--composite-order" => Some(&mut raw.composite_order),
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                _ => None,
            };
            let Some(slot) = slot else {
                return Err(ConfigError::UnknownFlag(flag));
            };
            match args.next() {
                Some(value) => *slot = Some(value),
                None => return Err(ConfigError::MissingValue(flag)),
            }
        }

        let pick = |value: Option<String>, key: &str| value.or_else(|| env(key));
        let dtb = pick(raw.dtb, "SAB4Z_DTB");
        let base = pick(raw.base, "SAB4Z_BASE");
        let len = pick(raw.len, "SAB4Z_LEN");
        let run_dir = pick(raw.run_dir, "SAB4Z_RUN_DIR");
        let backend = pick(raw.backend, "SAB4Z_BACKEND");
        let order = pick(raw.composite_order, "SAB4Z_COMPOSITE_ORDER");

        let binding = match (base, len) {
            (Some(base), Some(len)) => BindingSource::Fixed(PlatformBinding::new(
                Paddr::new(parse_number("base", &base)?),
                parse_number("len", &len)?,
            )),
            (None, None) => {
                BindingSource::Dtb(dtb.map_or_else(|| PathBuf::from(DEFAULT_DTB), PathBuf::from))
            }
            _ => return Err(ConfigError::IncompleteRange),
        };

        let backend = match backend {
            Some(value) => Backend::parse(&value).ok_or_else(|| invalid("backend", value))?,
            None => Backend::default(),
        };

        let composite_order = match order {
            Some(value) => value
                .parse::<CompositeOrder>()
                .map_err(|_| invalid("composite-order", value))?,
            None => CompositeOrder::default(),
        };

        Ok(Self {
            binding,
            run_dir: run_dir.map_or_else(|| PathBuf::from(DEFAULT_RUN_DIR), PathBuf::from),
            backend,
            composite_order,
        })
    }
}

fn invalid(key: &str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value,
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => value.replace('_', "").parse(),
    };
    parsed.map_err(|_| invalid(key, value.into()))
}
