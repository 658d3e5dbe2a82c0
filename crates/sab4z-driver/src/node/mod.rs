// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Device node publication.
//!
//! Publishing takes four steps, each of which acquires one resource:
//!
//! | Step | Resource | Failure |
//! |------|----------|---------|
//! | 1 | device number (dynamic major) | `AllocFailed` |
//! | 2 | char-dev registration | `RegisterFailed` |
//! | 3 | device class | `AllocFailed` |
//! | 4 | device node | `RegisterFailed` |
//!
//! A failing step releases exactly the resources of the steps before it,
//! newest first. The node is the last thing created, so clients never see
//! a half-published device.

#[cfg(test)]
mod node_test;

use core::fmt;

use sab4z_abi::Sab4zError;
use sab4z_abi::registers::{CLASS_NAME, NODE_NAME};
use tracing::{debug, error};

use crate::platform::Platform;
use crate::types::{ClassId, DevT};

/// Where the driver is in its attach/detach cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing acquired.
    #[default]
    Unregistered,
    /// Register window claimed and mapped.
    ClaimedWindow,
    /// Device node visible to clients.
    NodePublished,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unregistered => "unregistered",
            Self::ClaimedWindow => "claimed-window",
            Self::NodePublished => "node-published",
        })
    }
}

/// Everything a published device holds.
#[derive(Debug)]
pub struct DeviceIdentity<N> {
    devt: DevT,
    class: ClassId,
    node: N,
}

impl<N> DeviceIdentity<N> {
    /// Device number.
    #[must_use]
    pub const fn devt(&self) -> DevT {
        self.devt
    }

    /// Device class.
    #[must_use]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    /// The published node.
    #[must_use]
    pub const fn node(&self) -> &N {
        &self.node
    }
}

/// Resources held part-way through [`publish`].
enum Acquired {
    Number(DevT),
    Cdev(DevT),
    Class(DevT, ClassId),
}

impl Acquired {
    /// Release in reverse order of acquisition.
    fn rollback<P: Platform>(self, platform: &mut P) {
        let devt = match self {
            Self::Class(devt, class) => {
                platform.class_destroy(class);
                platform.cdev_del(devt);
                devt
            }
            Self::Cdev(devt) => {
                platform.cdev_del(devt);
                devt
            }
            Self::Number(devt) => devt,
        };
        platform.unregister_chrdev_region(devt);
    }
}

/// Publish the device node.
pub fn publish<P: Platform>(platform: &mut P) -> Result<DeviceIdentity<P::Node>, Sab4zError> {
    let devt = platform.alloc_chrdev_region(CLASS_NAME).map_err(|e| {
        error!(error = %e, "couldn't allocate major number");
        Sab4zError::AllocFailed
    })?;

    if let Err(e) = platform.cdev_add(devt) {
        error!(%devt, error = %e, "couldn't add the cdev structure");
        Acquired::Number(devt).rollback(platform);
        return Err(Sab4zError::RegisterFailed);
    }

    let class = match platform.class_create(CLASS_NAME) {
        Ok(class) => class,
        Err(e) => {
            error!(error = %e, "couldn't create a class");
            Acquired::Cdev(devt).rollback(platform);
            return Err(Sab4zError::AllocFailed);
        }
    };

    let node = match platform.device_create(class, devt, NODE_NAME) {
        Ok(node) => node,
        Err(e) => {
            error!(%devt, error = %e, "error in device create");
            Acquired::Class(devt, class).rollback(platform);
            return Err(Sab4zError::RegisterFailed);
        }
    };

    debug!(%devt, %class, name = NODE_NAME, "published device node");
    Ok(DeviceIdentity { devt, class, node })
}

/// Withdraw a published node and release everything behind it.
pub fn withdraw<P: Platform>(platform: &mut P, identity: DeviceIdentity<P::Node>) {
    let DeviceIdentity { devt, class, node } = identity;
    platform.device_destroy(class, node);
    Acquired::Class(devt, class).rollback(platform);
    debug!(%devt, "withdrew device node");
}
