// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The driver context.
//!
//! [`Sab4z::probe`] runs the whole attach sequence (claim, map, publish)
//! and hands back an owned context; [`Sab4z::remove`] runs the detach
//! sequence and hands the platform back. A probe that fails part-way
//! releases everything it acquired before returning the error.
//!
//! Client requests go through an [`OpenFile`]. Every request holds the
//! context's lock from validation to the last register access, so two
//! clients never interleave inside one request.

#[cfg(test)]
mod driver_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use sab4z_abi::Sab4zError;
use tracing::{debug, info, warn};

use crate::binding::PlatformBinding;
use crate::dispatch;
use crate::node::{self, DeviceIdentity, LifecycleState};
use crate::platform::Platform;
use crate::stream::{self, CompositeOrder};
use crate::usercopy::{UserMutPtr, UserPtr};
use crate::window::{self, RegisterWindow};

/// Driver tunables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Layout of the stream-read composite.
    pub composite_order: CompositeOrder,
}

/// A probed SAB4Z device.
pub struct Sab4z<P: Platform> {
    platform: P,
    window: RegisterWindow<P::Io>,
    identity: DeviceIdentity<P::Node>,
    config: DriverConfig,
    state: LifecycleState,
    lock: Mutex<()>,
}

fn enter(from: LifecycleState, to: LifecycleState) -> LifecycleState {
    debug!(%from, %to, "lifecycle transition");
    to
}

impl<P: Platform> Sab4z<P> {
    /// Attach to the device described by `binding`.
    pub fn probe(
        mut platform: P,
        binding: &PlatformBinding,
        config: DriverConfig,
    ) -> Result<Self, Sab4zError> {
        let state = LifecycleState::Unregistered;

        let claim = window::acquire(&mut platform, binding)?;
        let io = match window::map(&mut platform, &claim) {
            Ok(io) => io,
            Err(e) => {
                window::release_claim(&mut platform, claim);
                return Err(e);
            }
        };
        let window = RegisterWindow::new(claim, io);
        let state = enter(state, LifecycleState::ClaimedWindow);

        let identity = match node::publish(&mut platform) {
            Ok(identity) => identity,
            Err(e) => {
                window::release(&mut platform, window);
                enter(state, LifecycleState::Unregistered);
                return Err(e);
            }
        };
        let state = enter(state, LifecycleState::NodePublished);

        info!(
            %binding,
            devt = %identity.devt(),
            order = %config.composite_order,
            "SAB4Z probed"
        );
        Ok(Self {
            platform,
            window,
            identity,
            config,
            state,
            lock: Mutex::new(()),
        })
    }

    /// Detach: withdraw the node, then unmap and release the window.
    pub fn remove(self) -> P {
        let Self {
            mut platform,
            window,
            identity,
            state,
            ..
        } = self;

        node::withdraw(&mut platform, identity);
        window::release(&mut platform, window);
        enter(state, LifecycleState::Unregistered);

        info!("SAB4Z removed");
        platform
    }

    /// Open the device. Always succeeds; no per-client state is kept.
    #[must_use]
    pub fn open(&self) -> OpenFile<'_, P> {
        debug!("open");
        OpenFile { driver: self }
    }

    /// The mapped register window.
    #[must_use]
    pub const fn window(&self) -> &RegisterWindow<P::Io> {
        &self.window
    }

    /// The published identity.
    #[must_use]
    pub const fn identity(&self) -> &DeviceIdentity<P::Node> {
        &self.identity
    }

    /// Driver tunables.
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Lifecycle state; `NodePublished` for as long as the context exists.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// The platform the device lives on.
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An open handle on the device node.
///
/// Dropping the handle is `close`.
pub struct OpenFile<'d, P: Platform> {
    driver: &'d Sab4z<P>,
}

impl<P: Platform> OpenFile<'_, P> {
    /// Control call: one typed register access described by the
    /// [`AccessRecord`](sab4z_abi::AccessRecord) in `arg`.
    pub fn ioctl(&self, cmd: u32, arg: &mut [u8]) -> Result<(), Sab4zError> {
        let _guard = self.driver.lock();
        dispatch::control_call(&self.driver.window, cmd, UserMutPtr::new(arg)).inspect_err(|e| {
            warn!(cmd = format_args!("{cmd:#x}"), error = %e, "control call failed");
        })
    }

    /// Stream read of the status/general-purpose composite.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, Sab4zError> {
        let _guard = self.driver.lock();
        stream::stream_read(
            &self.driver.window,
            self.driver.config.composite_order,
            UserMutPtr::new(buf),
        )
        .inspect_err(|e| warn!(len = buf.len(), error = %e, "read failed"))
    }

    /// Stream write to the general-purpose register.
    pub fn write(&self, buf: &[u8]) -> Result<usize, Sab4zError> {
        let _guard = self.driver.lock();
        stream::stream_write(&self.driver.window, UserPtr::new(buf))
            .inspect_err(|e| warn!(len = buf.len(), error = %e, "write failed"))
    }
}

impl<P: Platform> Drop for OpenFile<'_, P> {
    fn drop(&mut self) {
        debug!("release");
    }
}
