// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Linux host platform.
//!
//! Runs the driver as a privileged user-space daemon:
//!
//! | Resource | Host rendition |
//! |----------|----------------|
//! | memory region | `flock` on `<run>/iomem/<base>-<len>.lock` |
//! | mapping | `mmap` of `/dev/mem` (or plain memory) |
//! | device number | dynamic major from the local-use range |
//! | char-dev registration | in-process table |
//! | class | directory `<run>/<class>` |
//! | device node | Unix socket `<run>/<class>/<name>` |
//!
//! Region claims are advisory locks, so two daemons on the same machine
//! cannot drive the same registers. The locks disappear with the process.


use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use tracing::{debug, warn};

use crate::config::Backend;
use crate::platform::{MemoryRegisters, Platform, RegisterIo};
use crate::types::{ClassId, DevT, Paddr};

/// Dynamic majors are handed out from the "local/experimental use" range.
const MAJORS: core::ops::RangeInclusive<u32> = 240..=254;

/// Physical memory device.
const DEV_MEM: &str = "/dev/mem";

// =============================================================================
// /dev/mem mapping
// =============================================================================

/// A physical range mapped through `/dev/mem`.
pub struct DevMem {
    /// Start of the page-aligned mapping.
    map: NonNull<u8>,
    map_len: usize,
    /// Offset of the requested base within the mapping.
    offset: usize,
    len: usize,
}

// SAFETY: DevMem only hands out volatile loads and stores through &self.
// The mapping is device memory owned by this value until drop.
unsafe impl Send for DevMem {}

// SAFETY: see above; concurrent volatile accesses are serialised by the
// driver's request lock, and are well-defined for device memory anyway.
unsafe impl Sync for DevMem {}

impl DevMem {
    /// Map `len` bytes of physical memory starting at `base`.
    pub fn map(base: Paddr, len: usize) -> io::Result<Self> {
        // SAFETY: sysconf has no preconditions.
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let page = u64::try_from(page)
            .map_err(|_| io::Error::other("page size unavailable"))?;
        let aligned = base
            .align_down(page)
            .ok_or_else(|| io::Error::other("page size not a power of two"))?;

        let offset = usize::try_from(base.as_u64() - aligned.as_u64())
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        let map_len = offset
            .checked_add(len)
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;
        let file_offset = libc::off_t::try_from(aligned.as_u64())
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(DEV_MEM)?;

        // SAFETY: a fresh shared mapping of an open descriptor; the kernel
        // picks the address. The descriptor may be closed afterwards.
        let ptr = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        let map = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap returned null"))?;

        debug!(%base, len, map_len, "mapped /dev/mem");
        Ok(Self {
            map,
            map_len,
            offset,
            len,
        })
    }

    /// Pointer to a naturally aligned `T` at `offset`, if it lies inside
    /// the window.
    fn slot<T>(&self, offset: usize) -> Option<*mut T> {
        let size = size_of::<T>();
        let end = offset.checked_add(size)?;
        if end > self.len || !offset.is_multiple_of(size) {
            return None;
        }
        // SAFETY: self.offset + offset + size <= map_len, so the result
        // stays inside the mapping.
        let ptr = unsafe { self.map.as_ptr().add(self.offset + offset) };
        Some(ptr.cast::<T>())
    }

    // Safe entry points: an out-of-range offset reads as zero and drops
    // the store instead of touching memory outside the window.
    fn load<T: Default>(&self, offset: usize) -> T {
        self.slot::<T>(offset).map_or_else(T::default, |ptr| {
            // SAFETY: slot() checked bounds; the mapping is live until drop.
            unsafe { ptr.read_volatile() }
        })
    }

    fn store<T>(&self, offset: usize, value: T) {
        if let Some(ptr) = self.slot::<T>(offset) {
            // SAFETY: slot() checked bounds; the mapping is live until drop.
            unsafe { ptr.write_volatile(value) }
        }
    }
}

impl Drop for DevMem {
    fn drop(&mut self) {
        // SAFETY: map/map_len describe exactly the mapping made in map().
        let rc = unsafe { libc::munmap(self.map.as_ptr().cast(), self.map_len) };
        if rc != 0 {
            warn!(error = %io::Error::last_os_error(), "munmap failed");
        }
    }
}

impl RegisterIo for DevMem {
    fn len(&self) -> usize {
        self.len
    }

    fn read8(&self, offset: usize) -> u8 {
        self.load(offset)
    }

    fn read16(&self, offset: usize) -> u16 {
        self.load(offset)
    }

    fn read32(&self, offset: usize) -> u32 {
        self.load(offset)
    }

    fn write8(&self, offset: usize, value: u8) {
        self.store(offset, value);
    }

    fn write16(&self, offset: usize, value: u16) {
        self.store(offset, value);
    }

    fn write32(&self, offset: usize, value: u32) {
        self.store(offset, value);
    }
}

/// Register mapping on the host.
pub enum HostIo {
    /// Real registers through `/dev/mem`.
    DevMem(DevMem),
    /// Plain memory.
    Memory(MemoryRegisters),
}

impl HostIo {
    fn inner(&self) -> &dyn RegisterIo {
        match self {
            Self::DevMem(io) => io,
            Self::Memory(io) => io,
        }
    }
}

impl RegisterIo for HostIo {
    fn len(&self) -> usize {
        self.inner().len()
    }

    fn read8(&self, offset: usize) -> u8 {
        self.inner().read8(offset)
    }

    fn read16(&self, offset: usize) -> u16 {
        self.inner().read16(offset)
    }

    fn read32(&self, offset: usize) -> u32 {
        self.inner().read32(offset)
    }

    fn write8(&self, offset: usize, value: u8) {
        self.inner().write8(offset, value);
    }

    fn write16(&self, offset: usize, value: u16) {
        self.inner().write16(offset, value);
    }

    fn write32(&self, offset: usize, value: u32) {
        self.inner().write32(offset, value);
    }

    fn read_barrier(&self) {
        self.inner().read_barrier();
    }

    fn write_barrier(&self) {
        self.inner().write_barrier();
    }
}

// =============================================================================
// Platform
// =============================================================================

/// Published device node: a listening Unix socket.
pub struct HostNode {
    listener: UnixListener,
    path: PathBuf,
    devt: DevT,
}

impl HostNode {
    /// The listening socket clients connect to.
    #[must_use]
    pub const fn listener(&self) -> &UnixListener {
        &self.listener
    }

    /// Filesystem path of the node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device number behind the node.
    #[must_use]
    pub const fn devt(&self) -> DevT {
        self.devt
    }
}

struct Claim {
    base: Paddr,
    len: u64,
    /// Holds the lock; closing it releases the claim.
    _lock: File,
}

/// Linux host platform.
pub struct HostPlatform {
    run_dir: PathBuf,
    backend: Backend,
    claims: Vec<Claim>,
    cdevs: Vec<DevT>,
    classes: Vec<(ClassId, PathBuf)>,
    next_major: u32,
    next_class: u32,
}

impl HostPlatform {
    /// A platform rooted at `run_dir`.
    #[must_use]
    pub fn new(run_dir: impl Into<PathBuf>, backend: Backend) -> Self {
        Self {
            run_dir: run_dir.into(),
            backend,
            claims: Vec::new(),
            cdevs: Vec::new(),
            classes: Vec::new(),
            next_major: *MAJORS.start(),
            next_class: 1,
        }
    }

    /// Directory the class directories live in.
    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    fn class_dir(&self, class: ClassId) -> Option<&Path> {
        self.classes
            .iter()
            .find(|(id, _)| *id == class)
            .map(|(_, dir)| dir.as_path())
    }
}

fn flock_exclusive(file: &File) -> io::Result<()> {
    // SAFETY: flock on a descriptor we own; no memory is passed.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                "range claimed by another process",
            ));
        }
        return Err(err);
    }
    Ok(())
}

impl Platform for HostPlatform {
    type Io = HostIo;
    type Node = HostNode;
    type Error = io::Error;

    fn request_mem_region(&mut self, base: Paddr, len: u64, owner: &str) -> io::Result<()> {
        if let Some(claim) = self.claims.iter().find(|c| base.overlaps(len, c.base, c.len)) {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("overlaps claim at {}", claim.base),
            ));
        }

        let dir = self.run_dir.join("iomem");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{:x}-{len:x}.lock", base.as_u64()));
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        flock_exclusive(&lock)?;

        debug!(%base, len, owner, lock = %path.display(), "claimed region");
        self.claims.push(Claim {
            base,
            len,
            _lock: lock,
        });
        Ok(())
    }

    fn release_mem_region(&mut self, base: Paddr, len: u64) {
        self.claims.retain(|c| !(c.base == base && c.len == len));
    }

    fn ioremap(&mut self, base: Paddr, len: u64) -> io::Result<HostIo> {
        let len = usize::try_from(len).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        match self.backend {
            Backend::DevMem => DevMem::map(base, len).map(HostIo::DevMem),
            Backend::Memory => Ok(HostIo::Memory(MemoryRegisters::new(len))),
        }
    }

    fn iounmap(&mut self, io: HostIo) {
        drop(io);
    }

    fn alloc_chrdev_region(&mut self, name: &str) -> io::Result<DevT> {
        if !MAJORS.contains(&self.next_major) {
            return Err(io::Error::other("no free major number"));
        }
        let devt = DevT::new(self.next_major, 0)
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?;
        self.next_major += 1;
        debug!(%devt, name, "allocated device number");
        Ok(devt)
    }

    fn unregister_chrdev_region(&mut self, devt: DevT) {
        debug!(%devt, "released device number");
    }

    fn cdev_add(&mut self, devt: DevT) -> io::Result<()> {
        if self.cdevs.contains(&devt) {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists));
        }
        self.cdevs.push(devt);
        Ok(())
    }

    fn cdev_del(&mut self, devt: DevT) {
        self.cdevs.retain(|d| *d != devt);
    }

    fn class_create(&mut self, name: &str) -> io::Result<ClassId> {
        let dir = self.run_dir.join(name);
        fs::create_dir_all(&dir)?;
        let class = ClassId::new(self.next_class);
        self.next_class += 1;
        self.classes.push((class, dir));
        Ok(class)
    }

    fn class_destroy(&mut self, class: ClassId) {
        if let Some(index) = self.classes.iter().position(|(id, _)| *id == class) {
            let (_, dir) = self.classes.remove(index);
            if let Err(e) = fs::remove_dir(&dir) {
                warn!(dir = %dir.display(), error = %e, "could not remove class directory");
            }
        }
    }

    fn device_create(
        &mut self,
        class: ClassId,
        devt: DevT,
        name: &str,
    ) -> io::Result<HostNode> {
        let dir = self
            .class_dir(class)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let path = dir.join(name);

        // A node left behind by a crashed daemon
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale node"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let listener = UnixListener::bind(&path)?;
        debug!(path = %path.display(), %devt, "created device node");
        Ok(HostNode {
            listener,
            path,
            devt,
        })
    }

    fn device_destroy(&mut self, _class: ClassId, node: HostNode) {
        let HostNode { listener, path, .. } = node;
        drop(listener);
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not remove device node");
        }
    }
}
