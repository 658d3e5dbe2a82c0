// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock platform for testing.
//!
//! Backs the register window with [`MemoryRegisters`] and keeps a
//! [`Ledger`] of every acquisition and release, so tests can check that a
//! probe/remove cycle (or a failed probe) leaves nothing behind and that
//! teardown runs in reverse order.
//!
//! Any acquisition step can be told to fail with [`MockPlatform::fail_at`].
//! Clones share all state: two drivers probed on clones of one platform
//! compete for the same address ranges, and a test can keep a clone to
//! inspect the ledger after the driver has consumed its own.

use core::fmt;
use std::string::{String, ToString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use crate::types::{ClassId, DevT, Paddr};

use super::memory::MemoryRegisters;
use super::traits::{Platform, RegisterIo};

/// First major number handed out, the start of the "local use" range.
const FIRST_MAJOR: u32 = 240;

/// A resource kind tracked by the ledger, in acquisition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Physical address range claim.
    MemRegion,
    /// Register mapping.
    Mapping,
    /// Device number.
    ChrdevRegion,
    /// Char-dev registration.
    Cdev,
    /// Device class.
    Class,
    /// Published device node.
    Node,
}

impl Resource {
    /// Every resource, in the order a successful probe acquires them.
    pub const ALL: [Self; 6] = [
        Self::MemRegion,
        Self::Mapping,
        Self::ChrdevRegion,
        Self::Cdev,
        Self::Class,
        Self::Node,
    ];

    /// Short name for log and assertion messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MemRegion => "mem-region",
            Self::Mapping => "mapping",
            Self::ChrdevRegion => "chrdev-region",
            Self::Cdev => "cdev",
            Self::Class => "class",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// The resource was handed out.
    Acquired(Resource),
    /// The resource was given back.
    Released(Resource),
}

/// Ordered record of acquisitions and releases.
#[derive(Clone, Default)]
pub struct Ledger {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl Ledger {
    fn lock(&self) -> MutexGuard<'_, Vec<LedgerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: LedgerEvent) {
        self.lock().push(event);
    }

    /// All events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.lock().clone()
    }

    /// How many times `resource` was acquired.
    #[must_use]
    pub fn acquired(&self, resource: Resource) -> usize {
        self.count(LedgerEvent::Acquired(resource))
    }

    /// How many times `resource` was released.
    #[must_use]
    pub fn released(&self, resource: Resource) -> usize {
        self.count(LedgerEvent::Released(resource))
    }

    fn count(&self, event: LedgerEvent) -> usize {
        self.lock().iter().filter(|e| **e == event).count()
    }

    /// Resources acquired more often than released.
    #[must_use]
    pub fn outstanding(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|r| self.acquired(*r) > self.released(*r))
            .collect()
    }

    /// Every acquisition has a matching release.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        Resource::ALL
            .into_iter()
            .all(|r| self.acquired(r) == self.released(r))
    }
}

/// Failure reported by the mock platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// Failure injected with [`MockPlatform::fail_at`].
    Injected(Resource),
    /// The range overlaps an existing claim.
    Conflict {
        /// Base of the existing claim.
        base: Paddr,
        /// Length of the existing claim.
        len: u64,
    },
    /// The mapping is larger than the backing register file.
    TooLarge(u64),
    /// No major numbers left.
    Exhausted,
    /// The device number is already registered.
    Duplicate(DevT),
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Injected(resource) => write!(f, "injected failure at {resource}"),
            Self::Conflict { base, len } => {
                write!(f, "range overlaps claim at {base} (+{len:#x})")
            }
            Self::TooLarge(len) => write!(f, "mapping of {len:#x} bytes exceeds register file"),
            Self::Exhausted => f.write_str("no free major number"),
            Self::Duplicate(devt) => write!(f, "device {devt} already registered"),
        }
    }
}

/// Device node published by the mock platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    devt: DevT,
    class: ClassId,
    name: String,
}

impl MockNode {
    /// Device number behind the node.
    #[must_use]
    pub const fn devt(&self) -> DevT {
        self.devt
    }

    /// Class the node belongs to.
    #[must_use]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct MockState {
    fail_at: Option<Resource>,
    claims: Vec<(Paddr, u64)>,
    cdevs: Vec<DevT>,
    next_major: u32,
    next_class: u32,
}

/// In-process platform with fault injection and resource accounting.
#[derive(Clone)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
    ledger: Ledger,
    registers: MemoryRegisters,
}

impl MockPlatform {
    /// Create a mock platform whose mappings are backed by `registers`.
    #[must_use]
    pub fn new(registers: MemoryRegisters) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                fail_at: None,
                claims: Vec::new(),
                cdevs: Vec::new(),
                next_major: FIRST_MAJOR,
                next_class: 1,
            })),
            ledger: Ledger::default(),
            registers,
        }
    }

    /// Make the acquisition of `resource` fail.
    #[must_use]
    pub fn fail_at(self, resource: Resource) -> Self {
        self.set_fail_at(Some(resource));
        self
    }

    /// Change (or clear) the injected failure.
    pub fn set_fail_at(&self, resource: Option<Resource>) {
        self.state().fail_at = resource;
    }

    /// The shared acquisition ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The register file behind every mapping.
    #[must_use]
    pub const fn registers(&self) -> &MemoryRegisters {
        &self.registers
    }

    /// Currently claimed address ranges.
    #[must_use]
    pub fn claims(&self) -> Vec<(Paddr, u64)> {
        self.state().claims.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, resource: Resource) -> Result<(), MockError> {
        if self.state().fail_at == Some(resource) {
            return Err(MockError::Injected(resource));
        }
        Ok(())
    }

    fn acquired(&self, resource: Resource) {
        self.ledger.push(LedgerEvent::Acquired(resource));
    }

    fn released(&self, resource: Resource) {
        self.ledger.push(LedgerEvent::Released(resource));
    }
}

impl Platform for MockPlatform {
    type Io = MemoryRegisters;
    type Node = MockNode;
    type Error = MockError;

    fn request_mem_region(
        &mut self,
        base: Paddr,
        len: u64,
        _owner: &str,
    ) -> Result<(), MockError> {
        self.check(Resource::MemRegion)?;
        {
            let mut state = self.state();
            if let Some(&(claimed, claimed_len)) = state
                .claims
                .iter()
                .find(|(b, l)| base.overlaps(len, *b, *l))
            {
                return Err(MockError::Conflict {
                    base: claimed,
                    len: claimed_len,
                });
            }
            state.claims.push((base, len));
        }
        self.acquired(Resource::MemRegion);
        Ok(())
    }

    fn release_mem_region(&mut self, base: Paddr, len: u64) {
        {
            let mut state = self.state();
            if let Some(index) = state.claims.iter().position(|c| *c == (base, len)) {
                state.claims.remove(index);
            }
        }
        self.released(Resource::MemRegion);
    }

    fn ioremap(&mut self, _base: Paddr, len: u64) -> Result<MemoryRegisters, MockError> {
        self.check(Resource::Mapping)?;
        if !usize::try_from(len).is_ok_and(|len| len <= self.registers.len()) {
            return Err(MockError::TooLarge(len));
        }
        self.acquired(Resource::Mapping);
        Ok(self.registers.clone())
    }

    fn iounmap(&mut self, io: MemoryRegisters) {
        drop(io);
        self.released(Resource::Mapping);
    }

    fn alloc_chrdev_region(&mut self, _name: &str) -> Result<DevT, MockError> {
        self.check(Resource::ChrdevRegion)?;
        let devt = {
            let mut state = self.state();
            let devt = DevT::new(state.next_major, 0).ok_or(MockError::Exhausted)?;
            state.next_major += 1;
            devt
        };
        self.acquired(Resource::ChrdevRegion);
        Ok(devt)
    }

    fn unregister_chrdev_region(&mut self, _devt: DevT) {
        self.released(Resource::ChrdevRegion);
    }

    fn cdev_add(&mut self, devt: DevT) -> Result<(), MockError> {
        self.check(Resource::Cdev)?;
        {
            let mut state = self.state();
            if state.cdevs.contains(&devt) {
                return Err(MockError::Duplicate(devt));
            }
            state.cdevs.push(devt);
        }
        self.acquired(Resource::Cdev);
        Ok(())
    }

    fn cdev_del(&mut self, devt: DevT) {
        self.state().cdevs.retain(|d| *d != devt);
        self.released(Resource::Cdev);
    }

    fn class_create(&mut self, _name: &str) -> Result<ClassId, MockError> {
        self.check(Resource::Class)?;
        let class = {
            let mut state = self.state();
            let class = ClassId::new(state.next_class);
            state.next_class += 1;
            class
        };
        self.acquired(Resource::Class);
        Ok(class)
    }

    fn class_destroy(&mut self, _class: ClassId) {
        self.released(Resource::Class);
    }

    fn device_create(
        &mut self,
        class: ClassId,
        devt: DevT,
        name: &str,
    ) -> Result<MockNode, MockError> {
        self.check(Resource::Node)?;
        self.acquired(Resource::Node);
        Ok(MockNode {
            devt,
            class,
            name: name.to_string(),
        })
    }

    fn device_destroy(&mut self, _class: ClassId, node: MockNode) {
        drop(node);
        self.released(Resource::Node);
    }
}
