// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for device node publication.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::platform::{LedgerEvent, MemoryRegisters, MockPlatform, Resource};

fn platform() -> MockPlatform {
    MockPlatform::new(MemoryRegisters::new(8))
}

#[test]
fn publish_then_withdraw_in_reverse() {
    let mut platform = platform();
    let identity = publish(&mut platform).unwrap();
    assert_eq!(identity.node().name(), "sab4z");
    assert_eq!(identity.node().devt(), identity.devt());
    assert_eq!(identity.node().class(), identity.class());

    withdraw(&mut platform, identity);
    assert_eq!(
        platform.ledger().events(),
        vec![
            LedgerEvent::Acquired(Resource::ChrdevRegion),
            LedgerEvent::Acquired(Resource::Cdev),
            LedgerEvent::Acquired(Resource::Class),
            LedgerEvent::Acquired(Resource::Node),
            LedgerEvent::Released(Resource::Node),
            LedgerEvent::Released(Resource::Class),
            LedgerEvent::Released(Resource::Cdev),
            LedgerEvent::Released(Resource::ChrdevRegion),
        ]
    );
}

#[test]
fn each_failing_step_unwinds_completed_steps() {
    let steps = [
        (Resource::ChrdevRegion, Sab4zError::AllocFailed),
        (Resource::Cdev, Sab4zError::RegisterFailed),
        (Resource::Class, Sab4zError::AllocFailed),
        (Resource::Node, Sab4zError::RegisterFailed),
    ];

    for (index, (step, expected)) in steps.into_iter().enumerate() {
        let mut platform = platform().fail_at(step);
        assert_eq!(publish(&mut platform).err(), Some(expected), "{step}");

        let ledger = platform.ledger();
        assert!(ledger.is_balanced(), "{step}: {:?}", ledger.outstanding());

        // Completed steps were released newest first
        let completed: Vec<_> = steps[..index].iter().map(|(r, _)| *r).collect();
        let released: Vec<_> = ledger
            .events()
            .into_iter()
            .filter_map(|e| match e {
                LedgerEvent::Released(r) => Some(r),
                LedgerEvent::Acquired(_) => None,
            })
            .collect();
        let mut reversed = completed;
        reversed.reverse();
        assert_eq!(released, reversed, "{step}");
    }
}

#[test]
fn lifecycle_state_display() {
    assert_eq!(LifecycleState::default(), LifecycleState::Unregistered);
    assert_eq!(LifecycleState::ClaimedWindow.to_string(), "claimed-window");
    assert_eq!(LifecycleState::NodePublished.to_string(), "node-published");
}
