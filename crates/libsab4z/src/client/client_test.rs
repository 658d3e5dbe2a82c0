// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the one-shot client.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn keeps_path() {
    let client = Client::new("/tmp/sab4z-test/node");
    assert_eq!(client.path(), Path::new("/tmp/sab4z-test/node"));
    assert_eq!(client.clone(), client);
}

#[test]
fn missing_node_fails_every_call() {
    let client = Client::new("/nonexistent/sab4z/node");
    assert!(matches!(client.read_status(), Err(ClientError::Io(_))));
    assert!(matches!(
        client.read_general_purpose(),
        Err(ClientError::Io(_))
    ));
    assert!(matches!(
        client.write_general_purpose(0x1234_5678),
        Err(ClientError::Io(_))
    ));
}
