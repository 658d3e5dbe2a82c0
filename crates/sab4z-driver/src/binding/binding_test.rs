// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for platform binding discovery.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

const FDT_MAGIC: u32 = 0xD00D_FEED;
const FDT_BEGIN_NODE: u32 = 1;
const FDT_END_NODE: u32 = 2;
const FDT_PROP: u32 = 3;
const FDT_END: u32 = 9;

/// Header (40 bytes) plus an empty reservation map (16 bytes).
const STRUCT_OFFSET: usize = 56;

/// Minimal device tree builder: a root with 32-bit cells and one child.
struct DtbBuilder {
    structure: Vec<u8>,
    strings: Vec<u8>,
}

impl DtbBuilder {
    fn new() -> Self {
        Self {
            structure: Vec::new(),
            strings: Vec::new(),
        }
    }

    fn token(&mut self, token: u32) {
        self.structure.extend_from_slice(&token.to_be_bytes());
    }

    fn pad(&mut self) {
        while !self.structure.len().is_multiple_of(4) {
            self.structure.push(0);
        }
    }

    fn begin_node(&mut self, name: &str) {
        self.token(FDT_BEGIN_NODE);
        self.structure.extend_from_slice(name.as_bytes());
        self.structure.push(0);
        self.pad();
    }

    fn end_node(&mut self) {
        self.token(FDT_END_NODE);
    }

    fn prop(&mut self, name: &str, value: &[u8]) {
        let nameoff = u32::try_from(self.strings.len()).unwrap();
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);

        self.token(FDT_PROP);
        self.token(u32::try_from(value.len()).unwrap());
        self.token(nameoff);
        self.structure.extend_from_slice(value);
        self.pad();
    }

    fn prop_u32s(&mut self, name: &str, cells: &[u32]) {
        let value: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.prop(name, &value);
    }

    fn finish(mut self) -> Vec<u8> {
        self.token(FDT_END);

        let strings_offset = STRUCT_OFFSET + self.structure.len();
        let total = strings_offset + self.strings.len();
        let header = [
            FDT_MAGIC,
            u32::try_from(total).unwrap(),
            u32::try_from(STRUCT_OFFSET).unwrap(),
            u32::try_from(strings_offset).unwrap(),
            40, // off_mem_rsvmap
            17, // version
            16, // last_comp_version
            0,  // boot_cpuid_phys
            u32::try_from(self.strings.len()).unwrap(),
            u32::try_from(self.structure.len()).unwrap(),
        ];

        let mut blob: Vec<u8> = header.iter().flat_map(|w| w.to_be_bytes()).collect();
        blob.extend_from_slice(&[0; 16]);
        blob.extend_from_slice(&self.structure);
        blob.extend_from_slice(&self.strings);
        blob
    }
}

fn tree(compatible: &[u8], reg: Option<&[u32]>) -> Vec<u8> {
    let mut dtb = DtbBuilder::new();
    dtb.begin_node("");
    dtb.prop_u32s("#address-cells", &[1]);
    dtb.prop_u32s("#size-cells", &[1]);
    dtb.begin_node("sab4z@43c00000");
    dtb.prop("compatible", compatible);
    if let Some(reg) = reg {
        dtb.prop_u32s("reg", reg);
    }
    dtb.end_node();
    dtb.end_node();
    dtb.finish()
}

#[test]
fn finds_compatible_node() {
    let blob = tree(b"tpt,sab4z\0", Some(&[0x43C0_0000, 0x8]));
    let binding = PlatformBinding::from_fdt(&blob).unwrap();
    assert_eq!(binding.base(), Paddr::new(0x43C0_0000));
    assert_eq!(binding.len(), 8);
    assert!(!binding.is_empty());
}

#[test]
fn matches_any_entry_of_compatible_list() {
    let blob = tree(b"xlnx,generic\0tpt,sab4z\0", Some(&[0x8000_0000, 0x1000]));
    let binding = PlatformBinding::from_fdt(&blob).unwrap();
    assert_eq!(binding, PlatformBinding::new(Paddr::new(0x8000_0000), 0x1000));
}

#[test]
fn no_compatible_node() {
    let blob = tree(b"acme,other\0", Some(&[0x43C0_0000, 0x8]));
    assert_eq!(
        PlatformBinding::from_fdt(&blob),
        Err(Sab4zError::NoResource)
    );
}

#[test]
fn node_without_reg() {
    let blob = tree(b"tpt,sab4z\0", None);
    assert_eq!(
        PlatformBinding::from_fdt(&blob),
        Err(Sab4zError::NoResource)
    );
}

#[test]
fn garbage_blob() {
    assert_eq!(
        PlatformBinding::from_fdt(&[0u8; 64]),
        Err(Sab4zError::NoResource)
    );
    assert_eq!(PlatformBinding::from_fdt(&[]), Err(Sab4zError::NoResource));
}

#[test]
fn display() {
    let binding = PlatformBinding::new(Paddr::new(0x43C0_0000), 8);
    assert_eq!(binding.to_string(), "0x43c00000+0x8");
}
