// Licensed under the Apache-2.0 license

//! High-performance DMA channel filters.

use tock_registers::register_bitfields;

pub const SECCFGR: usize = 0x00;
pub const PRIVCFGR: usize = 0x04;
pub const RCFGLOCKR: usize = 0x08;
pub const CIDCFGR: usize = 0x54;
pub const SEMCR: usize = 0x58;
pub const CHANNEL_STRIDE: usize = 0x80;

pub const RIF_RESOURCES: u32 = 16;

register_bitfields! [
    u32,

    /// Channel compartment filter; narrower than the generic layout
    pub CidCfgr [
        CFEN OFFSET(0) NUMBITS(1) [],
        SEMEN OFFSET(1) NUMBITS(1) [],
        SCID OFFSET(4) NUMBITS(2) [],
        SEMWLC OFFSET(16) NUMBITS(3) [],
    ],
];

/// Every bit `CidCfgr` defines.
pub const CIDCFGR_MASK: u32 = 0x0007_0033;
