// Licensed under the Apache-2.0 license

//! Extended interrupt and event controller.

use tock_registers::register_bitfields;

pub const SECCFGR: usize = 0x014;
pub const PRIVCFGR: usize = 0x018;
pub const SEC_PRIV_BANK_STRIDE: usize = 0x20;
pub const ENCIDCFGR: usize = 0x180;
pub const ENCIDCFGR_STRIDE: usize = 0x4;
pub const CMCIDCFGR: usize = 0x300;
pub const CMCIDCFGR_STRIDE: usize = 0x4;
pub const HWCFGR1: usize = 0x3f0;

/// Events with a compartment filter.
pub const RIF_RESOURCES: u32 = 85;
/// Processors with a processor filter.
pub const MAX_CPUS: u32 = 3;

register_bitfields! [
    u32,

    pub HwCfgr1 [
        NBEVENTS OFFSET(0) NUMBITS(8) [],
        NBCPUS OFFSET(8) NUMBITS(4) [],
    ],
];
