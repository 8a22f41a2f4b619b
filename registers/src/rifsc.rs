// Licensed under the Apache-2.0 license

//! RIF security controller.

use tock_registers::register_bitfields;

pub const SECCFGR0: usize = 0x10;
pub const PRIVCFGR0: usize = 0x30;
pub const RCFGLOCKR0: usize = 0x50;
pub const PERX_CIDCFGR: usize = 0x100;
pub const PERX_SEMCR: usize = 0x104;
pub const PERX_STRIDE: usize = 0x8;
pub const RIMC_ATTR0: usize = 0xc10;
pub const HWCFGR2: usize = 0xfec;
pub const HWCFGR1: usize = 0xff0;
pub const VERR: usize = 0xff4;

/// Upper bound on peripheral entries.
pub const MAX_RISUP: u32 = 128;
/// Upper bound on bus-master entries.
pub const MAX_RIMU: u32 = 16;

register_bitfields! [
    u32,

    pub HwCfgr1 [
        RIF_EN OFFSET(0) NUMBITS(4) [],
        SEC_EN OFFSET(4) NUMBITS(4) [],
        PRIV_EN OFFSET(8) NUMBITS(4) [],
    ],

    pub HwCfgr2 [
        NB_RISUP OFFSET(0) NUMBITS(16) [],
        NB_RIMU OFFSET(16) NUMBITS(8) [],
        NB_RISAL OFFSET(24) NUMBITS(8) [],
    ],

    pub Verr [
        MINREV OFFSET(0) NUMBITS(4) [],
        MAJREV OFFSET(4) NUMBITS(4) [],
    ],

    /// Bus master attributes
    pub RimcAttr [
        CIDSEL OFFSET(2) NUMBITS(1) [],
        MCID OFFSET(4) NUMBITS(3) [],
        MSEC OFFSET(8) NUMBITS(1) [],
        MPRIV OFFSET(9) NUMBITS(1) [],
    ],
];

/// Writable bits of `RIMC_ATTRx`.
pub const RIMC_ATTR_MASK: u32 = 0x0000_07ff;
