// Licensed under the Apache-2.0 license

//! Address-range memory filter.

use tock_registers::register_bitfields;

pub const HWCFGR: usize = 0xff0;

const REG_CFGR: usize = 0x40;
const REG_STARTR: usize = 0x44;
const REG_ENDR: usize = 0x48;
const REG_CIDCFGR: usize = 0x4c;
const REG_STRIDE: usize = 0x40;

/// Region `n` (1-based) configuration.
pub const fn reg_cfgr(region: u32) -> usize {
    REG_CFGR + REG_STRIDE * (region as usize - 1)
}

/// Region `n` (1-based) first address.
pub const fn reg_startr(region: u32) -> usize {
    REG_STARTR + REG_STRIDE * (region as usize - 1)
}

/// Region `n` (1-based) last address, inclusive.
pub const fn reg_endr(region: u32) -> usize {
    REG_ENDR + REG_STRIDE * (region as usize - 1)
}

/// Region `n` (1-based) compartment read/write lists.
pub const fn reg_cidcfgr(region: u32) -> usize {
    REG_CIDCFGR + REG_STRIDE * (region as usize - 1)
}

register_bitfields! [
    u32,

    pub RegCfgr [
        BREN OFFSET(0) NUMBITS(1) [],
        SEC OFFSET(8) NUMBITS(1) [],
        ENC OFFSET(15) NUMBITS(1) [],
        PRIVC OFFSET(16) NUMBITS(8) [],
    ],

    pub RegCidCfgr [
        RDENC OFFSET(0) NUMBITS(8) [],
        WRENC OFFSET(16) NUMBITS(8) [],
    ],

    pub HwCfgr [
        /// Regions including the fixed base region 0
        CFG1 OFFSET(0) NUMBITS(8) [],
        CFG2 OFFSET(8) NUMBITS(8) [],
        CFG3 OFFSET(16) NUMBITS(8) [],
        CFG4 OFFSET(24) NUMBITS(8) [],
    ],
];
