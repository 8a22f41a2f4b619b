// Licensed under the Apache-2.0 license

//! Page-granular SRAM filter.

use tock_registers::register_bitfields;

pub const CR: usize = 0x0;
pub const IACR: usize = 0xc;
pub const HWCFGR2: usize = 0xfec;
pub const HWCFGR1: usize = 0xff0;

/// Page `y` secure block mask.
pub const fn pg_seccfgr(page: u32) -> usize {
    0x100 + 4 * page as usize
}

/// Page `y` privileged block mask.
pub const fn pg_privcfgr(page: u32) -> usize {
    0x200 + 4 * page as usize
}

/// Page `y` compartment filter.
pub const fn pg_cidcfgr(page: u32) -> usize {
    0xa00 + 4 * page as usize
}

/// Pages compartment `x` may access privileged.
pub const fn cid_privcfgr(cid: u32) -> usize {
    0x800 + 0x20 * cid as usize
}

/// Pages compartment `x` may read.
pub const fn cid_rdcfgr(cid: u32) -> usize {
    0x808 + 0x20 * cid as usize
}

/// Pages compartment `x` may write.
pub const fn cid_wrcfgr(cid: u32) -> usize {
    0x810 + 0x20 * cid as usize
}

/// All blocks of a page.
pub const PG_BLOCKS_MASK: u32 = 0xff;

/// Size of the page-occupancy bitmap.
pub const MAX_PAGES: u32 = 32;

/// Compartments that own a CIDx list register set.
pub const MAX_CID: u32 = 7;

register_bitfields! [
    u32,

    pub Cr [
        GLOCK OFFSET(0) NUMBITS(1) [],
        SRWIAD OFFSET(31) NUMBITS(1) [],
    ],

    pub Iacr [
        CAEF OFFSET(0) NUMBITS(1) [],
        IAEF OFFSET(1) NUMBITS(1) [],
    ],

    pub PgCidCfgr [
        CFEN OFFSET(0) NUMBITS(1) [],
        DCEN OFFSET(2) NUMBITS(1) [],
        DDCID OFFSET(4) NUMBITS(3) [],
    ],

    pub HwCfgr1 [
        CFG4 OFFSET(12) NUMBITS(4) [],
        /// log2 of the block size in bytes
        CFG5 OFFSET(16) NUMBITS(4) [],
        /// log2 of the blocks per page
        CFG6 OFFSET(20) NUMBITS(4) [],
        /// log2 of the page count
        CFG7 OFFSET(24) NUMBITS(4) [],
    ],
];
