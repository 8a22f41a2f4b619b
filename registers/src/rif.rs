// Licensed under the Apache-2.0 license

//! Fields shared by every RIF-aware block.

use tock_registers::register_bitfields;

/// Resources whose secure/privilege bits share one 32-bit register.
pub const IDS_PER_REG: u32 = 32;

register_bitfields! [
    u32,

    /// Compartment filter configuration
    pub CidCfgr [
        CFEN OFFSET(0) NUMBITS(1) [],
        SEMEN OFFSET(1) NUMBITS(1) [],
        SCID OFFSET(4) NUMBITS(3) [],
        SEMWLC OFFSET(16) NUMBITS(8) [],
    ],

    /// Hardware semaphore control
    pub SemCr [
        MUTEX OFFSET(0) NUMBITS(1) [],
        SCID OFFSET(4) NUMBITS(3) [],
    ],
];

/// Every bit `CidCfgr` defines.
pub const CIDCFGR_MASK: u32 = 0x00ff_0073;
