// Licensed under the Apache-2.0 license

//! Reset and clock controller resource filters.

pub const R0CIDCFGR: usize = 0x000;
pub const R0SEMCR: usize = 0x004;
pub const RX_STRIDE: usize = 0x8;
pub const SECCFGR0: usize = 0x780;
pub const PRIVCFGR0: usize = 0x790;
pub const RCFGLOCKR0: usize = 0x7a0;

pub const RIF_RESOURCES: u32 = 114;
