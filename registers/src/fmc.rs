// Licensed under the Apache-2.0 license

//! Flexible memory controller resource filters.

pub const SECCFGR: usize = 0x300;
pub const PRIVCFGR: usize = 0x304;
pub const PERX_CIDCFGR: usize = 0x30c;
pub const PERX_SEMCR: usize = 0x310;
pub const PERX_STRIDE: usize = 0x8;

pub const RIF_RESOURCES: u32 = 6;
