// Licensed under the Apache-2.0 license

//! Inter-processor communication controller.

pub const C1SECCFGR: usize = 0x80;
pub const C1PRIVCFGR: usize = 0x84;
pub const C1CIDCFGR: usize = 0x88;
pub const CX_STRIDE: usize = 0x10;

/// Channels per processor sub-block.
pub const CHANNELS_PER_CPU: u32 = 16;
pub const RIF_RESOURCES: u32 = 32;
