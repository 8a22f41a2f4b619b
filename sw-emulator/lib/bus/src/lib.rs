/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RIF Emulator Bus library.

--*/
mod bus;
mod mmio;
pub mod testing;

pub use crate::bus::{Bus, BusError, RvAddr, RvData, RvSize};
pub use crate::mmio::BusMmio;
