/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the STM32MP25 resource isolation framework
    drivers.

--*/

#![cfg_attr(not(any(feature = "std", test)), no_std)]

mod cid;
mod controller;
mod filter;
pub mod memory_layout;
mod periph;
pub mod printer;
mod protreg;
mod rifsc;
mod risab;
mod risaf;

pub use cid::{CidSet, CompartmentId, Domain, Role};
pub use controller::{
    ControllerKind, FilterBase, ProcessorBinding, ResourceController, Semaphore,
};
pub use filter::{CidLayout, FilterAttributes, ResourceConfig};
pub use protreg::{RifProt, RimuProt, RisabProt, RisafProt};
pub use rif_error::{ErrorKind, RifError, RifResult};
pub use rifsc::{Rifsc, RifscCapabilities, RimuConfig};
pub use risab::{MemoryAttributes, MemoryRegion, Risab, RisabOptions};
pub use risaf::{
    RegionConfig, Risaf, RisafAttributes, RisafHwConfig, RisafOptions, RisafRegion,
};
