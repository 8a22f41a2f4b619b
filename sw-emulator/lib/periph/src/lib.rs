/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the RIF Emulator Peripheral library.

--*/
mod fabric;
mod semaphore;

pub use fabric::{CompartmentPort, RifFabric, SharedFabric};
pub use semaphore::Semaphore;
