// Licensed under the Apache-2.0 license
//
//! Register offsets and bitfields of the STM32MP25 RIF-aware blocks.
//!
//! Offsets are byte offsets from the owning block's base address.
#![no_std]

pub mod exti;
pub mod fmc;
pub mod hpdma;
pub mod ipcc;
pub mod rcc;
pub mod rif;
pub mod rifsc;
pub mod risab;
pub mod risaf;
