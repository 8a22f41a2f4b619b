/*++
Licensed under the Apache-2.0 license.

File Name:

    memory_layout.rs

Abstract:

    The file contains the base addresses of the RIF-aware blocks of the
    STM32MP25.

--*/

//
// RIF controllers
//
pub const RIFSC_ORG: u32 = 0x42080000;
pub const RISAB1_ORG: u32 = 0x420F0000;
pub const RISAB2_ORG: u32 = 0x42100000;
pub const RISAB3_ORG: u32 = 0x42110000;
pub const RISAB4_ORG: u32 = 0x42120000;
pub const RISAB5_ORG: u32 = 0x42130000;
pub const RISAB6_ORG: u32 = 0x42140000;
pub const RISAF1_ORG: u32 = 0x420A0000;
pub const RISAF2_ORG: u32 = 0x420B0000;
pub const RISAF4_ORG: u32 = 0x420D0000;
pub const RISAF5_ORG: u32 = 0x420E0000;

//
// RIF-aware peripherals
//
pub const HPDMA1_ORG: u32 = 0x40400000;
pub const HPDMA2_ORG: u32 = 0x40410000;
pub const HPDMA3_ORG: u32 = 0x40420000;
pub const IPCC1_ORG: u32 = 0x40490000;
pub const RCC_ORG: u32 = 0x44200000;
pub const EXTI1_ORG: u32 = 0x44220000;
pub const EXTI2_ORG: u32 = 0x46230000;
pub const FMC_ORG: u32 = 0x48200000;

//
// Protected memories
//
pub const SRAM1_ORG: u32 = 0x0A040000;
pub const SRAM1_SIZE: u32 = 0x20000;
pub const DDR_ORG: u32 = 0x80000000;
