/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the register fabric set-up shared by the driver
    integration tests.

--*/

#![allow(dead_code)]

use std::collections::BTreeMap;

use rif_drivers::memory_layout;
use rif_drivers::Domain;
use rif_emu_bus::testing::Access;
use rif_emu_bus::{BusMmio, RvAddr, RvData};
use rif_emu_periph::{CompartmentPort, SharedFabric};
use rif_registers::{rcc, rifsc, risab, risaf};
use ureg::RegisterBlock;

pub type TestMmio = BusMmio<CompartmentPort>;

/// Address of register `offset` of the block at `base`.
pub fn at(base: u32, offset: usize) -> RvAddr {
    base + offset as RvAddr
}

/// Register block of the block at `base` as seen from `domain`.
pub fn regs(fabric: &SharedFabric, base: u32, domain: Domain) -> RegisterBlock<TestMmio> {
    unsafe {
        RegisterBlock::new_with_mmio(base as usize, BusMmio::new(fabric.port(domain.cid.into())))
    }
}

/// Adds the RCC semaphores and lock registers to `fabric`.
pub fn with_rcc(fabric: SharedFabric) -> SharedFabric {
    let base = memory_layout::RCC_ORG;
    fabric.add_semaphores(
        at(base, rcc::R0SEMCR),
        at(base, rcc::R0CIDCFGR),
        rcc::RX_STRIDE as RvAddr,
        rcc::RIF_RESOURCES,
    );
    for bank in 0..4 {
        fabric.add_lock(at(base, rcc::RCFGLOCKR0 + 4 * bank));
    }
    fabric
}

/// RIFSC with 128 peripherals, 16 bus masters and RIF enabled.
pub fn with_rifsc(fabric: SharedFabric) -> SharedFabric {
    let base = memory_layout::RIFSC_ORG;
    fabric.poke(at(base, rifsc::HWCFGR1), 0x111);
    fabric.poke(at(base, rifsc::HWCFGR2), 128 | (16 << 16) | (6 << 24));
    fabric.poke(at(base, rifsc::VERR), 0x20);
    fabric.add_semaphores(
        at(base, rifsc::PERX_SEMCR),
        at(base, rifsc::PERX_CIDCFGR),
        rifsc::PERX_STRIDE as RvAddr,
        rifsc::MAX_RISUP,
    );
    fabric
}

/// SRAM1 behind RISAB1: 32 pages of 8 blocks of 512 bytes.
pub fn with_risab(fabric: SharedFabric) -> SharedFabric {
    let base = memory_layout::RISAB1_ORG;
    fabric.poke(at(base, risab::HWCFGR2), memory_layout::SRAM1_SIZE);
    fabric.poke(at(base, risab::HWCFGR1), (5 << 24) | (3 << 20) | (9 << 16));
    fabric
}

/// RISAF4 with 15 regions.
pub fn with_risaf(fabric: SharedFabric) -> SharedFabric {
    fabric.poke(at(memory_layout::RISAF4_ORG, risaf::HWCFGR), 0x2004_0c10);
    fabric
}

/// Applies recorded writes to a register snapshot, returning the state after
/// each one.
pub fn replay(
    start: &BTreeMap<RvAddr, RvData>,
    writes: &[Access],
) -> Vec<BTreeMap<RvAddr, RvData>> {
    let mut state = start.clone();
    writes
        .iter()
        .map(|access| {
            state.insert(access.addr, access.val);
            state.clone()
        })
        .collect()
}

/// (address, value) of every write recorded so far.
pub fn writes(fabric: &SharedFabric) -> Vec<(RvAddr, RvData)> {
    fabric
        .trace()
        .writes()
        .iter()
        .map(|a| (a.addr, a.val))
        .collect()
}
