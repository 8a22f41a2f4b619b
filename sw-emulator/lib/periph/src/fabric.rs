/*++

Licensed under the Apache-2.0 license.

File Name:

    fabric.rs

Abstract:

    File contains a register-file model of the RIF-aware blocks as seen from
    several compartments sharing one bus.

--*/

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use rif_emu_bus::testing::{Access, AccessLog};
use rif_emu_bus::{Bus, BusError, RvAddr, RvData, RvSize};

use crate::Semaphore;

struct SemaphoreSlot {
    cidcfgr: RvAddr,
    sem: Semaphore,
}

/// Plain read/write registers plus the few cells with hardware behaviour:
/// semaphores (taken and given per compartment) and lock registers (bits can
/// only be set).
///
/// Every write that reaches a register is recorded in the trace as a full
/// word with the value the register holds afterwards.
#[derive(Default)]
pub struct RifFabric {
    regs: BTreeMap<RvAddr, RvData>,
    semaphores: BTreeMap<RvAddr, SemaphoreSlot>,
    sticky: BTreeSet<RvAddr>,
    trace: AccessLog,
}

impl RifFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models `semcr` as a semaphore guarded by the filter configuration at
    /// `cidcfgr`.
    pub fn add_semaphore(&mut self, semcr: RvAddr, cidcfgr: RvAddr) {
        self.semaphores.insert(
            semcr,
            SemaphoreSlot {
                cidcfgr,
                sem: Semaphore::new(),
            },
        );
    }

    /// Models `count` semaphores laid out every `stride` bytes.
    pub fn add_semaphores(
        &mut self,
        semcr_base: RvAddr,
        cidcfgr_base: RvAddr,
        stride: RvAddr,
        count: u32,
    ) {
        for i in 0..count {
            self.add_semaphore(semcr_base + i * stride, cidcfgr_base + i * stride);
        }
    }

    /// Makes `addr` a lock register: once set, a bit stays set.
    pub fn add_lock(&mut self, addr: RvAddr) {
        self.sticky.insert(addr);
    }

    pub fn peek(&self, addr: RvAddr) -> RvData {
        let addr = addr & !3;
        match self.semaphores.get(&addr) {
            Some(slot) => slot.sem.value(),
            None => self.regs.get(&addr).copied().unwrap_or(0),
        }
    }

    /// Sets a register without going through the bus. Has no visible effect
    /// on a semaphore.
    pub fn poke(&mut self, addr: RvAddr, val: RvData) {
        self.regs.insert(addr & !3, val);
    }

    pub fn semaphore_owner(&self, semcr: RvAddr) -> Option<u8> {
        self.semaphores.get(&semcr).and_then(|slot| slot.sem.owner())
    }

    /// Every plain register with a non-zero value.
    pub fn snapshot(&self) -> BTreeMap<RvAddr, RvData> {
        self.regs
            .iter()
            .filter(|(_, val)| **val != 0)
            .map(|(addr, val)| (*addr, *val))
            .collect()
    }

    pub fn trace(&self) -> AccessLog {
        self.trace.clone()
    }

    fn read(&self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        if !size.is_aligned(addr) {
            Err(BusError::LoadAddrMisaligned)?
        }
        let shift = (addr & 3) * 8;
        Ok((self.peek(addr) >> shift) & size.mask())
    }

    fn write(&mut self, cid: u8, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        if !size.is_aligned(addr) {
            Err(BusError::StoreAddrMisaligned)?
        }
        let word = addr & !3;
        let shift = (addr & 3) * 8;
        let mask = size.mask() << shift;
        let merged = (self.peek(word) & !mask) | ((val << shift) & mask);

        if let Some(cidcfgr) = self.semaphores.get(&word).map(|slot| slot.cidcfgr) {
            let cfg = self.peek(cidcfgr);
            if let Some(slot) = self.semaphores.get_mut(&word) {
                slot.sem.write(cid, cfg, merged);
            }
        } else if self.sticky.contains(&word) {
            let old = self.peek(word);
            self.regs.insert(word, old | merged);
        } else {
            self.regs.insert(word, merged);
        }

        self.trace
            .push(Access::write(RvSize::Word, word, self.peek(word)));
        Ok(())
    }
}

/// A [`RifFabric`] shared between the compartments of a test.
#[derive(Clone, Default)]
pub struct SharedFabric(Rc<RefCell<RifFabric>>);

impl SharedFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus as seen by an initiator running in compartment `cid`.
    pub fn port(&self, cid: u8) -> CompartmentPort {
        CompartmentPort {
            fabric: self.clone(),
            cid,
        }
    }

    pub fn add_semaphore(&self, semcr: RvAddr, cidcfgr: RvAddr) {
        self.0.borrow_mut().add_semaphore(semcr, cidcfgr);
    }

    pub fn add_semaphores(
        &self,
        semcr_base: RvAddr,
        cidcfgr_base: RvAddr,
        stride: RvAddr,
        count: u32,
    ) {
        self.0
            .borrow_mut()
            .add_semaphores(semcr_base, cidcfgr_base, stride, count);
    }

    pub fn add_lock(&self, addr: RvAddr) {
        self.0.borrow_mut().add_lock(addr);
    }

    pub fn peek(&self, addr: RvAddr) -> RvData {
        self.0.borrow().peek(addr)
    }

    pub fn poke(&self, addr: RvAddr, val: RvData) {
        self.0.borrow_mut().poke(addr, val);
    }

    pub fn semaphore_owner(&self, semcr: RvAddr) -> Option<u8> {
        self.0.borrow().semaphore_owner(semcr)
    }

    pub fn snapshot(&self) -> BTreeMap<RvAddr, RvData> {
        self.0.borrow().snapshot()
    }

    pub fn trace(&self) -> AccessLog {
        self.0.borrow().trace()
    }
}

/// One compartment's view of a [`SharedFabric`].
pub struct CompartmentPort {
    fabric: SharedFabric,
    cid: u8,
}

impl CompartmentPort {
    pub fn cid(&self) -> u8 {
        self.cid
    }
}

impl Bus for CompartmentPort {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        self.fabric.0.borrow().read(size, addr)
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        self.fabric.0.borrow_mut().write(self.cid, size, addr, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIDCFGR: RvAddr = 0x4208_0100;
    const SEMCR: RvAddr = 0x4208_0104;
    const LOCKR: RvAddr = 0x4208_0050;

    #[test]
    fn test_sub_word_access() {
        let fabric = SharedFabric::new();
        let mut port = fabric.port(1);
        port.write(RvSize::Word, 0x1000, 0x1122_3344).unwrap();
        port.write(RvSize::Byte, 0x1001, 0xaa).unwrap();
        assert_eq!(fabric.peek(0x1000), 0x1122_aa44);
        assert_eq!(port.read(RvSize::HalfWord, 0x1002), Ok(0x1122));
        assert_eq!(
            port.read(RvSize::Word, 0x1002),
            Err(BusError::LoadAddrMisaligned)
        );
        assert_eq!(
            fabric.trace().writes().last(),
            Some(&Access::write(RvSize::Word, 0x1000, 0x1122_aa44))
        );
    }

    #[test]
    fn test_semaphore_per_compartment() {
        let fabric = SharedFabric::new();
        fabric.add_semaphore(SEMCR, CIDCFGR);
        fabric.poke(CIDCFGR, 0x000c_0003);

        let mut cid2 = fabric.port(2);
        let mut cid3 = fabric.port(3);
        cid3.write(RvSize::Word, SEMCR, 1).unwrap();
        cid2.write(RvSize::Word, SEMCR, 1).unwrap();
        assert_eq!(cid2.read(RvSize::Word, SEMCR), Ok(0x31));
        assert_eq!(fabric.semaphore_owner(SEMCR), Some(3));

        cid2.write(RvSize::Word, SEMCR, 0).unwrap();
        assert_eq!(fabric.peek(SEMCR), 0x31);
        cid3.write(RvSize::Word, SEMCR, 0).unwrap();
        assert_eq!(fabric.peek(SEMCR), 0);
    }

    #[test]
    fn test_lock_bits_are_sticky() {
        let fabric = SharedFabric::new();
        fabric.add_lock(LOCKR);
        let mut port = fabric.port(1);
        port.write(RvSize::Word, LOCKR, 0x4).unwrap();
        port.write(RvSize::Word, LOCKR, 0x1).unwrap();
        port.write(RvSize::Word, LOCKR, 0).unwrap();
        assert_eq!(fabric.peek(LOCKR), 0x5);
    }

    #[test]
    fn test_snapshot_skips_zero() {
        let fabric = SharedFabric::new();
        fabric.poke(0x10, 0);
        fabric.poke(0x14, 7);
        assert_eq!(fabric.snapshot(), BTreeMap::from([(0x14, 7)]));
    }
}
