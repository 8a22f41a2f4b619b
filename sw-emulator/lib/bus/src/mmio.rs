// Licensed under the Apache-2.0 license

use std::cell::RefCell;

use ureg::{Mmio, MmioMut, Uint, UintType};

use crate::{Bus, RvSize};

const fn rvsize<T: Uint>() -> RvSize {
    match T::TYPE {
        UintType::U8 => RvSize::Byte,
        UintType::U16 => RvSize::HalfWord,
        UintType::U32 => RvSize::Word,
    }
}

/// An MMIO implementation that reads and writes to a `rif_emu_bus::Bus`.
pub struct BusMmio<TBus: Bus> {
    bus: RefCell<TBus>,
}
impl<TBus: Bus> BusMmio<TBus> {
    pub fn new(bus: TBus) -> Self {
        Self {
            bus: RefCell::new(bus),
        }
    }
    pub fn into_inner(self) -> TBus {
        self.bus.into_inner()
    }
}
impl<TBus: Bus> Mmio for BusMmio<TBus> {
    /// Loads from address `src` on the bus and returns the value.
    ///
    /// # Panics
    ///
    /// This function panics if the bus faults.
    ///
    /// # Safety
    ///
    /// As the pointer isn't read from, this Mmio implementation isn't actually
    /// unsafe.
    unsafe fn read_volatile<T: Uint>(&self, src: *const T) -> T {
        let addr = src as usize as u32;
        match self.bus.borrow_mut().read(rvsize::<T>(), addr) {
            Ok(val) => T::from_u32(val),
            Err(err) => panic!("bus read of {addr:#010x} faulted: {err:?}"),
        }
    }
}

impl<TBus: Bus> MmioMut for BusMmio<TBus> {
    /// Stores `src` to address `dst` on the bus.
    ///
    /// # Panics
    ///
    /// This function panics if the bus faults.
    ///
    /// # Safety
    ///
    /// As the pointer isn't written to, this Mmio implementation isn't actually
    /// unsafe.
    unsafe fn write_volatile<T: Uint>(&self, dst: *mut T, src: T) {
        let addr = dst as usize as u32;
        if let Err(err) = self
            .bus
            .borrow_mut()
            .write(rvsize::<T>(), addr, src.to_u32())
        {
            panic!("bus write of {addr:#010x} faulted: {err:?}");
        }
    }
}
