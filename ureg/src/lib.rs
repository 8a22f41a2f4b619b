// Licensed under the Apache-2.0 license

//! Volatile register access.
//!
//! Drivers never dereference peripheral addresses themselves; they go through
//! an [`Mmio`]/[`MmioMut`] implementation. On hardware that is [`RealMmio`] /
//! [`RealMmioMut`]; in tests it is a bus model that routes the accesses to an
//! emulated peripheral.
#![no_std]

use core::sync::atomic::{fence, Ordering};

mod private {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UintType {
    U8,
    U16,
    U32,
}

/// Register widths that can be moved over a 32-bit bus.
pub trait Uint: Clone + Copy + Sized + private::Sealed {
    const TYPE: UintType;

    /// Truncating conversion from a bus word.
    fn from_u32(val: u32) -> Self;

    fn to_u32(self) -> u32;
}

impl Uint for u8 {
    const TYPE: UintType = UintType::U8;
    fn from_u32(val: u32) -> Self {
        val as u8
    }
    fn to_u32(self) -> u32 {
        self.into()
    }
}

impl Uint for u16 {
    const TYPE: UintType = UintType::U16;
    fn from_u32(val: u32) -> Self {
        val as u16
    }
    fn to_u32(self) -> u32 {
        self.into()
    }
}

impl Uint for u32 {
    const TYPE: UintType = UintType::U32;
    fn from_u32(val: u32) -> Self {
        val
    }
    fn to_u32(self) -> u32 {
        self
    }
}

pub trait Mmio: Sized {
    /// Loads from address `src` and returns the value.
    ///
    /// # Safety
    ///
    /// Same as [`core::ptr::read_volatile`].
    unsafe fn read_volatile<T: Uint>(&self, src: *const T) -> T;
}

pub trait MmioMut: Mmio {
    /// Stores `src` to address `dst`.
    ///
    /// # Safety
    ///
    /// Same as [`core::ptr::write_volatile`].
    unsafe fn write_volatile<T: Uint>(&self, dst: *mut T, src: T);

    /// Orders every prior store before every following access.
    fn barrier(&self) {}
}

/// MMIO implementation that performs real volatile loads.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealMmio;

impl Mmio for RealMmio {
    #[inline(always)]
    unsafe fn read_volatile<T: Uint>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}

/// MMIO implementation that performs real volatile loads and stores.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealMmioMut;

impl Mmio for RealMmioMut {
    #[inline(always)]
    unsafe fn read_volatile<T: Uint>(&self, src: *const T) -> T {
        core::ptr::read_volatile(src)
    }
}

impl MmioMut for RealMmioMut {
    #[inline(always)]
    unsafe fn write_volatile<T: Uint>(&self, dst: *mut T, src: T) {
        core::ptr::write_volatile(dst, src)
    }

    #[inline(always)]
    fn barrier(&self) {
        fence(Ordering::SeqCst);
    }
}

/// A window of 32-bit registers starting at a peripheral base address.
///
/// All accessors take a byte offset from the base.
pub struct RegisterBlock<TMmio: MmioMut = RealMmioMut> {
    base: usize,
    mmio: TMmio,
}

impl RegisterBlock<RealMmioMut> {
    /// # Safety
    ///
    /// `base` must be the address of the peripheral's register block, and no
    /// other `RegisterBlock` may be alive over the same registers.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base,
            mmio: RealMmioMut,
        }
    }
}

impl<TMmio: MmioMut> RegisterBlock<TMmio> {
    /// # Safety
    ///
    /// `base` must be the address of the peripheral's register block as seen
    /// through `mmio`, and no other `RegisterBlock` may be alive over the same
    /// registers.
    pub const unsafe fn new_with_mmio(base: usize, mmio: TMmio) -> Self {
        Self { base, mmio }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn mmio(&self) -> &TMmio {
        &self.mmio
    }

    pub fn into_mmio(self) -> TMmio {
        self.mmio
    }

    #[inline(always)]
    pub fn read(&self, offset: usize) -> u32 {
        unsafe { self.mmio.read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    pub fn write(&self, offset: usize, val: u32) {
        unsafe { self.mmio.write_volatile((self.base + offset) as *mut u32, val) }
    }

    /// Read-modify-write: clears `clear` then sets `set`.
    #[inline(always)]
    pub fn modify(&self, offset: usize, clear: u32, set: u32) {
        let val = self.read(offset);
        self.write(offset, (val & !clear) | set);
    }

    #[inline(always)]
    pub fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, 0, bits);
    }

    #[inline(always)]
    pub fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, bits, 0);
    }

    #[inline(always)]
    pub fn barrier(&self) {
        self.mmio.barrier();
    }
}
