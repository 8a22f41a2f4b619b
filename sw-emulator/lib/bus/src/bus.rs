/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

/// Bus data width
pub type RvData = u32;

/// Bus address width
pub type RvAddr = u32;

/// Size of a single bus transfer
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RvSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
}

impl RvSize {
    /// Mask selecting the low `self` bytes of a bus word.
    pub const fn mask(self) -> RvData {
        match self {
            RvSize::Byte => 0xff,
            RvSize::HalfWord => 0xffff,
            RvSize::Word => 0xffff_ffff,
        }
    }

    pub const fn is_aligned(self, addr: RvAddr) -> bool {
        addr % (self as RvAddr) == 0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Load address misaligned exception
    LoadAddrMisaligned,

    /// Load access fault exception
    LoadAccessFault,

    /// Store address misaligned exception
    StoreAddrMisaligned,

    /// Store access fault exception
    StoreAccessFault,
}

/// Represents an abstract memory bus as seen from one initiator. Used to read
/// and write peripheral registers.
pub trait Bus {
    /// Read data of specified size from given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::LoadAccessFault` or `BusError::LoadAddrMisaligned`
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError>;

    /// Write data of specified size to given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError` - Exception with cause `BusError::StoreAccessFault` or `BusError::StoreAddrMisaligned`
    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError>;
}

impl<T: Bus + ?Sized> Bus for Box<T> {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        T::read(self, size, addr)
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        T::write(self, size, addr, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rv_size() {
        assert_eq!(RvSize::HalfWord.mask(), 0xffff);
        assert!(RvSize::Word.is_aligned(0x4000_0008));
        assert!(!RvSize::Word.is_aligned(0x4000_0002));
        assert!(RvSize::Byte.is_aligned(0x4000_0003));
    }
}
