/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the RIF library for error handling

--*/
#![cfg_attr(not(any(feature = "std", test)), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Error categories every RIF error code falls into.
///
/// The category is encoded in bits 8..15 of the error code.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Controller or register block not present or not ready
    NoSuchDevice = 1,

    /// Out of range id, misaligned or overlapping region, inconsistent
    /// multi-agent configuration
    InvalidArgument = 2,

    /// Operation unavailable on this controller variant
    NotSupported = 3,

    /// Semaphore not owned by the caller
    PermissionDenied = 4,
}

impl ErrorKind {
    const fn from_code(val: u32) -> Option<Self> {
        match (val >> 8) & 0xff {
            1 => Some(Self::NoSuchDevice),
            2 => Some(Self::InvalidArgument),
            3 => Some(Self::NotSupported),
            4 => Some(Self::PermissionDenied),
            _ => None,
        }
    }
}

/// RIF Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RifError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: RifError = RifError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl RifError {
    /// Create a RIF error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a RifError from a u32 is to
    /// use `RifError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("RifError cannot be 0"),
        }
    }

    /// Category of the error.
    ///
    /// Codes that do not carry a known category (for example values read
    /// back from another firmware image) are reported as `InvalidArgument`.
    pub const fn kind(&self) -> ErrorKind {
        match ErrorKind::from_code(self.0.get()) {
            Some(kind) => kind,
            None => ErrorKind::InvalidArgument,
        }
    }

    /// Component that raised the error (upper half-word of the code).
    pub const fn component(&self) -> u16 {
        (self.0.get() >> 16) as u16
    }

    // Use the macro to define all error constants
    define_error_constants![
        (
            DRIVER_RIF_NO_RESOURCES,
            0x0001_0101,
            "RIF controller reports no resources"
        ),
        (
            DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE,
            0x0001_0201,
            "RIF resource id out of range"
        ),
        (
            DRIVER_RIF_INVALID_CID,
            0x0001_0202,
            "RIF compartment id out of range"
        ),
        (
            DRIVER_RIF_TABLE_TOO_LARGE,
            0x0001_0203,
            "RIF configuration table has more entries than resources"
        ),
        (
            DRIVER_RIF_PROCESSOR_OUT_OF_RANGE,
            0x0001_0204,
            "RIF processor binding refers to a missing processor"
        ),
        (
            DRIVER_RIF_PROCESSOR_CID_MISMATCH,
            0x0001_0205,
            "RIF processor bound to two different compartments"
        ),
        (
            DRIVER_RIF_SUB_BLOCK_ATTR_MISMATCH,
            0x0001_0206,
            "RIF sub-block entries disagree on filter attributes"
        ),
        (
            DRIVER_RIF_LOCK_NOT_SUPPORTED,
            0x0001_0301,
            "RIF controller has no lock register"
        ),
        (
            DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED,
            0x0001_0401,
            "RIF semaphore read-back does not match this compartment"
        ),
        (
            DRIVER_RIF_SEMAPHORE_NOT_OWNED,
            0x0001_0402,
            "RIF semaphore is held by another compartment"
        ),
        (
            DRIVER_RIFSC_NOT_PRESENT,
            0x0002_0101,
            "RIFSC reports no peripheral entries"
        ),
        (
            DRIVER_RIFSC_TOO_MANY_RISUP,
            0x0002_0201,
            "RIFSC RISUP table larger than the hardware"
        ),
        (
            DRIVER_RIFSC_RIMU_ID_OUT_OF_RANGE,
            0x0002_0202,
            "RIFSC RIMU id out of range"
        ),
        (
            DRIVER_RIFSC_PERIPHERAL_ID_OUT_OF_RANGE,
            0x0002_0203,
            "RIFSC peripheral id out of range"
        ),
        (
            DRIVER_RIFSC_ACCESS_DENIED,
            0x0002_0401,
            "RIFSC peripheral not accessible by this compartment"
        ),
        (
            DRIVER_RISAB_NOT_PRESENT,
            0x0003_0101,
            "RISAB reports no pages"
        ),
        (
            DRIVER_RISAB_REGION_OUT_OF_BOUNDS,
            0x0003_0201,
            "RISAB region outside the protected window"
        ),
        (
            DRIVER_RISAB_REGION_OVERLAP,
            0x0003_0202,
            "RISAB region overlaps a configured region"
        ),
        (
            DRIVER_RISAB_REGION_EMPTY,
            0x0003_0203,
            "RISAB region has zero size"
        ),
        (
            DRIVER_RISAB_TOO_MANY_PAGES,
            0x0003_0301,
            "RISAB page count exceeds the page bitmap"
        ),
        (
            DRIVER_RISAB_REGION_NOT_ALIGNED,
            0x0003_0302,
            "RISAB region not aligned on the page size"
        ),
        (
            DRIVER_RISAF_NOT_PRESENT,
            0x0004_0101,
            "RISAF reports no configurable regions"
        ),
        (
            DRIVER_RISAF_TOO_MANY_REGIONS,
            0x0004_0201,
            "RISAF table larger than the hardware"
        ),
        (
            DRIVER_RISAF_REGION_ID_OUT_OF_RANGE,
            0x0004_0202,
            "RISAF region id out of range"
        ),
        (
            DRIVER_RISAF_ENCRYPTION_REQUIRES_SECURE,
            0x0004_0203,
            "RISAF encryption requested on a non-secure region"
        ),
        (
            DRIVER_RISAF_REGION_INVALID_RANGE,
            0x0004_0204,
            "RISAF region bounds are empty or outside the addressable memory"
        ),
        (
            DRIVER_RISAF_SPARE_REGION_BUSY,
            0x0004_0205,
            "RISAF spare region is enabled and cannot cover a live update"
        ),
        (
            DRIVER_RISAF_ENCRYPTION_NOT_SUPPORTED,
            0x0004_0301,
            "RISAF instance has no encryption engine"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::RifError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::RifError(val)
    }
}

impl From<RifError> for core::num::NonZeroU32 {
    fn from(val: RifError) -> Self {
        val.0
    }
}

impl From<RifError> for u32 {
    fn from(val: RifError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for RifError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        NonZeroU32::try_from(val).map(RifError)
    }
}

pub type RifResult<T> = Result<T, RifError>;
