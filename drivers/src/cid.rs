/*++

Licensed under the Apache-2.0 license.

File Name:

    cid.rs

Abstract:

    File contains the compartment identity types.

--*/

use bitflags::bitflags;
use rif_error::RifError;

/// Compartment Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompartmentId {
    Cid0 = 0,
    Cid1 = 1,
    Cid2 = 2,
    Cid3 = 3,
    Cid4 = 4,
    Cid5 = 5,
    Cid6 = 6,
    Cid7 = 7,
}

impl CompartmentId {
    pub const ALL: [CompartmentId; 8] = [
        CompartmentId::Cid0,
        CompartmentId::Cid1,
        CompartmentId::Cid2,
        CompartmentId::Cid3,
        CompartmentId::Cid4,
        CompartmentId::Cid5,
        CompartmentId::Cid6,
        CompartmentId::Cid7,
    ];

    /// CID held in a 3-bit register field. Higher bits are ignored.
    pub(crate) fn from_field(val: u32) -> Self {
        Self::ALL[(val & 0x7) as usize]
    }
}

impl From<CompartmentId> for u32 {
    /// Converts to this type from the input type.
    fn from(cid: CompartmentId) -> Self {
        cid as Self
    }
}

impl From<CompartmentId> for u8 {
    /// Converts to this type from the input type.
    fn from(cid: CompartmentId) -> Self {
        cid as Self
    }
}

impl TryFrom<u32> for CompartmentId {
    type Error = RifError;

    fn try_from(val: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(val as usize)
            .copied()
            .ok_or(RifError::DRIVER_RIF_INVALID_CID)
    }
}

bitflags! {
    /// Set of compartments, one bit per CID. Used for semaphore whitelists
    /// and for the per-CID read/write/privilege lists of the memory filters.
    #[derive(Default)]
    pub struct CidSet: u8 {
        const CID0 = 1 << 0;
        const CID1 = 1 << 1;
        const CID2 = 1 << 2;
        const CID3 = 1 << 3;
        const CID4 = 1 << 4;
        const CID5 = 1 << 5;
        const CID6 = 1 << 6;
        const CID7 = 1 << 7;
    }
}

impl CidSet {
    pub fn contains_cid(&self, cid: CompartmentId) -> bool {
        self.contains(Self::from(cid))
    }

    /// Members in ascending CID order.
    pub fn iter_cids(self) -> impl Iterator<Item = CompartmentId> {
        CompartmentId::ALL
            .into_iter()
            .filter(move |cid| self.contains_cid(*cid))
    }
}

impl From<CompartmentId> for CidSet {
    fn from(cid: CompartmentId) -> Self {
        Self::from_bits_truncate(1 << cid as u8)
    }
}

/// Whether a domain performs the initial, unconditioned configuration of the
/// resources or only re-asserts what it has been delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Trusted domain CID: owns the initial security provisioning
    Tdcid,
    Delegate,
}

/// Identity of the code programming the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub cid: CompartmentId,
    pub role: Role,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "tdcid")] {
        const FIRMWARE_ROLE: Role = Role::Tdcid;
    } else {
        const FIRMWARE_ROLE: Role = Role::Delegate;
    }
}

impl Domain {
    /// The compartment this firmware image runs in.
    pub const FIRMWARE: Domain = Domain {
        cid: CompartmentId::Cid2,
        role: FIRMWARE_ROLE,
    };

    pub const fn tdcid(cid: CompartmentId) -> Self {
        Self {
            cid,
            role: Role::Tdcid,
        }
    }

    pub const fn delegate(cid: CompartmentId) -> Self {
        Self {
            cid,
            role: Role::Delegate,
        }
    }

    pub fn is_tdcid(&self) -> bool {
        self.role == Role::Tdcid
    }
}
