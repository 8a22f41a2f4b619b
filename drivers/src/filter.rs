/*++

Licensed under the Apache-2.0 license.

File Name:

    filter.rs

Abstract:

    File contains the compartment filter attributes and the static resource
    configuration applied by the resource controllers.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::{hpdma, rif};
use tock_registers::LocalRegisterCopy;

use crate::{CidSet, CompartmentId};

/// Bit layout of a controller's compartment filter register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CidLayout {
    /// SCID in bits 6:4, whitelist in bits 23:16
    Standard,

    /// SCID in bits 5:4, whitelist in bits 18:16. Only CID0..CID3 can be
    /// the static owner and only CID0..CID2 can be whitelisted.
    Narrow,
}

impl CidLayout {
    pub fn decode(self, val: u32) -> FilterAttributes {
        match self {
            CidLayout::Standard => {
                let reg = LocalRegisterCopy::<u32, rif::CidCfgr::Register>::new(val);
                FilterAttributes {
                    cfen: reg.is_set(rif::CidCfgr::CFEN),
                    sem_en: reg.is_set(rif::CidCfgr::SEMEN),
                    scid: CompartmentId::from_field(reg.read(rif::CidCfgr::SCID)),
                    whitelist: CidSet::from_bits_truncate(reg.read(rif::CidCfgr::SEMWLC) as u8),
                }
            }
            CidLayout::Narrow => {
                let reg = LocalRegisterCopy::<u32, hpdma::CidCfgr::Register>::new(val);
                FilterAttributes {
                    cfen: reg.is_set(hpdma::CidCfgr::CFEN),
                    sem_en: reg.is_set(hpdma::CidCfgr::SEMEN),
                    scid: CompartmentId::from_field(reg.read(hpdma::CidCfgr::SCID)),
                    whitelist: CidSet::from_bits_truncate(
                        reg.read(hpdma::CidCfgr::SEMWLC) as u8,
                    ),
                }
            }
        }
    }

    /// Bits cleared to switch filtering off before reprogramming.
    pub(crate) fn disable_mask(self) -> u32 {
        match self {
            CidLayout::Standard => rif::CidCfgr::CFEN.mask << rif::CidCfgr::CFEN.shift,
            CidLayout::Narrow => hpdma::CIDCFGR_MASK,
        }
    }

    /// Register value for `attrs`.
    ///
    /// # Error
    ///
    /// * `DRIVER_RIF_INVALID_CID` - a CID does not fit the narrow layout
    pub fn encode(self, attrs: &FilterAttributes) -> RifResult<u32> {
        let scid = u32::from(attrs.scid);
        let whitelist = u32::from(attrs.whitelist.bits());
        match self {
            CidLayout::Standard => Ok(attrs.to_cidcfgr()),
            CidLayout::Narrow => {
                if scid > hpdma::CidCfgr::SCID.mask || whitelist > hpdma::CidCfgr::SEMWLC.mask {
                    Err(RifError::DRIVER_RIF_INVALID_CID)?
                }
                let mut reg = LocalRegisterCopy::<u32, hpdma::CidCfgr::Register>::new(0);
                reg.write(
                    hpdma::CidCfgr::CFEN.val(attrs.cfen.into())
                        + hpdma::CidCfgr::SEMEN.val(attrs.sem_en.into())
                        + hpdma::CidCfgr::SCID.val(scid)
                        + hpdma::CidCfgr::SEMWLC.val(whitelist),
                );
                Ok(reg.get())
            }
        }
    }
}

/// Compartment filter attributes of one resource.
///
/// When `sem_en` is set `scid` is not authoritative: ownership is arbitrated
/// at runtime through the hardware semaphore among the `whitelist` members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterAttributes {
    /// Compartment filtering enabled
    pub cfen: bool,

    /// Semaphore mode enabled
    pub sem_en: bool,

    /// Static owner
    pub scid: CompartmentId,

    /// Compartments allowed to take the semaphore
    pub whitelist: CidSet,
}

impl Default for FilterAttributes {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl FilterAttributes {
    /// No compartment filtering; only the secure and privilege bits apply.
    pub const DISABLED: Self = Self {
        cfen: false,
        sem_en: false,
        scid: CompartmentId::Cid0,
        whitelist: CidSet::empty(),
    };

    /// Filtering on, statically owned by `cid`.
    pub const fn static_owner(cid: CompartmentId) -> Self {
        Self {
            cfen: true,
            sem_en: false,
            scid: cid,
            whitelist: CidSet::empty(),
        }
    }

    /// Filtering on, shared through the semaphore among `whitelist`.
    pub const fn shared(whitelist: CidSet) -> Self {
        Self {
            cfen: true,
            sem_en: true,
            scid: CompartmentId::Cid0,
            whitelist,
        }
    }

    /// Decodes a standard layout compartment filter register value.
    pub fn from_cidcfgr(val: u32) -> Self {
        CidLayout::Standard.decode(val)
    }

    /// Standard layout compartment filter register value.
    pub fn to_cidcfgr(&self) -> u32 {
        let mut reg = LocalRegisterCopy::<u32, rif::CidCfgr::Register>::new(0);
        reg.write(
            rif::CidCfgr::CFEN.val(self.cfen.into())
                + rif::CidCfgr::SEMEN.val(self.sem_en.into())
                + rif::CidCfgr::SCID.val(self.scid.into())
                + rif::CidCfgr::SEMWLC.val(self.whitelist.bits().into()),
        );
        reg.get()
    }

    /// Whether `cid` may contend for the resource's semaphore.
    pub fn semaphore_available(&self, cid: CompartmentId) -> bool {
        self.cfen && self.sem_en && self.whitelist.contains_cid(cid)
    }

    /// Whether the resource is statically bound to `cid`.
    pub fn statically_owned_by(&self, cid: CompartmentId) -> bool {
        !self.sem_en && self.scid == cid
    }
}

/// Desired static configuration of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    pub id: u32,

    /// Secure access only
    pub sec: bool,

    /// Privileged access only
    pub privileged: bool,

    /// Lock the configuration until the next reset
    pub lock: bool,

    pub attrs: FilterAttributes,
}

impl ResourceConfig {
    pub const fn new(id: u32, sec: bool, privileged: bool, attrs: FilterAttributes) -> Self {
        Self {
            id,
            sec,
            privileged,
            lock: false,
            attrs,
        }
    }

    pub const fn locked(self) -> Self {
        Self { lock: true, ..self }
    }
}
