/*++

Licensed under the Apache-2.0 license.

File Name:

    risaf.rs

Abstract:

    File contains the address-range memory filter (RISAF) driver.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::risaf::{self, HwCfgr, RegCfgr, RegCidCfgr};
use tock_registers::LocalRegisterCopy;
use ureg::{MmioMut, RealMmioMut, RegisterBlock};

use crate::{cprintln, CidSet, RisafProt};

/// Access policy of an address range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RisafAttributes {
    pub enabled: bool,

    /// Secure access only
    pub sec: bool,

    /// Encrypt data at rest; requires `sec`
    pub enc: bool,

    pub priv_list: CidSet,
    pub read_list: CidSet,
    pub write_list: CidSet,
}

impl RisafAttributes {
    fn from_regs(cfgr: u32, cidcfgr: u32) -> Self {
        let cfgr = LocalRegisterCopy::<u32, RegCfgr::Register>::new(cfgr);
        let cidcfgr = LocalRegisterCopy::<u32, RegCidCfgr::Register>::new(cidcfgr);
        Self {
            enabled: cfgr.is_set(RegCfgr::BREN),
            sec: cfgr.is_set(RegCfgr::SEC),
            enc: cfgr.is_set(RegCfgr::ENC),
            priv_list: CidSet::from_bits_truncate(cfgr.read(RegCfgr::PRIVC) as u8),
            read_list: CidSet::from_bits_truncate(cidcfgr.read(RegCidCfgr::RDENC) as u8),
            write_list: CidSet::from_bits_truncate(cidcfgr.read(RegCidCfgr::WRENC) as u8),
        }
    }

    fn cfgr(&self) -> u32 {
        let mut reg = LocalRegisterCopy::<u32, RegCfgr::Register>::new(0);
        reg.write(
            RegCfgr::BREN.val(self.enabled.into())
                + RegCfgr::SEC.val(self.sec.into())
                + RegCfgr::ENC.val(self.enc.into())
                + RegCfgr::PRIVC.val(self.priv_list.bits().into()),
        );
        reg.get()
    }

    fn cidcfgr(&self) -> u32 {
        let mut reg = LocalRegisterCopy::<u32, RegCidCfgr::Register>::new(0);
        reg.write(
            RegCidCfgr::RDENC.val(self.read_list.bits().into())
                + RegCidCfgr::WRENC.val(self.write_list.bits().into()),
        );
        reg.get()
    }
}

/// Address range `[base, base + size)` programmed in region slot `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RisafRegion {
    /// Region slot, 1-based
    pub id: u32,
    pub base: u32,
    pub size: u32,
    pub attrs: RisafAttributes,
}

impl RisafRegion {
    pub fn from_prot(base: u32, size: u32, prot: RisafProt) -> Self {
        Self {
            id: prot.id().into(),
            base,
            size,
            attrs: prot.attributes(),
        }
    }
}

/// Live content of a region slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionConfig {
    /// First address, relative to the memory map base
    pub start: u32,

    /// Last address, inclusive
    pub end: u32,

    pub attrs: RisafAttributes,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RisafOptions {
    /// Instance has an encryption engine
    pub has_enc: bool,

    /// Subtracted from region addresses before they are programmed. Zero on
    /// revision A parts.
    pub mem_map_base: u32,
}

/// What the RISAF instance implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RisafHwConfig {
    /// Configurable regions, the last being the spare slot
    pub nregions: u32,
    pub nsubregions: u32,
    pub granularity: u32,
    pub addr_bits: u32,
}

#[derive(Clone, Copy)]
struct RegionWords {
    start: u32,
    end: u32,
    cidcfgr: u32,
    cfgr: u32,
}

/// Address-range memory filter
pub struct Risaf<TMmio: MmioMut = RealMmioMut> {
    regs: RegisterBlock<TMmio>,
    options: RisafOptions,
    hw: RisafHwConfig,
}

impl<TMmio: MmioMut> Risaf<TMmio> {
    /// Read the filter's hardware configuration.
    ///
    /// # Error
    ///
    /// * `DRIVER_RISAF_NOT_PRESENT` - no configurable region
    pub fn new(regs: RegisterBlock<TMmio>, options: RisafOptions) -> RifResult<Self> {
        let hwcfgr = LocalRegisterCopy::<u32, HwCfgr::Register>::new(regs.read(risaf::HWCFGR));
        let hw = RisafHwConfig {
            nregions: hwcfgr.read(HwCfgr::CFG1).saturating_sub(1),
            nsubregions: hwcfgr.read(HwCfgr::CFG2),
            granularity: hwcfgr.read(HwCfgr::CFG3),
            addr_bits: hwcfgr.read(HwCfgr::CFG4),
        };
        if hw.nregions == 0 {
            Err(RifError::DRIVER_RISAF_NOT_PRESENT)?
        }
        Ok(Self { regs, options, hw })
    }

    pub fn hw_config(&self) -> RisafHwConfig {
        self.hw
    }

    /// Slot used to keep a region's range covered while it is rewritten.
    pub fn spare_region(&self) -> u32 {
        self.hw.nregions
    }

    /// Program `regions` in order.
    ///
    /// Only the last entry may use the spare slot. All entries are validated
    /// before the first write.
    ///
    /// # Error
    ///
    /// * `DRIVER_RISAF_TOO_MANY_REGIONS` - more entries than slots
    /// * `DRIVER_RISAF_REGION_ID_OUT_OF_RANGE` - slot 0, the spare slot before
    ///   the last entry, or past the spare slot
    /// * `DRIVER_RISAF_ENCRYPTION_NOT_SUPPORTED` - encryption on an instance
    ///   without it
    /// * `DRIVER_RISAF_ENCRYPTION_REQUIRES_SECURE` - encryption without `sec`
    /// * `DRIVER_RISAF_REGION_INVALID_RANGE` - empty or wrapping range, below
    ///   the memory map base or past the filter's address width
    /// * `DRIVER_RISAF_SPARE_REGION_BUSY` - a live region would be rewritten
    ///   while the spare slot holds a region
    pub fn init(&mut self, regions: &[RisafRegion]) -> RifResult<()> {
        if regions.len() > self.hw.nregions as usize {
            cprintln!(
                "[risaf] {} regions, hardware has {}",
                regions.len(),
                self.hw.nregions
            );
            Err(RifError::DRIVER_RISAF_TOO_MANY_REGIONS)?
        }

        for (idx, region) in regions.iter().enumerate() {
            self.validate(idx, region, idx + 1 == regions.len())?;
            self.check_spare(region.id)?;
        }
        for (idx, region) in regions.iter().enumerate() {
            let words = self.validate(idx, region, idx + 1 == regions.len())?;
            self.apply(region.id, &words)?;
        }
        Ok(())
    }

    /// Reprogram one region. A region that is live stays covered by the spare
    /// slot during the update, so the spare slot must be free.
    pub fn configure_region(&mut self, region: &RisafRegion) -> RifResult<()> {
        let words = self.validate(0, region, true)?;
        self.apply(region.id, &words)
    }

    /// Live configuration of region `id`.
    pub fn region_config(&self, id: u32) -> RifResult<RegionConfig> {
        if id == 0 || id > self.hw.nregions {
            Err(RifError::DRIVER_RISAF_REGION_ID_OUT_OF_RANGE)?
        }
        let words = self.read_words(id);
        Ok(RegionConfig {
            start: words.start,
            end: words.end,
            attrs: RisafAttributes::from_regs(words.cfgr, words.cidcfgr),
        })
    }

    fn validate(
        &self,
        idx: usize,
        region: &RisafRegion,
        may_use_spare: bool,
    ) -> RifResult<RegionWords> {
        let spare = self.spare_region();
        if region.id == 0 || region.id > spare || (region.id == spare && !may_use_spare) {
            cprintln!("[risaf] region {}: no slot {}", idx, region.id);
            Err(RifError::DRIVER_RISAF_REGION_ID_OUT_OF_RANGE)?
        }

        let attrs = &region.attrs;
        if attrs.enc {
            if !self.options.has_enc {
                cprintln!("[risaf] region {}: no encryption engine", idx);
                Err(RifError::DRIVER_RISAF_ENCRYPTION_NOT_SUPPORTED)?
            }
            if !attrs.sec {
                cprintln!("[risaf] region {}: encryption needs secure", idx);
                Err(RifError::DRIVER_RISAF_ENCRYPTION_REQUIRES_SECURE)?
            }
        }

        match self.offsets(region.base, region.size) {
            Some((start, end)) => Ok(RegionWords {
                start,
                end,
                cidcfgr: attrs.cidcfgr(),
                cfgr: attrs.cfgr(),
            }),
            None => {
                cprintln!("[risaf] region {}: invalid range", idx);
                Err(RifError::DRIVER_RISAF_REGION_INVALID_RANGE)
            }
        }
    }

    /// First and last offset of `[base, base + size)` from the memory map
    /// base, or `None` if the range is empty, wraps, or does not fit in the
    /// filter's address width.
    fn offsets(&self, base: u32, size: u32) -> Option<(u32, u32)> {
        let last = base.checked_add(size.checked_sub(1)?)?;
        let start = base.checked_sub(self.options.mem_map_base)?;
        let end = last - self.options.mem_map_base;
        if self.hw.addr_bits < u32::BITS && end >> self.hw.addr_bits != 0 {
            return None;
        }
        Some((start, end))
    }

    fn is_enabled(&self, id: u32) -> bool {
        let cfgr = LocalRegisterCopy::<u32, RegCfgr::Register>::new(
            self.regs.read(risaf::reg_cfgr(id)),
        );
        cfgr.is_set(RegCfgr::BREN)
    }

    /// Rewriting live region `id` parks its current range in the spare slot,
    /// which must not hold a region of its own.
    fn check_spare(&self, id: u32) -> RifResult<()> {
        let spare = self.spare_region();
        if id != spare && self.is_enabled(id) && self.is_enabled(spare) {
            cprintln!("[risaf] region {}: spare region {} in use", id, spare);
            Err(RifError::DRIVER_RISAF_SPARE_REGION_BUSY)?
        }
        Ok(())
    }

    fn apply(&mut self, id: u32, words: &RegionWords) -> RifResult<()> {
        self.check_spare(id)?;
        let spare = self.spare_region();
        let cover = id != spare && self.is_enabled(id);

        if cover {
            let current = self.read_words(id);
            self.write_words(spare, &current);
        }
        self.write_words(id, words);
        if cover {
            self.regs.write(risaf::reg_cfgr(spare), 0);
            self.regs.barrier();
        }
        Ok(())
    }

    fn read_words(&self, id: u32) -> RegionWords {
        RegionWords {
            start: self.regs.read(risaf::reg_startr(id)),
            end: self.regs.read(risaf::reg_endr(id)),
            cidcfgr: self.regs.read(risaf::reg_cidcfgr(id)),
            cfgr: self.regs.read(risaf::reg_cfgr(id)),
        }
    }

    fn write_words(&self, id: u32, words: &RegionWords) {
        self.regs.write(risaf::reg_cfgr(id), 0);
        self.regs.barrier();
        self.regs.write(risaf::reg_startr(id), words.start);
        self.regs.write(risaf::reg_endr(id), words.end);
        self.regs.write(risaf::reg_cidcfgr(id), words.cidcfgr);
        self.regs.write(risaf::reg_cfgr(id), words.cfgr);
        self.regs.barrier();
    }
}
