/*++

Licensed under the Apache-2.0 license.

File Name:

    risab.rs

Abstract:

    File contains the page-granular memory filter (RISAB) driver.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::risab::{
    self, Cr, HwCfgr1, Iacr, PgCidCfgr, MAX_CID, MAX_PAGES, PG_BLOCKS_MASK,
};
use tock_registers::LocalRegisterCopy;
use ureg::{MmioMut, RealMmioMut, RegisterBlock};

use crate::{cprintln, CidSet, CompartmentId, Domain, RisabProt};

/// Access policy of a memory region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAttributes {
    /// Secure access only
    pub sec: bool,

    /// Privileged access only, for every compartment
    pub privileged: bool,

    /// Compartment filtering enabled
    pub cfen: bool,

    /// Compartment the configuration of the pages is delegated to
    pub delegate: Option<CompartmentId>,

    pub priv_list: CidSet,
    pub read_list: CidSet,
    pub write_list: CidSet,
}

/// Address range `[base, base + size)` and its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u32,
    pub size: u32,
    pub attrs: MemoryAttributes,
}

impl MemoryRegion {
    pub fn from_prot(base: u32, size: u32, prot: RisabProt) -> Self {
        Self {
            base,
            size,
            attrs: prot.attributes(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RisabOptions {
    /// Address of the first byte of the protected memory
    pub mm_base: u32,

    /// Let secure and non-secure read accesses through without raising an
    /// illegal access event
    pub srwiad: bool,
}

/// Page-granular memory filter
pub struct Risab<TMmio: MmioMut = RealMmioMut> {
    regs: RegisterBlock<TMmio>,
    domain: Domain,
    options: RisabOptions,
    mm_size: u32,
    page_size: u32,
    n_pages: u32,

    /// Pages covered by a configured region
    configured: u32,
}

impl<TMmio: MmioMut> Risab<TMmio> {
    /// Read the filter's geometry.
    ///
    /// # Error
    ///
    /// * `DRIVER_RISAB_NOT_PRESENT` - the hardware reports no memory
    /// * `DRIVER_RISAB_TOO_MANY_PAGES` - more pages than the page bitmap holds
    pub fn new(
        regs: RegisterBlock<TMmio>,
        domain: Domain,
        options: RisabOptions,
    ) -> RifResult<Self> {
        let mm_size = regs.read(risab::HWCFGR2);
        let hwcfgr1 =
            LocalRegisterCopy::<u32, HwCfgr1::Register>::new(regs.read(risab::HWCFGR1));
        let n_pages = 1u32 << hwcfgr1.read(HwCfgr1::CFG7);
        let blocks_per_page = 1u32 << hwcfgr1.read(HwCfgr1::CFG6);
        let block_size = 1u32 << hwcfgr1.read(HwCfgr1::CFG5);

        if mm_size == 0 {
            Err(RifError::DRIVER_RISAB_NOT_PRESENT)?
        }
        if n_pages > MAX_PAGES {
            cprintln!("[risab] {} pages not supported", n_pages);
            Err(RifError::DRIVER_RISAB_TOO_MANY_PAGES)?
        }

        Ok(Self {
            regs,
            domain,
            options,
            mm_size,
            page_size: block_size * blocks_per_page,
            n_pages,
            configured: 0,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        self.n_pages
    }

    /// Size of the protected memory
    pub fn window_size(&self) -> u32 {
        self.mm_size
    }

    /// Bitmap of the pages already given a policy.
    pub fn configured_pages(&self) -> u32 {
        self.configured
    }

    /// Reset the filter to a known state and apply `regions`.
    pub fn init(&mut self, regions: &[MemoryRegion]) -> RifResult<()> {
        if self.domain.is_tdcid() {
            self.regs
                .set_bits(risab::IACR, (Iacr::CAEF::SET + Iacr::IAEF::SET).value);
            let srwiad = Cr::SRWIAD.mask << Cr::SRWIAD.shift;
            if self.options.srwiad {
                self.regs.set_bits(risab::CR, srwiad);
            } else {
                self.regs.clear_bits(risab::CR, srwiad);
            }
            self.clear_sec_priv();
        }
        self.configure(regions)
    }

    /// Apply `regions`.
    ///
    /// All regions are validated before the first write: on error no
    /// register has been touched.
    ///
    /// # Error
    ///
    /// * `DRIVER_RISAB_REGION_EMPTY` - zero size
    /// * `DRIVER_RISAB_REGION_OUT_OF_BOUNDS` - outside the protected memory
    /// * `DRIVER_RISAB_REGION_NOT_ALIGNED` - not on page boundaries
    /// * `DRIVER_RISAB_REGION_OVERLAP` - shares a page with another region
    pub fn configure(&mut self, regions: &[MemoryRegion]) -> RifResult<()> {
        let mut pending = self.configured;
        for (idx, region) in regions.iter().enumerate() {
            let pages = self.region_pages(idx, region)?;
            if pages & pending != 0 {
                cprintln!("[risab] region {} overlaps", idx);
                Err(RifError::DRIVER_RISAB_REGION_OVERLAP)?
            }
            pending |= pages;
        }

        for (idx, region) in regions.iter().enumerate() {
            let pages = self.region_pages(idx, region)?;
            self.apply(region, pages);
        }
        self.configured = pending;
        Ok(())
    }

    fn region_pages(&self, idx: usize, region: &MemoryRegion) -> RifResult<u32> {
        if region.size == 0 {
            cprintln!("[risab] region {} is empty", idx);
            Err(RifError::DRIVER_RISAB_REGION_EMPTY)?
        }

        let start = region.base.checked_sub(self.options.mm_base);
        let end = start.and_then(|start| start.checked_add(region.size));
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if end <= self.mm_size => (start, end),
            _ => {
                cprintln!(
                    "[risab] region {} [0x{:08X}+0x{:08X}] out of bounds",
                    idx,
                    region.base,
                    region.size
                );
                return Err(RifError::DRIVER_RISAB_REGION_OUT_OF_BOUNDS);
            }
        };

        if start % self.page_size != 0 || end % self.page_size != 0 {
            cprintln!("[risab] region {} not aligned on page size", idx);
            Err(RifError::DRIVER_RISAB_REGION_NOT_ALIGNED)?
        }

        let first = start / self.page_size;
        let last = (end - 1) / self.page_size;
        if last >= self.n_pages {
            cprintln!("[risab] region {} beyond page {}", idx, self.n_pages);
            Err(RifError::DRIVER_RISAB_REGION_OUT_OF_BOUNDS)?
        }
        Ok(page_mask(first, last))
    }

    fn apply(&self, region: &MemoryRegion, pages: u32) {
        let attrs = &region.attrs;
        let blocks = |on: bool| if on { PG_BLOCKS_MASK } else { 0 };

        for page in self.pages(pages) {
            self.regs
                .modify(risab::pg_privcfgr(page), PG_BLOCKS_MASK, blocks(attrs.privileged));
        }

        if !self.access_granted(pages.trailing_zeros()) {
            return;
        }

        for page in self.pages(pages) {
            self.regs
                .modify(risab::pg_seccfgr(page), PG_BLOCKS_MASK, blocks(attrs.sec));
        }

        let mut cidcfgr = LocalRegisterCopy::<u32, PgCidCfgr::Register>::new(0);
        cidcfgr.write(
            PgCidCfgr::CFEN.val(attrs.cfen.into())
                + PgCidCfgr::DCEN.val(attrs.delegate.is_some().into())
                + PgCidCfgr::DDCID.val(attrs.delegate.map_or(0, u32::from)),
        );
        for page in self.pages(pages) {
            self.regs.write(risab::pg_cidcfgr(page), cidcfgr.get());
        }

        // Only the region's own pages change in the list registers.
        for cid in 0..MAX_CID {
            let granted = |list: CidSet| {
                if u32::from(list.bits()) & (1 << cid) != 0 {
                    pages
                } else {
                    0
                }
            };
            self.regs
                .modify(risab::cid_rdcfgr(cid), pages, granted(attrs.read_list));
            self.regs
                .modify(risab::cid_wrcfgr(cid), pages, granted(attrs.write_list));
            self.regs
                .modify(risab::cid_privcfgr(cid), pages, granted(attrs.priv_list));
        }
    }

    /// Whether this domain may set the security and compartment
    /// configuration of `page`.
    fn access_granted(&self, page: u32) -> bool {
        let cidcfgr = LocalRegisterCopy::<u32, PgCidCfgr::Register>::new(
            self.regs.read(risab::pg_cidcfgr(page)),
        );
        let cfen = cidcfgr.is_set(PgCidCfgr::CFEN);
        let dcen = cidcfgr.is_set(PgCidCfgr::DCEN);

        if self.domain.is_tdcid() && (!cfen || !dcen) {
            return true;
        }
        cfen && dcen && cidcfgr.read(PgCidCfgr::DDCID) == u32::from(self.domain.cid)
    }

    fn clear_sec_priv(&self) {
        for page in 0..self.n_pages {
            self.regs
                .clear_bits(risab::pg_seccfgr(page), PG_BLOCKS_MASK);
            self.regs
                .clear_bits(risab::pg_privcfgr(page), PG_BLOCKS_MASK);
        }
    }

    fn pages(&self, mask: u32) -> impl Iterator<Item = u32> {
        (0..self.n_pages).filter(move |page| mask & (1 << page) != 0)
    }
}

/// Bitmap of pages `first..=last`.
fn page_mask(first: u32, last: u32) -> u32 {
    let width = last - first + 1;
    if width >= 32 {
        u32::MAX
    } else {
        ((1 << width) - 1) << first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rif_emu_bus::{BusMmio, RvAddr};
    use rif_emu_periph::{CompartmentPort, SharedFabric};

    const BASE: usize = 0x420f_0000;
    const MM_BASE: u32 = 0x0a00_0000;
    const PAGE: u32 = 0x1000;

    fn at(offset: usize) -> RvAddr {
        (BASE + offset) as RvAddr
    }

    /// 16 pages of 8 blocks of 512 bytes.
    fn fabric() -> SharedFabric {
        let fabric = SharedFabric::new();
        fabric.poke(at(risab::HWCFGR2), 16 * PAGE);
        fabric.poke(at(risab::HWCFGR1), (4 << 24) | (3 << 20) | (9 << 16));
        fabric
    }

    fn filter_on(fabric: &SharedFabric, domain: Domain) -> Risab<BusMmio<CompartmentPort>> {
        let regs = unsafe {
            RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(domain.cid.into())))
        };
        Risab::new(
            regs,
            domain,
            RisabOptions {
                mm_base: MM_BASE,
                srwiad: true,
            },
        )
        .unwrap()
    }

    fn region(first_page: u32, pages: u32, attrs: MemoryAttributes) -> MemoryRegion {
        MemoryRegion {
            base: MM_BASE + first_page * PAGE,
            size: pages * PAGE,
            attrs,
        }
    }

    #[test]
    fn test_geometry() {
        let fabric = fabric();
        let filter = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        assert_eq!(filter.page_size(), PAGE);
        assert_eq!(filter.page_count(), 16);
        assert_eq!(filter.window_size(), 16 * PAGE);
    }

    #[test]
    fn test_too_many_pages() {
        let fabric = fabric();
        fabric.poke(at(risab::HWCFGR1), (6 << 24) | (3 << 20) | (9 << 16));
        let regs = unsafe { RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(1))) };
        assert!(matches!(
            Risab::new(regs, Domain::FIRMWARE, RisabOptions::default()),
            Err(RifError::DRIVER_RISAB_TOO_MANY_PAGES)
        ));
    }

    #[test]
    fn test_page_mask() {
        assert_eq!(page_mask(0, 0), 0x1);
        assert_eq!(page_mask(2, 4), 0x1c);
        assert_eq!(page_mask(0, 31), u32::MAX);
        assert_eq!(page_mask(31, 31), 0x8000_0000);
    }

    #[test]
    fn test_init_owner() {
        let fabric = fabric();
        fabric.poke(at(risab::pg_seccfgr(9)), 0xff);
        let mut filter = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        let attrs = MemoryAttributes {
            sec: true,
            privileged: false,
            cfen: true,
            delegate: None,
            priv_list: CidSet::CID1,
            read_list: CidSet::CID1 | CidSet::CID2,
            write_list: CidSet::CID1,
        };
        filter.init(&[region(2, 3, attrs)]).unwrap();

        assert_eq!(fabric.peek(at(risab::IACR)), 0x3);
        assert_eq!(fabric.peek(at(risab::CR)), 0x8000_0000);
        assert_eq!(fabric.peek(at(risab::pg_seccfgr(9))), 0);
        for page in 2..5 {
            assert_eq!(fabric.peek(at(risab::pg_seccfgr(page))), 0xff);
            assert_eq!(fabric.peek(at(risab::pg_privcfgr(page))), 0);
            assert_eq!(fabric.peek(at(risab::pg_cidcfgr(page))), 0x1);
        }
        assert_eq!(fabric.peek(at(risab::pg_seccfgr(5))), 0);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(1))), 0x1c);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(2))), 0x1c);
        assert_eq!(fabric.peek(at(risab::cid_wrcfgr(1))), 0x1c);
        assert_eq!(fabric.peek(at(risab::cid_wrcfgr(2))), 0);
        assert_eq!(fabric.peek(at(risab::cid_privcfgr(1))), 0x1c);
        assert_eq!(filter.configured_pages(), 0x1c);
    }

    #[test]
    fn test_lists_written_after_pages() {
        let fabric = fabric();
        let mut filter = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        let attrs = MemoryAttributes {
            cfen: true,
            read_list: CidSet::CID3,
            ..Default::default()
        };
        filter.configure(&[region(0, 1, attrs)]).unwrap();

        let writes = fabric.trace().writes();
        let last_page_write = writes
            .iter()
            .rposition(|a| a.addr == at(risab::pg_cidcfgr(0)))
            .unwrap();
        let first_list_write = writes
            .iter()
            .position(|a| a.addr == at(risab::cid_rdcfgr(0)))
            .unwrap();
        assert!(last_page_write < first_list_write);
    }

    #[test]
    fn test_region_validation() {
        let fabric = fabric();
        let mut filter = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        let attrs = MemoryAttributes::default();

        let empty = MemoryRegion {
            base: MM_BASE,
            size: 0,
            attrs,
        };
        assert_eq!(
            filter.configure(&[empty]),
            Err(RifError::DRIVER_RISAB_REGION_EMPTY)
        );
        assert_eq!(
            filter.configure(&[region(15, 2, attrs)]),
            Err(RifError::DRIVER_RISAB_REGION_OUT_OF_BOUNDS)
        );
        let below = MemoryRegion {
            base: MM_BASE - PAGE,
            size: PAGE,
            attrs,
        };
        assert_eq!(
            filter.configure(&[below]),
            Err(RifError::DRIVER_RISAB_REGION_OUT_OF_BOUNDS)
        );
        let unaligned = MemoryRegion {
            base: MM_BASE + 0x200,
            size: PAGE,
            attrs,
        };
        let err = filter.configure(&[unaligned]).unwrap_err();
        assert_eq!(err, RifError::DRIVER_RISAB_REGION_NOT_ALIGNED);
        assert_eq!(err.kind(), rif_error::ErrorKind::NotSupported);
        assert!(fabric.trace().is_empty());
    }

    #[test]
    fn test_overlap_touches_nothing() {
        let fabric = fabric();
        let mut filter = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        let attrs = MemoryAttributes {
            sec: true,
            ..Default::default()
        };
        let err = filter
            .configure(&[region(0, 4, attrs), region(3, 2, attrs)])
            .unwrap_err();
        assert_eq!(err, RifError::DRIVER_RISAB_REGION_OVERLAP);
        assert_eq!(err.kind(), rif_error::ErrorKind::InvalidArgument);
        assert!(fabric.trace().is_empty());
        assert_eq!(filter.configured_pages(), 0);

        // Overlap with a region configured by an earlier call
        filter.configure(&[region(0, 4, attrs)]).unwrap();
        assert_eq!(
            filter.configure(&[region(3, 1, attrs)]),
            Err(RifError::DRIVER_RISAB_REGION_OVERLAP)
        );
    }

    #[test]
    fn test_delegated_pages() {
        let fabric = fabric();
        // Pages 4..8 delegated to CID2
        for page in 4..8 {
            fabric.poke(at(risab::pg_cidcfgr(page)), 0x25);
        }
        let attrs = MemoryAttributes {
            sec: true,
            privileged: true,
            cfen: true,
            delegate: Some(CompartmentId::Cid2),
            read_list: CidSet::CID2,
            ..Default::default()
        };

        // The owner only sets the privilege bits of delegated pages.
        let mut owner = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        owner.configure(&[region(4, 4, attrs)]).unwrap();
        assert_eq!(fabric.peek(at(risab::pg_privcfgr(4))), 0xff);
        assert_eq!(fabric.peek(at(risab::pg_seccfgr(4))), 0);

        let mut delegate = filter_on(&fabric, Domain::delegate(CompartmentId::Cid2));
        delegate.configure(&[region(4, 4, attrs)]).unwrap();
        assert_eq!(fabric.peek(at(risab::pg_seccfgr(7))), 0xff);
        assert_eq!(fabric.peek(at(risab::pg_cidcfgr(7))), 0x25);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(2))), 0xf0);

        // Not delegated to CID3: privilege only.
        let mut other = filter_on(&fabric, Domain::delegate(CompartmentId::Cid3));
        let attrs = MemoryAttributes {
            privileged: false,
            sec: false,
            ..attrs
        };
        other.configure(&[region(4, 1, attrs)]).unwrap();
        assert_eq!(fabric.peek(at(risab::pg_privcfgr(4))), 0);
        assert_eq!(fabric.peek(at(risab::pg_seccfgr(4))), 0xff);
    }

    #[test]
    fn test_lists_keep_other_pages() {
        let fabric = fabric();
        let mut owner = filter_on(&fabric, Domain::tdcid(CompartmentId::Cid1));
        let delegated = MemoryAttributes {
            cfen: true,
            delegate: Some(CompartmentId::Cid2),
            read_list: CidSet::CID1 | CidSet::CID2,
            write_list: CidSet::CID2,
            ..Default::default()
        };
        let shared = MemoryAttributes {
            cfen: true,
            privileged: true,
            read_list: CidSet::CID3,
            ..Default::default()
        };
        owner
            .init(&[region(0, 4, delegated), region(4, 4, shared)])
            .unwrap();
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(1))), 0x0f);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(3))), 0xf0);

        let mut delegate = filter_on(&fabric, Domain::delegate(CompartmentId::Cid2));
        let narrowed = MemoryAttributes {
            read_list: CidSet::CID2,
            ..delegated
        };
        delegate.configure(&[region(0, 2, narrowed)]).unwrap();

        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(3))), 0xf0);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(1))), 0x0c);
        assert_eq!(fabric.peek(at(risab::cid_rdcfgr(2))), 0x0f);
        assert_eq!(fabric.peek(at(risab::cid_wrcfgr(2))), 0x0f);
    }

    #[test]
    fn test_from_prot() {
        let mut prot = RisabProt::default();
        prot.set_sec(true);
        prot.set_read_list(0x04);
        let region = MemoryRegion::from_prot(MM_BASE, PAGE, prot);
        assert!(region.attrs.sec);
        assert_eq!(region.attrs.read_list, CidSet::CID2);
    }
}
