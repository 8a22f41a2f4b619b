/*++

Licensed under the Apache-2.0 license.

File Name:

    rifsc.rs

Abstract:

    File contains the RIF security controller: the peripheral (RISUP) filters
    and the bus master (RIMU) attributes of the whole system.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::rifsc::{self, HwCfgr1, HwCfgr2, Verr};
use tock_registers::LocalRegisterCopy;
use ureg::{MmioMut, RealMmioMut, RegisterBlock};

use crate::{
    cprintln, CompartmentId, ControllerKind, Domain, FilterAttributes, FilterBase,
    ResourceConfig, ResourceController, RifProt, Semaphore,
};

const RISUP_FILTERS: FilterBase =
    FilterBase::new(rifsc::SECCFGR0, rifsc::PRIVCFGR0, rifsc::PERX_CIDCFGR)
        .with_semaphore(rifsc::PERX_SEMCR)
        .with_lock(rifsc::RCFGLOCKR0)
        .with_cid_stride(rifsc::PERX_STRIDE);

/// Bus master attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RimuConfig {
    /// Master index
    pub id: u32,

    /// Value of the master's attribute register
    pub attr: u32,
}

/// What the RIFSC instance implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RifscCapabilities {
    pub rif_en: bool,
    pub sec_en: bool,
    pub priv_en: bool,
    pub nb_risup: u32,
    pub nb_rimu: u32,
    pub nb_risal: u32,
    pub major_rev: u32,
    pub minor_rev: u32,
}

impl RifscCapabilities {
    fn read<TMmio: MmioMut>(regs: &RegisterBlock<TMmio>) -> Self {
        let hwcfgr1 = LocalRegisterCopy::<u32, HwCfgr1::Register>::new(regs.read(rifsc::HWCFGR1));
        let hwcfgr2 = LocalRegisterCopy::<u32, HwCfgr2::Register>::new(regs.read(rifsc::HWCFGR2));
        let verr = LocalRegisterCopy::<u32, Verr::Register>::new(regs.read(rifsc::VERR));
        Self {
            rif_en: hwcfgr1.read(HwCfgr1::RIF_EN) != 0,
            sec_en: hwcfgr1.read(HwCfgr1::SEC_EN) != 0,
            priv_en: hwcfgr1.read(HwCfgr1::PRIV_EN) != 0,
            nb_risup: hwcfgr2.read(HwCfgr2::NB_RISUP),
            nb_rimu: hwcfgr2.read(HwCfgr2::NB_RIMU),
            nb_risal: hwcfgr2.read(HwCfgr2::NB_RISAL),
            major_rev: verr.read(Verr::MAJREV),
            minor_rev: verr.read(Verr::MINREV),
        }
    }
}

/// RIF Security Controller
pub struct Rifsc<'t, TMmio: MmioMut = RealMmioMut> {
    risup: ResourceController<'t, TMmio>,
    rimu: &'t [RimuConfig],
    caps: RifscCapabilities,
}

impl<'t, TMmio: MmioMut> Rifsc<'t, TMmio> {
    /// Read the controller's capabilities.
    ///
    /// # Arguments
    ///
    /// * `regs` - Register block
    /// * `risup` - Peripheral filter table
    /// * `rimu` - Bus master attribute table
    /// * `domain` - Compartment programming the filters
    ///
    /// # Error
    ///
    /// * `DRIVER_RIFSC_NOT_PRESENT` - the hardware reports no peripheral entries
    pub fn new(
        regs: RegisterBlock<TMmio>,
        risup: &'t [ResourceConfig],
        rimu: &'t [RimuConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        let caps = RifscCapabilities::read(&regs);
        cprintln!(
            "[rifsc] v{}.{} risup:{} rimu:{} risal:{}",
            caps.major_rev,
            caps.minor_rev,
            caps.nb_risup,
            caps.nb_rimu,
            caps.nb_risal
        );
        cprintln!(
            "[rifsc] rif:{} sec:{} priv:{}",
            caps.rif_en as u8,
            caps.sec_en as u8,
            caps.priv_en as u8
        );
        if caps.nb_risup == 0 {
            Err(RifError::DRIVER_RIFSC_NOT_PRESENT)?
        }

        let risup = ResourceController::new(
            regs,
            RISUP_FILTERS,
            ControllerKind::Default,
            caps.nb_risup.min(rifsc::MAX_RISUP),
            risup,
            domain,
        )?;
        Ok(Self { risup, rimu, caps })
    }

    pub fn capabilities(&self) -> RifscCapabilities {
        self.caps
    }

    pub fn domain(&self) -> Domain {
        self.risup.domain()
    }

    /// Peripheral filter controller
    pub fn risup(&self) -> &ResourceController<'t, TMmio> {
        &self.risup
    }

    /// Apply the peripheral filter table, then the bus master table.
    pub fn init(&mut self) -> RifResult<()> {
        if self.risup.table().len() > self.caps.nb_risup as usize {
            cprintln!(
                "[rifsc] {} risup entries, hardware has {}",
                self.risup.table().len(),
                self.caps.nb_risup
            );
            Err(RifError::DRIVER_RIFSC_TOO_MANY_RISUP)?
        }
        self.risup.init()?;
        self.setup_rimu()
    }

    fn setup_rimu(&mut self) -> RifResult<()> {
        let nb_rimu = self.caps.nb_rimu.min(rifsc::MAX_RIMU);
        for (idx, rimu) in self.rimu.iter().enumerate() {
            if rimu.id >= nb_rimu {
                cprintln!("[rifsc] rimu cfg({}/{}) error", idx + 1, self.rimu.len());
                Err(RifError::DRIVER_RIFSC_RIMU_ID_OUT_OF_RANGE)?
            }
        }

        if !self.caps.rif_en || !self.risup.domain().is_tdcid() {
            return Ok(());
        }

        let regs = self.risup.regs();
        for rimu in self.rimu {
            regs.write(
                rifsc::RIMC_ATTR0 + 4 * rimu.id as usize,
                rimu.attr & rifsc::RIMC_ATTR_MASK,
            );
        }
        Ok(())
    }

    /// Live attributes of bus master `id`.
    pub fn rimu_attr(&self, id: u32) -> RifResult<u32> {
        if id >= self.caps.nb_rimu.min(rifsc::MAX_RIMU) {
            Err(RifError::DRIVER_RIFSC_RIMU_ID_OUT_OF_RANGE)?
        }
        Ok(self.risup.regs().read(rifsc::RIMC_ATTR0 + 4 * id as usize) & rifsc::RIMC_ATTR_MASK)
    }

    /// Check whether this domain may use peripheral `id`.
    ///
    /// # Error
    ///
    /// * `DRIVER_RIFSC_PERIPHERAL_ID_OUT_OF_RANGE` - `id` is not a peripheral
    /// * `DRIVER_RIFSC_ACCESS_DENIED` - the filter excludes this compartment
    pub fn get_access_by_id(&self, id: u32) -> RifResult<()> {
        if id >= self.risup.resource_count() {
            Err(RifError::DRIVER_RIFSC_PERIPHERAL_ID_OUT_OF_RANGE)?
        }
        let attrs = self.risup.filter_attributes(id)?;
        if Self::accessible(&attrs, self.risup.domain().cid) {
            Ok(())
        } else {
            Err(RifError::DRIVER_RIFSC_ACCESS_DENIED)
        }
    }

    fn accessible(attrs: &FilterAttributes, cid: CompartmentId) -> bool {
        if attrs.sem_en {
            return attrs.whitelist.contains_cid(cid);
        }
        !attrs.cfen || attrs.scid == CompartmentId::Cid0 || attrs.scid == cid
    }

    pub fn set_conf(&mut self, config: &ResourceConfig) -> RifResult<()> {
        self.risup.set_conf(config)
    }

    /// Firewall entry point: apply a packed peripheral protection word.
    pub fn set_conf_word(&mut self, word: u32) -> RifResult<()> {
        self.risup.set_conf(&RifProt(word).to_config())
    }

    pub fn acquire_sem(&self, id: u32) -> RifResult<()> {
        self.risup.acquire_sem(id)
    }

    pub fn release_sem(&self, id: u32) -> RifResult<()> {
        self.risup.release_sem(id)
    }

    pub fn claim(&self, id: u32) -> RifResult<Semaphore<'_, 't, TMmio>> {
        self.risup.claim(id)
    }
}
