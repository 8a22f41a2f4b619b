/*++

Licensed under the Apache-2.0 license.

File Name:

    controller.rs

Abstract:

    File contains the resource controller: static configuration of the
    compartment filters of a RIF-aware block and arbitration of its hardware
    semaphores.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::rif::{CidCfgr, SemCr, IDS_PER_REG};
use tock_registers::LocalRegisterCopy;
use ureg::{MmioMut, RealMmioMut, RegisterBlock};

use crate::{
    cprintln, CidLayout, CompartmentId, Domain, FilterAttributes, ResourceConfig, RifProt,
};

/// Processors a processor-indexed controller can filter.
const MAX_PROCESSORS: usize = 16;

/// Sub-blocks a dual-sub-block controller can have.
const MAX_SUB_BLOCKS: usize = 2;

const CFEN: u32 = 1 << 0;
const MUTEX: u32 = 1 << 0;

/// Register offsets of the filter register groups of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterBase {
    /// First secure configuration word
    pub sec: usize,

    /// First privilege configuration word
    pub privileged: usize,

    /// Compartment filter of resource 0
    pub cid: usize,

    /// Semaphore of resource 0, if resources can be shared
    pub sem: Option<usize>,

    /// First lock word, if the configuration can be locked
    pub lock: Option<usize>,

    /// Distance between the compartment filters of consecutive resources
    pub cid_stride: usize,

    /// Distance between consecutive secure, privilege and lock words
    pub bank_stride: usize,

    pub layout: CidLayout,
}

impl FilterBase {
    pub const fn new(sec: usize, privileged: usize, cid: usize) -> Self {
        Self {
            sec,
            privileged,
            cid,
            sem: None,
            lock: None,
            cid_stride: 0x8,
            bank_stride: 0x4,
            layout: CidLayout::Standard,
        }
    }

    pub const fn with_semaphore(self, sem: usize) -> Self {
        Self {
            sem: Some(sem),
            ..self
        }
    }

    pub const fn with_lock(self, lock: usize) -> Self {
        Self {
            lock: Some(lock),
            ..self
        }
    }

    pub const fn with_cid_stride(self, cid_stride: usize) -> Self {
        Self { cid_stride, ..self }
    }

    pub const fn with_bank_stride(self, bank_stride: usize) -> Self {
        Self {
            bank_stride,
            ..self
        }
    }

    pub const fn with_layout(self, layout: CidLayout) -> Self {
        Self { layout, ..self }
    }
}

/// Processor of a processor-indexed controller bound to a compartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorBinding {
    /// Processor number, 1-based
    pub processor: u32,

    pub cid: CompartmentId,
}

/// Register layout variants of the RIF-aware blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind<'t> {
    /// One secure/privilege bit per resource, one compartment filter and
    /// semaphore per resource.
    Default,

    /// Per-agent compartment filters and semaphores `agent_stride` apart.
    MultiAgent { agent_stride: usize },

    /// Events additionally filtered per processor. Every processor filter at
    /// `processor_cid + n * processor_stride` gets the CID of its binding.
    ProcessorIndexed {
        processor_cid: usize,
        processor_stride: usize,
        processors: u32,
        bindings: &'t [ProcessorBinding],
    },

    /// Resources grouped in sub-blocks of `channels_per_block`, each sub-block
    /// having a single secure word, privilege word and compartment filter.
    DualSubBlock {
        sub_block_stride: usize,
        channels_per_block: u32,
    },
}

/// Resource Controller
pub struct ResourceController<'t, TMmio: MmioMut = RealMmioMut> {
    regs: RegisterBlock<TMmio>,
    base: FilterBase,
    kind: ControllerKind<'t>,
    resource_count: u32,
    table: &'t [ResourceConfig],
    domain: Domain,
}

impl<'t, TMmio: MmioMut> ResourceController<'t, TMmio> {
    /// Create a controller
    ///
    /// # Arguments
    ///
    /// * `regs` - Register block of the controller
    /// * `base` - Offsets of the filter registers
    /// * `kind` - Layout variant
    /// * `resource_count` - Number of resources
    /// * `table` - Static configuration applied by `init`
    /// * `domain` - Compartment programming the filters
    ///
    /// # Error
    ///
    /// * `DRIVER_RIF_NO_RESOURCES` - `resource_count` is zero
    pub fn new(
        regs: RegisterBlock<TMmio>,
        base: FilterBase,
        kind: ControllerKind<'t>,
        resource_count: u32,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        if resource_count == 0 {
            Err(RifError::DRIVER_RIF_NO_RESOURCES)?
        }
        Ok(Self {
            regs,
            base,
            kind,
            resource_count,
            table,
            domain,
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn resource_count(&self) -> u32 {
        self.resource_count
    }

    pub fn table(&self) -> &'t [ResourceConfig] {
        self.table
    }

    pub fn kind(&self) -> ControllerKind<'t> {
        self.kind
    }

    pub(crate) fn regs(&self) -> &RegisterBlock<TMmio> {
        &self.regs
    }

    /// Apply the static configuration table.
    ///
    /// Stops at the first failing entry; everything written before it stays
    /// in place.
    pub fn init(&mut self) -> RifResult<()> {
        if self.table.len() > self.resource_count as usize {
            cprintln!(
                "[rif] {} entries for {} resources",
                self.table.len(),
                self.resource_count
            );
            Err(RifError::DRIVER_RIF_TABLE_TOO_LARGE)?
        }

        match self.kind {
            ControllerKind::ProcessorIndexed {
                processor_cid,
                processor_stride,
                processors,
                bindings,
            } => {
                self.init_processor_indexed(processor_cid, processor_stride, processors, bindings)
            }
            ControllerKind::DualSubBlock {
                sub_block_stride,
                channels_per_block,
            } => self.init_dual_sub_block(sub_block_stride, channels_per_block),
            _ => {
                let table = self.table;
                self.set_config(table)
            }
        }
    }

    /// Apply `configs` in order, stopping at the first failure.
    pub fn set_config(&mut self, configs: &[ResourceConfig]) -> RifResult<()> {
        for config in configs {
            if let Err(err) = self.set_conf(config) {
                cprintln!(
                    "[rif] resource {} setup failed: 0x{:08X}",
                    config.id,
                    u32::from(err)
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Apply the configuration of a single resource.
    ///
    /// The owning domain writes the configuration unconditionally and then
    /// takes the semaphore if the new configuration lets it. Any other domain
    /// only writes the secure and privilege bits, and only when it holds the
    /// semaphore or is the static owner; otherwise nothing is written and the
    /// call succeeds. Event controllers are only configured by the owning
    /// domain: for any other domain the call has no effect.
    ///
    /// # Error
    ///
    /// * `DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE` - `config.id` is not a resource
    /// * `DRIVER_RIF_INVALID_CID` - a CID does not fit the register layout
    /// * `DRIVER_RIF_LOCK_NOT_SUPPORTED` - lock requested without a lock register
    /// * `DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED` - the semaphore could not be taken
    pub fn set_conf(&mut self, config: &ResourceConfig) -> RifResult<()> {
        self.check_id(config.id)?;
        let cidcfgr = self.base.layout.encode(&config.attrs)?;
        match (self.domain.is_tdcid(), self.kind) {
            (true, _) => self.set_conf_tdcid(config, cidcfgr),
            (false, ControllerKind::ProcessorIndexed { .. }) => Ok(()),
            (false, _) => self.set_conf_delegate(config),
        }
    }

    /// Apply a packed resource protection word.
    pub fn set_conf_word(&mut self, word: u32) -> RifResult<()> {
        self.set_conf(&RifProt(word).to_config())
    }

    fn set_conf_tdcid(&mut self, config: &ResourceConfig, cidcfgr: u32) -> RifResult<()> {
        if config.lock && self.base.lock.is_none() {
            Err(RifError::DRIVER_RIF_LOCK_NOT_SUPPORTED)?
        }

        let cid = self.cid_offset(config.id);
        self.regs.clear_bits(cid, self.base.layout.disable_mask());
        self.write_sec_priv(config);
        self.regs.write(cid, cidcfgr);

        if let (true, Some(lock)) = (config.lock, self.base.lock) {
            let (offset, bit) = self.bank_bit(lock, config.id);
            self.regs.set_bits(offset, bit);
        }

        if config.attrs.semaphore_available(self.domain.cid) {
            self.acquire_sem(config.id)?;
        }
        Ok(())
    }

    fn set_conf_delegate(&mut self, config: &ResourceConfig) -> RifResult<()> {
        let live = self.read_attributes(config.id);
        let may_write = if self.base.sem.is_some() && live.semaphore_available(self.domain.cid) {
            self.acquire_sem(config.id)?;
            true
        } else {
            live.statically_owned_by(self.domain.cid)
        };

        if may_write {
            self.write_sec_priv(config);
        }
        Ok(())
    }

    /// Take the semaphore of resource `id` for this domain.
    ///
    /// A single set-and-verify: the call fails immediately when another
    /// compartment holds the semaphore or this one may not take it.
    /// Succeeds without effect on resources that have no semaphore.
    ///
    /// # Error
    ///
    /// * `DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE` - `id` is not a resource
    /// * `DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED` - the read-back does not show
    ///   this domain as the owner
    pub fn acquire_sem(&self, id: u32) -> RifResult<()> {
        self.check_id(id)?;
        let sem = match self.sem_offset(id) {
            Some(sem) => sem,
            None => return Ok(()),
        };

        self.regs.set_bits(sem, MUTEX);
        if self.regs.read(sem) != self.owned_semcr() {
            Err(RifError::DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED)?
        }
        Ok(())
    }

    /// Give back the semaphore of resource `id`.
    ///
    /// Releasing a free semaphore succeeds.
    ///
    /// # Error
    ///
    /// * `DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE` - `id` is not a resource
    /// * `DRIVER_RIF_SEMAPHORE_NOT_OWNED` - another compartment holds it
    pub fn release_sem(&self, id: u32) -> RifResult<()> {
        self.check_id(id)?;
        let sem = match self.sem_offset(id) {
            Some(sem) => sem,
            None => return Ok(()),
        };

        let semcr = self.regs.read(sem);
        let reg = LocalRegisterCopy::<u32, SemCr::Register>::new(semcr);
        if !reg.is_set(SemCr::MUTEX) {
            return Ok(());
        }
        if semcr != self.owned_semcr() {
            Err(RifError::DRIVER_RIF_SEMAPHORE_NOT_OWNED)?
        }
        self.regs.clear_bits(sem, MUTEX);
        Ok(())
    }

    /// Take the semaphore of resource `id`, returning a token that gives it
    /// back when released or dropped.
    pub fn claim(&self, id: u32) -> RifResult<Semaphore<'_, 't, TMmio>> {
        self.acquire_sem(id)?;
        Ok(Semaphore { ctrl: self, id })
    }

    /// Live compartment filter attributes of resource `id`.
    pub fn filter_attributes(&self, id: u32) -> RifResult<FilterAttributes> {
        self.check_id(id)?;
        Ok(self.read_attributes(id))
    }

    /// Live secure bit of resource `id`.
    pub fn is_secure(&self, id: u32) -> RifResult<bool> {
        self.check_id(id)?;
        let (offset, bit) = self.bank_bit(self.base.sec, id);
        Ok(self.regs.read(offset) & bit != 0)
    }

    /// Live privilege bit of resource `id`.
    pub fn is_privileged(&self, id: u32) -> RifResult<bool> {
        self.check_id(id)?;
        let (offset, bit) = self.bank_bit(self.base.privileged, id);
        Ok(self.regs.read(offset) & bit != 0)
    }

    fn init_processor_indexed(
        &mut self,
        processor_cid: usize,
        processor_stride: usize,
        processors: u32,
        bindings: &[ProcessorBinding],
    ) -> RifResult<()> {
        let processors = (processors as usize).min(MAX_PROCESSORS);
        let mut bound = [None; MAX_PROCESSORS];
        for binding in bindings {
            let slot = match (binding.processor as usize).checked_sub(1) {
                Some(idx) if idx < processors => &mut bound[idx],
                _ => {
                    cprintln!("[rif] no processor {}", binding.processor);
                    return Err(RifError::DRIVER_RIF_PROCESSOR_OUT_OF_RANGE);
                }
            };
            match *slot {
                Some(cid) if cid != binding.cid => {
                    cprintln!("[rif] processor {} bound twice", binding.processor);
                    Err(RifError::DRIVER_RIF_PROCESSOR_CID_MISMATCH)?
                }
                _ => *slot = Some(binding.cid),
            }
        }

        let tdcid = self.domain.is_tdcid();
        if tdcid {
            for idx in 0..processors {
                self.regs
                    .clear_bits(processor_cid + idx * processor_stride, CFEN);
            }
        }

        let table = self.table;
        self.set_config(table)?;

        if tdcid {
            for (idx, cid) in bound.iter().take(processors).enumerate() {
                let cid = cid.unwrap_or(CompartmentId::Cid0);
                self.regs.write(
                    processor_cid + idx * processor_stride,
                    (CidCfgr::CFEN::SET + CidCfgr::SCID.val(cid.into())).value,
                );
            }
        }
        Ok(())
    }

    fn init_dual_sub_block(
        &mut self,
        sub_block_stride: usize,
        channels_per_block: u32,
    ) -> RifResult<()> {
        let mut sec = [0u32; MAX_SUB_BLOCKS];
        let mut privileged = [0u32; MAX_SUB_BLOCKS];
        let mut attrs: [Option<FilterAttributes>; MAX_SUB_BLOCKS] = [None; MAX_SUB_BLOCKS];

        for config in self.table {
            self.check_id(config.id)?;
            if config.lock {
                Err(RifError::DRIVER_RIF_LOCK_NOT_SUPPORTED)?
            }
            self.base.layout.encode(&config.attrs)?;

            let block = (config.id / channels_per_block) as usize;
            let bit = 1 << (config.id % channels_per_block);
            let slot = attrs
                .get_mut(block)
                .ok_or(RifError::DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE)?;
            match *slot {
                Some(prev) if prev != config.attrs => {
                    cprintln!(
                        "[rif] resource {} disagrees with sub-block {}",
                        config.id,
                        block
                    );
                    Err(RifError::DRIVER_RIF_SUB_BLOCK_ATTR_MISMATCH)?
                }
                _ => *slot = Some(config.attrs),
            }
            if config.sec {
                sec[block] |= bit;
            }
            if config.privileged {
                privileged[block] |= bit;
            }
        }

        if !self.domain.is_tdcid() {
            let table = self.table;
            return self.set_config(table);
        }

        for (block, attrs) in attrs.iter().enumerate() {
            let attrs = match attrs {
                Some(attrs) => attrs,
                None => continue,
            };
            let offset = block * sub_block_stride;
            self.regs.clear_bits(self.base.cid + offset, CFEN);
            self.regs.write(self.base.sec + offset, sec[block]);
            self.regs
                .write(self.base.privileged + offset, privileged[block]);
            self.regs
                .write(self.base.cid + offset, self.base.layout.encode(attrs)?);
        }
        Ok(())
    }

    fn check_id(&self, id: u32) -> RifResult<()> {
        if id >= self.resource_count {
            Err(RifError::DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE)?
        }
        Ok(())
    }

    fn read_attributes(&self, id: u32) -> FilterAttributes {
        self.base.layout.decode(self.regs.read(self.cid_offset(id)))
    }

    fn write_sec_priv(&self, config: &ResourceConfig) {
        let (offset, bit) = self.bank_bit(self.base.sec, config.id);
        self.regs
            .modify(offset, bit, if config.sec { bit } else { 0 });

        let (offset, bit) = self.bank_bit(self.base.privileged, config.id);
        self.regs
            .modify(offset, bit, if config.privileged { bit } else { 0 });
    }

    fn owned_semcr(&self) -> u32 {
        (SemCr::MUTEX::SET + SemCr::SCID.val(self.domain.cid.into())).value
    }

    /// Word and bit of resource `id` in the bank of words starting at `first`.
    fn bank_bit(&self, first: usize, id: u32) -> (usize, u32) {
        match self.kind {
            ControllerKind::DualSubBlock {
                sub_block_stride,
                channels_per_block,
            } => (
                first + sub_block_stride * (id / channels_per_block) as usize,
                1 << (id % channels_per_block),
            ),
            _ => (
                first + self.base.bank_stride * (id / IDS_PER_REG) as usize,
                1 << (id % IDS_PER_REG),
            ),
        }
    }

    fn cid_offset(&self, id: u32) -> usize {
        match self.kind {
            ControllerKind::MultiAgent { agent_stride } => {
                self.base.cid + agent_stride * id as usize
            }
            ControllerKind::DualSubBlock {
                sub_block_stride,
                channels_per_block,
            } => self.base.cid + sub_block_stride * (id / channels_per_block) as usize,
            _ => self.base.cid + self.base.cid_stride * id as usize,
        }
    }

    fn sem_offset(&self, id: u32) -> Option<usize> {
        let stride = match self.kind {
            ControllerKind::MultiAgent { agent_stride } => agent_stride,
            ControllerKind::DualSubBlock { .. } => return None,
            _ => self.base.cid_stride,
        };
        self.base.sem.map(|sem| sem + stride * id as usize)
    }
}

/// Ownership of a resource's hardware semaphore.
///
/// Released when [`Semaphore::release`] is called or when dropped; a failed
/// release on drop is ignored.
pub struct Semaphore<'a, 't, TMmio: MmioMut = RealMmioMut> {
    ctrl: &'a ResourceController<'t, TMmio>,
    id: u32,
}

impl<TMmio: MmioMut> Semaphore<'_, '_, TMmio> {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Give the semaphore back.
    pub fn release(self) -> RifResult<()> {
        let result = self.ctrl.release_sem(self.id);
        core::mem::forget(self);
        result
    }
}

impl<TMmio: MmioMut> Drop for Semaphore<'_, '_, TMmio> {
    fn drop(&mut self) {
        let _ = self.ctrl.release_sem(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CidSet;
    use rif_emu_bus::{BusMmio, RvAddr};
    use rif_emu_periph::{CompartmentPort, SharedFabric};
    use rif_registers::rcc;

    const BASE: usize = 0x4420_0000;

    fn addr(offset: usize) -> RvAddr {
        (BASE + offset) as RvAddr
    }

    fn fabric() -> SharedFabric {
        let fabric = SharedFabric::new();
        fabric.add_semaphores(
            addr(rcc::R0SEMCR),
            addr(rcc::R0CIDCFGR),
            rcc::RX_STRIDE as RvAddr,
            rcc::RIF_RESOURCES,
        );
        fabric.add_lock(addr(rcc::RCFGLOCKR0));
        fabric
    }

    fn controller<'t>(
        fabric: &SharedFabric,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> ResourceController<'t, BusMmio<CompartmentPort>> {
        let regs = unsafe {
            RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(domain.cid.into())))
        };
        ResourceController::rcc(regs, table, domain).unwrap()
    }

    #[test]
    fn test_id_out_of_range() {
        let fabric = fabric();
        let mut ctrl = controller(&fabric, &[], Domain::tdcid(CompartmentId::Cid1));
        let config =
            ResourceConfig::new(rcc::RIF_RESOURCES, true, true, FilterAttributes::DISABLED);
        assert_eq!(
            ctrl.set_conf(&config),
            Err(RifError::DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE)
        );
        assert_eq!(
            ctrl.acquire_sem(rcc::RIF_RESOURCES),
            Err(RifError::DRIVER_RIF_RESOURCE_ID_OUT_OF_RANGE)
        );
        assert!(fabric.trace().is_empty());
    }

    #[test]
    fn test_tdcid_write_order() {
        let fabric = fabric();
        let mut ctrl = controller(&fabric, &[], Domain::tdcid(CompartmentId::Cid1));
        fabric.poke(addr(rcc::SECCFGR0 + 4), 0x8000_0000);

        // Resource 33 lives in the second secure word, bit 1.
        let owner = FilterAttributes::static_owner(CompartmentId::Cid2);
        let config = ResourceConfig::new(33, true, false, owner).locked();
        ctrl.set_conf(&config).unwrap();

        let cid = addr(rcc::R0CIDCFGR + 33 * rcc::RX_STRIDE);
        let writes: Vec<_> = fabric
            .trace()
            .writes()
            .into_iter()
            .map(|a| (a.addr, a.val))
            .collect();
        assert_eq!(
            writes,
            vec![
                (cid, 0),
                (addr(rcc::SECCFGR0 + 4), 0x8000_0002),
                (addr(rcc::PRIVCFGR0 + 4), 0),
                (cid, 0x21),
                (addr(rcc::RCFGLOCKR0 + 4), 0x2),
            ]
        );
        assert_eq!(ctrl.is_secure(33), Ok(true));
        assert_eq!(ctrl.is_privileged(33), Ok(false));
        assert_eq!(
            ctrl.filter_attributes(33),
            Ok(FilterAttributes::static_owner(CompartmentId::Cid2))
        );
    }

    #[test]
    fn test_tdcid_auto_acquire_uses_membership() {
        let fabric = fabric();
        let mut ctrl = controller(&fabric, &[], Domain::tdcid(CompartmentId::Cid2));
        let shared = FilterAttributes::shared(CidSet::CID2 | CidSet::CID5);
        ctrl.set_conf(&ResourceConfig::new(4, false, false, shared))
            .unwrap();
        assert_eq!(
            fabric.semaphore_owner(addr(rcc::R0SEMCR + 4 * rcc::RX_STRIDE)),
            Some(2)
        );

        // Not whitelisted: configured but not taken.
        let others = FilterAttributes::shared(CidSet::CID5);
        ctrl.set_conf(&ResourceConfig::new(5, false, false, others))
            .unwrap();
        assert_eq!(
            fabric.semaphore_owner(addr(rcc::R0SEMCR + 5 * rcc::RX_STRIDE)),
            None
        );
    }

    #[test]
    fn test_lock_without_lock_register() {
        let fabric = SharedFabric::new();
        let regs = unsafe { RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(1))) };
        let mut ctrl = ResourceController::new(
            regs,
            FilterBase::new(0x10, 0x30, 0x100),
            ControllerKind::Default,
            4,
            &[],
            Domain::tdcid(CompartmentId::Cid1),
        )
        .unwrap();
        let config = ResourceConfig::new(0, true, true, FilterAttributes::DISABLED).locked();
        assert_eq!(
            ctrl.set_conf(&config),
            Err(RifError::DRIVER_RIF_LOCK_NOT_SUPPORTED)
        );
        assert!(fabric.trace().is_empty());

        // No semaphore group: acquire and release are no-ops.
        assert_eq!(ctrl.acquire_sem(0), Ok(()));
        assert_eq!(ctrl.release_sem(0), Ok(()));
    }

    #[test]
    fn test_delegate_static_owner() {
        let fabric = fabric();
        let cid_of = |id: usize| addr(rcc::R0CIDCFGR + id * rcc::RX_STRIDE);
        fabric.poke(cid_of(0), 0x31);
        fabric.poke(cid_of(1), 0x21);

        let mut ctrl = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid3));
        ctrl.set_conf(&ResourceConfig::new(0, true, true, FilterAttributes::DISABLED))
            .unwrap();
        ctrl.set_conf(&ResourceConfig::new(1, true, true, FilterAttributes::DISABLED))
            .unwrap();

        // Owned resource 0 written, resource 1 skipped; filters untouched.
        assert_eq!(fabric.peek(addr(rcc::SECCFGR0)), 0x1);
        assert_eq!(fabric.peek(addr(rcc::PRIVCFGR0)), 0x1);
        assert_eq!(fabric.peek(cid_of(0)), 0x31);
        assert_eq!(fabric.peek(cid_of(1)), 0x21);
    }

    #[test]
    fn test_delegate_acquire_failure_is_an_error() {
        let fabric = fabric();
        let cid = addr(rcc::R0CIDCFGR + 7 * rcc::RX_STRIDE);
        fabric.poke(cid, FilterAttributes::shared(CidSet::CID2 | CidSet::CID3).to_cidcfgr());

        let holder = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid2));
        holder.acquire_sem(7).unwrap();

        let mut ctrl = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid3));
        assert_eq!(
            ctrl.set_conf(&ResourceConfig::new(7, true, false, FilterAttributes::DISABLED)),
            Err(RifError::DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED)
        );
        assert_eq!(fabric.peek(addr(rcc::SECCFGR0)), 0);
    }

    #[test]
    fn test_release_rules() {
        let fabric = fabric();
        let cid = addr(rcc::R0CIDCFGR);
        fabric.poke(cid, FilterAttributes::shared(CidSet::CID1 | CidSet::CID2).to_cidcfgr());
        let cid1 = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid1));
        let cid2 = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid2));

        // Free: release is a no-op.
        assert_eq!(cid1.release_sem(0), Ok(()));

        cid2.acquire_sem(0).unwrap();
        assert_eq!(
            cid1.release_sem(0),
            Err(RifError::DRIVER_RIF_SEMAPHORE_NOT_OWNED)
        );
        assert_eq!(
            cid1.acquire_sem(0),
            Err(RifError::DRIVER_RIF_SEMAPHORE_NOT_ACQUIRED)
        );
        assert_eq!(cid2.release_sem(0), Ok(()));
        assert_eq!(fabric.peek(addr(rcc::R0SEMCR)), 0);
    }

    #[test]
    fn test_claim() {
        let fabric = fabric();
        let semcr = addr(rcc::R0SEMCR + 2 * rcc::RX_STRIDE);
        fabric.poke(
            addr(rcc::R0CIDCFGR + 2 * rcc::RX_STRIDE),
            FilterAttributes::shared(CidSet::CID2).to_cidcfgr(),
        );
        let ctrl = controller(&fabric, &[], Domain::delegate(CompartmentId::Cid2));

        let sem = ctrl.claim(2).unwrap();
        assert_eq!(sem.id(), 2);
        assert_eq!(fabric.semaphore_owner(semcr), Some(2));
        sem.release().unwrap();
        assert_eq!(fabric.semaphore_owner(semcr), None);

        {
            let _sem = ctrl.claim(2).unwrap();
            assert_eq!(fabric.semaphore_owner(semcr), Some(2));
        }
        assert_eq!(fabric.semaphore_owner(semcr), None);
    }

    #[test]
    fn test_set_conf_word() {
        let fabric = fabric();
        let mut ctrl = controller(&fabric, &[], Domain::tdcid(CompartmentId::Cid1));
        // Resource 3, secure, filtering on for CID1.
        ctrl.set_conf_word(0x0300_0111).unwrap();
        assert_eq!(ctrl.is_secure(3), Ok(true));
        assert_eq!(
            ctrl.filter_attributes(3),
            Ok(FilterAttributes::static_owner(CompartmentId::Cid1))
        );
    }

    #[test]
    fn test_init_table_too_large() {
        let fabric = SharedFabric::new();
        let regs = unsafe { RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(1))) };
        let table = [ResourceConfig::new(0, false, false, FilterAttributes::DISABLED); 3];
        let mut ctrl = ResourceController::new(
            regs,
            FilterBase::new(0x10, 0x30, 0x100),
            ControllerKind::Default,
            2,
            &table,
            Domain::tdcid(CompartmentId::Cid1),
        )
        .unwrap();
        assert_eq!(ctrl.init(), Err(RifError::DRIVER_RIF_TABLE_TOO_LARGE));
    }

    #[test]
    fn test_no_resources() {
        let fabric = SharedFabric::new();
        let regs = unsafe { RegisterBlock::new_with_mmio(BASE, BusMmio::new(fabric.port(1))) };
        assert!(matches!(
            ResourceController::new(
                regs,
                FilterBase::new(0x10, 0x30, 0x100),
                ControllerKind::Default,
                0,
                &[],
                Domain::FIRMWARE,
            ),
            Err(RifError::DRIVER_RIF_NO_RESOURCES)
        ));
    }
}
