/*++

Licensed under the Apache-2.0 license.

File Name:

    periph.rs

Abstract:

    File contains the resource controllers of the RIF-aware peripherals.

--*/

use rif_error::{RifError, RifResult};
use rif_registers::{exti, fmc, hpdma, ipcc, rcc};
use tock_registers::LocalRegisterCopy;
use ureg::{MmioMut, RegisterBlock};

use crate::{
    CidLayout, ControllerKind, Domain, FilterBase, ProcessorBinding, ResourceConfig,
    ResourceController,
};

const RCC_FILTERS: FilterBase = FilterBase::new(rcc::SECCFGR0, rcc::PRIVCFGR0, rcc::R0CIDCFGR)
    .with_semaphore(rcc::R0SEMCR)
    .with_lock(rcc::RCFGLOCKR0)
    .with_cid_stride(rcc::RX_STRIDE);

const FMC_FILTERS: FilterBase = FilterBase::new(fmc::SECCFGR, fmc::PRIVCFGR, fmc::PERX_CIDCFGR)
    .with_semaphore(fmc::PERX_SEMCR)
    .with_cid_stride(fmc::PERX_STRIDE);

const HPDMA_FILTERS: FilterBase = FilterBase::new(hpdma::SECCFGR, hpdma::PRIVCFGR, hpdma::CIDCFGR)
    .with_semaphore(hpdma::SEMCR)
    .with_lock(hpdma::RCFGLOCKR)
    .with_layout(CidLayout::Narrow);

const EXTI_FILTERS: FilterBase = FilterBase::new(exti::SECCFGR, exti::PRIVCFGR, exti::ENCIDCFGR)
    .with_cid_stride(exti::ENCIDCFGR_STRIDE)
    .with_bank_stride(exti::SEC_PRIV_BANK_STRIDE);

const IPCC_FILTERS: FilterBase =
    FilterBase::new(ipcc::C1SECCFGR, ipcc::C1PRIVCFGR, ipcc::C1CIDCFGR);

impl<'t, TMmio: MmioMut> ResourceController<'t, TMmio> {
    /// Reset and clock controller
    pub fn rcc(
        regs: RegisterBlock<TMmio>,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        Self::new(
            regs,
            RCC_FILTERS,
            ControllerKind::Default,
            rcc::RIF_RESOURCES,
            table,
            domain,
        )
    }

    /// Flexible memory controller
    pub fn fmc(
        regs: RegisterBlock<TMmio>,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        Self::new(
            regs,
            FMC_FILTERS,
            ControllerKind::Default,
            fmc::RIF_RESOURCES,
            table,
            domain,
        )
    }

    /// High-performance DMA; one resource per channel
    pub fn hpdma(
        regs: RegisterBlock<TMmio>,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        Self::new(
            regs,
            HPDMA_FILTERS,
            ControllerKind::MultiAgent {
                agent_stride: hpdma::CHANNEL_STRIDE,
            },
            hpdma::RIF_RESOURCES,
            table,
            domain,
        )
    }

    /// Extended interrupt and event controller
    ///
    /// The event and processor counts come from the hardware configuration
    /// register.
    ///
    /// # Arguments
    ///
    /// * `regs` - Register block
    /// * `table` - Event configuration
    /// * `bindings` - CID each processor filter is programmed with; processors
    ///   without a binding get CID0
    /// * `domain` - Compartment programming the filters
    pub fn exti(
        regs: RegisterBlock<TMmio>,
        table: &'t [ResourceConfig],
        bindings: &'t [ProcessorBinding],
        domain: Domain,
    ) -> RifResult<Self> {
        let hwcfgr1 = LocalRegisterCopy::<u32, exti::HwCfgr1::Register>::new(
            regs.read(exti::HWCFGR1),
        );
        let events = hwcfgr1
            .read(exti::HwCfgr1::NBEVENTS)
            .min(exti::RIF_RESOURCES);
        let processors = hwcfgr1.read(exti::HwCfgr1::NBCPUS).min(exti::MAX_CPUS);
        if events == 0 {
            Err(RifError::DRIVER_RIF_NO_RESOURCES)?
        }

        Self::new(
            regs,
            EXTI_FILTERS,
            ControllerKind::ProcessorIndexed {
                processor_cid: exti::CMCIDCFGR,
                processor_stride: exti::CMCIDCFGR_STRIDE,
                processors,
                bindings,
            },
            events,
            table,
            domain,
        )
    }

    /// Inter-processor communication controller; one resource per channel,
    /// channels grouped per processor
    pub fn ipcc(
        regs: RegisterBlock<TMmio>,
        table: &'t [ResourceConfig],
        domain: Domain,
    ) -> RifResult<Self> {
        Self::new(
            regs,
            IPCC_FILTERS,
            ControllerKind::DualSubBlock {
                sub_block_stride: ipcc::CX_STRIDE,
                channels_per_block: ipcc::CHANNELS_PER_CPU,
            },
            ipcc::RIF_RESOURCES,
            table,
            domain,
        )
    }
}
