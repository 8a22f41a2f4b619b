/*++

Licensed under the Apache-2.0 license.

File Name:

    protreg.rs

Abstract:

    File contains the packed protection words that hardware description
    files use to describe resource, bus master and memory region policies.

--*/

use bitfield::bitfield;

use crate::{
    CidSet, CompartmentId, FilterAttributes, MemoryAttributes, ResourceConfig, RimuConfig,
    RisafAttributes,
};

bitfield! {
    /// Resource protection word
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct RifProt(u32);

    /// Compartment filtering enabled
    pub cfen, set_cfen: 0;

    /// Semaphore mode enabled
    pub sem_en, set_sem_en: 1;

    /// Static owner compartment
    pub u8, scid, set_scid: 6, 4;

    pub sec, set_sec: 8;

    pub privileged, set_privileged: 9;

    pub lock, set_lock: 10;

    /// Semaphore whitelist
    pub u8, sem_whitelist, set_sem_whitelist: 23, 16;

    /// Resource index in the controller
    pub u8, id, set_id: 31, 24;
}

impl RifProt {
    pub fn attributes(&self) -> FilterAttributes {
        FilterAttributes {
            cfen: self.cfen(),
            sem_en: self.sem_en(),
            scid: CompartmentId::from_field(self.scid().into()),
            whitelist: CidSet::from_bits_truncate(self.sem_whitelist()),
        }
    }

    pub fn to_config(&self) -> ResourceConfig {
        ResourceConfig {
            id: self.id().into(),
            sec: self.sec(),
            privileged: self.privileged(),
            lock: self.lock(),
            attrs: self.attributes(),
        }
    }
}

impl From<RifProt> for ResourceConfig {
    fn from(prot: RifProt) -> Self {
        prot.to_config()
    }
}

bitfield! {
    /// Bus master protection word
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct RimuProt(u32);

    /// Value of the master's attribute register
    pub u16, attr, set_attr: 10, 0;

    /// Take the master CID from `mcid` instead of the master itself
    pub cidsel, set_cidsel: 2;

    pub u8, mcid, set_mcid: 6, 4;

    pub msec, set_msec: 8;

    pub mpriv, set_mpriv: 9;

    /// Master index in the aggregator
    pub u8, id, set_id: 23, 16;
}

impl RimuProt {
    pub fn to_config(&self) -> RimuConfig {
        RimuConfig {
            id: self.id().into(),
            attr: self.attr().into(),
        }
    }
}

impl From<RimuProt> for RimuConfig {
    fn from(prot: RimuProt) -> Self {
        prot.to_config()
    }
}

bitfield! {
    /// Page-granular memory region protection word
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct RisabProt(u32);

    /// Compartments granted privileged access
    pub u8, priv_list, set_priv_list: 7, 0;

    /// Compartments granted read access
    pub u8, read_list, set_read_list: 15, 8;

    /// Compartments granted write access
    pub u8, write_list, set_write_list: 23, 16;

    pub cfen, set_cfen: 24;

    /// Privileged access only, for every compartment
    pub default_priv, set_default_priv: 25;

    pub sec, set_sec: 26;

    /// Compartment the configuration is delegated to
    pub u8, delegated_cid, set_delegated_cid: 29, 27;

    pub delegation_en, set_delegation_en: 31;
}

impl RisabProt {
    pub fn attributes(&self) -> MemoryAttributes {
        MemoryAttributes {
            sec: self.sec(),
            privileged: self.default_priv(),
            cfen: self.cfen(),
            delegate: if self.delegation_en() {
                Some(CompartmentId::from_field(self.delegated_cid().into()))
            } else {
                None
            },
            priv_list: CidSet::from_bits_truncate(self.priv_list()),
            read_list: CidSet::from_bits_truncate(self.read_list()),
            write_list: CidSet::from_bits_truncate(self.write_list()),
        }
    }
}

bitfield! {
    /// Address-range memory region protection word
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct RisafProt(u32);

    /// Region slot, 1-based
    pub u8, id, set_id: 4, 0;

    pub enabled, set_enabled: 5;

    pub sec, set_sec: 6;

    pub enc, set_enc: 7;

    /// Compartments granted privileged access
    pub u8, priv_list, set_priv_list: 15, 8;

    /// Compartments granted read access
    pub u8, read_list, set_read_list: 23, 16;

    /// Compartments granted write access
    pub u8, write_list, set_write_list: 31, 24;
}

impl RisafProt {
    pub fn attributes(&self) -> RisafAttributes {
        RisafAttributes {
            enabled: self.enabled(),
            sec: self.sec(),
            enc: self.enc(),
            priv_list: CidSet::from_bits_truncate(self.priv_list()),
            read_list: CidSet::from_bits_truncate(self.read_list()),
            write_list: CidSet::from_bits_truncate(self.write_list()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rif_prot() {
        // id 5, whitelist {2,3}, priv, sec, sem, filtering
        let prot = RifProt(0x050c_0303);
        let config = prot.to_config();
        assert_eq!(config.id, 5);
        assert!(config.sec);
        assert!(config.privileged);
        assert!(!config.lock);
        assert_eq!(
            config.attrs,
            FilterAttributes::shared(CidSet::CID2 | CidSet::CID3)
        );
        assert_eq!(config.attrs.to_cidcfgr(), 0x000c_0003);

        let mut prot = RifProt::default();
        prot.set_id(17);
        prot.set_cfen(true);
        prot.set_scid(1);
        prot.set_lock(true);
        let config = ResourceConfig::from(prot);
        assert_eq!(config.id, 17);
        assert!(config.lock);
        assert_eq!(
            config.attrs,
            FilterAttributes::static_owner(CompartmentId::Cid1)
        );
    }

    #[test]
    fn test_rimu_prot() {
        let mut prot = RimuProt::default();
        prot.set_id(9);
        prot.set_cidsel(true);
        prot.set_mcid(1);
        prot.set_msec(true);
        assert_eq!(prot.0, 0x0009_0114);
        assert_eq!(prot.to_config(), RimuConfig { id: 9, attr: 0x114 });
    }

    #[test]
    fn test_risab_prot() {
        let mut prot = RisabProt::default();
        prot.set_read_list(0x06);
        prot.set_write_list(0x04);
        prot.set_cfen(true);
        prot.set_sec(true);
        prot.set_delegation_en(true);
        prot.set_delegated_cid(2);
        let attrs = prot.attributes();
        assert!(attrs.sec);
        assert!(!attrs.privileged);
        assert!(attrs.cfen);
        assert_eq!(attrs.delegate, Some(CompartmentId::Cid2));
        assert_eq!(attrs.read_list, CidSet::CID1 | CidSet::CID2);
        assert_eq!(attrs.write_list, CidSet::CID2);
        assert!(attrs.priv_list.is_empty());

        prot.set_delegation_en(false);
        assert_eq!(prot.attributes().delegate, None);
    }

    #[test]
    fn test_risaf_prot() {
        let prot = RisafProt(0x0404_00e3);
        assert_eq!(prot.id(), 3);
        let attrs = prot.attributes();
        assert!(attrs.enabled);
        assert!(attrs.sec);
        assert!(attrs.enc);
        assert!(attrs.priv_list.is_empty());
        assert_eq!(attrs.read_list, CidSet::CID2);
        assert_eq!(attrs.write_list, CidSet::CID2);
    }
}
