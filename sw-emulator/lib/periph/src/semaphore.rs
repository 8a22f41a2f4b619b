/*++

Licensed under the Apache-2.0 license.

File Name:

    semaphore.rs

Abstract:

    File contains the model of a RIF hardware semaphore.

--*/

use rif_emu_bus::RvData;
use rif_registers::rif::{CidCfgr, SemCr};
use smlang::statemachine;
use tock_registers::LocalRegisterCopy;

/// A write to the semaphore register together with the state it is judged
/// against.
pub struct Request {
    /// Compartment that issued the write
    pub cid: u8,
    /// Current value of the resource's compartment filter configuration
    pub cidcfgr: RvData,
}

statemachine! {
    transitions: {
        // CurrentState Event [guard] / action = NextState
        *Free + Take(Request) [may_take] / latch = Held,
        Held + Give(Request) [is_owner] / unlatch = Free,
    }
}

/// State machine extended variables.
pub struct Context {
    /// Compartment holding the mutex.
    owner: u8,
}

impl StateMachineContext for Context {
    fn may_take(&mut self, req: &Request) -> Result<(), ()> {
        let cfg = LocalRegisterCopy::<u32, CidCfgr::Register>::new(req.cidcfgr);
        let whitelisted = cfg.read(CidCfgr::SEMWLC) & (1 << req.cid) != 0;
        if cfg.is_set(CidCfgr::CFEN) && cfg.is_set(CidCfgr::SEMEN) && whitelisted {
            Ok(())
        } else {
            Err(())
        }
    }

    fn is_owner(&mut self, req: &Request) -> Result<(), ()> {
        if self.owner == req.cid {
            Ok(())
        } else {
            Err(())
        }
    }

    fn latch(&mut self, req: &Request) {
        self.owner = req.cid;
    }

    fn unlatch(&mut self, _req: &Request) {
        self.owner = 0;
    }
}

/// A hardware semaphore.
///
/// The first whitelisted compartment to set `MUTEX` while the semaphore is
/// free latches its CID into the owner field. Every other write is ignored
/// except the owner clearing `MUTEX`.
pub struct Semaphore {
    state_machine: StateMachine<Context>,
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl Semaphore {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(Context { owner: 0 }),
        }
    }

    /// Value of the semaphore control register.
    pub fn value(&self) -> RvData {
        match self.state_machine.state() {
            States::Free => 0,
            States::Held => {
                (SemCr::MUTEX::SET + SemCr::SCID.val(self.state_machine.context.owner.into()))
                    .value
            }
        }
    }

    /// Owner compartment, if held.
    pub fn owner(&self) -> Option<u8> {
        match self.state_machine.state() {
            States::Free => None,
            States::Held => Some(self.state_machine.context.owner),
        }
    }

    /// Applies a register write from compartment `cid`.
    pub fn write(&mut self, cid: u8, cidcfgr: RvData, val: RvData) {
        let req = Request { cid, cidcfgr };
        let written = LocalRegisterCopy::<u32, SemCr::Register>::new(val);
        let event = if written.is_set(SemCr::MUTEX) {
            Events::Take(req)
        } else {
            Events::Give(req)
        };
        // Rejected transitions leave the register unchanged, like the hardware.
        let _ = self.state_machine.process_event(event);
    }
}
