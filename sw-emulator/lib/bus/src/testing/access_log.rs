/*++

Licensed under the Apache-2.0 license.

File Name:

    access_log.rs

Abstract:

    File contains a shared record of bus accesses for unit tests.

--*/
use std::{cell::RefCell, fmt, rc::Rc};

use crate::{RvAddr, RvData, RvSize};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One bus transfer. For reads `val` is the value returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Access {
    pub kind: AccessKind,
    pub size: RvSize,
    pub addr: RvAddr,
    pub val: RvData,
}

impl Access {
    pub fn read(size: RvSize, addr: RvAddr, val: RvData) -> Self {
        Self {
            kind: AccessKind::Read,
            size,
            addr,
            val,
        }
    }

    pub fn write(size: RvSize, addr: RvAddr, val: RvData) -> Self {
        Self {
            kind: AccessKind::Write,
            size,
            addr,
            val,
        }
    }

    pub fn is_write(&self) -> bool {
        self.kind == AccessKind::Write
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
        };
        write!(
            f,
            "{op}(RvSize::{:?}, {:#010x}) = {:#x}",
            self.size, self.addr, self.val
        )
    }
}

/// A list of bus accesses recorded without needing `&mut self`.
///
/// Clones share the same underlying list, so a test can keep a handle while
/// the bus that records into it is moved into a driver.
///
/// ```
/// use rif_emu_bus::testing::{Access, AccessLog};
/// use rif_emu_bus::RvSize;
///
/// let log = AccessLog::new();
/// log.clone().push(Access::write(RvSize::Word, 0x10, 1));
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.take(), vec![Access::write(RvSize::Word, 0x10, 1)]);
/// assert!(log.take().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct AccessLog {
    accesses: Rc<RefCell<Vec<Access>>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, access: Access) {
        self.accesses.borrow_mut().push(access);
    }

    pub fn len(&self) -> usize {
        self.accesses.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accesses.borrow().is_empty()
    }

    /// Copy of the recorded accesses.
    pub fn accesses(&self) -> Vec<Access> {
        self.accesses.borrow().clone()
    }

    /// Only the writes, in order.
    pub fn writes(&self) -> Vec<Access> {
        self.accesses
            .borrow()
            .iter()
            .filter(|a| a.is_write())
            .copied()
            .collect()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<Access> {
        std::mem::take(&mut *self.accesses.borrow_mut())
    }

    /// One access per line, in the `Display` format.
    pub fn to_text(&self) -> String {
        self.accesses
            .borrow()
            .iter()
            .map(|a| format!("{a}\n"))
            .collect()
    }
}
