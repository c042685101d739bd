//! Typed tokens that cross the host/service boundary.
//!
//! Addresses into the compiler service's linear memory (`ServiceAddr`) and
//! indices into the executable units' call table (`FuncIndex`) are both plain
//! integers on the wire. Keeping them as distinct types stops one from being
//! interpreted in the other domain.

use std::fmt;

/// Byte offset into the compiler service's linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceAddr(pub u32);

impl ServiceAddr {
    pub fn offset(self) -> usize {
        self.0 as usize
    }

    /// Reinterprets an `i32` returned by the service as an address.
    pub fn from_raw(raw: i32) -> Self {
        ServiceAddr(raw as u32)
    }

    pub fn to_raw(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for ServiceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A byte range inside service memory. Only valid until the next service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceBuffer {
    pub addr: ServiceAddr,
    pub len: u32,
}

/// Token for a parsed program held by the compiler service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrModuleHandle(pub(crate) i32);

impl IrModuleHandle {
    pub fn from_raw(raw: i32) -> Self {
        IrModuleHandle(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Token for the compiler state built from an [`IrModuleHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerHandle(pub(crate) i32);

impl CompilerHandle {
    pub fn from_raw(raw: i32) -> Self {
        CompilerHandle(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Slot index in the shared call table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncIndex(pub u32);

impl FuncIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FuncIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
