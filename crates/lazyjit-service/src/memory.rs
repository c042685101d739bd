//! Byte transfer across the host/service address-space boundary.

use crate::error::{ServiceError, ServiceResult, ServiceStage};
use crate::handles::{ServiceAddr, ServiceBuffer};
use wasmtime::{AsContext, AsContextMut, Func, Instance, Memory};

/// View of the compiler service's linear memory plus its allocator.
///
/// `Memory` is a handle, not a slice: every access below goes through the
/// store and therefore sees the current backing buffer even after the service
/// grew its memory. No raw pointer into service memory is ever kept.
#[derive(Debug, Clone, Copy)]
pub struct ServiceMemory {
    memory: Memory,
    alloc: Func,
}

impl ServiceMemory {
    /// Looks up the `memory` and `alloc` exports of a service instance.
    pub fn from_instance(mut store: impl AsContextMut, instance: &Instance) -> ServiceResult<Self> {
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| ServiceError::MissingExport("memory".to_string()))?;
        let alloc = instance
            .get_func(&mut store, "alloc")
            .ok_or_else(|| ServiceError::MissingExport("alloc".to_string()))?;
        alloc
            .typed::<i32, i32>(&store)
            .map_err(|e| ServiceError::Load(e.into()))?;
        Ok(ServiceMemory { memory, alloc })
    }

    /// Allocates `size` bytes with the service's own allocator. Never freed.
    pub fn alloc(&self, mut store: impl AsContextMut, size: u32) -> ServiceResult<ServiceAddr> {
        let raw = self
            .alloc
            .typed::<i32, i32>(&store)
            .and_then(|alloc| alloc.call(&mut store, size as i32))
            .map_err(|e| ServiceError::trap(ServiceStage::Alloc, e))?;
        Ok(ServiceAddr::from_raw(raw))
    }

    /// Copies `bytes` plus a trailing NUL into freshly allocated service memory.
    pub fn write_string(&self, mut store: impl AsContextMut, bytes: &[u8]) -> ServiceResult<ServiceAddr> {
        let len = u32::try_from(bytes.len() + 1).map_err(|_| ServiceError::MemoryAccess {
            addr: 0,
            len: u32::MAX,
        })?;
        let addr = self.alloc(&mut store, len)?;

        let mut terminated = Vec::with_capacity(bytes.len() + 1);
        terminated.extend_from_slice(bytes);
        terminated.push(0);

        self.memory
            .write(&mut store, addr.offset(), &terminated)
            .map_err(|_| ServiceError::MemoryAccess { addr: addr.0, len })?;
        log::trace!("Wrote {} bytes (+NUL) to service memory at {}", bytes.len(), addr);
        Ok(addr)
    }

    /// Returns a copy of the bytes described by `buffer`.
    ///
    /// The range is checked against the current memory size before copying.
    pub fn read_buffer(&self, store: impl AsContext, buffer: ServiceBuffer) -> ServiceResult<Vec<u8>> {
        let out_of_bounds = ServiceError::MemoryAccess {
            addr: buffer.addr.0,
            len: buffer.len,
        };
        let start = buffer.addr.offset();
        let Some(end) = start.checked_add(buffer.len as usize) else {
            return Err(out_of_bounds);
        };
        let data = self.memory.data(&store);
        match data.get(start..end) {
            Some(bytes) => Ok(bytes.to_vec()),
            None => Err(out_of_bounds),
        }
    }

    /// Reads a little-endian `i32` out-parameter.
    pub fn read_i32(&self, store: impl AsContext, addr: ServiceAddr) -> ServiceResult<i32> {
        let mut raw = [0u8; 4];
        self.memory
            .read(&store, addr.offset(), &mut raw)
            .map_err(|_| ServiceError::MemoryAccess { addr: addr.0, len: 4 })?;
        Ok(i32::from_le_bytes(raw))
    }

    /// Current size of service memory in bytes.
    pub fn size_bytes(&self, store: impl AsContext) -> usize {
        self.memory.data_size(&store)
    }
}
