//! Host-side bookkeeping for the shared call table.
//!
//! The table itself is a wasm `funcref` table exported by the skeleton; the
//! guest reads it on every indirect call. This module tracks what the host
//! knows about each slot so every slot is compiled at most once.

use crate::error::{RuntimeError, RuntimeResult};
use lazyjit_service::FuncIndex;

/// Lifecycle of one call table slot. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Slot still holds the skeleton's stub.
    Uncompiled,
    /// The compile trigger for this slot is running.
    Compiling,
    /// Slot holds the real function.
    Installed,
}

#[derive(Debug, Default)]
pub struct CallTable {
    slots: Vec<SlotState>,
    compile_order: Vec<FuncIndex>,
}

impl CallTable {
    pub fn with_len(len: u32) -> Self {
        CallTable {
            slots: vec![SlotState::Uncompiled; len as usize],
            compile_order: Vec::new(),
        }
    }

    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validates an index received from guest code.
    pub fn check_index(&self, raw: i32) -> RuntimeResult<FuncIndex> {
        if raw < 0 || raw as u32 >= self.len() {
            return Err(RuntimeError::IndexOutOfRange {
                index: i64::from(raw),
                count: self.len(),
            });
        }
        Ok(FuncIndex(raw as u32))
    }

    /// State of an index already validated by [`CallTable::check_index`].
    pub fn state(&self, idx: FuncIndex) -> SlotState {
        self.slots[idx.as_usize()]
    }

    pub fn begin_compile(&mut self, idx: FuncIndex) -> RuntimeResult<()> {
        match self.state(idx) {
            SlotState::Uncompiled => {
                self.slots[idx.as_usize()] = SlotState::Compiling;
                Ok(())
            }
            SlotState::Compiling => Err(RuntimeError::ReentrantCompile(idx)),
            SlotState::Installed => Err(RuntimeError::AlreadyCompiled(idx)),
        }
    }

    pub fn finish_install(&mut self, idx: FuncIndex) -> RuntimeResult<()> {
        match self.state(idx) {
            SlotState::Compiling => {
                self.slots[idx.as_usize()] = SlotState::Installed;
                self.compile_order.push(idx);
                Ok(())
            }
            SlotState::Installed => Err(RuntimeError::AlreadyCompiled(idx)),
            SlotState::Uncompiled => Err(RuntimeError::NotInstalled(idx)),
        }
    }

    /// Installed indices, in the order they were compiled.
    pub fn compile_order(&self) -> &[FuncIndex] {
        &self.compile_order
    }

    pub fn installed_count(&self) -> usize {
        self.compile_order.len()
    }
}
