//! The compile trigger behind every skeleton stub.
//!
//! When a stub for slot `idx` runs, it calls [`on_uncompiled_call`] and then
//! re-dispatches through the call table. The resolver makes sure that by the
//! time it returns, slot `idx` holds the real function:
//!
//! ```text
//! Uncompiled --compile_func--> Compiling --instantiate unit--> Installed
//! ```
//!
//! The function unit installs itself. Its element segment writes its only
//! function into slot `idx` of the imported table during instantiation, so
//! the unit becomes callable in the same step that loads it.

use crate::error::{RuntimeError, RuntimeResult};
use crate::skeleton::IMPORT_MODULE;
use crate::state::DispatchState;
use crate::table::SlotState;
use lazyjit_service::FuncIndex;
use wasmtime::{Caller, Extern, Instance, Module, Table};

/// Import through which a function unit reaches the shared call table.
pub const CALL_TABLE_IMPORT: &str = "_table";
/// Import through which a function unit prints a value.
pub const PRINTLN_IMPORT: &str = "println";

/// The loaded real implementation of one function.
#[derive(Debug)]
pub struct CompiledFunctionUnit {
    index: FuncIndex,
    size: usize,
}

impl CompiledFunctionUnit {
    pub fn index(&self) -> FuncIndex {
        self.index
    }

    /// Size of the blob the unit was loaded from.
    pub fn size(&self) -> usize {
        self.size
    }

    fn load(
        caller: &mut Caller<'_, DispatchState>,
        index: FuncIndex,
        table: Table,
        bytes: &[u8],
    ) -> RuntimeResult<Self> {
        let unit_name = format!("function unit {}", index);
        let module =
            Module::from_binary(caller.engine(), bytes).map_err(|e| RuntimeError::load(&unit_name, e))?;

        let println = caller.data().println.ok_or(RuntimeError::SkeletonNotReady)?;
        let imports = module
            .imports()
            .map(|import| match (import.module(), import.name()) {
                (IMPORT_MODULE, CALL_TABLE_IMPORT) => Ok(Extern::Table(table)),
                (IMPORT_MODULE, PRINTLN_IMPORT) => Ok(Extern::Func(println)),
                (other_module, other_name) => Err(RuntimeError::UnknownImport {
                    index,
                    module: other_module.to_string(),
                    name: other_name.to_string(),
                }),
            })
            .collect::<RuntimeResult<Vec<Extern>>>()?;

        // The instance stays alive in the store; its element segment has
        // already written slot `index`.
        Instance::new(&mut *caller, &module, &imports)
            .map_err(|e| RuntimeError::instantiate(&unit_name, e))?;

        Ok(CompiledFunctionUnit {
            index,
            size: bytes.len(),
        })
    }
}

/// Compiles and installs function `raw_idx` unless it is already installed.
pub(crate) fn on_uncompiled_call(caller: &mut Caller<'_, DispatchState>, raw_idx: i32) -> RuntimeResult<()> {
    let state = caller.data();
    let table = state.call_table.ok_or(RuntimeError::SkeletonNotReady)?;
    let idx = state.table.check_index(raw_idx)?;

    // A stub exported by the skeleton can still be entered after its slot
    // was patched. The slot is already correct, so the stub's re-dispatch
    // reaches the real function.
    if state.table.state(idx) == SlotState::Installed {
        log::trace!("Function {} already installed", idx);
        return Ok(());
    }

    caller.data_mut().table.begin_compile(idx)?;
    log::info!("compile_func {}", idx.0);

    let bytes = {
        let state = caller.data_mut();
        let compiler = state.compiler;
        state.service.compile_func(compiler, idx)?
    };
    if let Some(dump) = &caller.data().dump {
        dump.write_function(idx, &bytes)?;
    }

    let unit = CompiledFunctionUnit::load(caller, idx, table, &bytes)?;
    log::debug!("Installed function {} ({} bytes)", idx, unit.size());

    let state = caller.data_mut();
    state.table.finish_install(idx)?;
    state.units.push(unit);
    Ok(())
}
