//! Loading the skeleton unit.
//!
//! The skeleton declares every function of the program, but each body is a
//! stub: it calls the single import `env.compile_func(idx)` and then calls
//! slot `idx` of its exported `_table` again with the original arguments.
//! All the loader does is wire that import to the resolver.

use crate::error::{RuntimeError, RuntimeResult};
use crate::resolver;
use crate::state::DispatchState;
use wasmtime::{Caller, Instance, Linker, Module, Store, Table, TypedFunc};

pub const IMPORT_MODULE: &str = "env";
pub const COMPILE_TRIGGER_IMPORT: &str = "compile_func";
pub const CALL_TABLE_EXPORT: &str = "_table";

const UNIT_NAME: &str = "skeleton";

#[derive(Debug)]
pub struct SkeletonUnit {
    instance: Instance,
    table: Table,
    function_count: u32,
}

impl SkeletonUnit {
    pub fn load(store: &mut Store<DispatchState>, bytes: &[u8]) -> RuntimeResult<Self> {
        let module =
            Module::from_binary(store.engine(), bytes).map_err(|e| RuntimeError::load(UNIT_NAME, e))?;

        let mut linker = Linker::new(store.engine());
        linker
            .func_wrap(
                IMPORT_MODULE,
                COMPILE_TRIGGER_IMPORT,
                |mut caller: Caller<'_, DispatchState>, idx: i32| -> anyhow::Result<i32> {
                    resolver::on_uncompiled_call(&mut caller, idx)?;
                    Ok(0)
                },
            )
            .map_err(|e| RuntimeError::load(UNIT_NAME, e))?;

        // Any import besides the compile trigger makes instantiation fail here.
        let instance = linker
            .instantiate(&mut *store, &module)
            .map_err(|e| RuntimeError::instantiate(UNIT_NAME, e))?;

        let table = instance
            .get_table(&mut *store, CALL_TABLE_EXPORT)
            .ok_or_else(|| RuntimeError::MissingExport {
                unit: UNIT_NAME.to_string(),
                name: CALL_TABLE_EXPORT.to_string(),
            })?;
        let slots: u64 = table.size(&*store).into();
        let function_count = u32::try_from(slots).map_err(|e| RuntimeError::load(UNIT_NAME, e))?;

        log::info!(
            "Skeleton loaded: {} function slots, {} bytes",
            function_count,
            bytes.len()
        );
        Ok(SkeletonUnit {
            instance,
            table,
            function_count,
        })
    }

    /// The shared call table exported by the skeleton.
    pub fn table(&self) -> Table {
        self.table
    }

    pub fn function_count(&self) -> u32 {
        self.function_count
    }

    /// Looks up a zero-argument, `i32`-returning export such as `main`.
    pub fn entry(&self, store: &mut Store<DispatchState>, name: &str) -> RuntimeResult<TypedFunc<(), i32>> {
        let func = self
            .instance
            .get_func(&mut *store, name)
            .ok_or_else(|| RuntimeError::MissingExport {
                unit: UNIT_NAME.to_string(),
                name: name.to_string(),
            })?;
        func.typed::<(), i32>(&*store)
            .map_err(|e| RuntimeError::load(format!("entry point `{}`", name), e))
    }
}
