use crate::dump::ArtifactDump;
use crate::output::OutputSink;
use crate::resolver::CompiledFunctionUnit;
use crate::table::CallTable;
use lazyjit_service::{CompilerHandle, CompilerService};
use std::fmt;
use wasmtime::{Func, Table};

/// Everything the compile trigger needs, stored as the data of the
/// executable units' `wasmtime::Store`.
///
/// The compiler service keeps its own store inside `service`, so service
/// memory and unit memory never share an address space.
pub struct DispatchState {
    pub(crate) service: Box<dyn CompilerService>,
    pub(crate) compiler: CompilerHandle,
    pub(crate) table: CallTable,
    /// The skeleton's `_table` export. `None` until the skeleton is loaded.
    pub(crate) call_table: Option<Table>,
    /// Host function handed to function units as `env.println`.
    pub(crate) println: Option<Func>,
    pub(crate) sink: Box<dyn OutputSink>,
    pub(crate) dump: Option<ArtifactDump>,
    pub(crate) units: Vec<CompiledFunctionUnit>,
}

impl DispatchState {
    pub(crate) fn new(
        service: Box<dyn CompilerService>,
        compiler: CompilerHandle,
        sink: Box<dyn OutputSink>,
        dump: Option<ArtifactDump>,
    ) -> Self {
        DispatchState {
            service,
            compiler,
            table: CallTable::default(),
            call_table: None,
            println: None,
            sink,
            dump,
            units: Vec::new(),
        }
    }

    pub fn table(&self) -> &CallTable {
        &self.table
    }

    pub fn units(&self) -> &[CompiledFunctionUnit] {
        &self.units
    }
}

impl fmt::Debug for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchState")
            .field("compiler", &self.compiler)
            .field("table", &self.table)
            .field("dump", &self.dump)
            .field("units", &self.units.len())
            .finish()
    }
}
