use crate::config::DispatcherConfig;
use crate::dump::ArtifactDump;
use crate::error::{RuntimeError, RuntimeResult};
use crate::output::OutputSink;
use crate::skeleton::SkeletonUnit;
use crate::state::DispatchState;
use crate::table::{CallTable, SlotState};
use lazyjit_service::{CompilerService, FuncIndex};
use wasmtime::{Caller, Engine, Func, Store};

/// One run of one program: the compiler state, the loaded skeleton and every
/// function unit compiled so far.
#[derive(Debug)]
pub struct Session {
    store: Store<DispatchState>,
    skeleton: SkeletonUnit,
    entry_point: String,
}

impl Session {
    /// Hands `source` to the compiler service and loads the resulting skeleton.
    ///
    /// No function is compiled here; that only happens once [`Session::run_entry`]
    /// reaches a stub.
    pub fn new<S>(
        engine: &Engine,
        mut service: S,
        source: &str,
        config: &DispatcherConfig,
        sink: Box<dyn OutputSink>,
    ) -> RuntimeResult<Self>
    where
        S: CompilerService + 'static,
    {
        let ir = service.make_ir_module(source)?;
        let compiler = service.make_compiler(ir)?;
        let skeleton_bytes = service.compile_skeleton(compiler)?;
        log::debug!("Skeleton compiled ({} bytes)", skeleton_bytes.len());

        let dump = config.dump_dir.clone().map(ArtifactDump::new);
        if let Some(dump) = &dump {
            dump.write_skeleton(&skeleton_bytes)?;
        }

        let state = DispatchState::new(Box::new(service), compiler, sink, dump);
        let mut store = Store::new(engine, state);

        let println = Func::wrap(&mut store, |mut caller: Caller<'_, DispatchState>, value: i32| -> i32 {
            caller.data_mut().sink.println(value);
            0
        });
        store.data_mut().println = Some(println);

        let skeleton = SkeletonUnit::load(&mut store, &skeleton_bytes)?;
        let state = store.data_mut();
        state.call_table = Some(skeleton.table());
        state.table = CallTable::with_len(skeleton.function_count());

        Ok(Session {
            store,
            skeleton,
            entry_point: config.entry_point.clone(),
        })
    }

    /// Calls the entry export and returns its result.
    ///
    /// Compilation errors raised inside the compile trigger come back as the
    /// original [`RuntimeError`]; any other trap is reported as
    /// [`RuntimeError::Execution`].
    pub fn run_entry(&mut self) -> RuntimeResult<i32> {
        let entry = self.skeleton.entry(&mut self.store, &self.entry_point)?;
        log::info!("Executing entry point `{}`...", self.entry_point);

        match entry.call(&mut self.store, ()) {
            Ok(value) => {
                log::info!(
                    "Execution finished (returned {}). Compiled {} of {} functions.",
                    value,
                    self.store.data().table().installed_count(),
                    self.function_count()
                );
                Ok(value)
            }
            Err(trap) => Err(match trap.downcast::<RuntimeError>() {
                Ok(runtime_error) => runtime_error,
                Err(other) => RuntimeError::Execution {
                    entry: self.entry_point.clone(),
                    source: other.into(),
                },
            }),
        }
    }

    pub fn function_count(&self) -> u32 {
        self.skeleton.function_count()
    }

    /// Indices compiled so far, in compile order.
    pub fn compiled_indices(&self) -> &[FuncIndex] {
        self.store.data().table().compile_order()
    }

    pub fn slot_state(&self, idx: FuncIndex) -> Option<SlotState> {
        let table = self.store.data().table();
        (idx.0 < table.len()).then(|| table.state(idx))
    }

    pub fn state(&self) -> &DispatchState {
        self.store.data()
    }
}
