use crate::config::DispatcherConfig;
use crate::error::RuntimeResult;
use crate::output::OutputSink;
use crate::session::Session;
use lazyjit_service::WasmCompilerService;
use wasmtime::Engine;

/// Runs a program end to end against the compiler service named in `config`.
///
/// Loads the service, builds the skeleton from `source` and calls the entry
/// point. Functions are compiled only as execution reaches them. Returns the
/// entry point's result.
pub fn run_source(
    config: &DispatcherConfig,
    source: &str,
    sink: Box<dyn OutputSink>,
) -> RuntimeResult<i32> {
    log::debug!(
        "Running {} bytes of source with service {}",
        source.len(),
        config.service_path.display()
    );

    let engine = Engine::default();
    let service = WasmCompilerService::from_file(&engine, &config.service_path)?;
    let mut session = Session::new(&engine, service, source, config, sink)?;
    session.run_entry()
}
