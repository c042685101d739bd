use crate::error::{CliError, convert_runtime_error};
use crate::io::read_source;
use lazyjit_rt::{run_source, DispatcherConfig, StdoutSink};
use std::path::Path;

/// Reads `path` and runs it with lazy compilation. Output printed by the
/// program goes to stdout, one value per line.
pub fn handle_run(path: &Path, config: &DispatcherConfig) -> Result<i32, CliError> {
    // The source is read before the service is touched, so a bad path never
    // costs a service load.
    let source = read_source(path)?;
    log::debug!("Read {} bytes from {}", source.len(), path.display());

    if let Some(dir) = &config.dump_dir {
        log::info!("Dumping compiled units to {}", dir.display());
    }

    run_source(config, &source, Box::new(StdoutSink))
        .map_err(|e| convert_runtime_error(e, config.service_path.clone()))
}
