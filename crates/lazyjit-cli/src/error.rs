use std::path::PathBuf;

use lazyjit_rt::RuntimeError;
use lazyjit_service::ServiceError;
use miette::Diagnostic;
use thiserror::Error;

/// CLI-specific error type that provides rich diagnostics
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to read file {path}")]
    #[diagnostic(code(lazyjit::cli::io_error))]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiler service at {path} could not be loaded")]
    #[diagnostic(
        code(lazyjit::cli::service_unavailable),
        help("build the compiler service first, or pass its location with --service")
    )]
    ServiceUnavailable {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },

    #[error("Compilation failed")]
    #[diagnostic(code(lazyjit::cli::compile_error))]
    CompileError {
        #[source]
        source: ServiceError,
    },

    #[error("Runtime error")]
    #[diagnostic(code(lazyjit::cli::runtime_error))]
    RuntimeError {
        #[source]
        source: RuntimeError,
    },
}

/// Sorts a runtime failure by where it happened. Failures to load the
/// service artifact point at `--service`.
pub fn convert_runtime_error(error: RuntimeError, service_path: PathBuf) -> CliError {
    match error {
        RuntimeError::Service(
            source @ (ServiceError::Read { .. }
            | ServiceError::Load(_)
            | ServiceError::MissingExport(_)),
        ) => CliError::ServiceUnavailable {
            path: service_path,
            source,
        },
        RuntimeError::Service(source) => CliError::CompileError { source },
        source => CliError::RuntimeError { source },
    }
}

/// Convert IO errors with context
pub fn convert_io_error(error: std::io::Error, path: PathBuf) -> CliError {
    CliError::IoError {
        path,
        source: error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyjit_service::{FuncIndex, ServiceStage};

    #[test]
    fn test_service_load_failures_point_at_service() {
        let error = RuntimeError::Service(ServiceError::MissingExport("alloc".to_string()));
        let converted = convert_runtime_error(error, PathBuf::from("svc.wasm"));
        assert!(matches!(converted, CliError::ServiceUnavailable { path, .. } if path == PathBuf::from("svc.wasm")));
    }

    #[test]
    fn test_compile_failures_keep_their_stage() {
        let error = RuntimeError::Service(ServiceError::trap(ServiceStage::Parse, "bad token"));
        match convert_runtime_error(error, PathBuf::new()) {
            CliError::CompileError { source } => assert_eq!(source.stage(), Some(ServiceStage::Parse)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_failures_are_runtime_errors() {
        let error = RuntimeError::ReentrantCompile(FuncIndex(2));
        let converted = convert_runtime_error(error, PathBuf::new());
        assert!(matches!(converted, CliError::RuntimeError { .. }));
    }
}
