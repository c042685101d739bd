use lazyjit_service::{BoxError, FuncIndex, ServiceError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, resolving or running executable units.
///
/// Every variant is fatal for the session. When one of these is raised
/// inside the compile trigger it travels through the guest as a trap and is
/// recovered intact by [`crate::Session::run_entry`].
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Failed to load {unit}")]
    Load {
        unit: String,
        #[source]
        source: BoxError,
    },

    #[error("{unit} does not export `{name}`")]
    MissingExport { unit: String, name: String },

    #[error("Function unit {index} requests unknown import `{module}.{name}`")]
    UnknownImport {
        index: FuncIndex,
        module: String,
        name: String,
    },

    #[error("Compile trigger received index {index}, but the program has {count} functions")]
    IndexOutOfRange { index: i64, count: u32 },

    #[error("Function {0} re-entered the compile trigger while it was being compiled")]
    ReentrantCompile(FuncIndex),

    #[error("Function {0} was already compiled")]
    AlreadyCompiled(FuncIndex),

    #[error("Function {0} was installed without being compiled")]
    NotInstalled(FuncIndex),

    #[error("Compile trigger fired before the skeleton was loaded")]
    SkeletonNotReady,

    #[error("Failed to write dump file {path}")]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Execution of `{entry}` trapped")]
    Execution {
        entry: String,
        #[source]
        source: BoxError,
    },
}

impl RuntimeError {
    pub(crate) fn load(unit: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RuntimeError::Load {
            unit: unit.into(),
            source: source.into(),
        }
    }

    /// Like [`RuntimeError::load`], but an error raised by a nested compile
    /// during instantiation (for example from a start function) is kept as is.
    pub(crate) fn instantiate(unit: impl Into<String>, error: anyhow::Error) -> Self {
        match error.downcast::<RuntimeError>() {
            Ok(nested) => nested,
            Err(other) => RuntimeError::load(unit, other),
        }
    }
}

pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
