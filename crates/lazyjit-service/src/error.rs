use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used to carry wasmtime's `anyhow` errors as a `#[source]`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The service operation that was running when a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStage {
    Alloc,
    Parse,
    Build,
    CompileSkeleton,
    CompileFunction(u32),
}

impl fmt::Display for ServiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStage::Alloc => write!(f, "alloc"),
            ServiceStage::Parse => write!(f, "parse"),
            ServiceStage::Build => write!(f, "build"),
            ServiceStage::CompileSkeleton => write!(f, "compile-skeleton"),
            ServiceStage::CompileFunction(idx) => write!(f, "compile-function #{}", idx),
        }
    }
}

/// Errors raised while talking to the compiler service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to read compiler service artifact {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load compiler service: {0}")]
    Load(#[source] BoxError),

    #[error("Compiler service does not export `{0}`")]
    MissingExport(String),

    #[error("Compiler service trapped during {stage}")]
    Trap {
        stage: ServiceStage,
        #[source]
        source: BoxError,
    },

    #[error("Access of {len} bytes at service address {addr:#x} is outside service memory")]
    MemoryAccess { addr: u32, len: u32 },

    #[error("Compiler service returned a negative length ({len}) during {stage}")]
    InvalidLength { stage: ServiceStage, len: i32 },
}

impl ServiceError {
    pub fn trap(stage: ServiceStage, source: impl Into<BoxError>) -> Self {
        ServiceError::Trap {
            stage,
            source: source.into(),
        }
    }

    /// The stage that failed, if the failure happened inside a service call.
    pub fn stage(&self) -> Option<ServiceStage> {
        match self {
            ServiceError::Trap { stage, .. } | ServiceError::InvalidLength { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
