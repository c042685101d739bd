//! Verbatim copies of every blob received from the compiler service.

use crate::error::{RuntimeError, RuntimeResult};
use lazyjit_service::FuncIndex;
use std::path::PathBuf;

/// Writes `skeleton.wasm` and `<index>.wasm` into an existing directory.
#[derive(Debug, Clone)]
pub struct ArtifactDump {
    dir: PathBuf,
}

impl ArtifactDump {
    /// The directory is expected to exist already; it is never created.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactDump { dir: dir.into() }
    }

    pub fn skeleton_path(&self) -> PathBuf {
        self.dir.join("skeleton.wasm")
    }

    pub fn function_path(&self, idx: FuncIndex) -> PathBuf {
        self.dir.join(format!("{}.wasm", idx.0))
    }

    pub fn write_skeleton(&self, bytes: &[u8]) -> RuntimeResult<()> {
        write_blob(self.skeleton_path(), bytes)
    }

    pub fn write_function(&self, idx: FuncIndex, bytes: &[u8]) -> RuntimeResult<()> {
        write_blob(self.function_path(idx), bytes)
    }
}

fn write_blob(path: PathBuf, bytes: &[u8]) -> RuntimeResult<()> {
    match std::fs::write(&path, bytes) {
        Ok(()) => {
            log::debug!("Dumped {} bytes to {}", bytes.len(), path.display());
            Ok(())
        }
        Err(source) => Err(RuntimeError::Dump { path, source }),
    }
}
