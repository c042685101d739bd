//! Host-side access to the compiler service.
//!
//! The compiler service is an opaque wasm artifact that turns source text
//! into executable wasm units. This crate moves bytes in and out of its
//! linear memory ([`memory`]) and wraps its four operations behind the
//! [`CompilerService`] trait ([`service`]).

pub mod error;
pub mod handles;
pub mod memory;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::{BoxError, ServiceError, ServiceResult, ServiceStage};
pub use handles::{CompilerHandle, FuncIndex, IrModuleHandle, ServiceAddr, ServiceBuffer};
pub use memory::ServiceMemory;
pub use service::{CompilerService, WasmCompilerService};

/// Where the build of the compiler service leaves its artifact.
pub const DEFAULT_SERVICE_PATH: &str = "target/wasm32-unknown-unknown/debug/wjit.wasm";
