//! Lazy function compilation on top of an opaque wasm compiler service.
//!
//! A [`Session`] asks the service for a skeleton unit whose functions are all
//! stubs, then runs the entry point. The first call to a stub compiles the
//! real function, installs it in the shared call table and re-dispatches.

pub mod config;
pub mod dump;
pub mod error;
pub mod output;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod skeleton;
pub mod state;
pub mod table;

pub use config::DispatcherConfig;
pub use dump::ArtifactDump;
pub use error::{RuntimeError, RuntimeResult};
pub use output::{BufferSink, OutputSink, StdoutSink};
pub use resolver::CompiledFunctionUnit;
pub use runtime::run_source;
pub use session::Session;
pub use skeleton::SkeletonUnit;
pub use state::DispatchState;
pub use table::{CallTable, SlotState};
