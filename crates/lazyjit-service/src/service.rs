use crate::error::{ServiceError, ServiceResult, ServiceStage};
use crate::handles::{CompilerHandle, FuncIndex, IrModuleHandle, ServiceAddr, ServiceBuffer};
use crate::memory::ServiceMemory;
use std::fmt;
use std::path::Path;
use wasmtime::{Engine, Instance, Module, Store, TypedFunc, WasmParams, WasmResults};

/// The four operations every compiler service provides.
///
/// The dispatcher only ever talks to this trait. Blobs come back as owned
/// bytes, so no address inside the service escapes an implementation.
/// Every failure is fatal to the session.
pub trait CompilerService {
    /// Parses `source` into an IR module.
    fn make_ir_module(&mut self, source: &str) -> ServiceResult<IrModuleHandle>;

    /// Builds compiler state for a parsed module.
    fn make_compiler(&mut self, ir: IrModuleHandle) -> ServiceResult<CompilerHandle>;

    /// Produces the skeleton unit: every function present, every body a stub.
    fn compile_skeleton(&mut self, compiler: CompilerHandle) -> ServiceResult<Vec<u8>>;

    /// Produces the unit holding the real code of function `idx`.
    fn compile_func(&mut self, compiler: CompilerHandle, idx: FuncIndex) -> ServiceResult<Vec<u8>>;
}

struct ServiceExports {
    make_ir_module: TypedFunc<i32, i32>,
    make_compiler: TypedFunc<i32, i32>,
    compile_skeleton: TypedFunc<(i32, i32), i32>,
    compile_func: TypedFunc<(i32, i32, i32), i32>,
}

/// A compiler service loaded from a wasm artifact, running in its own store.
pub struct WasmCompilerService {
    store: Store<()>,
    memory: ServiceMemory,
    exports: ServiceExports,
}

// TypedFunc has no useful Debug output; show the memory size instead.
impl fmt::Debug for WasmCompilerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WasmCompilerService")
            .field("memory_bytes", &self.memory.size_bytes(&self.store))
            .finish()
    }
}

impl WasmCompilerService {
    /// Reads and instantiates the service artifact at `path`.
    pub fn from_file(engine: &Engine, path: &Path) -> ServiceResult<Self> {
        log::debug!("Loading compiler service from {}", path.display());
        let bytes = std::fs::read(path).map_err(|source| ServiceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_binary(engine, &bytes)
    }

    pub fn from_binary(engine: &Engine, bytes: &[u8]) -> ServiceResult<Self> {
        let module = Module::from_binary(engine, bytes).map_err(|e| ServiceError::Load(e.into()))?;
        let mut store = Store::new(engine, ());
        let instance =
            Instance::new(&mut store, &module, &[]).map_err(|e| ServiceError::Load(e.into()))?;

        let memory = ServiceMemory::from_instance(&mut store, &instance)?;
        let exports = ServiceExports {
            make_ir_module: typed_export(&mut store, &instance, "make_ir_module")?,
            make_compiler: typed_export(&mut store, &instance, "make_compiler")?,
            compile_skeleton: typed_export(&mut store, &instance, "compile_skeleton")?,
            compile_func: typed_export(&mut store, &instance, "compile_func")?,
        };
        log::info!(
            "Compiler service ready ({} bytes of linear memory)",
            memory.size_bytes(&store)
        );

        Ok(WasmCompilerService {
            store,
            memory,
            exports,
        })
    }

    pub fn memory(&self) -> &ServiceMemory {
        &self.memory
    }

    pub fn store(&self) -> &Store<()> {
        &self.store
    }

    /// Reads a `(ptr, *len_out)` pair returned by a compile operation.
    fn read_blob(&self, stage: ServiceStage, ptr: i32, len_out: ServiceAddr) -> ServiceResult<Vec<u8>> {
        let len = self.memory.read_i32(&self.store, len_out)?;
        if len < 0 {
            return Err(ServiceError::InvalidLength { stage, len });
        }
        let buffer = ServiceBuffer {
            addr: ServiceAddr::from_raw(ptr),
            len: len as u32,
        };
        self.memory.read_buffer(&self.store, buffer)
    }
}

fn typed_export<P, R>(
    store: &mut Store<()>,
    instance: &Instance,
    name: &str,
) -> ServiceResult<TypedFunc<P, R>>
where
    P: WasmParams,
    R: WasmResults,
{
    let func = instance
        .get_func(&mut *store, name)
        .ok_or_else(|| ServiceError::MissingExport(name.to_string()))?;
    func.typed::<P, R>(&*store)
        .map_err(|e| ServiceError::Load(e.into()))
}

impl CompilerService for WasmCompilerService {
    fn make_ir_module(&mut self, source: &str) -> ServiceResult<IrModuleHandle> {
        let addr = self.memory.write_string(&mut self.store, source.as_bytes())?;
        let raw = self
            .exports
            .make_ir_module
            .call(&mut self.store, addr.to_raw())
            .map_err(|e| ServiceError::trap(ServiceStage::Parse, e))?;
        log::debug!("IR module built from {} bytes of source", source.len());
        Ok(IrModuleHandle(raw))
    }

    fn make_compiler(&mut self, ir: IrModuleHandle) -> ServiceResult<CompilerHandle> {
        let raw = self
            .exports
            .make_compiler
            .call(&mut self.store, ir.0)
            .map_err(|e| ServiceError::trap(ServiceStage::Build, e))?;
        Ok(CompilerHandle(raw))
    }

    fn compile_skeleton(&mut self, compiler: CompilerHandle) -> ServiceResult<Vec<u8>> {
        let stage = ServiceStage::CompileSkeleton;
        let len_out = self.memory.alloc(&mut self.store, 4)?;
        let ptr = self
            .exports
            .compile_skeleton
            .call(&mut self.store, (compiler.0, len_out.to_raw()))
            .map_err(|e| ServiceError::trap(stage, e))?;
        self.read_blob(stage, ptr, len_out)
    }

    fn compile_func(&mut self, compiler: CompilerHandle, idx: FuncIndex) -> ServiceResult<Vec<u8>> {
        let stage = ServiceStage::CompileFunction(idx.0);
        let len_out = self.memory.alloc(&mut self.store, 4)?;
        let ptr = self
            .exports
            .compile_func
            .call(&mut self.store, (compiler.0, idx.0 as i32, len_out.to_raw()))
            .map_err(|e| ServiceError::trap(stage, e))?;
        self.read_blob(stage, ptr, len_out)
    }
}
