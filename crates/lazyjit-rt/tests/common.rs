// Shared helpers for dispatcher integration tests: an in-process compiler
// service that emits skeleton and function units from WAT.

#![allow(dead_code)]

use lazyjit_rt::{BufferSink, DispatcherConfig, RuntimeResult, Session};
use lazyjit_service::{
    CompilerHandle, CompilerService, FuncIndex, IrModuleHandle, ServiceError, ServiceResult,
    ServiceStage,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasmtime::Engine;

/// `$tN` takes N `i32` parameters and returns an `i32`.
const TYPES: &str = r#"
  (type $t0 (func (result i32)))
  (type $t1 (func (param i32) (result i32)))
  (type $t2 (func (param i32 i32) (result i32)))
  (type $t3 (func (param i32 i32 i32) (result i32)))
"#;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone)]
pub struct FakeFunction {
    pub name: String,
    pub params: u32,
    /// Instructions of the real body, in folded WAT form.
    pub body: String,
}

pub fn func(name: &str, params: u32, body: impl Into<String>) -> FakeFunction {
    FakeFunction {
        name: name.to_string(),
        params,
        body: body.into(),
    }
}

/// Calls slot `idx` of the shared table with `args` (already folded WAT).
pub fn call(idx: u32, params: u32, args: &str) -> String {
    format!("(call_indirect (type $t{}) {} (i32.const {}))", params, args, idx)
}

pub fn print(value: &str) -> String {
    format!("(drop (call $println {}))", value)
}

/// A compiler service that knows its program up front.
///
/// Sources starting with `!` fail to parse; any other source yields the
/// configured functions.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    functions: Vec<FakeFunction>,
    skeleton_override: Option<String>,
    unit_overrides: HashMap<u32, String>,
    failing_function: Option<u32>,
    failing_skeleton: bool,
    compiled: Rc<RefCell<Vec<u32>>>,
}

impl FakeCompiler {
    pub fn new(functions: Vec<FakeFunction>) -> Self {
        FakeCompiler {
            functions,
            ..Default::default()
        }
    }

    /// Every index passed to `compile_func`, in call order.
    pub fn compile_log(&self) -> Rc<RefCell<Vec<u32>>> {
        self.compiled.clone()
    }

    pub fn with_skeleton(mut self, wat: impl Into<String>) -> Self {
        self.skeleton_override = Some(wat.into());
        self
    }

    pub fn with_unit(mut self, idx: u32, wat: impl Into<String>) -> Self {
        self.unit_overrides.insert(idx, wat.into());
        self
    }

    pub fn failing_on(mut self, idx: u32) -> Self {
        self.failing_function = Some(idx);
        self
    }

    pub fn failing_skeleton(mut self) -> Self {
        self.failing_skeleton = true;
        self
    }

    pub fn skeleton_bytes(&self) -> Vec<u8> {
        wat::parse_str(self.skeleton_wat()).expect("skeleton WAT should assemble")
    }

    pub fn unit_bytes(&self, idx: u32) -> Vec<u8> {
        wat::parse_str(self.unit_wat(idx)).expect("function unit WAT should assemble")
    }

    fn skeleton_wat(&self) -> String {
        if let Some(wat) = &self.skeleton_override {
            return wat.clone();
        }
        let count = self.functions.len();
        let slots: Vec<String> = (0..count).map(|i| format!("$f{}", i)).collect();
        let stubs: String = self
            .functions
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let args: String = (0..f.params).map(|p| format!("(local.get {}) ", p)).collect();
                format!(
                    "(func $f{i} (export \"{name}\") (type $t{params})\n    (drop (call $compile_func (i32.const {i})))\n    {dispatch})\n",
                    i = i,
                    name = f.name,
                    params = f.params,
                    dispatch = call(i as u32, f.params, &args),
                )
            })
            .collect();
        format!(
            "(module\n{types}\n  (import \"env\" \"compile_func\" (func $compile_func (param i32) (result i32)))\n  (table (export \"_table\") {count} funcref)\n  (elem (i32.const 0) func {slots})\n{stubs})",
            types = TYPES,
            count = count,
            slots = slots.join(" "),
            stubs = stubs,
        )
    }

    fn unit_wat(&self, idx: u32) -> String {
        if let Some(wat) = self.unit_overrides.get(&idx) {
            return wat.clone();
        }
        let f = &self.functions[idx as usize];
        format!(
            "(module\n{types}\n  (import \"env\" \"_table\" (table 0 funcref))\n  (import \"env\" \"println\" (func $println (param i32) (result i32)))\n  (elem (i32.const {idx}) func $body)\n  (func $body (type $t{params})\n    {body}))",
            types = TYPES,
            idx = idx,
            params = f.params,
            body = f.body,
        )
    }
}

impl CompilerService for FakeCompiler {
    fn make_ir_module(&mut self, source: &str) -> ServiceResult<IrModuleHandle> {
        if source.starts_with('!') {
            return Err(ServiceError::trap(ServiceStage::Parse, "unexpected token `!`"));
        }
        Ok(IrModuleHandle::from_raw(1))
    }

    fn make_compiler(&mut self, ir: IrModuleHandle) -> ServiceResult<CompilerHandle> {
        Ok(CompilerHandle::from_raw(ir.raw() + 1))
    }

    fn compile_skeleton(&mut self, _compiler: CompilerHandle) -> ServiceResult<Vec<u8>> {
        if self.failing_skeleton {
            return Err(ServiceError::trap(
                ServiceStage::CompileSkeleton,
                "no functions to emit",
            ));
        }
        Ok(self.skeleton_bytes())
    }

    fn compile_func(&mut self, _compiler: CompilerHandle, idx: FuncIndex) -> ServiceResult<Vec<u8>> {
        self.compiled.borrow_mut().push(idx.0);
        if self.failing_function == Some(idx.0) {
            return Err(ServiceError::trap(
                ServiceStage::CompileFunction(idx.0),
                "unsupported expression",
            ));
        }
        Ok(self.unit_bytes(idx.0))
    }
}

/// A session over `compiler` whose printed values land in the returned buffer.
pub fn session_with(
    compiler: FakeCompiler,
    config: &DispatcherConfig,
) -> RuntimeResult<(Session, Rc<RefCell<BufferSink>>)> {
    init_logging();
    let engine = Engine::default();
    let output = Rc::new(RefCell::new(BufferSink::default()));
    let session = Session::new(
        &engine,
        compiler,
        "fn main() = 0",
        config,
        Box::new(output.clone()),
    )?;
    Ok((session, output))
}

pub fn session(compiler: FakeCompiler) -> RuntimeResult<(Session, Rc<RefCell<BufferSink>>)> {
    session_with(compiler, &DispatcherConfig::default())
}
