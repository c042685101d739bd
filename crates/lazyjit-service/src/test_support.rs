//! A tiny hand-written compiler service used by the unit tests.
//!
//! It bump-allocates from `FAKE_HEAP_BASE`, traps in `make_ir_module` when the
//! source starts with `!`, traps in `make_compiler` on empty source, returns an
//! empty wasm module as the skeleton and `func-<i>` as the blob of function
//! `i` (only 0 and 1 exist).

use wasmtime::{Instance, Module, Store};

pub(crate) const FAKE_HEAP_BASE: u32 = 1024;

const FAKE_SERVICE_WAT: &str = r#"
(module
  (memory (export "memory") 1)
  (global $next (mut i32) (i32.const 1024))
  (data (i32.const 16) "\00asm\01\00\00\00")
  (data (i32.const 32) "func-0")
  (data (i32.const 48) "func-1")

  (func (export "alloc") (param $size i32) (result i32)
    (local $ptr i32)
    (local.set $ptr (global.get $next))
    (global.set $next (i32.add (global.get $next) (local.get $size)))
    (block $done
      (loop $grow
        (br_if $done
          (i32.le_u (global.get $next) (i32.mul (memory.size) (i32.const 65536))))
        (drop (memory.grow (i32.const 1)))
        (br $grow)))
    (local.get $ptr))

  (func (export "make_ir_module") (param $src i32) (result i32)
    (if (i32.eq (i32.load8_u (local.get $src)) (i32.const 33))
      (then unreachable))
    (local.get $src))

  (func (export "make_compiler") (param $ir i32) (result i32)
    (if (i32.eqz (i32.load8_u (local.get $ir)))
      (then unreachable))
    (i32.add (local.get $ir) (i32.const 1)))

  (func (export "compile_skeleton") (param $compiler i32) (param $len_out i32) (result i32)
    (i32.store (local.get $len_out) (i32.const 8))
    (i32.const 16))

  (func (export "compile_func") (param $compiler i32) (param $idx i32) (param $len_out i32) (result i32)
    (if (i32.ge_u (local.get $idx) (i32.const 2))
      (then unreachable))
    (i32.store (local.get $len_out) (i32.const 6))
    (i32.add (i32.const 32) (i32.mul (local.get $idx) (i32.const 16))))
)
"#;

pub(crate) fn fake_service_binary() -> Vec<u8> {
    wat::parse_str(FAKE_SERVICE_WAT).expect("fake service WAT is valid")
}

pub(crate) fn instantiate_fake_service(store: &mut Store<()>) -> Instance {
    let module = Module::from_binary(store.engine(), &fake_service_binary()).unwrap();
    Instance::new(store, &module, &[]).unwrap()
}
