//! Interpreter tests: end-to-end execution scenarios, opcode semantics,
//! externals, and exit codes.

use std::cell::RefCell;
use std::rc::Rc;

use zeroc::compile_str;
use zeroc::error::InterpError;
use zeroc::interp::{Interpreter, RuntimeValue};
use zeroc::ir::{IrBuilder, Module, OpCode};
use zeroc::parser::Parser;
use zeroc::sema::{FnSignature, Sema};
use zeroc::source::SourceManager;
use zeroc::types::Type;
use zeroc::{lower, runtime};

fn run(src: &str) -> (RuntimeValue, i32) {
    let module = compile_str("interp.zero", src).expect("compilation should succeed");
    let mut interp = Interpreter::new();
    runtime::install(&mut interp);
    let result = interp.execute(&module, "main").expect("execution should succeed");
    (result, interp.exit_code())
}

/// Compiles with extra built-in signatures registered for sema, without
/// touching the interpreter's registry.
fn compile_with_builtins(src: &str, builtins: &[&str]) -> Module {
    let mut sm = SourceManager::new();
    let id = sm.load_from_string("interp.zero", src);
    let mut parser = Parser::new(&sm, id);
    let program = parser.parse();
    assert!(!parser.had_error(), "parse errors: {:?}", parser.errors());

    let mut sema = Sema::new();
    for name in builtins {
        sema.register_builtin(FnSignature::variadic(*name, Type::VOID));
    }
    sema.analyze(&program);
    assert!(!sema.had_error(), "sema errors: {:?}", sema.errors());

    lower::lower(&program)
}

#[test]
fn test_return_constant() {
    let (result, exit) = run("fn main() { return 42; }");
    assert_eq!(result, RuntimeValue::Int(42));
    assert_eq!(exit, 42);
}

#[test]
fn test_arithmetic_precedence() {
    let (result, _) = run("fn main() { return 1 + 2 * 3; }");
    assert_eq!(result, RuntimeValue::Int(7));
}

#[test]
fn test_let_binding() {
    let (result, _) = run("fn main() { let x = 10; return x; }");
    assert_eq!(result, RuntimeValue::Int(10));
    let (result, _) = run("fn main() { let x = 10; return x + 5; }");
    assert_eq!(result, RuntimeValue::Int(15));
}

#[test]
fn test_if_else_takes_true_branch() {
    let (result, _) = run("fn main() { if 1 { return 1; } else { return 2; } }");
    assert_eq!(result, RuntimeValue::Int(1));
}

#[test]
fn test_if_else_takes_false_branch() {
    let (result, _) = run("fn main() { if 0 { return 1; } else { return 2; } }");
    assert_eq!(result, RuntimeValue::Int(2));
}

#[test]
fn test_comparison_drives_branching() {
    let src = "fn main() { if 3 < 5 { return 10; } return 20; }";
    let (result, _) = run(src);
    assert_eq!(result, RuntimeValue::Int(10));
}

#[test]
fn test_while_with_false_condition_skips_body() {
    let (result, _) = run("fn main() { while 0 { print(1); } return 3; }");
    assert_eq!(result, RuntimeValue::Int(3));
}

#[test]
fn test_integer_division_by_zero_yields_zero() {
    let (result, _) = run("fn main() { return 10 / 0; }");
    assert_eq!(result, RuntimeValue::Int(0));
}

#[test]
fn test_float_division_follows_ieee() {
    let (result, _) = run("fn main() { return 1.0 / 0.0; }");
    assert_eq!(result, RuntimeValue::Float(f64::INFINITY));
}

#[test]
fn test_float_promotion() {
    let (result, _) = run("fn main() { return 1 + 2.5; }");
    assert_eq!(result, RuntimeValue::Float(3.5));
}

#[test]
fn test_negation() {
    let (result, exit) = run("fn main() { return -5; }");
    assert_eq!(result, RuntimeValue::Int(-5));
    assert_eq!(exit, -5);
    let (result, _) = run("fn main() { return -2.5; }");
    assert_eq!(result, RuntimeValue::Float(-2.5));
}

#[test]
fn test_comparisons_yield_int_flags() {
    let (result, _) = run("fn main() { return 2 == 2; }");
    assert_eq!(result, RuntimeValue::Int(1));
    let (result, _) = run("fn main() { return 2 != 2; }");
    assert_eq!(result, RuntimeValue::Int(0));
    let (result, _) = run("fn main() { return 3 >= 4; }");
    assert_eq!(result, RuntimeValue::Int(0));
}

#[test]
fn test_call_binds_arguments_positionally() {
    let src = "fn sub(a: int, b: int) -> int { return a - b; }\n\
               fn main() { return sub(10, 4); }";
    let (result, _) = run(src);
    assert_eq!(result, RuntimeValue::Int(6));
}

#[test]
fn test_recursive_calls_have_private_frames() {
    let src = "fn fact(n: int) -> int {\n\
                   if n < 2 { return 1; }\n\
                   return n * fact(n - 1);\n\
               }\n\
               fn main() { return fact(5); }";
    let (result, _) = run(src);
    assert_eq!(result, RuntimeValue::Int(120));
}

#[test]
fn test_void_return_yields_unit_and_exit_zero() {
    let (result, exit) = run("fn main() { return; }");
    assert_eq!(result, RuntimeValue::Unit);
    assert_eq!(exit, 0);
}

#[test]
fn test_non_int_result_exits_zero() {
    let (result, exit) = run("fn main() { return 1.5; }");
    assert_eq!(result, RuntimeValue::Float(1.5));
    assert_eq!(exit, 0);
}

#[test]
fn test_exit_code_keeps_low_32_bits() {
    let (result, exit) = run("fn main() { return 4294967296 + 7; }");
    assert_eq!(result, RuntimeValue::Int(4294967303));
    // 2^32 + 7 truncates to 7.
    assert_eq!(exit, 7);
}

#[test]
fn test_repeated_execution_is_deterministic() {
    let module = compile_str("interp.zero", "fn main() { return 6 * 7; }").unwrap();
    let mut a = Interpreter::new();
    let mut b = Interpreter::new();
    let first = a.execute(&module, "main").unwrap();
    let second = b.execute(&module, "main").unwrap();
    assert_eq!(first, second);
    // Same interpreter, run again.
    let third = a.execute(&module, "main").unwrap();
    assert_eq!(first, third);
}

#[test]
fn test_missing_entry_function() {
    let module = Module::new();
    let mut interp = Interpreter::new();
    let err = interp.execute(&module, "main").unwrap_err();
    assert!(matches!(err, InterpError::EntryNotFound { .. }));
}

#[test]
fn test_custom_external_receives_arguments() {
    let module = compile_with_builtins("fn main() { record(1, 2.5); record(3); }", &["record"]);

    let seen: Rc<RefCell<Vec<Vec<RuntimeValue>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();

    let mut interp = Interpreter::new();
    interp.register_external(
        "record",
        Box::new(move |args| {
            sink.borrow_mut().push(args.to_vec());
            Ok(RuntimeValue::Unit)
        }),
    );
    interp.execute(&module, "main").unwrap();

    let calls = seen.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec![RuntimeValue::Int(1), RuntimeValue::Float(2.5)]);
    assert_eq!(calls[1], vec![RuntimeValue::Int(3)]);
}

#[test]
fn test_external_result_flows_back() {
    let module = compile_with_builtins("fn main() { return answer(); }", &["answer"]);

    let mut interp = Interpreter::new();
    interp.register_external("answer", Box::new(|_| Ok(RuntimeValue::Int(42))));
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(42));
}

#[test]
fn test_external_error_is_fatal() {
    let module = compile_with_builtins("fn main() { boom(); return 1; }", &["boom"]);

    let mut interp = Interpreter::new();
    interp.register_external(
        "boom",
        Box::new(|_| {
            Err(InterpError::External {
                name: "boom".to_owned(),
                detail: "host failure".to_owned(),
            })
        }),
    );
    let err = interp.execute(&module, "main").unwrap_err();
    assert!(matches!(err, InterpError::External { .. }));
}

#[test]
fn test_unresolved_call_produces_unit() {
    // Registered for sema, but absent from both the module and the
    // interpreter registry: the call quietly yields unit.
    let module = compile_with_builtins("fn main() { mystery(); return 9; }", &["mystery"]);
    let mut interp = Interpreter::new();
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(9));
}

#[test]
fn test_externals_resolve_before_module_functions() {
    // A module function and an external share a name; the external wins.
    let src = "fn twice(x: int) -> int { return x * 2; }\n\
               fn main() { return twice(4); }";
    let module = compile_str("interp.zero", src).unwrap();
    let mut interp = Interpreter::new();
    interp.register_external("twice", Box::new(|args| {
        Ok(RuntimeValue::Int(args[0].to_int() * 100))
    }));
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(400));
}

#[test]
fn test_print_externals_run() {
    let (result, exit) = run("fn main() { print(1, 2.5); print(\"done\"); return 0; }");
    assert_eq!(result, RuntimeValue::Int(0));
    assert_eq!(exit, 0);
}

#[test]
fn test_enhanced_print_family_runs() {
    let src = "fn main() {\n\
                   log(\"hello\", \"red\", 0);\n\
                   print_traced(\"step\", 1);\n\
                   print_piped(7, \"n\");\n\
                   print_fstring(\"a\", \"b\", \"c\");\n\
                   print_ex(\"m\", 2, \"label\");\n\
                   return 0;\n\
               }";
    let module = compile_with_builtins(
        src,
        &["log", "print_traced", "print_piped", "print_fstring", "print_ex"],
    );
    let mut interp = Interpreter::new();
    runtime::install(&mut interp);
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(0));
}

// ---------------------------------------------------------------------------
// Reserved opcode contracts (builder-built modules)
// ---------------------------------------------------------------------------

#[test]
fn test_alloca_load_store_contract() {
    let mut builder = IrBuilder::new("main", vec![], Type::INT);
    let slot = builder.alloca(Type::INT);
    let seven = builder.const_int(7);
    builder.store(slot, seven);
    // load currently returns its operand's value.
    let loaded = builder.load(seven);
    builder.ret_value(loaded);

    let mut module = Module::new();
    module.push_function(builder.build());

    let mut interp = Interpreter::new();
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(7));
}

#[test]
fn test_alloca_yields_zero_placeholder() {
    let mut builder = IrBuilder::new("main", vec![], Type::INT);
    let slot = builder.alloca(Type::INT);
    builder.ret_value(slot);

    let mut module = Module::new();
    module.push_function(builder.build());

    let mut interp = Interpreter::new();
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(0));
}

#[test]
fn test_tensor_ops_yield_null_pointer() {
    let mut builder = IrBuilder::new("main", vec![], Type::TENSOR);
    let t = builder.tensor_op(OpCode::TensorAlloc, vec![]);
    let r = builder.tensor_op(OpCode::TensorRelu, vec![t]);
    builder.ret_value(r);

    let mut module = Module::new();
    module.push_function(builder.build());

    let mut interp = Interpreter::new();
    let result = interp.execute(&module, "main").unwrap();
    assert!(result.is_ptr());
    assert_eq!(result, RuntimeValue::Ptr(0));
}

#[test]
fn test_fall_through_between_blocks() {
    // A hand-built block without a terminator falls through to the next
    // block by index.
    let mut builder = IrBuilder::new("main", vec![], Type::INT);
    let v = builder.const_int(5);
    let next = builder.create_block("");
    builder.set_insert_point(next);
    builder.ret_value(v);

    let mut module = Module::new();
    module.push_function(builder.build());

    let mut interp = Interpreter::new();
    let result = interp.execute(&module, "main").unwrap();
    assert_eq!(result, RuntimeValue::Int(5));
}

#[test]
fn test_runtime_value_coercions() {
    assert!(RuntimeValue::Unit.is_unit());
    assert!(RuntimeValue::Int(1).is_int());
    assert!(RuntimeValue::Float(1.0).is_float());
    assert!(RuntimeValue::Str("x".into()).is_str());
    assert_eq!(RuntimeValue::Float(2.9).to_int(), 2);
    assert_eq!(RuntimeValue::Int(3).to_float(), 3.0);
    assert_eq!(RuntimeValue::Unit.to_int(), 0);
    assert_eq!(RuntimeValue::Str("x".into()).to_float(), 0.0);
    assert_eq!(RuntimeValue::Int(7).to_string(), "7");
    assert_eq!(RuntimeValue::Str("hi".into()).to_string(), "hi");
    assert_eq!(RuntimeValue::Unit.to_string(), "()");
    assert_eq!(RuntimeValue::Ptr(0).to_string(), "null");
}
