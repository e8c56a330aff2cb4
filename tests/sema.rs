//! Semantic analyzer tests: scope resolution, arity/type checking, and
//! error accumulation.

use zeroc::error::SemaErrorKind;
use zeroc::parser::Parser;
use zeroc::sema::{FnSignature, Sema};
use zeroc::source::SourceManager;
use zeroc::types::Type;

fn analyze(src: &str) -> (SourceManager, Sema) {
    let mut sm = SourceManager::new();
    let id = sm.load_from_string("sema.zero", src);
    let mut parser = Parser::new(&sm, id);
    let program = parser.parse();
    assert!(!parser.had_error(), "parse errors: {:?}", parser.errors());

    let mut sema = Sema::new();
    zeroc::register_default_builtins(&mut sema);
    sema.analyze(&program);
    (sm, sema)
}

fn error_kinds(src: &str) -> Vec<SemaErrorKind> {
    let (_, sema) = analyze(src);
    sema.errors().iter().map(|e| e.kind).collect()
}

#[test]
fn test_clean_program() {
    let (_, sema) = analyze(
        "fn add(a: int, b: int) -> int { return a + b; }\n\
         fn main() { let x = add(1, 2); return x; }",
    );
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_undefined_variable() {
    let (sm, sema) = analyze("fn main() { return x; }");
    assert_eq!(sema.errors().len(), 1);
    let err = &sema.errors()[0];
    assert_eq!(err.kind, SemaErrorKind::UndefinedVariable);
    assert_eq!(err.to_string(), "Undefined variable: x");
    // The span points at the offending identifier.
    assert_eq!(sm.get_text(err.span), "x");
}

#[test]
fn test_undefined_function() {
    assert_eq!(
        error_kinds("fn main() { foo(); }"),
        vec![SemaErrorKind::UndefinedFunction]
    );
}

#[test]
fn test_wrong_arg_count() {
    // One argument for a two-parameter function.
    let (_, sema) = analyze("fn foo(a, b) { return a; }\nfn main() { foo(1); }");
    assert_eq!(sema.errors().len(), 1);
    assert_eq!(sema.errors()[0].kind, SemaErrorKind::WrongArgCount);
    assert_eq!(
        sema.errors()[0].message,
        "Function 'foo' expects 2 arguments, got 1"
    );
}

#[test]
fn test_argument_type_mismatch() {
    assert_eq!(
        error_kinds("fn f(a: int) { }\nfn main() { f(1.5); }"),
        vec![SemaErrorKind::TypeMismatch]
    );
}

#[test]
fn test_unannotated_param_accepts_anything() {
    let (_, sema) = analyze("fn f(a) { }\nfn main() { f(1.5); f(2); }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_let_annotation_mismatch() {
    assert_eq!(
        error_kinds("fn main() { let x: int = 1.5; }"),
        vec![SemaErrorKind::TypeMismatch]
    );
}

#[test]
fn test_let_annotation_match_promotes_nothing() {
    let (_, sema) = analyze("fn main() { let x: float = 1.5; let y: int = 2; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_return_type_mismatch() {
    assert_eq!(
        error_kinds("fn f() -> int { return 1.5; }"),
        vec![SemaErrorKind::ReturnTypeMismatch]
    );
}

#[test]
fn test_unannotated_return_type_is_lenient() {
    // No annotation: the expected type is unknown, disabling the check.
    let (_, sema) = analyze("fn f() { return 1.5; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_void_function_bare_return_ok() {
    let (_, sema) = analyze("fn f() -> void { return; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_int_return_from_void_function() {
    assert_eq!(
        error_kinds("fn f() -> void { return 1; }"),
        vec![SemaErrorKind::ReturnTypeMismatch]
    );
}

#[test]
fn test_duplicate_function() {
    assert_eq!(
        error_kinds("fn f() { }\nfn f() { }"),
        vec![SemaErrorKind::DuplicateDefinition]
    );
}

#[test]
fn test_duplicate_variable_in_same_scope() {
    assert_eq!(
        error_kinds("fn main() { let x = 1; let x = 2; }"),
        vec![SemaErrorKind::DuplicateDefinition]
    );
}

#[test]
fn test_shadowing_in_inner_scope_is_allowed() {
    let (_, sema) = analyze("fn main() { let x = 1; if 1 { let x = 2; } { let x = 3; } }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_inner_scope_bindings_do_not_leak() {
    // `y` is declared inside the if body and must not be visible after it.
    assert_eq!(
        error_kinds("fn main() { if 1 { let y = 2; } return y; }"),
        vec![SemaErrorKind::UndefinedVariable]
    );
}

#[test]
fn test_params_are_in_scope() {
    let (_, sema) = analyze("fn f(a: int, b: float) { return a; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_while_body_has_own_scope() {
    assert_eq!(
        error_kinds("fn main() { while 1 { let t = 1; } return t; }"),
        vec![SemaErrorKind::UndefinedVariable]
    );
}

#[test]
fn test_numeric_promotion_in_binary_result() {
    // int + float is float; assigning it to an int annotation mismatches.
    assert_eq!(
        error_kinds("fn main() { let x: int = 1 + 2.5; }"),
        vec![SemaErrorKind::TypeMismatch]
    );
    let (_, sema) = analyze("fn main() { let x: float = 1 + 2.5; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_string_literals_are_opaque() {
    // Strings carry unknown, which is compatible with everything.
    let (_, sema) = analyze("fn main() { let s = \"hi\"; let t: int = s; }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_variadic_builtin_accepts_any_arity() {
    let (_, sema) = analyze("fn main() { print(); print(1); print(1, 2.5, \"x\"); }");
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
}

#[test]
fn test_custom_builtin_registration() {
    let mut sm = SourceManager::new();
    let id = sm.load_from_string("sema.zero", "fn main() { record(1, 2, 3); }");
    let mut parser = Parser::new(&sm, id);
    let program = parser.parse();
    assert!(!parser.had_error());

    let mut sema = Sema::new();
    sema.register_builtin(FnSignature::variadic("record", Type::VOID));
    sema.analyze(&program);
    assert!(!sema.had_error(), "unexpected errors: {:?}", sema.errors());
    assert!(sema.signature("record").is_some());
}

#[test]
fn test_errors_accumulate() {
    let kinds = error_kinds("fn main() { return x + y; foo(); }");
    assert_eq!(
        kinds,
        vec![
            SemaErrorKind::UndefinedVariable,
            SemaErrorKind::UndefinedVariable,
            SemaErrorKind::UndefinedFunction,
        ]
    );
}

#[test]
fn test_type_queries_and_promotion() {
    use zeroc::types::{binary_result_type, parse_type, types_compatible};
    assert!(Type::TENSOR.is_tensor());
    assert!(Type::INT.is_numeric());
    assert!(!Type::TENSOR.is_numeric());
    assert_eq!(parse_type("tensor"), Type::TENSOR);
    assert_eq!(parse_type("mystery"), Type::UNKNOWN);
    assert_eq!(binary_result_type(Type::INT, Type::FLOAT), Type::FLOAT);
    assert_eq!(binary_result_type(Type::INT, Type::INT), Type::INT);
    // Non-numeric mixes collapse to unknown; unknown propagates the other
    // side.
    assert_eq!(binary_result_type(Type::INT, Type::TENSOR), Type::UNKNOWN);
    assert_eq!(binary_result_type(Type::UNKNOWN, Type::TENSOR), Type::TENSOR);
    assert!(types_compatible(Type::UNKNOWN, Type::INT));
    assert!(!types_compatible(Type::INT, Type::FLOAT));
    assert_eq!(Type::VOID.to_string(), "void");
}

#[test]
fn test_error_kind_names() {
    assert_eq!(SemaErrorKind::UndefinedVariable.name(), "undefined variable");
    assert_eq!(SemaErrorKind::UndefinedFunction.name(), "undefined function");
    assert_eq!(SemaErrorKind::WrongArgCount.name(), "wrong arg count");
    assert_eq!(SemaErrorKind::TypeMismatch.name(), "type mismatch");
    assert_eq!(
        SemaErrorKind::ReturnTypeMismatch.name(),
        "return type mismatch"
    );
    assert_eq!(
        SemaErrorKind::DuplicateDefinition.name(),
        "duplicate definition"
    );
}

#[test]
fn test_call_result_type_feeds_checking() {
    // f returns float; assigning to an int annotation mismatches.
    assert_eq!(
        error_kinds("fn f() -> float { return 1.0; }\nfn main() { let x: int = f(); }"),
        vec![SemaErrorKind::TypeMismatch]
    );
}
