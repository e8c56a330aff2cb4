//! zeroc: compiler front-end and execution engine for the Zero language.
//!
//! Pipeline:
//!
//! ```text
//! source (.zero) → Lexer → [Tokens] → Parser → [AST]
//!   → Sema → (errors?) → Lowering → [Module] → Interpreter → value
//! ```
//!
//! Every token, AST node, and diagnostic carries a `Span` referring back
//! to the `SourceManager`, so errors at any stage stay precisely
//! localized. The parser and the analyzer accumulate diagnostics and keep
//! going; lowering never fails; the interpreter's only fatal failure mode
//! is an error returned by a registered external.

pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod interp;
pub mod ir;
pub mod lower;
pub mod parser;
pub mod runtime;
pub mod sema;
pub mod source;
pub mod types;

pub use error::Error;

use crate::parser::Parser;
use crate::sema::{FnSignature, Sema};
use crate::source::{SourceId, SourceManager};
use crate::types::Type;

/// Registers the signatures of the built-in runtime functions so the
/// analyzer accepts calls to them. Variadic: arity and argument types are
/// the host's concern.
pub fn register_default_builtins(sema: &mut Sema) {
    sema.register_builtin(FnSignature::variadic("print", Type::VOID));
    sema.register_builtin(FnSignature::variadic("log", Type::VOID));
}

/// Compiles a loaded source through lex → parse → sema → lower.
///
/// Parse and semantic errors abort with the full accumulated diagnostic
/// list. A returned module is ready to print or execute.
pub fn compile(sm: &SourceManager, id: SourceId) -> Result<ir::Module, Error> {
    let mut parser = Parser::new(sm, id);
    let program = parser.parse();
    if parser.had_error() {
        return Err(Error::Parse(parser.into_errors()));
    }

    let mut sema = Sema::new();
    register_default_builtins(&mut sema);
    sema.analyze(&program);
    if sema.had_error() {
        return Err(Error::Sema(sema.into_errors()));
    }

    Ok(lower::lower(&program))
}

/// Convenience for embedding and tests: compile a source string under a
/// virtual file name.
pub fn compile_str(name: &str, source: &str) -> Result<ir::Module, Error> {
    let mut sm = SourceManager::new();
    let id = sm.load_from_string(name, source);
    compile(&sm, id)
}
