use thiserror::Error;

use crate::source::Span;

/// Top-level error type for the zeroc pipeline.
///
/// The parser and the semantic analyzer accumulate as many diagnostics as
/// they can before failing; their variants carry the full list.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parsing failed with {} error(s)", .0.len())]
    Parse(Vec<ParseDiagnostic>),

    #[error("semantic analysis failed with {} error(s)", .0.len())]
    Sema(Vec<SemanticError>),

    #[error("interpreter error: {0}")]
    Interp(#[from] InterpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Parse diagnostics
// ---------------------------------------------------------------------------

/// One lexical or syntactic error, recorded at the offending token's span.
/// The parser resynchronizes after recording so a single run reports as
/// many of these as possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub span: Span,
    /// True when the diagnostic came from an error token (lexical), false
    /// for parser mismatches (syntactic).
    pub lexical: bool,
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Semantic errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemaErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    WrongArgCount,
    TypeMismatch,
    ReturnTypeMismatch,
    DuplicateDefinition,
}

impl SemaErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            SemaErrorKind::UndefinedVariable => "undefined variable",
            SemaErrorKind::UndefinedFunction => "undefined function",
            SemaErrorKind::WrongArgCount => "wrong arg count",
            SemaErrorKind::TypeMismatch => "type mismatch",
            SemaErrorKind::ReturnTypeMismatch => "return type mismatch",
            SemaErrorKind::DuplicateDefinition => "duplicate definition",
        }
    }
}

/// A semantic error: its kind, a human-readable message, and the span it
/// points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemaErrorKind,
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Interpreter errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum InterpError {
    #[error("entry function '{name}' not found")]
    EntryNotFound { name: String },

    #[error("external function '{name}' failed: {detail}")]
    External { name: String, detail: String },
}
