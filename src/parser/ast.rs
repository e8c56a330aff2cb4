//! The Zero abstract syntax tree.
//!
//! Expressions and statements are finite tagged sums; children are uniquely
//! owned by their parent, so an AST is always a tree. Every node carries its
//! source span.
//!
//! Children that failed to parse during panic-mode recovery are `None`;
//! downstream stages treat them as `unknown`-typed / no-op.

use crate::source::Span;
use crate::types::Type;

/// An identifier with its source location.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// A type annotation as written in source.
#[derive(Debug, Clone, Copy)]
pub struct AstType {
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl std::fmt::Display for AstBinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AstBinOp::Add => "+",
            AstBinOp::Sub => "-",
            AstBinOp::Mul => "*",
            AstBinOp::Div => "/",
            AstBinOp::Eq => "==",
            AstBinOp::Ne => "!=",
            AstBinOp::Lt => "<",
            AstBinOp::Le => "<=",
            AstBinOp::Gt => ">",
            AstBinOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstUnaryOp {
    /// Arithmetic negation: `-x`
    Neg,
    /// Logical NOT: `!x`
    Not,
}

/// An expression in the AST.
#[derive(Debug, Clone)]
pub enum AstExpr {
    Ident(Ident),
    IntLit {
        value: i64,
        span: Span,
    },
    FloatLit {
        value: f64,
        span: Span,
    },
    /// A string literal with quotes stripped and escapes interpreted.
    StrLit {
        value: String,
        span: Span,
    },
    Binary {
        op: AstBinOp,
        lhs: Option<Box<AstExpr>>,
        rhs: Option<Box<AstExpr>>,
        span: Span,
    },
    Unary {
        op: AstUnaryOp,
        operand: Option<Box<AstExpr>>,
        span: Span,
    },
    /// `callee(args...)`. Keyword-argument names are discarded at parse
    /// time; only positional arguments survive.
    Call {
        callee: String,
        args: Vec<AstExpr>,
        span: Span,
    },
    /// `( inner )`
    Group {
        inner: Option<Box<AstExpr>>,
        span: Span,
    },
}

impl AstExpr {
    pub fn span(&self) -> Span {
        match self {
            AstExpr::Ident(id) => id.span,
            AstExpr::IntLit { span, .. } => *span,
            AstExpr::FloatLit { span, .. } => *span,
            AstExpr::StrLit { span, .. } => *span,
            AstExpr::Binary { span, .. } => *span,
            AstExpr::Unary { span, .. } => *span,
            AstExpr::Call { span, .. } => *span,
            AstExpr::Group { span, .. } => *span,
        }
    }
}

/// A statement in the AST.
#[derive(Debug, Clone)]
pub enum AstStmt {
    /// `let <name>[: <ty>] = <expr>;`
    Let {
        name: String,
        ty: Option<AstType>,
        init: Option<Box<AstExpr>>,
        span: Span,
    },
    /// `return [expr];`
    Return {
        value: Option<Box<AstExpr>>,
        span: Span,
    },
    /// An expression evaluated for its side effects.
    Expr {
        expr: Option<Box<AstExpr>>,
        span: Span,
    },
    /// `if cond { then } [else { else }]`; both bodies are ordered
    /// statement lists.
    If {
        cond: Option<Box<AstExpr>>,
        then_branch: Vec<AstStmt>,
        else_branch: Vec<AstStmt>,
        span: Span,
    },
    /// `while cond { body }`
    While {
        cond: Option<Box<AstExpr>>,
        body: Vec<AstStmt>,
        span: Span,
    },
    /// A bare `{ ... }` block.
    Block {
        stmts: Vec<AstStmt>,
        span: Span,
    },
}

impl AstStmt {
    pub fn span(&self) -> Span {
        match self {
            AstStmt::Let { span, .. } => *span,
            AstStmt::Return { span, .. } => *span,
            AstStmt::Expr { span, .. } => *span,
            AstStmt::If { span, .. } => *span,
            AstStmt::While { span, .. } => *span,
            AstStmt::Block { span, .. } => *span,
        }
    }
}

/// A function parameter. An omitted annotation leaves the type `unknown`.
#[derive(Debug, Clone)]
pub struct AstParam {
    pub name: String,
    pub ty: AstType,
    pub span: Span,
}

/// A top-level function declaration.
#[derive(Debug, Clone)]
pub struct AstFunction {
    pub name: String,
    pub params: Vec<AstParam>,
    /// `None` means no `-> type` annotation (defaults to `void` in sema).
    pub return_ty: Option<AstType>,
    pub body: Vec<AstStmt>,
    pub span: Span,
}

/// A parsed source file: an ordered list of function declarations plus the
/// names of `use`-imported modules (recognised and skipped).
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: Vec<AstFunction>,
    pub imports: Vec<String>,
}
