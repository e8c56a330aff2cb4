//! Semantic analysis: name resolution in nested scopes, arity checking,
//! and basic type compatibility.
//!
//! Two passes over a program: `collect_functions` registers every
//! top-level signature (so forward calls resolve), then each function body
//! is checked against a stack of lexical scopes. All errors accumulate;
//! analysis never stops at the first one.

use std::collections::HashMap;

use crate::error::{SemaErrorKind, SemanticError};
use crate::parser::ast::{AstExpr, AstFunction, AstStmt, Program};
use crate::source::Span;
use crate::types::{binary_result_type, types_compatible, Type};

/// A function signature as seen by call-site checking.
#[derive(Debug, Clone)]
pub struct FnSignature {
    pub name: String,
    pub param_types: Vec<Type>,
    pub return_type: Type,
    /// Variadic signatures (embedder-registered built-ins) opt out of
    /// arity and argument-type checks.
    pub variadic: bool,
}

impl FnSignature {
    /// A variadic signature for an embedder-provided built-in such as
    /// `print`.
    pub fn variadic(name: impl Into<String>, return_type: Type) -> FnSignature {
        FnSignature {
            name: name.into(),
            param_types: Vec::new(),
            return_type,
            variadic: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Sema {
    /// Scope stack, innermost at the back.
    scopes: Vec<HashMap<String, Type>>,
    functions: HashMap<String, FnSignature>,
    current_return_type: Type,
    errors: Vec<SemanticError>,
}

impl Sema {
    pub fn new() -> Sema {
        Sema::default()
    }

    /// Pre-registers a built-in function signature. Must be called before
    /// `analyze`; user definitions with the same name report
    /// `duplicate definition`.
    pub fn register_builtin(&mut self, sig: FnSignature) {
        self.functions.insert(sig.name.clone(), sig);
    }

    pub fn analyze(&mut self, prog: &Program) {
        self.collect_functions(prog);
        for func in &prog.functions {
            self.check_fn(func);
        }
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }

    /// Looks up a collected signature by name.
    pub fn signature(&self, name: &str) -> Option<&FnSignature> {
        self.functions.get(name)
    }

    // -----------------------------------------------------------------
    // Scope management
    // -----------------------------------------------------------------

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, ty: Type, span: Span) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if self.scopes.last().unwrap().contains_key(name) {
            self.error(
                SemaErrorKind::DuplicateDefinition,
                format!("Variable '{}' already declared in this scope", name),
                span,
            );
            return;
        }
        self.scopes.last_mut().unwrap().insert(name.to_owned(), ty);
    }

    fn lookup(&self, name: &str) -> Option<Type> {
        for scope in self.scopes.iter().rev() {
            if let Some(ty) = scope.get(name) {
                return Some(*ty);
            }
        }
        None
    }

    fn error(&mut self, kind: SemaErrorKind, message: String, span: Span) {
        self.errors.push(SemanticError {
            kind,
            message,
            span,
        });
    }

    // -----------------------------------------------------------------
    // Pass 1: signature collection
    // -----------------------------------------------------------------

    fn collect_functions(&mut self, prog: &Program) {
        for func in &prog.functions {
            let sig = FnSignature {
                name: func.name.clone(),
                param_types: func.params.iter().map(|p| p.ty.ty).collect(),
                // A missing return annotation defaults to void.
                return_type: func.return_ty.map(|t| t.ty).unwrap_or(Type::VOID),
                variadic: false,
            };

            if self.functions.contains_key(&func.name) {
                self.error(
                    SemaErrorKind::DuplicateDefinition,
                    format!("Function '{}' already defined", func.name),
                    func.span,
                );
            } else {
                self.functions.insert(func.name.clone(), sig);
            }
        }
    }

    // -----------------------------------------------------------------
    // Pass 2: body checking
    // -----------------------------------------------------------------

    fn check_fn(&mut self, func: &AstFunction) {
        self.push_scope();

        // An unannotated return type checks as unknown, which disables the
        // return-type check.
        self.current_return_type = func.return_ty.map(|t| t.ty).unwrap_or(Type::UNKNOWN);

        for param in &func.params {
            self.declare(&param.name, param.ty.ty, param.span);
        }

        for stmt in &func.body {
            self.check_stmt(stmt);
        }

        self.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &AstStmt) {
        match stmt {
            AstStmt::Let {
                name,
                ty,
                init,
                span,
            } => {
                let init_type = match init {
                    Some(expr) => self.check_expr(expr),
                    None => Type::UNKNOWN,
                };

                let mut var_type = init_type;
                if let Some(annot) = ty {
                    var_type = annot.ty;
                    if !init_type.is_unknown() && !types_compatible(var_type, init_type) {
                        self.error(
                            SemaErrorKind::TypeMismatch,
                            format!(
                                "Type mismatch: expected {}, got {}",
                                var_type, init_type
                            ),
                            *span,
                        );
                    }
                }

                self.declare(name, var_type, *span);
            }

            AstStmt::Return { value, span } => {
                let ret_type = match value {
                    Some(expr) => self.check_expr(expr),
                    None => Type::VOID,
                };

                if !types_compatible(self.current_return_type, ret_type) {
                    self.error(
                        SemaErrorKind::ReturnTypeMismatch,
                        format!(
                            "Return type mismatch: expected {}, got {}",
                            self.current_return_type, ret_type
                        ),
                        *span,
                    );
                }
            }

            AstStmt::Expr { expr, .. } => {
                if let Some(expr) = expr {
                    self.check_expr(expr);
                }
            }

            AstStmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                if let Some(cond) = cond {
                    self.check_expr(cond);
                }
                self.push_scope();
                for stmt in then_branch {
                    self.check_stmt(stmt);
                }
                self.pop_scope();

                if !else_branch.is_empty() {
                    self.push_scope();
                    for stmt in else_branch {
                        self.check_stmt(stmt);
                    }
                    self.pop_scope();
                }
            }

            AstStmt::While { cond, body, .. } => {
                if let Some(cond) = cond {
                    self.check_expr(cond);
                }
                self.push_scope();
                for stmt in body {
                    self.check_stmt(stmt);
                }
                self.pop_scope();
            }

            AstStmt::Block { stmts, .. } => {
                self.push_scope();
                for stmt in stmts {
                    self.check_stmt(stmt);
                }
                self.pop_scope();
            }
        }
    }

    fn check_expr(&mut self, expr: &AstExpr) -> Type {
        match expr {
            AstExpr::Ident(id) => match self.lookup(&id.name) {
                Some(ty) => ty,
                None => {
                    self.error(
                        SemaErrorKind::UndefinedVariable,
                        format!("Undefined variable: {}", id.name),
                        id.span,
                    );
                    Type::UNKNOWN
                }
            },

            AstExpr::IntLit { .. } => Type::INT,
            AstExpr::FloatLit { .. } => Type::FLOAT,
            // Strings are opaque until the type system grows a string kind.
            AstExpr::StrLit { .. } => Type::UNKNOWN,

            AstExpr::Binary { lhs, rhs, .. } => {
                let left = match lhs {
                    Some(e) => self.check_expr(e),
                    None => Type::UNKNOWN,
                };
                let right = match rhs {
                    Some(e) => self.check_expr(e),
                    None => Type::UNKNOWN,
                };
                binary_result_type(left, right)
            }

            AstExpr::Unary { operand, .. } => match operand {
                Some(e) => self.check_expr(e),
                None => Type::UNKNOWN,
            },

            AstExpr::Call { callee, args, span } => {
                let Some(sig) = self.functions.get(callee).cloned() else {
                    // Arguments are still checked so their own errors
                    // surface.
                    for arg in args {
                        self.check_expr(arg);
                    }
                    self.error(
                        SemaErrorKind::UndefinedFunction,
                        format!("Undefined function: {}", callee),
                        *span,
                    );
                    return Type::UNKNOWN;
                };

                if sig.variadic {
                    for arg in args {
                        self.check_expr(arg);
                    }
                    return sig.return_type;
                }

                if args.len() != sig.param_types.len() {
                    self.error(
                        SemaErrorKind::WrongArgCount,
                        format!(
                            "Function '{}' expects {} arguments, got {}",
                            callee,
                            sig.param_types.len(),
                            args.len()
                        ),
                        *span,
                    );
                }

                for (i, arg) in args.iter().enumerate() {
                    let arg_type = self.check_expr(arg);
                    if let Some(&param_type) = sig.param_types.get(i) {
                        if !types_compatible(param_type, arg_type) {
                            self.error(
                                SemaErrorKind::TypeMismatch,
                                format!("Argument {} type mismatch", i + 1),
                                arg.span(),
                            );
                        }
                    }
                }

                sig.return_type
            }

            AstExpr::Group { inner, .. } => match inner {
                Some(e) => self.check_expr(e),
                None => Type::UNKNOWN,
            },
        }
    }
}
