//! AST → IR lowering.
//!
//! Walks the typed AST and drives an [`IrBuilder`] per function. Variable
//! bindings live in a per-function symbol table mapping each name to the
//! SSA value most recently bound to it: direct SSA with no
//! `alloca`/`load`/`store` for locals and no phi placement at control-flow
//! joins (a rebinding inside one branch is visible after the join only
//! through the table's last write).
//!
//! Lowering assumes semantic analysis already ran; it is defensive against
//! missing child nodes from parser recovery but never fails.

use std::collections::HashMap;

use crate::ir::builder::IrBuilder;
use crate::ir::module::Module;
use crate::ir::value::Value;
use crate::parser::ast::{AstBinOp, AstExpr, AstFunction, AstStmt, AstUnaryOp, Program};
use crate::types::Type;

/// Lowers a whole program to an IR module.
pub fn lower(prog: &Program) -> Module {
    let mut module = Module::new();

    // Pre-collect return types so call sites get concrete result types.
    // Names missing from this map (externals) lower as void; the
    // interpreter resolves them through its registry.
    let fn_sigs: HashMap<String, Type> = prog
        .functions
        .iter()
        .map(|f| {
            let ret = f.return_ty.map(|t| t.ty).unwrap_or(Type::VOID);
            (f.name.clone(), ret)
        })
        .collect();

    for func in &prog.functions {
        module.push_function(lower_function(func, &fn_sigs));
    }

    module
}

fn lower_function(
    func: &AstFunction,
    fn_sigs: &HashMap<String, Type>,
) -> crate::ir::function::Function {
    let param_types: Vec<Type> = func.params.iter().map(|p| p.ty.ty).collect();
    let ret_type = func.return_ty.map(|t| t.ty).unwrap_or(Type::VOID);

    let builder = IrBuilder::new(&func.name, param_types.clone(), ret_type);
    let mut lowerer = Lowerer {
        builder,
        symbols: HashMap::new(),
        fn_sigs,
    };

    // Parameter values are allocated before any instruction, so they
    // occupy ids 1..=n in declaration order. The interpreter binds call
    // arguments to exactly these ids.
    for (param, ty) in func.params.iter().zip(param_types) {
        let value = lowerer.builder.new_value(ty);
        lowerer.symbols.insert(param.name.clone(), value);
    }

    for stmt in &func.body {
        lowerer.lower_stmt(stmt);
    }

    lowerer.seal_unterminated_blocks();
    lowerer.builder.build()
}

struct Lowerer<'a> {
    builder: IrBuilder,
    /// name → SSA value most recently bound to that name. Function-global:
    /// block statements introduce no scope at lowering time.
    symbols: HashMap<String, Value>,
    fn_sigs: &'a HashMap<String, Type>,
}

impl<'a> Lowerer<'a> {
    fn lower_stmt(&mut self, stmt: &AstStmt) {
        match stmt {
            AstStmt::Let { name, init, .. } => {
                if let Some(init) = init {
                    let value = self.lower_expr(init);
                    self.symbols.insert(name.clone(), value);
                }
            }

            AstStmt::Return { value, .. } => match value {
                Some(expr) => {
                    let v = self.lower_expr(expr);
                    self.builder.ret_value(v);
                }
                None => self.builder.ret(),
            },

            AstStmt::Expr { expr, .. } => {
                if let Some(expr) = expr {
                    self.lower_expr(expr);
                }
            }

            AstStmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => self.lower_if(cond.as_deref(), then_branch, else_branch),

            AstStmt::While { cond, body, .. } => self.lower_while(cond.as_deref(), body),

            AstStmt::Block { stmts, .. } => {
                for stmt in stmts {
                    self.lower_stmt(stmt);
                }
            }
        }
    }

    fn lower_if(&mut self, cond: Option<&AstExpr>, then_branch: &[AstStmt], else_branch: &[AstStmt]) {
        let cond_val = cond.map(|e| self.lower_expr(e)).unwrap_or(Value::INVALID);

        let then_bb = self.builder.create_block("if.then");
        let else_bb = if else_branch.is_empty() {
            None
        } else {
            Some(self.builder.create_block("if.else"))
        };
        let end_bb = self.builder.create_block("if.end");

        self.builder.cond_br(cond_val, then_bb, else_bb.unwrap_or(end_bb));

        self.builder.set_insert_point(then_bb);
        for stmt in then_branch {
            self.lower_stmt(stmt);
        }
        // Only a branch that falls off its last statement needs the jump
        // to the merge block.
        if !self.builder.is_terminated() {
            self.builder.br(end_bb);
        }

        if let Some(else_bb) = else_bb {
            self.builder.set_insert_point(else_bb);
            for stmt in else_branch {
                self.lower_stmt(stmt);
            }
            if !self.builder.is_terminated() {
                self.builder.br(end_bb);
            }
        }

        self.builder.set_insert_point(end_bb);
    }

    fn lower_while(&mut self, cond: Option<&AstExpr>, body: &[AstStmt]) {
        let cond_bb = self.builder.create_block("while.cond");
        let body_bb = self.builder.create_block("while.body");
        let end_bb = self.builder.create_block("while.end");

        self.builder.br(cond_bb);

        self.builder.set_insert_point(cond_bb);
        let cond_val = cond.map(|e| self.lower_expr(e)).unwrap_or(Value::INVALID);
        self.builder.cond_br(cond_val, body_bb, end_bb);

        self.builder.set_insert_point(body_bb);
        for stmt in body {
            self.lower_stmt(stmt);
        }
        if !self.builder.is_terminated() {
            self.builder.br(cond_bb);
        }

        self.builder.set_insert_point(end_bb);
    }

    fn lower_expr(&mut self, expr: &AstExpr) -> Value {
        match expr {
            AstExpr::Ident(id) => {
                // Unresolved names cannot occur after clean semantic
                // analysis; the invalid sentinel keeps recovery runs
                // defensive.
                self.symbols.get(&id.name).copied().unwrap_or(Value::INVALID)
            }

            AstExpr::IntLit { value, .. } => self.builder.const_int(*value),
            AstExpr::FloatLit { value, .. } => self.builder.const_float(*value),
            AstExpr::StrLit { value, .. } => self.builder.const_str(value.clone()),

            AstExpr::Binary { op, lhs, rhs, .. } => {
                let l = match lhs {
                    Some(e) => self.lower_expr(e),
                    None => Value::INVALID,
                };
                let r = match rhs {
                    Some(e) => self.lower_expr(e),
                    None => Value::INVALID,
                };
                match op {
                    AstBinOp::Add => self.builder.add(l, r),
                    AstBinOp::Sub => self.builder.sub(l, r),
                    AstBinOp::Mul => self.builder.mul(l, r),
                    AstBinOp::Div => self.builder.div(l, r),
                    AstBinOp::Eq => self.builder.cmp_eq(l, r),
                    AstBinOp::Ne => self.builder.cmp_ne(l, r),
                    AstBinOp::Lt => self.builder.cmp_lt(l, r),
                    AstBinOp::Le => self.builder.cmp_le(l, r),
                    AstBinOp::Gt => self.builder.cmp_gt(l, r),
                    AstBinOp::Ge => self.builder.cmp_ge(l, r),
                }
            }

            AstExpr::Unary { op, operand, .. } => {
                let v = match operand {
                    Some(e) => self.lower_expr(e),
                    None => Value::INVALID,
                };
                match op {
                    AstUnaryOp::Neg => self.builder.neg(v),
                    // There is no `not` opcode yet; `!x` passes its
                    // operand through.
                    AstUnaryOp::Not => v,
                }
            }

            AstExpr::Call { callee, args, .. } => {
                // Arguments are lowered left-to-right.
                let arg_vals: Vec<Value> = args.iter().map(|a| self.lower_expr(a)).collect();
                let ret_type = self.fn_sigs.get(callee).copied().unwrap_or(Type::VOID);
                self.builder.call(callee.clone(), arg_vals, ret_type)
            }

            AstExpr::Group { inner, .. } => match inner {
                Some(e) => self.lower_expr(e),
                None => Value::INVALID,
            },
        }
    }

    /// Terminates every block that still lacks a terminator with a bare
    /// `ret`, preserving the "every block terminates" invariant. Covers
    /// both the function's final block and empty merge blocks left behind
    /// when every path through a branch returned.
    fn seal_unterminated_blocks(&mut self) {
        let unsealed: Vec<u32> = self
            .builder
            .function()
            .blocks
            .iter()
            .filter(|b| !b.is_terminated())
            .map(|b| b.id)
            .collect();
        for id in unsealed {
            self.builder.set_insert_point(id);
            self.builder.ret();
        }
    }
}
