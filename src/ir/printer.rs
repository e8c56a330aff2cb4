//! IR pretty-printer.
//!
//! Emits the stable textual form inspected by tests and `--dump-ir`.
//! Output is deterministic: functions in module order, blocks in id order,
//! instructions in program order. Functions are separated by blank lines.

use std::fmt::Write;

use crate::ir::block::BasicBlock;
use crate::ir::function::Function;
use crate::ir::instr::{Instruction, OpCode};
use crate::ir::module::Module;
use crate::ir::value::Value;

pub fn print_value(v: Value) -> String {
    v.to_string()
}

pub fn print_instruction(instr: &Instruction) -> String {
    let mut out = String::new();

    if instr.result.is_valid() {
        let _ = write!(out, "{} = ", instr.result);
    }

    out.push_str(instr.op.name());

    match instr.op {
        OpCode::ConstInt => {
            let _ = write!(out, " {}", instr.imm_int);
        }
        OpCode::ConstFloat => {
            let _ = write!(out, " {}", instr.imm_float);
        }
        OpCode::ConstStr => {
            let _ = write!(out, " {:?}", instr.imm_str);
        }
        OpCode::Call => {
            let _ = write!(out, " @{}(", instr.callee);
            for (i, operand) in instr.operands.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", operand);
            }
            out.push(')');
        }
        OpCode::Br => {
            let _ = write!(out, " bb{}", instr.target_block);
        }
        OpCode::CondBr => {
            let cond = instr.operands.first().copied().unwrap_or(Value::INVALID);
            let _ = write!(
                out,
                " {}, bb{}, bb{}",
                cond, instr.target_block, instr.else_block
            );
        }
        _ => {
            for (i, operand) in instr.operands.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, " {}", operand);
            }
        }
    }

    out
}

pub fn print_block(bb: &BasicBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", bb.label);
    for instr in &bb.instrs {
        let _ = writeln!(out, "  {}", print_instruction(instr));
    }
    out
}

pub fn print_function(func: &Function) -> String {
    let mut out = String::new();
    let _ = write!(out, "fn @{}(", func.name);
    for (i, ty) in func.param_types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(ty.name());
    }
    let _ = writeln!(out, ") -> {} {{", func.return_type);

    for bb in &func.blocks {
        out.push_str(&print_block(bb));
    }

    out.push_str("}\n");
    out
}

pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    for func in &module.functions {
        out.push_str(&print_function(func));
        out.push('\n');
    }
    out
}
