//! Incremental construction of IR functions.
//!
//! The builder owns the function being built and maintains a current
//! insertion block; every `emit` appends to that block. `build()` hands
//! the finished function back for registration in a `Module`.

use crate::ir::function::Function;
use crate::ir::instr::{Instruction, OpCode};
use crate::ir::value::Value;
use crate::types::{binary_result_type, Type};

pub struct IrBuilder {
    func: Function,
    current_block: u32,
}

impl IrBuilder {
    /// Creates a builder for a new function. The entry block is created
    /// immediately and becomes the insertion point.
    pub fn new(
        name: impl Into<String>,
        param_types: Vec<Type>,
        return_type: Type,
    ) -> IrBuilder {
        let mut func = Function::new(name, param_types, return_type);
        let entry = func.new_block("entry");
        IrBuilder {
            func,
            current_block: entry,
        }
    }

    // -----------------------------------------------------------------
    // Block management
    // -----------------------------------------------------------------

    pub fn create_block(&mut self, label: &str) -> u32 {
        self.func.new_block(label)
    }

    pub fn set_insert_point(&mut self, block: u32) {
        self.current_block = block;
    }

    pub fn current_block(&self) -> u32 {
        self.current_block
    }

    /// True when the current block already ends in `ret`/`br`/`cond_br`.
    pub fn is_terminated(&self) -> bool {
        self.func
            .block(self.current_block)
            .map_or(false, |b| b.is_terminated())
    }

    /// Allocates a fresh SSA value without emitting an instruction.
    pub fn new_value(&mut self, ty: Type) -> Value {
        self.func.new_value(ty)
    }

    fn emit(&mut self, instr: Instruction) {
        self.func
            .block_mut(self.current_block)
            .expect("IrBuilder: current block does not exist")
            .add(instr);
    }

    // -----------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------

    pub fn const_int(&mut self, value: i64) -> Value {
        let result = self.func.new_value(Type::INT);
        self.emit(Instruction {
            op: OpCode::ConstInt,
            result,
            imm_int: value,
            ..Instruction::default()
        });
        result
    }

    pub fn const_float(&mut self, value: f64) -> Value {
        let result = self.func.new_value(Type::FLOAT);
        self.emit(Instruction {
            op: OpCode::ConstFloat,
            result,
            imm_float: value,
            ..Instruction::default()
        });
        result
    }

    /// String constants are `unknown`-typed until the type system grows a
    /// string kind.
    pub fn const_str(&mut self, value: impl Into<String>) -> Value {
        let result = self.func.new_value(Type::UNKNOWN);
        self.emit(Instruction {
            op: OpCode::ConstStr,
            result,
            imm_str: value.into(),
            ..Instruction::default()
        });
        result
    }

    // -----------------------------------------------------------------
    // Arithmetic
    // -----------------------------------------------------------------

    pub fn add(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary_op(OpCode::Add, lhs, rhs)
    }

    pub fn sub(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary_op(OpCode::Sub, lhs, rhs)
    }

    pub fn mul(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary_op(OpCode::Mul, lhs, rhs)
    }

    pub fn div(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary_op(OpCode::Div, lhs, rhs)
    }

    pub fn neg(&mut self, operand: Value) -> Value {
        let result = self.func.new_value(operand.ty);
        self.emit(Instruction {
            op: OpCode::Neg,
            result,
            operands: vec![operand],
            ..Instruction::default()
        });
        result
    }

    fn binary_op(&mut self, op: OpCode, lhs: Value, rhs: Value) -> Value {
        let result = self.func.new_value(binary_result_type(lhs.ty, rhs.ty));
        self.emit(Instruction {
            op,
            result,
            operands: vec![lhs, rhs],
            ..Instruction::default()
        });
        result
    }

    // -----------------------------------------------------------------
    // Comparison
    // -----------------------------------------------------------------

    pub fn cmp_eq(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpEq, lhs, rhs)
    }

    pub fn cmp_ne(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpNe, lhs, rhs)
    }

    pub fn cmp_lt(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpLt, lhs, rhs)
    }

    pub fn cmp_le(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpLe, lhs, rhs)
    }

    pub fn cmp_gt(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpGt, lhs, rhs)
    }

    pub fn cmp_ge(&mut self, lhs: Value, rhs: Value) -> Value {
        self.cmp(OpCode::CmpGe, lhs, rhs)
    }

    fn cmp(&mut self, op: OpCode, lhs: Value, rhs: Value) -> Value {
        // Comparisons yield int: 1 for true, 0 for false.
        let result = self.func.new_value(Type::INT);
        self.emit(Instruction {
            op,
            result,
            operands: vec![lhs, rhs],
            ..Instruction::default()
        });
        result
    }

    // -----------------------------------------------------------------
    // Control flow
    // -----------------------------------------------------------------

    pub fn ret(&mut self) {
        self.emit(Instruction {
            op: OpCode::Ret,
            ..Instruction::default()
        });
    }

    pub fn ret_value(&mut self, value: Value) {
        self.emit(Instruction {
            op: OpCode::Ret,
            operands: vec![value],
            ..Instruction::default()
        });
    }

    pub fn br(&mut self, target: u32) {
        self.emit(Instruction {
            op: OpCode::Br,
            target_block: target,
            ..Instruction::default()
        });
    }

    pub fn cond_br(&mut self, cond: Value, then_block: u32, else_block: u32) {
        self.emit(Instruction {
            op: OpCode::CondBr,
            operands: vec![cond],
            target_block: then_block,
            else_block,
            ..Instruction::default()
        });
    }

    /// Emits a call. A result value is allocated only for non-void return
    /// types; void calls yield the invalid value.
    pub fn call(&mut self, callee: impl Into<String>, args: Vec<Value>, ret_type: Type) -> Value {
        let result = if ret_type.is_void() {
            Value::INVALID
        } else {
            self.func.new_value(ret_type)
        };
        self.emit(Instruction {
            op: OpCode::Call,
            result,
            operands: args,
            callee: callee.into(),
            ..Instruction::default()
        });
        result
    }

    // -----------------------------------------------------------------
    // Memory (reserved contract: alloca -> 0, load -> operand, store no-op)
    // -----------------------------------------------------------------

    pub fn alloca(&mut self, ty: Type) -> Value {
        let result = self.func.new_value(ty);
        self.emit(Instruction {
            op: OpCode::Alloca,
            result,
            ..Instruction::default()
        });
        result
    }

    pub fn load(&mut self, ptr: Value) -> Value {
        let result = self.func.new_value(ptr.ty);
        self.emit(Instruction {
            op: OpCode::Load,
            result,
            operands: vec![ptr],
            ..Instruction::default()
        });
        result
    }

    pub fn store(&mut self, ptr: Value, value: Value) {
        self.emit(Instruction {
            op: OpCode::Store,
            operands: vec![ptr, value],
            ..Instruction::default()
        });
    }

    // -----------------------------------------------------------------
    // Tensor operations
    // -----------------------------------------------------------------

    /// Emits one of the `tensor.*` opcodes. The result is tensor-typed;
    /// execution forwards to the external tensor runtime once one exists.
    pub fn tensor_op(&mut self, op: OpCode, inputs: Vec<Value>) -> Value {
        debug_assert!(
            matches!(
                op,
                OpCode::TensorAlloc
                    | OpCode::TensorAdd
                    | OpCode::TensorSub
                    | OpCode::TensorMul
                    | OpCode::TensorMatmul
                    | OpCode::TensorRelu
            ),
            "tensor_op called with non-tensor opcode {:?}",
            op
        );
        let result = self.func.new_value(Type::TENSOR);
        self.emit(Instruction {
            op,
            result,
            operands: inputs,
            ..Instruction::default()
        });
        result
    }

    // -----------------------------------------------------------------
    // Finishing
    // -----------------------------------------------------------------

    /// Read access to the function under construction.
    pub fn function(&self) -> &Function {
        &self.func
    }

    /// Consumes the builder and returns the finished function.
    pub fn build(self) -> Function {
        self.func
    }
}
