use crate::ir::value::Value;

/// The closed opcode set of the Zero IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// No-op / placeholder.
    Nop,

    // Constants
    ConstInt,
    ConstFloat,
    ConstStr,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Neg,

    // Comparison (results are int: 1 true, 0 false)
    CmpEq,
    CmpNe,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,

    // Control flow
    Call,
    Ret,
    Br,
    CondBr,

    // Memory (reserved for future stack semantics)
    Alloca,
    Load,
    Store,

    // Tensor operations (forwarded to the external tensor runtime, once
    // one is linked)
    TensorAlloc,
    TensorAdd,
    TensorSub,
    TensorMul,
    TensorMatmul,
    TensorRelu,
}

impl OpCode {
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Nop => "nop",
            OpCode::ConstInt => "const.i64",
            OpCode::ConstFloat => "const.f32",
            OpCode::ConstStr => "const.str",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Neg => "neg",
            OpCode::CmpEq => "cmp.eq",
            OpCode::CmpNe => "cmp.ne",
            OpCode::CmpLt => "cmp.lt",
            OpCode::CmpLe => "cmp.le",
            OpCode::CmpGt => "cmp.gt",
            OpCode::CmpGe => "cmp.ge",
            OpCode::Call => "call",
            OpCode::Ret => "ret",
            OpCode::Br => "br",
            OpCode::CondBr => "cond_br",
            OpCode::Alloca => "alloca",
            OpCode::Load => "load",
            OpCode::Store => "store",
            OpCode::TensorAlloc => "tensor.alloc",
            OpCode::TensorAdd => "tensor.add",
            OpCode::TensorSub => "tensor.sub",
            OpCode::TensorMul => "tensor.mul",
            OpCode::TensorMatmul => "tensor.matmul",
            OpCode::TensorRelu => "tensor.relu",
        }
    }

    /// Terminators end a block; anything after the first one is
    /// unreachable.
    pub fn is_terminator(self) -> bool {
        matches!(self, OpCode::Ret | OpCode::Br | OpCode::CondBr)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for OpCode {
    fn default() -> OpCode {
        OpCode::Nop
    }
}

/// A single IR instruction: an opcode, an optional result (the invalid
/// value when absent), an ordered operand list, and opcode-specific
/// fields.
///
/// Invariants (preserved by the builder, assumed by the interpreter):
/// - every operand is a result defined earlier in the same function;
/// - branch targets name blocks within the same function.
#[derive(Debug, Clone, Default)]
pub struct Instruction {
    pub op: OpCode,
    pub result: Value,
    pub operands: Vec<Value>,

    // Constants
    pub imm_int: i64,
    pub imm_float: f64,
    pub imm_str: String,

    // Calls
    pub callee: String,

    // Branches
    pub target_block: u32,
    pub else_block: u32,
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        self.op.is_terminator()
    }
}
