//! Tree-walking IR interpreter.
//!
//! Executes a module starting at an entry function (default `"main"`).
//! Each call gets its own frame with a private SSA value table; call
//! arguments are bound positionally to the callee's parameter value ids on
//! entry. Calls resolve through the externals registry first, then the
//! module.
//!
//! Registration discipline: externals are registered before `execute` and
//! never during it. The only fatal failure modes are a missing entry
//! function and an error returned by an external; every numeric edge case
//! is contained.

use std::collections::HashMap;

use crate::error::InterpError;
use crate::ir::function::Function;
use crate::ir::instr::{Instruction, OpCode};
use crate::ir::module::Module;
use crate::ir::value::Value;

/// A runtime value produced or consumed during interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    /// Unit/void: the value of side-effecting calls and bare returns.
    Unit,
    Int(i64),
    Float(f64),
    /// A pointer-sized handle. Tensor opcodes currently produce the null
    /// pointer; a future implementation forwards them to the external
    /// tensor runtime.
    Ptr(usize),
    Str(String),
}

impl Default for RuntimeValue {
    fn default() -> RuntimeValue {
        RuntimeValue::Unit
    }
}

impl RuntimeValue {
    pub fn is_unit(&self) -> bool {
        matches!(self, RuntimeValue::Unit)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, RuntimeValue::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, RuntimeValue::Float(_))
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, RuntimeValue::Ptr(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, RuntimeValue::Str(_))
    }

    /// Integer coercion: floats truncate, anything else reads as 0.
    pub fn to_int(&self) -> i64 {
        match self {
            RuntimeValue::Int(n) => *n,
            RuntimeValue::Float(x) => *x as i64,
            _ => 0,
        }
    }

    /// Float coercion: ints widen, anything else reads as 0.0.
    pub fn to_float(&self) -> f64 {
        match self {
            RuntimeValue::Float(x) => *x,
            RuntimeValue::Int(n) => *n as f64,
            _ => 0.0,
        }
    }
}

impl std::fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeValue::Unit => f.write_str("()"),
            RuntimeValue::Int(n) => write!(f, "{}", n),
            RuntimeValue::Float(x) => write!(f, "{}", x),
            RuntimeValue::Ptr(0) => f.write_str("null"),
            RuntimeValue::Ptr(p) => write!(f, "ptr({:#x})", p),
            RuntimeValue::Str(s) => f.write_str(s),
        }
    }
}

/// An external (host) function resolved by name in the registry.
pub type ExternalFn = Box<dyn Fn(&[RuntimeValue]) -> Result<RuntimeValue, InterpError>>;

/// One call's execution state: the block/instruction cursor plus the
/// frame-local SSA value table.
struct Frame {
    values: HashMap<u32, RuntimeValue>,
    block_idx: usize,
    instr_idx: usize,
}

impl Frame {
    fn new() -> Frame {
        Frame {
            values: HashMap::new(),
            block_idx: 0,
            instr_idx: 0,
        }
    }

    fn get(&self, v: Value) -> RuntimeValue {
        self.values.get(&v.id).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct Interpreter {
    externals: HashMap<String, ExternalFn>,
    exit_code: i32,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::default()
    }

    /// Registers an external function. Call before `execute`; concurrent
    /// registration during execution is not supported.
    pub fn register_external(&mut self, name: impl Into<String>, f: ExternalFn) {
        self.externals.insert(name.into(), f);
    }

    /// Exit code derived from the entry function's return value: the low
    /// 32 bits of an int result, otherwise 0.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Executes `module` starting at `entry` with no arguments.
    pub fn execute(&mut self, module: &Module, entry: &str) -> Result<RuntimeValue, InterpError> {
        let func = module
            .get_function(entry)
            .ok_or_else(|| InterpError::EntryNotFound {
                name: entry.to_owned(),
            })?;

        let result = self.call_function(module, func, Vec::new())?;

        self.exit_code = match result {
            RuntimeValue::Int(n) => n as i32,
            _ => 0,
        };

        Ok(result)
    }

    fn call_function(
        &self,
        module: &Module,
        func: &Function,
        args: Vec<RuntimeValue>,
    ) -> Result<RuntimeValue, InterpError> {
        let mut frame = Frame::new();

        // Bind arguments positionally: argument i to parameter value id
        // i + 1 (lowering guarantees parameters occupy ids 1..=n).
        for (i, arg) in args
            .into_iter()
            .take(func.param_types.len())
            .enumerate()
        {
            frame.values.insert(i as u32 + 1, arg);
        }

        loop {
            let Some(block) = func.blocks.get(frame.block_idx) else {
                return Ok(RuntimeValue::Unit);
            };

            let mut branched = false;

            while frame.instr_idx < block.instrs.len() {
                let instr = &block.instrs[frame.instr_idx];

                match instr.op {
                    OpCode::Ret => {
                        return Ok(instr
                            .operands
                            .first()
                            .map(|v| frame.get(*v))
                            .unwrap_or(RuntimeValue::Unit));
                    }
                    OpCode::Br => {
                        frame.block_idx = instr.target_block as usize;
                        frame.instr_idx = 0;
                        branched = true;
                        break;
                    }
                    OpCode::CondBr => {
                        let cond = instr
                            .operands
                            .first()
                            .map(|v| frame.get(*v))
                            .unwrap_or_default();
                        frame.block_idx = if cond.to_int() != 0 {
                            instr.target_block as usize
                        } else {
                            instr.else_block as usize
                        };
                        frame.instr_idx = 0;
                        branched = true;
                        break;
                    }
                    _ => {
                        let result = self.exec_instruction(module, &frame, instr)?;
                        if instr.result.is_valid() {
                            frame.values.insert(instr.result.id, result);
                        }
                        frame.instr_idx += 1;
                    }
                }
            }

            if branched {
                continue;
            }

            // Ran off the end of a block with no terminator (well-formed
            // modules never do): fall through to the next block by index.
            if frame.block_idx + 1 < func.blocks.len() {
                frame.block_idx += 1;
                frame.instr_idx = 0;
            } else {
                return Ok(RuntimeValue::Unit);
            }
        }
    }

    fn exec_instruction(
        &self,
        module: &Module,
        frame: &Frame,
        instr: &Instruction,
    ) -> Result<RuntimeValue, InterpError> {
        let result = match instr.op {
            OpCode::Nop => RuntimeValue::Unit,

            OpCode::ConstInt => RuntimeValue::Int(instr.imm_int),
            OpCode::ConstFloat => RuntimeValue::Float(instr.imm_float),
            OpCode::ConstStr => RuntimeValue::Str(instr.imm_str.clone()),

            OpCode::Add => {
                let (lhs, rhs) = self.binary_operands(frame, instr);
                if lhs.is_float() || rhs.is_float() {
                    RuntimeValue::Float(lhs.to_float() + rhs.to_float())
                } else {
                    RuntimeValue::Int(lhs.to_int().wrapping_add(rhs.to_int()))
                }
            }
            OpCode::Sub => {
                let (lhs, rhs) = self.binary_operands(frame, instr);
                if lhs.is_float() || rhs.is_float() {
                    RuntimeValue::Float(lhs.to_float() - rhs.to_float())
                } else {
                    RuntimeValue::Int(lhs.to_int().wrapping_sub(rhs.to_int()))
                }
            }
            OpCode::Mul => {
                let (lhs, rhs) = self.binary_operands(frame, instr);
                if lhs.is_float() || rhs.is_float() {
                    RuntimeValue::Float(lhs.to_float() * rhs.to_float())
                } else {
                    RuntimeValue::Int(lhs.to_int().wrapping_mul(rhs.to_int()))
                }
            }
            OpCode::Div => {
                let (lhs, rhs) = self.binary_operands(frame, instr);
                if lhs.is_float() || rhs.is_float() {
                    // IEEE-754 defaults: division by zero yields inf/NaN.
                    RuntimeValue::Float(lhs.to_float() / rhs.to_float())
                } else {
                    // Integer division by zero yields 0. Documented, not
                    // undefined.
                    let divisor = rhs.to_int();
                    if divisor != 0 {
                        RuntimeValue::Int(lhs.to_int().wrapping_div(divisor))
                    } else {
                        RuntimeValue::Int(0)
                    }
                }
            }

            OpCode::Neg => {
                let operand = instr
                    .operands
                    .first()
                    .map(|v| frame.get(*v))
                    .unwrap_or_default();
                if operand.is_float() {
                    RuntimeValue::Float(-operand.to_float())
                } else {
                    RuntimeValue::Int(operand.to_int().wrapping_neg())
                }
            }

            // Comparisons coerce both sides to int and yield 1 or 0.
            OpCode::CmpEq => self.compare(frame, instr, |a, b| a == b),
            OpCode::CmpNe => self.compare(frame, instr, |a, b| a != b),
            OpCode::CmpLt => self.compare(frame, instr, |a, b| a < b),
            OpCode::CmpLe => self.compare(frame, instr, |a, b| a <= b),
            OpCode::CmpGt => self.compare(frame, instr, |a, b| a > b),
            OpCode::CmpGe => self.compare(frame, instr, |a, b| a >= b),

            OpCode::Call => {
                let args: Vec<RuntimeValue> =
                    instr.operands.iter().map(|v| frame.get(*v)).collect();

                if let Some(external) = self.externals.get(&instr.callee) {
                    external(&args)?
                } else if let Some(callee) = module.get_function(&instr.callee) {
                    self.call_function(module, callee, args)?
                } else {
                    // Unresolved names are not fatal.
                    RuntimeValue::Unit
                }
            }

            // Reserved stack semantics.
            OpCode::Alloca => RuntimeValue::Int(0),
            OpCode::Load => instr
                .operands
                .first()
                .map(|v| frame.get(*v))
                .unwrap_or_default(),
            OpCode::Store => RuntimeValue::Unit,

            // Reserved: forwarded to the external tensor runtime once one
            // is linked.
            OpCode::TensorAlloc
            | OpCode::TensorAdd
            | OpCode::TensorSub
            | OpCode::TensorMul
            | OpCode::TensorMatmul
            | OpCode::TensorRelu => RuntimeValue::Ptr(0),

            // Terminators are handled by the block loop.
            OpCode::Ret | OpCode::Br | OpCode::CondBr => RuntimeValue::Unit,
        };

        Ok(result)
    }

    fn binary_operands(&self, frame: &Frame, instr: &Instruction) -> (RuntimeValue, RuntimeValue) {
        let lhs = instr
            .operands
            .first()
            .map(|v| frame.get(*v))
            .unwrap_or_default();
        let rhs = instr
            .operands
            .get(1)
            .map(|v| frame.get(*v))
            .unwrap_or_default();
        (lhs, rhs)
    }

    fn compare(
        &self,
        frame: &Frame,
        instr: &Instruction,
        op: impl Fn(i64, i64) -> bool,
    ) -> RuntimeValue {
        let (lhs, rhs) = self.binary_operands(frame, instr);
        RuntimeValue::Int(op(lhs.to_int(), rhs.to_int()) as i64)
    }
}
