use crate::ir::instr::Instruction;

/// A basic block: a dense 0-based id within its function, a label, and an
/// ordered instruction sequence.
///
/// A well-formed block ends at its first terminator; the lowering
/// algorithm guarantees one is present before execution.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub id: u32,
    pub label: String,
    pub instrs: Vec<Instruction>,
}

impl BasicBlock {
    pub fn add(&mut self, instr: Instruction) {
        self.instrs.push(instr);
    }

    /// The block's terminator, if it has one as its last instruction.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instrs.last().filter(|i| i.is_terminator())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }
}
