//! Basic blocks of the SSA IR.

use crate::cfg::BlockId;
use crate::ir::{IrOp, PhiNode, PiNode};

/// A basic block: φ-nodes, then π-nodes, then straight-line instructions.
///
/// Blocks align 1:1 with the blocks of the method's control flow graph and
/// share its [`BlockId`] numbering.
#[derive(Debug, Clone)]
pub struct IrBlock {
    id: BlockId,
    phis: Vec<PhiNode>,
    pis: Vec<PiNode>,
    instructions: Vec<IrOp>,
}

impl IrBlock {
    /// Creates an empty block with the given id.
    #[must_use]
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            phis: Vec::new(),
            pis: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Returns the block id.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the φ-nodes at the head of this block.
    #[must_use]
    pub fn phis(&self) -> &[PhiNode] {
        &self.phis
    }

    /// Returns the π-nodes of this block.
    #[must_use]
    pub fn pis(&self) -> &[PiNode] {
        &self.pis
    }

    /// Returns the instructions of this block.
    #[must_use]
    pub fn instructions(&self) -> &[IrOp] {
        &self.instructions
    }

    /// Appends a φ-node.
    pub fn add_phi(&mut self, phi: PhiNode) {
        self.phis.push(phi);
    }

    /// Appends a π-node.
    pub fn add_pi(&mut self, pi: PiNode) {
        self.pis.push(pi);
    }

    /// Appends an instruction.
    pub fn push(&mut self, op: IrOp) {
        self.instructions.push(op);
    }

    /// Returns the last instruction, if any.
    #[must_use]
    pub fn last_instruction(&self) -> Option<&IrOp> {
        self.instructions.last()
    }

    /// Returns the instruction responsible for this block's exceptional
    /// successors: the last instruction that may throw.
    ///
    /// Front ends place at most one throwing instruction per block; when a
    /// block nevertheless carries several, the last one is the relevant
    /// one, because the earlier ones' exceptional exits would have left
    /// the block before reaching it.
    #[must_use]
    pub fn throwing_instruction(&self) -> Option<&IrOp> {
        self.instructions.iter().rev().find(|op| op.may_throw())
    }

    /// Returns `true` if the block holds no φ-nodes, π-nodes, or
    /// instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phis.is_empty() && self.pis.is_empty() && self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ExceptionSet, FieldId, ValueNum};

    #[test]
    fn throwing_instruction_picks_the_last() {
        let mut block = IrBlock::new(BlockId::new(0));
        block.push(IrOp::Compute {
            dest: ValueNum::new(2),
            operands: vec![ValueNum::new(1)],
        });
        block.push(IrOp::GetField {
            dest: ValueNum::new(3),
            object: ValueNum::new(1),
            field: FieldId::new(0),
            exceptions: ExceptionSet::NULL_POINTER,
        });
        block.push(IrOp::Goto);

        let relevant = block.throwing_instruction().unwrap();
        assert!(matches!(relevant, IrOp::GetField { .. }));
    }

    #[test]
    fn block_without_throwing_instruction() {
        let mut block = IrBlock::new(BlockId::new(1));
        block.push(IrOp::Return { value: None });
        assert!(block.throwing_instruction().is_none());
        assert!(!block.is_empty());
    }

    #[test]
    fn empty_block() {
        let block = IrBlock::new(BlockId::new(2));
        assert!(block.is_empty());
        assert!(block.last_instruction().is_none());
    }
}
