//! φ-nodes and π-nodes.
//!
//! φ-nodes merge a value at a control flow join: the result takes the
//! operand belonging to whichever predecessor edge control arrived along.
//! π-nodes are the dual artifact on branch edges: a refined copy of a
//! value that is only valid along one incoming edge, which is how the
//! null-pointer solver keeps branch-sensitive facts apart.

use std::fmt;

use crate::cfg::BlockId;
use crate::ir::ValueNum;

/// One incoming value of a φ-node, tagged with the predecessor block it
/// flows in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhiOperand {
    value: ValueNum,
    predecessor: BlockId,
}

impl PhiOperand {
    /// Creates a φ operand.
    #[must_use]
    pub const fn new(value: ValueNum, predecessor: BlockId) -> Self {
        Self { value, predecessor }
    }

    /// Returns the incoming value.
    #[must_use]
    pub const fn value(&self) -> ValueNum {
        self.value
    }

    /// Returns the predecessor block this operand flows in from.
    #[must_use]
    pub const fn predecessor(&self) -> BlockId {
        self.predecessor
    }
}

/// A φ-node at the head of a basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiNode {
    result: ValueNum,
    operands: Vec<PhiOperand>,
}

impl PhiNode {
    /// Creates a φ-node defining `result` from the given operands.
    #[must_use]
    pub fn new(result: ValueNum, operands: Vec<PhiOperand>) -> Self {
        Self { result, operands }
    }

    /// Returns the merged value this node defines.
    #[must_use]
    pub const fn result(&self) -> ValueNum {
        self.result
    }

    /// Returns the incoming operands.
    #[must_use]
    pub fn operands(&self) -> &[PhiOperand] {
        &self.operands
    }

    /// Returns the operand flowing in from `predecessor`, if any.
    #[must_use]
    pub fn operand_from(&self, predecessor: BlockId) -> Option<&PhiOperand> {
        self.operands.iter().find(|op| op.predecessor == predecessor)
    }
}

impl fmt::Display for PhiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = phi(", self.result)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", op.predecessor, op.value)?;
        }
        write!(f, ")")
    }
}

/// A π-node: an edge-scoped refined copy of a value.
///
/// `result` is a fresh name for `source` that is only valid when control
/// enters the enclosing block from `predecessor`. The solver assigns it
/// the refined state `source` has on that particular edge, so uses of the
/// π result downstream see the branch-sensitive fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiNode {
    result: ValueNum,
    source: ValueNum,
    predecessor: BlockId,
}

impl PiNode {
    /// Creates a π-node refining `source` along the edge from
    /// `predecessor`.
    #[must_use]
    pub const fn new(result: ValueNum, source: ValueNum, predecessor: BlockId) -> Self {
        Self {
            result,
            source,
            predecessor,
        }
    }

    /// Returns the refined value this node defines.
    #[must_use]
    pub const fn result(&self) -> ValueNum {
        self.result
    }

    /// Returns the value being refined.
    #[must_use]
    pub const fn source(&self) -> ValueNum {
        self.source
    }

    /// Returns the predecessor block whose edge this refinement is scoped
    /// to.
    #[must_use]
    pub const fn predecessor(&self) -> BlockId {
        self.predecessor
    }
}

impl fmt::Display for PiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = pi({} from {})",
            self.result, self.source, self.predecessor
        )
    }
}
