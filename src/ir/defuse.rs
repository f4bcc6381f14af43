//! Def-use index for SSA values.
//!
//! Built once per function, the index answers the two questions the
//! context selector asks repeatedly: what defines a value (for the
//! backward dependency trace) and where a value is used (for the
//! property-use classification). Parameters and interned constants have
//! no defining node; their definition site is the method entry.

use rustc_hash::FxHashMap;

use crate::cfg::BlockId;
use crate::ir::{IrFunction, IrOp, ValueNum};

/// Where a value is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefSite {
    /// Defined by the instruction at `(block, index)`.
    Instruction {
        /// The enclosing block.
        block: BlockId,
        /// Index into the block's instruction list.
        index: usize,
    },
    /// Defined by the φ-node at `(block, index)`.
    Phi {
        /// The enclosing block.
        block: BlockId,
        /// Index into the block's φ list.
        index: usize,
    },
    /// Defined by the π-node at `(block, index)`.
    Pi {
        /// The enclosing block.
        block: BlockId,
        /// Index into the block's π list.
        index: usize,
    },
    /// A parameter or interned constant; no defining node exists.
    Entry,
}

/// What role a value plays at a use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    /// Operand of an ordinary instruction.
    Instruction,
    /// Operand of a φ-node.
    PhiOperand,
    /// Source of a π-node.
    PiSource,
}

/// One use of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseSite {
    /// The enclosing block.
    pub block: BlockId,
    /// Index into the block's instruction, φ, or π list, depending on
    /// `kind`.
    pub index: usize,
    /// The role the value plays at this site.
    pub kind: UseKind,
}

/// Def-use relation over one function, borrowing its IR.
///
/// # Examples
///
/// ```rust
/// use whittle::cfg::BlockId;
/// use whittle::ir::{DefUse, ExceptionSet, FieldId, IrBlock, IrFunction, IrOp, MethodRef};
///
/// let mut func = IrFunction::new(MethodRef::new(1), 1);
/// let x = func.symbols().parameter_value(0);
/// let loaded = func.symbols_mut().fresh_value();
/// let mut entry = IrBlock::new(BlockId::new(0));
/// entry.push(IrOp::GetField {
///     dest: loaded,
///     object: x,
///     field: FieldId::new(0),
///     exceptions: ExceptionSet::NULL_POINTER,
/// });
/// func.add_block(entry);
///
/// let du = DefUse::build(&func);
/// assert_eq!(du.use_sites(x).len(), 1);
/// assert!(du.def_op(loaded).is_some());
/// assert!(du.def_op(x).is_none()); // parameters have no defining op
/// ```
#[derive(Debug)]
pub struct DefUse<'a> {
    ir: &'a IrFunction,
    defs: FxHashMap<ValueNum, DefSite>,
    uses: FxHashMap<ValueNum, Vec<UseSite>>,
}

impl<'a> DefUse<'a> {
    /// Builds the index by one scan over the function.
    #[must_use]
    pub fn build(ir: &'a IrFunction) -> Self {
        let mut defs = FxHashMap::default();
        let mut uses: FxHashMap<ValueNum, Vec<UseSite>> = FxHashMap::default();

        for block in ir.blocks() {
            let id = block.id();
            for (index, phi) in block.phis().iter().enumerate() {
                defs.insert(phi.result(), DefSite::Phi { block: id, index });
                for operand in phi.operands() {
                    uses.entry(operand.value()).or_default().push(UseSite {
                        block: id,
                        index,
                        kind: UseKind::PhiOperand,
                    });
                }
            }
            for (index, pi) in block.pis().iter().enumerate() {
                defs.insert(pi.result(), DefSite::Pi { block: id, index });
                uses.entry(pi.source()).or_default().push(UseSite {
                    block: id,
                    index,
                    kind: UseKind::PiSource,
                });
            }
            for (index, op) in block.instructions().iter().enumerate() {
                if let Some(dest) = op.def() {
                    defs.insert(dest, DefSite::Instruction { block: id, index });
                }
                for value in op.uses() {
                    uses.entry(value).or_default().push(UseSite {
                        block: id,
                        index,
                        kind: UseKind::Instruction,
                    });
                }
            }
        }

        Self { ir, defs, uses }
    }

    /// Returns where `value` is defined.
    ///
    /// Parameters, constants, and unknown values report
    /// [`DefSite::Entry`].
    #[must_use]
    pub fn def_site(&self, value: ValueNum) -> DefSite {
        self.defs.get(&value).copied().unwrap_or(DefSite::Entry)
    }

    /// Returns the instruction defining `value`, or `None` when the value
    /// is defined by a φ/π-node or has no defining node at all.
    #[must_use]
    pub fn def_op(&self, value: ValueNum) -> Option<&'a IrOp> {
        match self.def_site(value) {
            DefSite::Instruction { block, index } => {
                self.ir.block(block).and_then(|b| b.instructions().get(index))
            }
            _ => None,
        }
    }

    /// Returns all use sites of `value`.
    #[must_use]
    pub fn use_sites(&self, value: ValueNum) -> &[UseSite] {
        self.uses.get(&value).map_or(&[], Vec::as_slice)
    }

    /// Resolves a use site to its instruction, or `None` for φ/π uses.
    #[must_use]
    pub fn resolve_use(&self, site: UseSite) -> Option<&'a IrOp> {
        match site.kind {
            UseKind::Instruction => self
                .ir
                .block(site.block)
                .and_then(|b| b.instructions().get(site.index)),
            UseKind::PhiOperand | UseKind::PiSource => None,
        }
    }

    /// Returns the number of uses of `value`.
    #[must_use]
    pub fn use_count(&self, value: ValueNum) -> usize {
        self.uses.get(&value).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ExceptionSet, FieldId, IrBlock, MethodRef, PhiNode, PhiOperand};

    fn chain_function() -> IrFunction {
        // fn m(o) { a = o.f; b = a.g; return b; }
        let mut func = IrFunction::new(MethodRef::new(1), 1);
        let o = func.symbols().parameter_value(0);
        let a = func.symbols_mut().fresh_value();
        let b = func.symbols_mut().fresh_value();

        let mut entry = IrBlock::new(BlockId::new(0));
        entry.push(IrOp::GetField {
            dest: a,
            object: o,
            field: FieldId::new(0),
            exceptions: ExceptionSet::NULL_POINTER,
        });
        entry.push(IrOp::GetField {
            dest: b,
            object: a,
            field: FieldId::new(1),
            exceptions: ExceptionSet::NULL_POINTER,
        });
        entry.push(IrOp::Return { value: Some(b) });
        func.add_block(entry);
        func
    }

    #[test]
    fn def_chain_resolution() {
        let func = chain_function();
        let du = DefUse::build(&func);
        let o = func.symbols().parameter_value(0);
        let a = ValueNum::new(2);
        let b = ValueNum::new(3);

        assert_eq!(du.def_site(o), DefSite::Entry);
        assert!(matches!(
            du.def_site(a),
            DefSite::Instruction { index: 0, .. }
        ));
        let def_b = du.def_op(b).unwrap();
        assert!(matches!(def_b, IrOp::GetField { object, .. } if *object == a));
    }

    #[test]
    fn use_counting() {
        let func = chain_function();
        let du = DefUse::build(&func);
        let o = func.symbols().parameter_value(0);
        assert_eq!(du.use_count(o), 1);
        assert_eq!(du.use_count(ValueNum::new(2)), 1);
        // b used once by the return.
        assert_eq!(du.use_count(ValueNum::new(3)), 1);
        assert_eq!(du.use_count(ValueNum::new(42)), 0);
    }

    #[test]
    fn phi_uses_are_flagged() {
        let mut func = IrFunction::new(MethodRef::new(1), 2);
        let x = func.symbols().parameter_value(0);
        let y = func.symbols().parameter_value(1);
        let merged = func.symbols_mut().fresh_value();

        func.add_block(IrBlock::new(BlockId::new(0)));
        let mut join = IrBlock::new(BlockId::new(1));
        join.add_phi(PhiNode::new(
            merged,
            vec![
                PhiOperand::new(x, BlockId::new(0)),
                PhiOperand::new(y, BlockId::new(0)),
            ],
        ));
        func.add_block(join);

        let du = DefUse::build(&func);
        assert!(matches!(du.def_site(merged), DefSite::Phi { .. }));
        let site = du.use_sites(x)[0];
        assert_eq!(site.kind, UseKind::PhiOperand);
        assert!(du.resolve_use(site).is_none());
    }
}
