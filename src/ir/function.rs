//! The complete SSA representation of a method.

use crate::cfg::BlockId;
use crate::ir::{CallSiteRef, IrBlock, IrOp, MethodRef, SymbolTable};

/// A method in SSA form: its blocks plus the symbol table that numbers
/// its values.
///
/// An `IrFunction` may be *empty* — a method without a body (abstract,
/// native, or synthetic). The analyses short-circuit on empty IR: the
/// pruned CFG equals the input and per-block states stay at their seeded
/// initial value.
///
/// # Examples
///
/// ```rust
/// use whittle::cfg::BlockId;
/// use whittle::ir::{ExceptionSet, FieldId, IrBlock, IrFunction, IrOp, MethodRef};
///
/// // fn m(x) { return x.f; }
/// let mut func = IrFunction::new(MethodRef::new(1), 1);
/// let x = func.symbols().parameter_value(0);
/// let result = func.symbols_mut().fresh_value();
///
/// let mut entry = IrBlock::new(BlockId::new(0));
/// entry.push(IrOp::GetField {
///     dest: result,
///     object: x,
///     field: FieldId::new(0),
///     exceptions: ExceptionSet::NULL_POINTER,
/// });
/// entry.push(IrOp::Return { value: Some(result) });
/// func.add_block(entry);
///
/// assert!(!func.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct IrFunction {
    method: MethodRef,
    symbols: SymbolTable,
    blocks: Vec<IrBlock>,
}

impl IrFunction {
    /// Creates an empty function for `method` with `parameter_count`
    /// parameters.
    #[must_use]
    pub fn new(method: MethodRef, parameter_count: usize) -> Self {
        Self {
            method,
            symbols: SymbolTable::new(parameter_count),
            blocks: Vec::new(),
        }
    }

    /// Returns the identity of this method.
    #[must_use]
    pub const fn method(&self) -> MethodRef {
        self.method
    }

    /// Returns the symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the symbol table mutably, for value allocation during
    /// construction.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Appends a block.
    ///
    /// # Panics
    ///
    /// Panics if the block's id does not continue the dense numbering;
    /// blocks must be added in CFG order so IR and CFG indices agree.
    pub fn add_block(&mut self, block: IrBlock) {
        assert_eq!(
            block.id().index(),
            self.blocks.len(),
            "block {} added out of order",
            block.id()
        );
        self.blocks.push(block);
    }

    /// Returns the block with the given id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&IrBlock> {
        self.blocks.get(id.index())
    }

    /// Returns all blocks.
    #[must_use]
    pub fn blocks(&self) -> &[IrBlock] {
        &self.blocks
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the method has no body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns every instruction together with its enclosing block id.
    pub fn instructions(&self) -> impl Iterator<Item = (BlockId, &IrOp)> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions().iter().map(move |op| (b.id(), op)))
    }

    /// Returns the invoke instructions at the given call site.
    ///
    /// A site usually maps to exactly one invoke; front ends that duplicate
    /// code may produce several, in which case the first is authoritative
    /// for argument positions.
    pub fn calls_at(&self, site: CallSiteRef) -> impl Iterator<Item = &IrOp> {
        self.instructions().filter_map(move |(_, op)| match op {
            IrOp::Invoke { site: s, .. } if *s == site => Some(op),
            _ => None,
        })
    }
}
