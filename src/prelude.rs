//! Convenient re-exports of the commonly used types.
//!
//! ```rust
//! use whittle::prelude::*;
//!
//! let cfg = ControlFlowGraph::new(1);
//! let func = IrFunction::new(MethodRef::new(1), 0);
//! let mut analysis = NullPointerAnalysis::new(
//!     &func,
//!     &cfg,
//!     ExceptionSet::empty(),
//!     ParameterState::default(),
//!     None,
//! );
//! analysis.run(&NeverCancel)?;
//! # Ok::<(), whittle::Error>(())
//! ```

/// The crate-wide error type.
pub use crate::Error;

/// The crate-wide result alias.
pub use crate::Result;

/// Control flow graphs and pruning.
pub use crate::cfg::{BlockId, CfgEdge, ControlFlowGraph, EdgeKind, NegativeEdges, PrunedCfg};

/// The nullness domain.
pub use crate::dataflow::{NullPointerState, NullState, ParameterState};

/// The SSA method representation.
pub use crate::ir::{
    CallSiteRef, Constant, DefUse, ExceptionSet, FieldId, IrBlock, IrFunction, IrOp, MethodRef,
    PhiNode, PhiOperand, PiNode, SymbolTable, ValueNum,
};

/// The null-pointer analysis.
pub use crate::nullptr::{MethodState, NullPointerAnalysis};

/// Property-name context selection.
pub use crate::callgraph::{
    CgNode, ClassHierarchy, Context, ContextSelector, DefaultContextSelector, Frequency,
    InstanceKey, PropertyNameContextSelector, PropertyUseClassifier, SingleInstanceFilter,
};

/// Cancellation plumbing.
pub use crate::progress::{CancelFlag, NeverCancel, ProgressMonitor};
