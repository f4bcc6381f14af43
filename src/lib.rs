// Copyright 2025-2026 The whittle authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # whittle
//!
//! Static-analysis refinements for SSA-form programs: an intraprocedural
//! null-dereference analysis that prunes impossible control flow edges,
//! and a property-name context selector that clones callees per dynamic
//! property key during call-graph construction. Both are building blocks
//! for a whole-program pointer/call-graph analysis engine; each is usable
//! on its own.
//!
//! # Architecture
//!
//! - [`ir`] - the SSA method representation the analyses consume:
//!   value numbers, symbol table, instructions as a tagged sum, φ/π
//!   nodes, and the def-use index
//! - [`cfg`] - control flow graphs with normal and exceptional edges,
//!   plus the filtered [`PrunedCfg`](cfg::PrunedCfg) view the null
//!   analysis produces
//! - [`dataflow`] - the four-point nullness lattice and the per-block
//!   analysis state
//! - [`nullptr`] - the null-pointer analysis itself: edge-sensitive
//!   fixpoint solver and the edge-pruning pass
//! - [`callgraph`] - property-name context selection: use-frequency
//!   classification, backward dependency tracing, and the context types
//! - [`progress`] - cooperative cancellation for long solves
//! - [`Error`] and [`Result`] - error handling across the crate
//!
//! # Pruning impossible exception edges
//!
//! ```rust
//! use whittle::cfg::{BlockId, CfgEdge, ControlFlowGraph};
//! use whittle::dataflow::{NullState, ParameterState};
//! use whittle::ir::{ExceptionSet, FieldId, IrBlock, IrFunction, IrOp, MethodRef};
//! use whittle::nullptr::NullPointerAnalysis;
//! use whittle::progress::NeverCancel;
//!
//! // fn m(x) { return x.f; } - the field load can only fail by x being
//! // null, so a never-null x makes the exceptional edge impossible.
//! let mut func = IrFunction::new(MethodRef::new(1), 1);
//! let x = func.symbols().parameter_value(0);
//! let loaded = func.symbols_mut().fresh_value();
//! let mut entry = IrBlock::new(BlockId::new(0));
//! entry.push(IrOp::GetField {
//!     dest: loaded,
//!     object: x,
//!     field: FieldId::new(0),
//!     exceptions: ExceptionSet::NULL_POINTER,
//! });
//! entry.push(IrOp::Return { value: Some(loaded) });
//! func.add_block(entry);
//!
//! let mut cfg = ControlFlowGraph::new(2);
//! cfg.add_edge(BlockId::new(0), CfgEdge::exception(BlockId::new(1)));
//!
//! let mut params = ParameterState::unknown(1);
//! params.set(0, NullState::NeverNull);
//!
//! let mut analysis =
//!     NullPointerAnalysis::new(&func, &cfg, ExceptionSet::empty(), params, None);
//! analysis.run(&NeverCancel)?;
//!
//! assert_eq!(analysis.deleted_edge_count()?, 1);
//! let pruned = analysis.pruned_cfg()?;
//! assert_eq!(pruned.exceptional_successors(BlockId::new(0)).count(), 0);
//! # Ok::<(), whittle::Error>(())
//! ```
//!
//! # Cloning callees per property name
//!
//! ```rust
//! use whittle::callgraph::{
//!     CgNode, ClassHierarchy, Context, ContextSelector, DefaultContextSelector,
//!     InstanceKey, PropertyNameContextSelector,
//! };
//! use whittle::cfg::BlockId;
//! use whittle::ir::{CallSiteRef, ExceptionSet, IrBlock, IrFunction, IrOp, MethodRef};
//!
//! struct Hierarchy;
//! impl ClassHierarchy for Hierarchy {
//!     fn undefined_instance(&self) -> InstanceKey {
//!         InstanceKey::new(0)
//!     }
//! }
//!
//! // function f(o, k) { return o[k]; }
//! let mut callee = IrFunction::new(MethodRef::new(10), 2);
//! let o = callee.symbols().parameter_value(0);
//! let k = callee.symbols().parameter_value(1);
//! let loaded = callee.symbols_mut().fresh_value();
//! let mut entry = IrBlock::new(BlockId::new(0));
//! entry.push(IrOp::PropertyGet {
//!     dest: loaded,
//!     object: o,
//!     key: k,
//!     exceptions: ExceptionSet::NULL_POINTER,
//! });
//! entry.push(IrOp::Return { value: Some(loaded) });
//! callee.add_block(entry);
//!
//! // caller: f(obj, "name")
//! let mut caller_ir = IrFunction::new(MethodRef::new(1), 0);
//! let obj = caller_ir.symbols_mut().fresh_value();
//! let name = caller_ir
//!     .symbols_mut()
//!     .constant(whittle::ir::Constant::String);
//! let mut block = IrBlock::new(BlockId::new(0));
//! block.push(IrOp::New { dest: obj, exceptions: ExceptionSet::empty() });
//! block.push(IrOp::Invoke {
//!     dest: None,
//!     receiver: None,
//!     args: vec![obj, name],
//!     callee: MethodRef::new(10),
//!     site: CallSiteRef::new(0),
//! });
//! caller_ir.add_block(block);
//!
//! let selector = PropertyNameContextSelector::new(
//!     1,
//!     Box::new(Hierarchy),
//!     Box::new(DefaultContextSelector),
//! );
//! let caller = CgNode::new(&caller_ir, Context::Everywhere);
//! let name_key = InstanceKey::new(7); // the abstract "name" string
//!
//! let ctx = selector.callee_target(
//!     &caller,
//!     CallSiteRef::new(0),
//!     &callee,
//!     &[Some(InstanceKey::new(3)), Some(name_key)],
//! );
//! assert_eq!(ctx, Context::property_name(Context::Everywhere, 1, name_key));
//! ```
//!
//! # Design notes
//!
//! The analyses are conservative by construction: on any ambiguity fewer
//! edges are deleted and less context sensitivity is applied, so a
//! degenerate input (empty IR, absent oracle, short receiver array)
//! degrades to the unrefined answer rather than an error. Neither core
//! performs I/O or spawns threads; the only shared state is the property
//! classifier's write-once memo, which is safe to expose to parallel
//! call-graph construction.

pub mod callgraph;
pub mod cfg;
pub mod dataflow;
mod error;
pub mod ir;
pub mod nullptr;
pub mod prelude;
pub mod progress;

pub use error::{Error, Result};
