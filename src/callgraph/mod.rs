//! Property-name context selection for call-graph construction.
//!
//! In a language with dynamic property access, a method that uses one of
//! its arguments as a property key (`obj[arg]`) behaves very differently
//! per concrete key. Analysing such a callee once, context-insensitively,
//! smears every property of every object together; analysing it once *per
//! key value* keeps correlated reads and writes apart.
//!
//! This module implements that policy as a [`ContextSelector`] the
//! call-graph builder composes over its base selector:
//!
//! - [`PropertyUseClassifier`] decides, per callee, whether the
//!   distinguished argument is never / sometimes / always used as a
//!   property key (memoized for the life of the process);
//! - [`dependent_parameters`] traces, backward through def-use chains,
//!   which caller arguments feed the distinguished value;
//! - [`PropertyNameContextSelector`] builds the per-call [`Context`]:
//!   a cloning context pinning the distinguished parameter to one
//!   [`InstanceKey`], or a marker that propagates the key through
//!   intermediary callees without constraining their parameters.

mod context;
mod frequency;
mod selector;
mod trace;

pub use context::{Context, InstanceKey, PropNameContext, SingleInstanceFilter};
pub use frequency::{Frequency, PropertyUseClassifier};
pub use selector::{
    CgNode, ClassHierarchy, ContextSelector, DefaultContextSelector, PropertyNameContextSelector,
};
pub use trace::dependent_parameters;
