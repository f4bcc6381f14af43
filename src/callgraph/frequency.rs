//! Classifying how a callee uses its distinguished argument.
//!
//! The context selector only clones callees that actually use argument
//! `N` as a dynamic property key. This module answers that question by
//! walking the argument's uses in the callee's IR, and memoizes the
//! answer per method for the life of the process — the classification
//! depends only on the callee's IR, so a second computation could never
//! disagree with the first.

use dashmap::DashMap;

use crate::ir::{DefUse, IrFunction, IrOp, MethodRef, ValueNum};

/// How often a callee uses its distinguished argument as a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// The argument is never used as a property key.
    Never,
    /// The argument is used both as a property key and otherwise.
    Sometimes,
    /// Every use of the argument is as a property key.
    Always,
}

/// Memoizing classifier for property-name argument use.
///
/// The cache is keyed by method identity and its entries are write-once;
/// a concurrent duplicate computation would store the same answer, so the
/// map is shared freely across call-graph construction.
///
/// # Examples
///
/// ```rust
/// use whittle::callgraph::{Frequency, PropertyUseClassifier};
/// use whittle::cfg::BlockId;
/// use whittle::ir::{ExceptionSet, IrBlock, IrFunction, IrOp, MethodRef};
///
/// // function f(o, k) { return o[k]; }
/// let mut callee = IrFunction::new(MethodRef::new(1), 2);
/// let o = callee.symbols().parameter_value(0);
/// let k = callee.symbols().parameter_value(1);
/// let loaded = callee.symbols_mut().fresh_value();
/// let mut entry = IrBlock::new(BlockId::new(0));
/// entry.push(IrOp::PropertyGet {
///     dest: loaded,
///     object: o,
///     key: k,
///     exceptions: ExceptionSet::NULL_POINTER,
/// });
/// entry.push(IrOp::Return { value: Some(loaded) });
/// callee.add_block(entry);
///
/// let classifier = PropertyUseClassifier::new(1);
/// assert_eq!(classifier.classify(&callee), Frequency::Always);
/// ```
#[derive(Debug)]
pub struct PropertyUseClassifier {
    /// The distinguished argument position (0-based).
    index: usize,
    /// Process-lifetime memo; entries are write-once.
    cache: DashMap<MethodRef, Frequency>,
}

impl PropertyUseClassifier {
    /// Creates a classifier for argument position `index`.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cache: DashMap::new(),
        }
    }

    /// Returns the distinguished argument position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Classifies `callee`'s use of its distinguished argument.
    ///
    /// A callee with fewer than `index` parameters is `Never` without
    /// touching the cache. Otherwise the answer is memoized by the
    /// callee's method reference.
    #[must_use]
    pub fn classify(&self, callee: &IrFunction) -> Frequency {
        if callee.symbols().parameter_count() < self.index {
            return Frequency::Never;
        }
        if let Some(cached) = self.cache.get(&callee.method()) {
            return *cached;
        }

        let frequency = self.compute(callee);
        self.cache.insert(callee.method(), frequency);
        frequency
    }

    fn compute(&self, callee: &IrFunction) -> Frequency {
        // Parameter value numbers are 1-based, so argument N lives in
        // value N+1.
        let argument = ValueNum::new(self.index + 1);
        let du = DefUse::build(callee);

        let mut as_property_name = false;
        let mut as_something_else = false;

        for site in du.use_sites(argument) {
            match du.resolve_use(*site) {
                Some(
                    IrOp::PropertyGet { key, .. }
                    | IrOp::PropertySet { key, .. }
                    | IrOp::IsDefined { key, .. },
                ) if *key == argument => as_property_name = true,
                // Any other use, including phi/pi operands, counts
                // against a pure property-name role.
                _ => as_something_else = true,
            }
        }

        if !as_property_name {
            Frequency::Never
        } else if as_something_else {
            Frequency::Sometimes
        } else {
            Frequency::Always
        }
    }
}
