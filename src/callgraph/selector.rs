//! The property-name context selector.
//!
//! A [`ContextSelector`] is the call-graph builder's policy hook: on every
//! resolved call it picks the context the callee will be analysed under.
//! [`PropertyNameContextSelector`] layers property-name sensitivity over
//! any base selector:
//!
//! 1. If the callee uses its distinguished argument as a property key
//!    (sometimes or always), clone it per concrete instance key flowing
//!    into that argument — substituting the language's `undefined`
//!    singleton when no value flows at all.
//! 2. Otherwise, if the *caller* is itself a property-name clone and some
//!    argument of this call derives from the caller's distinguished
//!    parameter, pass the caller's instance key on in a marker context so
//!    a later callee can still be cloned by it.
//! 3. Otherwise defer entirely to the base selector.

use rustc_hash::FxHashSet;

use crate::callgraph::{dependent_parameters, Context, InstanceKey, PropertyUseClassifier};
use crate::callgraph::Frequency;
use crate::ir::{CallSiteRef, IrFunction, MethodRef};

/// Resolver for language-level synthetic types.
///
/// The only resolution the selector needs is the abstract object standing
/// for the language's `undefined` singleton, used when a call site passes
/// nothing at the distinguished position.
pub trait ClassHierarchy {
    /// Returns the instance key of the `undefined` singleton.
    fn undefined_instance(&self) -> InstanceKey;
}

/// A call-graph node: a method's IR analysed under one context.
#[derive(Debug, Clone)]
pub struct CgNode<'a> {
    ir: &'a IrFunction,
    context: Context,
}

impl<'a> CgNode<'a> {
    /// Creates a node for `ir` analysed under `context`.
    #[must_use]
    pub fn new(ir: &'a IrFunction, context: Context) -> Self {
        Self { ir, context }
    }

    /// Returns the node's IR.
    #[must_use]
    pub const fn ir(&self) -> &'a IrFunction {
        self.ir
    }

    /// Returns the context this node is analysed under.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the node's method identity.
    #[must_use]
    pub fn method(&self) -> MethodRef {
        self.ir.method()
    }
}

/// Policy choosing the context a callee is analysed under.
pub trait ContextSelector {
    /// Picks the context for `callee` invoked from `caller` at `site`,
    /// given the abstract values known to flow into each argument
    /// position (`None` where nothing flows).
    fn callee_target(
        &self,
        caller: &CgNode<'_>,
        site: CallSiteRef,
        callee: &IrFunction,
        receiver: &[Option<InstanceKey>],
    ) -> Context;

    /// Returns the argument positions whose values may change the chosen
    /// context. The call-graph builder re-queries the selector when any
    /// of these widen.
    fn relevant_parameters(&self, caller: &CgNode<'_>, site: CallSiteRef) -> FxHashSet<usize>;
}

/// The context-insensitive base selector: everything runs under
/// [`Context::Everywhere`] and no parameter is relevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContextSelector;

impl ContextSelector for DefaultContextSelector {
    fn callee_target(
        &self,
        _caller: &CgNode<'_>,
        _site: CallSiteRef,
        _callee: &IrFunction,
        _receiver: &[Option<InstanceKey>],
    ) -> Context {
        Context::Everywhere
    }

    fn relevant_parameters(&self, _caller: &CgNode<'_>, _site: CallSiteRef) -> FxHashSet<usize> {
        FxHashSet::default()
    }
}

/// Object sensitivity along correlated property-name parameters.
///
/// Wraps a base selector and refines its answer per the module docs. The
/// classifier's memo is shared by all calls through this selector, so the
/// per-callee IR walk happens once per process.
pub struct PropertyNameContextSelector {
    classifier: PropertyUseClassifier,
    index: usize,
    hierarchy: Box<dyn ClassHierarchy>,
    base: Box<dyn ContextSelector>,
}

impl PropertyNameContextSelector {
    /// Creates a selector distinguishing argument position `index`.
    #[must_use]
    pub fn new(
        index: usize,
        hierarchy: Box<dyn ClassHierarchy>,
        base: Box<dyn ContextSelector>,
    ) -> Self {
        Self {
            classifier: PropertyUseClassifier::new(index),
            index,
            hierarchy,
            base,
        }
    }

    /// Returns the distinguished argument position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl ContextSelector for PropertyNameContextSelector {
    fn callee_target(
        &self,
        caller: &CgNode<'_>,
        site: CallSiteRef,
        callee: &IrFunction,
        receiver: &[Option<InstanceKey>],
    ) -> Context {
        let base_context = self.base.callee_target(caller, site, callee, receiver);

        if receiver.len() > self.index {
            match self.classifier.classify(callee) {
                Frequency::Always | Frequency::Sometimes => {
                    let instance = receiver[self.index]
                        .unwrap_or_else(|| self.hierarchy.undefined_instance());
                    return Context::property_name(base_context, self.index, instance);
                }
                Frequency::Never => {}
            }
        }

        if caller.context().is_property_name()
            && !dependent_parameters(caller, site, self.index).is_empty()
        {
            // The caller's distinguishing key rides on in a marker
            // context; instance_key is defined for both property-name
            // flavours, so a marker-context caller hands on the same key
            // it was cloned for.
            if let Some(caller_key) = caller.context().instance_key() {
                return Context::marker(base_context, self.index, caller_key);
            }
        }

        base_context
    }

    fn relevant_parameters(&self, caller: &CgNode<'_>, site: CallSiteRef) -> FxHashSet<usize> {
        let mut relevant = self.base.relevant_parameters(caller, site);
        let call_is_wide_enough = caller
            .ir()
            .calls_at(site)
            .next()
            .is_some_and(|call| call.uses().len() > self.index);
        if call_is_wide_enough {
            relevant.insert(self.index);
        }
        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::BlockId;
    use crate::ir::{ExceptionSet, IrBlock, IrOp};

    struct TestHierarchy;
    impl ClassHierarchy for TestHierarchy {
        fn undefined_instance(&self) -> InstanceKey {
            InstanceKey::new(0)
        }
    }

    fn selector(index: usize) -> PropertyNameContextSelector {
        PropertyNameContextSelector::new(
            index,
            Box::new(TestHierarchy),
            Box::new(DefaultContextSelector),
        )
    }

    /// function f(o, k) { return o[k]; }
    fn property_callee() -> IrFunction {
        let mut f = IrFunction::new(MethodRef::new(10), 2);
        let o = f.symbols().parameter_value(0);
        let k = f.symbols().parameter_value(1);
        let loaded = f.symbols_mut().fresh_value();
        let mut entry = IrBlock::new(BlockId::new(0));
        entry.push(IrOp::PropertyGet {
            dest: loaded,
            object: o,
            key: k,
            exceptions: ExceptionSet::NULL_POINTER,
        });
        entry.push(IrOp::Return { value: Some(loaded) });
        f.add_block(entry);
        f
    }

    /// A caller that forwards its own distinguished parameter to the
    /// callee: `function caller(o, k) { f(obj, k) }`. The caller has two
    /// parameters so that its slot 1 is the one a property-name clone of
    /// it would pin.
    fn forwarding_caller() -> IrFunction {
        let mut ir = IrFunction::new(MethodRef::new(1), 2);
        let k = ir.symbols().parameter_value(1);
        let obj = ir.symbols_mut().fresh_value();
        let mut entry = IrBlock::new(BlockId::new(0));
        entry.push(IrOp::New {
            dest: obj,
            exceptions: ExceptionSet::empty(),
        });
        entry.push(IrOp::Invoke {
            dest: None,
            receiver: None,
            args: vec![obj, k],
            callee: MethodRef::new(10),
            site: CallSiteRef::new(0),
        });
        ir.add_block(entry);
        ir
    }

    #[test]
    fn property_callee_gets_a_cloning_context() {
        let callee = property_callee();
        let caller_ir = forwarding_caller();
        let caller = CgNode::new(&caller_ir, Context::Everywhere);
        let sel = selector(1);

        let name = InstanceKey::new(7);
        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &callee,
            &[Some(InstanceKey::new(3)), Some(name)],
        );
        assert_eq!(ctx, Context::property_name(Context::Everywhere, 1, name));
        assert!(ctx.parameter_filter(1).is_some());
    }

    #[test]
    fn missing_argument_becomes_undefined() {
        let callee = property_callee();
        let caller_ir = forwarding_caller();
        let caller = CgNode::new(&caller_ir, Context::Everywhere);
        let sel = selector(1);

        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &callee,
            &[Some(InstanceKey::new(3)), None],
        );
        // ik0 is the test hierarchy's undefined singleton.
        assert_eq!(ctx.instance_key(), Some(InstanceKey::new(0)));
    }

    #[test]
    fn short_receiver_array_defers_to_base() {
        let callee = property_callee();
        let caller_ir = forwarding_caller();
        let caller = CgNode::new(&caller_ir, Context::Everywhere);
        let sel = selector(1);

        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &callee,
            &[Some(InstanceKey::new(3))],
        );
        assert_eq!(ctx, Context::Everywhere);
    }

    #[test]
    fn marker_propagates_through_dependent_callees() {
        // The callee never uses arg 1 as a property name, but the caller
        // is a property-name clone and forwards its parameter.
        let mut plain = IrFunction::new(MethodRef::new(20), 2);
        {
            let k = plain.symbols().parameter_value(1);
            let mut entry = IrBlock::new(BlockId::new(0));
            entry.push(IrOp::Invoke {
                dest: None,
                receiver: None,
                args: vec![k],
                callee: MethodRef::new(99),
                site: CallSiteRef::new(5),
            });
            entry.push(IrOp::Return { value: None });
            plain.add_block(entry);
        }

        let caller_ir = forwarding_caller();
        let cloned = Context::property_name(Context::Everywhere, 1, InstanceKey::new(7));
        let caller = CgNode::new(&caller_ir, cloned);
        let sel = selector(1);

        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &plain,
            &[Some(InstanceKey::new(3)), Some(InstanceKey::new(4))],
        );
        assert_eq!(
            ctx,
            Context::marker(Context::Everywhere, 1, InstanceKey::new(7))
        );
        // The marker hides the filter.
        assert!(ctx.parameter_filter(1).is_none());
    }

    #[test]
    fn marker_caller_hands_on_its_own_key() {
        let mut plain = IrFunction::new(MethodRef::new(21), 2);
        plain.add_block(IrBlock::new(BlockId::new(0)));

        let caller_ir = forwarding_caller();
        let marker = Context::marker(Context::Everywhere, 1, InstanceKey::new(9));
        let caller = CgNode::new(&caller_ir, marker);
        let sel = selector(1);

        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &plain,
            &[Some(InstanceKey::new(3)), Some(InstanceKey::new(4))],
        );
        assert_eq!(ctx.instance_key(), Some(InstanceKey::new(9)));
    }

    #[test]
    fn independent_callee_under_marked_caller_gets_base() {
        // Caller is marked, but no argument of the call derives from its
        // distinguished parameter.
        let mut caller_ir = IrFunction::new(MethodRef::new(1), 2);
        let obj = caller_ir.symbols_mut().fresh_value();
        let mut entry = IrBlock::new(BlockId::new(0));
        entry.push(IrOp::New {
            dest: obj,
            exceptions: ExceptionSet::empty(),
        });
        entry.push(IrOp::Invoke {
            dest: None,
            receiver: None,
            args: vec![obj],
            callee: MethodRef::new(20),
            site: CallSiteRef::new(0),
        });
        caller_ir.add_block(entry);

        let mut plain = IrFunction::new(MethodRef::new(20), 2);
        plain.add_block(IrBlock::new(BlockId::new(0)));

        let cloned = Context::property_name(Context::Everywhere, 1, InstanceKey::new(7));
        let caller = CgNode::new(&caller_ir, cloned);
        let sel = selector(1);

        let ctx = sel.callee_target(
            &caller,
            CallSiteRef::new(0),
            &plain,
            &[Some(InstanceKey::new(3)), Some(InstanceKey::new(4))],
        );
        assert_eq!(ctx, Context::Everywhere);
    }

    #[test]
    fn relevant_parameters_union_the_distinguished_index() {
        let caller_ir = forwarding_caller();
        let caller = CgNode::new(&caller_ir, Context::Everywhere);
        let sel = selector(1);

        let relevant = sel.relevant_parameters(&caller, CallSiteRef::new(0));
        assert!(relevant.contains(&1));

        // A site with too few argument uses contributes nothing.
        let relevant = sel.relevant_parameters(&caller, CallSiteRef::new(42));
        assert!(relevant.is_empty());
    }

    #[test]
    fn context_choice_is_stable() {
        let callee = property_callee();
        let caller_ir = forwarding_caller();
        let caller = CgNode::new(&caller_ir, Context::Everywhere);
        let sel = selector(1);
        let receiver = [Some(InstanceKey::new(3)), Some(InstanceKey::new(7))];

        let first = sel.callee_target(&caller, CallSiteRef::new(0), &callee, &receiver);
        for _ in 0..3 {
            let again = sel.callee_target(&caller, CallSiteRef::new(0), &callee, &receiver);
            assert_eq!(again, first);
        }
    }
}
