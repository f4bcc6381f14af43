//! Calling contexts and the parameter filters they expose.
//!
//! A context is the key under which the call-graph builder analyses a
//! callee; two calls with different contexts get independent analyses.
//! Besides the context-insensitive [`Context::Everywhere`], this module
//! provides the property-name contexts: clones of a callee distinguished
//! by the abstract object flowing into one parameter slot.
//!
//! The two property-name flavours share identity — same base, same
//! parameter index, same instance key — and differ only in whether they
//! expose a [`SingleInstanceFilter`] for the slot. The cloning flavour
//! does, which the pointer analysis consumes as a parameter refinement;
//! the marker flavour deliberately does not, so the distinguishing key
//! can ride through intermediary callees without constraining their
//! parameter sets.

use std::fmt;

/// An abstract object identity from the pointer analysis.
///
/// One instance key denotes a set of concrete runtime objects; property
/// name strings, in particular, are abstract objects like any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceKey(u32);

impl InstanceKey {
    /// Creates an instance key from a raw id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ik{}", self.0)
    }
}

/// A parameter-slot refinement narrowing the pointer-analysis solution
/// for one parameter to a single abstract value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleInstanceFilter {
    instance: InstanceKey,
}

impl SingleInstanceFilter {
    /// Creates a filter pinning a slot to `instance`.
    #[must_use]
    pub const fn new(instance: InstanceKey) -> Self {
        Self { instance }
    }

    /// Returns the pinned instance.
    #[must_use]
    pub const fn instance(&self) -> InstanceKey {
        self.instance
    }
}

/// A property-name calling context.
///
/// Carries the base context it was derived from, the distinguished
/// parameter index, the distinguishing [`InstanceKey`], and whether the
/// single-instance filter is suppressed (the marker flavour).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropNameContext {
    base: Box<Context>,
    index: usize,
    instance: InstanceKey,
    suppress_filter: bool,
}

impl PropNameContext {
    /// Returns the context this one was derived from.
    #[must_use]
    pub fn base(&self) -> &Context {
        &self.base
    }

    /// Returns the distinguished parameter index.
    #[must_use]
    pub const fn parameter_index(&self) -> usize {
        self.index
    }

    /// Returns the instance key that distinguishes this context.
    ///
    /// Defined for both flavours; the marker flavour carries the key even
    /// though it exposes no filter for it.
    #[must_use]
    pub const fn instance_key(&self) -> InstanceKey {
        self.instance
    }

    /// Returns `true` if this context exposes a parameter filter
    /// (the cloning flavour), `false` for the marker flavour.
    #[must_use]
    pub const fn has_parameter_filter(&self) -> bool {
        !self.suppress_filter
    }
}

/// The key distinguishing analyses of one method under different callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Context {
    /// The context-insensitive context: one analysis for all callers.
    Everywhere,
    /// A property-name context, cloning or marker flavour.
    PropertyName(PropNameContext),
}

impl Context {
    /// Creates a cloning property-name context over `base`, pinning
    /// parameter `index` to `instance`.
    #[must_use]
    pub fn property_name(base: Context, index: usize, instance: InstanceKey) -> Self {
        Self::PropertyName(PropNameContext {
            base: Box::new(base),
            index,
            instance,
            suppress_filter: false,
        })
    }

    /// Creates a marker context over `base`: same identity as
    /// [`property_name`](Self::property_name) but without exposing the
    /// parameter filter.
    #[must_use]
    pub fn marker(base: Context, index: usize, instance: InstanceKey) -> Self {
        Self::PropertyName(PropNameContext {
            base: Box::new(base),
            index,
            instance,
            suppress_filter: true,
        })
    }

    /// Returns `true` if this context carries the property-name marker,
    /// in either flavour.
    #[must_use]
    pub const fn is_property_name(&self) -> bool {
        matches!(self, Self::PropertyName(_))
    }

    /// Returns the distinguished parameter index, if any.
    #[must_use]
    pub fn property_parameter(&self) -> Option<usize> {
        match self {
            Self::PropertyName(c) => Some(c.parameter_index()),
            Self::Everywhere => None,
        }
    }

    /// Returns the distinguishing instance key, if any.
    ///
    /// Total over both property-name flavours, so marker contexts can
    /// hand their key on without pretending to expose a filter.
    #[must_use]
    pub fn instance_key(&self) -> Option<InstanceKey> {
        match self {
            Self::PropertyName(c) => Some(c.instance_key()),
            Self::Everywhere => None,
        }
    }

    /// Returns the single-instance filter for parameter `slot`.
    ///
    /// Only the cloning flavour answers, and only for its own slot.
    #[must_use]
    pub fn parameter_filter(&self, slot: usize) -> Option<SingleInstanceFilter> {
        match self {
            Self::PropertyName(c)
                if c.has_parameter_filter() && c.parameter_index() == slot =>
            {
                Some(SingleInstanceFilter::new(c.instance_key()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everywhere => write!(f, "everywhere"),
            Self::PropertyName(c) if c.has_parameter_filter() => {
                write!(
                    f,
                    "property name context for {} over {}",
                    c.instance_key(),
                    c.base()
                )
            }
            Self::PropertyName(c) => {
                write!(
                    f,
                    "marker context for {} over {}",
                    c.instance_key(),
                    c.base()
                )
            }
        }
    }
}
