//! Instructions as a tagged sum with explicit operands.
//!
//! Every instruction kind the analyses dispatch on is one variant of
//! [`IrOp`], carrying its operand value numbers directly in
//! `result = op(operands)` form. A single `match` replaces the visitor
//! machinery a class-per-instruction IR would need; transfer functions and
//! the pruning pass each route through one dispatch site.
//!
//! # Exceptional behaviour
//!
//! Instruction kinds that can exit exceptionally carry a declared
//! [`ExceptionSet`]. The pruning pass subtracts the caller-supplied ignore
//! set from the declared set before deciding whether an instruction's only
//! remaining failure mode is the null-pointer error. Invokes are the
//! exception to the rule: what a callee can throw is unknowable from the
//! call site, so invokes declare nothing and the pass consults the
//! method-summary oracle instead.

use bitflags::bitflags;

use std::fmt;

use crate::ir::{CallSiteRef, MethodRef, ValueNum};

bitflags! {
    /// The set of exception kinds an instruction declares it may raise.
    ///
    /// Used both as the per-instruction declared set and as the
    /// caller-supplied ignore set; "remaining exceptions" is the flag
    /// difference of the two.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExceptionSet: u16 {
        /// Dereference of the null value.
        const NULL_POINTER = 1 << 0;
        /// Array index outside the array bounds.
        const BOUNDS = 1 << 1;
        /// Failed downcast.
        const CAST = 1 << 2;
        /// Division by zero and friends.
        const ARITHMETIC = 1 << 3;
        /// Allocation failure.
        const ALLOC_FAILED = 1 << 4;
        /// Monitor operation in an illegal state.
        const MONITOR_STATE = 1 << 5;
        /// A user-thrown exception of arbitrary type.
        const USER_THROWN = 1 << 6;
    }
}

/// Identity of a statically-resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(u32);

impl FieldId {
    /// Creates a field id from a raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// An SSA instruction.
///
/// Operands and results are explicit [`ValueNum`]s. Reference operands
/// that an instruction dereferences (and whose nullness therefore decides
/// its exceptional exit) are exposed through
/// [`dereferenced_ref`](Self::dereferenced_ref).
#[derive(Debug, Clone, PartialEq)]
pub enum IrOp {
    /// Allocates a fresh object; the result is never null.
    New {
        /// The allocated object.
        dest: ValueNum,
        /// Declared exceptional exits of the allocation.
        exceptions: ExceptionSet,
    },

    /// Reads a statically-named field: `dest = object.field`.
    GetField {
        /// The loaded value.
        dest: ValueNum,
        /// The dereferenced object reference.
        object: ValueNum,
        /// The accessed field.
        field: FieldId,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Writes a statically-named field: `object.field = value`.
    PutField {
        /// The dereferenced object reference.
        object: ValueNum,
        /// The stored value.
        value: ValueNum,
        /// The accessed field.
        field: FieldId,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Reads a static field; no reference is dereferenced.
    GetStatic {
        /// The loaded value.
        dest: ValueNum,
        /// The accessed field.
        field: FieldId,
    },

    /// Writes a static field; no reference is dereferenced.
    PutStatic {
        /// The stored value.
        value: ValueNum,
        /// The accessed field.
        field: FieldId,
    },

    /// Reads a property by computed key: `dest = object[key]`.
    ///
    /// This is the dynamic member access the property-name context
    /// selector classifies callees by.
    PropertyGet {
        /// The loaded value.
        dest: ValueNum,
        /// The dereferenced object reference.
        object: ValueNum,
        /// The computed property key.
        key: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Writes a property by computed key: `object[key] = value`.
    PropertySet {
        /// The dereferenced object reference.
        object: ValueNum,
        /// The computed property key.
        key: ValueNum,
        /// The stored value.
        value: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Tests whether a property exists: `dest = key in object`.
    IsDefined {
        /// The boolean result.
        dest: ValueNum,
        /// The inspected object.
        object: ValueNum,
        /// The computed property key.
        key: ValueNum,
    },

    /// Reads the length of an array: `dest = array.length`.
    ArrayLength {
        /// The length (an integer, never a null reference).
        dest: ValueNum,
        /// The dereferenced array reference.
        array: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Reads an array element: `dest = array[index]`.
    ArrayLoad {
        /// The loaded element.
        dest: ValueNum,
        /// The dereferenced array reference.
        array: ValueNum,
        /// The element index.
        index: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Writes an array element: `array[index] = value`.
    ArrayStore {
        /// The dereferenced array reference.
        array: ValueNum,
        /// The element index.
        index: ValueNum,
        /// The stored element.
        value: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Invokes a method.
    ///
    /// Static calls have no receiver. What the callee may throw is not
    /// declared here; the pruning pass consults the method-summary oracle.
    Invoke {
        /// The returned value, if the result is used.
        dest: Option<ValueNum>,
        /// The dereferenced receiver; `None` for static calls.
        receiver: Option<ValueNum>,
        /// Positional arguments after the receiver.
        args: Vec<ValueNum>,
        /// The invoked method.
        callee: MethodRef,
        /// The call site this invoke belongs to.
        site: CallSiteRef,
    },

    /// Narrows a reference: `dest = (T) object`.
    ///
    /// The cast of a null reference succeeds, so the result inherits the
    /// operand's null-state and no reference is dereferenced.
    CheckCast {
        /// The narrowed reference.
        dest: ValueNum,
        /// The cast operand.
        object: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Enters or exits a monitor on an object.
    Monitor {
        /// The dereferenced monitor object.
        object: ValueNum,
        /// `true` for enter, `false` for exit.
        enter: bool,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Throws an exception object.
    ///
    /// Throwing the null value raises the null-pointer error instead, so
    /// the thrown reference counts as dereferenced.
    Throw {
        /// The thrown reference.
        exception: ValueNum,
        /// Declared exceptional exits.
        exceptions: ExceptionSet,
    },

    /// Binds the caught exception object at a handler entry.
    ///
    /// A caught exception is never null.
    CaughtException {
        /// The caught exception object.
        dest: ValueNum,
    },

    /// Two-way conditional branch comparing two values.
    ///
    /// `equal` selects the comparison: `lhs == rhs` when true, `lhs != rhs`
    /// when false. When one side is the null constant, the solver refines
    /// the other side along the two branch edges.
    Conditional {
        /// Left comparison operand.
        lhs: ValueNum,
        /// Right comparison operand.
        rhs: ValueNum,
        /// `true` for an equality test, `false` for inequality.
        equal: bool,
    },

    /// An opaque computation over its operands (arithmetic, comparison,
    /// conversion). Carries no null information.
    Compute {
        /// The computed value.
        dest: ValueNum,
        /// Operand values.
        operands: Vec<ValueNum>,
    },

    /// Returns from the method.
    Return {
        /// The returned value, if any.
        value: Option<ValueNum>,
    },

    /// Unconditional jump; the target lives in the CFG.
    Goto,
}

impl IrOp {
    /// Returns the value defined by this instruction, if any.
    #[must_use]
    pub fn def(&self) -> Option<ValueNum> {
        match self {
            Self::New { dest, .. }
            | Self::GetField { dest, .. }
            | Self::GetStatic { dest, .. }
            | Self::PropertyGet { dest, .. }
            | Self::IsDefined { dest, .. }
            | Self::ArrayLength { dest, .. }
            | Self::ArrayLoad { dest, .. }
            | Self::CheckCast { dest, .. }
            | Self::CaughtException { dest }
            | Self::Compute { dest, .. } => Some(*dest),
            Self::Invoke { dest, .. } => *dest,
            Self::PutField { .. }
            | Self::PutStatic { .. }
            | Self::PropertySet { .. }
            | Self::ArrayStore { .. }
            | Self::Monitor { .. }
            | Self::Throw { .. }
            | Self::Conditional { .. }
            | Self::Return { .. }
            | Self::Goto => None,
        }
    }

    /// Returns the values read by this instruction.
    #[must_use]
    pub fn uses(&self) -> Vec<ValueNum> {
        match self {
            Self::New { .. } | Self::GetStatic { .. } | Self::CaughtException { .. } | Self::Goto => {
                Vec::new()
            }
            Self::GetField { object, .. }
            | Self::ArrayLength { array: object, .. }
            | Self::CheckCast { object, .. }
            | Self::Monitor { object, .. }
            | Self::Throw {
                exception: object, ..
            } => vec![*object],
            Self::PutField { object, value, .. } => vec![*object, *value],
            Self::PutStatic { value, .. } => vec![*value],
            Self::PropertyGet { object, key, .. } | Self::IsDefined { object, key, .. } => {
                vec![*object, *key]
            }
            Self::PropertySet {
                object, key, value, ..
            } => vec![*object, *key, *value],
            Self::ArrayLoad { array, index, .. } => vec![*array, *index],
            Self::ArrayStore {
                array,
                index,
                value,
                ..
            } => vec![*array, *index, *value],
            Self::Invoke { receiver, args, .. } => {
                receiver.iter().copied().chain(args.iter().copied()).collect()
            }
            Self::Conditional { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Compute { operands, .. } => operands.clone(),
            Self::Return { value } => value.iter().copied().collect(),
        }
    }

    /// Returns `true` if this instruction may exit exceptionally.
    ///
    /// The classification is by kind, not by declared set: an allocation
    /// with an empty declared set is still the instruction responsible for
    /// its block's exceptional successors, which is exactly what lets the
    /// pruning pass delete them.
    #[must_use]
    pub const fn may_throw(&self) -> bool {
        matches!(
            self,
            Self::New { .. }
                | Self::GetField { .. }
                | Self::PutField { .. }
                | Self::PropertyGet { .. }
                | Self::PropertySet { .. }
                | Self::ArrayLength { .. }
                | Self::ArrayLoad { .. }
                | Self::ArrayStore { .. }
                | Self::Invoke { .. }
                | Self::CheckCast { .. }
                | Self::Monitor { .. }
                | Self::Throw { .. }
        )
    }

    /// Returns the declared exception set.
    ///
    /// Empty for instructions that cannot throw and for invokes, whose
    /// exceptional behaviour is the callee's and is answered by the
    /// method-summary oracle instead.
    #[must_use]
    pub fn declared_exceptions(&self) -> ExceptionSet {
        match self {
            Self::New { exceptions, .. }
            | Self::GetField { exceptions, .. }
            | Self::PutField { exceptions, .. }
            | Self::PropertyGet { exceptions, .. }
            | Self::PropertySet { exceptions, .. }
            | Self::ArrayLength { exceptions, .. }
            | Self::ArrayLoad { exceptions, .. }
            | Self::ArrayStore { exceptions, .. }
            | Self::CheckCast { exceptions, .. }
            | Self::Monitor { exceptions, .. }
            | Self::Throw { exceptions, .. } => *exceptions,
            _ => ExceptionSet::empty(),
        }
    }

    /// Returns the reference operand this instruction dereferences, if any.
    ///
    /// This is the value whose nullness decides the instruction's
    /// null-pointer behaviour. Static accesses, allocations, casts, and
    /// static invokes dereference nothing.
    #[must_use]
    pub const fn dereferenced_ref(&self) -> Option<ValueNum> {
        match self {
            Self::GetField { object, .. }
            | Self::PutField { object, .. }
            | Self::PropertyGet { object, .. }
            | Self::PropertySet { object, .. }
            | Self::Monitor { object, .. } => Some(*object),
            Self::ArrayLength { array, .. }
            | Self::ArrayLoad { array, .. }
            | Self::ArrayStore { array, .. } => Some(*array),
            Self::Throw { exception, .. } => Some(*exception),
            Self::Invoke { receiver, .. } => *receiver,
            _ => None,
        }
    }

    /// Returns `true` if this is an invoke.
    #[must_use]
    pub const fn is_invoke(&self) -> bool {
        matches!(self, Self::Invoke { .. })
    }

    /// Returns the positional argument values of an invoke, receiver
    /// first, or an empty vector for any other instruction.
    ///
    /// Positions here match the argument positions the context selector's
    /// dependency tracer reasons about.
    #[must_use]
    pub fn invoke_arguments(&self) -> Vec<ValueNum> {
        match self {
            Self::Invoke { receiver, args, .. } => {
                receiver.iter().copied().chain(args.iter().copied()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for IrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New { dest, .. } => write!(f, "{dest} = new"),
            Self::GetField { dest, object, field, .. } => {
                write!(f, "{dest} = {object}.{field}")
            }
            Self::PutField { object, value, field, .. } => {
                write!(f, "{object}.{field} = {value}")
            }
            Self::GetStatic { dest, field } => write!(f, "{dest} = static {field}"),
            Self::PutStatic { value, field } => write!(f, "static {field} = {value}"),
            Self::PropertyGet { dest, object, key, .. } => {
                write!(f, "{dest} = {object}[{key}]")
            }
            Self::PropertySet { object, key, value, .. } => {
                write!(f, "{object}[{key}] = {value}")
            }
            Self::IsDefined { dest, object, key } => {
                write!(f, "{dest} = {key} in {object}")
            }
            Self::ArrayLength { dest, array, .. } => write!(f, "{dest} = len {array}"),
            Self::ArrayLoad { dest, array, index, .. } => {
                write!(f, "{dest} = {array}[{index}]")
            }
            Self::ArrayStore { array, index, value, .. } => {
                write!(f, "{array}[{index}] = {value}")
            }
            Self::Invoke {
                dest,
                receiver,
                args,
                callee,
                ..
            } => {
                if let Some(dest) = dest {
                    write!(f, "{dest} = ")?;
                }
                write!(f, "call {callee}(")?;
                let mut first = true;
                for arg in receiver.iter().chain(args.iter()) {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::CheckCast { dest, object, .. } => write!(f, "{dest} = cast {object}"),
            Self::Monitor { object, enter, .. } => {
                write!(f, "monitor{} {object}", if *enter { "enter" } else { "exit" })
            }
            Self::Throw { exception, .. } => write!(f, "throw {exception}"),
            Self::CaughtException { dest } => write!(f, "{dest} = caught"),
            Self::Conditional { lhs, rhs, equal } => {
                write!(f, "if {lhs} {} {rhs}", if *equal { "==" } else { "!=" })
            }
            Self::Compute { dest, operands } => {
                write!(f, "{dest} = compute(")?;
                for (i, op) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{op}")?;
                }
                write!(f, ")")
            }
            Self::Return { value: Some(v) } => write!(f, "return {v}"),
            Self::Return { value: None } => write!(f, "return"),
            Self::Goto => write!(f, "goto"),
        }
    }
}
