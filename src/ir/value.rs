//! SSA value numbers.

use std::fmt;

/// A dense, non-negative identifier for a value produced in a method.
///
/// Value numbers are 1-based: `v0` is reserved, parameters occupy
/// `v1..=vP`, and every later definition (instruction results, φ and π
/// results, interned constants) takes the next free number. The symbol
/// table reports the maximum number in use, which sizes the per-block
/// analysis state.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueNum(usize);

impl ValueNum {
    /// Creates a value number from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ValueNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for ValueNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_index() {
        let v = ValueNum::new(7);
        assert_eq!(v.index(), 7);
        assert_eq!(format!("{v}"), "v7");
    }
}
