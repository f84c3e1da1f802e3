//! Heterogeneous value stack threaded through parser combinators.
//!
//! The stack grows by prepending, so after parsing `a b c` in sequence the
//! value is `HCons(c, HCons(b, HCons(a, HNil)))` and every element keeps its
//! own static type.

/// The empty stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HNil;

/// A value on top of the stack `tail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HCons<H, T> {
    pub head: H,
    pub tail: T,
}

impl<H, T> HCons<H, T> {
    pub fn new(head: H, tail: T) -> Self {
        HCons { head, tail }
    }

    pub fn push<V>(self, value: V) -> HCons<V, Self> {
        HCons::new(value, self)
    }

    /// Split into the top value and the rest of the stack.
    pub fn pop(self) -> (H, T) {
        (self.head, self.tail)
    }
}

impl HNil {
    pub fn push<V>(self, value: V) -> HCons<V, HNil> {
        HCons::new(value, self)
    }
}
