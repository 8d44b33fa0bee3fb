//! A packed `Option<T>` replacement for types with a reserved "null" value.

use core::fmt;

/// Types that can reserve a sentinel value to represent `None` without the
/// extra discriminant `Option<T>` would otherwise need.
pub trait ReservedValue {
    /// Create an instance of the reserved value.
    fn reserved_value() -> Self;

    /// Check whether `self` is the reserved value.
    fn is_reserved_value(&self) -> bool;
}

/// Optional value stored without an extra discriminant, at the cost of one
/// reserved value of `T`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PackedOption<T: ReservedValue>(T);

impl<T: ReservedValue> PackedOption<T> {
    /// Is this `None`?
    pub fn is_none(&self) -> bool {
        self.0.is_reserved_value()
    }

    /// Is this `Some`?
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Expand into a full `Option`.
    pub fn expand(self) -> Option<T> {
        if self.is_none() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl<T: ReservedValue> Default for PackedOption<T> {
    fn default() -> Self {
        Self(T::reserved_value())
    }
}

impl<T: ReservedValue> From<T> for PackedOption<T> {
    fn from(t: T) -> Self {
        debug_assert!(!t.is_reserved_value(), "cannot pack the reserved value");
        Self(t)
    }
}

impl<T: ReservedValue> From<Option<T>> for PackedOption<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(t) => t.into(),
            None => Self::default(),
        }
    }
}

impl<T: ReservedValue> From<PackedOption<T>> for Option<T> {
    fn from(packed: PackedOption<T>) -> Self {
        packed.expand()
    }
}

impl<T: ReservedValue + fmt::Debug> fmt::Debug for PackedOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.expand() {
            Some(t) => write!(f, "Some({:?})", t),
            None => write!(f, "None"),
        }
    }
}
