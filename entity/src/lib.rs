//! Densely numbered entity references as mapping keys.
//!
//! The automaton, grammar, and LR(1) models all index their own flavor of
//! object (state, event, stack symbol, nonterminal, configuration set) by a
//! small dense integer rather than a pointer. This crate is the shared
//! vocabulary for that pattern: the [`EntityRef`] trait plus the map/set
//! types built on top of it.
//!
//! Index `0` is reserved as a sentinel throughout the core crate (see
//! `desflow_core::bisim::encode`), so every `EntityRef` implementor should
//! treat `0` as a valid but otherwise unremarkable index; callers that need
//! a sentinel allocate it explicitly rather than relying on a magic value
//! baked into this crate.

mod iter;
mod keys;
mod map;
mod packed_option;
mod primary;
mod set;

pub use iter::{Iter, IterMut};
pub use keys::Keys;
pub use map::SecondaryMap;
pub use packed_option::{PackedOption, ReservedValue};
pub use primary::PrimaryMap;
pub use set::EntitySet;

/// A type that can be used as a dense entity reference.
///
/// Implementors wrap a `u32` index into some table. The blanket
/// `entity_impl!` macro below generates the boilerplate for a newtype.
pub trait EntityRef: Copy + Eq {
    /// Create a new entity reference from a linear index.
    fn new(index: usize) -> Self;

    /// Get the index of this reference.
    fn index(self) -> usize;
}

/// Generate boilerplate for a struct implementing [`EntityRef`].
///
/// ```ignore
/// pub struct State(u32);
/// entity_impl!(State, "q");
/// ```
///
/// generates `Debug`/`Display` impls rendering `q0`, `q1`, ... along with
/// the `EntityRef` implementation and a reserved `u32::MAX` "null" value.
#[macro_export]
macro_rules! entity_impl {
    ($entity:ident, $display_prefix:expr) => {
        impl $crate::EntityRef for $entity {
            #[inline]
            fn new(index: usize) -> Self {
                debug_assert!(index < (u32::MAX as usize));
                $entity(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl $crate::packed_option::ReservedValue for $entity {
            #[inline]
            fn reserved_value() -> Self {
                $entity(u32::MAX)
            }

            #[inline]
            fn is_reserved_value(&self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl ::core::fmt::Display for $entity {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                write!(f, concat!($display_prefix, "{}"), self.0)
            }
        }

        impl ::core::fmt::Debug for $entity {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                (self as &dyn ::core::fmt::Display).fmt(f)
            }
        }
    };

    ($entity:ident, $display_prefix:expr, $additional_derive:ty) => {
        entity_impl!($entity, $display_prefix);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq)]
    struct E(u32);
    entity_impl!(E, "e");

    #[test]
    fn display_and_index() {
        let e = E::new(3);
        assert_eq!(e.index(), 3);
        assert_eq!(format!("{}", e), "e3");
    }
}
