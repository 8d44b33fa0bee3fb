//! State merge annotations (DESIGN NOTES §9: "Polymorphic state merge
//! annotations").
//!
//! The original source tracks a state's ancestry through an abstract
//! `MergeAbstract*` pointer with several concrete subclasses. Per DESIGN
//! NOTES §9 we model that as a plain tagged union stored inline in the
//! state's attribute record; the back-pointers it carries are weak (by
//! index into a sibling automaton, never an owning reference).

use super::ids::{Event, StackSym, State};

/// A single transition, used by `TransitionRecord` to let `RebuildFromSPDA`
/// (`crate::pushdown::spda::rebuild_from_spda`) undo a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionKey {
    pub from: State,
    pub event: Event,
    pub to: State,
}

/// Where a state came from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// No recorded ancestry (states created directly by a caller).
    None,
    /// A generic (source-state, label) annotation, used by `SPDA`
    /// normalisation for the intermediate states it introduces.
    Annotation(State, String),
    /// An `(state, stack-symbol)` ear introduced by `Split` (`spec.md`
    /// §4.13c).
    SplitEar(State, StackSym),
    /// A head introduced by `Split`, with no associated stack symbol.
    SplitHead(State),
    /// A `(plant-state, spec-state)` pair introduced by `Times` (`spec.md`
    /// §4.14).
    ProductPair(State, State),
    /// The original transition an `SPDA`-introduced intermediate state
    /// stands in for, used to undo the split in `RebuildFromSPDA`.
    TransitionRecord(TransitionKey),
}

impl Default for Provenance {
    fn default() -> Self {
        Provenance::None
    }
}

impl Provenance {
    /// The plant/spec pair this state came from, if it was produced by `Times`.
    pub fn as_product_pair(&self) -> Option<(State, State)> {
        match self {
            Provenance::ProductPair(p, q) => Some((*p, *q)),
            _ => None,
        }
    }

    /// The `(state, stack-symbol)` this state came from, if it is a `Split` ear.
    pub fn as_split_ear(&self) -> Option<(State, StackSym)> {
        match self {
            Provenance::SplitEar(q, x) => Some((*q, *x)),
            _ => None,
        }
    }

    /// The originating state, if this is a `Split` head.
    pub fn as_split_head(&self) -> Option<State> {
        match self {
            Provenance::SplitHead(q) => Some(*q),
            _ => None,
        }
    }
}
