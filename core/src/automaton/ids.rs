//! Dense entity references for the automaton model (`spec.md` §3.1).

use desflow_entity::entity_impl;

/// A state of an `Automaton` or `Pda`. Numbered `0..N`; index `0` has no
/// special meaning at this layer (the bisimulation engine's own sentinel
/// convention lives in `crate::bisim::encode` and is a translation detail).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State(u32);
entity_impl!(State, "q");

/// An event, drawn from a process-wide symbol table in the original source;
/// here, from the `SymbolTable` a caller builds explicitly and shares
/// between automata that are meant to interoperate (see DESIGN.md).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event(u32);
entity_impl!(Event, "e");

/// A stack symbol of a pushdown automaton's stack alphabet.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackSym(u32);
entity_impl!(StackSym, "z");

/// The index reserved for the silent event `λ`/`τ` within a `SymbolTable`.
/// Stable and shared across every automaton built from that table, per
/// `spec.md` §3.1's invariant.
pub const LAMBDA_EVENT: Event = Event::new_const(0);

/// The index reserved for the "no-op" stack symbol `λ`.
pub const LAMBDA_STACK: StackSym = StackSym::new_const(0);

impl Event {
    /// `const fn` sibling of `EntityRef::new`, used for the `LAMBDA_EVENT` constant.
    const fn new_const(index: u32) -> Self {
        Event(index)
    }

    /// Is this the distinguished silent event?
    pub fn is_lambda(self) -> bool {
        self == LAMBDA_EVENT
    }
}

impl StackSym {
    const fn new_const(index: u32) -> Self {
        StackSym(index)
    }

    /// Is this the distinguished "no stack change" symbol?
    pub fn is_lambda(self) -> bool {
        self == LAMBDA_STACK
    }
}
