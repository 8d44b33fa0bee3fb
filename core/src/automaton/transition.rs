//! Transitions (`spec.md` §3.1).

use super::ids::{Event, StackSym, State};
use std::collections::BTreeSet;

/// A finite-automaton transition: an ordered triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Transition {
    pub from: State,
    pub event: Event,
    pub to: State,
}

impl Transition {
    pub fn new(from: State, event: Event, to: State) -> Self {
        Self { from, event, to }
    }
}

/// A single pop/push alternative of a pushdown transition: stack symbols
/// read top-first. An empty vector denotes the distinguished "no-op" symbol
/// `λ` was used explicitly by the caller; `StackOp::nop()` is the common
/// case of popping nothing and pushing nothing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackOp {
    pub pop: Vec<StackSym>,
    pub push: Vec<StackSym>,
}

impl StackOp {
    pub fn new(pop: Vec<StackSym>, push: Vec<StackSym>) -> Self {
        Self { pop, push }
    }

    /// Neither pops nor pushes (used by plain "read" transitions lifted
    /// into pushdown form, and by `Times` when copying a plant transition).
    pub fn nop() -> Self {
        Self {
            pop: Vec::new(),
            push: Vec::new(),
        }
    }

    pub fn is_nop(&self) -> bool {
        self.pop.is_empty() && self.push.is_empty()
    }

    /// `spec.md` §4.6 "read" shape: non-λ event, pop equals push.
    pub fn is_read_shape(&self) -> bool {
        self.pop == self.push
    }

    /// `spec.md` §4.6 "pop one" shape: `pop=[a], push=[]`.
    pub fn is_pop_one(&self) -> bool {
        self.pop.len() == 1 && self.push.is_empty()
    }

    /// `spec.md` §4.6 "push one on top" shape: `pop=[a], push=[b,a]`.
    pub fn is_push_one_on_top(&self) -> bool {
        self.push.len() == self.pop.len() + 1 && self.push[1..] == self.pop[..]
    }

    /// A *simple* pushdown transition uses exactly one of {read, pop-one,
    /// push-one-on-top, λ-no-op} (`spec.md` §4.6/§8.1 invariant 3).
    pub fn is_simple(&self) -> bool {
        self.is_nop() || self.is_pop_one() || self.is_push_one_on_top() || self.is_read_shape()
    }
}

/// The non-empty pop/push set attached to one `(from, event, to)` triple of
/// a pushdown automaton (`spec.md` §3.1: "pop/push set — each element is a
/// pair"). Represented as the set of alternative `StackOp`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdOps(BTreeSet<StackOp>);

impl PdOps {
    pub fn single(op: StackOp) -> Self {
        let mut s = BTreeSet::new();
        s.insert(op);
        Self(s)
    }

    pub fn insert(&mut self, op: StackOp) -> bool {
        self.0.insert(op)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend_from(&mut self, other: &PdOps) {
        self.0.extend(other.0.iter().cloned());
    }
}

/// A fully expanded pushdown transition (one triple, one `StackOp`); the
/// shape most algorithms in `crate::pushdown` and `crate::synth` iterate
/// over, produced by flattening a `Pda`'s `(triple -> PdOps)` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdTransition {
    pub from: State,
    pub event: Event,
    pub to: State,
    pub op: StackOp,
}
