//! The pushdown-automaton model (`spec.md` §3.1).

use super::ids::{Event, StackSym, State};
use super::provenance::Provenance;
use super::symbols::SymbolTable;
use super::transition::{PdOps, PdTransition, StackOp};
use desflow_entity::PrimaryMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct StateInfo {
    initial: bool,
    marked: bool,
    provenance: Provenance,
}

/// A (not necessarily simple) pushdown automaton: states, a single stack
/// alphabet with a distinguished bottom symbol, and a pop/push-set-valued
/// transition relation (`spec.md` §3.1).
#[derive(Debug, Clone)]
pub struct Pda {
    symbols: SymbolTable,
    states: PrimaryMap<State, StateInfo>,
    transitions: BTreeMap<(State, Event, State), PdOps>,
    stack_bottom: StackSym,
}

impl Pda {
    pub fn new(symbols: SymbolTable, stack_bottom: StackSym) -> Self {
        Self {
            symbols,
            states: PrimaryMap::new(),
            transitions: BTreeMap::new(),
            stack_bottom,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn stack_bottom(&self) -> StackSym {
        self.stack_bottom
    }

    pub fn add_state(&mut self) -> State {
        self.states.push(StateInfo::default())
    }

    pub fn add_state_with_provenance(&mut self, provenance: Provenance) -> State {
        self.states.push(StateInfo {
            provenance,
            ..StateInfo::default()
        })
    }

    pub fn provenance(&self, q: State) -> &Provenance {
        &self.states[q].provenance
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.states.keys()
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn is_initial(&self, q: State) -> bool {
        self.states[q].initial
    }

    pub fn set_initial(&mut self, q: State, value: bool) {
        self.states[q].initial = value;
    }

    pub fn is_marked(&self, q: State) -> bool {
        self.states[q].marked
    }

    pub fn set_marked(&mut self, q: State, value: bool) {
        self.states[q].marked = value;
    }

    pub fn initial_states(&self) -> impl Iterator<Item = State> + '_ {
        self.states().filter(move |&q| self.is_initial(q))
    }

    pub fn marked_states(&self) -> impl Iterator<Item = State> + '_ {
        self.states().filter(move |&q| self.is_marked(q))
    }

    /// Add one alternative `StackOp` to the `(from, event, to)` triple,
    /// creating the triple's pop/push set if this is its first member.
    pub fn add_transition(&mut self, from: State, event: Event, to: State, op: StackOp) -> bool {
        self.transitions
            .entry((from, event, to))
            .or_default()
            .insert(op)
    }

    /// The pop/push set for one triple, if any transition uses it.
    pub fn ops(&self, from: State, event: Event, to: State) -> Option<&PdOps> {
        self.transitions.get(&(from, event, to))
    }

    /// Remove an entire triple (used by grammar-cleanup-style passes that
    /// drop whole transitions rather than individual `StackOp`s).
    pub fn remove_triple(&mut self, from: State, event: Event, to: State) -> Option<PdOps> {
        self.transitions.remove(&(from, event, to))
    }

    /// All transitions, flattened to one `PdTransition` per `(triple, op)` pair.
    pub fn transitions(&self) -> impl Iterator<Item = PdTransition> + '_ {
        self.transitions.iter().flat_map(|(&(from, event, to), ops)| {
            ops.iter().map(move |op| PdTransition {
                from,
                event,
                to,
                op: op.clone(),
            })
        })
    }

    pub fn num_triples(&self) -> usize {
        self.transitions.len()
    }

    /// Transitions leaving `q`, regardless of stack operation.
    pub fn transitions_from(&self, q: State) -> impl Iterator<Item = PdTransition> + '_ {
        self.transitions().filter(move |t| t.from == q)
    }

    /// Is every triple's `StackOp` set simple (`spec.md` §4.6/§8.1 invariant
    /// 3: at most one pop and at most one push per transition)?
    pub fn is_simple(&self) -> bool {
        self.transitions.values().all(|ops| ops.iter().all(StackOp::is_simple))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::attrs::Attrs;

    #[test]
    fn add_and_flatten_transitions() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let z0 = syms.declare_stack_sym("z0");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        let op = StackOp::new(vec![z0], vec![z0, z0]);
        assert!(pda.add_transition(q0, a, q1, op.clone()));
        assert!(!pda.add_transition(q0, a, q1, op));
        assert_eq!(pda.num_triples(), 1);
        assert_eq!(pda.transitions().count(), 1);
        assert!(pda.is_simple());
    }
}
