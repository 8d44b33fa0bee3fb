//! The finite-automaton model (`spec.md` §3.1).

use super::ids::{Event, State};
use super::provenance::Provenance;
use super::symbols::SymbolTable;
use super::transition::Transition;
use desflow_entity::PrimaryMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
struct StateInfo {
    initial: bool,
    marked: bool,
    provenance: Provenance,
}

/// A finite automaton: states, transitions, and a marking, over events drawn
/// from a caller-supplied `SymbolTable` (`spec.md` §3.1, §3.2).
#[derive(Debug, Clone)]
pub struct Automaton {
    symbols: SymbolTable,
    states: PrimaryMap<State, StateInfo>,
    transitions: BTreeSet<Transition>,
}

impl Automaton {
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            states: PrimaryMap::new(),
            transitions: BTreeSet::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Add a fresh state, neither initial nor marked.
    pub fn add_state(&mut self) -> State {
        self.states.push(StateInfo::default())
    }

    /// Add a fresh state with the given provenance (used by algorithms that
    /// create derived states, e.g. `Times`, `Split`).
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

    /// Insert a transition, returning `false` if it was already present.
    pub fn add_transition(&mut self, from: State, event: Event, to: State) -> bool {
        self.transitions.insert(Transition::new(from, event, to))
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Transitions leaving `q`, in `(event, to)` order.
    pub fn transitions_from(&self, q: State) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .range(
                Transition::new(q, Event::new(0), State::new(0))
                    ..Transition::new(State::new(q.index() + 1), Event::new(0), State::new(0)),
            )
            .filter(move |t| t.from == q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::attrs::Attrs;

    #[test]
    fn add_states_and_transitions() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        g.set_initial(q0, true);
        g.set_marked(q1, true);
        assert!(g.add_transition(q0, a, q1));
        assert!(!g.add_transition(q0, a, q1));
        assert_eq!(g.num_transitions(), 1);
        assert_eq!(g.initial_states().collect::<Vec<_>>(), vec![q0]);
        assert_eq!(g.marked_states().collect::<Vec<_>>(), vec![q1]);
    }
}
