//! Topological sort over a selected event subset (`spec.md` §4.1).
//!
//! Used by `crate::bisim` to forbid τ-loops before running the delayed/weak
//! variants, and generally useful wherever an algorithm needs a
//! cycle-detecting DFS order over a subgraph of an `Automaton`.

use crate::automaton::{Automaton, Event, State};
use crate::error::{Error, Result};
use std::collections::HashSet;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Temporary,
    Permanent,
}

/// Sort `automaton`'s states with respect to the sub-relation induced by
/// `events`: an edge `x1 -> x2` exists iff some transition `(x1, e, x2)`
/// with `e` in `events` exists.
///
/// Returns the states in an order such that for any `x` appearing before
/// `y`, no `events`-path from `y` to `x` exists. Fails with
/// [`Error::tau_loop`] if the induced subgraph has a cycle (the caller
/// passing a silent-event singleton set is the common case, hence the
/// error helper's name).
pub fn topo_sort(automaton: &Automaton, events: &HashSet<Event>) -> Result<Vec<State>> {
    let mut marks: std::collections::HashMap<State, Mark> = std::collections::HashMap::new();
    let mut result = Vec::with_capacity(automaton.num_states());

    for start in automaton.states() {
        if marks.contains_key(&start) {
            continue;
        }
        visit(automaton, events, start, &mut marks, &mut result)?;
    }

    result.reverse();
    Ok(result)
}

fn visit(
    automaton: &Automaton,
    events: &HashSet<Event>,
    node: State,
    marks: &mut std::collections::HashMap<State, Mark>,
    result: &mut Vec<State>,
) -> Result<()> {
    match marks.get(&node) {
        Some(Mark::Permanent) => return Ok(()),
        Some(Mark::Temporary) => return Err(Error::tau_loop()),
        None => {}
    }

    marks.insert(node, Mark::Temporary);
    for t in automaton.transitions_from(node) {
        if events.contains(&t.event) {
            visit(automaton, events, t.to, marks, result)?;
        }
    }
    marks.insert(node, Mark::Permanent);
    result.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};

    #[test]
    fn sorts_a_dag() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        let q2 = g.add_state();
        g.add_transition(q0, a, q1);
        g.add_transition(q1, a, q2);

        let events: HashSet<Event> = [a].into_iter().collect();
        let order = topo_sort(&g, &events).unwrap();
        let pos = |q: State| order.iter().position(|&x| x == q).unwrap();
        assert!(pos(q0) < pos(q1));
        assert!(pos(q1) < pos(q2));
    }

    #[test]
    fn detects_cycle() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        g.add_transition(q0, a, q1);
        g.add_transition(q1, a, q0);

        let events: HashSet<Event> = [a].into_iter().collect();
        assert!(topo_sort(&g, &events).is_err());
    }
}
