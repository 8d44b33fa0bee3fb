//! Pushdown trimming (`spec.md` §4.7 `PushdownTrim`).

use crate::automaton::{Automaton, Event, Pda, StackSym, State};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Trim `automaton` to its accessible ∩ coaccessible part (the `n = 0`
/// variant: ordinary finite-automaton trim, ignoring the stack entirely).
pub fn trim_finite(automaton: &Automaton) -> Automaton {
    let accessible = accessible_states(automaton);
    let coaccessible = coaccessible_states(automaton);
    let keep: BTreeSet<State> = accessible.intersection(&coaccessible).copied().collect();
    rebuild_finite(automaton, &keep)
}

fn accessible_states(automaton: &Automaton) -> BTreeSet<State> {
    let mut seen: BTreeSet<State> = automaton.initial_states().collect();
    let mut queue: VecDeque<State> = seen.iter().copied().collect();
    while let Some(q) = queue.pop_front() {
        for t in automaton.transitions_from(q) {
            if seen.insert(t.to) {
                queue.push_back(t.to);
            }
        }
    }
    seen
}

fn coaccessible_states(automaton: &Automaton) -> BTreeSet<State> {
    let mut reverse: BTreeMap<State, Vec<State>> = BTreeMap::new();
    for t in automaton.transitions() {
        reverse.entry(t.to).or_default().push(t.from);
    }
    let mut seen: BTreeSet<State> = automaton.marked_states().collect();
    let mut queue: VecDeque<State> = seen.iter().copied().collect();
    while let Some(q) = queue.pop_front() {
        if let Some(preds) = reverse.get(&q) {
            for &p in preds {
                if seen.insert(p) {
                    queue.push_back(p);
                }
            }
        }
    }
    seen
}

fn rebuild_finite(automaton: &Automaton, keep: &BTreeSet<State>) -> Automaton {
    let mut out = Automaton::new(automaton.symbols().clone());
    let mut remap: BTreeMap<State, State> = BTreeMap::new();
    for &q in keep {
        let new_q = out.add_state_with_provenance(automaton.provenance(q).clone());
        out.set_initial(new_q, automaton.is_initial(q));
        out.set_marked(new_q, automaton.is_marked(q));
        remap.insert(q, new_q);
    }
    for t in automaton.transitions() {
        if let (Some(&from), Some(&to)) = (remap.get(&t.from), remap.get(&t.to)) {
            out.add_transition(from, t.event, to);
        }
    }
    out
}

/// Stack-bounded reachability trim, look-ahead `n >= 1` (`spec.md` §4.7).
/// A reachable configuration is `(state, stack-prefix)` with the prefix
/// truncated to `n` symbols; the set of transitions actually usable from
/// some reachable configuration becomes the new relation, then `n = 0`
/// trim is applied to the finite skeleton.
pub fn trim_lookahead(pda: &Pda, n: usize, bottom: StackSym) -> Pda {
    assert!(n >= 1, "n = 0 uses trim_finite on the underlying skeleton");

    let mut visited: BTreeSet<(State, Vec<StackSym>)> = BTreeSet::new();
    let mut used_triples: BTreeSet<(State, Event, State)> = BTreeSet::new();
    let mut used_stack_syms: BTreeSet<StackSym> = BTreeSet::new();

    let mut queue = VecDeque::new();
    for q in pda.initial_states() {
        let start = (q, vec![bottom]);
        if visited.insert(start.clone()) {
            queue.push_back(start);
        }
    }

    while let Some((q, stack)) = queue.pop_front() {
        for t in pda.transitions_from(q) {
            let k = n.min(t.op.pop.len());
            if k > stack.len() {
                continue;
            }
            if stack[..k] != t.op.pop[..k] {
                continue;
            }
            used_triples.insert((t.from, t.event, t.to));
            for &z in &t.op.pop {
                used_stack_syms.insert(z);
            }
            for &z in &t.op.push {
                used_stack_syms.insert(z);
            }

            let mut new_stack: Vec<StackSym> = t.op.push.iter().take(n).copied().collect();
            let residue = &stack[t.op.pop.len().min(stack.len())..];
            for &z in residue {
                if new_stack.len() >= n {
                    break;
                }
                new_stack.push(z);
            }
            new_stack.truncate(n);

            let next = (t.to, new_stack);
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    let visited_states: BTreeSet<State> = visited.iter().map(|(q, _)| *q).collect();

    let mut out = Pda::new(pda.symbols().clone(), bottom);
    let mut remap: BTreeMap<State, State> = BTreeMap::new();
    for &q in &visited_states {
        let new_q = out.add_state_with_provenance(pda.provenance(q).clone());
        out.set_initial(new_q, pda.is_initial(q));
        out.set_marked(new_q, pda.is_marked(q));
        remap.insert(q, new_q);
    }
    for t in pda.transitions() {
        if !used_triples.contains(&(t.from, t.event, t.to)) {
            continue;
        }
        if let (Some(&from), Some(&to)) = (remap.get(&t.from), remap.get(&t.to)) {
            out.add_transition(from, t.event, to, t.op);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable, StackOp};

    #[test]
    fn finite_trim_drops_unreachable_and_dead() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        let dead = g.add_state();
        let unreachable = g.add_state();
        g.set_initial(q0, true);
        g.set_marked(q1, true);
        g.add_transition(q0, a, q1);
        g.add_transition(q0, a, dead);
        g.add_transition(unreachable, a, q1);

        let trimmed = trim_finite(&g);
        assert_eq!(trimmed.num_states(), 2);
    }

    #[test]
    fn lookahead_trim_respects_stack_prefix() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let z0 = syms.declare_stack_sym("z0");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q1, true);
        pda.add_transition(q0, a, q1, StackOp::new(vec![z0], vec![z0, z0]));

        let trimmed = trim_lookahead(&pda, 1, z0);
        assert_eq!(trimmed.num_states(), 2);
    }
}
