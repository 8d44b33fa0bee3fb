//! `MergeAdjacentTransitions` (`spec.md` §4.16).

use crate::automaton::{Pda, StackOp, StackSym};

/// Can `t1 = (q1, ev1, qm, pop1, push1)` followed by `t2 = (qm, ev2, q2,
/// pop2, push2)` collapse into one transition through `qm`?
fn mergeable(pda: &Pda, qm: crate::automaton::State, incoming: usize) -> bool {
    if pda.is_marked(qm) || pda.is_initial(qm) || incoming != 1 {
        return false;
    }
    let outgoing: Vec<_> = pda.transitions_from(qm).collect();
    if outgoing.is_empty() {
        return false;
    }
    if outgoing.iter().any(|t| t.to == qm) {
        return false;
    }
    true
}

fn residue(a: &[StackSym], b: &[StackSym]) -> Option<(Vec<StackSym>, Vec<StackSym>)> {
    let n = a.len().min(b.len());
    if a[..n] == b[..n] {
        Some((a[n..].to_vec(), b[n..].to_vec()))
    } else {
        None
    }
}

/// One merge pass: find a mergeable pair through some non-marked,
/// non-initial state with exactly one incoming transition and collapse it;
/// returns `true` if a merge happened, so the caller can loop until stable.
pub fn merge_adjacent_transitions(pda: &mut Pda) -> bool {
    let lambda = pda.symbols().lambda_event();

    let mut incoming_count = std::collections::BTreeMap::new();
    for t in pda.transitions() {
        *incoming_count.entry(t.to).or_insert(0usize) += 1;
    }

    for qm in pda.states().collect::<Vec<_>>() {
        let incoming = *incoming_count.get(&qm).unwrap_or(&0);
        if !mergeable(pda, qm, incoming) {
            continue;
        }
        let Some(t1) = pda.transitions().find(|t| t.to == qm) else {
            continue;
        };
        let outgoing_all_lambda = pda.transitions_from(qm).all(|t| t.event == lambda);
        if t1.event != lambda && !outgoing_all_lambda {
            continue;
        }
        let Some(t2) = pda.transitions_from(qm).next() else {
            continue;
        };

        let (extra_pop2, extra_push1) = match residue(&t1.op.push, &t2.op.pop) {
            Some(r) => r,
            None => match residue(&t2.op.pop, &t1.op.push) {
                Some((p2, p1)) => (p2, p1),
                None => continue,
            },
        };

        let mut pop3 = t1.op.pop.clone();
        pop3.extend(extra_pop2);
        let mut push3 = t2.op.push.clone();
        push3.extend(extra_push1);

        let ev3 = if t1.event != lambda { t1.event } else { t2.event };
        let q1 = t1.from;
        let q2 = t2.to;

        pda.remove_triple(t1.from, t1.event, t1.to);
        pda.remove_triple(t2.from, t2.event, t2.to);
        pda.add_transition(q1, ev3, q2, StackOp::new(pop3, push3));
        return true;
    }

    false
}

/// Repeat `merge_adjacent_transitions` until no candidate remains.
pub fn merge_until_stable(pda: &mut Pda) {
    while merge_adjacent_transitions(pda) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};

    #[test]
    fn chain_through_a_transient_state_collapses() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let lambda = syms.lambda_event();
        let bottom = syms.declare_stack_sym("bot");
        let x = syms.declare_stack_sym("x");

        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        let qm = pda.add_state();
        let q2 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q2, true);

        pda.add_transition(q0, a, qm, StackOp::new(vec![bottom], vec![x, bottom]));
        pda.add_transition(qm, lambda, q2, StackOp::new(vec![x], vec![]));

        merge_until_stable(&mut pda);
        assert_eq!(pda.num_triples(), 1);
        assert_eq!(pda.transitions().next().unwrap().from, q0);
        assert_eq!(pda.transitions().next().unwrap().to, q2);
    }
}
