//! `Split`: duplicate every state into a head and one ear per non-λ stack
//! symbol (`spec.md` §4.13c).

use crate::automaton::{Pda, Provenance, StackOp, State, StackSym};
use std::collections::BTreeMap;

/// The head/ear states `split` produced for one original state, plus a
/// reverse index so `crate::synth::rnce` can find a state's original.
pub struct SplitIndex {
    pub head_of: BTreeMap<State, State>,
    pub ear_of: BTreeMap<(State, StackSym), State>,
    pub original_of: BTreeMap<State, State>,
}

/// `Split(pda)`: every original state `q` becomes a head (no associated
/// stack symbol) and, for every non-λ stack symbol `X`, an ear `(q, X)`.
/// Original transitions become head→ear (a λ-read that pops and pushes the
/// same symbol `X`, modelling "this ear is active while `X` is on top") or
/// ear→head (the original pop/push, once the relevant symbol has been
/// confirmed on top). Initial states become initial heads; marked states
/// become marked at every one of their ears.
pub fn split(pda: &Pda) -> (Pda, SplitIndex) {
    let symbols = pda.symbols().clone();
    let mut out = Pda::new(symbols, pda.stack_bottom());
    let lambda = out.symbols().lambda_event();

    let stack_syms: Vec<StackSym> = pda
        .symbols()
        .all_stack_syms()
        .filter(|s| !s.is_lambda())
        .collect();

    let mut index = SplitIndex {
        head_of: BTreeMap::new(),
        ear_of: BTreeMap::new(),
        original_of: BTreeMap::new(),
    };

    for q in pda.states() {
        let head = out.add_state_with_provenance(Provenance::SplitHead(q));
        out.set_initial(head, pda.is_initial(q));
        index.head_of.insert(q, head);
        index.original_of.insert(head, q);

        for &x in &stack_syms {
            let ear = out.add_state_with_provenance(Provenance::SplitEar(q, x));
            out.set_marked(ear, pda.is_marked(q));
            index.ear_of.insert((q, x), ear);
            index.original_of.insert(ear, q);

            // Head is active whenever X could be on top; enter the ear
            // by confirming X without disturbing the stack.
            out.add_transition(head, lambda, ear, StackOp::new(vec![x], vec![x]));
        }
    }

    for t in pda.transitions() {
        for &x in &stack_syms {
            if let Some(&from_ear) = index.ear_of.get(&(t.from, x)) {
                let to_head = index.head_of[&t.to];
                out.add_transition(from_ear, t.event, to_head, t.op.clone());
            }
        }
    }

    (out, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};

    #[test]
    fn every_state_gets_a_head_and_one_ear_per_stack_symbol() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");
        let x = syms.declare_stack_sym("x");

        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q1, true);
        pda.add_transition(q0, a, q1, StackOp::new(vec![x], vec![]));

        let (out, index) = split(&pda);
        // 2 originals * (1 head + 2 non-lambda stack syms) = 6 states.
        assert_eq!(out.num_states(), 6);
        assert_eq!(index.ear_of.len(), 4);
        assert_eq!(out.initial_states().count(), 1);
    }
}
