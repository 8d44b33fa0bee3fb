//! Nondouble-acceptance transform (`spec.md` §4.8 `Nda`).
//!
//! Every state is duplicated into an **active** and a **passive** copy so
//! that a marked string is accepted exactly once: visible transitions stay
//! (or become) active→active; λ-push/λ-pop transitions move an active,
//! marked source to its passive twin, but keep an active, unmarked source
//! active, and always keep a passive source passive.

use crate::automaton::{Pda, Provenance};
use std::collections::BTreeMap;

/// Apply the nondouble-acceptance transform to `pda`. `lambda` identifies
/// which event is the silent one (λ-push/λ-pop transitions).
pub fn nda(pda: &Pda, lambda: crate::automaton::Event) -> Pda {
    let mut out = Pda::new(pda.symbols().clone(), pda.stack_bottom());

    let mut active: BTreeMap<crate::automaton::State, crate::automaton::State> = BTreeMap::new();
    let mut passive: BTreeMap<crate::automaton::State, crate::automaton::State> = BTreeMap::new();

    for q in pda.states() {
        let a = out.add_state_with_provenance(Provenance::Annotation(q, "active".into()));
        let p = out.add_state_with_provenance(Provenance::Annotation(q, "passive".into()));
        active.insert(q, a);
        passive.insert(q, p);
    }

    for q in pda.states() {
        // Marking/initial flags are inherited by the active copy only.
        out.set_initial(active[&q], pda.is_initial(q));
        out.set_marked(active[&q], pda.is_marked(q));
    }

    for t in pda.transitions() {
        let is_read = t.event != lambda;
        if is_read {
            // Read transitions: active->active and passive->active.
            out.add_transition(active[&t.from], t.event, active[&t.to], t.op.clone());
            out.add_transition(passive[&t.from], t.event, active[&t.to], t.op.clone());
        } else {
            // λ-push/λ-pop: passive->passive always available; active
            // source crosses to passive if marked, else stays active.
            out.add_transition(passive[&t.from], t.event, passive[&t.to], t.op.clone());
            if pda.is_marked(t.from) {
                out.add_transition(active[&t.from], t.event, passive[&t.to], t.op.clone());
            } else {
                out.add_transition(active[&t.from], t.event, active[&t.to], t.op.clone());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, StackOp, SymbolTable};

    #[test]
    fn duplicates_every_state() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let z0 = syms.declare_stack_sym("z0");
        let mut pda = Pda::new(syms, z0);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q1, true);
        pda.add_transition(q0, a, q1, StackOp::nop());

        let out = nda(&pda, pda.symbols().lambda_event());
        assert_eq!(out.num_states(), 4);
    }
}
