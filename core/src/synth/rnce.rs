//! `Rnce`: remove non-controllable ears (`spec.md` §4.13f).

use super::split::SplitIndex;
use crate::automaton::{Automaton, Pda, State};
use std::collections::BTreeSet;

/// Delete every non-transient ear `(q, X)` at which some event that is
/// uncontrollable in the associated plant state is enabled in the plant but
/// has no matching outgoing transition leaving the ear. An ear is
/// transient (and therefore exempt) if it already has an outgoing
/// λ-transition.
///
/// `pre_split` is the pushdown automaton `split` was run on (so its
/// `Provenance::ProductPair` tags identify, for each original state, the
/// plant state `Times` paired it with); `plant` is the original DFA.
pub fn rnce(split_pda: &Pda, index: &SplitIndex, pre_split: &Pda, plant: &Automaton) -> Pda {
    let lambda = split_pda.symbols().lambda_event();

    let mut to_remove = BTreeSet::new();
    for (&(q, _x), &ear) in &index.ear_of {
        let is_transient = split_pda.transitions_from(ear).any(|t| t.event == lambda);
        if is_transient {
            continue;
        }

        let Some((p, _)) = pre_split.provenance(q).as_product_pair() else {
            continue;
        };

        let outgoing: BTreeSet<_> = split_pda.transitions_from(ear).map(|t| t.event).collect();

        for pt in plant.transitions_from(p) {
            if plant.symbols().event_attrs(pt.event).controllable() {
                continue;
            }
            let name = plant.symbols().event_name(pt.event);
            let Some(product_event) = split_pda.symbols().event_named(name) else {
                continue;
            };
            if !outgoing.contains(&product_event) {
                to_remove.insert(ear);
                break;
            }
        }
    }

    rebuild_without(split_pda, &to_remove)
}

fn rebuild_without(pda: &Pda, removed: &BTreeSet<State>) -> Pda {
    let mut out = Pda::new(pda.symbols().clone(), pda.stack_bottom());
    let mut remap = std::collections::BTreeMap::new();
    for q in pda.states() {
        if removed.contains(&q) {
            continue;
        }
        let s = out.add_state_with_provenance(pda.provenance(q).clone());
        out.set_initial(s, pda.is_initial(q));
        out.set_marked(s, pda.is_marked(q));
        remap.insert(q, s);
    }
    for t in pda.transitions() {
        if removed.contains(&t.from) || removed.contains(&t.to) {
            continue;
        }
        out.add_transition(remap[&t.from], t.event, remap[&t.to], t.op);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, Provenance, StackOp, SymbolTable};
    use crate::synth::split::split;
    use desflow_entity::EntityRef;

    #[test]
    fn ear_with_no_outlet_for_an_uncontrollable_event_is_removed() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");

        let mut plant = Automaton::new(syms.clone());
        let p0 = plant.add_state();
        let p1 = plant.add_state();
        plant.set_initial(p0, true);
        plant.add_transition(p0, a, p1);

        let mut pre_split = Pda::new(syms, bottom);
        let q0 = pre_split.add_state_with_provenance(Provenance::ProductPair(p0, State::new(0)));
        pre_split.set_initial(q0, true);
        // No outgoing `a` transition at all: the ear for q0 cannot offer it.

        let (split_pda, index) = split(&pre_split);
        let trimmed = rnce(&split_pda, &index, &pre_split, &plant);
        assert!(trimmed.num_states() < split_pda.num_states());
        let _ = StackOp::nop();
    }
}
