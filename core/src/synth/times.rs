//! `Times`: the plant/candidate product construction (`spec.md` §4.14) and
//! `IntersectEvents`/event-attribute conjunction (§4.15).

use crate::automaton::{Automaton, Event, Pda, Provenance, State};
use std::collections::BTreeMap;

/// `Times(plant, pda)`: the product automaton over the plant's finite
/// alphabet and the PDA's pushdown alphabet. Events are matched by name
/// (`crate::automaton::symbols`: operands need not share a `SymbolTable`
/// instance); only events named in both survive into the product, each
/// with conjoined controllable/observable attributes (§4.15).
pub fn times(plant: &Automaton, pda: &Pda) -> Pda {
    let mut out_symbols = pda.symbols().clone();
    let lambda = out_symbols.lambda_event();

    // pda event -> plant event, for every name shared by both alphabets.
    let mut pda_to_plant_event: BTreeMap<Event, Event> = BTreeMap::new();
    for p_ev in plant_events(plant) {
        let name = plant.symbols().event_name(p_ev);
        if let Some(pda_ev) = pda.symbols().event_named(name) {
            let conjoined = plant
                .symbols()
                .event_attrs(p_ev)
                .intersect(pda.symbols().event_attrs(pda_ev));
            out_symbols.set_event_attrs(pda_ev, conjoined);
            pda_to_plant_event.insert(pda_ev, p_ev);
        }
    }

    let mut out = Pda::new(out_symbols, pda.stack_bottom());
    let mut pair_state: BTreeMap<(State, State), State> = BTreeMap::new();

    for p in plant.states() {
        for q in pda.states() {
            let s = out.add_state_with_provenance(Provenance::ProductPair(p, q));
            out.set_initial(s, plant.is_initial(p) && pda.is_initial(q));
            out.set_marked(s, plant.is_marked(p) && pda.is_marked(q));
            pair_state.insert((p, q), s);
        }
    }

    for t in pda.transitions() {
        if t.event == lambda {
            for p in plant.states() {
                let from = pair_state[&(p, t.from)];
                let to = pair_state[&(p, t.to)];
                out.add_transition(from, lambda, to, t.op.clone());
            }
        } else if let Some(&p_ev) = pda_to_plant_event.get(&t.event) {
            for pt in plant.transitions().filter(|pt| pt.event == p_ev) {
                let from = pair_state[&(pt.from, t.from)];
                let to = pair_state[&(pt.to, t.to)];
                out.add_transition(from, t.event, to, t.op.clone());
            }
        }
    }

    out
}

fn plant_events(plant: &Automaton) -> Vec<Event> {
    let mut seen = std::collections::BTreeSet::new();
    for t in plant.transitions() {
        seen.insert(t.event);
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, StackOp, SymbolTable};

    #[test]
    fn product_keeps_only_shared_events_and_conjoins_initial_marked() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT.with_controllable(true));
        let bottom = syms.declare_stack_sym("bot");

        let mut plant = Automaton::new(syms.clone());
        let p0 = plant.add_state();
        let p1 = plant.add_state();
        plant.set_initial(p0, true);
        plant.set_marked(p1, true);
        plant.add_transition(p0, a, p1);

        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q1, true);
        pda.add_transition(q0, a, q1, StackOp::nop());

        let product = times(&plant, &pda);
        assert_eq!(product.num_states(), 4);
        assert_eq!(product.initial_states().count(), 1);
        assert_eq!(product.marked_states().count(), 1);
        assert_eq!(product.transitions().count(), 1);
    }
}
