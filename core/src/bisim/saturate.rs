//! Saturation alternative to direct delayed/weak bisimulation (`spec.md`
//! §4.5): extend the transition relation until closed under τ-prefix/suffix
//! insertion, install τ-self-loops, then defer to the strong-bisimulation
//! engine. Slower, but a useful cross-check of the direct algorithm.

use super::delayed_weak::Variant;
use super::strong::strong_bisimulation;
use crate::automaton::{Automaton, Event, State};
use crate::cancel::Canceller;
use crate::error::Result;
use std::collections::BTreeSet;

/// Build the saturated automaton for `variant` and run strong bisimulation
/// over it.
pub fn saturated_bisimulation(
    automaton: &Automaton,
    silent: Event,
    variant: Variant,
    pre_partition: Option<&[Vec<State>]>,
    canceller: &dyn Canceller,
) -> Result<Vec<Vec<State>>> {
    let saturated = saturate(automaton, silent, variant);
    strong_bisimulation(&saturated, pre_partition, canceller)
}

/// Return a copy of `automaton` whose transition relation is closed under
/// τ-prefix/suffix insertion and which carries a τ-self-loop on every state.
pub fn saturate(automaton: &Automaton, silent: Event, variant: Variant) -> Automaton {
    let mut out = Automaton::new(automaton.symbols().clone());
    let states: Vec<State> = automaton.states().collect();
    for _ in &states {
        out.add_state();
    }
    // `Automaton::add_state` numbers states in the same order we iterated
    // `automaton.states()` in, so the identity map works directly.
    for q in &states {
        out.set_initial(*q, automaton.is_initial(*q));
        out.set_marked(*q, automaton.is_marked(*q));
    }
    for t in automaton.transitions() {
        out.add_transition(t.from, t.event, t.to);
    }

    let tau_succ = |a: &Automaton, s: State| -> BTreeSet<State> {
        a.transitions_from(s)
            .filter(|t| t.event == silent)
            .map(|t| t.to)
            .collect()
    };
    let tau_star = |a: &Automaton, s: State| -> BTreeSet<State> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![s];
        while let Some(x) = stack.pop() {
            for y in tau_succ(a, x) {
                if closure.insert(y) {
                    stack.push(y);
                }
            }
        }
        closure
    };

    let mut changed = true;
    while changed {
        changed = false;
        let snapshot: Vec<_> = out.transitions().copied().collect();
        for t in &snapshot {
            if t.event == silent {
                continue;
            }
            // delayed: s --ev--> s' --τ*--> s''
            for s_pp in tau_star(&out, t.to) {
                changed |= out.add_transition(t.from, t.event, s_pp);
            }
            if variant == Variant::Weak {
                // weak: s --τ*--> s' --ev--> s''
                for s_p in tau_star(&out, t.from) {
                    changed |= out.add_transition(s_p, t.event, t.to);
                }
            }
        }
    }

    for q in &states {
        out.add_transition(*q, silent, *q);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};
    use crate::cancel::Never;

    #[test]
    fn saturation_agrees_with_direct_delayed() {
        let mut syms = SymbolTable::new();
        let tau = syms.lambda_event();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        let q2 = g.add_state();
        let q3 = g.add_state();
        g.add_transition(q0, tau, q1);
        g.add_transition(q1, a, q2);
        g.add_transition(q3, a, q2);

        let classes = saturated_bisimulation(&g, tau, Variant::Delayed, None, &Never).unwrap();
        assert!(classes.iter().any(|c| c.contains(&q0) && c.contains(&q3)));
    }
}
