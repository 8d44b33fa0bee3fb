//! SPDA → CFG translation (`spec.md` §4.9 `Sp2Lr`).
//!
//! Nonterminals here are always single-stack-symbol end-form `(q, [A])` or
//! mid-form `(q, [A], q')`; the fixpoint below discovers productions for
//! them until the set stabilises, guarded by "is the referenced nonterminal
//! already reducible" unless `ignor_reducible` relaxes that guard (used
//! when only reachability, not coaccessibility, is needed).

use crate::automaton::{Event, Pda, State};
use crate::grammar::{Grammar, GrammarSymbol, Nonterminal};
use std::collections::{BTreeMap, BTreeSet};

/// A map from state to the set of states transitively reachable from it via
/// any transition (visible or silent); built once per pass to bound the
/// quadratic scans of the push-production rule.
fn reachability_cache(pda: &Pda) -> BTreeMap<State, BTreeSet<State>> {
    let mut direct: BTreeMap<State, BTreeSet<State>> = BTreeMap::new();
    for t in pda.transitions() {
        direct.entry(t.from).or_default().insert(t.to);
    }
    let mut cache = BTreeMap::new();
    for q in pda.states() {
        let mut seen = BTreeSet::new();
        let mut stack = vec![q];
        while let Some(x) = stack.pop() {
            if let Some(succs) = direct.get(&x) {
                for &s in succs {
                    if seen.insert(s) {
                        stack.push(s);
                    }
                }
            }
        }
        cache.insert(q, seen);
    }
    cache
}

struct Builder {
    grammar: Grammar,
    reducible: BTreeSet<Nonterminal>,
    added: BTreeSet<(Nonterminal, Vec<GrammarSymbol>)>,
    changed: bool,
}

impl Builder {
    fn is_reducible(&self, n: &Nonterminal, relax: bool) -> bool {
        relax || self.reducible.contains(n)
    }

    /// Add `lhs -> rhs` if it has not already been added; marks `lhs`
    /// reducible either way and flips `changed` only on true novelty, so
    /// relaxing the guard with `ignor_reducible` cannot loop forever.
    fn try_add(&mut self, lhs: Nonterminal, rhs: Vec<GrammarSymbol>) {
        self.reducible.insert(lhs.clone());
        if self.added.insert((lhs.clone(), rhs.clone())) {
            self.grammar.add_production(lhs, rhs);
            self.changed = true;
        }
    }
}

pub fn sp2lr(pda: &Pda, lambda: Event, ignor_reducible: bool) -> Grammar {
    let reach = reachability_cache(pda);
    let start = Nonterminal::end_form(
        pda.initial_states().next().unwrap_or_else(|| pda.states().next().unwrap()),
        vec![pda.stack_bottom()],
    );

    let mut b = Builder {
        grammar: Grammar::new(pda.symbols().clone(), start),
        reducible: BTreeSet::new(),
        added: BTreeSet::new(),
        changed: true,
    };

    let mut round = 0u32;
    while b.changed {
        b.changed = false;
        round += 1;
        log::trace!("sp2lr: production round {round}, {} productions so far", b.added.len());

        // T_final: every marked state, every non-lambda stack symbol.
        for q_m in pda.marked_states() {
            for a_sym in pda.symbols().all_stack_syms() {
                if a_sym.is_lambda() {
                    continue;
                }
                b.try_add(Nonterminal::end_form(q_m, vec![a_sym]), vec![]);
            }
        }

        for t in pda.transitions() {
            // T2: lambda-pop transitions.
            if t.event == lambda && t.op.pop.len() == 1 && t.op.push.is_empty() {
                let sym = t.op.pop[0];
                b.try_add(Nonterminal::end_form(t.from, vec![sym]), vec![]);
            }

            // T1: read transitions, pop == push == [b].
            if t.event != lambda && t.op.pop.len() == 1 && t.op.push == t.op.pop {
                let sym = t.op.pop[0];
                let target_end = Nonterminal::end_form(t.to, vec![sym]);
                if b.is_reducible(&target_end, ignor_reducible) {
                    b.try_add(
                        Nonterminal::end_form(t.from, vec![sym]),
                        vec![
                            GrammarSymbol::Terminal(t.event),
                            GrammarSymbol::Nonterminal(target_end),
                        ],
                    );
                }
                if let Some(reach_j) = reach.get(&t.to) {
                    for &q_t in reach_j {
                        let mid_target = Nonterminal::mid_form(t.to, vec![sym], q_t);
                        if b.is_reducible(&mid_target, ignor_reducible) {
                            b.try_add(
                                Nonterminal::mid_form(t.from, vec![sym], q_t),
                                vec![
                                    GrammarSymbol::Terminal(t.event),
                                    GrammarSymbol::Nonterminal(mid_target),
                                ],
                            );
                        }
                    }
                }
            }

            // T3L/T3R: push transitions, pop = [b], push = [c, b].
            if t.event == lambda
                && t.op.pop.len() == 1
                && t.op.push.len() == 2
                && t.op.push[1] == t.op.pop[0]
            {
                let bsym = t.op.pop[0];
                let csym = t.op.push[0];
                let target_end = Nonterminal::end_form(t.to, vec![csym]);
                if b.is_reducible(&target_end, ignor_reducible) {
                    b.try_add(
                        Nonterminal::end_form(t.from, vec![bsym]),
                        vec![GrammarSymbol::Nonterminal(target_end)],
                    );
                }

                if let Some(reach_j) = reach.get(&t.to) {
                    for &q_s in reach_j {
                        let mid_c = Nonterminal::mid_form(t.to, vec![csym], q_s);
                        if b.is_reducible(&mid_c, ignor_reducible) {
                            b.try_add(
                                Nonterminal::end_form(t.from, vec![bsym]),
                                vec![
                                    GrammarSymbol::Nonterminal(mid_c.clone()),
                                    GrammarSymbol::Nonterminal(Nonterminal::end_form(q_s, vec![bsym])),
                                ],
                            );
                        }

                        // q_p reached by a subsequent pop of c, q_t reached
                        // by a later pop of b.
                        for q_p in pda.states() {
                            let mid_cp = Nonterminal::mid_form(t.to, vec![csym], q_p);
                            if !b.is_reducible(&mid_cp, ignor_reducible) {
                                continue;
                            }
                            for q_t in pda.states() {
                                let mid_bt = Nonterminal::mid_form(q_p, vec![bsym], q_t);
                                if !b.is_reducible(&mid_bt, ignor_reducible) {
                                    continue;
                                }
                                b.try_add(
                                    Nonterminal::mid_form(t.from, vec![bsym], q_t),
                                    vec![
                                        GrammarSymbol::Nonterminal(mid_cp.clone()),
                                        GrammarSymbol::Nonterminal(mid_bt),
                                    ],
                                );
                            }
                        }
                    }
                }
            }
        }
    }
    log::debug!("sp2lr: converged after {round} rounds, {} productions", b.added.len());

    b.grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, StackOp, SymbolTable};

    #[test]
    fn balanced_parenthesis_like_spda_produces_grammar() {
        let _ = env_logger::try_init();
        let mut syms = SymbolTable::new();
        let open = syms.declare_event("open", Attrs::DEFAULT_EVENT);
        let close = syms.declare_event("close", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");
        let x = syms.declare_stack_sym("x");
        let lambda = syms.lambda_event();

        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q0, true);
        pda.add_transition(q0, open, q0, StackOp::new(vec![bottom], vec![x, bottom]));
        pda.add_transition(q0, open, q0, StackOp::new(vec![x], vec![x, x]));
        pda.add_transition(q0, close, q0, StackOp::new(vec![x], vec![]));

        let grammar = sp2lr(&pda, lambda, false);
        assert!(!grammar.productions().is_empty());
    }
}
