//! Grammar augmentation and the GOTO machine (`spec.md` §4.11 `Aug`,
//! `Basis`, `GoTo`, `LrmLoop`).

use super::item::{closure, First1, Item, ItemSet, ProductionTable};
use crate::automaton::Event;
use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarSymbol, Nonterminal};
use std::collections::BTreeMap;

/// `Aug(G, S, $)`: add `S → $ S' $` where `S'` is the old start symbol.
/// Fails if `new_start` already names a nonterminal of `grammar`, or if
/// `dollar` already names a terminal.
pub fn aug(grammar: &Grammar, new_start: Nonterminal, dollar: Event) -> Result<Grammar> {
    if grammar.nonterminals().any(|n| *n == new_start) {
        return Err(Error::invariant("Aug: new start symbol already in use"));
    }
    if grammar.terminals().any(|&e| e == dollar) {
        return Err(Error::invariant("Aug: fresh terminal already in use"));
    }
    let mut out = Grammar::new(grammar.symbols().clone(), new_start.clone());
    out.add_production(
        new_start,
        vec![
            GrammarSymbol::Terminal(dollar),
            GrammarSymbol::Nonterminal(grammar.start().clone()),
            GrammarSymbol::Terminal(dollar),
        ],
    );
    for p in grammar.productions() {
        out.add_production(p.lhs.clone(), p.rhs.clone());
    }
    Ok(out)
}

/// A state of the GOTO machine plus its outgoing edges.
pub struct GotoMachine {
    pub prods: ProductionTable,
    pub first1: First1,
    pub states: Vec<ItemSet>,
    pub edges: Vec<BTreeMap<GrammarSymbol, usize>>,
    pub start: usize,
}

/// `Basis` + `GoTo`: shift the dot of every item of `state` over `symbol`
/// wherever possible, then close.
fn goto(state: &ItemSet, symbol: &GrammarSymbol, prods: &ProductionTable, first1: &First1) -> ItemSet {
    let mut shifted = ItemSet::new();
    for item in state {
        let p = &prods.productions[item.prod];
        if item.dot < p.rhs.len() && &p.rhs[item.dot] == symbol {
            shifted.insert(Item {
                prod: item.prod,
                dot: item.dot + 1,
                lookahead: item.lookahead,
            });
        }
    }
    closure(shifted, prods, first1)
}

/// `LrmLoop`: breadth-first exploration of the GOTO machine from the
/// initial closed item set, grounded on `Aug`'s augmented grammar.
pub fn build(grammar: &Grammar, dollar: Event) -> GotoMachine {
    let prods = ProductionTable::from_grammar(grammar);
    let first1 = First1::compute(&prods);

    let start_prods = prods.for_lhs(grammar.start());
    let mut initial = ItemSet::new();
    for &p in start_prods {
        initial.insert(Item {
            prod: p,
            dot: 0,
            lookahead: dollar,
        });
    }
    let initial = closure(initial, &prods, &first1);

    let mut states = vec![initial.clone()];
    let mut index: BTreeMap<ItemSet, usize> = BTreeMap::new();
    index.insert(initial, 0);
    let mut edges: Vec<BTreeMap<GrammarSymbol, usize>> = vec![BTreeMap::new()];

    let mut queue = vec![0usize];
    while let Some(s) = queue.pop() {
        log::trace!("LrmLoop: exploring state {s}, {} states discovered so far", states.len());
        let symbols: Vec<GrammarSymbol> = states[s]
            .iter()
            .filter_map(|item| {
                let p = &prods.productions[item.prod];
                p.rhs.get(item.dot).cloned()
            })
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        for symbol in symbols {
            let target = goto(&states[s], &symbol, &prods, &first1);
            if target.is_empty() {
                continue;
            }
            let target_idx = if let Some(&idx) = index.get(&target) {
                idx
            } else {
                let idx = states.len();
                index.insert(target.clone(), idx);
                states.push(target);
                edges.push(BTreeMap::new());
                queue.push(idx);
                idx
            };
            edges[s].insert(symbol, target_idx);
        }
    }

    log::debug!("LrmLoop: goto machine built with {} states", states.len());
    GotoMachine {
        prods,
        first1,
        states,
        edges,
        start: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, State, SymbolTable};
    use crate::grammar::Nonterminal;
    use desflow_entity::EntityRef;

    #[test]
    fn augmented_grammar_has_wrapping_production() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let dollar = syms.declare_event("$", Attrs::NONE);
        let q0 = State::new(0);
        let start = Nonterminal::end_form(q0, vec![]);
        let mut g = Grammar::new(syms, start.clone());
        g.add_production(start, vec![GrammarSymbol::Terminal(a)]);

        let new_start = Nonterminal::end_form(State::new(1), vec![]);
        let augmented = aug(&g, new_start.clone(), dollar).unwrap();
        assert_eq!(augmented.start(), &new_start);
        assert_eq!(augmented.productions_for(&new_start).count(), 1);
    }

    #[test]
    fn goto_machine_builds_at_least_the_start_state() {
        let _ = env_logger::try_init();
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let dollar = syms.declare_event("$", Attrs::NONE);
        let q0 = State::new(0);
        let start = Nonterminal::end_form(q0, vec![]);
        let mut g = Grammar::new(syms, start.clone());
        g.add_production(start, vec![GrammarSymbol::Terminal(a)]);

        let machine = build(&g, dollar);
        assert!(!machine.states.is_empty());
    }
}
