//! Grammar cleanup (`spec.md` §4.10): non-productive and unreachable
//! nonterminal removal.

use crate::grammar::{Grammar, GrammarSymbol, Nonterminal};
use std::collections::BTreeSet;

/// `Rnpp`: keep only productions whose nonterminals are all eliminable
/// (i.e. can derive some terminal string), and only if the start symbol
/// itself is eliminable. Returns `None` if the start symbol is not
/// eliminable (the grammar derives nothing).
pub fn remove_non_productive(grammar: &Grammar) -> Option<Grammar> {
    let mut eliminable: BTreeSet<Nonterminal> = BTreeSet::new();
    let mut changed = true;
    while changed {
        changed = false;
        for p in grammar.productions() {
            if eliminable.contains(&p.lhs) {
                continue;
            }
            let ok = p.rhs.iter().all(|s| match s {
                GrammarSymbol::Terminal(_) => true,
                GrammarSymbol::Nonterminal(n) => eliminable.contains(n),
            });
            if ok {
                eliminable.insert(p.lhs.clone());
                changed = true;
            }
        }
    }

    if !eliminable.contains(grammar.start()) {
        return None;
    }

    let mut out = Grammar::new(grammar.symbols().clone(), grammar.start().clone());
    for p in grammar.productions() {
        if !eliminable.contains(&p.lhs) {
            continue;
        }
        let ok = p.rhs.iter().all(|s| match s {
            GrammarSymbol::Terminal(_) => true,
            GrammarSymbol::Nonterminal(n) => eliminable.contains(n),
        });
        if ok {
            out.add_production(p.lhs.clone(), p.rhs.clone());
        }
    }
    Some(out)
}

/// `Rup`: worklist from the start symbol; a production is kept iff its LHS
/// is reachable, and its RHS nonterminals become reachable in turn.
pub fn remove_unreachable(grammar: &Grammar) -> Grammar {
    let mut reachable: BTreeSet<Nonterminal> = BTreeSet::new();
    reachable.insert(grammar.start().clone());
    let mut worklist = vec![grammar.start().clone()];

    while let Some(n) = worklist.pop() {
        for p in grammar.productions_for(&n) {
            for s in &p.rhs {
                if let GrammarSymbol::Nonterminal(rn) = s {
                    if reachable.insert(rn.clone()) {
                        worklist.push(rn.clone());
                    }
                }
            }
        }
    }

    let mut out = Grammar::new(grammar.symbols().clone(), grammar.start().clone());
    for p in grammar.productions() {
        if reachable.contains(&p.lhs) {
            out.add_production(p.lhs.clone(), p.rhs.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};
    use desflow_entity::EntityRef;

    #[test]
    fn drops_non_productive_nonterminal() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let q0 = crate::automaton::State::new(0);
        let start = Nonterminal::end_form(q0, vec![]);
        let dead = Nonterminal::end_form(q0, vec![syms.declare_stack_sym("z1")]);

        let mut g = Grammar::new(syms, start.clone());
        g.add_production(start.clone(), vec![]);
        g.add_production(dead.clone(), vec![GrammarSymbol::Nonterminal(dead.clone())]);

        let cleaned = remove_non_productive(&g).unwrap();
        assert!(cleaned.nonterminals().any(|n| *n == start));
        assert!(!cleaned.nonterminals().any(|n| *n == dead));
        let _ = a;
    }
}
