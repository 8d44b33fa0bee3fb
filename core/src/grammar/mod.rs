//! Context-free grammars over a pushdown automaton's events and stack
//! symbols (`spec.md` §3.3, §4.7 `Sp2Lr`).

mod nonterminal;
mod production;

pub use nonterminal::Nonterminal;
pub use production::{GrammarSymbol, Production};

use crate::automaton::{Event, SymbolTable};
use std::collections::BTreeSet;

/// A context-free grammar whose terminals are automaton events and whose
/// nonterminals are `(state, word[, state])` triples (`spec.md` §3.3:
/// "end-form" and "mid-form" nonterminals).
///
/// Invariant: every terminal and nonterminal occurring in `productions` or in
/// `start` belongs to the respective set (`spec.md` §3.3).
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: SymbolTable,
    terminals: BTreeSet<Event>,
    nonterminals: BTreeSet<Nonterminal>,
    start: Nonterminal,
    productions: Vec<Production>,
}

impl Grammar {
    pub fn new(symbols: SymbolTable, start: Nonterminal) -> Self {
        let mut nonterminals = BTreeSet::new();
        nonterminals.insert(start.clone());
        Self {
            symbols,
            terminals: BTreeSet::new(),
            nonterminals,
            start,
            productions: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn start(&self) -> &Nonterminal {
        &self.start
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Event> {
        self.terminals.iter()
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &Nonterminal> {
        self.nonterminals.iter()
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    fn observe_symbol(&mut self, sym: &GrammarSymbol) {
        match sym {
            GrammarSymbol::Terminal(e) => {
                self.terminals.insert(*e);
            }
            GrammarSymbol::Nonterminal(n) => {
                self.nonterminals.insert(n.clone());
            }
        }
    }

    /// Add a production, registering its LHS and every RHS symbol in the
    /// respective terminal/nonterminal sets.
    pub fn add_production(&mut self, lhs: Nonterminal, rhs: Vec<GrammarSymbol>) {
        self.nonterminals.insert(lhs.clone());
        for sym in &rhs {
            self.observe_symbol(sym);
        }
        self.productions.push(Production { lhs, rhs });
    }

    /// Productions whose left-hand side is `lhs`.
    pub fn productions_for(&self, lhs: &Nonterminal) -> impl Iterator<Item = &Production> {
        self.productions.iter().filter(move |p| &p.lhs == lhs)
    }

    /// Drop every production referencing a nonterminal outside `keep`
    /// (used by `crate::pushdown::cleanup::remove_non_productive` /
    /// `remove_unreachable`).
    pub fn retain_nonterminals(&mut self, keep: &BTreeSet<Nonterminal>) {
        self.productions.retain(|p| {
            keep.contains(&p.lhs)
                && p.rhs.iter().all(|s| match s {
                    GrammarSymbol::Nonterminal(n) => keep.contains(n),
                    GrammarSymbol::Terminal(_) => true,
                })
        });
        self.nonterminals.retain(|n| keep.contains(n));
    }
}
