//! LR(1) configurations (`spec.md` §3.3, §4.11 `Desc`).

use crate::automaton::Event;
use crate::grammar::{Grammar, GrammarSymbol, Nonterminal};
use std::collections::{BTreeMap, BTreeSet};

/// One grammar production, flattened out of a `Grammar` into an indexable
/// vector so items can refer to "production #k" instead of cloning the
/// whole production into every configuration.
#[derive(Debug, Clone)]
pub struct FlatProduction {
    pub lhs: Nonterminal,
    pub rhs: Vec<GrammarSymbol>,
}

/// `(A → α · β, z)`: `prod` + `dot` encode `A → α · β` (`dot` is `|α|`); `z`
/// is the lookahead terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Item {
    pub prod: usize,
    pub dot: usize,
    pub lookahead: Event,
}

pub type ItemSet = BTreeSet<Item>;

/// The flattened production table plus a by-lhs index, shared by every
/// stage of the LR(1) construction.
pub struct ProductionTable {
    pub productions: Vec<FlatProduction>,
    by_lhs: BTreeMap<Nonterminal, Vec<usize>>,
}

impl ProductionTable {
    pub fn from_grammar(grammar: &Grammar) -> Self {
        let mut productions = Vec::new();
        let mut by_lhs: BTreeMap<Nonterminal, Vec<usize>> = BTreeMap::new();
        for p in grammar.productions() {
            let idx = productions.len();
            by_lhs.entry(p.lhs.clone()).or_default().push(idx);
            productions.push(FlatProduction {
                lhs: p.lhs.clone(),
                rhs: p.rhs.clone(),
            });
        }
        Self { productions, by_lhs }
    }

    pub fn for_lhs(&self, n: &Nonterminal) -> &[usize] {
        self.by_lhs.get(n).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[derive(Clone, Default)]
struct Sym1 {
    nullable: bool,
    terminals: BTreeSet<Event>,
}

/// `FIRST_≤1`: for each nonterminal, the set of terminals that can begin a
/// string it derives, plus whether it can derive `λ`.
pub struct First1 {
    table: BTreeMap<Nonterminal, Sym1>,
}

impl First1 {
    pub fn compute(prods: &ProductionTable) -> Self {
        let mut table: BTreeMap<Nonterminal, Sym1> = BTreeMap::new();
        let mut changed = true;
        while changed {
            changed = false;
            for p in &prods.productions {
                let seq = Self::first_of_sequence(&p.rhs, &table);
                let entry = table.entry(p.lhs.clone()).or_default();
                if seq.nullable && !entry.nullable {
                    entry.nullable = true;
                    changed = true;
                }
                for t in seq.terminals {
                    if entry.terminals.insert(t) {
                        changed = true;
                    }
                }
            }
        }
        Self { table }
    }

    fn first_of_symbol(sym: &GrammarSymbol, table: &BTreeMap<Nonterminal, Sym1>) -> Sym1 {
        match sym {
            GrammarSymbol::Terminal(e) => Sym1 {
                nullable: false,
                terminals: BTreeSet::from([*e]),
            },
            GrammarSymbol::Nonterminal(n) => table.get(n).cloned().unwrap_or_default(),
        }
    }

    /// FIRST_≤1 of a symbol sequence: every terminal that can begin some
    /// prefix of `seq`, accumulating across leading nullable symbols until
    /// a non-nullable one is hit (or the whole sequence derives `λ`).
    fn first_of_sequence(seq: &[GrammarSymbol], table: &BTreeMap<Nonterminal, Sym1>) -> Sym1 {
        let mut terminals = BTreeSet::new();
        for sym in seq {
            let s = Self::first_of_symbol(sym, table);
            terminals.extend(s.terminals);
            if !s.nullable {
                return Sym1 {
                    nullable: false,
                    terminals,
                };
            }
        }
        Sym1 {
            nullable: true,
            terminals,
        }
    }

    /// `FIRST_≤1(β z)`: every terminal that can lead `β`, plus `z` itself
    /// when `β` can vanish to `λ` (so the fixed lookahead `z` becomes
    /// reachable).
    pub fn of_with_lookahead(&self, beta: &[GrammarSymbol], z: Event) -> BTreeSet<Event> {
        let seq = Self::first_of_sequence(beta, &self.table);
        let mut result = seq.terminals;
        if seq.nullable {
            result.insert(z);
        }
        result
    }
}

/// `Desc`: close `items` under "dot precedes a nonterminal" (`spec.md`
/// §4.11).
pub fn closure(mut items: ItemSet, prods: &ProductionTable, first1: &First1) -> ItemSet {
    let mut changed = true;
    while changed {
        changed = false;
        let snapshot: Vec<Item> = items.iter().copied().collect();
        for item in snapshot {
            let p = &prods.productions[item.prod];
            if item.dot >= p.rhs.len() {
                continue;
            }
            let GrammarSymbol::Nonterminal(ref b) = p.rhs[item.dot] else {
                continue;
            };
            let beta = &p.rhs[item.dot + 1..];
            let lookaheads = first1.of_with_lookahead(beta, item.lookahead);
            for &q in prods.for_lhs(b) {
                for y in lookaheads.iter().copied() {
                    let new_item = Item {
                        prod: q,
                        dot: 0,
                        lookahead: y,
                    };
                    if items.insert(new_item) {
                        changed = true;
                    }
                }
            }
        }
    }
    items
}
