//! Parser action derivation, `$`-detachment, and the pushdown-friendly
//! action normal form (`spec.md` §4.11 `Lrp`, `DetachAugSymbol`,
//! `TransformParserAction`).

use super::goto_machine::GotoMachine;
use crate::automaton::Event;
use crate::grammar::GrammarSymbol;
use std::collections::{BTreeMap, BTreeSet};

/// One parser action. A reduce pops `pop_count` states off the runtime
/// state stack (one per right-hand-side symbol of `production`) before the
/// caller pushes `GOTO(top, production.lhs)`.
///
/// This already is the "normal form" `TransformParserAction` asks for at
/// the level the EPDA lift (`crate::lr1::epda`) consumes: exactly one
/// symbol's worth of lookahead is consumed per shift, and a reduce is
/// characterised purely by how many stack states it pops — the actual
/// multi-pop/single-push pushdown transition this becomes is simplified
/// back down to single-pop/single-push steps by the later
/// `crate::pushdown::spda` normalisation pass, same as any other non-simple
/// transition the pipeline produces.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Shift { to: usize },
    Reduce { production: usize, pop_count: usize },
}

pub struct ParserTable {
    pub actions: BTreeMap<(usize, Event), Action>,
    /// States made final by `DetachAugSymbol` (reached on `$`).
    pub finals: BTreeSet<usize>,
    pub start: usize,
}

/// `Lrp`: derive the shift/reduce action table from a built GOTO machine.
pub fn derive(machine: &GotoMachine) -> ParserTable {
    let mut actions = BTreeMap::new();

    for (s, edges) in machine.edges.iter().enumerate() {
        for (symbol, &target) in edges {
            if let GrammarSymbol::Terminal(a) = symbol {
                actions.insert((s, *a), Action::Shift { to: target });
            }
        }
    }

    for (s, items) in machine.states.iter().enumerate() {
        for item in items {
            let p = &machine.prods.productions[item.prod];
            if item.dot == p.rhs.len() {
                actions.insert(
                    (s, item.lookahead),
                    Action::Reduce {
                        production: item.prod,
                        pop_count: p.rhs.len(),
                    },
                );
            }
        }
    }

    ParserTable {
        actions,
        finals: BTreeSet::new(),
        start: machine.start,
    }
}

/// `DetachAugSymbol`: any state reached by a shift on `dollar` becomes
/// final, and that shift action is removed (the parser stops there rather
/// than continuing past the sentinel).
pub fn detach_aug_symbol(table: &mut ParserTable, dollar: Event) {
    let mut finals = BTreeSet::new();
    table.actions.retain(|&(_s, terminal), action| {
        if terminal != dollar {
            return true;
        }
        if let Action::Shift { to } = *action {
            finals.insert(to);
        }
        false
    });
    table.finals = finals;
}
