//! `LrParser2EPDA`: lift a normal-form parser action table into an
//! equivalent pushdown automaton whose stack alphabet is the GOTO-machine's
//! own states (`spec.md` §4.11).
//!
//! The lifted machine has a single control state; all parsing state lives
//! on the stack, exactly the way a textbook LR parser keeps its state
//! stack separate from its input. A shift pushes the GOTO target on top of
//! the current top. A reduce pops `pop_count` symbols and pushes
//! `GOTO(revealed_top, lhs)`; since the symbols below the known top are not
//! known in advance, each extra pop level is realised the same way
//! `crate::pushdown::spda` realises an unknown-stack-top push — one
//! transition per possible stack symbol, chained through fresh states —
//! until the revealed top is known, at which point the correct GOTO target
//! is looked up and pushed. Reduces fire as unconditional λ-moves: the
//! lookahead that disambiguated the parser table is a table-construction
//! device, not a capability of the pushdown automaton, and the grammars
//! this module is fed (from `crate::pushdown::sp2lr`) are unambiguous by
//! construction.

use super::goto_machine::GotoMachine;
use super::item::ProductionTable;
use super::parser::{Action, ParserTable};
use crate::automaton::{Pda, Provenance, StackOp, State, SymbolTable};
use std::collections::BTreeMap;

pub fn lr_parser_to_epda(
    table: &ParserTable,
    machine: &GotoMachine,
    mut symbols: SymbolTable,
) -> Pda {
    let num_states = machine.states.len();
    let state_syms: Vec<_> = (0..num_states)
        .map(|s| symbols.declare_stack_sym(&format!("lrstate{s}")))
        .collect();
    let bottom = symbols.declare_stack_sym("epda-bottom");
    let lambda = symbols.lambda_event();

    let mut pda = Pda::new(symbols, bottom);
    let q = pda.add_state();
    pda.set_initial(q, true);
    pda.set_marked(q, !table.finals.is_empty());

    for (&(s, event), action) in &table.actions {
        if let Action::Shift { to } = *action {
            pda.add_transition(
                q,
                event,
                q,
                StackOp::new(vec![state_syms[s]], vec![state_syms[to], state_syms[s]]),
            );
        }
    }

    // Group reduces by (state, production) — several lookaheads can share
    // one reduce, and distinct productions from the same state need their
    // own GOTO lookup.
    let mut by_state_prod: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (&(s, _z), action) in &table.actions {
        if let Action::Reduce { production, pop_count } = *action {
            by_state_prod.insert((s, production), pop_count);
        }
    }

    for (&(s, production), &pop_count) in &by_state_prod {
        build_reduce(&mut pda, q, lambda, &state_syms, &machine.prods, machine, s, production, pop_count);
    }

    pda
}

#[allow(clippy::too_many_arguments)]
fn build_reduce(
    pda: &mut Pda,
    q: State,
    lambda: crate::automaton::Event,
    state_syms: &[crate::automaton::StackSym],
    prods: &ProductionTable,
    machine: &GotoMachine,
    top_state: usize,
    production: usize,
    pop_count: usize,
) {
    let lhs = &prods.productions[production].lhs;

    let goto_target = |revealed: usize| -> Option<usize> {
        machine.edges[revealed]
            .get(&crate::grammar::GrammarSymbol::Nonterminal(lhs.clone()))
            .copied()
    };

    if pop_count == 0 {
        // Revealed top is the unchanged current top.
        if let Some(target) = goto_target(top_state) {
            pda.add_transition(
                q,
                lambda,
                q,
                StackOp::new(
                    vec![state_syms[top_state]],
                    vec![state_syms[target], state_syms[top_state]],
                ),
            );
        }
        return;
    }

    // Stage 1: pop the known top.
    let mut cursor = pda.add_state_with_provenance(Provenance::Annotation(
        q,
        format!("epda-reduce-{top_state}-{production}-pop1"),
    ));
    pda.add_transition(
        q,
        lambda,
        cursor,
        StackOp::new(vec![state_syms[top_state]], vec![]),
    );

    // Stages 2..pop_count: pop an arbitrary enumerated stack symbol.
    for level in 1..pop_count {
        let next = pda.add_state_with_provenance(Provenance::Annotation(
            q,
            format!("epda-reduce-{top_state}-{production}-pop{}", level + 1),
        ));
        for &sym in state_syms {
            pda.add_transition(cursor, lambda, next, StackOp::new(vec![sym], vec![]));
        }
        cursor = next;
    }

    // Final stage: the revealed top is now known per branch; push the
    // correct GOTO target on top of it.
    for (revealed, &sym) in state_syms.iter().enumerate() {
        if let Some(target) = goto_target(revealed) {
            pda.add_transition(
                cursor,
                lambda,
                q,
                StackOp::new(vec![sym], vec![state_syms[target], sym]),
            );
        }
    }
}
