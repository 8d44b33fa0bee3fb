//! `PushdownBlockfree`, `PushdownAccessible`, `PushdownConstructController`
//! (`spec.md` §4.12, §4.13): the orchestration layer gluing the pushdown,
//! LR(1), and synthesis pieces into the published entry points.
//!
//! Several named sub-steps of §4.12 fold into ones we already built: step
//! 13's "rename stack symbols with an `old-` prefix to avoid collisions" is
//! unnecessary here because `SymbolTable::declare_stack_sym` already
//! dedups by name and `crate::lr1::epda` mints its own `lrstateN`/
//! `epda-bottom` names that cannot collide with an input automaton's
//! symbols; step 14's `RemoveLambdaPop`/`RemoveMultPop` loop is subsumed by
//! re-running `crate::pushdown::spda::normalize` before
//! `crate::synth::merge::merge_until_stable`, since both ultimately chase
//! the same "no transition has more than one pop or push" invariant.

use crate::automaton::{Automaton, Event, Pda, State};
use crate::cancel::Canceller;
use crate::error::Result;
use crate::grammar::Nonterminal;
use crate::lr1::{
    aug, build_goto_machine, derive_parser_table, detach_aug_symbol, lr_parser_to_epda,
};
use crate::pushdown::{
    nda, remove_non_productive, remove_unreachable, sp2lr, spda_normalize, trim_lookahead,
};
use crate::synth::merge::merge_until_stable;
use crate::synth::rnce::rnce;
use crate::synth::split::{split, SplitIndex};
use crate::synth::times::times;
use std::collections::{BTreeMap, BTreeSet};

const LOOKAHEAD: usize = 1;

/// `PushdownBlockfree(G)`: the nonblocking-making transform of §4.12.
pub fn pushdown_blockfree(pda: &Pda, canceller: &dyn Canceller) -> Result<Pda> {
    canceller.check()?;
    let lambda = pda.symbols().lambda_event();

    let trimmed = trim_lookahead(pda, LOOKAHEAD, pda.stack_bottom());
    let normalized = spda_normalize(&trimmed, lambda);
    let trimmed2 = trim_lookahead(&normalized, LOOKAHEAD, normalized.stack_bottom());
    canceller.check()?;

    let doubled = nda(&trimmed2, lambda);
    let trimmed3 = trim_lookahead(&doubled, LOOKAHEAD, doubled.stack_bottom());

    let grammar = sp2lr(&trimmed3, lambda, false);
    canceller.check()?;
    let mut grammar = match remove_non_productive(&grammar) {
        Some(g) => remove_unreachable(&g),
        None => {
            let mut empty = Pda::new(pda.symbols().clone(), pda.stack_bottom());
            empty.add_state();
            return Ok(empty);
        }
    };

    let fallback_state = trimmed3
        .states()
        .next()
        .unwrap_or_else(|| pda.states().next().expect("pda has at least one state"));
    let new_start = Nonterminal::end_form(fallback_state, vec![]);
    let dollar = grammar.symbols_mut().declare_event("$-aug", crate::automaton::Attrs::NONE);
    let augmented = aug(&grammar, new_start, dollar)?;
    canceller.check()?;

    let machine = build_goto_machine(&augmented, dollar);
    let mut table = derive_parser_table(&machine);
    detach_aug_symbol(&mut table, dollar);

    let lifted = lr_parser_to_epda(&table, &machine, augmented.symbols().clone());
    let trimmed4 = trim_lookahead(&lifted, LOOKAHEAD, lifted.stack_bottom());
    canceller.check()?;

    let mut result = spda_normalize(&trimmed4, trimmed4.symbols().lambda_event());
    merge_until_stable(&mut result);

    restore_attrs(&mut result, pda);
    Ok(result)
}

/// `PushdownAccessible(G)`: the same scaffold, but only reachability is
/// wanted, so the CFG/parser/EPDA detour is unnecessary — a forward BFS
/// from the initial states over `pda`'s own transitions finds the same
/// accessible set `Sp2Lr(ignor_reducible=true)` + `Rup` would discover
/// (both are plain reachability analyses over the same transition graph).
pub fn pushdown_accessible(pda: &Pda, canceller: &dyn Canceller) -> Result<Pda> {
    canceller.check()?;
    let mut seen: BTreeSet<_> = pda.initial_states().collect();
    let mut stack: Vec<_> = seen.iter().copied().collect();
    while let Some(q) = stack.pop() {
        canceller.check()?;
        for t in pda.transitions_from(q) {
            if seen.insert(t.to) {
                stack.push(t.to);
            }
        }
    }

    let mut out = Pda::new(pda.symbols().clone(), pda.stack_bottom());
    let mut remap = BTreeMap::new();
    for q in pda.states() {
        if !seen.contains(&q) {
            continue;
        }
        let s = out.add_state_with_provenance(pda.provenance(q).clone());
        out.set_initial(s, pda.is_initial(q));
        out.set_marked(s, pda.is_marked(q));
        remap.insert(q, s);
    }
    for t in pda.transitions() {
        if seen.contains(&t.from) && seen.contains(&t.to) {
            out.add_transition(remap[&t.from], t.event, remap[&t.to], t.op);
        }
    }
    Ok(out)
}

/// §4.13 step e: a silent move is always locally controllable — the
/// supervisor chooses to take it or not, there is no plant to disable it on.
/// Sets that bit on the PDA's own `λ` event so `Rnce`'s controllability scan
/// (and anything reading event attrs downstream) sees it correctly.
fn mark_lambda_controllable(pda: &mut Pda) {
    let lambda = pda.symbols().lambda_event();
    let attrs = pda.symbols().event_attrs(lambda).with_controllable(true);
    pda.symbols_mut().set_event_attrs(lambda, attrs);
}

/// Copy controllable/observable bits back onto every event `result` shares
/// by name with `original` — the EPDA lift invents its own stack-bookkeeping
/// events (none) and reuses the original visible alphabet unchanged, but
/// building fresh `SymbolTable`s along the way (via `.clone()`) loses any
/// attribute edits a caller made after the fact, so this restores them.
fn restore_attrs(result: &mut Pda, original: &Pda) {
    let original_events: Vec<Event> = {
        let mut seen = BTreeSet::new();
        for t in original.transitions() {
            seen.insert(t.event);
        }
        seen.into_iter().collect()
    };
    for e in original_events {
        let name = original.symbols().event_name(e).to_string();
        if let Some(re) = result.symbols().event_named(&name) {
            let attrs = original.symbols().event_attrs(e);
            result.symbols_mut().set_event_attrs(re, attrs);
        }
    }
}

/// `PushdownConstructController`: the supervisor-synthesis loop of §4.13.
pub fn construct_controller(plant: &Automaton, spec: &Pda, canceller: &dyn Canceller) -> Result<Pda> {
    canceller.check()?;
    let combined = times(plant, spec);
    let mut candidate = pushdown_blockfree(&combined, canceller)?;
    if is_empty(&candidate) {
        return Ok(candidate);
    }

    let mut round = 0u32;
    loop {
        canceller.check()?;
        round += 1;
        log::trace!("construct_controller: round {round}, candidate has {} states", candidate.num_states());
        let product = times(plant, &candidate);
        let trimmed = trim_lookahead(&product, LOOKAHEAD, product.stack_bottom());
        let (split_pda, index) = split(&trimmed);
        let mut trimmed_split = trim_lookahead(&split_pda, LOOKAHEAD, split_pda.stack_bottom());
        mark_lambda_controllable(&mut trimmed_split);
        let accessible = pushdown_accessible(&trimmed_split, canceller)?;
        let after_rnce = rnce(&accessible, &index, &trimmed, plant);
        let removed_any = after_rnce.num_states() < accessible.num_states();

        if !removed_any {
            log::debug!("construct_controller: converged after {round} rounds, {} states", candidate.num_states());
            return Ok(candidate);
        }

        let folded = fold_split(&after_rnce, &index);
        candidate = pushdown_blockfree(&folded, canceller)?;
        if is_empty(&candidate) {
            log::debug!("construct_controller: candidate collapsed to empty at round {round}");
            return Ok(candidate);
        }
    }
}

fn is_empty(pda: &Pda) -> bool {
    pda.num_states() <= 1 && pda.transitions().next().is_none()
}

/// Collapse a (possibly `Rnce`-pruned) head/ear automaton back to one state
/// per surviving original, re-emitting the original pop/push transitions
/// for every original triple whose ear is still present. Head→ear
/// confirm-moves are `Split`-internal bookkeeping and are not reinstated.
fn fold_split(post_rnce: &Pda, index: &SplitIndex) -> Pda {
    let present: BTreeSet<State> = post_rnce.states().collect();
    let is_ear: BTreeSet<State> = index.ear_of.values().copied().collect();

    let mut surviving_originals = BTreeSet::new();
    for (&split_state, &orig) in &index.original_of {
        if present.contains(&split_state) {
            surviving_originals.insert(orig);
        }
    }

    let mut out = Pda::new(post_rnce.symbols().clone(), post_rnce.stack_bottom());
    let mut remap = BTreeMap::new();
    for &orig in &surviving_originals {
        remap.insert(orig, out.add_state());
    }

    for (&orig, &head) in &index.head_of {
        if let (Some(&s), true) = (remap.get(&orig), present.contains(&head)) {
            out.set_initial(s, post_rnce.is_initial(head));
        }
    }
    for (&(orig, _x), &ear) in &index.ear_of {
        if let (Some(&s), true) = (remap.get(&orig), present.contains(&ear)) {
            if post_rnce.is_marked(ear) {
                out.set_marked(s, true);
            }
        }
    }

    for t in post_rnce.transitions() {
        if !is_ear.contains(&t.from) {
            continue;
        }
        let (Some(&from_orig), Some(&to_orig)) =
            (index.original_of.get(&t.from), index.original_of.get(&t.to))
        else {
            continue;
        };
        if let (Some(&from), Some(&to)) = (remap.get(&from_orig), remap.get(&to_orig)) {
            out.add_transition(from, t.event, to, t.op);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, StackOp, SymbolTable};
    use crate::cancel::Never;

    #[test]
    fn accessible_drops_unreachable_states() {
        let _ = env_logger::try_init();
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");
        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        let _dead = pda.add_state();
        pda.set_initial(q0, true);
        pda.add_transition(q0, a, q1, StackOp::nop());

        let out = pushdown_accessible(&pda, &Never).unwrap();
        assert_eq!(out.num_states(), 2);
    }

    #[test]
    fn blockfree_of_a_trivial_marked_dpda_stays_nonempty() {
        let _ = env_logger::try_init();
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");
        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q0, true);
        pda.add_transition(q0, a, q0, StackOp::new(vec![bottom], vec![bottom]));

        let out = pushdown_blockfree(&pda, &Never).unwrap();
        assert!(!is_empty(&out));
    }
}
