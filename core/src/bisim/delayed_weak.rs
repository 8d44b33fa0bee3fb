//! Delayed and weak bisimulation by direct two-pass change-tracking
//! (`spec.md` §4.4).

use super::encode::Encoded;
use crate::automaton::{Automaton, Event, State};
use crate::cancel::Canceller;
use crate::error::Result;
use crate::topo;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Copy, Clone, PartialEq, Eq)]
pub enum Variant {
    Delayed,
    Weak,
}

/// Compute the delayed (or weak) bisimulation partition, silent event
/// `silent`. The automaton must be τ-loop-free; this is checked first via
/// `crate::topo::topo_sort` (`spec.md` §4.4).
pub fn bisimulation(
    automaton: &Automaton,
    silent: Event,
    variant: Variant,
    pre_partition: Option<&[Vec<State>]>,
    canceller: &dyn Canceller,
) -> Result<Vec<Vec<State>>> {
    let silent_set: HashSet<Event> = [silent].into_iter().collect();
    topo::topo_sort(automaton, &silent_set)?;

    let mut enc = Encoded::new(automaton, Some(silent));
    let n = enc.num_states();
    if n == 0 {
        return Ok(Vec::new());
    }

    // Delayed active events: a state's own active (non-silent) events plus
    // those active in any direct τ-successor.
    for i in 1..=n {
        if let Some(tau_succs) = enc.suc[i].get(&0) {
            for &t in tau_succs {
                let extra: Vec<usize> = enc.evs[t].iter().copied().collect();
                enc.evs[i].extend(extra);
            }
        }
    }

    let mut next_class = super::strong::assign_pre_partition(&mut enc, pre_partition)?;
    super::strong::initial_approximation(&mut enc, &mut next_class);

    for i in 1..=n {
        enc.changed[i] = true;
    }

    let mut round = 0u32;
    while enc.changed[1..=n].iter().any(|&c| c) {
        canceller.check()?;
        round += 1;
        log::trace!("bisimulation: refinement round {round}, {next_class} classes so far");
        refine_round(&mut enc, &mut next_class, variant, canceller)?;
    }

    let classes = enc.classes();
    log::debug!("bisimulation: converged after {round} rounds, {} classes", classes.len());
    Ok(classes)
}

fn tau_star_predecessors(enc: &Encoded, seed: usize) -> BTreeSet<usize> {
    let mut closure = BTreeSet::new();
    let mut stack = vec![seed];
    while let Some(s) = stack.pop() {
        for &p in &enc.taupre[s] {
            if closure.insert(p) {
                stack.push(p);
            }
        }
    }
    closure
}

fn refine_round(
    enc: &mut Encoded,
    next_class: &mut usize,
    variant: Variant,
    canceller: &dyn Canceller,
) -> Result<()> {
    let n = enc.num_states();

    // Affected-set propagation (`spec.md` §4.4 "Affected-set propagation").
    let mut affected = vec![false; n + 1];
    for i in 1..=n {
        if !enc.changed[i] {
            continue;
        }
        match variant {
            Variant::Delayed => {
                for &p in &enc.pre[i] {
                    for t in tau_star_predecessors(enc, p) {
                        affected[t] = true;
                    }
                    affected[p] = true;
                }
            }
            Variant::Weak => {
                let mut closure = tau_star_predecessors(enc, i);
                closure.insert(i);
                for &t in &closure {
                    affected[t] = true;
                    for &p in &enc.pre[t] {
                        affected[p] = true;
                        for q in tau_star_predecessors(enc, p) {
                            affected[q] = true;
                        }
                    }
                }
            }
        }
    }
    enc.affected = affected;
    for i in 1..=n {
        enc.changed[i] = false;
    }

    // Recompute cafter for affected states, iterating to a local fixpoint
    // because propagation along τ-successors can itself depend on other
    // affected states within the same round.
    let affected_states: Vec<usize> = (1..=n).filter(|&i| enc.affected[i]).collect();
    let mut stable = false;
    while !stable {
        canceller.check()?;
        stable = true;
        for &i in &affected_states {
            let new_cafter = compute_cafter(enc, i, variant);
            if new_cafter != enc.cafter[i] {
                enc.cafter[i] = new_cafter;
                stable = false;
            }
        }
    }

    let mut runs = Vec::new();
    {
        let mut start = 0;
        while start < enc.partition.len() {
            let c0 = enc.c[enc.partition[start]];
            let mut end = start + 1;
            while end < enc.partition.len() && enc.c[enc.partition[end]] == c0 {
                end += 1;
            }
            runs.push((start, end));
            start = end;
        }
    }
    for (start, end) in runs {
        if end - start <= 1 {
            continue;
        }
        let has_affected = enc.partition[start..end].iter().any(|&i| enc.affected[i]);
        if has_affected {
            super::strong::refine_class(enc, start, end, next_class);
        }
    }
    enc.partition.sort_by_key(|&i| enc.c[i]);
    Ok(())
}

fn compute_cafter(enc: &Encoded, i: usize, variant: Variant) -> BTreeMap<usize, BTreeSet<usize>> {
    let mut cafter: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();

    // Implicit self-loop: τ always reaches i's own class.
    cafter.entry(0).or_default().insert(enc.c[i]);

    // Visible contribution for every event (including τ).
    for (&ev, succs) in &enc.suc[i] {
        let entry = cafter.entry(ev).or_default();
        for &s in succs {
            entry.insert(enc.c[s]);
        }
    }

    // Propagation along τ-successors, for every event including τ.
    if let Some(tau_succs) = enc.suc[i].get(&0) {
        for &t in tau_succs {
            for (&ev, classes) in &enc.cafter[t] {
                cafter.entry(ev).or_default().extend(classes.iter().copied());
            }
        }
    }

    if variant == Variant::Weak {
        // Symmetric propagation across non-silent successors.
        for (&ev, succs) in &enc.suc[i] {
            if ev == 0 {
                continue;
            }
            for &t in succs {
                if let Some(tau_classes) = enc.cafter[t].get(&0) {
                    cafter.entry(ev).or_default().extend(tau_classes.iter().copied());
                }
            }
        }
        if let Some(tau_succs) = enc.suc[i].get(&0) {
            for &t in tau_succs {
                for (&ev_prime, classes) in &enc.cafter[t] {
                    if ev_prime == 0 {
                        continue;
                    }
                    cafter.entry(ev_prime).or_default().extend(classes.iter().copied());
                }
            }
        }
    }

    cafter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};
    use crate::cancel::Never;

    #[test]
    fn tau_prefixed_path_is_delayed_equivalent() {
        let _ = env_logger::try_init();
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

        let classes = bisimulation(&g, tau, Variant::Delayed, None, &Never).unwrap();
        assert!(classes
            .iter()
            .any(|c| c.contains(&q0) && c.contains(&q3)));
    }

    #[test]
    fn tau_loop_is_rejected() {
        let mut syms = SymbolTable::new();
        let tau = syms.lambda_event();
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        g.add_transition(q0, tau, q1);
        g.add_transition(q1, tau, q0);

        assert!(bisimulation(&g, tau, Variant::Delayed, None, &Never).is_err());
    }
}
