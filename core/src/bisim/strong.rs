//! Strong bisimulation by change-tracking partition refinement (`spec.md`
//! §4.3), following the Blom–Orzan algorithm.

use super::encode::Encoded;
use crate::automaton::{Automaton, State};
use crate::cancel::Canceller;
use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Compute the coarsest strong-bisimulation partition refining
/// `pre_partition` (if given). Singleton classes are dropped from the
/// result, per convention.
pub fn strong_bisimulation(
    automaton: &Automaton,
    pre_partition: Option<&[Vec<State>]>,
    canceller: &dyn Canceller,
) -> Result<Vec<Vec<State>>> {
    let mut enc = Encoded::new(automaton, None);
    let n = enc.num_states();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut next_class = assign_pre_partition(&mut enc, pre_partition)?;
    initial_approximation(&mut enc, &mut next_class);

    for i in 1..=n {
        enc.changed[i] = true;
    }

    let mut round = 0u32;
    while enc.changed[1..=n].iter().any(|&c| c) {
        canceller.check()?;
        round += 1;
        log::trace!("strong_bisimulation: refinement round {round}, {next_class} classes so far");
        refine_once(&mut enc, &mut next_class, canceller)?;
    }
    let classes = enc.classes();
    log::debug!("strong_bisimulation: converged after {round} rounds, {} classes", classes.len());
    Ok(classes)
}

/// Assign each state's starting class from its index into `pre_partition`,
/// or class `0` for everyone if no pre-partition is given. Returns the
/// next free class id (`mCmax` in the original terminology).
pub(crate) fn assign_pre_partition(enc: &mut Encoded, pre_partition: Option<&[Vec<State>]>) -> Result<usize> {
    let n = enc.num_states();
    let Some(blocks) = pre_partition else {
        return Ok(1);
    };
    let mut assigned = vec![false; n + 1];
    for (class_id, block) in blocks.iter().enumerate() {
        for &q in block {
            let idx = enc.dense_of(q);
            enc.c[idx] = class_id;
            assigned[idx] = true;
        }
    }
    for i in 1..=n {
        if !assigned[i] {
            return Err(Error::invalid_pre_partition(format!(
                "state {} not covered by any pre-partition block",
                enc.states[i]
            )));
        }
    }
    Ok(blocks.len())
}

/// Step 1: sort by `(evs, c)`, starting a new class at every change of key
/// (`spec.md` §4.3 step 1).
pub(crate) fn initial_approximation(enc: &mut Encoded, next_class: &mut usize) {
    let n = enc.num_states();
    enc.partition.sort_by(|&a, &b| {
        (&enc.evs[a], enc.c[a]).cmp(&(&enc.evs[b], enc.c[b]))
    });
    if n == 0 {
        return;
    }
    let mut new_c = vec![0usize; n + 1];
    let mut current = *next_class;
    let mut prev_key: Option<(BTreeSet<usize>, usize)> = None;
    for &i in &enc.partition {
        let key = (enc.evs[i].clone(), enc.c[i]);
        if prev_key.as_ref() != Some(&key) {
            current = *next_class;
            *next_class += 1;
            prev_key = Some(key);
        }
        new_c[i] = current;
    }
    for i in 1..=n {
        enc.c[i] = new_c[i];
    }
    enc.partition.sort_by_key(|&i| enc.c[i]);
}

fn refine_once(
    enc: &mut Encoded,
    next_class: &mut usize,
    canceller: &dyn Canceller,
) -> Result<()> {
    let n = enc.num_states();

    // (a) compute affected.
    for i in 1..=n {
        enc.affected[i] = false;
    }
    for i in 1..=n {
        if enc.changed[i] {
            for &p in &enc.pre[i] {
                enc.affected[p] = true;
            }
        }
    }
    for i in 1..=n {
        enc.changed[i] = false;
    }

    // (b) recompute cafter of every affected state.
    for i in 1..=n {
        if !enc.affected[i] {
            continue;
        }
        canceller.check()?;
        let mut cafter = std::collections::BTreeMap::new();
        for (&ev, succs) in &enc.suc[i] {
            let classes: BTreeSet<usize> = succs.iter().map(|&s| enc.c[s]).collect();
            cafter.insert(ev, classes);
        }
        enc.cafter[i] = cafter;
    }

    // (c) refine each class containing an affected state, size > 1.
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
        if !has_affected {
            continue;
        }
        refine_class(enc, start, end, next_class);
    }

    enc.partition.sort_by_key(|&i| enc.c[i]);
    Ok(())
}

/// Refine one equivalence class (`enc.partition[start..end]`, all sharing
/// one class id) by `cafter`, per `spec.md` §4.3 step 2c.
pub(crate) fn refine_class(enc: &mut Encoded, start: usize, end: usize, next_class: &mut usize) {
    let mut members: Vec<usize> = enc.partition[start..end].to_vec();
    members.sort_by_key(|&i| if enc.affected[i] { 0 } else { 1 });
    let split_point = members.partition_point(|&i| enc.affected[i]);

    let affected_slice = &mut members[..split_point];
    affected_slice.sort_by(|&a, &b| enc.cafter[a].cmp(&enc.cafter[b]));

    if affected_slice.is_empty() {
        return;
    }

    // Find the largest contiguous sub-block sharing one `cafter` value.
    let mut blocks: Vec<(usize, usize)> = Vec::new();
    let mut bstart = 0;
    for i in 1..=affected_slice.len() {
        if i == affected_slice.len() || enc.cafter[affected_slice[i]] != enc.cafter[affected_slice[bstart]] {
            blocks.push((bstart, i));
            bstart = i;
        }
    }
    // Largest block wins; ties broken by first encounter (`spec.md` §4.3
    // step 2c), so a strict `>` comparison against the running best.
    let mut keep_block = blocks[0];
    for &(s, e) in &blocks[1..] {
        if e - s > keep_block.1 - keep_block.0 {
            keep_block = (s, e);
        }
    }

    for &(bs, be) in &blocks {
        if (bs, be) == keep_block {
            continue;
        }
        let fresh = *next_class;
        *next_class += 1;
        for &i in &affected_slice[bs..be] {
            enc.c[i] = fresh;
            enc.changed[i] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Attrs, SymbolTable};
    use crate::cancel::Never;

    #[test]
    fn two_silent_equivalent_states_merge() {
        let _ = env_logger::try_init();
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        let q2 = g.add_state();
        g.add_transition(q0, a, q2);
        g.add_transition(q1, a, q2);

        let classes = strong_bisimulation(&g, None, &Never).unwrap();
        assert_eq!(classes.len(), 1);
        let mut merged = classes[0].clone();
        merged.sort();
        let mut expected = vec![q0, q1];
        expected.sort();
        assert_eq!(merged, expected);
    }

    #[test]
    fn distinguishable_states_stay_apart() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let b = syms.declare_event("b", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        let q2 = g.add_state();
        g.add_transition(q0, a, q2);
        g.add_transition(q1, b, q2);

        let classes = strong_bisimulation(&g, None, &Never).unwrap();
        assert!(classes.is_empty());
    }

    #[test]
    fn invalid_pre_partition_is_an_error() {
        let syms = SymbolTable::new();
        let mut g = Automaton::new(syms);
        let _q0 = g.add_state();
        let q1 = g.add_state();
        let pre = vec![vec![q1]];
        assert!(strong_bisimulation(&g, Some(&pre), &Never).is_err());
    }
}
