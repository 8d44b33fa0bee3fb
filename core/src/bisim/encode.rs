//! Dense integer encoding used by the refinement engine (`spec.md` §4.2).

use crate::automaton::{Automaton, Event, State};
use desflow_entity::EntityRef;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

/// Per-state successor/predecessor lists are usually tiny (most states fire
/// a handful of events); inline up to 4 before spilling to the heap.
type Small = SmallVec<[usize; 4]>;

/// The dense, array-based view of an `Automaton` that the change-tracking
/// refinement loops operate over. States and events are renumbered `1..=N`;
/// index `0` is the sentinel slot `spec.md` §4.2 reserves (and, when a
/// silent event is in play, its dense index *is* `0`, so "no active events"
/// and "only silent events active" both read naturally as index `0`).
pub struct Encoded {
    /// `dense[i]` is the original `State` for dense index `i` (1-based; `[0]`
    /// is an unused placeholder so indices line up with the `N+1`-sized
    /// vectors described by `spec.md` §4.2).
    pub states: Vec<State>,
    state_index: BTreeMap<State, usize>,
    /// `events[0]` is the silent event's dense id when one is configured
    /// (always `0` by construction); non-silent events occupy `1..`.
    event_index: BTreeMap<Event, usize>,
    pub silent: Option<Event>,

    /// `suc[state][event]` = successor dense state indices.
    pub suc: Vec<BTreeMap<usize, Small>>,
    /// Non-silent predecessors of each state.
    pub pre: Vec<Small>,
    /// τ-predecessors of each state (abstract variants only; empty otherwise).
    pub taupre: Vec<Small>,
    /// Active event dense-ids per state (never contains the silent event).
    pub evs: Vec<BTreeSet<usize>>,
    /// Current class id per state.
    pub c: Vec<usize>,
    /// `cafter[state][event]` = set of class ids reachable via `event`.
    pub cafter: Vec<BTreeMap<usize, BTreeSet<usize>>>,
    /// State dense-indices kept sorted by `c`.
    pub partition: Vec<usize>,
    pub affected: Vec<bool>,
    pub changed: Vec<bool>,
}

fn dense_event_id(
    event_index: &mut BTreeMap<Event, usize>,
    next_id: &mut usize,
    silent: Option<Event>,
    e: Event,
) -> usize {
    if Some(e) == silent {
        return 0;
    }
    if let Some(&id) = event_index.get(&e) {
        return id;
    }
    let id = *next_id;
    *next_id += 1;
    event_index.insert(e, id);
    id
}

impl Encoded {
    /// Encode `automaton`, treating `silent` (if any) as the τ event whose
    /// dense id is fixed at `0`.
    pub fn new(automaton: &Automaton, silent: Option<Event>) -> Self {
        let n = automaton.num_states();
        let mut states = vec![State::new(0); n + 1];
        let mut state_index = BTreeMap::new();
        for (i, q) in automaton.states().enumerate() {
            states[i + 1] = q;
            state_index.insert(q, i + 1);
        }

        let mut event_index = BTreeMap::new();
        let mut next_event_id = 1usize;

        let mut suc: Vec<BTreeMap<usize, Small>> = vec![BTreeMap::new(); n + 1];
        let mut pre: Vec<Small> = vec![Small::new(); n + 1];
        let mut taupre: Vec<Small> = vec![Small::new(); n + 1];

        for t in automaton.transitions() {
            let from = state_index[&t.from];
            let to = state_index[&t.to];
            let ev_id = dense_event_id(&mut event_index, &mut next_event_id, silent, t.event);
            suc[from].entry(ev_id).or_default().push(to);
            if Some(t.event) == silent {
                taupre[to].push(from);
            } else {
                pre[to].push(from);
            }
        }
        for v in pre.iter_mut() {
            v.sort_unstable();
            v.dedup();
        }
        for v in taupre.iter_mut() {
            v.sort_unstable();
            v.dedup();
        }

        let mut evs = vec![BTreeSet::new(); n + 1];
        for i in 1..=n {
            for &ev_id in suc[i].keys() {
                if ev_id != 0 {
                    evs[i].insert(ev_id);
                }
            }
        }

        Self {
            states,
            state_index,
            event_index,
            silent,
            suc,
            pre,
            taupre,
            evs,
            c: vec![0; n + 1],
            cafter: vec![BTreeMap::new(); n + 1],
            partition: (1..=n).collect(),
            affected: vec![false; n + 1],
            changed: vec![false; n + 1],
        }
    }

    pub fn num_states(&self) -> usize {
        self.states.len() - 1
    }

    pub fn dense_of(&self, q: State) -> usize {
        self.state_index[&q]
    }

    pub fn original_event(&self, dense_id: usize) -> Option<Event> {
        if dense_id == 0 {
            return self.silent;
        }
        self.event_index
            .iter()
            .find(|&(_, &id)| id == dense_id)
            .map(|(&e, _)| e)
    }

    /// Partition the original `State`s by current class, dropping singleton
    /// classes per the API convention (`spec.md` §4.3 step 3).
    pub fn classes(&self) -> Vec<Vec<State>> {
        let mut by_class: BTreeMap<usize, Vec<State>> = BTreeMap::new();
        for i in 1..=self.num_states() {
            by_class.entry(self.c[i]).or_default().push(self.states[i]);
        }
        by_class
            .into_values()
            .filter(|members| members.len() > 1)
            .collect()
    }
}
