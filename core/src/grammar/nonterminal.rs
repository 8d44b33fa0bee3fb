use crate::automaton::{StackSym, State};

/// A nonterminal derived from a pushdown automaton's states and stack
/// alphabet (`spec.md` §3.3).
///
/// - "End-form" `(q, w)`: derives exactly the strings that take the
///   automaton from `q` with `w` on top of the stack down to a state where
///   `w` has just been fully popped (`end` is `None`).
/// - "Mid-form" `(q, w, q')`: derives the strings that take the automaton
///   from `q` to `q'` while the net effect on the stack is to pop `w`
///   (`end` is `Some(q')`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonterminal {
    pub start: State,
    pub word: Vec<StackSym>,
    pub end: Option<State>,
}

impl Nonterminal {
    /// An end-form nonterminal `(q, w)`.
    pub fn end_form(start: State, word: Vec<StackSym>) -> Self {
        Self {
            start,
            word,
            end: None,
        }
    }

    /// A mid-form nonterminal `(q, w, q')`.
    pub fn mid_form(start: State, word: Vec<StackSym>, end: State) -> Self {
        Self {
            start,
            word,
            end: Some(end),
        }
    }

    pub fn is_end_form(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_mid_form(&self) -> bool {
        self.end.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desflow_entity::EntityRef;

    #[test]
    fn end_vs_mid_form() {
        let q0 = State::new(0);
        let q1 = State::new(1);
        let z = StackSym::new(0);
        let e = Nonterminal::end_form(q0, vec![z]);
        let m = Nonterminal::mid_form(q0, vec![z], q1);
        assert!(e.is_end_form());
        assert!(m.is_mid_form());
        assert_ne!(e, m);
    }
}
