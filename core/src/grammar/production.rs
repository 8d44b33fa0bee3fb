use super::nonterminal::Nonterminal;
use crate::automaton::Event;

/// A symbol occurring on the right-hand side of a production: either a
/// terminal (automaton event) or a nonterminal (`spec.md` §3.3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarSymbol {
    Terminal(Event),
    Nonterminal(Nonterminal),
}

impl GrammarSymbol {
    pub fn as_terminal(&self) -> Option<Event> {
        match self {
            GrammarSymbol::Terminal(e) => Some(*e),
            GrammarSymbol::Nonterminal(_) => None,
        }
    }

    pub fn as_nonterminal(&self) -> Option<&Nonterminal> {
        match self {
            GrammarSymbol::Nonterminal(n) => Some(n),
            GrammarSymbol::Terminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GrammarSymbol::Terminal(_))
    }
}

/// `lhs -> rhs` (`rhs` empty denotes an `ε`-production).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Nonterminal,
    pub rhs: Vec<GrammarSymbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}
