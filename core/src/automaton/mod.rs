//! The finite- and pushdown-automaton data model (`spec.md` §3.1).

mod attrs;
mod finite;
mod ids;
mod pda;
mod provenance;
mod symbols;
mod transition;

pub use attrs::Attrs;
pub use finite::Automaton;
pub use ids::{Event, StackSym, State, LAMBDA_EVENT, LAMBDA_STACK};
pub use pda::Pda;
pub use provenance::{Provenance, TransitionKey};
pub use symbols::SymbolTable;
pub use transition::{PdOps, PdTransition, StackOp, Transition};
