//! Explicit, caller-owned symbol tables (DESIGN NOTES §9: "Global symbol
//! tables").
//!
//! The original source keeps event and stack-symbol tables as process-wide
//! singletons; two automata that interoperate (e.g. the two operands of
//! `Times`) must be built against the same table. Rather than a global or a
//! shared `Rc<RefCell<_>>`, `desflow-core` resolves cross-automaton sharing
//! by name: every operation that combines automata (`Times`, bisimulation
//! with a silent event named by the caller, ...) looks events up by name, so
//! two automata built from *separate* `SymbolTable`s that happen to declare
//! the same event names still interoperate correctly. Building both from one
//! shared `SymbolTable` up front (the common case) just means `declare_event`
//! returns the same `Event` index both times, for free.

use super::attrs::Attrs;
use super::ids::{Event, StackSym, LAMBDA_EVENT, LAMBDA_STACK};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct EventInfo {
    name: String,
    attrs: Attrs,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    events: Vec<EventInfo>,
    event_by_name: HashMap<String, Event>,
    stack_syms: Vec<String>,
    stack_sym_by_name: HashMap<String, StackSym>,
}

impl SymbolTable {
    /// A fresh table, with `λ` pre-declared at index 0 for both the event
    /// and the stack-symbol tables (`spec.md` §3.1: "`λ` indices are stable
    /// and shared").
    pub fn new() -> Self {
        let mut t = Self {
            events: Vec::new(),
            event_by_name: HashMap::new(),
            stack_syms: Vec::new(),
            stack_sym_by_name: HashMap::new(),
        };
        let lambda_event = t.declare_event("lambda", Attrs::NONE);
        debug_assert_eq!(lambda_event, LAMBDA_EVENT);
        let lambda_stack = t.declare_stack_sym("lambda");
        debug_assert_eq!(lambda_stack, LAMBDA_STACK);
        t
    }

    /// The distinguished silent event `λ`/`τ`.
    pub fn lambda_event(&self) -> Event {
        LAMBDA_EVENT
    }

    /// The distinguished "no stack change" symbol `λ`.
    pub fn lambda_stack(&self) -> StackSym {
        LAMBDA_STACK
    }

    /// Look up or declare an event by name, with the given attributes used
    /// only the first time the name is declared.
    pub fn declare_event(&mut self, name: &str, attrs: Attrs) -> Event {
        if let Some(&e) = self.event_by_name.get(name) {
            return e;
        }
        let e = Event::new(self.events.len());
        self.events.push(EventInfo {
            name: name.to_string(),
            attrs,
        });
        self.event_by_name.insert(name.to_string(), e);
        e
    }

    /// Look up an already-declared event by name.
    pub fn event_named(&self, name: &str) -> Option<Event> {
        self.event_by_name.get(name).copied()
    }

    pub fn event_name(&self, e: Event) -> &str {
        &self.events[e.index()].name
    }

    pub fn event_attrs(&self, e: Event) -> Attrs {
        self.events[e.index()].attrs
    }

    pub fn set_event_attrs(&mut self, e: Event, attrs: Attrs) {
        self.events[e.index()].attrs = attrs;
    }

    /// Look up or declare a stack symbol by name.
    pub fn declare_stack_sym(&mut self, name: &str) -> StackSym {
        if let Some(&s) = self.stack_sym_by_name.get(name) {
            return s;
        }
        let s = StackSym::new(self.stack_syms.len());
        self.stack_syms.push(name.to_string());
        self.stack_sym_by_name.insert(name.to_string(), s);
        s
    }

    /// Every stack symbol declared so far, including `λ` at index 0. Used
    /// by `crate::pushdown::spda` to enumerate possible stack tops when a
    /// split needs to push a new symbol without knowing what is beneath it.
    pub fn all_stack_syms(&self) -> impl Iterator<Item = StackSym> + '_ {
        (0..self.stack_syms.len()).map(StackSym::new)
    }

    pub fn stack_sym_named(&self, name: &str) -> Option<StackSym> {
        self.stack_sym_by_name.get(name).copied()
    }

    pub fn stack_sym_name(&self, s: StackSym) -> &str {
        &self.stack_syms[s.index()]
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

use desflow_entity::EntityRef;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent() {
        let mut t = SymbolTable::new();
        let a1 = t.declare_event("a", Attrs::DEFAULT_EVENT);
        let a2 = t.declare_event("a", Attrs::NONE);
        assert_eq!(a1, a2);
        assert_eq!(t.event_attrs(a1), Attrs::DEFAULT_EVENT);
    }

    #[test]
    fn lambda_is_stable() {
        let t = SymbolTable::new();
        assert_eq!(t.lambda_event(), LAMBDA_EVENT);
        assert_eq!(t.lambda_stack(), LAMBDA_STACK);
    }
}
