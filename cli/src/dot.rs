//! DOT export for a finite automaton (`spec.md` §6.3). Export only — the
//! importer is out of scope (`spec.md` §1 Non-goals); there is no `dot::parse`.

use desflow_core::automaton::Automaton;
use std::fmt::Write as _;

/// Render `g` as a `digraph`, following §6.3's conventions: every event
/// name is emitted once as an invisible node carrying its short-form
/// attribute word, marked states are drawn as `doublecircle`, and the
/// initial state gets an arrow from an invisible source node.
pub fn export(g: &Automaton) -> String {
    let mut out = String::new();
    out.push_str("digraph G {\n");
    out.push_str("  rankdir=LR;\n");

    for e in distinct_events(g) {
        let _ = writeln!(
            out,
            "  \"event_{}\" [label=\"{}\", shape=plaintext, style=invis];",
            g.symbols().event_name(e),
            g.symbols().event_attrs(e).short_form()
        );
    }

    for q in g.states() {
        let shape = if g.is_marked(q) { "doublecircle" } else { "circle" };
        let _ = writeln!(out, "  \"{q}\" [shape={shape}];");
        if g.is_initial(q) {
            let _ = writeln!(out, "  \"init_{q}\" [shape=point, style=invis];");
            let _ = writeln!(out, "  \"init_{q}\" -> \"{q}\";");
        }
    }

    for t in g.transitions() {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\"];",
            t.from,
            t.to,
            g.symbols().event_name(t.event)
        );
    }

    out.push_str("}\n");
    out
}

fn distinct_events(g: &Automaton) -> Vec<desflow_core::automaton::Event> {
    let mut seen = std::collections::BTreeSet::new();
    for t in g.transitions() {
        seen.insert(t.event);
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use desflow_core::automaton::{Attrs, SymbolTable};

    #[test]
    fn export_marks_doublecircle_for_marked_states() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        g.set_initial(q0, true);
        g.set_marked(q1, true);
        g.add_transition(q0, a, q1);

        let dot = export(&g);
        assert!(dot.contains("digraph G"));
        assert!(dot.contains("doublecircle"));
        assert!(dot.contains("\"q0\" -> \"q1\" [label=\"a\"]"));
    }
}
