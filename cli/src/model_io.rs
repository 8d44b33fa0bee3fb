//! Reads and writes `Automaton`/`Pda` values through the `tokens` module's
//! section grammar (`spec.md` §6.1), the glue that lets `main`'s
//! subcommands load/save generators from disk.
//!
//! ```text
//! <Generator name="g">
//!   <Events> a 0x0a  b 0x0a </Events>
//!   <States> q0 q1 </States>
//!   <InitStates> q0 </InitStates>
//!   <MarkedStates> q1 </MarkedStates>
//!   <TransRel> q0 a q1 </TransRel>
//! </Generator>
//! ```
//! A `Pda` additionally carries `<StackSymbols>`, a `<StackBottom>`, and
//! each `<TransRel>` row ends with a `pop ; push` word list separated by a
//! literal `;` identifier.

use crate::tokens::{lex, Located, Token, TokenError, TokenResult};
use desflow_core::automaton::{Attrs, Automaton, Pda, StackOp, SymbolTable};
use std::collections::BTreeMap;

struct Cursor<'a> {
    tokens: &'a [Located],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Located]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|l| &l.token)
    }

    fn next(&mut self) -> Option<&'a Located> {
        let l = self.tokens.get(self.pos);
        self.pos += 1;
        l
    }

    fn expect_begin(&mut self, name: &str) -> TokenResult<Vec<(String, String)>> {
        match self.next() {
            Some(Located {
                token: Token::BeginSection { name: n, attrs },
                ..
            }) if n == name => Ok(attrs.clone()),
            Some(l) => Err(TokenError {
                location: l.location,
                message: format!("expected <{name}>, found {:?}", l.token),
            }),
            None => Err(TokenError {
                location: Default::default(),
                message: format!("expected <{name}>, found end of stream"),
            }),
        }
    }

    fn expect_end(&mut self, name: &str) -> TokenResult<()> {
        match self.next() {
            Some(Located {
                token: Token::EndSection(n),
                ..
            }) if n == name => Ok(()),
            Some(l) => Err(TokenError {
                location: l.location,
                message: format!("expected </{name}>, found {:?}", l.token),
            }),
            None => Err(TokenError {
                location: Default::default(),
                message: format!("expected </{name}>, found end of stream"),
            }),
        }
    }

    /// Collect bare words (`Ident`/`Int`, stringified) up to the next
    /// section boundary, without consuming it.
    fn words_until_section(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(tok) = self.peek() {
            match tok {
                Token::Ident(s) => {
                    out.push(s.clone());
                    self.pos += 1;
                }
                Token::Int(n) => {
                    out.push(n.to_string());
                    self.pos += 1;
                }
                Token::Str(s) => {
                    out.push(s.clone());
                    self.pos += 1;
                }
                _ => break,
            }
        }
        out
    }
}

/// Read a plain finite automaton (no stack alphabet) from its token-stream
/// form.
pub fn read_automaton(text: &str) -> TokenResult<Automaton> {
    let tokens = lex(text)?;
    let mut cur = Cursor::new(&tokens);
    cur.expect_begin("Generator")?;

    let mut syms = SymbolTable::new();
    cur.expect_begin("Events")?;
    let event_words = cur.words_until_section();
    cur.expect_end("Events")?;
    let mut event_by_name = BTreeMap::new();
    let mut it = event_words.into_iter();
    while let Some(name) = it.next() {
        let flags = it.next().unwrap_or_else(|| "0x0a".to_string());
        let bits = u32::from_str_radix(flags.trim_start_matches("0x"), 16).unwrap_or(0x0a);
        let e = syms.declare_event(&name, Attrs::from_bits(bits));
        event_by_name.insert(name, e);
    }

    cur.expect_begin("States")?;
    let state_words = cur.words_until_section();
    cur.expect_end("States")?;

    let mut g = Automaton::new(syms);
    let mut state_by_name = BTreeMap::new();
    for name in &state_words {
        state_by_name.insert(name.clone(), g.add_state());
    }

    cur.expect_begin("InitStates")?;
    for name in cur.words_until_section() {
        if let Some(&q) = state_by_name.get(&name) {
            g.set_initial(q, true);
        }
    }
    cur.expect_end("InitStates")?;

    cur.expect_begin("MarkedStates")?;
    for name in cur.words_until_section() {
        if let Some(&q) = state_by_name.get(&name) {
            g.set_marked(q, true);
        }
    }
    cur.expect_end("MarkedStates")?;

    cur.expect_begin("TransRel")?;
    let rel_words = cur.words_until_section();
    cur.expect_end("TransRel")?;
    for chunk in rel_words.chunks(3) {
        if let [from, ev, to] = chunk {
            if let (Some(&qf), Some(&e), Some(&qt)) =
                (state_by_name.get(from), event_by_name.get(ev), state_by_name.get(to))
            {
                g.add_transition(qf, e, qt);
            }
        }
    }

    cur.expect_end("Generator")?;
    Ok(g)
}

/// Write a plain finite automaton to its token-stream form.
pub fn write_automaton(g: &Automaton) -> String {
    let mut w = crate::tokens::Writer::new();
    w.begin_section("Generator", &[("name", "g")]);

    w.begin_section("Events", &[]);
    let mut seen = std::collections::BTreeSet::new();
    for t in g.transitions() {
        seen.insert(t.event);
    }
    for e in seen {
        w.word(&format!(
            "{} 0x{:02x}",
            g.symbols().event_name(e),
            g.symbols().event_attrs(e).bits()
        ));
    }
    w.end_section("Events");

    w.begin_section("States", &[]);
    for q in g.states() {
        w.word(&q.to_string());
    }
    w.end_section("States");

    w.begin_section("InitStates", &[]);
    for q in g.initial_states() {
        w.word(&q.to_string());
    }
    w.end_section("InitStates");

    w.begin_section("MarkedStates", &[]);
    for q in g.marked_states() {
        w.word(&q.to_string());
    }
    w.end_section("MarkedStates");

    w.begin_section("TransRel", &[]);
    for t in g.transitions() {
        w.word(&format!("{} {} {}", t.from, g.symbols().event_name(t.event), t.to));
    }
    w.end_section("TransRel");

    w.end_section("Generator");
    w.finish()
}

/// Read a pushdown automaton. Transitions are encoded as
/// `from event to ; pop-syms ; push-syms ;` with `;` as an explicit
/// separator, since pop/push lists are variable-length.
pub fn read_pda(text: &str) -> TokenResult<Pda> {
    let tokens = lex(text)?;
    let mut cur = Cursor::new(&tokens);
    cur.expect_begin("Generator")?;

    let mut syms = SymbolTable::new();
    cur.expect_begin("Events")?;
    let event_words = cur.words_until_section();
    cur.expect_end("Events")?;
    let mut event_by_name = BTreeMap::new();
    let mut it = event_words.into_iter();
    while let Some(name) = it.next() {
        let flags = it.next().unwrap_or_else(|| "0x0a".to_string());
        let bits = u32::from_str_radix(flags.trim_start_matches("0x"), 16).unwrap_or(0x0a);
        let e = syms.declare_event(&name, Attrs::from_bits(bits));
        event_by_name.insert(name, e);
    }

    cur.expect_begin("StackSymbols")?;
    let stack_words = cur.words_until_section();
    cur.expect_end("StackSymbols")?;
    let mut stack_by_name = BTreeMap::new();
    for name in &stack_words {
        stack_by_name.insert(name.clone(), syms.declare_stack_sym(name));
    }

    cur.expect_begin("StackBottom")?;
    let bottom_words = cur.words_until_section();
    cur.expect_end("StackBottom")?;
    let bottom = bottom_words
        .first()
        .and_then(|n| stack_by_name.get(n))
        .copied()
        .unwrap_or_else(|| syms.lambda_stack());

    cur.expect_begin("States")?;
    let state_words = cur.words_until_section();
    cur.expect_end("States")?;

    let mut pda = Pda::new(syms, bottom);
    let mut state_by_name = BTreeMap::new();
    for name in &state_words {
        state_by_name.insert(name.clone(), pda.add_state());
    }

    cur.expect_begin("InitStates")?;
    for name in cur.words_until_section() {
        if let Some(&q) = state_by_name.get(&name) {
            pda.set_initial(q, true);
        }
    }
    cur.expect_end("InitStates")?;

    cur.expect_begin("MarkedStates")?;
    for name in cur.words_until_section() {
        if let Some(&q) = state_by_name.get(&name) {
            pda.set_marked(q, true);
        }
    }
    cur.expect_end("MarkedStates")?;

    cur.expect_begin("TransRel")?;
    let rel_words = cur.words_until_section();
    cur.expect_end("TransRel")?;
    for row in rel_words.split(|w| w.as_str() == ";;") {
        let parts: Vec<&String> = row.iter().collect();
        if parts.len() < 3 {
            continue;
        }
        let (from, ev, to) = (parts[0], parts[1], parts[2]);
        let mut pop = Vec::new();
        let mut push = Vec::new();
        let mut target = &mut pop;
        for w in &parts[3..] {
            if w.as_str() == ";" {
                target = &mut push;
                continue;
            }
            if let Some(&sym) = stack_by_name.get(*w) {
                target.push(sym);
            }
        }
        if let (Some(&qf), Some(&e), Some(&qt)) =
            (state_by_name.get(from), event_by_name.get(ev), state_by_name.get(to))
        {
            pda.add_transition(qf, e, qt, StackOp::new(pop, push));
        }
    }

    cur.expect_end("Generator")?;
    Ok(pda)
}

/// Write a pushdown automaton to its token-stream form.
pub fn write_pda(pda: &Pda) -> String {
    let mut w = crate::tokens::Writer::new();
    w.begin_section("Generator", &[("name", "g")]);

    w.begin_section("Events", &[]);
    let mut seen = std::collections::BTreeSet::new();
    for t in pda.transitions() {
        seen.insert(t.event);
    }
    for e in seen {
        w.word(&format!(
            "{} 0x{:02x}",
            pda.symbols().event_name(e),
            pda.symbols().event_attrs(e).bits()
        ));
    }
    w.end_section("Events");

    w.begin_section("StackSymbols", &[]);
    for s in pda.symbols().all_stack_syms() {
        if !s.is_lambda() {
            w.word(&pda.symbols().stack_sym_name(s).to_string());
        }
    }
    w.end_section("StackSymbols");

    w.begin_section("StackBottom", &[]);
    w.word(pda.symbols().stack_sym_name(pda.stack_bottom()));
    w.end_section("StackBottom");

    w.begin_section("States", &[]);
    for q in pda.states() {
        w.word(&q.to_string());
    }
    w.end_section("States");

    w.begin_section("InitStates", &[]);
    for q in pda.initial_states() {
        w.word(&q.to_string());
    }
    w.end_section("InitStates");

    w.begin_section("MarkedStates", &[]);
    for q in pda.marked_states() {
        w.word(&q.to_string());
    }
    w.end_section("MarkedStates");

    w.begin_section("TransRel", &[]);
    for t in pda.transitions() {
        let pop: Vec<&str> = t.op.pop.iter().map(|s| pda.symbols().stack_sym_name(*s)).collect();
        let push: Vec<&str> = t.op.push.iter().map(|s| pda.symbols().stack_sym_name(*s)).collect();
        w.word(&format!(
            "{} {} {} {} ; {} ;;",
            t.from,
            pda.symbols().event_name(t.event),
            t.to,
            pop.join(" "),
            push.join(" ")
        ));
    }
    w.end_section("TransRel");

    w.end_section("Generator");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automaton_round_trips_through_tokens() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let mut g = Automaton::new(syms);
        let q0 = g.add_state();
        let q1 = g.add_state();
        g.set_initial(q0, true);
        g.set_marked(q1, true);
        g.add_transition(q0, a, q1);

        let text = write_automaton(&g);
        let back = read_automaton(&text).unwrap();
        assert_eq!(back.num_states(), 2);
        assert_eq!(back.num_transitions(), 1);
        assert_eq!(back.initial_states().count(), 1);
        assert_eq!(back.marked_states().count(), 1);
    }

    #[test]
    fn pda_round_trips_through_tokens() {
        let mut syms = SymbolTable::new();
        let a = syms.declare_event("a", Attrs::DEFAULT_EVENT);
        let bottom = syms.declare_stack_sym("bot");
        let mut pda = Pda::new(syms, bottom);
        let q0 = pda.add_state();
        let q1 = pda.add_state();
        pda.set_initial(q0, true);
        pda.set_marked(q1, true);
        pda.add_transition(q0, a, q1, StackOp::new(vec![bottom], vec![bottom, bottom]));

        let text = write_pda(&pda);
        let back = read_pda(&text).unwrap();
        assert_eq!(back.num_states(), 2);
        assert_eq!(back.num_triples(), 1);
        let t = back.transitions().next().unwrap();
        assert_eq!(t.op.pop.len(), 1);
        assert_eq!(t.op.push.len(), 2);
    }
}
