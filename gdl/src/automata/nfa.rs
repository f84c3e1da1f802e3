//! Thompson construction: regex AST → NFA.
//!
//! Fragments are built backwards. [`to_nfa`] receives the state the fragment
//! must lead to and returns the fragment's entry state, so a sequence is a
//! right fold and every branch of an alternation shares one end state. Only
//! the end state created by [`build_nfa`] is final.
//!
//! ```text
//!   a*    hub ─ε─▶ end              a?    entry ─ε─▶ end
//!         hub ─ε─▶ s ─a─▶ hub             entry ─ε─▶ s ─a─▶ end
//! ```

use super::regex::RegexAst;
use super::{ByteLabel, Label, Nfa, StateId, Terminal};

/// Build the NFA for `ast`, with a single final end state.
pub fn build_nfa(ast: &RegexAst) -> Nfa {
    let mut nfa = Nfa::default();
    let end = nfa.add_state(Terminal::Final);
    nfa.start = to_nfa(&mut nfa, ast, end);
    nfa
}

/// Add the states for `ast` to `nfa`, leading to `end`, and return the entry
/// state of the new fragment.
pub fn to_nfa(nfa: &mut Nfa, ast: &RegexAst, end: StateId) -> StateId {
    match ast {
        RegexAst::Seq(items) => items.iter().rev().fold(end, |next, item| to_nfa(nfa, item, next)),
        RegexAst::Range(min, max) => {
            let s = nfa.add_state(Terminal::Standard);
            nfa.add_transition(s, Label::Consuming(ByteLabel::Range(*min, *max)), end);
            s
        },
        RegexAst::Any => {
            let s = nfa.add_state(Terminal::Standard);
            nfa.add_transition(s, Label::Consuming(ByteLabel::Any), end);
            s
        },
        RegexAst::Alt(branches) => {
            let starts: Vec<StateId> = branches.iter().map(|b| to_nfa(nfa, b, end)).collect();
            let s = nfa.add_state(Terminal::Standard);
            for start in starts {
                nfa.add_epsilon(s, start);
            }
            s
        },
        RegexAst::Rep0(inner) => {
            // The body loops back to a fresh hub, so the skip edge never
            // attaches to a state inside the body.
            let hub = nfa.add_state(Terminal::Standard);
            let body = to_nfa(nfa, inner, hub);
            nfa.add_epsilon(hub, body);
            nfa.add_epsilon(hub, end);
            hub
        },
        RegexAst::Opt(inner) => {
            let body = to_nfa(nfa, inner, end);
            let entry = nfa.add_state(Terminal::Standard);
            nfa.add_epsilon(entry, body);
            nfa.add_epsilon(entry, end);
            entry
        },
    }
}
