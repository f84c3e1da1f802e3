//! Tests for the regex → NFA → DFA pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use astify_runtime::{
    text_token, Lexer, LexerDescriptor, SparseDfa, StateId, StateType, Token, TokenStream,
};
use proptest::prelude::*;

use crate::automata::nfa::build_nfa;
use crate::automata::subset::epsilon_closure;
use crate::automata::{regex_to_dfa, ByteLabel, Label, Nfa};
use crate::tokens::identifier_regex;
use crate::{compile, compile_with_stats, CompileStats, RegexAst};

/// Run `input` through `dfa` and record the state kind after each byte
/// (`None` once the machine has no transition).
fn trace(dfa: &SparseDfa, input: &[u8]) -> Vec<Option<StateType>> {
    let mut state = Some(SparseDfa::START);
    input
        .iter()
        .map(|&byte| {
            state = state.and_then(|s| dfa.step(s, byte));
            state.and_then(|s| dfa.state(s)).map(|s| s.kind)
        })
        .collect()
}

#[test]
fn test_single_char_final_after_one_byte() {
    let dfa = compile("a").expect("compiles");
    assert_eq!(dfa.state(SparseDfa::START).map(|s| s.kind), Some(StateType::Standard));
    assert_eq!(trace(&dfa, b"a"), vec![Some(StateType::Final)]);
    assert_eq!(trace(&dfa, b"b"), vec![None]);
}

#[test]
fn test_two_chars_final_only_after_both() {
    let dfa = compile("ab").expect("compiles");
    assert_eq!(trace(&dfa, b"ab"), vec![Some(StateType::Standard), Some(StateType::Final)]);
    assert_eq!(trace(&dfa, b"ac"), vec![Some(StateType::Standard), None]);

    let descriptor = LexerDescriptor::new(text_token("other")).pattern(dfa, text_token("ab"));
    assert_eq!(descriptor.read_token(b"ac", 0), (None, 1));
}

#[test]
fn test_identifier_stops_at_space() {
    let dfa = regex_to_dfa(&identifier_regex());
    let descriptor = Arc::new(
        LexerDescriptor::new(text_token("other")).pattern(dfa.clone(), text_token("identifier")),
    );

    let first: Token<&str> = Lexer::new(descriptor, "foo1 bar".as_bytes())
        .pull()
        .token
        .expect("one token");
    assert_eq!(first.kind, "identifier");
    assert_eq!(first.text, "foo1");
    assert_eq!(first.position.len(), 4);

    let after_foo1 = b"foo1"
        .iter()
        .try_fold(SparseDfa::START, |s, &b| dfa.step(s, b))
        .expect("foo1 is a path through the DFA");
    assert_eq!(dfa.step(after_foo1, b' '), None);
}

#[test]
fn test_identifier_shape() {
    let dfa = regex_to_dfa(&identifier_regex());
    for accepted in ["a", "Z", "foo_1", "x9_y"] {
        assert!(dfa.accepts(accepted.as_bytes()), "{accepted} should be an identifier");
    }
    for rejected in ["", "1a", "_a", "a-b", "a b"] {
        assert!(!dfa.accepts(rejected.as_bytes()), "{rejected} should not be an identifier");
    }
}

#[test]
fn test_quantifiers_end_to_end() {
    let dfa = compile("a+b?c*").expect("compiles");
    for accepted in ["a", "aaa", "ab", "abc", "acc", "aabccc"] {
        assert!(dfa.accepts(accepted.as_bytes()), "{accepted}");
    }
    for rejected in ["", "b", "abb", "ca", "abca"] {
        assert!(!dfa.accepts(rejected.as_bytes()), "{rejected}");
    }
}

#[test]
fn test_any_byte() {
    let dfa = compile("a.c").expect("compiles");
    assert!(dfa.accepts(b"abc"));
    assert!(dfa.accepts(b"a\x00c"));
    assert!(dfa.accepts(b"a\xffc"));
    assert!(!dfa.accepts(b"ac"));
}

#[test]
fn test_compile_stats() {
    let (_, stats) = compile_with_stats("ab").expect("compiles");
    assert_eq!(
        stats,
        CompileStats { num_nfa_states: 3, num_dfa_states: 3, num_transitions: 2, num_final_states: 1 }
    );

    let (dfa, stats) = compile_with_stats("(ab)*").expect("compiles");
    assert_eq!(stats.num_dfa_states, dfa.num_states());
    assert_eq!(stats.num_final_states, 1);
    assert!(dfa.accepts(b""));
    assert!(dfa.accepts(b"abab"));
    assert!(!dfa.accepts(b"aba"));
}

#[test]
fn test_encode_compiled() {
    let dfa = compile("ab").expect("compiles");
    assert_eq!(dfa.encode(false), "D(S(T(1, 97, 97)),S(T(2, 98, 98)),F())");
}

// ══════════════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════════════

fn arb_regex() -> impl Strategy<Value = RegexAst> {
    let leaf = prop_oneof![
        Just(RegexAst::Any),
        (b'a'..=b'd').prop_map(RegexAst::byte),
        (b'a'..=b'd', b'a'..=b'd').prop_map(|(x, y)| RegexAst::range(x.min(y), x.max(y))),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..3).prop_map(RegexAst::Seq),
            proptest::collection::vec(inner.clone(), 1..3).prop_map(RegexAst::Alt),
            inner.clone().prop_map(RegexAst::rep0),
            inner.prop_map(RegexAst::opt),
        ]
    })
}

fn arb_input() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(proptest::sample::select(vec![b'a', b'b', b'c', b'd', b'e']), 0..6)
}

/// Direct NFA simulation over sets of states.
fn nfa_accepts(nfa: &Nfa, input: &[u8]) -> bool {
    let mut current = epsilon_closure(nfa, &[nfa.start]);
    for &byte in input {
        let mut next: Vec<StateId> = Vec::new();
        for &s in current.states() {
            for &(label, to) in &nfa.state(s).transitions {
                let hit = match label {
                    Label::Epsilon => false,
                    Label::Consuming(ByteLabel::Range(min, max)) => (min..=max).contains(&byte),
                    Label::Consuming(ByteLabel::Any) => true,
                };
                if hit {
                    next.push(to);
                }
            }
        }
        current = epsilon_closure(nfa, &next);
    }
    current.is_final(nfa)
}

proptest! {
    #[test]
    fn prop_dfa_is_deterministic(ast in arb_regex()) {
        let dfa = regex_to_dfa(&ast);
        for state in &dfa.states {
            let mut seen: HashSet<u8> = HashSet::new();
            let mut anys = 0;
            for t in &state.transitions {
                if t.is_any() {
                    anys += 1;
                    continue;
                }
                for byte in t.min..=t.max {
                    prop_assert!(seen.insert(byte as u8), "byte {} is covered twice", byte);
                }
            }
            prop_assert!(anys <= 1);
        }
    }

    #[test]
    fn prop_dfa_matches_nfa(ast in arb_regex(), input in arb_input()) {
        let nfa = build_nfa(&ast);
        let dfa = regex_to_dfa(&ast);
        prop_assert_eq!(dfa.accepts(&input), nfa_accepts(&nfa, &input), "regex {}", ast);
    }

    #[test]
    fn prop_closure_is_idempotent(ast in arb_regex(), picks in proptest::collection::vec(any::<u32>(), 0..4)) {
        let nfa = build_nfa(&ast);
        let seeds: Vec<StateId> = picks.iter().map(|p| p % nfa.num_states() as u32).collect();
        let once = epsilon_closure(&nfa, &seeds);
        let twice = epsilon_closure(&nfa, once.states());
        prop_assert_eq!(once, twice);
    }
}
