//! Subset construction: NFA → sparse DFA.
//!
//! Each DFA state is the epsilon-closure of a set of NFA states, and is final
//! iff any member is final. Outgoing transitions of a closure are split into
//! disjoint byte ranges with [`unique_ranges`], so overlapping NFA ranges union
//! their destinations instead of producing overlapping DFA transitions.
//!
//! An `Any` NFA edge matches every byte, including bytes some range also
//! covers, so its destinations join every range's destination set. The DFA's
//! any-byte transition then only handles bytes no range mentions, which is
//! exactly how the runtime matcher treats it.

use std::collections::HashMap;

use astify_runtime::{DfaState, SparseDfa, Transition};

use super::ranges::unique_ranges;
use super::{ByteLabel, Label, Nfa, StateId};

/// A sorted, deduplicated set of NFA states closed under epsilon transitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Closure(Vec<StateId>);

impl Closure {
    pub fn states(&self) -> &[StateId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any member is a final NFA state.
    pub fn is_final(&self, nfa: &Nfa) -> bool {
        self.0.iter().any(|&s| nfa.state(s).is_final())
    }
}

/// Compute the epsilon-closure of a set of NFA states.
///
/// Returns all states reachable from `states` via zero or more epsilon
/// transitions. Cycles are handled by the visited set.
pub fn epsilon_closure(nfa: &Nfa, states: &[StateId]) -> Closure {
    let mut closure: Vec<StateId> = Vec::with_capacity(states.len());
    let mut stack: Vec<StateId> = Vec::with_capacity(states.len());
    let mut visited = vec![false; nfa.num_states()];

    for &s in states {
        if !visited[s as usize] {
            visited[s as usize] = true;
            closure.push(s);
            stack.push(s);
        }
    }

    while let Some(state) = stack.pop() {
        for &(label, target) in &nfa.state(state).transitions {
            if label == Label::Epsilon && !visited[target as usize] {
                visited[target as usize] = true;
                closure.push(target);
                stack.push(target);
            }
        }
    }

    closure.sort_unstable();
    Closure(closure)
}

/// Epsilon-closure of a single state, including the state itself.
pub fn follow_epsilon_transitions(nfa: &Nfa, state: StateId) -> Closure {
    epsilon_closure(nfa, &[state])
}

/// One outgoing DFA transition of a closure, before state numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureTransition {
    pub label: ByteLabel,
    pub target: Closure,
}

/// Gather the consuming transitions leaving `closure` as deterministic
/// transitions: disjoint ranges in ascending order, then at most one `Any`.
///
/// Adjacent ranges with the same target are coalesced, and ranges whose
/// target equals the `Any` target are left to the `Any` fallback.
pub fn collect_consuming_transitions(nfa: &Nfa, closure: &Closure) -> Vec<ClosureTransition> {
    let mut ranges: Vec<(u8, u8, StateId)> = Vec::new();
    let mut any_targets: Vec<StateId> = Vec::new();

    for &s in closure.states() {
        for &(label, to) in &nfa.state(s).transitions {
            match label {
                Label::Epsilon => {},
                Label::Consuming(ByteLabel::Range(min, max)) => ranges.push((min, max, to)),
                Label::Consuming(ByteLabel::Any) => any_targets.push(to),
            }
        }
    }

    let any_target = if any_targets.is_empty() {
        None
    } else {
        Some(epsilon_closure(nfa, &any_targets))
    };

    let mut transitions: Vec<ClosureTransition> = Vec::new();
    for merged in unique_ranges(&ranges, |&(min, max, _)| (min, max)) {
        let targets: Vec<StateId> = merged
            .items
            .iter()
            .map(|&&(_, _, to)| to)
            .chain(any_targets.iter().copied())
            .collect();
        let target = epsilon_closure(nfa, &targets);

        if any_target.as_ref() == Some(&target) {
            continue;
        }

        if let Some(ClosureTransition { label: ByteLabel::Range(_, prev_max), target: prev_target }) =
            transitions.last_mut()
        {
            if *prev_target == target && prev_max.checked_add(1) == Some(merged.min) {
                *prev_max = merged.max;
                continue;
            }
        }

        transitions.push(ClosureTransition { label: ByteLabel::Range(merged.min, merged.max), target });
    }

    if let Some(target) = any_target {
        transitions.push(ClosureTransition { label: ByteLabel::Any, target });
    }

    transitions
}

/// Convert an NFA to a sparse DFA.
///
/// DFA states are numbered in discovery order, so the closure of the NFA start
/// state is state 0.
pub fn subset_construction(nfa: &Nfa) -> SparseDfa {
    // Map from closure → DFA state ID
    let mut state_map: HashMap<Closure, u32> = HashMap::new();
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: Vec<Closure> = Vec::new();

    let start = follow_epsilon_transitions(nfa, nfa.start);
    state_map.insert(start.clone(), 0);
    states.push(DfaState::standard(Vec::new()));
    worklist.push(start);

    while let Some(current) = worklist.pop() {
        let current_id = *state_map
            .get(&current)
            .expect("current closure should be in state_map");

        let mut transitions = Vec::new();
        for ClosureTransition { label, target } in collect_consuming_transitions(nfa, &current) {
            let to = match state_map.get(&target) {
                Some(&existing) => existing,
                None => {
                    let id = states.len() as u32;
                    states.push(DfaState::standard(Vec::new()));
                    state_map.insert(target.clone(), id);
                    worklist.push(target);
                    id
                },
            };

            transitions.push(match label {
                ByteLabel::Range(min, max) => Transition::range(to, min, max),
                ByteLabel::Any => Transition::any(to),
            });
        }

        states[current_id as usize] = if current.is_final(nfa) {
            DfaState::final_state(transitions)
        } else {
            DfaState::standard(transitions)
        };
    }

    SparseDfa::new(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::build_nfa;
    use crate::automata::regex::RegexAst;
    use crate::automata::Terminal;

    #[test]
    fn test_closure_includes_self_and_follows_chains() {
        let mut nfa = Nfa::default();
        let a = nfa.add_state(Terminal::Standard);
        let b = nfa.add_state(Terminal::Standard);
        let c = nfa.add_state(Terminal::Final);
        let d = nfa.add_state(Terminal::Standard);
        nfa.add_epsilon(a, b);
        nfa.add_epsilon(b, c);
        nfa.add_transition(c, Label::Consuming(ByteLabel::Any), d);

        assert_eq!(follow_epsilon_transitions(&nfa, a).states(), &[a, b, c]);
        assert_eq!(follow_epsilon_transitions(&nfa, d).states(), &[d]);
        assert!(follow_epsilon_transitions(&nfa, a).is_final(&nfa));
        assert!(!follow_epsilon_transitions(&nfa, d).is_final(&nfa));
    }

    #[test]
    fn test_closure_terminates_on_cycles() {
        let mut nfa = Nfa::default();
        let a = nfa.add_state(Terminal::Standard);
        let b = nfa.add_state(Terminal::Standard);
        nfa.add_epsilon(a, b);
        nfa.add_epsilon(b, a);
        nfa.add_epsilon(b, b);
        assert_eq!(epsilon_closure(&nfa, &[b]).states(), &[a, b]);
    }

    #[test]
    fn test_overlapping_ranges_union_targets() {
        // [a-m]x | [g-z]y
        let ast = RegexAst::alt(vec![
            RegexAst::seq(vec![RegexAst::range(b'a', b'm'), RegexAst::byte(b'x')]),
            RegexAst::seq(vec![RegexAst::range(b'g', b'z'), RegexAst::byte(b'y')]),
        ]);
        let nfa = build_nfa(&ast);
        let start = follow_epsilon_transitions(&nfa, nfa.start);
        let transitions = collect_consuming_transitions(&nfa, &start);

        let labels: Vec<ByteLabel> = transitions.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            vec![
                ByteLabel::Range(b'a', b'f'),
                ByteLabel::Range(b'g', b'm'),
                ByteLabel::Range(b'n', b'z'),
            ]
        );
        assert_eq!(transitions[1].target.states().len(), 2, "overlap reaches both branches");
    }

    #[test]
    fn test_adjacent_ranges_with_same_target_coalesce() {
        let ast = RegexAst::alt(vec![RegexAst::range(b'a', b'f'), RegexAst::range(b'g', b'z')]);
        let nfa = build_nfa(&ast);
        let start = follow_epsilon_transitions(&nfa, nfa.start);
        let transitions = collect_consuming_transitions(&nfa, &start);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].label, ByteLabel::Range(b'a', b'z'));
    }

    #[test]
    fn test_any_joins_range_targets() {
        // a b | . c : after 'a' both 'b' and 'c' must be possible
        let ast = RegexAst::alt(vec![RegexAst::literal("ab"), RegexAst::seq(vec![RegexAst::any(), RegexAst::byte(b'c')])]);
        let dfa = subset_construction(&build_nfa(&ast));
        assert!(dfa.accepts(b"ab"));
        assert!(dfa.accepts(b"ac"));
        assert!(dfa.accepts(b"zc"));
        assert!(!dfa.accepts(b"zb"));
    }

    #[test]
    fn test_range_equal_to_any_target_is_dropped() {
        let ast = RegexAst::alt(vec![RegexAst::byte(b'a'), RegexAst::any()]);
        let nfa = build_nfa(&ast);
        let start = follow_epsilon_transitions(&nfa, nfa.start);
        let transitions = collect_consuming_transitions(&nfa, &start);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].label, ByteLabel::Any);
    }

    #[test]
    fn test_start_state_is_zero() {
        let dfa = subset_construction(&build_nfa(&RegexAst::literal("abc")));
        assert_eq!(dfa.num_states(), 4);
        assert_eq!(dfa.step(0, b'a').map(|s| s != 0), Some(true));
        assert!(dfa.accepts(b"abc"));
    }

    #[test]
    fn test_star_start_is_final() {
        let dfa = subset_construction(&build_nfa(&RegexAst::rep0(RegexAst::byte(b'a'))));
        assert!(dfa.accepts(b""));
        assert!(dfa.accepts(b"aaaa"));
        // Looping back through the hub reaches the start closure again.
        assert_eq!(dfa.num_states(), 1);
    }
}
