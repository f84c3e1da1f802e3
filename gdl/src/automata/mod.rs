//! Automata infrastructure for compiling regexes to lexer tables.
//!
//! `regex text → RegexAst → Nfa → (epsilon-closure + subset construction) → SparseDfa`
//!
//! The NFA is an arena of states addressed by [`StateId`]; Thompson fragments
//! are built backwards from a shared end state, so cycles introduced by `*` are
//! plain index edges.

pub mod nfa;
pub mod ranges;
pub mod regex;
pub mod subset;

use astify_runtime::SparseDfa;

use regex::RegexAst;

/// Identifier for an NFA state.
pub type StateId = u32;

/// Whether reaching an NFA state completes a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Standard,
    Final,
}

/// Input consumed by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteLabel {
    /// Any byte in the inclusive range.
    Range(u8, u8),
    /// Any byte at all.
    Any,
}

/// NFA transition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Epsilon,
    Consuming(ByteLabel),
}

/// NFA state with its ordered outgoing transitions.
#[derive(Debug, Clone)]
pub struct NfaState {
    pub terminal: Terminal,
    pub transitions: Vec<(Label, StateId)>,
}

impl NfaState {
    pub fn new(terminal: Terminal) -> Self {
        NfaState { terminal, transitions: Vec::new() }
    }

    pub fn is_final(&self) -> bool {
        self.terminal == Terminal::Final
    }
}

/// A complete NFA (collection of states with a designated start state).
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
}

impl Nfa {
    /// Add a new state and return its ID.
    pub fn add_state(&mut self, terminal: Terminal) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(NfaState::new(terminal));
        id
    }

    /// Add an epsilon transition from `from` to `to`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, Label::Epsilon, to);
    }

    /// Add a transition from `from` to `to` consuming `label`.
    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        self.states[from as usize].transitions.push((label, to));
    }

    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id as usize]
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }
}

/// Compile a regex AST to a sparse DFA.
pub fn regex_to_dfa(ast: &RegexAst) -> SparseDfa {
    let nfa = nfa::build_nfa(ast);
    subset::subset_construction(&nfa)
}
