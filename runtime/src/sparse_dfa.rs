//! Sparse DFA tables consumed by the lexer.
//!
//! Each state lists only its defined transitions as inclusive byte ranges.
//! A transition whose bounds are both [`ANY0`]/[`ANY1`] matches every byte and
//! is only taken when no range transition of the same state contains the byte.
//!
//! The textual encoding produced by [`SparseDfa::encode`] mirrors the builder
//! calls used to write tables by hand:
//!
//! ```text
//! D(S(T(1, 97, 97)), F())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of the "any byte" sentinel transition.
pub const ANY0: i16 = -1;
/// Upper bound of the "any byte" sentinel transition.
pub const ANY1: i16 = -1;

/// Index of a DFA state within [`SparseDfa::states`].
pub type StateId = u32;

/// Terminal classification of a DFA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    /// Entering this state kills the machine.
    Error,
    /// Input consumed so far is a complete match.
    Final,
    Standard,
}

/// A transition to `to` on any byte in `[min, max]`, or on any byte at all
/// when both bounds are the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub to: StateId,
    pub min: i16,
    pub max: i16,
}

impl Transition {
    pub fn range(to: StateId, min: u8, max: u8) -> Self {
        Transition { to, min: i16::from(min), max: i16::from(max) }
    }

    pub fn byte(to: StateId, byte: u8) -> Self {
        Transition::range(to, byte, byte)
    }

    pub fn any(to: StateId) -> Self {
        Transition { to, min: ANY0, max: ANY1 }
    }

    pub fn is_any(&self) -> bool {
        self.min == ANY0 && self.max == ANY1
    }

    /// Whether this transition's own range contains `byte`.
    ///
    /// The sentinel matches every byte.
    pub fn matches(&self, byte: u8) -> bool {
        self.is_any() || (self.min..=self.max).contains(&i16::from(byte))
    }
}

/// One DFA state with its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaState {
    pub kind: StateType,
    pub transitions: Vec<Transition>,
}

impl DfaState {
    pub fn standard(transitions: Vec<Transition>) -> Self {
        DfaState { kind: StateType::Standard, transitions }
    }

    pub fn final_state(transitions: Vec<Transition>) -> Self {
        DfaState { kind: StateType::Final, transitions }
    }

    pub fn error() -> Self {
        DfaState { kind: StateType::Error, transitions: Vec::new() }
    }

    /// Resolve the successor on `byte`: the first range transition containing
    /// it, otherwise the any-byte transition, otherwise `None`.
    pub fn step(&self, byte: u8) -> Option<StateId> {
        let mut fallback = None;
        for transition in &self.transitions {
            if transition.is_any() {
                fallback.get_or_insert(transition.to);
            } else if transition.matches(byte) {
                return Some(transition.to);
            }
        }
        fallback
    }
}

/// A complete sparse DFA. State `0` is the start state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseDfa {
    pub states: Vec<DfaState>,
}

impl SparseDfa {
    /// The start state of every sparse DFA.
    pub const START: StateId = 0;

    pub fn new(states: Vec<DfaState>) -> Self {
        SparseDfa { states }
    }

    /// DFA accepting exactly the single byte `byte`.
    pub fn exactly(byte: u8) -> Self {
        SparseDfa::new(vec![
            DfaState::standard(vec![Transition::byte(1, byte)]),
            DfaState::final_state(Vec::new()),
        ])
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(id as usize)
    }

    /// Successor of `state` on `byte`, if any.
    pub fn step(&self, state: StateId, byte: u8) -> Option<StateId> {
        self.state(state).and_then(|s| s.step(byte))
    }

    /// Run the whole of `input` from the start state and report whether the
    /// machine ends in a final state.
    pub fn accepts(&self, input: &[u8]) -> bool {
        let mut state = SparseDfa::START;
        for &byte in input {
            match self.step(state, byte) {
                Some(next) => state = next,
                None => return false,
            }
            if self.state(state).map(|s| s.kind) == Some(StateType::Error) {
                return false;
            }
        }
        self.state(state).map(|s| s.kind) == Some(StateType::Final)
    }

    /// Debug encoding, one state per line when `pretty` is set.
    pub fn encode(&self, pretty: bool) -> String {
        let state_sep = if pretty { ",\n\t" } else { "," };
        let transition_sep = if pretty { ", " } else { "," };

        let states: Vec<String> = self
            .states
            .iter()
            .map(|state| {
                let prefix = match state.kind {
                    StateType::Error => "E",
                    StateType::Final => "F",
                    StateType::Standard => "S",
                };
                let transitions: Vec<String> = state
                    .transitions
                    .iter()
                    .map(|t| format!("T({}, {}, {})", t.to, t.min, t.max))
                    .collect();
                format!("{}({})", prefix, transitions.join(transition_sep))
            })
            .collect();

        if pretty {
            format!("D(\n\t{}\n)", states.join(state_sep))
        } else {
            format!("D({})", states.join(state_sep))
        }
    }

    /// Serialize the table as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load a table previously written by [`SparseDfa::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for SparseDfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(false))
    }
}
