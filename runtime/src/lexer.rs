//! Multi-DFA maximal-munch lexer.
//!
//! At each offset every registered DFA runs in lock-step over the input. The
//! longest prefix that leaves some machine in a final state wins; among
//! machines final at that length, the lowest-indexed pattern wins. When no
//! machine ever reaches a final state the token is a single byte built by the
//! default constructor, so lexing always makes progress and never fails.

use std::sync::Arc;

use crate::position::{Positioned, TextPosition};
use crate::sparse_dfa::{SparseDfa, StateId, StateType};
use crate::stream::{StreamNext, TokenStream};

/// Builds a token from the matched bytes and their position.
pub type TokenConstructor<T> = Arc<dyn Fn(&[u8], TextPosition) -> T + Send + Sync>;

/// Ordered patterns plus the fallback constructor for unmatched bytes.
pub struct LexerDescriptor<T> {
    default: TokenConstructor<T>,
    patterns: Vec<(SparseDfa, TokenConstructor<T>)>,
}

impl<T> LexerDescriptor<T> {
    pub fn new(default: TokenConstructor<T>) -> Self {
        LexerDescriptor { default, patterns: Vec::new() }
    }

    /// Append a pattern. Earlier patterns win ties on match length.
    pub fn pattern(mut self, dfa: SparseDfa, constructor: TokenConstructor<T>) -> Self {
        self.patterns.push((dfa, constructor));
        self
    }

    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn dfa(&self, pattern: usize) -> Option<&SparseDfa> {
        self.patterns.get(pattern).map(|(dfa, _)| dfa)
    }

    /// Find the token starting at `offset`.
    ///
    /// Returns the index of the winning pattern (`None` for the single-byte
    /// fallback) and the exclusive end offset of the token. At or past the
    /// end of `input` the token is empty: `(None, offset)`.
    pub fn read_token(&self, input: &[u8], offset: usize) -> (Option<usize>, usize) {
        if offset >= input.len() {
            return (None, offset);
        }

        let mut machines: Vec<StateMachine<'_>> =
            self.patterns.iter().map(|(dfa, _)| StateMachine::new(dfa)).collect();
        let mut matched = None;
        let mut end = offset + 1;

        for (i, &byte) in input.iter().enumerate().skip(offset) {
            let mut alive = false;
            for machine in machines.iter_mut().filter(|m| !m.has_erred()) {
                machine.consume(byte);
                alive |= !machine.has_erred();
            }

            if let Some(winner) = machines.iter().position(|m| m.is_final()) {
                matched = Some(winner);
                end = i + 1;
            }

            if !alive {
                break;
            }
        }

        (matched, end)
    }

    /// Build the token for `input[from..to]` with the constructor of `pattern`,
    /// or the default constructor when `pattern` is `None`.
    pub fn create_token(&self, input: &[u8], pattern: Option<usize>, from: usize, to: usize) -> T {
        let constructor = pattern
            .and_then(|i| self.patterns.get(i))
            .map(|(_, constructor)| constructor)
            .unwrap_or(&self.default);
        // A span past the end of input has no bytes.
        let bytes = input.get(from..to).unwrap_or_default();
        constructor(bytes, TextPosition::new(from, to))
    }
}

/// One running copy of a DFA.
#[derive(Debug, Clone)]
struct StateMachine<'a> {
    dfa: &'a SparseDfa,
    state: StateId,
    status: StateType,
}

impl<'a> StateMachine<'a> {
    fn new(dfa: &'a SparseDfa) -> Self {
        StateMachine { dfa, state: SparseDfa::START, status: StateType::Standard }
    }

    fn is_final(&self) -> bool {
        self.status == StateType::Final
    }

    fn has_erred(&self) -> bool {
        self.status == StateType::Error
    }

    fn consume(&mut self, byte: u8) {
        let next = self
            .dfa
            .step(self.state, byte)
            .and_then(|to| self.dfa.state(to).map(|s| (to, s.kind)));

        match next {
            Some((to, kind)) => {
                self.state = to;
                self.status = kind;
            },
            None => self.status = StateType::Error,
        }
    }
}

/// A token stream over a byte buffer.
///
/// The lexer is just an offset into shared input; pulling never mutates it,
/// so any lexer value can be re-pulled to replay the same tokens.
pub struct Lexer<T> {
    descriptor: Arc<LexerDescriptor<T>>,
    input: Arc<[u8]>,
    offset: usize,
    last: TextPosition,
}

impl<T> Lexer<T> {
    pub fn new(descriptor: Arc<LexerDescriptor<T>>, input: impl Into<Arc<[u8]>>) -> Self {
        Lexer::at(descriptor, input, 0)
    }

    /// A lexer that starts reading at `offset`.
    pub fn at(descriptor: Arc<LexerDescriptor<T>>, input: impl Into<Arc<[u8]>>, offset: usize) -> Self {
        let last = TextPosition::at(offset);
        Lexer { descriptor, input: input.into(), offset, last }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for Lexer<T> {
    fn clone(&self) -> Self {
        Lexer {
            descriptor: Arc::clone(&self.descriptor),
            input: Arc::clone(&self.input),
            offset: self.offset,
            last: self.last,
        }
    }
}

impl<T: Positioned + Clone> TokenStream for Lexer<T> {
    type Token = T;

    fn pull(&self) -> StreamNext<T, Self> {
        if self.offset >= self.input.len() {
            return StreamNext { token: None, last_position: self.last, rest: self.clone() };
        }

        let (pattern, end) = self.descriptor.read_token(&self.input, self.offset);
        let token = self.descriptor.create_token(&self.input, pattern, self.offset, end);
        let rest = Lexer {
            descriptor: Arc::clone(&self.descriptor),
            input: Arc::clone(&self.input),
            offset: end,
            last: token.position(),
        };

        StreamNext { token: Some(token), last_position: self.last, rest }
    }
}
