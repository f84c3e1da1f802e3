//! # astify-runtime: lexing and parsing support for compiled grammars
//!
//! Everything a compiled grammar needs at run time:
//!
//! - [`SparseDfa`] tables produced by the regex compiler in `astify-gdl`
//! - a multi-DFA maximal-munch [`Lexer`] driven by a [`LexerDescriptor`]
//! - lazy, persistent [`TokenStream`]s with `map`, `flat_map` and `concat`
//! - parser combinators threading a typed value stack ([`HCons`]/[`HNil`])
//!
//! ```text
//!  input bytes ──▶ Lexer ──▶ TokenStream ──▶ map / flat_map ──▶ Parser ──▶ value
//!                   ▲
//!          LexerDescriptor (SparseDfa + constructor)*
//! ```

pub mod hlist;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod sparse_dfa;
pub mod stream;
pub mod token;

#[cfg(test)]
mod tests;

pub use hlist::{HCons, HNil};
pub use lexer::{Lexer, LexerDescriptor, TokenConstructor};
pub use parser::{
    alternation, alternation_or, consume, end_of_input, from_fn, map_history, parse, sequence,
    Alternation, ParseFailure, ParseResult, Parsed, Parser,
};
pub use position::{Positioned, TextPosition};
pub use sparse_dfa::{DfaState, SparseDfa, StateId, StateType, Transition, ANY0, ANY1};
pub use stream::{Concat, FlatMap, Map, PureStream, StreamNext, TokenStream, Tokens};
pub use token::{fixed_token, is_kind, is_kind_with_text, text_token, Token};
