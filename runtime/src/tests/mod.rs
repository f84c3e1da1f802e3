
use std::sync::Arc;

use crate::lexer::LexerDescriptor;
use crate::position::TextPosition;
use crate::sparse_dfa::{DfaState, SparseDfa, Transition};
use crate::token::{text_token, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Keyword,
    Letters,
    Digits,
    Space,
    Other,
}

fn tok(kind: Kind, start: usize, text: &str) -> Token<Kind> {
    Token::new(kind, TextPosition::new(start, start + text.len()), text)
}

/// `[min-max]+`
fn one_or_more(min: u8, max: u8) -> SparseDfa {
    SparseDfa::new(vec![
        DfaState::standard(vec![Transition::range(1, min, max)]),
        DfaState::final_state(vec![Transition::range(1, min, max)]),
    ])
}

/// Exactly `text`.
fn literal(text: &[u8]) -> SparseDfa {
    let mut states: Vec<DfaState> = text
        .iter()
        .enumerate()
        .map(|(i, &b)| DfaState::standard(vec![Transition::byte(i as u32 + 1, b)]))
        .collect();
    states.push(DfaState::final_state(Vec::new()));
    SparseDfa::new(states)
}

/// Pattern order: `if`, `[a-z]+`, `[0-9]+`, ` +`; anything else is `Other`.
fn descriptor() -> Arc<LexerDescriptor<Token<Kind>>> {
    Arc::new(
        LexerDescriptor::new(text_token(Kind::Other))
            .pattern(literal(b"if"), text_token(Kind::Keyword))
            .pattern(one_or_more(b'a', b'z'), text_token(Kind::Letters))
            .pattern(one_or_more(b'0', b'9'), text_token(Kind::Digits))
            .pattern(one_or_more(b' ', b' '), text_token(Kind::Space)),
    )
}
