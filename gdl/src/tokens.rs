//! Token front end for the grammar-definition language.
//!
//! Raw tokens come from the runtime lexer driven by DFAs compiled from regex
//! ASTs. The parser-facing stream then promotes reserved identifiers to
//! keywords and drops whitespace and comments:
//!
//! ```text
//!   Lexer ──map(retag reserved words)──▶ ──flat_map(drop trivia)──▶ parser
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use astify_runtime::{text_token, Lexer, LexerDescriptor, PureStream, Token, TokenStream};

use crate::automata::regex::RegexAst;
use crate::automata::regex_to_dfa;

/// Token kinds of the grammar-definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GdlTokenKind {
    /// Any single byte no pattern matches (punctuation, operators).
    Symbol,
    Identifier,
    /// An identifier in the reserved-word set.
    Keyword,
    /// Single- or double-quoted, quotes and escapes included in the text.
    String,
    Integer,
    Whitespace,
    Comment,
}

impl GdlTokenKind {
    /// Tokens the parser never sees.
    pub fn is_trivia(self) -> bool {
        matches!(self, GdlTokenKind::Whitespace | GdlTokenKind::Comment)
    }
}

pub type GdlToken = Token<GdlTokenKind>;

/// Tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdlLexerConfig {
    /// Identifiers lexed with exactly this text become keywords.
    pub reserved_words: BTreeSet<String>,
}

impl GdlLexerConfig {
    pub fn with_reserved_word(mut self, word: impl Into<String>) -> Self {
        self.reserved_words.insert(word.into());
        self
    }
}

impl Default for GdlLexerConfig {
    fn default() -> Self {
        GdlLexerConfig { reserved_words: ["grammar".to_string()].into_iter().collect() }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Patterns
// ══════════════════════════════════════════════════════════════════════════════

/// Any byte except those in `excluded`.
fn except(excluded: &[u8]) -> RegexAst {
    let mut sorted = excluded.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut branches = Vec::new();
    let mut from: u16 = 0;
    for &byte in &sorted {
        if u16::from(byte) > from {
            branches.push(RegexAst::range(from as u8, byte - 1));
        }
        from = u16::from(byte) + 1;
    }
    if from <= 0xff {
        branches.push(RegexAst::range(from as u8, 0xff));
    }
    RegexAst::alt(branches)
}

/// `q ( \. | [^q\\] )* q`
fn quoted_regex(quote: u8) -> RegexAst {
    RegexAst::seq(vec![
        RegexAst::byte(quote),
        RegexAst::rep0(RegexAst::alt(vec![
            RegexAst::seq(vec![RegexAst::byte(b'\\'), RegexAst::any()]),
            except(&[quote, b'\\']),
        ])),
        RegexAst::byte(quote),
    ])
}

/// `[0-9]+`
pub fn integer_regex() -> RegexAst {
    RegexAst::rep1(RegexAst::range(b'0', b'9'))
}

/// `[a-zA-Z][a-zA-Z0-9_]*`
pub fn identifier_regex() -> RegexAst {
    let letter = || vec![RegexAst::range(b'a', b'z'), RegexAst::range(b'A', b'Z')];
    let mut rest = letter();
    rest.push(RegexAst::range(b'0', b'9'));
    rest.push(RegexAst::byte(b'_'));

    RegexAst::seq(vec![RegexAst::alt(letter()), RegexAst::rep0(RegexAst::alt(rest))])
}

/// `//[^\n]*`
fn line_comment_regex() -> RegexAst {
    RegexAst::seq(vec![RegexAst::literal("//"), RegexAst::rep0(except(b"\n"))])
}

/// `/\*([^*]|\*+[^*/])*\*+/`
fn block_comment_regex() -> RegexAst {
    let stars = || RegexAst::rep1(RegexAst::byte(b'*'));
    RegexAst::seq(vec![
        RegexAst::literal("/*"),
        RegexAst::rep0(RegexAst::alt(vec![
            except(b"*"),
            RegexAst::seq(vec![stars(), except(b"*/")]),
        ])),
        stars(),
        RegexAst::byte(b'/'),
    ])
}

/// `[ \t\r\n]+`
fn whitespace_regex() -> RegexAst {
    RegexAst::rep1(RegexAst::alt(b" \t\r\n".iter().map(|&b| RegexAst::byte(b))))
}

/// Lexer descriptor for the grammar-definition language.
pub fn gdl_lexer_descriptor() -> LexerDescriptor<GdlToken> {
    LexerDescriptor::new(text_token(GdlTokenKind::Symbol))
        .pattern(regex_to_dfa(&quoted_regex(b'"')), text_token(GdlTokenKind::String))
        .pattern(regex_to_dfa(&quoted_regex(b'\'')), text_token(GdlTokenKind::String))
        .pattern(regex_to_dfa(&integer_regex()), text_token(GdlTokenKind::Integer))
        .pattern(regex_to_dfa(&identifier_regex()), text_token(GdlTokenKind::Identifier))
        .pattern(regex_to_dfa(&line_comment_regex()), text_token(GdlTokenKind::Comment))
        .pattern(regex_to_dfa(&block_comment_regex()), text_token(GdlTokenKind::Comment))
        .pattern(regex_to_dfa(&whitespace_regex()), text_token(GdlTokenKind::Whitespace))
}

// ══════════════════════════════════════════════════════════════════════════════
// Tokenizer
// ══════════════════════════════════════════════════════════════════════════════

/// Compiled grammar-language lexer plus its reserved words.
///
/// Building one compiles every pattern; tokenizing is then cheap and the
/// tokenizer can be shared across inputs.
#[derive(Clone)]
pub struct GdlTokenizer {
    descriptor: Arc<LexerDescriptor<GdlToken>>,
    reserved_words: Arc<BTreeSet<String>>,
}

impl GdlTokenizer {
    pub fn new(config: GdlLexerConfig) -> Self {
        GdlTokenizer {
            descriptor: Arc::new(gdl_lexer_descriptor()),
            reserved_words: Arc::new(config.reserved_words),
        }
    }

    /// All tokens of `input`, trivia included and keywords not yet retagged.
    pub fn lexer(&self, input: &str) -> Lexer<GdlToken> {
        Lexer::new(Arc::clone(&self.descriptor), input.as_bytes())
    }

    /// The parser-facing token stream of `input`.
    pub fn tokenize(&self, input: &str) -> impl TokenStream<Token = GdlToken> {
        let reserved = Arc::clone(&self.reserved_words);
        self.lexer(input)
            .map(move |token: GdlToken| {
                if token.kind == GdlTokenKind::Identifier && reserved.contains(&token.text) {
                    token.retag(GdlTokenKind::Keyword)
                } else {
                    token
                }
            })
            .flat_map(|token: GdlToken| {
                if token.kind.is_trivia() {
                    PureStream::empty()
                } else {
                    PureStream::single(token)
                }
            })
    }
}

impl Default for GdlTokenizer {
    fn default() -> Self {
        GdlTokenizer::new(GdlLexerConfig::default())
    }
}
