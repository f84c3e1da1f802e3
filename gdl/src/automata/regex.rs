//! Regex AST and the parser for the regex sub-language.
//!
//! ## Supported syntax
//!
//! | Feature | Syntax | Notes |
//! |---------|--------|-------|
//! | Literal byte | `a`, `1`, `_` | byte-level, no Unicode |
//! | Escape | `\x` | literal `x`, for any byte `x` |
//! | Dot | `.` | any byte |
//! | Grouping | `(...)` | a sequence, not an alternation |
//! | Quantifiers | `*` `+` `?` | apply to the preceding term |
//!
//! Bracket expressions (`[...]`) are recognised but rejected with
//! [`RegexError::NotImplemented`]. Operators that cannot start a term (`*`
//! at the start, `)` outside a group, `]`) are literal bytes. Groups still
//! open at the end of the pattern are closed there.
//!
//! The pattern is tokenized by the runtime [`Lexer`] driven by hand-written
//! DFAs, and the parser walks the resulting persistent token stream.

use std::fmt;
use std::sync::{Arc, OnceLock};

use astify_runtime::{text_token, DfaState, Lexer, LexerDescriptor, SparseDfa, Token, TokenStream, Transition};

// ══════════════════════════════════════════════════════════════════════════════
// AST
// ══════════════════════════════════════════════════════════════════════════════

/// Regular expression over bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegexAst {
    /// Any single byte.
    Any,
    /// The items one after another; empty matches the empty string.
    Seq(Vec<RegexAst>),
    /// Any byte in the inclusive range. Empty when `min > max`.
    Range(u8, u8),
    /// Any one of the branches.
    Alt(Vec<RegexAst>),
    /// Zero or more repetitions.
    Rep0(Box<RegexAst>),
    /// Zero or one occurrence.
    Opt(Box<RegexAst>),
}

impl RegexAst {
    pub fn any() -> Self {
        RegexAst::Any
    }

    pub fn byte(byte: u8) -> Self {
        RegexAst::Range(byte, byte)
    }

    pub fn range(min: u8, max: u8) -> Self {
        RegexAst::Range(min, max)
    }

    /// The bytes of `text` in sequence.
    pub fn literal(text: &str) -> Self {
        RegexAst::Seq(text.bytes().map(RegexAst::byte).collect())
    }

    pub fn seq(items: impl IntoIterator<Item = RegexAst>) -> Self {
        RegexAst::Seq(items.into_iter().collect())
    }

    pub fn alt(branches: impl IntoIterator<Item = RegexAst>) -> Self {
        RegexAst::Alt(branches.into_iter().collect())
    }

    pub fn rep0(inner: RegexAst) -> Self {
        RegexAst::Rep0(Box::new(inner))
    }

    /// One or more: `x x*`.
    pub fn rep1(inner: RegexAst) -> Self {
        RegexAst::Seq(vec![inner.clone(), RegexAst::rep0(inner)])
    }

    pub fn opt(inner: RegexAst) -> Self {
        RegexAst::Opt(Box::new(inner))
    }
}

fn write_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    if byte.is_ascii_graphic() || byte == b' ' {
        write!(f, "{}", byte as char)
    } else {
        write!(f, "\\x{:02x}", byte)
    }
}

impl fmt::Display for RegexAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexAst::Any => f.write_str("."),
            RegexAst::Range(min, max) => {
                f.write_str("[")?;
                write_byte(f, *min)?;
                if min != max {
                    f.write_str("-")?;
                    write_byte(f, *max)?;
                }
                f.write_str("]")
            },
            RegexAst::Seq(items) => {
                f.write_str("(")?;
                for item in items {
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            },
            RegexAst::Alt(branches) => {
                f.write_str("(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", branch)?;
                }
                f.write_str(")")
            },
            RegexAst::Rep0(inner) => write!(f, "({})*", inner),
            RegexAst::Opt(inner) => write!(f, "({})?", inner),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Error types
// ══════════════════════════════════════════════════════════════════════════════

/// Error from regex parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Syntax that is recognised but has no semantics yet.
    NotImplemented { position: usize, feature: &'static str },
    /// The `(` at `position` opens more than `limit` nested groups.
    NestingTooDeep { position: usize, limit: usize },
}

impl RegexError {
    /// Byte offset into the pattern where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            RegexError::NotImplemented { position, .. } | RegexError::NestingTooDeep { position, .. } => {
                *position
            },
        }
    }
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::NotImplemented { position, feature } => {
                write!(f, "regex error at byte {}: {} is not implemented", position, feature)
            },
            RegexError::NestingTooDeep { position, limit } => {
                write!(f, "regex error at byte {}: groups nested deeper than {}", position, limit)
            },
        }
    }
}

impl std::error::Error for RegexError {}

// ══════════════════════════════════════════════════════════════════════════════
// Tokens
// ══════════════════════════════════════════════════════════════════════════════

/// Token kinds of the regex sub-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexTokenKind {
    /// A literal byte, possibly escaped.
    Char,
    Any,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Star,
    Plus,
    Question,
}

pub type RegexToken = Token<RegexTokenKind>;

/// `\` followed by any byte.
fn escape_dfa() -> SparseDfa {
    SparseDfa::new(vec![
        DfaState::standard(vec![Transition::byte(1, b'\\')]),
        DfaState::standard(vec![Transition::any(2)]),
        DfaState::final_state(Vec::new()),
    ])
}

/// Lexer descriptor for regex patterns. Unmatched bytes are literals.
pub fn regex_lexer_descriptor() -> LexerDescriptor<RegexToken> {
    use RegexTokenKind::*;

    let operators = [
        (b'(', ParenOpen),
        (b')', ParenClose),
        (b'[', BracketOpen),
        (b']', BracketClose),
        (b'*', Star),
        (b'+', Plus),
        (b'?', Question),
        (b'.', Any),
    ];

    operators
        .into_iter()
        .fold(LexerDescriptor::new(text_token(Char)), |descriptor, (byte, kind)| {
            descriptor.pattern(SparseDfa::exactly(byte), text_token(kind))
        })
        .pattern(escape_dfa(), text_token(Char))
}

fn shared_descriptor() -> Arc<LexerDescriptor<RegexToken>> {
    static DESCRIPTOR: OnceLock<Arc<LexerDescriptor<RegexToken>>> = OnceLock::new();
    Arc::clone(DESCRIPTOR.get_or_init(|| Arc::new(regex_lexer_descriptor())))
}

/// Tokenize a regex pattern.
pub fn regex_token_stream(pattern: &str) -> Lexer<RegexToken> {
    Lexer::new(shared_descriptor(), pattern.as_bytes())
}

// ══════════════════════════════════════════════════════════════════════════════
// Parser
// ══════════════════════════════════════════════════════════════════════════════

/// Maximum number of nested groups in a pattern.
pub const MAX_GROUP_DEPTH: usize = 256;

/// Parse a regex pattern into an AST.
///
/// # Errors
///
/// Returns `RegexError` for bracket expressions and for groups nested deeper
/// than [`MAX_GROUP_DEPTH`].
pub fn parse(pattern: &str) -> Result<RegexAst, RegexError> {
    let input = pattern.as_bytes();
    let (ast, _) = parse_terms(input, regex_token_stream(pattern), 0)?;
    Ok(ast)
}

/// The byte a literal token stands for: the last byte it covers, which is the
/// escaped byte for `\x` and the byte itself otherwise.
fn literal_byte(input: &[u8], token: &RegexToken) -> u8 {
    input[token.position.end - 1]
}

/// Parse terms until end of input or, inside a group (`depth > 0`), until
/// the closing `)`.
fn parse_terms<S>(input: &[u8], mut stream: S, depth: usize) -> Result<(RegexAst, S), RegexError>
where
    S: TokenStream<Token = RegexToken>,
{
    let mut terms = Vec::new();

    loop {
        let next = stream.pull();
        match next.token {
            None => return Ok((RegexAst::Seq(terms), next.rest)),
            Some(token) if depth > 0 && token.kind == RegexTokenKind::ParenClose => {
                return Ok((RegexAst::Seq(terms), next.rest));
            },
            Some(token) => {
                let (term, rest) = parse_term(input, &token, next.rest, depth)?;
                terms.push(term);
                stream = rest;
            },
        }
    }
}

/// Parse one term starting with `token`, plus an optional quantifier.
fn parse_term<S>(input: &[u8], token: &RegexToken, rest: S, depth: usize) -> Result<(RegexAst, S), RegexError>
where
    S: TokenStream<Token = RegexToken>,
{
    let (term, rest) = match token.kind {
        RegexTokenKind::Any => (RegexAst::Any, rest),
        RegexTokenKind::ParenOpen if depth >= MAX_GROUP_DEPTH => {
            return Err(RegexError::NestingTooDeep { position: token.position.start, limit: MAX_GROUP_DEPTH });
        },
        RegexTokenKind::ParenOpen => parse_terms(input, rest, depth + 1)?,
        RegexTokenKind::BracketOpen => {
            return Err(RegexError::NotImplemented {
                position: token.position.start,
                feature: "bracket expression",
            });
        },
        RegexTokenKind::Char
        | RegexTokenKind::ParenClose
        | RegexTokenKind::BracketClose
        | RegexTokenKind::Star
        | RegexTokenKind::Plus
        | RegexTokenKind::Question => (RegexAst::byte(literal_byte(input, token)), rest),
    };

    let next = rest.pull();
    let quantified = match next.token.map(|t| t.kind) {
        Some(RegexTokenKind::Star) => RegexAst::rep0(term),
        Some(RegexTokenKind::Plus) => RegexAst::rep1(term),
        Some(RegexTokenKind::Question) => RegexAst::opt(term),
        _ => return Ok((term, rest)),
    };
    Ok((quantified, next.rest))
}
