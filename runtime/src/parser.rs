//! Parser combinators over token streams and a typed value stack.
//!
//! A parser takes the value stack built so far (`H`) and a token stream, and
//! either succeeds with a new stack and the remaining stream or fails with a
//! message and the position of the offending token. Failure is an ordinary
//! `Err` value, so combinators propagate it with `?`.
//!
//! Because streams are persistent, a combinator that declines a token simply
//! hands the untouched stream it was given to the next candidate.

use std::fmt;

use crate::hlist::{HCons, HNil};
use crate::position::{Positioned, TextPosition};
use crate::stream::{StreamNext, TokenStream};

/// Why a parse failed and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub position: TextPosition,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>, position: TextPosition) -> Self {
        ParseFailure { message: message.into(), position }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseFailure {}

/// Successful parse: the new value stack and the stream after it.
#[derive(Debug, Clone)]
pub struct Parsed<O, S> {
    pub value: O,
    pub rest: S,
}

impl<O, S> Parsed<O, S> {
    pub fn map<R>(self, f: impl FnOnce(O) -> R) -> Parsed<R, S> {
        Parsed { value: f(self.value), rest: self.rest }
    }
}

pub type ParseResult<O, S> = Result<Parsed<O, S>, ParseFailure>;

/// A parser from value stack `H` over stream `S`.
pub trait Parser<S: TokenStream, H> {
    /// The value stack after a successful parse.
    type Output;

    fn parse(&self, history: H, stream: S) -> ParseResult<Self::Output, S>;
}

impl<S, H, P> Parser<S, H> for &P
where
    S: TokenStream,
    P: Parser<S, H> + ?Sized,
{
    type Output = P::Output;

    fn parse(&self, history: H, stream: S) -> ParseResult<P::Output, S> {
        (**self).parse(history, stream)
    }
}

impl<S, H, P> Parser<S, H> for Box<P>
where
    S: TokenStream,
    P: Parser<S, H> + ?Sized,
{
    type Output = P::Output;

    fn parse(&self, history: H, stream: S) -> ParseResult<P::Output, S> {
        (**self).parse(history, stream)
    }
}

/// Where a failure on `next` should be reported: the offending token, or the
/// end of the last token when the stream is exhausted.
fn failure_position<T: Positioned, S>(next: &StreamNext<T, S>) -> TextPosition {
    match &next.token {
        Some(token) => token.position(),
        None => next.last_position.at_end(),
    }
}

/// Run `parser` from an empty stack and return the single value it pushed.
pub fn parse<S, P, R>(parser: &P, stream: S) -> ParseResult<R, S>
where
    S: TokenStream,
    P: Parser<S, HNil, Output = HCons<R, HNil>> + ?Sized,
{
    parser
        .parse(HNil, stream)
        .map(|parsed| parsed.map(|stack| stack.head))
}

// ══════════════════════════════════════════════════════════════════════════════
// consume
// ══════════════════════════════════════════════════════════════════════════════

/// See [`consume`].
pub struct Consume<P> {
    message: String,
    predicate: P,
}

/// Push the next token onto the stack if `predicate` accepts it.
pub fn consume<P>(message: impl Into<String>, predicate: P) -> Consume<P> {
    Consume { message: message.into(), predicate }
}

impl<S, H, P> Parser<S, H> for Consume<P>
where
    S: TokenStream,
    P: Fn(&S::Token) -> bool,
{
    type Output = HCons<S::Token, H>;

    fn parse(&self, history: H, stream: S) -> ParseResult<Self::Output, S> {
        let next = stream.pull();
        match next.token {
            Some(token) if (self.predicate)(&token) => {
                Ok(Parsed { value: HCons::new(token, history), rest: next.rest })
            },
            Some(token) => Err(ParseFailure::new(self.message.clone(), token.position())),
            None => Err(ParseFailure::new(self.message.clone(), next.last_position.at_end())),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// sequence
// ══════════════════════════════════════════════════════════════════════════════

/// See [`sequence`].
pub struct Sequence<A, B> {
    first: A,
    second: B,
}

/// Run `first`, then `second` on its output. Stops at the first failure.
pub fn sequence<A, B>(first: A, second: B) -> Sequence<A, B> {
    Sequence { first, second }
}

impl<S, H, A, B> Parser<S, H> for Sequence<A, B>
where
    S: TokenStream,
    A: Parser<S, H>,
    B: Parser<S, A::Output>,
{
    type Output = B::Output;

    fn parse(&self, history: H, stream: S) -> ParseResult<B::Output, S> {
        let Parsed { value, rest } = self.first.parse(history, stream)?;
        self.second.parse(value, rest)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// alternation
// ══════════════════════════════════════════════════════════════════════════════

type Guard<T> = Box<dyn Fn(&T) -> bool>;
type BoxedParser<S, H, O> = Box<dyn Parser<S, H, Output = O>>;

enum Fallback<S: TokenStream, H, O> {
    Default(BoxedParser<S, H, O>),
    Fail(String),
}

/// One-token-lookahead choice between parsers.
///
/// The next token is tested against each option's guard in order. The first
/// matching option receives the stack with that token pushed, and its result is
/// final: later options are not tried even if it fails. When no guard matches,
/// the fallback runs on the original stack and stream, or the alternation fails
/// at the current token.
pub struct Alternation<S: TokenStream, H, O> {
    options: Vec<(Guard<S::Token>, BoxedParser<S, HCons<S::Token, H>, O>)>,
    fallback: Fallback<S, H, O>,
}

/// An alternation that fails with `message` when no option applies.
pub fn alternation<S, H, O>(message: impl Into<String>) -> Alternation<S, H, O>
where
    S: TokenStream,
{
    Alternation { options: Vec::new(), fallback: Fallback::Fail(message.into()) }
}

/// An alternation that runs `default` when no option applies.
pub fn alternation_or<S, H, O, D>(default: D) -> Alternation<S, H, O>
where
    S: TokenStream,
    D: Parser<S, H, Output = O> + 'static,
{
    Alternation { options: Vec::new(), fallback: Fallback::Default(Box::new(default)) }
}

impl<S: TokenStream, H, O> Alternation<S, H, O> {
    /// Add an option tried after all previously added ones.
    pub fn option<G, P>(mut self, guard: G, parser: P) -> Self
    where
        G: Fn(&S::Token) -> bool + 'static,
        P: Parser<S, HCons<S::Token, H>, Output = O> + 'static,
    {
        self.options.push((Box::new(guard), Box::new(parser)));
        self
    }
}

impl<S: TokenStream, H, O> Parser<S, H> for Alternation<S, H, O> {
    type Output = O;

    fn parse(&self, history: H, stream: S) -> ParseResult<O, S> {
        let next = stream.pull();

        if let Some(token) = &next.token {
            if let Some((_, parser)) = self.options.iter().find(|(guard, _)| guard(token)) {
                return parser.parse(HCons::new(token.clone(), history), next.rest);
            }
        }

        match &self.fallback {
            Fallback::Default(parser) => parser.parse(history, stream),
            Fallback::Fail(message) => Err(ParseFailure::new(message.clone(), failure_position(&next))),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Stack and stream utilities
// ══════════════════════════════════════════════════════════════════════════════

/// See [`map_history`].
pub struct MapHistory<F> {
    f: F,
}

/// Rewrite the value stack without consuming input, typically to fold the
/// tokens of a rule into a single AST node.
pub fn map_history<F>(f: F) -> MapHistory<F> {
    MapHistory { f }
}

impl<S, H, F, H2> Parser<S, H> for MapHistory<F>
where
    S: TokenStream,
    F: Fn(H) -> H2,
{
    type Output = H2;

    fn parse(&self, history: H, stream: S) -> ParseResult<H2, S> {
        Ok(Parsed { value: (self.f)(history), rest: stream })
    }
}

/// See [`end_of_input`].
pub struct EndOfInput {
    message: String,
}

/// Succeed, leaving the stack unchanged, only if no tokens remain.
pub fn end_of_input(message: impl Into<String>) -> EndOfInput {
    EndOfInput { message: message.into() }
}

impl<S: TokenStream, H> Parser<S, H> for EndOfInput {
    type Output = H;

    fn parse(&self, history: H, stream: S) -> ParseResult<H, S> {
        let next = stream.pull();
        match next.token {
            None => Ok(Parsed { value: history, rest: next.rest }),
            Some(token) => Err(ParseFailure::new(self.message.clone(), token.position())),
        }
    }
}

/// See [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

/// Use a plain function as a parser, for rules the combinators cannot express
/// (recursion through a named function, for instance).
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn { f }
}

impl<S, H, O, F> Parser<S, H> for FromFn<F>
where
    S: TokenStream,
    F: Fn(H, S) -> ParseResult<O, S>,
{
    type Output = O;

    fn parse(&self, history: H, stream: S) -> ParseResult<O, S> {
        (self.f)(history, stream)
    }
}
