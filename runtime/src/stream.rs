//! Lazy, persistent token streams.
//!
//! A [`TokenStream`] is an immutable value standing for "the rest of the
//! tokens from here". Pulling returns the next token together with a new
//! stream for the remainder and leaves the original untouched, so the same
//! stream value can be pulled again (by a backtracking parser, for instance)
//! and yields the same result.
//!
//! Transformations ([`TokenStream::map`], [`TokenStream::flat_map`],
//! [`TokenStream::concat`]) are structural: each pull performs exactly one step
//! of work on the underlying stream and nothing is computed ahead of demand.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::position::{Positioned, TextPosition};

/// Result of pulling one element from a stream.
#[derive(Debug, Clone)]
pub struct StreamNext<T, S> {
    /// The next token, or `None` at end of stream.
    pub token: Option<T>,
    /// Position of the last token this stream produced before `token`.
    pub last_position: TextPosition,
    /// The stream following `token`.
    pub rest: S,
}

/// An immutable, lazily evaluated sequence of tokens.
pub trait TokenStream: Clone + Sized {
    type Token: Positioned + Clone;

    /// Produce the next token and the stream that follows it.
    fn pull(&self) -> StreamNext<Self::Token, Self>;

    /// Transform every token as it is pulled. Positions reported by the
    /// stream are those of the underlying tokens.
    fn map<F, R>(self, f: F) -> Map<Self, F, R>
    where
        F: Fn(Self::Token) -> R,
        R: Positioned + Clone,
    {
        Map { stream: self, f: Arc::new(f), _output: PhantomData }
    }

    /// Replace every token with a sub-stream of zero or more tokens.
    fn flat_map<F, Sub>(self, f: F) -> FlatMap<Self, F, Sub>
    where
        F: Fn(Self::Token) -> Sub,
        Sub: TokenStream,
    {
        FlatMap { stream: self, f: Arc::new(f), current: None, last: None }
    }

    /// Continue with `other` once this stream is exhausted.
    fn concat<B>(self, other: B) -> Concat<Self, B>
    where
        B: TokenStream<Token = Self::Token>,
    {
        Concat::First(self, other)
    }

    /// Iterate the tokens of this stream by repeated pulls.
    fn tokens(&self) -> Tokens<Self> {
        Tokens { stream: Some(self.clone()) }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Pure
// ══════════════════════════════════════════════════════════════════════════════

/// A stream over tokens already held in memory.
#[derive(Debug)]
pub struct PureStream<T> {
    tokens: Arc<[T]>,
    index: usize,
    last: TextPosition,
}

impl<T> PureStream<T> {
    /// Stream `tokens`, reporting `p0` as the last position before the first.
    pub fn new(p0: TextPosition, tokens: Vec<T>) -> Self {
        PureStream { tokens: tokens.into(), index: 0, last: p0 }
    }

    pub fn empty() -> Self {
        PureStream::new(TextPosition::BEGIN, Vec::new())
    }

    pub fn single(token: T) -> Self {
        PureStream::new(TextPosition::BEGIN, vec![token])
    }
}

impl<T> Clone for PureStream<T> {
    fn clone(&self) -> Self {
        PureStream { tokens: Arc::clone(&self.tokens), index: self.index, last: self.last }
    }
}

impl<T: Positioned + Clone> TokenStream for PureStream<T> {
    type Token = T;

    fn pull(&self) -> StreamNext<T, Self> {
        match self.tokens.get(self.index) {
            Some(token) => StreamNext {
                token: Some(token.clone()),
                last_position: self.last,
                rest: PureStream {
                    tokens: Arc::clone(&self.tokens),
                    index: self.index + 1,
                    last: token.position(),
                },
            },
            None => StreamNext { token: None, last_position: self.last, rest: self.clone() },
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Map
// ══════════════════════════════════════════════════════════════════════════════

/// Stream returned by [`TokenStream::map`].
pub struct Map<S, F, R> {
    stream: S,
    f: Arc<F>,
    _output: PhantomData<fn() -> R>,
}

impl<S: Clone, F, R> Clone for Map<S, F, R> {
    fn clone(&self) -> Self {
        Map { stream: self.stream.clone(), f: Arc::clone(&self.f), _output: PhantomData }
    }
}

impl<S, F, R> TokenStream for Map<S, F, R>
where
    S: TokenStream,
    F: Fn(S::Token) -> R,
    R: Positioned + Clone,
{
    type Token = R;

    fn pull(&self) -> StreamNext<R, Self> {
        let next = self.stream.pull();
        StreamNext {
            token: next.token.map(|t| (self.f)(t)),
            last_position: next.last_position,
            rest: Map { stream: next.rest, f: Arc::clone(&self.f), _output: PhantomData },
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// FlatMap
// ══════════════════════════════════════════════════════════════════════════════

/// Stream returned by [`TokenStream::flat_map`].
///
/// Holds at most one partially drained sub-stream.
pub struct FlatMap<S, F, Sub> {
    stream: S,
    f: Arc<F>,
    current: Option<Sub>,
    /// Position of the last token produced; `None` until the first one, when
    /// the underlying stream's own starting position stands in.
    last: Option<TextPosition>,
}

impl<S: Clone, F, Sub: Clone> Clone for FlatMap<S, F, Sub> {
    fn clone(&self) -> Self {
        FlatMap {
            stream: self.stream.clone(),
            f: Arc::clone(&self.f),
            current: self.current.clone(),
            last: self.last,
        }
    }
}

impl<S, F, Sub> TokenStream for FlatMap<S, F, Sub>
where
    S: TokenStream,
    F: Fn(S::Token) -> Sub,
    Sub: TokenStream,
{
    type Token = Sub::Token;

    fn pull(&self) -> StreamNext<Sub::Token, Self> {
        let mut outer = self.stream.clone();
        let mut current = self.current.clone();
        let mut last = self.last;

        loop {
            if let Some(sub) = current.take() {
                let next = sub.pull();
                if let Some(token) = next.token {
                    let rest = FlatMap {
                        stream: outer,
                        f: Arc::clone(&self.f),
                        current: Some(next.rest),
                        last: Some(token.position()),
                    };
                    let last_position = last.unwrap_or(TextPosition::BEGIN);
                    return StreamNext { token: Some(token), last_position, rest };
                }
            }

            let next = outer.pull();
            let last_position = *last.get_or_insert(next.last_position);
            match next.token {
                Some(token) => {
                    current = Some((self.f)(token));
                    outer = next.rest;
                },
                None => {
                    let rest = FlatMap { stream: next.rest, f: Arc::clone(&self.f), current: None, last };
                    return StreamNext { token: None, last_position, rest };
                },
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Concat
// ══════════════════════════════════════════════════════════════════════════════

/// Stream returned by [`TokenStream::concat`].
#[derive(Clone)]
pub enum Concat<A, B> {
    /// Still reading the first stream.
    First(A, B),
    /// The first stream is exhausted. Until the second stream produces a
    /// token, the position of the first stream's last token is carried along.
    Second(B, Option<TextPosition>),
}

impl<A, B> TokenStream for Concat<A, B>
where
    A: TokenStream,
    B: TokenStream<Token = A::Token>,
{
    type Token = A::Token;

    fn pull(&self) -> StreamNext<A::Token, Self> {
        match self {
            Concat::First(a, b) => {
                let next = a.pull();
                match next.token {
                    Some(token) => StreamNext {
                        token: Some(token),
                        last_position: next.last_position,
                        rest: Concat::First(next.rest, b.clone()),
                    },
                    None => Concat::Second(b.clone(), Some(next.last_position)).pull(),
                }
            },
            Concat::Second(b, carried) => {
                let next = b.pull();
                let last_position = carried.unwrap_or(next.last_position);
                let carried = if next.token.is_some() { None } else { *carried };
                StreamNext { token: next.token, last_position, rest: Concat::Second(next.rest, carried) }
            },
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Iteration
// ══════════════════════════════════════════════════════════════════════════════

/// Iterator returned by [`TokenStream::tokens`].
pub struct Tokens<S> {
    stream: Option<S>,
}

impl<S: TokenStream> Iterator for Tokens<S> {
    type Item = S::Token;

    fn next(&mut self) -> Option<S::Token> {
        let next = self.stream.take()?.pull();
        let token = next.token?;
        self.stream = Some(next.rest);
        Some(token)
    }
}
