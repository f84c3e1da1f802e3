//! Tokens produced by the lexer and consumed by parser combinators.

use std::fmt;
use std::sync::Arc;

use crate::lexer::TokenConstructor;
use crate::position::{Positioned, TextPosition};

/// A lexed token: a kind tag plus the text it covers.
///
/// Equality and hashing cover all three fields, so two tokens with the same
/// text and position but different kinds (a keyword and an identifier, say)
/// are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token<K> {
    pub kind: K,
    pub position: TextPosition,
    pub text: String,
}

impl<K> Token<K> {
    pub fn new(kind: K, position: TextPosition, text: impl Into<String>) -> Self {
        Token { kind, position, text: text.into() }
    }

    /// Same text and position under a different kind.
    pub fn retag(self, kind: K) -> Self {
        Token { kind, position: self.position, text: self.text }
    }
}

impl<K> Positioned for Token<K> {
    fn position(&self) -> TextPosition {
        self.position
    }
}

impl<K: fmt::Debug> fmt::Display for Token<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.text)
    }
}

/// Constructor that keeps the matched bytes as the token text.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn text_token<K>(kind: K) -> TokenConstructor<Token<K>>
where
    K: Clone + Send + Sync + 'static,
{
    Arc::new(move |bytes: &[u8], position| {
        Token::new(kind.clone(), position, String::from_utf8_lossy(bytes))
    })
}

/// Constructor for tokens whose text is known up front (punctuation, keywords).
pub fn fixed_token<K>(kind: K, text: &'static str) -> TokenConstructor<Token<K>>
where
    K: Clone + Send + Sync + 'static,
{
    Arc::new(move |_: &[u8], position| Token::new(kind.clone(), position, text))
}

/// Matcher accepting tokens of `kind`.
pub fn is_kind<K: PartialEq>(kind: K) -> impl Fn(&Token<K>) -> bool {
    move |token| token.kind == kind
}

/// Matcher accepting tokens of `kind` whose text is exactly `text`.
pub fn is_kind_with_text<K: PartialEq>(kind: K, text: impl Into<String>) -> impl Fn(&Token<K>) -> bool {
    let text = text.into();
    move |token| token.kind == kind && token.text == text
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Identifier,
        Keyword,
    }

    #[test]
    fn test_equality_includes_kind() {
        let p = TextPosition::new(0, 7);
        let ident = Token::new(Kind::Identifier, p, "grammar");
        let keyword = ident.clone().retag(Kind::Keyword);

        assert_ne!(ident, keyword);
        assert_eq!(ident.position, keyword.position);
        assert_eq!(ident.text, keyword.text);

        let set: HashSet<_> = [ident.clone(), keyword, ident].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_equality_includes_position() {
        let a = Token::new(Kind::Identifier, TextPosition::new(0, 1), "x");
        let b = Token::new(Kind::Identifier, TextPosition::new(4, 5), "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_constructors() {
        let text = text_token(Kind::Identifier);
        let token = text(b"abc", TextPosition::new(3, 6));
        assert_eq!(token, Token::new(Kind::Identifier, TextPosition::new(3, 6), "abc"));

        let fixed = fixed_token(Kind::Keyword, "grammar");
        let token = fixed(b"ignored", TextPosition::new(0, 7));
        assert_eq!(token.text, "grammar");
        assert_eq!(token.to_string(), "Keyword(grammar)");
    }

    #[test]
    fn test_matchers() {
        let token = Token::new(Kind::Keyword, TextPosition::new(0, 7), "grammar");
        assert!(is_kind(Kind::Keyword)(&token));
        assert!(!is_kind(Kind::Identifier)(&token));
        assert!(is_kind_with_text(Kind::Keyword, "grammar")(&token));
        assert!(!is_kind_with_text(Kind::Keyword, "rule")(&token));
    }
}
