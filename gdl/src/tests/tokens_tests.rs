//! Tests for the grammar-language token front end.

use astify_runtime::{TextPosition, Token, TokenStream};

use crate::tokens::{GdlLexerConfig, GdlToken, GdlTokenKind, GdlTokenizer};

fn kinds_and_text(tokens: &[GdlToken]) -> Vec<(GdlTokenKind, &str)> {
    tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
}

#[test]
fn test_reserved_word_becomes_keyword() {
    let tokenizer = GdlTokenizer::default();

    let tokens: Vec<_> = tokenizer.tokenize("grammar").tokens().collect();
    let raw: Vec<_> = tokenizer.lexer("grammar").tokens().collect();

    let position = TextPosition::new(0, 7);
    assert_eq!(tokens, vec![Token::new(GdlTokenKind::Keyword, position, "grammar")]);
    assert_eq!(raw, vec![Token::new(GdlTokenKind::Identifier, position, "grammar")]);
    assert_ne!(tokens, raw, "same text and position, different kind");
}

#[test]
fn test_reserved_word_must_match_exactly() {
    let tokenizer = GdlTokenizer::default();
    let tokens: Vec<_> = tokenizer.tokenize("grammars Grammar").tokens().collect();
    assert_eq!(
        kinds_and_text(&tokens),
        vec![(GdlTokenKind::Identifier, "grammars"), (GdlTokenKind::Identifier, "Grammar")]
    );
}

#[test]
fn test_custom_reserved_words() {
    let tokenizer = GdlTokenizer::new(GdlLexerConfig::default().with_reserved_word("rule"));
    let tokens: Vec<_> = tokenizer.tokenize("rule grammar other").tokens().collect();
    assert_eq!(
        kinds_and_text(&tokens),
        vec![
            (GdlTokenKind::Keyword, "rule"),
            (GdlTokenKind::Keyword, "grammar"),
            (GdlTokenKind::Identifier, "other"),
        ]
    );
}

#[test]
fn test_full_token_set() {
    let input = "grammar Calc;\n// note\nsum = \"a\\\"b\" | 'c' 42 /* x */ id_1";
    let tokenizer = GdlTokenizer::default();
    let tokens: Vec<_> = tokenizer.tokenize(input).tokens().collect();

    assert_eq!(
        kinds_and_text(&tokens),
        vec![
            (GdlTokenKind::Keyword, "grammar"),
            (GdlTokenKind::Identifier, "Calc"),
            (GdlTokenKind::Symbol, ";"),
            (GdlTokenKind::Identifier, "sum"),
            (GdlTokenKind::Symbol, "="),
            (GdlTokenKind::String, "\"a\\\"b\""),
            (GdlTokenKind::Symbol, "|"),
            (GdlTokenKind::String, "'c'"),
            (GdlTokenKind::Integer, "42"),
            (GdlTokenKind::Identifier, "id_1"),
        ]
    );
    assert_eq!(tokens[1].position, TextPosition::new(8, 12));
    assert_eq!(tokens[5].position, TextPosition::new(28, 34));
    assert_eq!(tokens[9].position, TextPosition::new(52, 56));
}

#[test]
fn test_trivia_in_raw_lexer() {
    let tokenizer = GdlTokenizer::default();
    let raw: Vec<_> = tokenizer.lexer("a /* b */ // c\n").tokens().collect();
    assert_eq!(
        kinds_and_text(&raw),
        vec![
            (GdlTokenKind::Identifier, "a"),
            (GdlTokenKind::Whitespace, " "),
            (GdlTokenKind::Comment, "/* b */"),
            (GdlTokenKind::Whitespace, " "),
            (GdlTokenKind::Comment, "// c"),
            (GdlTokenKind::Whitespace, "\n"),
        ]
    );
}

#[test]
fn test_block_comment_ends_at_first_close() {
    let tokenizer = GdlTokenizer::default();
    let raw: Vec<_> = tokenizer.lexer("/** a **/x*/").tokens().collect();
    assert_eq!(raw[0].text, "/** a **/");
    assert_eq!(raw[1].text, "x");
}

#[test]
fn test_unterminated_string_degrades_to_symbols() {
    let tokenizer = GdlTokenizer::default();
    let tokens: Vec<_> = tokenizer.tokenize("\"abc").tokens().collect();
    assert_eq!(
        kinds_and_text(&tokens),
        vec![(GdlTokenKind::Symbol, "\""), (GdlTokenKind::Identifier, "abc")]
    );
}

#[test]
fn test_unmatched_byte_is_single_symbol() {
    let tokenizer = GdlTokenizer::default();
    let tokens: Vec<_> = tokenizer.tokenize("a\u{1}b").tokens().collect();
    assert_eq!(
        tokens,
        vec![
            Token::new(GdlTokenKind::Identifier, TextPosition::new(0, 1), "a"),
            Token::new(GdlTokenKind::Symbol, TextPosition::new(1, 2), "\u{1}"),
            Token::new(GdlTokenKind::Identifier, TextPosition::new(2, 3), "b"),
        ]
    );
}

#[test]
fn test_only_trivia() {
    let tokenizer = GdlTokenizer::default();
    let stream = tokenizer.tokenize("  // nothing here");
    let end = stream.pull();
    assert_eq!(end.token, None);
}
