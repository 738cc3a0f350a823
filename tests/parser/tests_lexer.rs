//! Lexer and external scanner tests

#![allow(clippy::unwrap_used)]

use rstest::rstest;
use thorn_syntax::SyntaxKind::{self, *};
use thorn_syntax::parser::tokenize;

fn kinds(source: &str) -> Vec<SyntaxKind> {
    tokenize(source)
        .into_iter()
        .map(|token| token.kind)
        .filter(|kind| *kind != WHITESPACE)
        .collect()
}

#[rstest]
#[case::fraction("1.5", &[NUMBER])]
#[case::trailing_dot("1.", &[NUMBER, DOT])]
#[case::member("a.b", &[IDENT, DOT, IDENT])]
#[case::fat_arrow("=>", &[FAT_ARROW])]
#[case::nullish("a ?? b", &[IDENT, QUESTION_QUESTION, IDENT])]
#[case::underscore("_", &[UNDERSCORE])]
#[case::underscore_ident("_x", &[IDENT])]
#[case::double_underscore("__", &[IDENT])]
#[case::underscore_digit("_1", &[IDENT])]
#[case::two_underscores("_ _", &[UNDERSCORE, UNDERSCORE])]
#[case::type_keyword("Any", &[ANY_TYPE_KW])]
#[case::lowercase_any("any", &[IDENT])]
#[case::keyword_prefix("letter", &[IDENT])]
#[case::word_operators("a and b or c", &[IDENT, AND_KW, IDENT, OR_KW, IDENT])]
#[case::escape("\"a\\n\"", &[STRING_START, STRING_CONTENT, ESCAPE_SEQUENCE, STRING_END])]
#[case::empty_string("\"\"", &[STRING_START, STRING_END])]
#[case::interpolation("\"${a}\"", &[STRING_START, INTERPOLATION_START, IDENT, INTERPOLATION_END, STRING_END])]
#[case::dollar_in_string("\"$x\"", &[STRING_START, STRING_CONTENT, STRING_END])]
#[case::block_comment("/* x */ a", &[BLOCK_COMMENT, IDENT])]
#[case::line_comment("a // b", &[IDENT, LINE_COMMENT])]
#[case::unknown("#", &[ERROR])]
#[case::unicode_ident("héllo", &[IDENT])]
#[case::lambda("$(x) => x", &[DOLLAR, L_PAREN, IDENT, R_PAREN, FAT_ARROW, IDENT])]
#[case::immut("@immut", &[AT, IMMUT_KW])]
fn test_token_kinds(#[case] source: &str, #[case] expected: &[SyntaxKind]) {
    assert_eq!(kinds(source), expected, "tokens of {source:?}");
}

#[rstest]
#[case("let x = \"a${ {\"k\": 1}[\"k\"] }b\";")]
#[case("/* unterminated")]
#[case("\"unterminated ${ x")]
#[case("€ £ # `")]
#[case("")]
fn test_tokens_tile_input(#[case] source: &str) {
    let tokens = tokenize(source);
    let mut offset = 0usize;
    for token in &tokens {
        assert_eq!(usize::from(token.offset), offset);
        offset += token.text.len();
    }
    assert_eq!(offset, source.len());
    let joined: String = tokens.iter().map(|token| token.text).collect();
    assert_eq!(joined, source);
}

#[test]
fn test_unterminated_comment_is_one_token() {
    let tokens = tokenize("a /* open\nstill open");
    assert_eq!(tokens.last().unwrap().kind, BLOCK_COMMENT);
    assert_eq!(tokens.last().unwrap().text, "/* open\nstill open");
}
