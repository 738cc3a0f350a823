//! Logos-based lexer for Thorn
//!
//! Fast tokenization using the logos crate for the regular token set, with
//! the external [`scanner`](super::scanner) consulted first for anything
//! context-sensitive.

use logos::Logos;
use text_size::{TextRange, TextSize};

use super::scanner::{self, ScanState};
use super::syntax_kind::SyntaxKind;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Token as stored alongside a tree, for incremental re-lexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LexedToken {
    pub kind: SyntaxKind,
    pub range: TextRange,
    /// The scanner was at top level when this token started
    pub top_level: bool,
}

/// Lexer combining the external scanner with the logos-generated tokenizer
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    state: ScanState,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_state(input, 0, ScanState::new())
    }

    /// Resume lexing at `offset` in the given scanner state
    pub fn with_state(input: &'a str, offset: usize, state: ScanState) -> Self {
        Self {
            input,
            offset,
            state,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub(crate) fn next_lexed(&mut self) -> Option<LexedToken> {
        if self.offset >= self.input.len() {
            return None;
        }
        let top_level = self.state.is_top_level();
        let (kind, len) = match scanner::scan(self.input, self.offset, &mut self.state) {
            Some(hit) => hit,
            None => self.scan_regular(),
        };
        let start = TextSize::new(self.offset as u32);
        self.offset += len;
        Some(LexedToken {
            kind,
            range: TextRange::at(start, TextSize::new(len as u32)),
            top_level,
        })
    }

    fn scan_regular(&self) -> (SyntaxKind, usize) {
        let rest = &self.input[self.offset..];
        let mut inner = LogosToken::lexer(rest);
        match inner.next() {
            Some(Ok(token)) => {
                let len = inner.span().end;
                let kind = SyntaxKind::from(token);
                if kind == SyntaxKind::IDENT || kind == SyntaxKind::UNDERSCORE || kind.is_keyword() {
                    // `naïve`: logos stops at the first non-ASCII letter
                    let more = scanner::ident_continue_len(&rest[len..]);
                    if more > 0 {
                        return (SyntaxKind::IDENT, len + more);
                    }
                }
                (kind, len)
            }
            _ => (
                SyntaxKind::ERROR,
                rest.chars().next().map(char::len_utf8).unwrap_or(1),
            ),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let lexed = self.next_lexed()?;
        Some(Token {
            kind: lexed.kind,
            text: &self.input[lexed.range],
            offset: lexed.range.start(),
        })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

pub(crate) fn lex(input: &str) -> Vec<LexedToken> {
    let mut lexer = Lexer::new(input);
    std::iter::from_fn(|| lexer.next_lexed()).collect()
}

/// Logos token enum - maps to SyntaxKind
///
/// Braces, quotes, comments, numbers and non-ASCII input never reach logos;
/// the external scanner claims them first.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("_", priority = 5)]
    Underscore,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("=>")]
    FatArrow,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("??")]
    QuestionQuestion,
    #[token("||")]
    PipePipe,
    #[token("&&")]
    AmpAmp,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("**")]
    StarStar,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("and")]
    AndKw,
    #[token("catch")]
    CatchKw,
    #[token("class")]
    ClassKw,
    #[token("else")]
    ElseKw,
    #[token("export")]
    ExportKw,
    #[token("false")]
    FalseKw,
    #[token("for")]
    ForKw,
    #[token("from")]
    FromKw,
    #[token("if")]
    IfKw,
    #[token("immut")]
    ImmutKw,
    #[token("import")]
    ImportKw,
    #[token("in")]
    InKw,
    #[token("let")]
    LetKw,
    #[token("match")]
    MatchKw,
    #[token("null")]
    NullKw,
    #[token("or")]
    OrKw,
    #[token("return")]
    ReturnKw,
    #[token("this")]
    ThisKw,
    #[token("throw")]
    ThrowKw,
    #[token("true")]
    TrueKw,
    #[token("try")]
    TryKw,
    #[token("while")]
    WhileKw,

    // =========================================================================
    // TYPE KEYWORDS
    // =========================================================================
    #[token("string")]
    StringTypeKw,
    #[token("number")]
    NumberTypeKw,
    #[token("boolean")]
    BooleanTypeKw,
    #[token("Any")]
    AnyTypeKw,
    #[token("void")]
    VoidTypeKw,
    #[token("Array")]
    ArrayTypeKw,
    #[token("Function")]
    FunctionTypeKw,
    #[token("Dict")]
    DictTypeKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Underscore => SyntaxKind::UNDERSCORE,
            LogosToken::FatArrow => SyntaxKind::FAT_ARROW,
            LogosToken::PlusEq => SyntaxKind::PLUS_EQ,
            LogosToken::MinusEq => SyntaxKind::MINUS_EQ,
            LogosToken::StarEq => SyntaxKind::STAR_EQ,
            LogosToken::SlashEq => SyntaxKind::SLASH_EQ,
            LogosToken::PercentEq => SyntaxKind::PERCENT_EQ,
            LogosToken::QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::StarStar => SyntaxKind::STAR_STAR,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Dollar => SyntaxKind::DOLLAR,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::AndKw => SyntaxKind::AND_KW,
            LogosToken::CatchKw => SyntaxKind::CATCH_KW,
            LogosToken::ClassKw => SyntaxKind::CLASS_KW,
            LogosToken::ElseKw => SyntaxKind::ELSE_KW,
            LogosToken::ExportKw => SyntaxKind::EXPORT_KW,
            LogosToken::FalseKw => SyntaxKind::FALSE_KW,
            LogosToken::ForKw => SyntaxKind::FOR_KW,
            LogosToken::FromKw => SyntaxKind::FROM_KW,
            LogosToken::IfKw => SyntaxKind::IF_KW,
            LogosToken::ImmutKw => SyntaxKind::IMMUT_KW,
            LogosToken::ImportKw => SyntaxKind::IMPORT_KW,
            LogosToken::InKw => SyntaxKind::IN_KW,
            LogosToken::LetKw => SyntaxKind::LET_KW,
            LogosToken::MatchKw => SyntaxKind::MATCH_KW,
            LogosToken::NullKw => SyntaxKind::NULL_KW,
            LogosToken::OrKw => SyntaxKind::OR_KW,
            LogosToken::ReturnKw => SyntaxKind::RETURN_KW,
            LogosToken::ThisKw => SyntaxKind::THIS_KW,
            LogosToken::ThrowKw => SyntaxKind::THROW_KW,
            LogosToken::TrueKw => SyntaxKind::TRUE_KW,
            LogosToken::TryKw => SyntaxKind::TRY_KW,
            LogosToken::WhileKw => SyntaxKind::WHILE_KW,
            LogosToken::StringTypeKw => SyntaxKind::STRING_TYPE_KW,
            LogosToken::NumberTypeKw => SyntaxKind::NUMBER_TYPE_KW,
            LogosToken::BooleanTypeKw => SyntaxKind::BOOLEAN_TYPE_KW,
            LogosToken::AnyTypeKw => SyntaxKind::ANY_TYPE_KW,
            LogosToken::VoidTypeKw => SyntaxKind::VOID_TYPE_KW,
            LogosToken::ArrayTypeKw => SyntaxKind::ARRAY_TYPE_KW,
            LogosToken::FunctionTypeKw => SyntaxKind::FUNCTION_TYPE_KW,
            LogosToken::DictTypeKw => SyntaxKind::DICT_TYPE_KW,
        }
    }
}
