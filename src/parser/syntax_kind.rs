//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in a Thorn syntax tree.
//! Grammar tables refer to terminals by these kinds, so the discriminants are
//! part of the table artifact format: append new kinds, never reorder.

/// All syntax kinds (tokens and nodes) in Thorn
///
/// Tokens are leaves (identifiers, keywords, punctuation, string pieces).
/// Nodes are composite (declarations, statements, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but never parsed)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // identifier
    NUMBER, // 42, 3.14

    // =========================================================================
    // STRING PIECES (produced by the external scanner)
    // =========================================================================
    STRING_START,        // opening "
    STRING_CONTENT,      // raw text between escapes and interpolations
    ESCAPE_SEQUENCE,     // \n
    INTERPOLATION_START, // ${
    INTERPOLATION_END,   // } closing an interpolation
    STRING_END,          // closing "

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    SEMICOLON,         // ;
    R_PAREN,           // )
    R_BRACKET,         // ]
    R_BRACE,           // }
    COMMA,             // ,
    COLON,             // :
    FAT_ARROW,         // =>
    L_PAREN,           // (
    L_BRACKET,         // [
    L_BRACE,           // {
    DOT,               // .
    EQ,                // =
    PLUS_EQ,           // +=
    MINUS_EQ,          // -=
    STAR_EQ,           // *=
    SLASH_EQ,          // /=
    PERCENT_EQ,        // %=
    QUESTION_QUESTION, // ??
    PIPE_PIPE,         // ||
    AMP_AMP,           // &&
    EQ_EQ,             // ==
    BANG_EQ,           // !=
    LT,                // <
    LT_EQ,             // <=
    GT,                // >
    GT_EQ,             // >=
    PLUS,              // +
    MINUS,             // -
    STAR,              // *
    SLASH,             // /
    PERCENT,           // %
    STAR_STAR,         // **
    BANG,              // !
    DOLLAR,            // $
    AT,                // @
    UNDERSCORE,        // _

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    AND_KW,
    CATCH_KW,
    CLASS_KW,
    ELSE_KW,
    EXPORT_KW,
    FALSE_KW,
    FOR_KW,
    FROM_KW,
    IF_KW,
    IMMUT_KW,
    IMPORT_KW,
    IN_KW,
    LET_KW,
    MATCH_KW,
    NULL_KW,
    OR_KW,
    RETURN_KW,
    THIS_KW,
    THROW_KW,
    TRUE_KW,
    TRY_KW,
    WHILE_KW,

    // =========================================================================
    // TYPE KEYWORDS
    // =========================================================================
    STRING_TYPE_KW,   // string
    NUMBER_TYPE_KW,   // number
    BOOLEAN_TYPE_KW,  // boolean
    ANY_TYPE_KW,      // Any
    VOID_TYPE_KW,     // void
    ARRAY_TYPE_KW,    // Array
    FUNCTION_TYPE_KW, // Function
    DICT_TYPE_KW,     // Dict

    // =========================================================================
    // SPECIAL
    // =========================================================================
    /// Unknown character (leaf) or recovered region (node)
    ERROR,
    /// End of input; a table terminal, never a tree element
    EOF,

    // =========================================================================
    // NODES - Declarations
    // =========================================================================
    SOURCE_FILE,
    LET_DECLARATION,
    IMMUT_DECLARATION,
    VARIABLE_DECLARATION,
    FUNCTION_DECLARATION,
    CLASS_DECLARATION,
    CLASS_BODY,
    PARAMETER_LIST,
    PARAMETER,
    TYPE_ANNOTATION,
    TYPE,

    // =========================================================================
    // NODES - Statements
    // =========================================================================
    EXPRESSION_STATEMENT,
    RETURN_STATEMENT,
    THROW_STATEMENT,
    IMPORT_STATEMENT,
    IMPORT_CLAUSE,
    EXPORT_STATEMENT,
    IF_STATEMENT,
    WHILE_STATEMENT,
    FOR_STATEMENT,
    FOR_IN_STATEMENT,
    BLOCK,
    TRY_STATEMENT,
    CATCH_CLAUSE,

    // =========================================================================
    // NODES - Expressions
    // =========================================================================
    ASSIGNMENT_EXPRESSION,
    BINARY_EXPRESSION,
    UNARY_EXPRESSION,
    CALL_EXPRESSION,
    ARGUMENT_LIST,
    MEMBER_EXPRESSION,
    INDEX_EXPRESSION,
    PARENTHESIZED_EXPRESSION,
    LAMBDA_EXPRESSION,
    MATCH_EXPRESSION,
    MATCH_ARM,
    LIST_EXPRESSION,
    DICTIONARY,
    DICTIONARY_ENTRY,
    STRING,
    INTERPOLATION,
    LITERAL,

    // Sentinel
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, WHITESPACE | LINE_COMMENT | BLOCK_COMMENT)
    }

    /// Trivia and unknown characters: leaves the automaton never sees
    pub fn is_extra(self) -> bool {
        self.is_trivia() || self == ERROR
    }

    /// Check if this is a keyword (including type keywords)
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (AND_KW as u16) && (self as u16) <= (DICT_TYPE_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (SEMICOLON as u16) && (self as u16) <= (UNDERSCORE as u16)
    }

    /// Check if this kind is a leaf token (as opposed to a composite node)
    pub fn is_token(self) -> bool {
        (self as u16) <= (EOF as u16)
    }

    /// Named kinds show up in s-expressions and `named_children`;
    /// anonymous ones are keywords and punctuation
    pub fn is_named(self) -> bool {
        !self.is_token()
            || matches!(
                self,
                IDENT | NUMBER | STRING_CONTENT | ESCAPE_SEQUENCE | LINE_COMMENT | BLOCK_COMMENT | ERROR
            )
    }

    /// Stable symbolic name of the kind
    pub fn name(self) -> &'static str {
        match self {
            WHITESPACE => "whitespace",
            LINE_COMMENT | BLOCK_COMMENT => "comment",
            IDENT => "identifier",
            NUMBER => "number",
            STRING_START | STRING_END => "\"",
            STRING_CONTENT => "string_content",
            ESCAPE_SEQUENCE => "escape_sequence",
            INTERPOLATION_START => "${",
            INTERPOLATION_END => "}",
            SEMICOLON => ";",
            R_PAREN => ")",
            R_BRACKET => "]",
            R_BRACE => "}",
            COMMA => ",",
            COLON => ":",
            FAT_ARROW => "=>",
            L_PAREN => "(",
            L_BRACKET => "[",
            L_BRACE => "{",
            DOT => ".",
            EQ => "=",
            PLUS_EQ => "+=",
            MINUS_EQ => "-=",
            STAR_EQ => "*=",
            SLASH_EQ => "/=",
            PERCENT_EQ => "%=",
            QUESTION_QUESTION => "??",
            PIPE_PIPE => "||",
            AMP_AMP => "&&",
            EQ_EQ => "==",
            BANG_EQ => "!=",
            LT => "<",
            LT_EQ => "<=",
            GT => ">",
            GT_EQ => ">=",
            PLUS => "+",
            MINUS => "-",
            STAR => "*",
            SLASH => "/",
            PERCENT => "%",
            STAR_STAR => "**",
            BANG => "!",
            DOLLAR => "$",
            AT => "@",
            UNDERSCORE => "_",
            AND_KW => "and",
            CATCH_KW => "catch",
            CLASS_KW => "class",
            ELSE_KW => "else",
            EXPORT_KW => "export",
            FALSE_KW => "false",
            FOR_KW => "for",
            FROM_KW => "from",
            IF_KW => "if",
            IMMUT_KW => "immut",
            IMPORT_KW => "import",
            IN_KW => "in",
            LET_KW => "let",
            MATCH_KW => "match",
            NULL_KW => "null",
            OR_KW => "or",
            RETURN_KW => "return",
            THIS_KW => "this",
            THROW_KW => "throw",
            TRUE_KW => "true",
            TRY_KW => "try",
            WHILE_KW => "while",
            STRING_TYPE_KW => "string",
            NUMBER_TYPE_KW => "number",
            BOOLEAN_TYPE_KW => "boolean",
            ANY_TYPE_KW => "Any",
            VOID_TYPE_KW => "void",
            ARRAY_TYPE_KW => "Array",
            FUNCTION_TYPE_KW => "Function",
            DICT_TYPE_KW => "Dict",
            ERROR => "ERROR",
            EOF => "end",
            SOURCE_FILE => "source_file",
            LET_DECLARATION => "let_declaration",
            IMMUT_DECLARATION => "immut_declaration",
            VARIABLE_DECLARATION => "variable_declaration",
            FUNCTION_DECLARATION => "function_declaration",
            CLASS_DECLARATION => "class_declaration",
            CLASS_BODY => "class_body",
            PARAMETER_LIST => "parameter_list",
            PARAMETER => "parameter",
            TYPE_ANNOTATION => "type_annotation",
            TYPE => "type",
            EXPRESSION_STATEMENT => "expression_statement",
            RETURN_STATEMENT => "return_statement",
            THROW_STATEMENT => "throw_statement",
            IMPORT_STATEMENT => "import_statement",
            IMPORT_CLAUSE => "import_clause",
            EXPORT_STATEMENT => "export_statement",
            IF_STATEMENT => "if_statement",
            WHILE_STATEMENT => "while_statement",
            FOR_STATEMENT => "for_statement",
            FOR_IN_STATEMENT => "for_in_statement",
            BLOCK => "block",
            TRY_STATEMENT => "try_statement",
            CATCH_CLAUSE => "catch_clause",
            ASSIGNMENT_EXPRESSION => "assignment_expression",
            BINARY_EXPRESSION => "binary_expression",
            UNARY_EXPRESSION => "unary_expression",
            CALL_EXPRESSION => "call_expression",
            ARGUMENT_LIST => "argument_list",
            MEMBER_EXPRESSION => "member_expression",
            INDEX_EXPRESSION => "index_expression",
            PARENTHESIZED_EXPRESSION => "parenthesized_expression",
            LAMBDA_EXPRESSION => "lambda_expression",
            MATCH_EXPRESSION => "match_expression",
            MATCH_ARM => "match_arm",
            LIST_EXPRESSION => "list_expression",
            DICTIONARY => "dictionary",
            DICTIONARY_ENTRY => "dictionary_entry",
            STRING => "string",
            INTERPOLATION => "interpolation",
            LITERAL => "literal",
            __LAST => "__LAST",
        }
    }

    /// Name used in diagnostics: quoted for anonymous tokens
    pub fn display_name(self) -> String {
        if self.is_token() && !self.is_named() && self != EOF {
            format!("'{}'", self.name())
        } else {
            match self {
                EOF => "end of input".to_string(),
                other => other.name().replace('_', " "),
            }
        }
    }

    /// Kind for a raw discriminant, if it is in range
    pub fn from_raw(raw: u16) -> Option<SyntaxKind> {
        (raw < __LAST as u16).then(|| SyntaxKind::from(rowan::SyntaxKind(raw)))
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThornLanguage {}

impl rowan::Language for ThornLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<ThornLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ThornLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ThornLanguage>;
