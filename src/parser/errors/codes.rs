//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (braces, semicolons)
//! - E03xx: Declaration errors (bindings, functions, classes)
//! - E04xx: Expression errors
//! - E05xx: Import/export errors
//! - E09xx: Generic/fallback errors

use std::fmt;

use crate::parser::SyntaxKind;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors (invalid tokens)
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string literal
    E0102,
    /// Unterminated block comment
    E0103,

    // =========================================================================
    // E02xx: Structural errors (braces, semicolons, delimiters)
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed brace `{`
    E0202,
    /// Unclosed parenthesis `(`
    E0203,
    /// Unclosed bracket `[`
    E0204,
    /// Unexpected closing delimiter
    E0205,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Type annotation without a type
    E0305,

    // =========================================================================
    // E04xx: Expression errors
    // =========================================================================
    /// Missing expression where expected
    E0406,

    // =========================================================================
    // E05xx: Import/export errors
    // =========================================================================
    /// Invalid import
    E0501,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
    /// Expected a specific token
    E0902,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0301 => "E0301",
            Self::E0305 => "E0305",
            Self::E0406 => "E0406",
            Self::E0501 => "E0501",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0103 => "unterminated block comment",
            Self::E0201 => "missing semicolon",
            Self::E0202 => "unclosed brace",
            Self::E0203 => "unclosed parenthesis",
            Self::E0204 => "unclosed bracket",
            Self::E0205 => "unexpected closing delimiter",
            Self::E0301 => "missing identifier",
            Self::E0305 => "expected type",
            Self::E0406 => "expected expression",
            Self::E0501 => "invalid import",
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
        }
    }

    /// Code for a token that recovery had to insert
    pub fn for_missing(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::SEMICOLON => Self::E0201,
            SyntaxKind::R_BRACE => Self::E0202,
            SyntaxKind::R_PAREN => Self::E0203,
            SyntaxKind::R_BRACKET => Self::E0204,
            SyntaxKind::STRING_END => Self::E0102,
            SyntaxKind::IDENT => Self::E0301,
            _ => Self::E0902,
        }
    }

    /// Code for a region that recovery had to skip, by its first token
    pub fn for_unexpected(kind: SyntaxKind) -> Self {
        match kind {
            SyntaxKind::R_BRACE | SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET => Self::E0205,
            SyntaxKind::IMPORT_KW | SyntaxKind::EXPORT_KW | SyntaxKind::FROM_KW => Self::E0501,
            _ => Self::E0901,
        }
    }

    /// Code for a parser state, from the terminals it accepts: an operand
    /// position (but not a statement start) or a type position
    pub fn for_expected(expected: &[SyntaxKind]) -> Option<Self> {
        let accepts = |kind| expected.contains(&kind);
        if accepts(SyntaxKind::LET_KW) {
            None
        } else if accepts(SyntaxKind::NUMBER) {
            Some(Self::E0406)
        } else if accepts(SyntaxKind::NUMBER_TYPE_KW) {
            Some(Self::E0305)
        } else {
            None
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
