//! Crate error type.
//!
//! Lexical and syntactic problems never surface here: they become `ERROR`
//! nodes in the tree plus [`SyntaxError`](crate::parser::SyntaxError)
//! diagnostics. This type covers faults of the caller or of a table artifact.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The table artifact was written by an incompatible format version
    #[error("grammar table version mismatch: expected {expected}, found {found}")]
    TableVersionMismatch { expected: u16, found: u16 },

    /// The table artifact is truncated or not a table at all
    #[error("malformed grammar table: {0}")]
    MalformedTable(String),

    /// The grammar value cannot be compiled into a table
    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    /// An edit does not fit the tree or text it is applied to
    #[error("invalid edit range {start}..{old_end}: {reason}")]
    InvalidEditRange {
        start: usize,
        old_end: usize,
        reason: String,
    },

    /// The parse observed its cancellation token
    #[error("parse cancelled")]
    Cancelled,
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTable(message.into())
    }

    pub fn invalid_edit(start: usize, old_end: usize, reason: impl Into<String>) -> Self {
        Self::InvalidEditRange {
            start,
            old_end,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
