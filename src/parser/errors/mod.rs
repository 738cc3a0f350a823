//! Parser error handling module
//!
//! Syntax errors never abort a parse. Each repair made by the recovery layer
//! (or each bad character the lexer meets) leaves an `ERROR` element in the
//! tree and one [`SyntaxError`] here:
//! - Categorized error codes for filtering and documentation
//! - Hints for the common missing-token cases

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{Severity, SyntaxError};
