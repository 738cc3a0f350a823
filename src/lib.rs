//! # thorn-syntax
//!
//! Incremental, error-tolerant LALR(1) parsing for the Thorn language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! batch     → Parallel parsing of independent documents (rayon)
//!   ↓
//! tree      → Tree / Node / TreeCursor views, edits, JSON projection
//!   ↓
//! parser    → Lexer + scanner, LR driver, recovery, subtree reuse
//!   ↓
//! language  → Language handles and the process-wide registry
//!   ↓
//! table     → LALR(1) construction and the binary table artifact
//!   ↓
//! grammar   → Grammar builder and the Thorn grammar
//!   ↓
//! base      → Primitives (Point, LineIndex, TextRange)
//! ```
//!
//! ## Example
//!
//! ```
//! use thorn_syntax::{InputEdit, Parser};
//!
//! let mut parser = Parser::thorn();
//! let tree = parser.parse("let x = 1;", None).unwrap();
//! assert_eq!(
//!     tree.to_sexp(),
//!     "(source_file (let_declaration name: (identifier) value: (literal (number))))"
//! );
//!
//! let edit = InputEdit::replace("let x = 1;", 8..9, "12");
//! let tree = parser.reparse(&tree, "let x = 12;", &[edit]).unwrap();
//! assert_eq!(tree.version(), 1);
//! ```

// ============================================================================
// MODULES (dependency order: base → grammar → table → language → parser → tree)
// ============================================================================

/// Foundation types: Point, LineIndex, TextRange
pub mod base;

/// Crate-wide error type
pub mod error;

/// Grammar definitions: builder, precedence, the Thorn grammar
pub mod grammar;

/// Parse tables: LALR(1) construction, binary artifact codec
pub mod table;

/// Language handles and registry
pub mod language;

/// Parser: lexer, LR driver, error recovery, incremental reuse
pub mod parser;

/// Syntax trees produced by the parser
pub mod tree;

/// Parallel batch parsing
pub mod batch;

pub use batch::parse_batch;
pub use error::{Error, Result};
pub use grammar::thorn;
pub use language::{Language, registry};
pub use parser::{ErrorCode, ParseOptions, ParseStats, Parser, Severity, SyntaxError, SyntaxKind, parse};
pub use table::{ParseTable, TABLE_FORMAT_VERSION};
pub use tree::{InputEdit, Node, Tree, TreeCursor};

// Re-export foundation types
pub use base::{LineIndex, Point, TextRange, TextSize};
