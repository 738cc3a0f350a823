//! Incremental LR parser for Thorn
//!
//! This module provides a lossless, error-tolerant, incremental parser using:
//! - **logos** plus an external scanner for lexing
//! - an **LALR(1)** table for the automaton
//! - **rowan** green trees for the CST
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos + scanner) → LexedToken stream, trivia included
//!     ↓
//! Driver (ParseTable) → shift / reduce / goto, recovery on error
//!     ↓
//! Builder → GreenNode tree, interned through the parser's node cache
//!     ↓
//! Tree → Node views, fields, positions
//! ```
//!
//! ## Incremental Reparsing
//!
//! When text changes, we:
//! 1. Fold the recorded edits into one changed region
//! 2. Re-lex only around that region
//! 3. Re-run the automaton, pushing unchanged subtrees of the old tree whole
//!    wherever the state they were built in comes up again

pub(crate) mod builder;
mod driver;
pub mod errors;
pub(crate) mod incremental;
pub(crate) mod lexer;
mod options;
mod recovery;
pub(crate) mod scanner;
mod syntax_kind;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span};

pub use driver::ParseStats;
pub use errors::{ErrorCode, Severity, SyntaxError};
pub use lexer::{Lexer, Token, tokenize};
pub use options::ParseOptions;
pub use scanner::{MAX_LOOKAHEAD, ScanState};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, ThornLanguage};

use crate::base::LineIndex;
use crate::error::{Error, Result};
use crate::grammar::thorn;
use crate::language::Language;
use crate::tree::{InputEdit, Tree, TreeData};
use builder::NodeCache;
use driver::Driver;
use incremental::ReuseMap;
use lexer::LexedToken;

/// Parses text into [`Tree`]s with one language.
///
/// A parser owns the node cache its trees share storage through, so keep one
/// parser per document (or per worker) rather than one per parse.
pub struct Parser {
    language: Language,
    options: ParseOptions,
    cache: NodeCache,
    cancellation: Option<CancellationToken>,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            options: ParseOptions::default(),
            cache: NodeCache::default(),
            cancellation: None,
        }
    }

    pub fn thorn() -> Self {
        Self::new(thorn::language().clone())
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    /// Install a token checked once per token consumed; a cancelled parse
    /// returns [`Error::Cancelled`]
    pub fn set_cancellation_token(&mut self, token: Option<CancellationToken>) {
        self.cancellation = token;
    }

    pub fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Drop every interned token and node
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Parse `text`. With an old tree whose recorded edits turn its text into
    /// `text`, unchanged parts are re-lexed and re-parsed only as far as
    /// needed; the result equals a fresh parse either way.
    pub fn parse(&mut self, text: &str, old_tree: Option<&Tree>) -> Result<Tree> {
        let old_tree = old_tree.filter(|old| Arc::ptr_eq(old.language().table(), self.language.table()));
        match old_tree {
            None => {
                let _span = debug_span!("parse", language = self.language.name(), len = text.len()).entered();
                let tokens = lexer::lex(text);
                let relexed = tokens.len();
                self.run(text, tokens, None, 0, relexed)
            }
            Some(old) => {
                let region = old.changed_region(text)?;
                let _span = debug_span!(
                    "reparse",
                    language = self.language.name(),
                    len = text.len(),
                    start = region.start,
                    old_end = region.old_end,
                    new_end = region.new_end
                )
                .entered();
                let relexed = incremental::relex(old.tokens(), text, region);
                debug!(
                    relexed = relexed.new_changed.len(),
                    replaced = relexed.old_changed.len(),
                    total = relexed.tokens.len(),
                    "relexed changed region"
                );
                let reuse = self
                    .options
                    .reuse_subtrees
                    .then(|| ReuseMap::new(old.records(), &relexed));
                let count = relexed.new_changed.len();
                self.run(text, relexed.tokens, reuse, old.version() + 1, count)
            }
        }
    }

    /// Apply `edits` to a copy of `old_tree` and re-parse. Edits must be in
    /// ascending order and must not overlap, each expressed in the
    /// coordinates left by the ones before it.
    pub fn reparse(&mut self, old_tree: &Tree, text: &str, edits: &[InputEdit]) -> Result<Tree> {
        for pair in edits.windows(2) {
            if pair[1].start_byte < pair[0].new_end_byte {
                return Err(Error::invalid_edit(
                    pair[1].start_byte,
                    pair[1].old_end_byte,
                    "edits must be ascending and must not overlap",
                ));
            }
        }
        let mut edited = old_tree.clone();
        for edit in edits {
            edited.edit(edit)?;
        }
        self.parse(text, Some(&edited))
    }

    fn run(
        &mut self,
        text: &str,
        tokens: Vec<LexedToken>,
        reuse: Option<ReuseMap<'_>>,
        version: u64,
        relexed: usize,
    ) -> Result<Tree> {
        let table = Arc::clone(self.language.table());
        let output = Driver::new(
            &table,
            text,
            &tokens,
            &mut self.cache,
            &self.options,
            self.cancellation.as_ref(),
            reuse,
        )
        .run()?;
        let swept = self.cache.collect(&output.green);
        if swept > 0 {
            debug!(swept, cached = self.cache.len(), "swept node cache");
        }
        let stats = ParseStats {
            relexed_tokens: relexed,
            ..output.stats
        };
        Ok(Tree::new(TreeData {
            language: self.language.clone(),
            text: text.to_owned(),
            green: output.green,
            tokens,
            records: output.records,
            errors: output.errors,
            line_index: LineIndex::new(text),
            version,
            stats,
        }))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::thorn()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language.name())
            .field("options", &self.options)
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Parse Thorn source text with a fresh parser.
///
/// # Panics
///
/// Never with the built-in Thorn table, which cannot fail a parse without
/// a cancellation token installed.
pub fn parse(text: &str) -> Tree {
    Parser::thorn()
        .parse(text, None)
        .expect("the built-in Thorn table parses any input")
}
