//! LR driver
//!
//! Runs the table over a token stream. Extras never reach the automaton:
//! they collect in `pending` and become the leading extras of whatever is
//! pushed next. When an old tree is available, the driver first checks at
//! each step whether a whole subtree of it can be pushed instead of
//! re-deriving it token by token.

use std::mem::take;

use rowan::{GreenNode, NodeOrToken};
use text_size::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::builder::{Entry, GreenElement, NodeCache, NodeRecord, element_kind, element_len};
use super::errors::{ErrorCode, SyntaxError};
use super::incremental::ReuseMap;
use super::lexer::LexedToken;
use super::options::ParseOptions;
use super::syntax_kind::SyntaxKind;
use crate::error::{Error, Result};
use crate::table::{Action, ParseTable, ProductionId, StateId};

#[derive(Debug)]
pub(super) struct StackEntry {
    pub state: StateId,
    pub entry: Entry,
}

/// Counters for one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub tokens: usize,
    pub relexed_tokens: usize,
    pub reused_nodes: usize,
    pub reused_tokens: usize,
    pub recoveries: usize,
}

pub(super) struct ParseOutput {
    pub green: GreenNode,
    pub records: Vec<NodeRecord>,
    pub errors: Vec<SyntaxError>,
    pub stats: ParseStats,
}

pub(super) struct Driver<'a> {
    pub table: &'a ParseTable,
    pub text: &'a str,
    pub tokens: &'a [LexedToken],
    pub cache: &'a mut NodeCache,
    pub options: &'a ParseOptions,
    cancel: Option<&'a CancellationToken>,
    reuse: Option<ReuseMap<'a>>,
    pub stack: Vec<StackEntry>,
    /// Extras seen since the last push, in source order
    pub pending: Vec<GreenElement>,
    pub pending_error: bool,
    /// Index of the current lookahead token, `tokens.len()` at end of input
    pub pos: usize,
    /// Terminal recovery decided to insert, standing in as the lookahead
    pub inserted: Option<u16>,
    /// Cursor of the latest recovery; nodes whose last token precedes it
    /// were reduced under a repair that looked past their lookahead
    pub last_recovery: Option<usize>,
    records: Vec<NodeRecord>,
    pub errors: Vec<SyntaxError>,
    pub stats: ParseStats,
}

impl<'a> Driver<'a> {
    pub(super) fn new(
        table: &'a ParseTable,
        text: &'a str,
        tokens: &'a [LexedToken],
        cache: &'a mut NodeCache,
        options: &'a ParseOptions,
        cancel: Option<&'a CancellationToken>,
        reuse: Option<ReuseMap<'a>>,
    ) -> Self {
        Driver {
            table,
            text,
            tokens,
            cache,
            options,
            cancel,
            reuse,
            stack: Vec::new(),
            pending: Vec::new(),
            pending_error: false,
            pos: 0,
            inserted: None,
            last_recovery: None,
            records: Vec::new(),
            errors: Vec::new(),
            stats: ParseStats {
                tokens: tokens.len(),
                ..ParseStats::default()
            },
        }
    }

    pub(super) fn run(mut self) -> Result<ParseOutput> {
        self.check_cancelled()?;
        self.stack.push(StackEntry {
            state: 0,
            entry: Entry::default(),
        });
        self.collect_extras();
        loop {
            let state = self.state();
            if self.inserted.is_none() && self.try_reuse(state)? {
                continue;
            }
            match self.action(state) {
                Action::Shift(next) => self.shift(next)?,
                Action::Reduce(production) => self.reduce(production)?,
                Action::Accept => return Ok(self.finish()),
                Action::Error => self.recover()?,
            }
        }
    }

    pub(super) fn state(&self) -> StateId {
        self.stack.last().map_or(0, |entry| entry.state)
    }

    /// Terminal index of the lookahead; `None` for a kind the grammar never uses
    pub(super) fn lookahead(&self) -> Option<u16> {
        if let Some(terminal) = self.inserted {
            return Some(terminal);
        }
        match self.tokens.get(self.pos) {
            Some(token) => self.table.terminal(token.kind),
            None => Some(self.table.eof()),
        }
    }

    pub(super) fn lookahead_kind(&self) -> SyntaxKind {
        self.tokens.get(self.pos).map_or(SyntaxKind::EOF, |token| token.kind)
    }

    fn action(&self, state: StateId) -> Action {
        self.lookahead()
            .map_or(Action::Error, |terminal| self.table.action(state, terminal))
    }

    pub(super) fn token_start(&self, index: usize) -> TextSize {
        self.tokens
            .get(index)
            .map_or(TextSize::of(self.text), |token| token.range.start())
    }

    /// Where the pending extras begin
    pub(super) fn pending_start(&self) -> TextSize {
        let len: TextSize = self.pending.iter().map(element_len).sum();
        self.token_start(self.pos) - len
    }

    pub(super) fn green_token(&mut self, token: &LexedToken) -> rowan::GreenToken {
        self.cache.token(token.kind, &self.text[token.range])
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    /// Move extras at the cursor into `pending`
    pub(super) fn collect_extras(&mut self) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos).filter(|token| token.kind.is_extra()) {
            self.report_extra(token);
            let green = self.green_token(token);
            self.pending.push(NodeOrToken::Token(green));
            self.pos += 1;
        }
    }

    /// Diagnostics the lexer cannot emit itself
    pub(super) fn report_extra(&mut self, token: &LexedToken) {
        let text = &self.text[token.range];
        match token.kind {
            SyntaxKind::ERROR => {
                self.pending_error = true;
                self.errors.push(SyntaxError::new(
                    format!("unexpected character {text:?}"),
                    token.range,
                    ErrorCode::E0101,
                ));
            }
            SyntaxKind::BLOCK_COMMENT if text.len() < 4 || !text.ends_with("*/") => {
                self.errors.push(
                    SyntaxError::from_code(ErrorCode::E0103, token.range).with_hint("close the comment with `*/`"),
                );
            }
            _ => {}
        }
    }

    fn shift(&mut self, next: StateId) -> Result<()> {
        if let Some(terminal) = self.inserted.take() {
            let missing = self.cache.missing(self.table.terminal_kind(terminal));
            self.stack.push(StackEntry {
                state: next,
                entry: Entry {
                    elements: vec![NodeOrToken::Node(missing)],
                    has_error: true,
                    ..Entry::default()
                },
            });
            return Ok(());
        }

        self.check_cancelled()?;
        let tokens = self.tokens;
        let token = tokens
            .get(self.pos)
            .ok_or_else(|| Error::malformed(format!("state {} shifts end of input", self.state())))?;
        let green = self.green_token(token);
        let entry = Entry::token(
            take(&mut self.pending),
            take(&mut self.pending_error),
            green,
            self.pos as u32,
        );
        self.stack.push(StackEntry { state: next, entry });
        self.pos += 1;
        self.collect_extras();
        Ok(())
    }

    fn reduce(&mut self, production: ProductionId) -> Result<()> {
        let table = self.table;
        let info = table.production(production);
        let len = info.len as usize;
        if len >= self.stack.len() {
            return Err(Error::malformed(format!("production {production} pops past the stack")));
        }
        let children = self.stack.split_off(self.stack.len() - len);
        let pre_state = self.state();

        let mut built = Entry::default();
        for (position, child) in children.into_iter().enumerate() {
            let mut entry = child.entry;
            if position == 0 {
                built.leading = take(&mut entry.leading);
                built.leading_error = entry.leading_error;
            } else {
                built.has_error |= entry.leading_error;
                built.elements.append(&mut entry.leading);
            }

            let offset = built.elements.len() as u32;
            built
                .fields
                .extend(entry.fields.iter().map(|&(field, index)| (field, offset + index)));
            for &(_, field) in info.fields.iter().filter(|(at, _)| *at as usize == position) {
                for (index, element) in entry.elements.iter().enumerate() {
                    if !element_kind(element).is_trivia() {
                        built.fields.push((field, offset + index as u32));
                    }
                }
            }

            built.elements.append(&mut entry.elements);
            built.first_token = built.first_token.or(entry.first_token);
            built.last_token = entry.last_token.or(built.last_token);
            built.token_count += entry.token_count;
            built.has_error |= entry.has_error;
            built.tainted |= entry.tainted;
        }
        built.tainted |= self.inserted.is_some();
        if let (Some(at), Some(last)) = (self.last_recovery, built.last_token) {
            built.tainted |= at > last as usize;
        }

        if let Some(kind) = info.kind {
            let mut fields = take(&mut built.fields);
            fields.sort_by_key(|&(_, index)| index);
            let green = self.cache.node(kind, take(&mut built.elements));
            if let (Some(first), Some(last)) = (built.first_token, built.last_token) {
                self.records.push(NodeRecord {
                    first_token: first,
                    end_token: last + 1,
                    lookahead: self.pos as u32,
                    pre_state,
                    symbol: info.lhs,
                    production,
                    green: green.clone(),
                    fields: fields.into_boxed_slice(),
                    token_count: built.token_count,
                    reusable: !built.has_error && !built.tainted,
                    order: self.records.len() as u32,
                });
            }
            built.elements.push(NodeOrToken::Node(green));
        }

        let next = table.goto(pre_state, info.lhs).ok_or_else(|| {
            Error::malformed(format!(
                "no goto from state {pre_state} on {}",
                table.nonterminal_name(info.lhs)
            ))
        })?;
        self.stack.push(StackEntry {
            state: next,
            entry: built,
        });
        Ok(())
    }

    /// Push a subtree of the old tree if one fits the current configuration
    fn try_reuse(&mut self, state: StateId) -> Result<bool> {
        let Some(reuse) = self.reuse else {
            return Ok(false);
        };
        if self.pos >= self.tokens.len() {
            return Ok(false);
        }
        let Some(record) = reuse.candidate(self.pos as u32, state) else {
            return Ok(false);
        };
        let Some(next) = self.table.goto(state, record.symbol) else {
            return Ok(false);
        };
        self.check_cancelled()?;

        for old in reuse.descendants(record).into_iter().chain([record]) {
            let order = self.records.len() as u32;
            self.records.push(reuse.translate(old, order));
        }

        let first = self.pos as u32;
        let end = reuse.to_new(record.end_token);
        trace!(
            kind = ?SyntaxKind::from(record.green.kind()),
            first,
            end,
            "reused subtree"
        );
        self.stack.push(StackEntry {
            state: next,
            entry: Entry {
                leading: take(&mut self.pending),
                leading_error: take(&mut self.pending_error),
                elements: vec![NodeOrToken::Node(record.green.clone())],
                first_token: Some(first),
                last_token: Some(end - 1),
                token_count: record.token_count,
                ..Entry::default()
            },
        });
        self.stats.reused_nodes += 1;
        self.stats.reused_tokens += (end - first) as usize;
        self.pos = end as usize;
        self.collect_extras();
        Ok(true)
    }

    fn finish(mut self) -> ParseOutput {
        let mut children = Vec::new();
        if let Some(top) = self.stack.pop() {
            children.extend(top.entry.leading);
            children.extend(top.entry.elements);
        }
        children.append(&mut self.pending);
        let green = GreenNode::new(SyntaxKind::SOURCE_FILE.into(), children);

        self.records.sort_by(|a, b| {
            a.first_token
                .cmp(&b.first_token)
                .then(b.end_token.cmp(&a.end_token))
                .then(b.order.cmp(&a.order))
        });
        self.errors.sort_by_key(|error| error.range.start());

        debug!(
            tokens = self.stats.tokens,
            nodes = self.records.len(),
            errors = self.errors.len(),
            reused_nodes = self.stats.reused_nodes,
            recoveries = self.stats.recoveries,
            "parse finished"
        );
        ParseOutput {
            green,
            records: self.records,
            errors: self.errors,
            stats: self.stats,
        }
    }

    pub(super) fn error_range(&self, first: usize, last: usize) -> TextRange {
        TextRange::new(self.tokens[first].range.start(), self.tokens[last].range.end())
    }
}
