//! Incremental re-parsing
//!
//! Two phases share the work with the driver:
//!
//! 1. [`relex`] re-lexes only around the changed region. Tokens ending more
//!    than [`MAX_LOOKAHEAD`] bytes before the change are kept, lexing
//!    restarts at a top-level token boundary, and stops as soon as a new
//!    boundary lines up with a shifted old boundary at top level. Every
//!    later old token is kept with its offset shifted.
//! 2. During the parse, a [`ReuseMap`] answers whether the old tree has a
//!    subtree that the driver may push whole at its current state and token.

use std::ops::Range;

use text_size::{TextRange, TextSize};

use super::builder::NodeRecord;
use super::lexer::{LexedToken, Lexer};
use super::scanner::{MAX_LOOKAHEAD, ScanState};
use crate::table::StateId;
use crate::tree::InputEdit;

/// All edits since the last parse folded into one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChangedRegion {
    pub start: usize,
    /// End of the region in the old text
    pub old_end: usize,
    /// End of the region in the new text
    pub new_end: usize,
}

impl ChangedRegion {
    /// Fold edits, each given in the coordinates left by the previous one
    pub(crate) fn fold(edits: &[InputEdit]) -> Option<ChangedRegion> {
        let (first, rest) = edits.split_first()?;
        let mut region = ChangedRegion {
            start: first.start_byte,
            old_end: first.old_end_byte,
            new_end: first.new_end_byte,
        };
        for edit in rest {
            // End of the union, before this edit applies
            let end = region.new_end.max(edit.old_end_byte);
            if edit.old_end_byte > region.new_end {
                region.old_end = edit.old_end_byte + region.old_end - region.new_end;
            }
            region.start = region.start.min(edit.start_byte);
            region.new_end = end + edit.new_end_byte - edit.old_end_byte;
        }
        Some(region)
    }

    pub(crate) fn delta(&self) -> i64 {
        self.new_end as i64 - self.old_end as i64
    }
}

#[derive(Debug)]
pub(crate) struct Relexed {
    pub tokens: Vec<LexedToken>,
    /// Old token indices replaced by fresh ones
    pub old_changed: Range<u32>,
    /// Indices of the fresh tokens in the new stream
    pub new_changed: Range<u32>,
}

fn shifted(token: &LexedToken, delta: i64) -> LexedToken {
    let start = (u32::from(token.range.start()) as i64 + delta) as u32;
    LexedToken {
        range: TextRange::at(TextSize::new(start), token.range.len()),
        ..*token
    }
}

/// Re-lex `new_text` around `region`, reusing `old` tokens outside it
pub(crate) fn relex(old: &[LexedToken], new_text: &str, region: ChangedRegion) -> Relexed {
    let delta = region.delta();

    // Tokens whose lexing never looked at the region
    let unaffected = old.partition_point(|token| usize::from(token.range.end()) + MAX_LOOKAHEAD <= region.start);
    let restart = (0..=unaffected)
        .rev()
        .find(|&index| old.get(index).is_some_and(|token| token.top_level))
        .unwrap_or(0);
    let offset = old.get(restart).map_or(0, |token| usize::from(token.range.start()));

    let mut lexer = Lexer::with_state(new_text, offset, ScanState::new());
    let mut fresh = Vec::new();
    let mut resume = old.len();
    loop {
        let at = lexer.offset();
        if at >= region.new_end && lexer.state().is_top_level() {
            let old_at = at as i64 - delta;
            if old_at >= region.old_end as i64 {
                match old.binary_search_by_key(&(old_at as u32), |token| u32::from(token.range.start())) {
                    Ok(index) if old[index].top_level => {
                        resume = index;
                        break;
                    }
                    _ => {}
                }
            }
        }
        match lexer.next_lexed() {
            Some(token) => fresh.push(token),
            None => break,
        }
    }

    let fresh_count = fresh.len();
    let mut tokens = Vec::with_capacity(restart + fresh_count + old.len() - resume);
    tokens.extend_from_slice(&old[..restart]);
    tokens.append(&mut fresh);
    tokens.extend(old[resume..].iter().map(|token| shifted(token, delta)));

    Relexed {
        tokens,
        old_changed: restart as u32..resume as u32,
        new_changed: restart as u32..(restart + fresh_count) as u32,
    }
}

/// Maps the new token stream onto the old tree's node records
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReuseMap<'a> {
    records: &'a [NodeRecord],
    old_start: u32,
    old_end: u32,
    new_end: u32,
}

impl<'a> ReuseMap<'a> {
    /// `records` must be sorted by first token, outermost first
    pub(crate) fn new(records: &'a [NodeRecord], relexed: &Relexed) -> Self {
        ReuseMap {
            records,
            old_start: relexed.old_changed.start,
            old_end: relexed.old_changed.end,
            new_end: relexed.new_changed.end,
        }
    }

    /// Old index of an unchanged new token
    fn to_old(&self, new: u32) -> Option<u32> {
        if new < self.old_start {
            Some(new)
        } else if new >= self.new_end {
            Some(new - self.new_end + self.old_end)
        } else {
            None
        }
    }

    /// New index of an old token outside the changed region
    pub(crate) fn to_new(&self, old: u32) -> u32 {
        if old < self.old_start {
            old
        } else {
            old - self.old_end + self.new_end
        }
    }

    /// Both the node's tokens and its lookahead lie before or after the change
    fn unaffected(&self, record: &NodeRecord) -> bool {
        record.lookahead < self.old_start || record.first_token >= self.old_end
    }

    /// Largest reusable node starting at new token `new` in `state`
    pub(crate) fn candidate(&self, new: u32, state: StateId) -> Option<&'a NodeRecord> {
        let old = self.to_old(new)?;
        let from = self.records.partition_point(|record| record.first_token < old);
        self.records[from..]
            .iter()
            .take_while(|record| record.first_token == old)
            .find(|record| record.pre_state == state && record.reusable && self.unaffected(record))
    }

    /// Records of nodes inside `record`, in creation order
    pub(crate) fn descendants(&self, record: &NodeRecord) -> Vec<&'a NodeRecord> {
        let from = self.records.partition_point(|r| r.first_token < record.first_token);
        let mut inner: Vec<&'a NodeRecord> = self.records[from..]
            .iter()
            .take_while(|r| r.first_token < record.end_token)
            .filter(|r| r.end_token <= record.end_token && r.order < record.order)
            .collect();
        inner.sort_by_key(|r| r.order);
        inner
    }

    /// Copy of an old record in new token coordinates
    pub(crate) fn translate(&self, record: &NodeRecord, order: u32) -> NodeRecord {
        NodeRecord {
            first_token: self.to_new(record.first_token),
            end_token: self.to_new(record.end_token),
            lookahead: self.to_new(record.lookahead),
            order,
            ..record.clone()
        }
    }
}
