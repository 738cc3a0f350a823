//! Error recovery
//!
//! When the table has no action, the driver picks the cheapest repair that
//! lets the parse continue:
//!
//! - pop `d` stack entries and skip `k` tokens, costing `k` plus the tokens
//!   the popped entries hold; everything removed goes into one `ERROR` node
//!   that becomes a leading extra of the next token
//! - insert one missing terminal, costing 1, when the lookahead is accepted
//!   right after it
//!
//! Skipping wins ties. Candidates are checked by running the automaton on
//! state numbers alone, so nothing is built until a repair is chosen.

use std::mem::take;

use rowan::NodeOrToken;
use text_size::TextRange;
use tracing::debug;

use super::driver::Driver;
use super::errors::{ErrorCode, SyntaxError};
use super::syntax_kind::SyntaxKind;
use crate::error::{Error, Result};
use crate::table::{Action, ParseTable, StateId};

/// Bound on reductions in one simulated step, against cyclic grammars
const MAX_SIMULATED_REDUCTIONS: usize = 4096;

/// A state stack layered over a borrowed prefix
struct SimStack<'s> {
    base: &'s [StateId],
    live: usize,
    overlay: Vec<StateId>,
}

impl<'s> SimStack<'s> {
    fn new(base: &'s [StateId]) -> Self {
        SimStack {
            base,
            live: base.len(),
            overlay: Vec::new(),
        }
    }

    fn top(&self) -> Option<StateId> {
        match self.overlay.last() {
            Some(&state) => Some(state),
            None => self.live.checked_sub(1).map(|i| self.base[i]),
        }
    }

    fn pop(&mut self, mut n: usize) -> bool {
        let from_overlay = n.min(self.overlay.len());
        self.overlay.truncate(self.overlay.len() - from_overlay);
        n -= from_overlay;
        // The bottom state stays
        if n >= self.live {
            return false;
        }
        self.live -= n;
        true
    }

    /// Reduce until `terminal` is shifted or accepted
    fn consume(&mut self, table: &ParseTable, terminal: u16) -> Option<Action> {
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            match table.action(self.top()?, terminal) {
                Action::Shift(next) => {
                    self.overlay.push(next);
                    return Some(Action::Shift(next));
                }
                Action::Accept => return Some(Action::Accept),
                Action::Error => return None,
                Action::Reduce(production) => {
                    let info = table.production(production);
                    if !self.pop(info.len as usize) {
                        return None;
                    }
                    let next = table.goto(self.top()?, info.lhs)?;
                    self.overlay.push(next);
                }
            }
        }
        None
    }
}

/// Whether the automaton can consume `terminal` from `states`
pub(crate) fn accepts(table: &ParseTable, states: &[StateId], terminal: u16) -> bool {
    SimStack::new(states).consume(table, terminal).is_some()
}

/// Whether inserting `inserted` lets `lookahead` through
fn accepts_after(table: &ParseTable, states: &[StateId], inserted: u16, lookahead: u16) -> bool {
    let mut stack = SimStack::new(states);
    matches!(stack.consume(table, inserted), Some(Action::Shift(_))) && stack.consume(table, lookahead).is_some()
}

#[derive(Debug, Clone, Copy)]
struct Repair {
    cost: usize,
    pop: usize,
    skip: usize,
}

impl Driver<'_> {
    pub(super) fn recover(&mut self) -> Result<()> {
        self.inserted = None;
        self.last_recovery = Some(self.pos);
        self.stats.recoveries += 1;
        let table = self.table;
        let tokens = self.tokens;
        let budget = self.options.recovery_budget.max(1);
        let states: Vec<StateId> = self.stack.iter().map(|entry| entry.state).collect();
        let lookahead = self.lookahead();

        // Significant tokens from the cursor on; running out means end of input
        let upcoming: Vec<usize> = (self.pos..tokens.len())
            .filter(|&index| !tokens[index].kind.is_extra())
            .take(budget + 1)
            .collect();

        let mut best: Option<Repair> = None;
        for skip in 0..=budget {
            if best.is_some_and(|repair| skip >= repair.cost) {
                break;
            }
            let terminal = match upcoming.get(skip) {
                Some(&index) => table.terminal(tokens[index].kind),
                None if skip == upcoming.len() => Some(table.eof()),
                None => break,
            };
            let Some(terminal) = terminal else {
                continue;
            };
            let mut cost = skip;
            for pop in 0..states.len() {
                if pop > 0 {
                    cost += self.stack[states.len() - pop].entry.token_count as usize;
                }
                if best.is_some_and(|repair| cost >= repair.cost) {
                    break;
                }
                if skip == 0 && pop == 0 {
                    continue;
                }
                if accepts(table, &states[..states.len() - pop], terminal) {
                    best = Some(Repair { cost, pop, skip });
                    break;
                }
            }
        }

        let insertion = match (best, lookahead) {
            (Some(repair), _) if repair.cost <= 1 => None,
            (_, Some(lookahead)) => {
                (1..table.terminal_count() as u16).find(|&t| accepts_after(table, &states, t, lookahead))
            }
            (_, None) => None,
        };

        if let Some(terminal) = insertion {
            self.insert_missing(terminal);
        } else if let Some(repair) = best {
            debug!(pop = repair.pop, skip = repair.skip, cost = repair.cost, "recovery: skip");
            self.skip(repair.pop, &upcoming[..repair.skip]);
        } else if upcoming.is_empty() {
            // Even the start state rejects end of input
            return Err(Error::malformed("no state accepts end of input"));
        } else {
            let flushed = budget.min(upcoming.len());
            debug!(flushed, "recovery budget exhausted");
            self.skip(0, &upcoming[..flushed]);
        }
        Ok(())
    }

    fn insert_missing(&mut self, terminal: u16) {
        let kind = self.table.terminal_kind(terminal);
        debug!(missing = ?kind, "recovery: insert");
        let offset = self.pending_start();
        // An identifier standing in for a whole operand reads as a missing expression
        let error = match self.context_code(self.state()) {
            Some(code) if kind == SyntaxKind::IDENT => SyntaxError::at_offset(code.default_message(), offset, code),
            _ => SyntaxError::at_offset(
                format!("missing {}", kind.display_name()),
                offset,
                ErrorCode::for_missing(kind),
            ),
        };
        self.errors.push(error);
        self.inserted = Some(terminal);
    }

    /// What the state was waiting for, when that names the problem better
    /// than the token found
    fn context_code(&self, state: StateId) -> Option<ErrorCode> {
        let expected: Vec<SyntaxKind> = self.table.expected(state).collect();
        ErrorCode::for_expected(&expected)
    }

    /// Pop `pop` entries and skip the significant tokens in `skipped`,
    /// wrapping all of it in one `ERROR` node
    fn skip(&mut self, pop: usize, skipped: &[usize]) {
        let tokens = self.tokens;
        let failed_state = self.state();
        let lookahead_kind = self.lookahead_kind();
        let lookahead_start = self.token_start(self.pos);

        let popped = self.stack.split_off(self.stack.len() - pop);
        let mut outside = Vec::new();
        let mut content = Vec::new();
        let mut first_popped = None;
        let mut last_popped = None;
        for (index, popped) in popped.into_iter().enumerate() {
            let entry = popped.entry;
            if index == 0 {
                outside = entry.leading;
            } else {
                content.extend(entry.leading);
            }
            content.extend(entry.elements);
            first_popped = first_popped.or(entry.first_token);
            last_popped = entry.last_token.or(last_popped);
        }

        let context = self.context_code(failed_state);
        let describe = |first_kind: SyntaxKind| match context {
            Some(code) => (
                format!("{}, found {}", code.default_message(), lookahead_kind.display_name()),
                code,
            ),
            None => (
                format!("unexpected {}", first_kind.display_name()),
                ErrorCode::for_unexpected(first_kind),
            ),
        };

        let mut pending = take(&mut self.pending);
        let error = match skipped.last() {
            Some(&last) => {
                let first_kind = tokens[self.pos].kind;
                let start = first_popped.map_or(self.pos, |first| first as usize);
                let range = self.error_range(start, last);
                content.append(&mut pending);
                for index in self.pos..=last {
                    let token = &tokens[index];
                    self.report_extra(token);
                    let green = self.green_token(token);
                    content.push(NodeOrToken::Token(green));
                }
                self.pos = last + 1;
                let (message, code) = describe(first_kind);
                SyntaxError::new(message, range, code)
            }
            None => match (first_popped, last_popped) {
                (Some(first), Some(last)) => {
                    let (message, code) = describe(tokens[first as usize].kind);
                    SyntaxError::new(message, self.error_range(first as usize, last as usize), code)
                }
                _ => SyntaxError::new(
                    format!("unexpected {}", lookahead_kind.display_name()),
                    TextRange::empty(lookahead_start),
                    ErrorCode::E0901,
                ),
            },
        };
        self.errors.push(error.with_hint(self.expected_hint(failed_state)));

        let node = self.cache.node(SyntaxKind::ERROR, content);
        outside.push(NodeOrToken::Node(node));
        outside.append(&mut pending);
        self.pending = outside;
        self.pending_error = true;
        self.collect_extras();
    }

    fn expected_hint(&self, state: StateId) -> String {
        let expected: Vec<String> = self
            .table
            .expected(state)
            .take(3)
            .map(SyntaxKind::display_name)
            .collect();
        match expected.as_slice() {
            [] => "remove this".to_string(),
            [only] => format!("expected {only}"),
            several => format!("expected one of {}", several.join(", ")),
        }
    }
}
