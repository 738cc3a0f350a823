//! Parse tables
//!
//! A [`ParseTable`] is the immutable automaton the parser core runs on:
//! (state, terminal) → [`Action`] and (state, nonterminal) → goto state,
//! plus the production list the tree builder needs (LHS, length, node kind,
//! field layout). Tables are built in-process from a [`Grammar`] by the
//! LALR(1) construction in [`lalr`], or loaded from a binary artifact by
//! [`codec`].
//!
//! Terminal index 0 is always end of input.
//!
//! [`Grammar`]: crate::grammar::Grammar

pub mod codec;
mod lalr;

use smol_str::SmolStr;

use crate::grammar::Grammar;
use crate::parser::SyntaxKind;

/// Version of the binary table layout written by [`ParseTable::to_bytes`]
pub const TABLE_FORMAT_VERSION: u16 = 1;

pub type StateId = u32;
pub type ProductionId = u32;

pub(crate) const NO_STATE: StateId = StateId::MAX;
const NO_TERMINAL: u16 = u16::MAX;

/// Index of a field name in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub(crate) u16);

impl FieldId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Error,
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionInfo {
    /// Nonterminal index of the left-hand side
    pub lhs: u16,
    /// Number of right-hand-side symbols
    pub len: u16,
    /// Node kind built on reduce; `None` splices children into the parent
    pub kind: Option<SyntaxKind>,
    /// (right-hand-side position, field) pairs
    pub fields: Box<[(u16, FieldId)]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// A conflict precedence could not settle, and how it was settled instead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: SyntaxKind,
    pub kind: ConflictKind,
    pub candidates: Vec<Action>,
    pub chosen: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    name: SmolStr,
    terminals: Vec<SyntaxKind>,
    terminal_lookup: Vec<u16>,
    nonterminals: Vec<SmolStr>,
    start: u16,
    field_names: Vec<SmolStr>,
    productions: Vec<ProductionInfo>,
    state_count: u32,
    actions: Vec<Action>,
    gotos: Vec<StateId>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    /// Compile a grammar into an LALR(1) table
    pub fn build(grammar: &Grammar) -> ParseTable {
        lalr::build(grammar)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        name: SmolStr,
        terminals: Vec<SyntaxKind>,
        nonterminals: Vec<SmolStr>,
        start: u16,
        field_names: Vec<SmolStr>,
        productions: Vec<ProductionInfo>,
        state_count: u32,
        actions: Vec<Action>,
        gotos: Vec<StateId>,
        conflicts: Vec<Conflict>,
    ) -> ParseTable {
        let mut terminal_lookup = vec![NO_TERMINAL; SyntaxKind::__LAST as usize];
        for (index, kind) in terminals.iter().enumerate() {
            terminal_lookup[*kind as usize] = index as u16;
        }
        ParseTable {
            name,
            terminals,
            terminal_lookup,
            nonterminals,
            start,
            field_names,
            productions,
            state_count,
            actions,
            gotos,
            conflicts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_count(&self) -> u32 {
        self.state_count
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Terminal index of end of input
    pub fn eof(&self) -> u16 {
        0
    }

    /// Terminal index of a token kind, if the grammar uses it
    pub fn terminal(&self, kind: SyntaxKind) -> Option<u16> {
        match self.terminal_lookup.get(kind as usize) {
            Some(&index) if index != NO_TERMINAL => Some(index),
            _ => None,
        }
    }

    pub fn terminal_kind(&self, terminal: u16) -> SyntaxKind {
        self.terminals[terminal as usize]
    }

    pub fn action(&self, state: StateId, terminal: u16) -> Action {
        self.actions[state as usize * self.terminals.len() + terminal as usize]
    }

    pub fn goto(&self, state: StateId, nonterminal: u16) -> Option<StateId> {
        match self.gotos[state as usize * self.nonterminals.len() + nonterminal as usize] {
            NO_STATE => None,
            target => Some(target),
        }
    }

    /// Terminals with a non-error action in `state`
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = SyntaxKind> + '_ {
        (0..self.terminals.len() as u16)
            .filter(move |&t| self.action(state, t) != Action::Error)
            .map(|t| self.terminal_kind(t))
    }

    pub fn production(&self, id: ProductionId) -> &ProductionInfo {
        &self.productions[id as usize]
    }

    pub fn productions(&self) -> &[ProductionInfo] {
        &self.productions
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn nonterminal_name(&self, nonterminal: u16) -> &str {
        &self.nonterminals[nonterminal as usize]
    }

    /// Nonterminal index of the grammar's start symbol
    pub fn start_symbol(&self) -> u16 {
        self.start
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_names
            .iter()
            .position(|n| n == name)
            .map(|index| FieldId(index as u16))
    }

    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.field_names.get(id.index()).map(SmolStr::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    /// Conflicts that precedence did not resolve
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
