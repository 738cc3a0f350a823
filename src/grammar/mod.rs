//! Grammar model
//!
//! A [`Grammar`] is a plain value: terminals are [`SyntaxKind`]s, nonterminals
//! are declared on a [`GrammarBuilder`] and either produce a node (visible) or
//! splice their children into the parent (hidden, names starting with `_`).
//! Precedence levels are declared lowest first and attach to terminals and,
//! explicitly, to productions. Fields name positions in a production's
//! right-hand side.
//!
//! The table module compiles a grammar into an LALR(1) [`ParseTable`].
//!
//! [`ParseTable`]: crate::table::ParseTable

pub mod thorn;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::parser::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalId(pub(crate) u16);

impl NonTerminalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(SyntaxKind),
    NonTerminal(NonTerminalId),
}

impl From<SyntaxKind> for Symbol {
    fn from(kind: SyntaxKind) -> Self {
        Symbol::Terminal(kind)
    }
}

impl From<NonTerminalId> for Symbol {
    fn from(id: NonTerminalId) -> Self {
        Symbol::NonTerminal(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    NonAssoc,
}

/// A precedence level; higher levels bind tighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub level: u16,
    pub assoc: Assoc,
}

/// One right-hand-side position, optionally labelled with a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhsItem {
    pub symbol: Symbol,
    pub field: Option<SmolStr>,
}

impl From<SyntaxKind> for RhsItem {
    fn from(kind: SyntaxKind) -> Self {
        RhsItem {
            symbol: kind.into(),
            field: None,
        }
    }
}

impl From<NonTerminalId> for RhsItem {
    fn from(id: NonTerminalId) -> Self {
        RhsItem {
            symbol: id.into(),
            field: None,
        }
    }
}

/// Label a right-hand-side position with a field name
pub fn field(name: &str, symbol: impl Into<Symbol>) -> RhsItem {
    RhsItem {
        symbol: symbol.into(),
        field: Some(SmolStr::new(name)),
    }
}

/// Build a right-hand side from kinds, nonterminals and [`field`] items
#[macro_export]
macro_rules! rhs {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::grammar::RhsItem::from($item)),*]
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub name: SmolStr,
    /// Node kind built for this symbol; `None` for hidden symbols
    pub kind: Option<SyntaxKind>,
}

impl NonTerminal {
    pub fn is_hidden(&self) -> bool {
        self.kind.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: NonTerminalId,
    pub rhs: Vec<RhsItem>,
    /// Node kind built on reduce. Defaults to the LHS kind; hidden symbols
    /// may still name a kind per production.
    pub kind: Option<SyntaxKind>,
    pub prec: Option<Precedence>,
}

impl Production {
    /// Build a node of `kind` when this production reduces
    pub fn node(&mut self, kind: SyntaxKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    /// Explicit precedence, overriding the one of the last terminal
    pub fn prec(&mut self, prec: Precedence) -> &mut Self {
        self.prec = Some(prec);
        self
    }
}

/// A complete grammar, ready for table construction
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) name: SmolStr,
    pub(crate) terminals: Vec<SyntaxKind>,
    pub(crate) nonterminals: Vec<NonTerminal>,
    pub(crate) productions: Vec<Production>,
    pub(crate) start: NonTerminalId,
    pub(crate) terminal_precedence: IndexMap<SyntaxKind, Precedence>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terminals in declaration order; recovery tries insertions in this order
    pub fn terminals(&self) -> &[SyntaxKind] {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &[NonTerminal] {
        &self.nonterminals
    }

    pub fn nonterminal(&self, id: NonTerminalId) -> &NonTerminal {
        &self.nonterminals[id.index()]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    pub fn terminal_precedence(&self, kind: SyntaxKind) -> Option<Precedence> {
        self.terminal_precedence.get(&kind).copied()
    }

    /// Precedence of a production: explicit, else that of its last terminal
    pub fn production_precedence(&self, production: &Production) -> Option<Precedence> {
        production.prec.or_else(|| {
            production.rhs.iter().rev().find_map(|item| match item.symbol {
                Symbol::Terminal(kind) => Some(self.terminal_precedence(kind)),
                Symbol::NonTerminal(_) => None,
            })?
        })
    }

    /// Field names in first-use order
    pub fn field_names(&self) -> Vec<SmolStr> {
        let mut names: IndexMap<SmolStr, ()> = IndexMap::new();
        for item in self.productions.iter().flat_map(|p| p.rhs.iter()) {
            if let Some(name) = &item.field {
                names.insert(name.clone(), ());
            }
        }
        names.into_keys().collect()
    }
}

/// Incremental constructor for a [`Grammar`]
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    name: SmolStr,
    terminals: IndexMap<SyntaxKind, ()>,
    nonterminals: Vec<NonTerminal>,
    productions: Vec<Production>,
    terminal_precedence: IndexMap<SyntaxKind, Precedence>,
    next_level: u16,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            terminals: IndexMap::new(),
            nonterminals: Vec::new(),
            productions: Vec::new(),
            terminal_precedence: IndexMap::new(),
            next_level: 1,
        }
    }

    /// Declare terminals up front to fix their order. Terminals used in
    /// productions are added automatically after the declared ones.
    pub fn terminals(&mut self, kinds: &[SyntaxKind]) -> &mut Self {
        for &kind in kinds {
            self.terminals.insert(kind, ());
        }
        self
    }

    /// A nonterminal that builds nodes of `kind`
    pub fn visible(&mut self, name: &str, kind: SyntaxKind) -> NonTerminalId {
        self.push_nonterminal(name, Some(kind))
    }

    /// A nonterminal whose children are spliced into its parent
    pub fn hidden(&mut self, name: &str) -> NonTerminalId {
        self.push_nonterminal(name, None)
    }

    fn push_nonterminal(&mut self, name: &str, kind: Option<SyntaxKind>) -> NonTerminalId {
        let id = NonTerminalId(self.nonterminals.len() as u16);
        self.nonterminals.push(NonTerminal {
            name: SmolStr::new(name),
            kind,
        });
        id
    }

    /// Declare the next (tighter) precedence level for `kinds`
    pub fn precedence(&mut self, assoc: Assoc, kinds: &[SyntaxKind]) -> Precedence {
        let prec = Precedence {
            level: self.next_level,
            assoc,
        };
        self.next_level += 1;
        for &kind in kinds {
            self.terminal_precedence.insert(kind, prec);
        }
        prec
    }

    pub fn rule(&mut self, lhs: NonTerminalId, rhs: Vec<RhsItem>) -> &mut Production {
        let kind = self.nonterminals.get(lhs.index()).and_then(|nt| nt.kind);
        for item in &rhs {
            if let Symbol::Terminal(kind) = item.symbol {
                self.terminals.insert(kind, ());
            }
        }
        self.productions.push(Production {
            lhs,
            rhs,
            kind,
            prec: None,
        });
        let last = self.productions.len() - 1;
        &mut self.productions[last]
    }

    pub fn build(self, start: NonTerminalId) -> Result<Grammar> {
        if start.index() >= self.nonterminals.len() {
            return Err(Error::InvalidGrammar("start symbol is not declared".into()));
        }
        for (index, nt) in self.nonterminals.iter().enumerate() {
            if !self.productions.iter().any(|p| p.lhs.index() == index) {
                return Err(Error::InvalidGrammar(format!("`{}` has no productions", nt.name)));
            }
        }
        for production in &self.productions {
            for item in &production.rhs {
                match item.symbol {
                    Symbol::Terminal(kind) if !kind.is_token() || kind.is_extra() || kind == SyntaxKind::EOF => {
                        return Err(Error::InvalidGrammar(format!(
                            "`{}` cannot be used as a terminal",
                            kind.name()
                        )));
                    }
                    Symbol::NonTerminal(id) if id.index() >= self.nonterminals.len() => {
                        return Err(Error::InvalidGrammar(format!("unknown nonterminal #{}", id.0)));
                    }
                    _ => {}
                }
            }
        }
        Ok(Grammar {
            name: self.name,
            terminals: self.terminals.into_keys().collect(),
            nonterminals: self.nonterminals,
            productions: self.productions,
            start,
            terminal_precedence: self.terminal_precedence,
        })
    }
}
