//! LALR(1) table construction
//!
//! Canonical LR(1) item sets are built with their lookaheads, but states are
//! keyed by their kernel core: a goto that reaches an existing core merges
//! its lookaheads into that state and requeues it until nothing changes.
//! The result has LR(0)-many states with LALR(1) lookaheads.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::{Action, Conflict, ConflictKind, FieldId, NO_STATE, ParseTable, ProductionId, ProductionInfo, StateId};
use crate::grammar::{Assoc, Grammar, Symbol};
use crate::parser::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Sym {
    T(u16),
    N(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Item {
    production: u32,
    dot: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    fn with_capacity(terminals: usize) -> Self {
        Self {
            words: vec![0; terminals.div_ceil(64)],
        }
    }

    fn insert(&mut self, terminal: u16) -> bool {
        let (word, bit) = (terminal as usize / 64, terminal as usize % 64);
        let fresh = self.words[word] & (1 << bit) == 0;
        self.words[word] |= 1 << bit;
        fresh
    }

    fn union_with(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | *theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..64)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| (index * 64 + bit) as u16)
        })
    }
}

struct Prod {
    lhs: u16,
    rhs: Vec<Sym>,
}

struct State {
    kernel: Vec<Item>,
    lookaheads: Vec<TerminalSet>,
    transitions: Vec<(Sym, StateId)>,
}

struct Builder<'g> {
    grammar: &'g Grammar,
    terminals: Vec<SyntaxKind>,
    prods: Vec<Prod>,
    by_lhs: Vec<Vec<u32>>,
    nullable: Vec<bool>,
    first: Vec<TerminalSet>,
    augmented: u32,
}

pub(super) fn build(grammar: &Grammar) -> ParseTable {
    let builder = Builder::new(grammar);
    let states = builder.states();
    builder.into_table(states)
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let mut terminals = vec![SyntaxKind::EOF];
        terminals.extend(grammar.terminals().iter().copied());
        let index: FxHashMap<SyntaxKind, u16> = terminals
            .iter()
            .enumerate()
            .map(|(i, kind)| (*kind, i as u16))
            .collect();

        let nonterminal_count = grammar.nonterminals().len();
        let mut prods: Vec<Prod> = grammar
            .productions()
            .iter()
            .map(|p| Prod {
                lhs: p.lhs.0,
                rhs: p
                    .rhs
                    .iter()
                    .map(|item| match item.symbol {
                        Symbol::Terminal(kind) => Sym::T(index[&kind]),
                        Symbol::NonTerminal(id) => Sym::N(id.0),
                    })
                    .collect(),
            })
            .collect();
        // S' → start, with S' numbered after every declared nonterminal
        let augmented = prods.len() as u32;
        prods.push(Prod {
            lhs: nonterminal_count as u16,
            rhs: vec![Sym::N(grammar.start().0)],
        });

        let mut by_lhs = vec![Vec::new(); nonterminal_count + 1];
        for (id, prod) in prods.iter().enumerate() {
            by_lhs[prod.lhs as usize].push(id as u32);
        }

        let mut builder = Builder {
            grammar,
            prods,
            by_lhs,
            nullable: vec![false; nonterminal_count + 1],
            first: vec![TerminalSet::with_capacity(terminals.len()); nonterminal_count + 1],
            terminals,
            augmented,
        };
        builder.compute_first_sets();
        builder
    }

    fn compute_first_sets(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for id in 0..self.prods.len() {
                let (first, nullable) = self.first_of(&self.prods[id].rhs);
                let lhs = self.prods[id].lhs as usize;
                changed |= self.first[lhs].union_with(&first);
                if nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is nullable
    fn first_of(&self, symbols: &[Sym]) -> (TerminalSet, bool) {
        let mut set = TerminalSet::with_capacity(self.terminals.len());
        for symbol in symbols {
            match *symbol {
                Sym::T(t) => {
                    set.insert(t);
                    return (set, false);
                }
                Sym::N(n) => {
                    set.union_with(&self.first[n as usize]);
                    if !self.nullable[n as usize] {
                        return (set, false);
                    }
                }
            }
        }
        (set, true)
    }

    fn next_symbol(&self, item: Item) -> Option<Sym> {
        self.prods[item.production as usize].rhs.get(item.dot as usize).copied()
    }

    /// LR(1) closure of a kernel, lookaheads propagated to fixpoint
    fn closure(&self, kernel: &[Item], lookaheads: &[TerminalSet]) -> Vec<(Item, TerminalSet)> {
        let mut items: Vec<(Item, TerminalSet)> = kernel.iter().copied().zip(lookaheads.iter().cloned()).collect();
        let mut index: FxHashMap<Item, usize> = kernel.iter().enumerate().map(|(i, item)| (*item, i)).collect();
        let mut work: Vec<usize> = (0..items.len()).collect();

        while let Some(current) = work.pop() {
            let (item, lookahead) = items[current].clone();
            let Some(Sym::N(nonterminal)) = self.next_symbol(item) else {
                continue;
            };
            let rest = &self.prods[item.production as usize].rhs[item.dot as usize + 1..];
            let (mut follow, rest_nullable) = self.first_of(rest);
            if rest_nullable {
                follow.union_with(&lookahead);
            }
            for &production in &self.by_lhs[nonterminal as usize] {
                let start = Item { production, dot: 0 };
                match index.get(&start) {
                    Some(&existing) => {
                        if items[existing].1.union_with(&follow) {
                            work.push(existing);
                        }
                    }
                    None => {
                        index.insert(start, items.len());
                        work.push(items.len());
                        items.push((start, follow.clone()));
                    }
                }
            }
        }
        items
    }

    fn states(&self) -> Vec<State> {
        let mut eof = TerminalSet::with_capacity(self.terminals.len());
        eof.insert(0);
        let mut states = vec![State {
            kernel: vec![Item {
                production: self.augmented,
                dot: 0,
            }],
            lookaheads: vec![eof],
            transitions: Vec::new(),
        }];
        let mut by_core: FxHashMap<Vec<Item>, StateId> = FxHashMap::default();
        by_core.insert(states[0].kernel.clone(), 0);
        let mut queue: VecDeque<StateId> = VecDeque::from([0]);
        let mut queued = vec![true];

        while let Some(state) = queue.pop_front() {
            queued[state as usize] = false;
            let closure = self.closure(&states[state as usize].kernel, &states[state as usize].lookaheads);

            let mut successors: IndexMap<Sym, Vec<(Item, TerminalSet)>> = IndexMap::new();
            for (item, lookahead) in closure {
                if let Some(symbol) = self.next_symbol(item) {
                    let advanced = Item {
                        production: item.production,
                        dot: item.dot + 1,
                    };
                    successors.entry(symbol).or_default().push((advanced, lookahead));
                }
            }

            let mut transitions = Vec::with_capacity(successors.len());
            for (symbol, mut kernel) in successors {
                kernel.sort_by_key(|(item, _)| *item);
                let (core, lookaheads): (Vec<Item>, Vec<TerminalSet>) = kernel.into_iter().unzip();
                let target = match by_core.get(&core) {
                    Some(&existing) => {
                        let mut changed = false;
                        for (mine, theirs) in states[existing as usize].lookaheads.iter_mut().zip(&lookaheads) {
                            changed |= mine.union_with(theirs);
                        }
                        if changed && !queued[existing as usize] {
                            queued[existing as usize] = true;
                            queue.push_back(existing);
                        }
                        existing
                    }
                    None => {
                        let id = states.len() as StateId;
                        by_core.insert(core.clone(), id);
                        states.push(State {
                            kernel: core,
                            lookaheads,
                            transitions: Vec::new(),
                        });
                        queued.push(true);
                        queue.push_back(id);
                        id
                    }
                };
                transitions.push((symbol, target));
            }
            states[state as usize].transitions = transitions;
        }
        states
    }

    fn production_level(&self, production: ProductionId) -> Option<(u16, Assoc)> {
        let declared = &self.grammar.productions()[production as usize];
        self.grammar
            .production_precedence(declared)
            .map(|prec| (prec.level, prec.assoc))
    }

    fn terminal_level(&self, terminal: u16) -> Option<(u16, Assoc)> {
        self.grammar
            .terminal_precedence(self.terminals[terminal as usize])
            .map(|prec| (prec.level, prec.assoc))
    }

    /// Settle one table cell. Unresolved conflicts are pushed to `conflicts`.
    fn resolve(
        &self,
        state: StateId,
        terminal: u16,
        shift: Option<StateId>,
        reduces: &[ProductionId],
        conflicts: &mut Vec<Conflict>,
    ) -> Action {
        let lookahead = self.terminals[terminal as usize];
        let reduce = match reduces {
            [] => None,
            [only] => Some(*only),
            _ => {
                // Declared precedence wins; undeclared counts as lowest
                let level = |p: &ProductionId| self.production_level(*p).map_or(0, |(level, _)| level);
                let best = reduces.iter().map(level).max().unwrap_or(0);
                let winners: Vec<ProductionId> = reduces.iter().copied().filter(|p| level(p) == best).collect();
                let chosen = winners.iter().copied().min().unwrap_or(reduces[0]);
                if best == 0 || winners.len() > 1 {
                    warn!(
                        state,
                        lookahead = lookahead.name(),
                        productions = ?reduces,
                        "unresolved reduce/reduce conflict"
                    );
                    conflicts.push(Conflict {
                        state,
                        lookahead,
                        kind: ConflictKind::ReduceReduce,
                        candidates: reduces.iter().map(|p| Action::Reduce(*p)).collect(),
                        chosen: Action::Reduce(chosen),
                    });
                }
                Some(chosen)
            }
        };

        match (shift, reduce) {
            (None, None) => Action::Error,
            (Some(target), None) => Action::Shift(target),
            (None, Some(production)) => Action::Reduce(production),
            (Some(target), Some(production)) => {
                match (self.production_level(production), self.terminal_level(terminal)) {
                    (Some((rule, assoc)), Some((token, _))) => {
                        if rule > token {
                            Action::Reduce(production)
                        } else if rule < token {
                            Action::Shift(target)
                        } else {
                            match assoc {
                                Assoc::Left => Action::Reduce(production),
                                Assoc::Right => Action::Shift(target),
                                Assoc::NonAssoc => Action::Error,
                            }
                        }
                    }
                    _ => {
                        warn!(
                            state,
                            lookahead = lookahead.name(),
                            production,
                            "unresolved shift/reduce conflict, shifting"
                        );
                        conflicts.push(Conflict {
                            state,
                            lookahead,
                            kind: ConflictKind::ShiftReduce,
                            candidates: vec![Action::Shift(target), Action::Reduce(production)],
                            chosen: Action::Shift(target),
                        });
                        Action::Shift(target)
                    }
                }
            }
        }
    }

    fn into_table(self, states: Vec<State>) -> ParseTable {
        let terminal_count = self.terminals.len();
        let nonterminal_count = self.grammar.nonterminals().len();
        let mut actions = vec![Action::Error; states.len() * terminal_count];
        let mut gotos = vec![NO_STATE; states.len() * nonterminal_count];
        let mut conflicts = Vec::new();

        for (id, state) in states.iter().enumerate() {
            let id = id as StateId;
            let mut shifts: Vec<Option<StateId>> = vec![None; terminal_count];
            for &(symbol, target) in &state.transitions {
                match symbol {
                    Sym::T(t) => shifts[t as usize] = Some(target),
                    Sym::N(n) => gotos[id as usize * nonterminal_count + n as usize] = target,
                }
            }

            let mut reduces: Vec<Vec<ProductionId>> = vec![Vec::new(); terminal_count];
            let mut accept = false;
            for (item, lookahead) in self.closure(&state.kernel, &state.lookaheads) {
                if self.next_symbol(item).is_some() {
                    continue;
                }
                if item.production == self.augmented {
                    accept = true;
                    continue;
                }
                for t in lookahead.iter() {
                    reduces[t as usize].push(item.production);
                }
            }

            for t in 0..terminal_count {
                let cell = &mut actions[id as usize * terminal_count + t];
                *cell = if accept && t == 0 {
                    Action::Accept
                } else {
                    reduces[t].sort_unstable();
                    self.resolve(id, t as u16, shifts[t], &reduces[t], &mut conflicts)
                };
            }
        }

        let field_names = self.grammar.field_names();
        let productions = self
            .grammar
            .productions()
            .iter()
            .map(|p| ProductionInfo {
                lhs: p.lhs.0,
                len: p.rhs.len() as u16,
                kind: p.kind,
                fields: p
                    .rhs
                    .iter()
                    .enumerate()
                    .filter_map(|(position, item)| {
                        let name = item.field.as_ref()?;
                        let id = field_names.iter().position(|n| n == name)?;
                        Some((position as u16, FieldId(id as u16)))
                    })
                    .collect(),
            })
            .collect();
        let nonterminals: Vec<SmolStr> = self.grammar.nonterminals().iter().map(|nt| nt.name.clone()).collect();

        debug!(
            grammar = self.grammar.name(),
            states = states.len(),
            terminals = terminal_count,
            nonterminals = nonterminal_count,
            conflicts = conflicts.len(),
            "built LALR(1) table"
        );

        ParseTable::from_parts(
            SmolStr::new(self.grammar.name()),
            self.terminals,
            nonterminals,
            self.grammar.start().0,
            field_names,
            productions,
            states.len() as u32,
            actions,
            gotos,
            conflicts,
        )
    }
}
