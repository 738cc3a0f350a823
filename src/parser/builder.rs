//! Tree builder
//!
//! The LR stack holds one [`Entry`] per grammar symbol. An entry keeps the
//! extras (trivia, unknown characters, recovered error nodes) seen before
//! the symbol separately from the symbol's own elements, so that a node
//! built on reduce can start at its first real token: the first child's
//! leading extras are hoisted to the new entry, later children's extras
//! stay inside the node.
//!
//! Green nodes and tokens go through a [`NodeCache`], so identical tokens and
//! small identical subtrees are shared across every tree a parser builds.

use rowan::{GreenNode, GreenNodeData, GreenToken, GreenTokenData, NodeOrToken};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use text_size::TextSize;

use super::syntax_kind::SyntaxKind;
use crate::table::{FieldId, ProductionId, StateId};

pub(crate) type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Nodes with more children than this are not interned
const MAX_CACHED_CHILDREN: usize = 3;

/// Cache size below which [`NodeCache::collect`] never sweeps
const MIN_SWEEP: usize = 512;

pub(crate) fn element_kind(element: &GreenElement) -> SyntaxKind {
    match element {
        NodeOrToken::Node(node) => node.kind().into(),
        NodeOrToken::Token(token) => token.kind().into(),
    }
}

pub(crate) fn element_len(element: &GreenElement) -> TextSize {
    match element {
        NodeOrToken::Node(node) => node.text_len(),
        NodeOrToken::Token(token) => token.text_len(),
    }
}

fn element_addr(element: &GreenElement) -> usize {
    match element {
        NodeOrToken::Node(node) => node_addr(node),
        NodeOrToken::Token(token) => token_addr(token),
    }
}

fn token_addr(token: &GreenTokenData) -> usize {
    token as *const GreenTokenData as usize
}

/// Identity of a green node: the address of its shared data
pub(crate) fn node_addr(node: &GreenNodeData) -> usize {
    node as *const GreenNodeData as usize
}

/// Interning table for green tokens and small green nodes.
///
/// Entries outlive the trees that used them, so [`NodeCache::collect`] is run
/// after every parse: once the cache has grown to twice what survived the
/// previous sweep, everything the newest tree no longer holds is dropped.
#[derive(Debug, Default)]
pub(crate) struct NodeCache {
    tokens: FxHashMap<(SyntaxKind, SmolStr), GreenToken>,
    nodes: FxHashMap<(SyntaxKind, Vec<usize>), GreenNode>,
    /// Entries kept by the last sweep
    survivors: usize,
}

impl NodeCache {
    pub(crate) fn token(&mut self, kind: SyntaxKind, text: &str) -> GreenToken {
        self.tokens
            .entry((kind, SmolStr::new(text)))
            .or_insert_with(|| GreenToken::new(kind.into(), text))
            .clone()
    }

    pub(crate) fn node(&mut self, kind: SyntaxKind, children: Vec<GreenElement>) -> GreenNode {
        if children.len() > MAX_CACHED_CHILDREN {
            return GreenNode::new(kind.into(), children);
        }
        // Children are interned too, so their addresses identify them; the
        // cached node keeps them alive for as long as the key exists.
        let key = (kind, children.iter().map(element_addr).collect());
        self.nodes
            .entry(key)
            .or_insert_with(|| GreenNode::new(kind.into(), children))
            .clone()
    }

    /// Zero-width placeholder for a token recovery inserted
    pub(crate) fn missing(&mut self, kind: SyntaxKind) -> GreenNode {
        let token = self.token(kind, "");
        self.node(SyntaxKind::ERROR, vec![NodeOrToken::Token(token)])
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len() + self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.tokens.clear();
        self.nodes.clear();
        self.survivors = 0;
    }

    /// Sweep entries `root` does not reach, if the cache has outgrown the
    /// last sweep. Returns the number of entries dropped.
    pub(crate) fn collect(&mut self, root: &GreenNodeData) -> usize {
        let before = self.len();
        if before <= (self.survivors * 2).max(MIN_SWEEP) {
            return 0;
        }
        let live = reachable(root);
        self.tokens.retain(|_, token| live.contains(&token_addr(token)));
        self.nodes.retain(|_, node| live.contains(&node_addr(node)));
        self.survivors = self.len();
        before - self.survivors
    }
}

/// Addresses of every node and token under `root`, `root` included
fn reachable(root: &GreenNodeData) -> FxHashSet<usize> {
    let mut live = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        live.insert(node_addr(node));
        for child in node.children() {
            match child {
                NodeOrToken::Node(node) => stack.push(node),
                NodeOrToken::Token(token) => {
                    live.insert(token_addr(token));
                }
            }
        }
    }
    live
}

/// One grammar symbol on the parse stack
#[derive(Debug, Clone, Default)]
pub(crate) struct Entry {
    /// Extras preceding the symbol, hoisted out of any node it becomes part of
    pub leading: Vec<GreenElement>,
    pub leading_error: bool,
    /// The symbol itself: one node, one token, or a hidden symbol's children
    pub elements: Vec<GreenElement>,
    /// Fields inherited from hidden symbols, as (field, index into elements)
    pub fields: Vec<(FieldId, u32)>,
    pub first_token: Option<u32>,
    pub last_token: Option<u32>,
    /// Significant tokens in `elements`
    pub token_count: u32,
    pub has_error: bool,
    /// Built while recovery drove the automaton with an inserted token, or
    /// reduced after a recovery that ran past its last token
    pub tainted: bool,
}

impl Entry {
    pub(crate) fn token(leading: Vec<GreenElement>, leading_error: bool, token: GreenToken, index: u32) -> Self {
        Entry {
            leading,
            leading_error,
            elements: vec![NodeOrToken::Token(token)],
            first_token: Some(index),
            last_token: Some(index),
            token_count: 1,
            ..Entry::default()
        }
    }
}

/// A node built during a parse, kept with the tree for reuse and field lookup
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    /// Token index of the node's first token
    pub first_token: u32,
    /// Token index one past the node's last token
    pub end_token: u32,
    /// Token index of the lookahead the node was reduced with
    pub lookahead: u32,
    /// LR state below the node when it was started
    pub pre_state: StateId,
    /// Nonterminal the node was reduced to
    pub symbol: u16,
    pub production: ProductionId,
    pub green: GreenNode,
    /// (field, child index among all of the node's children)
    pub fields: Box<[(FieldId, u32)]>,
    pub token_count: u32,
    pub reusable: bool,
    /// Creation order; descendants precede their ancestors
    pub order: u32,
}
