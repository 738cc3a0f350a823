//! Syntax trees
//!
//! A [`Tree`] owns the text it was parsed from, the immutable green tree,
//! and what the incremental engine needs to re-parse it: the token stream
//! and one record per node built. Cloning a tree is cheap; a clone pins that
//! version of the document for as long as it lives.
//!
//! [`Node`] is a borrowed view into a tree. Children skip whitespace, so
//! child indices count tokens, comments and nodes only.

mod cursor;
mod edit;
#[cfg(feature = "interchange")]
pub mod json;

use std::fmt;
use std::fmt::Write as _;
use std::ops::Range;
use std::sync::Arc;

use rowan::{GreenNode, GreenTokenData, NodeOrToken};

pub use cursor::TreeCursor;
pub use edit::InputEdit;

use crate::base::{LineIndex, Point, TextRange};
use crate::error::{Error, Result};
use crate::language::Language;
use crate::parser::builder::{NodeRecord, node_addr};
use crate::parser::incremental::ChangedRegion;
use crate::parser::lexer::LexedToken;
use crate::parser::{ParseStats, SyntaxElement, SyntaxError, SyntaxKind, SyntaxNode};

pub(crate) struct TreeData {
    pub language: Language,
    pub text: String,
    pub green: GreenNode,
    pub tokens: Vec<LexedToken>,
    /// Sorted by first token, outermost first
    pub records: Vec<NodeRecord>,
    pub errors: Vec<SyntaxError>,
    pub line_index: LineIndex,
    pub version: u64,
    pub stats: ParseStats,
}

/// A parsed document
#[derive(Clone)]
pub struct Tree {
    data: Arc<TreeData>,
    /// Edits recorded since this tree was parsed
    edits: Vec<InputEdit>,
}

impl Tree {
    pub(crate) fn new(data: TreeData) -> Tree {
        Tree {
            data: Arc::new(data),
            edits: Vec::new(),
        }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: self,
            element: NodeOrToken::Node(self.syntax()),
        }
    }

    /// The root as a rowan syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.data.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    /// The text this tree was parsed from, without recorded edits applied
    pub fn text(&self) -> &str {
        &self.data.text
    }

    pub fn language(&self) -> &Language {
        &self.data.language
    }

    /// Diagnostics for every repair made while parsing, in document order
    pub fn errors(&self) -> &[SyntaxError] {
        &self.data.errors
    }

    pub fn has_error(&self) -> bool {
        !self.data.errors.is_empty()
    }

    /// 0 for a fresh parse, one more than the old tree's for a re-parse
    pub fn version(&self) -> u64 {
        self.data.version
    }

    pub fn stats(&self) -> ParseStats {
        self.data.stats
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.data.line_index
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// Record an edit made to the text since this tree was parsed.
    ///
    /// Each edit is expressed in the coordinates left by the edits recorded
    /// before it. Offsets that fall outside text inserted by earlier edits
    /// are traced back to the parsed text and checked for character
    /// boundaries and matching points; offsets inside inserted text are only
    /// checked against the length. On error the tree is left unchanged.
    pub fn edit(&mut self, edit: &InputEdit) -> Result<()> {
        let invalid = |reason: &str| Error::invalid_edit(edit.start_byte, edit.old_end_byte, reason);
        if edit.start_byte > edit.old_end_byte {
            return Err(invalid("start is after the old end"));
        }
        if edit.new_end_byte < edit.start_byte {
            return Err(invalid("new end is before the start"));
        }
        if edit.old_end_byte > self.edited_len() {
            return Err(invalid("old end is past the end of the text"));
        }
        let traced = [
            (edit.start_byte, edit.start_position),
            (edit.old_end_byte, edit.old_end_position),
        ]
        .map(|(byte, position)| (self.trace(byte), position));
        for (found, _) in &traced {
            if let Some((original, _)) = found {
                if !self.text().is_char_boundary(*original) {
                    return Err(invalid("not on a character boundary"));
                }
            }
        }
        for (found, position) in &traced {
            if let Some((_, Some(point))) = found {
                if point != position {
                    return Err(invalid("positions do not match the byte offsets"));
                }
            }
        }
        self.edits.push(*edit);
        Ok(())
    }

    /// Follow `byte`, given after every recorded edit, back to the parsed
    /// text. Returns the offset there and the point `byte` should have now;
    /// `None` when it lies in text an edit inserted.
    fn trace(&self, byte: usize) -> Option<(usize, Option<Point>)> {
        let mut at = byte;
        let mut shifted_by = Vec::with_capacity(self.edits.len());
        for edit in self.edits.iter().rev() {
            if at >= edit.new_end_byte {
                at = at - edit.new_end_byte + edit.old_end_byte;
                shifted_by.push(edit);
            } else if at >= edit.start_byte {
                return None;
            }
        }
        let mut point = Some(self.data.line_index.point(offset(at)));
        // Edits before `at` in the parsed text, replayed in the order recorded
        for edit in shifted_by.into_iter().rev() {
            point = point.and_then(|point| edit.shift_point(point));
        }
        Some((at, point))
    }

    /// Edits recorded since this tree was parsed
    pub fn edits(&self) -> &[InputEdit] {
        &self.edits
    }

    /// Length of the text once the recorded edits are applied
    fn edited_len(&self) -> usize {
        let delta: i64 = self.edits.iter().map(InputEdit::delta).sum();
        (self.data.text.len() as i64 + delta) as usize
    }

    /// The recorded edits as one region, checked against the new text
    pub(crate) fn changed_region(&self, new_text: &str) -> Result<ChangedRegion> {
        let region = match ChangedRegion::fold(&self.edits) {
            Some(region) => region,
            None if new_text == self.text() => ChangedRegion {
                start: new_text.len(),
                old_end: new_text.len(),
                new_end: new_text.len(),
            },
            // Nothing recorded but the text changed: treat it as replaced whole
            None => ChangedRegion {
                start: 0,
                old_end: self.text().len(),
                new_end: new_text.len(),
            },
        };
        if new_text.len() != self.edited_len() && !self.edits.is_empty() {
            return Err(Error::invalid_edit(
                region.start,
                region.old_end,
                format!(
                    "new text is {} bytes, the edited tree expects {}",
                    new_text.len(),
                    self.edited_len()
                ),
            ));
        }
        Ok(region)
    }

    pub(crate) fn tokens(&self) -> &[LexedToken] {
        &self.data.tokens
    }

    pub(crate) fn records(&self) -> &[NodeRecord] {
        &self.data.records
    }

    /// The record a node was built from, if it has one
    fn record_for(&self, node: &SyntaxNode) -> Option<&NodeRecord> {
        let start = node.text_range().start();
        let first = self
            .data
            .tokens
            .binary_search_by_key(&start, |token| token.range.start())
            .ok()? as u32;
        let from = self.data.records.partition_point(|record| record.first_token < first);
        let addr = node_addr(&node.green());
        self.data.records[from..]
            .iter()
            .take_while(|record| record.first_token == first)
            .find(|record| node_addr(&record.green) == addr)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language().name())
            .field("version", &self.version())
            .field("len", &self.text().len())
            .field("errors", &self.errors().len())
            .field("pending_edits", &self.edits.len())
            .finish()
    }
}

fn offset(byte: usize) -> crate::base::TextSize {
    crate::base::TextSize::new(byte as u32)
}

/// A node or token of a [`Tree`]
#[derive(Clone)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    element: SyntaxElement,
}

impl<'tree> Node<'tree> {
    fn wrap(&self, element: SyntaxElement) -> Node<'tree> {
        Node {
            tree: self.tree,
            element,
        }
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub fn syntax(&self) -> &SyntaxElement {
        &self.element
    }

    pub fn kind(&self) -> SyntaxKind {
        self.element.kind()
    }

    pub fn kind_name(&self) -> &'static str {
        self.tree.language().kind_name(self.kind())
    }

    pub fn is_named(&self) -> bool {
        self.kind().is_named()
    }

    pub fn is_token(&self) -> bool {
        self.element.as_token().is_some()
    }

    pub fn is_error(&self) -> bool {
        self.kind() == SyntaxKind::ERROR
    }

    /// A zero-width placeholder for a token recovery inserted
    pub fn is_missing(&self) -> bool {
        self.missing_kind().is_some()
    }

    fn missing_kind(&self) -> Option<SyntaxKind> {
        let node = self.element.as_node().filter(|node| node.kind() == SyntaxKind::ERROR)?;
        let mut children = node.children_with_tokens();
        match (children.next(), children.next()) {
            (Some(NodeOrToken::Token(token)), None) if token.text().is_empty() => Some(token.kind()),
            _ => None,
        }
    }

    /// The node is or contains an error
    pub fn has_error(&self) -> bool {
        match &self.element {
            NodeOrToken::Node(node) => node
                .descendants_with_tokens()
                .any(|element| element.kind() == SyntaxKind::ERROR),
            NodeOrToken::Token(token) => token.kind() == SyntaxKind::ERROR,
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.element.text_range()
    }

    pub fn byte_range(&self) -> Range<usize> {
        let range = self.text_range();
        usize::from(range.start())..usize::from(range.end())
    }

    pub fn start_byte(&self) -> usize {
        usize::from(self.text_range().start())
    }

    pub fn end_byte(&self) -> usize {
        usize::from(self.text_range().end())
    }

    pub fn start_position(&self) -> Point {
        self.tree.line_index().point(self.text_range().start())
    }

    pub fn end_position(&self) -> Point {
        self.tree.line_index().point(self.text_range().end())
    }

    pub fn text(&self) -> &'tree str {
        &self.tree.text()[self.text_range()]
    }

    /// Identity of the shared green element behind this node. Trees built
    /// by the same parser share identical tokens and small subtrees, so
    /// equal ids mean shared storage, not necessarily the same position.
    pub fn id(&self) -> usize {
        match &self.element {
            NodeOrToken::Node(node) => node_addr(&node.green()),
            NodeOrToken::Token(token) => token.green() as *const GreenTokenData as usize,
        }
    }

    /// Children with whitespace left out, each with its raw child index
    fn indexed_children(&self) -> impl Iterator<Item = (usize, SyntaxElement)> + use<'tree> {
        self.element
            .as_node()
            .cloned()
            .into_iter()
            .flat_map(|node| node.children_with_tokens().enumerate())
            .filter(|(_, element)| element.kind() != SyntaxKind::WHITESPACE)
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let tree = self.tree;
        self.indexed_children()
            .map(move |(_, element)| Node { tree, element })
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(Node::is_named)
    }

    pub fn child_count(&self) -> usize {
        self.indexed_children().count()
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.children().nth(index)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.named_children().nth(index)
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        self.children_by_field_name(name).next()
    }

    /// Every child carrying the field, in order
    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let field = self.tree.language().field_id(name);
        let raw: Vec<usize> = match (self.element.as_node(), field) {
            (Some(node), Some(field)) => self
                .tree
                .record_for(node)
                .map(|record| {
                    record
                        .fields
                        .iter()
                        .filter(|(id, _)| *id == field)
                        .map(|&(_, index)| index as usize)
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let tree = self.tree;
        self.indexed_children()
            .filter(move |(index, _)| raw.contains(index))
            .map(move |(_, element)| Node { tree, element })
    }

    /// Field name of the child at `index` (whitespace not counted)
    pub fn field_name_for_child(&self, index: usize) -> Option<&'tree str> {
        let node = self.element.as_node()?;
        let (raw, _) = self.indexed_children().nth(index)?;
        let record = self.tree.record_for(node)?;
        let &(field, _) = record.fields.iter().find(|(_, at)| *at as usize == raw)?;
        let tree: &'tree Tree = self.tree;
        tree.language().field_name(field)
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.element.parent().map(|parent| self.wrap(NodeOrToken::Node(parent)))
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let mut next = self.element.next_sibling_or_token();
        while let Some(element) = next {
            if element.kind() != SyntaxKind::WHITESPACE {
                return Some(self.wrap(element));
            }
            next = element.next_sibling_or_token();
        }
        None
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let mut prev = self.element.prev_sibling_or_token();
        while let Some(element) = prev {
            if element.kind() != SyntaxKind::WHITESPACE {
                return Some(self.wrap(element));
            }
            prev = element.prev_sibling_or_token();
        }
        None
    }

    /// Named descendants as an s-expression, with field labels
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(None, &mut out);
        out
    }

    fn write_sexp(&self, field: Option<&str>, out: &mut String) {
        if let Some(field) = field {
            out.push_str(field);
            out.push_str(": ");
        }
        if let Some(kind) = self.missing_kind() {
            let _ = match kind.is_named() {
                true => write!(out, "(MISSING {})", kind.name()),
                false => write!(out, "(MISSING {:?})", kind.name()),
            };
            return;
        }
        out.push('(');
        out.push_str(if self.is_error() { "ERROR" } else { self.kind_name() });
        for (index, child) in self.children().enumerate() {
            if child.is_named() {
                out.push(' ');
                child.write_sexp(self.field_name_for_child(index), out);
            }
        }
        out.push(')');
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.element == other.element
    }
}

impl Eq for Node<'_> {}

impl std::hash::Hash for Node<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.element.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind_name(), self.text_range())
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
