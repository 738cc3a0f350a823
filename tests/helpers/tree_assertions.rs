//! Assertions over whole trees

use std::ops::Range;

use thorn_syntax::{SyntaxKind, Tree};

/// Every element of the tree in document order: kind and byte span
pub fn shape(tree: &Tree) -> Vec<(SyntaxKind, Range<usize>)> {
    tree.syntax()
        .descendants_with_tokens()
        .map(|element| {
            let range = element.text_range();
            (element.kind(), usize::from(range.start())..usize::from(range.end()))
        })
        .collect()
}

/// Leaf spans and texts in document order
pub fn leaves(tree: &Tree) -> Vec<(Range<usize>, String)> {
    tree.syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .map(|token| {
            let range = token.text_range();
            (usize::from(range.start())..usize::from(range.end()), token.text().to_string())
        })
        .collect()
}

/// Leaves concatenate to the input and tile it without gaps or overlaps
pub fn assert_lossless(tree: &Tree, source: &str) {
    let mut cursor = 0;
    let mut text = String::new();
    for (range, leaf) in leaves(tree) {
        assert_eq!(range.start, cursor, "gap or overlap before {leaf:?} in {source:?}");
        assert_eq!(&source[range.clone()], leaf);
        cursor = range.end;
        text.push_str(&leaf);
    }
    assert_eq!(cursor, source.len());
    assert_eq!(text, source);
}

/// Parent spans cover their children; siblings never go backwards
pub fn assert_spans_nest(tree: &Tree) {
    for node in tree.syntax().descendants() {
        let range = node.text_range();
        let mut previous_end = range.start();
        for child in node.children_with_tokens() {
            let child_range = child.text_range();
            assert!(child_range.start() >= previous_end, "{child:?} starts before its sibling ends");
            assert!(range.contains_range(child_range), "{child:?} escapes {node:?}");
            previous_end = child_range.end();
        }
    }
}

/// The tree equals a fresh parse of its own text
pub fn assert_matches_fresh(tree: &Tree) {
    let fresh = thorn_syntax::parse(tree.text());
    assert_eq!(shape(tree), shape(&fresh), "incremental tree differs for {:?}", tree.text());
    assert_eq!(tree.to_sexp(), fresh.to_sexp());
    assert_eq!(tree.has_error(), fresh.has_error());
}
