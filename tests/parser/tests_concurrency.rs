//! Parsing on several threads with one shared table

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;

use thorn_syntax::{Parser, Tree, parse_batch, thorn};
use tokio_util::sync::CancellationToken;

use crate::helpers::source_fixtures::*;

#[test]
fn test_two_buffers_on_two_threads() {
    let sources = [CONTROL_FLOW, DATA];
    let trees: Vec<Tree> = thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || Parser::thorn().parse(source, None).unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    for (source, tree) in sources.iter().zip(&trees) {
        assert_eq!(tree.text(), *source);
        assert!(!tree.has_error(), "{:?}", tree.errors());
        assert_eq!(tree.to_sexp(), thorn_syntax::parse(source).to_sexp());
        assert!(Arc::ptr_eq(tree.language().table(), thorn::language().table()));
    }
}

#[test]
fn test_trees_move_between_threads() {
    let tree = thorn_syntax::parse(STATEMENTS);
    let sexp = thread::spawn(move || tree.to_sexp()).join().unwrap();
    assert!(sexp.starts_with("(source_file (let_declaration"));
}

#[test]
fn test_batch_preserves_order() {
    let sources = [STATEMENTS, FUNCTIONS, CONTROL_FLOW, CLASSES, DATA, "let broken = ;"];
    let trees = parse_batch(thorn::language(), &sources);
    for (source, tree) in sources.iter().zip(trees) {
        assert_eq!(tree.unwrap().text(), *source);
    }
}

#[test]
fn test_cancellation_from_another_thread() {
    let token = CancellationToken::new();
    let mut parser = Parser::thorn();
    parser.set_cancellation_token(Some(token.clone()));
    thread::spawn(move || token.cancel()).join().unwrap();
    let result = parser.parse(FUNCTIONS, None);
    assert_eq!(result.unwrap_err(), thorn_syntax::Error::Cancelled);
}
