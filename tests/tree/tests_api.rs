//! Tree, Node and TreeCursor accessors

#![allow(clippy::unwrap_used)]

use rstest::rstest;
use thorn_syntax::{Point, SyntaxKind, parse};

use crate::helpers::source_fixtures::*;

#[test]
fn test_root_covers_text() {
    let tree = &*FUNCTIONS_TREE;
    let root = tree.root_node();
    assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
    assert_eq!(root.byte_range(), 0..FUNCTIONS.len());
    assert_eq!(root.text(), FUNCTIONS);
    assert!(root.parent().is_none());
    assert_eq!(tree.language().name(), "thorn");
    assert_eq!(tree.version(), 0);
}

#[rstest]
#[case("name", "greet")]
#[case("parameters", "(name)")]
fn test_function_fields(#[case] field: &str, #[case] text: &str) {
    let tree = &*FUNCTIONS_TREE;
    let greet = tree.root_node().named_child(1).unwrap();
    assert_eq!(greet.kind_name(), "function_declaration");
    assert_eq!(greet.child_by_field_name(field).unwrap().text(), text);
}

#[test]
fn test_repeated_children_without_field() {
    let tree = parse("import { a, b, c } from \"m\";");
    let clause = tree.root_node().child(0).unwrap().child_by_field_name("clause").unwrap();
    let names: Vec<_> = clause.named_children().map(|n| n.text()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(clause.child_count(), 7);
    assert_eq!(clause.named_child_count(), 3);
}

#[test]
fn test_points_count_bytes() {
    let source = "let é = 1;\nlet b = \"ü\";";
    let tree = parse(source);
    let first = tree.root_node().child(0).unwrap();
    let value = first.child_by_field_name("value").unwrap();
    assert_eq!(value.start_position(), Point::new(0, 9));
    let second = tree.root_node().child(1).unwrap();
    assert_eq!(second.start_position(), Point::new(1, 0));
    assert_eq!(second.end_position(), Point::new(1, 13));
    assert_eq!(tree.line_index().point(second.text_range().end()), second.end_position());
}

#[test]
fn test_siblings_skip_whitespace() {
    let tree = parse("let  a   =   1 ;");
    let decl = tree.root_node().child(0).unwrap();
    let texts: Vec<_> = decl.children().map(|n| n.text()).collect();
    assert_eq!(texts, vec!["let", "a", "=", "1", ";"]);
    let equals = decl.child(2).unwrap();
    assert_eq!(equals.prev_sibling().unwrap().text(), "a");
    assert_eq!(equals.next_sibling().unwrap().text(), "1");
    assert!(!equals.is_named());
}

#[test]
fn test_cursor_visits_nodes_in_order() {
    let tree = parse(STATEMENTS);
    let kinds: Vec<_> = tree
        .walk()
        .preorder()
        .filter(|n| !n.is_token())
        .map(|n| n.kind_name())
        .take(6)
        .collect();
    assert_eq!(
        kinds,
        vec!["source_file", "let_declaration", "literal", "let_declaration", "binary_expression", "literal"]
    );
    let mut previous = 0;
    for node in tree.walk().preorder() {
        assert!(node.start_byte() >= previous);
        previous = node.start_byte();
    }
}

#[test]
fn test_cursor_field_names() {
    let tree = parse("while (go) step();");
    let mut cursor = tree.walk();
    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());
    let mut fields = Vec::new();
    loop {
        fields.push((cursor.node().text().to_string(), cursor.field_name()));
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    assert_eq!(
        fields,
        vec![
            ("while".to_string(), None),
            ("(".to_string(), None),
            ("go".to_string(), Some("condition")),
            (")".to_string(), None),
            ("step();".to_string(), Some("body")),
        ]
    );
}

#[test]
fn test_error_nodes_in_sexp() {
    let tree = parse("let = 1;");
    let sexp = tree.to_sexp();
    assert!(sexp.contains("MISSING") || sexp.contains("ERROR"), "{sexp}");
    assert!(tree.root_node().has_error());
}

#[test]
fn test_clone_pins_version() {
    let tree = parse(DATA);
    let pinned = tree.clone();
    assert_eq!(pinned.text(), tree.text());
    assert_eq!(pinned.root_node().id(), tree.root_node().id());
}

#[cfg(feature = "interchange")]
#[test]
fn test_json_projection() {
    let tree = parse("let x = 1;");
    let json = thorn_syntax::tree::json::to_json(&tree);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["root"]["kind"], "source_file");
    assert_eq!(value["root"]["children"][0]["children"][3]["field"], "value");
}
