//! Tree shapes for the Thorn grammar

#![allow(clippy::unwrap_used)]

use rstest::rstest;
use thorn_syntax::parse;

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::{assert_lossless, assert_spans_nest};

#[rstest]
#[case::assignment(
    "x = y + 1;",
    "(source_file (expression_statement (assignment_expression left: (identifier) right: (binary_expression left: (identifier) right: (literal (number))))))"
)]
#[case::precedence(
    "a + b * c;",
    "(source_file (expression_statement (binary_expression left: (identifier) right: (binary_expression left: (identifier) right: (identifier)))))"
)]
#[case::left_associative(
    "a - b - c;",
    "(source_file (expression_statement (binary_expression left: (binary_expression left: (identifier) right: (identifier)) right: (identifier))))"
)]
#[case::right_associative(
    "a ** b ** c;",
    "(source_file (expression_statement (binary_expression left: (identifier) right: (binary_expression left: (identifier) right: (identifier)))))"
)]
#[case::unary_binds_looser_than_postfix(
    "-a.b(1);",
    "(source_file (expression_statement (unary_expression argument: (call_expression function: (member_expression object: (identifier) property: (identifier)) arguments: (argument_list (literal (number)))))))"
)]
#[case::if_else(
    "if (a) b; else { c }",
    "(source_file (if_statement condition: (identifier) consequence: (expression_statement (identifier)) alternative: (block (expression_statement (identifier)))))"
)]
#[case::function(
    "$ add(a: number, b) : number { return a + b }",
    "(source_file (function_declaration name: (identifier) parameters: (parameter_list (parameter name: (identifier) type: (type_annotation (type))) (parameter name: (identifier))) return_type: (type_annotation (type)) body: (block (return_statement value: (binary_expression left: (identifier) right: (identifier))))))"
)]
#[case::interpolated_string(
    "let s = \"hi ${name}!\";",
    "(source_file (let_declaration name: (identifier) value: (string (string_content) (interpolation expression: (identifier)) (string_content))))"
)]
#[case::for_in(
    "for (x in xs) print(x);",
    "(source_file (for_in_statement left: (identifier) right: (identifier) body: (expression_statement (call_expression function: (identifier) arguments: (argument_list (identifier))))))"
)]
#[case::empty_block("{}", "(source_file (block))")]
#[case::dictionary_statement(
    "{\"a\": 1};",
    "(source_file (expression_statement (dictionary (dictionary_entry key: (string (string_content)) value: (literal (number))))))"
)]
#[case::match_arms(
    "x = match (v) { 1 => \"one\", _ => \"many\", };",
    "(source_file (expression_statement (assignment_expression left: (identifier) right: (match_expression value: (identifier) (match_arm pattern: (literal (number)) value: (string (string_content))) (match_arm value: (string (string_content)))))))"
)]
#[case::import_clause(
    "import { a, b } from \"m\";",
    "(source_file (import_statement clause: (import_clause (identifier) (identifier)) source: (string (string_content))))"
)]
#[case::array_type(
    "@immut k: Array[string] = [];",
    "(source_file (immut_declaration name: (identifier) type: (type_annotation (type element: (type))) value: (list_expression)))"
)]
#[case::export_function(
    "export $ f() {}",
    "(source_file (export_statement declaration: (function_declaration name: (identifier) parameters: (parameter_list) body: (block))))"
)]
#[case::try_catch(
    "try { risky() } catch (e) { log(e) }",
    "(source_file (try_statement body: (block (expression_statement (call_expression function: (identifier) arguments: (argument_list)))) handler: (catch_clause parameter: (identifier) body: (block (expression_statement (call_expression function: (identifier) arguments: (argument_list (identifier))))))))"
)]
#[case::lambda(
    "f = $(x) => x * 2;",
    "(source_file (expression_statement (assignment_expression left: (identifier) right: (lambda_expression parameters: (parameter_list (parameter name: (identifier))) body: (binary_expression left: (identifier) right: (literal (number)))))))"
)]
#[case::class(
    "class A { $ m() { return 1 } }",
    "(source_file (class_declaration name: (identifier) body: (class_body (function_declaration name: (identifier) parameters: (parameter_list) body: (block (return_statement value: (literal (number))))))))"
)]
#[case::comment_is_named("let a; // done", "(source_file (let_declaration name: (identifier)) (comment))")]
fn test_sexp(#[case] source: &str, #[case] expected: &str) {
    let tree = parse(source);
    assert!(!tree.has_error(), "{source:?}: {:?}", tree.errors());
    assert_eq!(tree.to_sexp(), expected);
}

#[rstest]
#[case::statements(STATEMENTS)]
#[case::functions(FUNCTIONS)]
#[case::control_flow(CONTROL_FLOW)]
#[case::classes(CLASSES)]
#[case::data(DATA)]
fn test_fixtures_parse_cleanly(#[case] source: &str) {
    let tree = parse(source);
    assert!(!tree.has_error(), "{:?}", tree.errors());
    assert_lossless(&tree, source);
    assert_spans_nest(&tree);
}

#[test]
fn test_let_without_semicolon() {
    let tree = parse(LET_DECLARATION);
    let root = tree.root_node();
    assert_eq!(root.child_count(), 1);
    let decl = root.child(0).unwrap();
    assert_eq!(decl.kind_name(), "let_declaration");
    assert_eq!(decl.byte_range(), 0..9);
    let named: Vec<_> = decl.named_children().map(|n| (n.kind_name(), n.text())).collect();
    assert_eq!(named, vec![("identifier", "x"), ("literal", "1")]);
}

#[test]
fn test_leading_trivia_is_hoisted() {
    let source = "  // lead\n  let a = 1;";
    let tree = parse(source);
    let decl = tree.root_node().named_children().find(|n| n.kind_name() == "let_declaration").unwrap();
    assert_eq!(decl.start_byte(), 12);
    assert_eq!(decl.text(), "let a = 1;");
    assert_eq!(tree.root_node().byte_range(), 0..source.len());
}

#[test]
fn test_dangling_else_binds_inner() {
    let tree = parse("if (a) if (b) x; else y;");
    assert!(!tree.has_error());
    let outer = tree.root_node().child(0).unwrap();
    assert!(outer.child_by_field_name("alternative").is_none());
    let inner = outer.child_by_field_name("consequence").unwrap();
    assert_eq!(inner.kind_name(), "if_statement");
    assert_eq!(inner.child_by_field_name("alternative").unwrap().text(), "y;");
}
