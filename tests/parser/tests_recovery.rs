//! Error recovery: every input yields a tree, errors stay local

#![allow(clippy::unwrap_used)]

use rstest::rstest;
use thorn_syntax::{ErrorCode, ParseOptions, Parser, parse};

use crate::helpers::tree_assertions::{assert_lossless, assert_spans_nest};

#[rstest]
#[case::doubled_operator("let b = = 2;")]
#[case::dangling_operator("let b = 2 +;")]
#[case::stray_paren("let b = 2 ) ;")]
#[case::missing_equals("let b 2;")]
#[case::unknown_character("let b = #;")]
fn test_error_is_contained(#[case] bad: &str) {
    let source = format!("let a = 1;\n{bad}\nlet c = 3;\n");
    let tree = parse(&source);
    assert!(tree.has_error());
    assert_lossless(&tree, &source);

    let root = tree.root_node();
    let statements: Vec<_> = root.named_children().collect();
    assert_eq!(statements.len(), 3, "{}", tree.to_sexp());
    assert!(statements.iter().all(|s| s.kind_name() == "let_declaration"));
    assert!(!statements[0].has_error());
    assert!(statements[1].has_error());
    assert!(!statements[2].has_error());

    let bad_range = statements[1].byte_range();
    for error in tree.errors() {
        let range = usize::from(error.range.start())..usize::from(error.range.end());
        assert!(
            bad_range.start <= range.start && range.end <= bad_range.end,
            "{error:?} outside {bad_range:?}"
        );
    }
}

#[test]
fn test_missing_semicolon_is_inserted() {
    let tree = parse("let x = 1 let y = 2");
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0201);
    assert_eq!(errors[0].message, "missing ';'");
    assert!(tree.to_sexp().contains("(MISSING \";\")"));
}

#[rstest]
#[case::missing_value("let x = ;", ErrorCode::E0406, "expected expression, found ';'")]
#[case::missing_type("let x: = 1;", ErrorCode::E0305, "expected type, found '='")]
fn test_error_code_from_context(#[case] source: &str, #[case] code: ErrorCode, #[case] message: &str) {
    let tree = parse(source);
    let errors = tree.errors();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].code, code);
    assert_eq!(errors[0].message, message);
    assert_lossless(&tree, source);
}

#[test]
fn test_unknown_character_is_an_error_leaf() {
    let tree = parse("let a = 1; ` let b = 2;");
    assert!(tree.has_error());
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0101);
    let leaf = tree.root_node().children().find(|n| n.is_error()).unwrap();
    assert_eq!(leaf.text(), "`");
    assert!(!leaf.is_missing());
    assert_eq!(tree.root_node().named_children().filter(|n| n.kind_name() == "let_declaration").count(), 2);
}

#[test]
fn test_unterminated_comment_is_reported() {
    let tree = parse("let a = 1; /* never closed");
    assert_eq!(tree.errors().len(), 1);
    assert_eq!(tree.errors()[0].code, ErrorCode::E0103);
    assert!(tree.root_node().child(0).unwrap().kind_name() == "let_declaration");
}

#[test]
fn test_unclosed_brace_at_end_of_input() {
    let source = "$ f(x) { return x";
    let tree = parse(source);
    assert!(tree.has_error());
    assert_lossless(&tree, source);
    let func = tree.root_node().child(0).unwrap();
    assert_eq!(func.kind_name(), "function_declaration");
    assert!(func.has_error());
}

#[rstest]
#[case(")))")]
#[case("let let let")]
#[case("{{{{")]
#[case("\"${")]
#[case("= ; = ; =")]
#[case("$ ( => [ , ] ) @")]
#[case("match (x) { _ => }")]
fn test_garbage_still_yields_a_tree(#[case] source: &str) {
    let tree = parse(source);
    assert!(tree.has_error(), "{source:?} parsed cleanly as {}", tree.to_sexp());
    assert_lossless(&tree, source);
    assert_spans_nest(&tree);
    assert!(!tree.errors().is_empty());
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(64)]
fn test_recovery_budget(#[case] budget: usize) {
    let source = "let a = ) ) ) ) ) ) ) ) 1; let b = 2;";
    let mut parser = Parser::thorn().with_options(ParseOptions::default().with_recovery_budget(budget));
    let tree = parser.parse(source, None).unwrap();
    assert!(tree.has_error());
    assert_lossless(&tree, source);
    let last = tree.root_node().named_children().last().unwrap();
    assert_eq!(last.text(), "let b = 2;");
    assert!(!last.has_error());
}

#[test]
fn test_errors_are_sorted_and_hinted() {
    let tree = parse("let = 1;\nlet y = ;\nlet z = 3 4;");
    let starts: Vec<_> = tree.errors().iter().map(|e| e.range.start()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(tree.errors().iter().any(|e| e.hint.as_deref().is_some_and(|h| h.starts_with("expected"))));
}
