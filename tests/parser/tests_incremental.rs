//! Incremental re-parsing: equivalence with fresh parses, subtree reuse

#![allow(clippy::unwrap_used)]

use rstest::rstest;
use thorn_syntax::{Error, InputEdit, ParseOptions, Parser, Point};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_assertions::assert_matches_fresh;

fn splice(source: &str, range: std::ops::Range<usize>, replacement: &str) -> String {
    format!("{}{}{}", &source[..range.start], replacement, &source[range.end..])
}

#[test]
fn test_widen_number_keeps_identity() {
    let mut parser = Parser::thorn();
    let old = parser.parse("let x = 1", None).unwrap();
    let mut edited = old.clone();
    edited.edit(&InputEdit::replace("let x = 1", 8..9, "12")).unwrap();
    let new = parser.parse("let x = 12", Some(&edited)).unwrap();

    assert_matches_fresh(&new);
    assert_eq!(new.version(), old.version() + 1);
    let old_decl = old.root_node().child(0).unwrap();
    let new_decl = new.root_node().child(0).unwrap();
    assert_eq!(new_decl.kind(), old_decl.kind());
    assert_eq!(new_decl.start_byte(), old_decl.start_byte());
    for index in 0..2 {
        let (old_token, new_token) = (old_decl.child(index).unwrap(), new_decl.child(index).unwrap());
        assert_eq!(old_token.text(), new_token.text());
        assert_eq!(old_token.id(), new_token.id());
    }
    let old_value = old_decl.child_by_field_name("value").unwrap();
    let new_value = new_decl.child_by_field_name("value").unwrap();
    assert_eq!(new_value.end_byte() - new_value.start_byte(), old_value.end_byte() - old_value.start_byte() + 1);
}

#[rstest]
#[case::open_dictionary("a;\nx*{\"")]
#[case::stray_paren("a;\nx * )")]
#[case::unclosed_call("a;\nf(x *")]
#[case::skipped_operand("let a = 1;\nlet b = * 2;\nc")]
fn test_edit_before_recovered_statement(#[case] source: &str) {
    let mut parser = Parser::thorn();
    let old = parser.parse(source, None).unwrap();
    assert!(old.has_error());
    let edit = InputEdit::replace(source, 0..1, "b");
    let text = splice(source, 0..1, "b");
    let new = parser.reparse(&old, &text, &[edit]).unwrap();
    assert_matches_fresh(&new);
    assert_eq!(new.errors().len(), thorn_syntax::parse(&text).errors().len());
}

#[test]
fn test_old_tree_is_untouched() {
    let mut parser = Parser::thorn();
    let old = parser.parse(STATEMENTS, None).unwrap();
    let sexp = old.to_sexp();
    let edit = InputEdit::replace(STATEMENTS, 0..3, ")");
    let text = splice(STATEMENTS, 0..3, ")");
    let new = parser.reparse(&old, &text, &[edit]).unwrap();
    assert!(new.has_error());
    assert_eq!(old.to_sexp(), sexp);
    assert_eq!(old.text(), STATEMENTS);
    assert!(old.edits().is_empty());
}

#[rstest]
#[case::insert_statement(FUNCTIONS, 0, 0, "let pre = 0;\n")]
#[case::rename(STATEMENTS, 4, 5, "alpha")]
#[case::break_string(FUNCTIONS, 85, 86, "")]
#[case::open_comment(CONTROL_FLOW, 1, 1, "/*")]
#[case::close_block(CLASSES, 60, 60, "}")]
#[case::delete_everything(DATA, 0, DATA.len(), "")]
#[case::replace_all(STATEMENTS, 0, STATEMENTS.len(), "x;")]
#[case::append(DATA, DATA.len(), DATA.len(), "let tail = 1;")]
#[case::into_interpolation(FUNCTIONS, 98, 98, " + suffix")]
fn test_edit_matches_fresh_parse(
    #[case] source: &str,
    #[case] start: usize,
    #[case] end: usize,
    #[case] replacement: &str,
) {
    let start = start.min(source.len());
    let end = end.clamp(start, source.len());
    let mut parser = Parser::thorn();
    let old = parser.parse(source, None).unwrap();
    let edit = InputEdit::replace(source, start..end, replacement);
    let text = splice(source, start..end, replacement);
    let new = parser.reparse(&old, &text, &[edit]).unwrap();
    assert_eq!(new.text(), text);
    assert_matches_fresh(&new);
}

#[test]
fn test_edit_far_from_start_reuses_subtrees() {
    let mut parser = Parser::thorn();
    let source = format!("{FUNCTIONS}{CONTROL_FLOW}{DATA}");
    let old = parser.parse(&source, None).unwrap();
    let offset = source.len() - 2;
    let edit = InputEdit::insert(&source, offset, " ");
    let text = splice(&source, offset..offset, " ");
    let new = parser.reparse(&old, &text, &[edit]).unwrap();
    assert_matches_fresh(&new);
    let stats = new.stats();
    assert!(stats.reused_nodes > 0, "{stats:?}");
    assert!(stats.relexed_tokens < stats.tokens / 4, "{stats:?}");

    let first_old = old.root_node().child(0).unwrap();
    let first_new = new.root_node().child(0).unwrap();
    assert_eq!(first_old.id(), first_new.id());
}

#[test]
fn test_reuse_can_be_disabled() {
    let mut parser = Parser::thorn().with_options(ParseOptions::default().with_reuse(false));
    let old = parser.parse(STATEMENTS, None).unwrap();
    let edit = InputEdit::replace(STATEMENTS, 8..9, "7");
    let text = splice(STATEMENTS, 8..9, "7");
    let new = parser.reparse(&old, &text, &[edit]).unwrap();
    assert_eq!(new.stats().reused_nodes, 0);
    assert_matches_fresh(&new);
}

#[test]
fn test_multiple_edits_in_order() {
    let mut parser = Parser::thorn();
    let source = "let a = 1;\nlet b = 2;\nlet c = 3;\n";
    let old = parser.parse(source, None).unwrap();
    let first = InputEdit::replace(source, 8..9, "10");
    let step = splice(source, 8..9, "10");
    let second = InputEdit::replace(&step, 31..32, "30");
    let text = splice(&step, 31..32, "30");
    assert_eq!(text, "let a = 10;\nlet b = 2;\nlet c = 30;\n");
    let new = parser.reparse(&old, &text, &[first, second]).unwrap();
    assert_matches_fresh(&new);
    let middle_old = old.root_node().child(1).unwrap();
    let middle_new = new.root_node().child(1).unwrap();
    assert_eq!(middle_new.start_byte(), middle_old.start_byte() + 1);
}

#[test]
fn test_edits_recorded_on_tree() {
    let mut parser = Parser::thorn();
    let source = "let a = 1;";
    let mut tree = parser.parse(source, None).unwrap();
    tree.edit(&InputEdit::insert(source, 0, "let z;")).unwrap();
    tree.edit(&InputEdit {
        start_byte: 6,
        old_end_byte: 6,
        new_end_byte: 7,
        start_position: Point::new(0, 6),
        old_end_position: Point::new(0, 6),
        new_end_position: Point::new(0, 7),
    })
    .unwrap();
    let new = parser.parse("let z; let a = 1;", Some(&tree)).unwrap();
    assert_matches_fresh(&new);
    assert_eq!(new.root_node().named_child_count(), 2);
}

#[test]
fn test_unchanged_text_reparse() {
    let mut parser = Parser::thorn();
    let old = parser.parse(DATA, None).unwrap();
    let new = parser.parse(DATA, Some(&old)).unwrap();
    assert_matches_fresh(&new);
    assert_eq!(old.root_node().child(0).unwrap().id(), new.root_node().child(0).unwrap().id());
}

#[rstest]
#[case::length_mismatch(8..9, "22", "let a = 2;")]
#[case::past_end(8..40, "", "let a = ")]
fn test_invalid_edits(#[case] range: std::ops::Range<usize>, #[case] replacement: &str, #[case] text: &str) {
    let mut parser = Parser::thorn();
    let source = "let a = 1;";
    let old = parser.parse(source, None).unwrap();
    let mut edit = InputEdit::replace(source, 8..9, replacement);
    edit.start_byte = range.start;
    edit.old_end_byte = range.end;
    edit.new_end_byte = range.start + replacement.len();
    let result = parser.reparse(&old, text, &[edit]);
    assert!(matches!(result, Err(Error::InvalidEditRange { .. })), "{result:?}");
}

#[test]
fn test_tree_from_other_language_is_ignored() {
    let mut parser = Parser::thorn();
    let old = parser.parse("let a = 1;", None).unwrap();
    let other = thorn_syntax::Language::from_artifact(&thorn_syntax::thorn::language().to_artifact()).unwrap();
    parser.set_language(other);
    let new = parser.parse("let a = 2;", Some(&old)).unwrap();
    assert_eq!(new.version(), 0);
    assert_matches_fresh(&new);
}
