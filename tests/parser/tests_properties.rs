//! Property-based tests: totality, span nesting, incremental equivalence

use proptest::prelude::*;
use thorn_syntax::{InputEdit, Parser, parse};

use crate::helpers::source_fixtures::{EDIT_FRAGMENTS, FRAGMENTS};
use crate::helpers::tree_assertions::{assert_lossless, assert_matches_fresh, assert_spans_nest};

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|parts| parts.concat())
}

fn ascii_document() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(FRAGMENTS).prop_filter("ascii", |f| f.is_ascii()),
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

/// A document plus one edit inside it: start, removed length, replacement
fn edited_document() -> impl Strategy<Value = (String, usize, usize, &'static str)> {
    (ascii_document(), any::<prop::sample::Index>(), 0usize..12, prop::sample::select(EDIT_FRAGMENTS)).prop_map(
        |(source, at, len, replacement)| {
            let start = at.index(source.len() + 1);
            let end = (start + len).min(source.len());
            (source, start, end, replacement)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_any_input_is_total(source in document()) {
        let tree = parse(&source);
        assert_lossless(&tree, &source);
        assert_spans_nest(&tree);
        prop_assert_eq!(tree.root_node().byte_range(), 0..source.len());
    }

    #[test]
    fn test_arbitrary_text_is_total(source in "\\PC{0,64}") {
        let tree = parse(&source);
        assert_lossless(&tree, &source);
    }

    #[test]
    fn test_incremental_equals_fresh((source, start, end, replacement) in edited_document()) {
        let mut parser = Parser::thorn();
        let old = parser.parse(&source, None).unwrap();
        let edit = InputEdit::replace(&source, start..end, replacement);
        let text = format!("{}{}{}", &source[..start], replacement, &source[end..]);
        let new = parser.reparse(&old, &text, &[edit]).unwrap();
        prop_assert_eq!(new.text(), text.as_str());
        assert_matches_fresh(&new);
    }

    #[test]
    fn test_chained_edits_equal_fresh(
        (source, start, end, replacement) in edited_document(),
        second in prop::sample::select(EDIT_FRAGMENTS),
    ) {
        let mut parser = Parser::thorn();
        let old = parser.parse(&source, None).unwrap();
        let text = format!("{}{}{}", &source[..start], replacement, &source[end..]);
        let middle = parser
            .reparse(&old, &text, &[InputEdit::replace(&source, start..end, replacement)])
            .unwrap();
        let next = format!("{second}{text}");
        let new = parser.reparse(&middle, &next, &[InputEdit::insert(&text, 0, second)]).unwrap();
        prop_assert_eq!(new.version(), 2);
        assert_matches_fresh(&new);
    }
}
