//! JSON projection of a tree
//!
//! A plain object model for hosts that do not want to walk the tree through
//! [`Node`]: one object per node with kind, field, span and points, leaves
//! carrying their text. Whitespace is left out like everywhere else.

use serde::Serialize;

use super::{Node, Tree};
use crate::base::Point;

#[derive(Debug, Serialize)]
struct JsonNode<'a> {
    kind: &'a str,
    named: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    error: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    missing: bool,
    start_byte: usize,
    end_byte: usize,
    start: [usize; 2],
    end: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'a>>,
}

fn point(point: Point) -> [usize; 2] {
    [point.row, point.column]
}

fn project<'a>(node: &Node<'a>, field: Option<&'a str>) -> JsonNode<'a> {
    let children: Vec<JsonNode<'a>> = node
        .children()
        .enumerate()
        .map(|(index, child)| project(&child, node.field_name_for_child(index)))
        .collect();
    JsonNode {
        kind: node.kind_name(),
        named: node.is_named(),
        field,
        error: node.is_error(),
        missing: node.is_missing(),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start: point(node.start_position()),
        end: point(node.end_position()),
        text: node.is_token().then(|| node.text()),
        children,
    }
}

pub fn to_value(tree: &Tree) -> serde_json::Value {
    serde_json::json!({
        "language": tree.language().name(),
        "version": tree.version(),
        "has_error": tree.has_error(),
        "root": project(&tree.root_node(), None),
    })
}

pub fn to_json(tree: &Tree) -> String {
    to_value(tree).to_string()
}
