//! Structural checks that need no type information: the syntax errors
//! tree-sitter recovered from. Used when `tsc` is not available.

use tree_sitter::{Node, Tree};

use crate::diagnostics::Diagnostic;

/// Longest piece of offending source quoted in a message.
const SNIPPET_CHARS: usize = 24;

/// Diagnostics for every `ERROR` and `MISSING` node, sorted by position.
pub fn check(tree: &Tree, source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if !tree.root_node().has_error() {
        return diagnostics;
    }

    let mut cursor = tree.walk();
    'walk: loop {
        let node = cursor.node();
        if node.is_missing() {
            diagnostics.push(at(node, source, format!("'{}' expected.", node.kind())));
        } else if node.is_error() {
            diagnostics.push(at(node, source, unexpected(node, source)));
        } else if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    diagnostics.sort_by_key(|d| (d.line, d.column.unwrap_or(0)));
    diagnostics.dedup_by(|a, b| a.line == b.line && a.column == b.column);
    diagnostics
}

fn at(node: Node, source: &str, message: String) -> Diagnostic {
    let position = node.start_position();
    let start = node.start_byte();
    let line_start = start.saturating_sub(position.column);
    let column = source
        .get(line_start..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(position.column);
    Diagnostic::error(position.row, message).with_column(column)
}

/// Message quoting the first token error recovery skipped.
fn unexpected(node: Node, source: &str) -> String {
    let mut cursor = node.walk();
    while cursor.goto_first_child() {}
    let first = cursor.node();

    let snippet: String = source
        .get(first.start_byte()..first.end_byte())
        .and_then(|text| text.lines().next())
        .map(|line| line.trim().chars().take(SNIPPET_CHARS).collect())
        .unwrap_or_default();

    if snippet.is_empty() {
        String::from("Syntax error.")
    } else {
        format!("Unexpected '{snippet}'.")
    }
}
