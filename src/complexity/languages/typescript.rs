//! TypeScript, TSX, JavaScript and JSX classification.
//!
//! The JavaScript and TypeScript grammars share node kinds for every construct
//! that matters here, so one adapter serves the whole family.

use tree_sitter::Node;

use super::{first_significant_child, node_text, ANONYMOUS};
use crate::complexity::{continues_chain, logical_operator, ComplexityKind, LanguageAdapter};

#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptAdapter;

const METHOD_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "generator_function_declaration",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Name of the binding a function expression is assigned to, if any.
fn assigned_name(node: Node<'_>) -> Option<Node<'_>> {
    let parent = node.parent()?;
    match parent.kind() {
        "variable_declarator" | "public_field_definition" => parent.child_by_field_name("name"),
        "field_definition" => parent.child_by_field_name("property"),
        "pair" => parent.child_by_field_name("key"),
        "assignment_expression" => parent.child_by_field_name("left"),
        _ => None,
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn is_method(&self, node: Node<'_>) -> bool {
        // The `function` keyword token shares its kind with the expression node.
        node.is_named() && METHOD_KINDS.contains(&node.kind())
    }

    fn method_name(&self, node: Node<'_>, source: &[u8]) -> String {
        node.child_by_field_name("name")
            .or_else(|| assigned_name(node))
            .and_then(|name| node_text(name, source))
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    fn is_callback(&self, node: Node<'_>) -> bool {
        node.parent().is_some_and(|p| p.kind() == "arguments")
    }

    fn complexity_kind(&self, node: Node<'_>) -> Option<ComplexityKind> {
        match node.kind() {
            "if_statement" => Some(ComplexityKind::If),
            "switch_statement" => Some(ComplexityKind::Switch),
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
                Some(ComplexityKind::Loop)
            }
            "catch_clause" => Some(ComplexityKind::Catch),
            "ternary_expression" => Some(ComplexityKind::Ternary),
            "binary_expression" => Some(ComplexityKind::Binary),
            "else_clause" => Some(ComplexityKind::Else),
            _ => None,
        }
    }

    fn binary_operator(&self, node: Node<'_>) -> Option<&'static str> {
        logical_operator(node)
    }

    fn is_binary_continuation(&self, node: Node<'_>) -> bool {
        continues_chain(node)
    }

    fn is_else_if(&self, node: Node<'_>) -> bool {
        node.kind() == "else_clause"
            && first_significant_child(node).is_some_and(|c| c.kind() == "if_statement")
    }

    fn should_flatten_nesting(&self, parent: Node<'_>, child: Node<'_>) -> bool {
        parent.kind() == "if_statement" && child.kind() == "else_clause"
    }
}
