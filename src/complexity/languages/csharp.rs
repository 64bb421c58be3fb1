//! C# classification.
//!
//! The C# grammar has no dedicated else node: an `if_statement` carries its
//! else branch directly in the `alternative` field. That statement is
//! classified from the `if_statement` side as the `Else` construct unless it
//! is itself an `if_statement`, in which case it scores as the `If` of an
//! else-if chain.

use tree_sitter::Node;

use super::{first_significant_child, node_text, ANONYMOUS};
use crate::complexity::{continues_chain, logical_operator, ComplexityKind, LanguageAdapter};

#[derive(Debug, Default, Clone, Copy)]
pub struct CSharpAdapter;

const METHOD_KINDS: &[&str] = &[
    "method_declaration",
    "local_function_statement",
    "lambda_expression",
    "anonymous_method_expression",
    "constructor_declaration",
    "destructor_declaration",
    "operator_declaration",
];

/// Variable a lambda or anonymous method is assigned to.
fn assigned_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut parent = node.parent()?;
    if parent.kind() == "equals_value_clause" {
        parent = parent.parent()?;
    }
    match parent.kind() {
        "variable_declarator" => parent
            .child_by_field_name("name")
            .or_else(|| first_significant_child(parent).filter(|c| c.kind() == "identifier")),
        _ => None,
    }
}

impl LanguageAdapter for CSharpAdapter {
    fn is_method(&self, node: Node<'_>) -> bool {
        node.is_named() && METHOD_KINDS.contains(&node.kind())
    }

    fn method_name(&self, node: Node<'_>, source: &[u8]) -> String {
        if node.kind() == "operator_declaration" {
            if let Some(operator) = node
                .child_by_field_name("operator")
                .and_then(|op| node_text(op, source))
            {
                return format!("operator {operator}");
            }
        }

        node.child_by_field_name("name")
            .or_else(|| assigned_name(node))
            .and_then(|name| node_text(name, source))
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    fn is_callback(&self, node: Node<'_>) -> bool {
        node.parent()
            .is_some_and(|p| matches!(p.kind(), "argument" | "argument_list"))
    }

    fn complexity_kind(&self, node: Node<'_>) -> Option<ComplexityKind> {
        match node.kind() {
            "if_statement" => Some(ComplexityKind::If),
            "switch_statement" | "switch_expression" => Some(ComplexityKind::Switch),
            "for_statement" | "foreach_statement" | "for_each_statement" | "while_statement"
            | "do_statement" => Some(ComplexityKind::Loop),
            "catch_clause" => Some(ComplexityKind::Catch),
            "conditional_expression" => Some(ComplexityKind::Ternary),
            "binary_expression" => Some(ComplexityKind::Binary),
            "else_clause" => Some(ComplexityKind::Else),
            _ => None,
        }
    }

    fn branch_kind(&self, parent: Node<'_>, child: Node<'_>) -> Option<ComplexityKind> {
        let is_plain_else = parent.kind() == "if_statement"
            && child.kind() != "if_statement"
            && parent.child_by_field_name("alternative") == Some(child);
        is_plain_else.then_some(ComplexityKind::Else)
    }

    fn binary_operator(&self, node: Node<'_>) -> Option<&'static str> {
        logical_operator(node)
    }

    fn is_binary_continuation(&self, node: Node<'_>) -> bool {
        continues_chain(node)
    }

    fn is_else_if(&self, node: Node<'_>) -> bool {
        match node.kind() {
            "if_statement" => true,
            "else_clause" => first_significant_child(node).is_some_and(|c| c.kind() == "if_statement"),
            _ => false,
        }
    }

    fn should_flatten_nesting(&self, parent: Node<'_>, child: Node<'_>) -> bool {
        parent.kind() == "if_statement"
            && (child.kind() == "else_clause"
                || parent.child_by_field_name("alternative") == Some(child))
    }
}
