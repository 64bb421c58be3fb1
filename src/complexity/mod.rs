//! Cognitive complexity scoring over tree-sitter syntax trees.
//!
//! The engine in [`engine`] is language-agnostic: it only talks to a
//! [`LanguageAdapter`], which maps concrete grammar node kinds onto the small
//! [`ComplexityKind`] vocabulary. Supporting a new language means adding an
//! adapter under [`languages`]; the traversal stays untouched.

pub mod engine;
pub mod languages;

use tree_sitter::{Node, Tree};
use tracing::warn;

use crate::core::{Language, MethodComplexity};

pub use engine::score_tree;

/// Abstract constructs that contribute to cognitive complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexityKind {
    If,
    Switch,
    Loop,
    Catch,
    Ternary,
    Binary,
    Else,
}

impl ComplexityKind {
    /// Detail message for structural kinds. Binary operators label themselves.
    pub fn label(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Switch => "switch",
            Self::Loop => "loop",
            Self::Catch => "catch",
            Self::Ternary => "ternary",
            Self::Binary => "binary",
            Self::Else => "else",
        }
    }

    pub fn increases_nesting(self) -> bool {
        matches!(
            self,
            Self::If | Self::Switch | Self::Loop | Self::Catch | Self::Else
        )
    }
}

/// Per-language classification contract consumed by the scoring engine.
///
/// Implementations are stateless and must never panic on malformed or error
/// nodes; anything unrecognised simply classifies as "not a match".
pub trait LanguageAdapter: Send + Sync {
    /// Function, method, lambda or constructor boundary.
    fn is_method(&self, node: Node<'_>) -> bool;

    /// Explicit name, else the name it is assigned to, else `"anonymous"`.
    fn method_name(&self, node: Node<'_>, source: &[u8]) -> String;

    /// True when the method is passed directly as a call argument.
    fn is_callback(&self, node: Node<'_>) -> bool;

    fn complexity_kind(&self, node: Node<'_>) -> Option<ComplexityKind>;

    /// Classification `child` takes from its position under `parent`, for
    /// grammars where a construct has no node kind of its own. Consulted only
    /// when [`complexity_kind`](Self::complexity_kind) has no answer.
    fn branch_kind(&self, _parent: Node<'_>, _child: Node<'_>) -> Option<ComplexityKind> {
        None
    }

    /// Logical operator of a binary node (`"&&"`, `"||"`), if it has one.
    fn binary_operator(&self, node: Node<'_>) -> Option<&'static str>;

    /// True when the left operand (parentheses ignored) uses the same logical
    /// operator, i.e. the node continues an `a && b && c` chain.
    fn is_binary_continuation(&self, node: Node<'_>) -> bool;

    /// An else branch that merely wraps another `if`.
    fn is_else_if(&self, node: Node<'_>) -> bool;

    /// Whether `child` keeps the nesting depth `parent` itself was visited at.
    fn should_flatten_nesting(&self, parent: Node<'_>, child: Node<'_>) -> bool;
}

/// Score every method in `tree`, selecting the adapter by editor language id.
///
/// Unknown languages log a warning and yield an empty list.
pub fn compute_complexity(tree: &Tree, source: &str, language_id: &str) -> Vec<MethodComplexity> {
    match Language::from_language_id(language_id) {
        Some(language) => score_tree(tree, source, language.adapter()),
        None => {
            warn!(language_id, "No complexity adapter for language");
            Vec::new()
        }
    }
}

/// Unwrap parenthesized expressions to reach the operand they wrap.
pub(crate) fn strip_parentheses(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Logical operator of a `binary_expression`, read from its `operator` field
/// or, for grammars without one, from its anonymous operator token.
pub(crate) fn logical_operator(node: Node<'_>) -> Option<&'static str> {
    if node.kind() != "binary_expression" {
        return None;
    }
    let operator = match node.child_by_field_name("operator") {
        Some(operator) => operator,
        None => {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .find(|c| !c.is_named() && matches!(c.kind(), "&&" | "||"));
            found?
        }
    };
    match operator.kind() {
        "&&" => Some("&&"),
        "||" => Some("||"),
        _ => None,
    }
}

/// Shared continuation rule: the left operand chains the same operator.
pub(crate) fn continues_chain(node: Node<'_>) -> bool {
    let Some(operator) = logical_operator(node) else {
        return false;
    };
    node.child_by_field_name("left")
        .map(strip_parentheses)
        .and_then(logical_operator)
        .is_some_and(|left| left == operator)
}
