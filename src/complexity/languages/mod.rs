//! Concrete [`LanguageAdapter`](super::LanguageAdapter) implementations.

mod csharp;
mod typescript;

pub use csharp::CSharpAdapter;
pub use typescript::TypeScriptAdapter;

use tree_sitter::Node;

pub(crate) const ANONYMOUS: &str = "anonymous";

pub(crate) fn node_text(node: Node<'_>, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(str::to_owned)
}

/// First named child that is not a comment.
pub(crate) fn first_significant_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    found
}
