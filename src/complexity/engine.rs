//! Single-pass scoring traversal.
//!
//! Every method node gets its own score computed from its subtree, stopping at
//! nested method boundaries. That own score is fixed before it is added to each
//! currently open ancestor, so ancestors only ever sum own scores and deep
//! nesting cannot compound totals.

use tree_sitter::{Node, Tree};

use super::{ComplexityKind, LanguageAdapter};
use crate::core::{ComplexityDetail, MethodComplexity};

/// Score every method in `tree`, in document order.
pub fn score_tree(
    tree: &Tree,
    source: &str,
    adapter: &dyn LanguageAdapter,
) -> Vec<MethodComplexity> {
    let mut walker = MethodWalker {
        adapter,
        source: source.as_bytes(),
        methods: Vec::new(),
        open: Vec::new(),
    };
    walker.visit(tree.root_node());
    walker.methods
}

/// Own score and details of one method, excluding nested methods.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OwnComplexity {
    pub score: u32,
    pub details: Vec<ComplexityDetail>,
}

/// Compute the own complexity of `method`, which must be a method node.
pub fn own_complexity(method: Node<'_>, adapter: &dyn LanguageAdapter) -> OwnComplexity {
    let mut own = OwnComplexity::default();
    let mut cursor = method.walk();
    for child in method.children(&mut cursor) {
        accumulate(child, adapter.branch_kind(method, child), 0, adapter, &mut own);
    }
    own
}

struct MethodWalker<'a> {
    adapter: &'a dyn LanguageAdapter,
    source: &'a [u8],
    methods: Vec<MethodComplexity>,
    /// Indices into `methods` of the enclosing methods, outermost first.
    open: Vec<usize>,
}

impl MethodWalker<'_> {
    fn visit(&mut self, node: Node<'_>) {
        let is_method = self.adapter.is_method(node);
        if is_method {
            self.enter_method(node);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }

        if is_method {
            self.open.pop();
        }
    }

    fn enter_method(&mut self, node: Node<'_>) {
        let own = own_complexity(node, self.adapter);

        for &ancestor in &self.open {
            self.methods[ancestor].score += own.score;
        }

        self.open.push(self.methods.len());
        self.methods.push(MethodComplexity {
            name: self.adapter.method_name(node, self.source),
            score: own.score,
            details: own.details,
            start_index: node.start_byte(),
            end_index: node.end_byte(),
            is_callback: self.adapter.is_callback(node),
        });
    }
}

/// Structural contribution of a single node: its label and nesting effect.
fn contribution(
    node: Node<'_>,
    branch: Option<ComplexityKind>,
    adapter: &dyn LanguageAdapter,
) -> Option<(&'static str, bool)> {
    let kind = adapter.complexity_kind(node).or(branch)?;
    match kind {
        ComplexityKind::Else if adapter.is_else_if(node) => None,
        ComplexityKind::Binary => {
            let operator = adapter.binary_operator(node)?;
            (!adapter.is_binary_continuation(node)).then_some((operator, false))
        }
        _ => Some((kind.label(), kind.increases_nesting())),
    }
}

/// `branch` is the classification `node` takes from its parent, if any.
fn accumulate(
    node: Node<'_>,
    branch: Option<ComplexityKind>,
    nesting: u32,
    adapter: &dyn LanguageAdapter,
    own: &mut OwnComplexity,
) {
    // Nested methods are scored on their own by the outer walk.
    if adapter.is_method(node) {
        return;
    }

    let increases_nesting = match contribution(node, branch, adapter) {
        Some((label, increases_nesting)) => {
            let line = node.start_position().row as u32;
            own.score += 1;
            own.details.push(ComplexityDetail::new(line, 1, label));
            if increases_nesting && nesting > 0 {
                own.score += nesting;
                own.details
                    .push(ComplexityDetail::new(line, nesting, "nesting"));
            }
            increases_nesting
        }
        None => false,
    };

    let inner = if increases_nesting { nesting + 1 } else { nesting };
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let depth = if adapter.should_flatten_nesting(node, child) {
            nesting
        } else {
            inner
        };
        accumulate(child, adapter.branch_kind(node, child), depth, adapter, own);
    }
}
