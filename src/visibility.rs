use crate::mutator::{MutantStream, Mutator};
use crate::tree::{Node, NodeId, NodeKind, SourceTree, Visibility};

/// Narrows `protected` method declarations to `private`.
///
/// Only safe when no ancestor class declares a protected method of the same
/// name: narrowing an override would change dispatch for the whole
/// hierarchy, producing a mutant that breaks compilation rather than
/// semantics. When reflection data is missing we assume the worst and skip.
pub struct ProtectedVisibility;

impl Mutator for ProtectedVisibility {
    fn name(&self) -> &'static str {
        "protected_visibility"
    }

    fn mutates_node(&self, tree: &SourceTree, id: NodeId) -> bool {
        let node = tree.node(id);
        let Some(method) = node.kind.as_method() else {
            return false;
        };
        if method.is_abstract {
            return false;
        }
        if method.visibility != Visibility::Protected {
            return false;
        }
        !has_same_protected_parent_method(node, &method.name)
    }

    fn mutate(&self, tree: &SourceTree, id: NodeId) -> MutantStream {
        let node = tree.node(id);
        let Some(method) = node.kind.as_method() else {
            return MutantStream::empty();
        };

        // Only the visibility flag changes; name, params, return-by-ref,
        // return type, span and attributes all carry over.
        let mut narrowed = method.clone();
        narrowed.visibility = Visibility::Private;
        let mut mutated = node.clone();
        mutated.kind = NodeKind::Method(narrowed);
        MutantStream::single(mutated)
    }
}

fn has_same_protected_parent_method(node: &Node, method: &str) -> bool {
    match &node.class {
        // No reflective metadata: assume an ancestor declares the method
        // protected and skip rather than emit a breaking mutant.
        None => true,
        Some(class) => class.has_protected_ancestor_method(method),
    }
}
