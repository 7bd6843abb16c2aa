use crate::tree::{Node, NodeId, SourceTree};
use crate::visibility::ProtectedVisibility;

/// One category of mutation. Implementations are pure: eligibility is a
/// cheap syntactic check over the node, the transformation builds new node
/// values and never touches the input tree.
pub trait Mutator {
    /// Stable identifier, used for configuration lookup and in mutation
    /// records.
    fn name(&self) -> &'static str;

    /// Syntactic eligibility only: kind, flags, presence of children.
    /// Deterministic, side-effect free, and never consults coverage.
    fn mutates_node(&self, tree: &SourceTree, id: NodeId) -> bool;

    /// Produce the candidate mutants for an eligible node. Each element is
    /// an independent alternative, not a step in a pipeline. Callers must
    /// establish eligibility first; this performs no re-validation.
    fn mutate(&self, tree: &SourceTree, id: NodeId) -> MutantStream;
}

/// Finite stream of candidate mutant nodes. Consumed exactly once by the
/// collector; there is deliberately no way to restart it.
pub struct MutantStream {
    nodes: std::vec::IntoIter<Node>,
}

impl MutantStream {
    pub fn empty() -> Self {
        MutantStream::from_nodes(Vec::new())
    }

    pub fn single(node: Node) -> Self {
        MutantStream::from_nodes(vec![node])
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        MutantStream {
            nodes: nodes.into_iter(),
        }
    }
}

impl Iterator for MutantStream {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        self.nodes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

/// The built-in mutator registry. The set is finite per run; callers wanting
/// a subset or extra rules assemble their own list in the same shape.
pub fn default_mutators() -> Vec<Box<dyn Mutator>> {
    vec![Box::new(ProtectedVisibility)]
}
