use std::fmt::Write as _;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::tree::{LineSpan, Node, NodeId, SourceTree};

/// One accepted mutant, produced during the collection pass and immutable
/// afterward. Ownership passes to the downstream test-execution
/// orchestration; the tree snapshot travels along by shared reference.
#[derive(Debug, Clone, Serialize)]
pub struct Mutation {
    path: Utf8PathBuf,
    #[serde(skip)]
    tree: Arc<SourceTree>,
    mutator: &'static str,
    node_id: NodeId,
    original_span: LineSpan,
    original_kind: &'static str,
    on_signature: bool,
    covered_by_tests: bool,
    mutated_node: Node,
    mutator_index: usize,
    line_span: LineSpan,
}

impl Mutation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tree: Arc<SourceTree>,
        node_id: NodeId,
        mutator: &'static str,
        on_signature: bool,
        covered_by_tests: bool,
        mutated_node: Node,
        mutator_index: usize,
        line_span: LineSpan,
    ) -> Self {
        let original = tree.node(node_id);
        Mutation {
            path: tree.path().to_owned(),
            original_span: original.span,
            original_kind: original.kind.name(),
            tree,
            mutator,
            node_id,
            on_signature,
            covered_by_tests,
            mutated_node,
            mutator_index,
            line_span,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The full file tree the original node belongs to.
    pub fn tree(&self) -> &Arc<SourceTree> {
        &self.tree
    }

    pub fn mutator_name(&self) -> &'static str {
        self.mutator
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn original_span(&self) -> LineSpan {
        self.original_span
    }

    pub fn original_kind(&self) -> &'static str {
        self.original_kind
    }

    pub fn is_on_signature(&self) -> bool {
        self.on_signature
    }

    pub fn is_covered_by_tests(&self) -> bool {
        self.covered_by_tests
    }

    pub fn mutated_node(&self) -> &Node {
        &self.mutated_node
    }

    /// Zero-based position among the mutants this mutator produced for this
    /// node. Unique and stable within one collection pass.
    pub fn mutator_index(&self) -> usize {
        self.mutator_index
    }

    /// The line range whose coverage status decided the covered flag.
    pub fn line_span(&self) -> LineSpan {
        self.line_span
    }

    /// Stable short identifier for downstream reference and deduplication.
    /// Derived from the mutation site, not from the mutant payload.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.path.as_str().as_bytes());
        hasher.update(self.mutator.as_bytes());
        hasher.update(self.node_id.0.to_le_bytes());
        hasher.update(self.original_span.start.to_le_bytes());
        hasher.update(self.original_span.end.to_le_bytes());
        hasher.update(self.mutator_index.to_le_bytes());
        let digest = hasher.finalize();

        let mut id = String::with_capacity(12);
        for byte in &digest[..6] {
            let _ = write!(id, "{byte:02x}");
        }
        id
    }
}
