use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::reflection::ClassInfo;

/// Index of a node within its [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

/// Inclusive 1-based source line range. Always non-empty: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start >= 1, "line numbers are 1-based");
        assert!(start <= end, "line span must be ordered: {start} > {end}");
        LineSpan { start, end }
    }

    /// Every line covered by this span, in ascending order.
    pub fn lines(self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// Method declaration payload. Everything a mutator must preserve when it
/// rewrites one aspect of the declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub returns_by_ref: bool,
    pub params: Vec<String>,
    pub return_type: Option<String>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        MethodDecl {
            name: name.into(),
            visibility,
            is_abstract: false,
            returns_by_ref: false,
            params: Vec::new(),
            return_type: None,
        }
    }
}

/// Kind tag of a syntax node. Closed set: the external parser maps its own
/// node types onto these before handing the tree over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeKind {
    Method(MethodDecl),
    ArrayLiteral,
    Statement,
    Expression,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Method(_) => "method",
            NodeKind::ArrayLiteral => "array_literal",
            NodeKind::Statement => "statement",
            NodeKind::Expression => "expression",
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match self {
            NodeKind::Method(decl) => Some(decl),
            _ => None,
        }
    }
}

/// One syntax-tree element. Out-of-band attributes the surrounding system
/// computes before the pass (signature/body flags, enclosing function,
/// reflected class) live here as typed fields.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: LineSpan,
    pub on_signature: bool,
    pub inside_function: bool,
    pub function_name: Option<String>,
    #[serde(skip)]
    pub class: Option<Arc<ClassInfo>>,
    #[serde(skip)]
    parent: Option<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: LineSpan) -> Self {
        Node {
            kind,
            span,
            on_signature: false,
            inside_function: false,
            function_name: None,
            class: None,
            parent: None,
        }
    }

    pub fn on_signature(mut self) -> Self {
        self.on_signature = true;
        self
    }

    pub fn inside_function(mut self) -> Self {
        self.inside_function = true;
        self
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: Arc<ClassInfo>) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the parent link directly. Only useful with
    /// [`SourceTree::from_nodes`]; [`SourceTree::push`] overwrites it.
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Immutable snapshot of one parsed file: an id-indexed node arena plus the
/// originating path. Shared by `Arc` with every mutation record; nothing in
/// this crate mutates it after construction.
#[derive(Debug)]
pub struct SourceTree {
    path: Utf8PathBuf,
    nodes: Vec<Node>,
}

impl SourceTree {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        SourceTree {
            path: path.into(),
            nodes: Vec::new(),
        }
    }

    /// Build from nodes whose parent links were set by the caller. The links
    /// are taken as-is; [`validate`](Self::validate) checks them later.
    pub fn from_nodes(path: impl Into<Utf8PathBuf>, nodes: Vec<Node>) -> Self {
        SourceTree {
            path: path.into(),
            nodes,
        }
    }

    /// Append a node under an existing parent (or as a root). Trees built
    /// exclusively through here cannot contain parent-link cycles.
    pub fn push(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        if let Some(p) = parent {
            assert!(p.0 < self.nodes.len(), "parent {} does not exist yet", p.0);
        }
        node.parent = parent;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` is out of range; use [`get`](Self::get) for lookups on
    /// trees of unknown provenance.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Check every parent link before a traversal: all links must resolve
    /// and no chain may revisit a node. The walk is bounded by the node
    /// count, so a malformed tree fails fast instead of hanging.
    pub fn validate(&self) -> Result<()> {
        for start in 0..self.nodes.len() {
            let mut current = NodeId(start);
            let mut steps = 0;
            while let Some(parent) = self.nodes[current.0].parent {
                if parent.0 >= self.nodes.len() {
                    return Err(Error::DanglingParent {
                        path: self.path.clone(),
                        node: current.0,
                        parent: parent.0,
                    });
                }
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(Error::CyclicParentChain {
                        path: self.path.clone(),
                        node: start,
                    });
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Fixed post-order visitation: children before parents, ids ascending
    /// among siblings and roots. Deterministic for a given tree.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        let mut roots = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(p) if p.0 < self.nodes.len() => children[p.0].push(NodeId(i)),
                Some(_) => {}
                None => roots.push(NodeId(i)),
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, bool)> =
            roots.into_iter().rev().map(|id| (id, false)).collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in children[id.0].iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Topmost array-literal ancestor of `id`, or `id` itself when the node
    /// is not inside an array. Coverage for sub-elements of a literal is
    /// attributed at the statement level, so their line range comes from the
    /// outermost literal rather than the element's own span.
    pub fn outermost_array(&self, id: NodeId) -> Result<NodeId> {
        let mut outermost = id;
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cid) = current {
            let node = self.get(cid).ok_or_else(|| Error::DanglingParent {
                path: self.path.clone(),
                node: id.0,
                parent: cid.0,
            })?;
            steps += 1;
            if steps > self.nodes.len() {
                return Err(Error::CyclicParentChain {
                    path: self.path.clone(),
                    node: id.0,
                });
            }
            if matches!(node.kind, NodeKind::ArrayLiteral) {
                outermost = cid;
            }
            current = node.parent;
        }
        Ok(outermost)
    }
}
