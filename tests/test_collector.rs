use std::collections::HashMap;
use std::sync::Arc;

use mutgen::collector::MutationCollector;
use mutgen::coverage::CoverageMap;
use mutgen::error::Error;
use mutgen::ignore::{wrap_mutators, IgnoringMutator, MutatorConfig};
use mutgen::mutator::{default_mutators, MutantStream, Mutator};
use mutgen::reflection::{ClassInfo, MethodInfo};
use mutgen::tree::{
    LineSpan, MethodDecl, Node, NodeId, NodeKind, SourceTree, Visibility,
};

const PATH: &str = "src/Money.php";

/// Eligible on every expression node; emits a configurable number of
/// cloned mutants.
struct ExpressionMutator {
    mutants_per_node: usize,
}

impl Mutator for ExpressionMutator {
    fn name(&self) -> &'static str {
        "expression"
    }

    fn mutates_node(&self, tree: &SourceTree, id: NodeId) -> bool {
        matches!(tree.node(id).kind, NodeKind::Expression)
    }

    fn mutate(&self, tree: &SourceTree, id: NodeId) -> MutantStream {
        let node = tree.node(id);
        MutantStream::from_nodes(vec![node.clone(); self.mutants_per_node])
    }
}

/// Claims eligibility but never yields a mutant.
struct BarrenMutator;

impl Mutator for BarrenMutator {
    fn name(&self) -> &'static str {
        "barren"
    }

    fn mutates_node(&self, _tree: &SourceTree, _id: NodeId) -> bool {
        true
    }

    fn mutate(&self, _tree: &SourceTree, _id: NodeId) -> MutantStream {
        MutantStream::empty()
    }
}

fn visibility_mutators() -> Vec<IgnoringMutator> {
    wrap_mutators(default_mutators(), &HashMap::new())
}

fn ignoring(mutator: Box<dyn Mutator>) -> Vec<IgnoringMutator> {
    vec![IgnoringMutator::new(mutator, MutatorConfig::default())]
}

/// A protected method `foo` declared on lines 5..9 of `Money`, with the
/// given ancestry attached as reflection metadata.
fn method_foo_tree(class: Arc<ClassInfo>) -> Arc<SourceTree> {
    let mut tree = SourceTree::new(PATH);
    tree.push(
        Node::new(
            NodeKind::Method(MethodDecl::new("foo", Visibility::Protected)),
            LineSpan::new(5, 9),
        )
        .on_signature()
        .with_function_name("foo")
        .with_class(class),
        None,
    );
    Arc::new(tree)
}

fn money_class() -> Arc<ClassInfo> {
    Arc::new(ClassInfo::new("Money").with_method(
        "foo",
        MethodInfo::new(Visibility::Protected),
    ))
}

/// Expression node nested three levels inside an array literal spanning
/// lines 10..15. Returns the tree and the leaf's id.
fn nested_array_tree() -> (Arc<SourceTree>, NodeId) {
    let mut tree = SourceTree::new(PATH);
    let stmt = tree.push(
        Node::new(NodeKind::Statement, LineSpan::new(10, 15)).inside_function(),
        None,
    );
    let outer = tree.push(
        Node::new(NodeKind::ArrayLiteral, LineSpan::new(10, 15)).inside_function(),
        Some(stmt),
    );
    let middle = tree.push(
        Node::new(NodeKind::ArrayLiteral, LineSpan::new(11, 14)).inside_function(),
        Some(outer),
    );
    let inner = tree.push(
        Node::new(NodeKind::ArrayLiteral, LineSpan::new(12, 13)).inside_function(),
        Some(middle),
    );
    let leaf = tree.push(
        Node::new(NodeKind::Expression, LineSpan::new(12, 12)).inside_function(),
        Some(inner),
    );
    (Arc::new(tree), leaf)
}

// --- End-to-end: visibility narrowing ---

#[test]
fn protected_method_without_parent_yields_one_private_mutant() {
    let tree = method_foo_tree(money_class());
    let mutators = visibility_mutators();
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();

    assert_eq!(mutations.len(), 1);
    let mutation = &mutations[0];
    assert_eq!(mutation.mutator_name(), "protected_visibility");
    assert_eq!(mutation.path(), PATH);
    assert_eq!(mutation.original_kind(), "method");
    assert_eq!(mutation.mutator_index(), 0);
    assert!(mutation.is_on_signature());
    assert_eq!(mutation.line_span(), LineSpan::new(5, 9));

    let mutated = mutation.mutated_node().kind.as_method().expect("method");
    assert_eq!(mutated.visibility, Visibility::Private);
    assert_eq!(mutated.name, "foo");
}

#[test]
fn protected_parent_method_yields_no_mutants() {
    let parent = Arc::new(ClassInfo::new("Asset").with_method(
        "foo",
        MethodInfo::new(Visibility::Protected),
    ));
    let class = Arc::new(
        ClassInfo::new("Money")
            .with_parent(parent)
            .with_method("foo", MethodInfo::new(Visibility::Protected)),
    );
    let tree = method_foo_tree(class);
    let mutators = visibility_mutators();
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());
}

#[test]
fn ignore_pattern_suppresses_an_otherwise_eligible_method() {
    let tree = method_foo_tree(money_class());
    let mut configs = HashMap::new();
    configs.insert(
        "protected_visibility".to_string(),
        MutatorConfig::from_patterns(&["Money::foo"]).unwrap(),
    );
    let mutators = wrap_mutators(default_mutators(), &configs);
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());
}

// --- Function gate ---

#[test]
fn nodes_outside_any_function_are_never_collected() {
    let mut tree = SourceTree::new(PATH);
    // Top-level expression: neither on a signature nor inside a function.
    tree.push(Node::new(NodeKind::Expression, LineSpan::new(2, 2)), None);
    let tree = Arc::new(tree);

    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 1 }));
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());
}

// --- Signature coverage rule ---

#[test]
fn signature_coverage_checks_only_the_declaration_line() {
    let tree = method_foo_tree(money_class());
    let mutators = visibility_mutators();

    // Body lines covered, method itself never executed: not covered.
    let mut body_only = CoverageMap::new();
    for line in 6..=9 {
        body_only.add_tested_line(PATH, line);
    }
    let mutations = MutationCollector::new(&mutators, &body_only, true)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());

    // Method execution recorded on the declaration line: covered.
    let mut executed = CoverageMap::new();
    executed.add_executed_method(PATH, 5);
    let mutations = MutationCollector::new(&mutators, &executed, true)
        .collect(&tree)
        .unwrap();
    assert_eq!(mutations.len(), 1);
    assert!(mutations[0].is_covered_by_tests());
    assert_eq!(mutations[0].line_span(), LineSpan::new(5, 9));
}

// --- Array-literal coverage rule ---

#[test]
fn array_element_inherits_coverage_from_the_outermost_literal() {
    let (tree, _leaf) = nested_array_tree();
    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 1 }));

    // Only line 13 is covered, which is not the leaf's own line, but falls
    // within the outermost literal's 10..15 span.
    let mut coverage = CoverageMap::new();
    coverage.add_tested_line(PATH, 13);

    let mutations = MutationCollector::new(&mutators, &coverage, true)
        .collect(&tree)
        .unwrap();
    assert_eq!(mutations.len(), 1);
    assert!(mutations[0].is_covered_by_tests());
    assert_eq!(mutations[0].line_span(), LineSpan::new(10, 15));
    assert!(!mutations[0].is_on_signature());
}

#[test]
fn expression_outside_arrays_uses_its_own_span() {
    let mut tree = SourceTree::new(PATH);
    tree.push(
        Node::new(NodeKind::Expression, LineSpan::new(21, 21)).inside_function(),
        None,
    );
    let tree = Arc::new(tree);
    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 1 }));

    let mut coverage = CoverageMap::new();
    coverage.add_tested_line(PATH, 21);

    let mutations = MutationCollector::new(&mutators, &coverage, true)
        .collect(&tree)
        .unwrap();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].line_span(), LineSpan::new(21, 21));
}

// --- Only-covered policy ---

#[test]
fn only_covered_policy_skips_uncovered_nodes() {
    let tree = method_foo_tree(money_class());
    let mutators = visibility_mutators();
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, true)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());
}

#[test]
fn inactive_policy_keeps_uncovered_nodes_with_the_flag_unset() {
    let tree = method_foo_tree(money_class());
    let mutators = visibility_mutators();
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert_eq!(mutations.len(), 1);
    assert!(!mutations[0].is_covered_by_tests());
}

// --- Mutant streams and indexing ---

#[test]
fn multiple_mutants_from_one_node_get_sequential_indices() {
    let (tree, _leaf) = nested_array_tree();
    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 3 }));
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert_eq!(mutations.len(), 3);
    let indices: Vec<usize> = mutations.iter().map(|m| m.mutator_index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn empty_mutant_stream_is_a_noop_not_an_error() {
    let (tree, _leaf) = nested_array_tree();
    let mutators = ignoring(Box::new(BarrenMutator));
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    assert!(mutations.is_empty());
}

// --- Determinism ---

#[test]
fn collection_pass_is_idempotent() {
    let (tree, _leaf) = nested_array_tree();
    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 2 }));
    let coverage = CoverageMap::new();
    let collector = MutationCollector::new(&mutators, &coverage, false);

    let first = collector.collect(&tree).unwrap();
    let second = collector.collect(&tree).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.node_id(), b.node_id());
        assert_eq!(a.mutator_index(), b.mutator_index());
        assert_eq!(a.line_span(), b.line_span());
    }
}

#[test]
fn mutators_are_applied_in_caller_supplied_order() {
    let (tree, _leaf) = nested_array_tree();
    let mutators = vec![
        IgnoringMutator::new(
            Box::new(ExpressionMutator { mutants_per_node: 1 }),
            MutatorConfig::default(),
        ),
        IgnoringMutator::new(Box::new(BarrenMutator), MutatorConfig::default()),
    ];
    let coverage = CoverageMap::new();

    let mutations = MutationCollector::new(&mutators, &coverage, false)
        .collect(&tree)
        .unwrap();
    // Barren yields nothing; every record comes from the expression rule,
    // in post-order node order.
    assert!(mutations.iter().all(|m| m.mutator_name() == "expression"));
}

// --- Malformed input ---

#[test]
fn cyclic_parent_links_fail_the_pass() {
    let nodes = vec![
        Node::new(NodeKind::Expression, LineSpan::new(1, 1))
            .inside_function()
            .with_parent(NodeId(1)),
        Node::new(NodeKind::Expression, LineSpan::new(2, 2))
            .inside_function()
            .with_parent(NodeId(0)),
    ];
    let tree = Arc::new(SourceTree::from_nodes(PATH, nodes));
    let mutators = ignoring(Box::new(ExpressionMutator { mutants_per_node: 1 }));
    let coverage = CoverageMap::new();

    let result = MutationCollector::new(&mutators, &coverage, false).collect(&tree);
    assert!(matches!(result, Err(Error::CyclicParentChain { .. })));
}
