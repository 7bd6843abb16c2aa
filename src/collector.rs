use std::sync::Arc;

use tracing::{debug, trace};

use crate::coverage::CoverageData;
use crate::error::Result;
use crate::ignore::IgnoringMutator;
use crate::mutation::Mutation;
use crate::tree::{LineSpan, NodeId, SourceTree};

/// Drives the single collection pass: one post-order traversal applying
/// every mutator to every node, resolving coverage per mutation site and
/// materializing [`Mutation`] records.
///
/// The pass is strictly sequential and reads the tree, coverage and
/// configuration as immutable snapshots, so two runs over the same inputs
/// produce identical record lists.
pub struct MutationCollector<'a> {
    mutators: &'a [IgnoringMutator],
    coverage: &'a dyn CoverageData,
    only_covered: bool,
}

impl<'a> MutationCollector<'a> {
    /// Mutator order is the caller's; it fixes the ordering of the emitted
    /// records.
    pub fn new(
        mutators: &'a [IgnoringMutator],
        coverage: &'a dyn CoverageData,
        only_covered: bool,
    ) -> Self {
        MutationCollector {
            mutators,
            coverage,
            only_covered,
        }
    }

    pub fn collect(&self, tree: &Arc<SourceTree>) -> Result<Vec<Mutation>> {
        // Parent links come from an external parser; reject malformed
        // chains up front instead of looping during ancestor searches.
        tree.validate()?;

        let mut mutations = Vec::new();
        for id in tree.post_order() {
            for mutator in self.mutators {
                if !mutator.should_mutate(tree, id) {
                    continue;
                }

                let node = tree.node(id);

                // Top-level declarative code is never mutated.
                if !node.on_signature && !node.inside_function {
                    trace!(
                        mutator = mutator.name(),
                        node = id.0,
                        "skipped: outside any function"
                    );
                    continue;
                }

                let (line_span, covered) = self.resolve_coverage(tree, id)?;

                if self.only_covered && !covered {
                    trace!(
                        mutator = mutator.name(),
                        node = id.0,
                        "skipped: not covered by tests"
                    );
                    continue;
                }

                for (index, mutated) in mutator.mutate(tree, id).enumerate() {
                    mutations.push(Mutation::new(
                        Arc::clone(tree),
                        id,
                        mutator.name(),
                        node.on_signature,
                        covered,
                        mutated,
                        index,
                        line_span,
                    ));
                }
            }
        }

        debug!(
            path = %tree.path(),
            mutations = mutations.len(),
            "collection pass finished"
        );
        Ok(mutations)
    }

    /// The two coverage-resolution rules, mutually exclusive per node.
    ///
    /// Signature rule: method execution is recorded against the first line
    /// of the declaration, so checking any other line is pointless; the
    /// reported range is the signature's own span.
    ///
    /// Expression rule: coverage tools attach hits to the top-level
    /// statement line, while an array literal's elements may span many
    /// lines. Sub-element mutants therefore inherit the whole outermost
    /// literal's range, counted covered if any line in it was executed.
    fn resolve_coverage(
        &self,
        tree: &SourceTree,
        id: NodeId,
    ) -> Result<(LineSpan, bool)> {
        let node = tree.node(id);
        if node.on_signature {
            let covered = self
                .coverage
                .has_executed_method_on_line(tree.path(), node.span.start);
            return Ok((node.span, covered));
        }

        let outer = tree.outermost_array(id)?;
        let span = tree.node(outer).span;
        let covered = span
            .lines()
            .any(|line| self.coverage.has_tests_on_line(tree.path(), line));
        Ok((span, covered))
    }
}
