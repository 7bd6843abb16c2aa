use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::mutator::{MutantStream, Mutator};
use crate::tree::{NodeId, SourceTree};

/// One suppression rule: `Class`, `Class::method`, or
/// `Class::method::line`. A `*` segment matches any class or method name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct IgnorePattern {
    class: String,
    function: Option<String>,
    line: Option<usize>,
}

impl IgnorePattern {
    fn matches(&self, class: &str, function: &str, line: usize) -> bool {
        segment_matches(&self.class, class)
            && self
                .function
                .as_deref()
                .is_none_or(|f| segment_matches(f, function))
            && self.line.is_none_or(|l| l == line)
    }
}

fn segment_matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

impl FromStr for IgnorePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidIgnorePattern(s.to_string());
        let mut segments = s.split("::");

        let class = segments.next().filter(|c| !c.is_empty()).ok_or_else(invalid)?;
        let function = segments.next();
        if function.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        let line = segments
            .next()
            .map(|l| l.parse::<usize>().map_err(|_| invalid()))
            .transpose()?;
        if segments.next().is_some() {
            return Err(invalid());
        }

        Ok(IgnorePattern {
            class: class.to_string(),
            function: function.map(str::to_string),
            line,
        })
    }
}

impl TryFrom<String> for IgnorePattern {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Suppression rules for one mutator. Loaded by the embedder (configuration
/// files are out of scope here) and consulted through
/// [`is_ignored`](Self::is_ignored).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MutatorConfig {
    ignore: Vec<IgnorePattern>,
}

impl MutatorConfig {
    pub fn new(ignore: Vec<IgnorePattern>) -> Self {
        MutatorConfig { ignore }
    }

    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let ignore = patterns
            .iter()
            .map(|p| p.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(MutatorConfig { ignore })
    }

    pub fn is_ignored(&self, class: &str, function: &str, line: usize) -> bool {
        self.ignore.iter().any(|p| p.matches(class, function, line))
    }
}

/// Decorator adding configuration-based suppression to a mutator, so
/// concrete rules never re-implement it.
///
/// `should_mutate` runs the cheap syntactic check first and only then the
/// configuration lookup, which needs reflection-derived attributes that may
/// be expensive or absent. The order is load-bearing; do not swap it.
pub struct IgnoringMutator {
    mutator: Box<dyn Mutator>,
    config: MutatorConfig,
}

impl IgnoringMutator {
    pub fn new(mutator: Box<dyn Mutator>, config: MutatorConfig) -> Self {
        IgnoringMutator { mutator, config }
    }

    pub fn name(&self) -> &'static str {
        self.mutator.name()
    }

    pub fn should_mutate(&self, tree: &SourceTree, id: NodeId) -> bool {
        if !self.mutator.mutates_node(tree, id) {
            return false;
        }

        let node = tree.node(id);
        let Some(class) = &node.class else {
            // Nothing to match ignore rules against.
            return true;
        };

        !self.config.is_ignored(
            class.name(),
            node.function_name.as_deref().unwrap_or(""),
            node.span.start,
        )
    }

    /// Delegates without re-validating. Caller contract: only invoke after
    /// `should_mutate` returned true for this node.
    pub fn mutate(&self, tree: &SourceTree, id: NodeId) -> MutantStream {
        self.mutator.mutate(tree, id)
    }
}

/// Pair every mutator with its configuration, falling back to an empty
/// (nothing ignored) config for mutators the mapping does not mention.
pub fn wrap_mutators(
    mutators: Vec<Box<dyn Mutator>>,
    configs: &HashMap<String, MutatorConfig>,
) -> Vec<IgnoringMutator> {
    mutators
        .into_iter()
        .map(|m| {
            let config = configs.get(m.name()).cloned().unwrap_or_default();
            IgnoringMutator::new(m, config)
        })
        .collect()
}
