use std::collections::{BTreeSet, HashMap};

use camino::{Utf8Path, Utf8PathBuf};

/// Read-only view of pre-ingested coverage data. Populated by the
/// surrounding system before the collection pass; this crate only queries.
pub trait CoverageData {
    /// Did any test execute the method whose declaration sits on `line`?
    /// Method-level semantics: the answer is recorded against the first
    /// line of the declaration, not against every line of the body.
    fn has_executed_method_on_line(&self, path: &Utf8Path, line: usize) -> bool;

    /// Did any test execute statement `line` of `path`?
    fn has_tests_on_line(&self, path: &Utf8Path, line: usize) -> bool;
}

/// In-memory coverage store for embedders (and tests) that materialize
/// coverage themselves. File ingestion formats are out of scope here.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    tested_lines: HashMap<Utf8PathBuf, BTreeSet<usize>>,
    executed_methods: HashMap<Utf8PathBuf, BTreeSet<usize>>,
}

impl CoverageMap {
    pub fn new() -> Self {
        CoverageMap::default()
    }

    pub fn add_tested_line(&mut self, path: impl Into<Utf8PathBuf>, line: usize) {
        self.tested_lines.entry(path.into()).or_default().insert(line);
    }

    pub fn add_executed_method(&mut self, path: impl Into<Utf8PathBuf>, line: usize) {
        self.executed_methods
            .entry(path.into())
            .or_default()
            .insert(line);
    }
}

impl CoverageData for CoverageMap {
    fn has_executed_method_on_line(&self, path: &Utf8Path, line: usize) -> bool {
        self.executed_methods
            .get(path)
            .is_some_and(|lines| lines.contains(&line))
    }

    fn has_tests_on_line(&self, path: &Utf8Path, line: usize) -> bool {
        self.tested_lines
            .get(path)
            .is_some_and(|lines| lines.contains(&line))
    }
}
