use camino::Utf8PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions for the collection pass. Missing reflection data and
/// ancestor lookup misses are handled by conservative fallbacks and never
/// reach this type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cyclic parent chain at node {node} in {path}")]
    CyclicParentChain { path: Utf8PathBuf, node: usize },

    #[error("node {node} in {path} links to missing parent {parent}")]
    DanglingParent {
        path: Utf8PathBuf,
        node: usize,
        parent: usize,
    },

    #[error("invalid ignore pattern `{0}`")]
    InvalidIgnorePattern(String),
}
