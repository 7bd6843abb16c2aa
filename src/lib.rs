//! Mutation-generation core of a mutation-testing engine.
//!
//! Given a parsed source tree and per-line coverage data, decide for every
//! eligible node whether a mutant should be produced, generate the mutated
//! node values, and record each mutant with the coverage and location
//! metadata downstream test execution needs. Parsing, test runs and
//! reporting all live outside this crate.

pub mod collector;
pub mod coverage;
pub mod error;
pub mod ignore;
pub mod mutation;
pub mod mutator;
pub mod reflection;
pub mod tree;
pub mod visibility;
