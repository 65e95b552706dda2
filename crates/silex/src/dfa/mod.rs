//! DFA graph and construction.

pub mod builder;
pub mod graph;

pub use builder::{rule_patterns_to_dfa, LexerRuleDfa};
pub use graph::{DfaStateId, LexerDfaGraph};
