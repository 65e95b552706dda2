//! # Silex
//!
//! A lexer-generator core built on Brzozowski derivatives.
//!
//! ## Overview
//!
//! Silex compiles a declarative lexical specification (named macros,
//! rules of pattern/action clauses, verbatim header and footer
//! fragments) into one deterministic automaton per rule:
//!
//! - **Regex algebra**: canonicalizing IR with derivatives and
//!   derivative-class partitioning ([`regex`])
//! - **Macro preprocessing**: inlining, extended-form rewrites,
//!   universe checking ([`expand`])
//! - **DFA construction**: worklist algorithm over regular vectors
//!   ([`dfa`])
//! - **Orchestration**: per-rule parallel compilation with accumulated
//!   errors ([`compiler`])
//!
//! Scanner source emission from the compiled tables lives in the
//! companion `silex_codegen` crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use silex::spec::{
//!     CodeFragment, CompilationOptions, LexerClause, LexerPattern, LexerRule, PatternKind,
//!     Specification,
//! };
//! use silex::Span;
//! use silex::CharSet;
//!
//! // digit+ as the parser would hand it over: digit · digit*
//! let digits = CharSet::of_range('0' as u32, '9' as u32);
//! let set = |span| LexerPattern::new(PatternKind::Set(digits.clone()), span);
//! let span = Span::default();
//! let pattern = LexerPattern::new(
//!     PatternKind::OneOrMore(Box::new(set(span))),
//!     span,
//! );
//!
//! let spec = Specification {
//!     rules: vec![(
//!         "token".into(),
//!         LexerRule {
//!             parameters: vec![],
//!             clauses: vec![LexerClause {
//!                 pattern,
//!                 action: CodeFragment::new("NUM", span),
//!             }],
//!         },
//!     )],
//!     start_rule: "token".into(),
//!     ..Specification::default()
//! };
//!
//! let compiled = silex::compile(&spec, CompilationOptions::default()).unwrap();
//! let dfa = &compiled.rule("token").unwrap().dfa;
//!
//! // start state plus a single looping accept state
//! assert_eq!(dfa.state_count(), 2);
//! let accept = dfa.transitions.target(dfa.initial_state, '7' as u32).unwrap();
//! assert_eq!(dfa.transitions.target(accept, '3' as u32), Some(accept));
//! assert_eq!(dfa.rule_accepted_by_state.get(&accept), Some(&0));
//! ```
//!
//! ## Modules
//!
//! - [`charset`] - Code-point sets and the character universe
//! - [`regex`] - The regex IR, derivatives, canonicalization
//! - [`dfa`] - The DFA graph and the worklist builder
//! - [`spec`] - The specification AST consumed from the parser
//! - [`expand`] - Macro preprocessing and pattern validation
//! - [`compiler`] - Whole-specification compilation
//! - [`error`] - Accumulated compilation errors
//! - [`unicode`] - Unicode general-category sets
//! - [`intern`] - Name interning
//! - [`span`] - Source ranges

pub mod charset;
pub mod compiler;
pub mod dfa;
pub mod error;
pub mod expand;
pub mod intern;
pub mod regex;
pub mod span;
pub mod spec;
pub mod unicode;

// Re-export commonly used types
pub use charset::{CharSet, Universe};
pub use compiler::{compile, CompiledRule, CompiledSpecification};
pub use dfa::{rule_patterns_to_dfa, DfaStateId, LexerDfaGraph, LexerRuleDfa};
pub use error::{CompileError, CompileErrorKind};
pub use expand::{preprocess_macros, validate_clause, MacroEnv};
pub use intern::{InternedStr, Interner};
pub use regex::{Regex, RegularVector};
pub use span::Span;
pub use spec::{
    CodeFragment, CompilationOptions, LexerClause, LexerPattern, LexerRule, PatternKind,
    Specification,
};
