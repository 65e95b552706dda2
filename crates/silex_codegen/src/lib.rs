//! # Silex Codegen
//!
//! The back end of the silex lexer generator: consumes a
//! [`silex::CompiledSpecification`] and produces scanner source text.
//!
//! ## Overview
//!
//! - [`tables`] - combined transition/action tables with contiguous
//!   state numbering across rules
//! - [`emit`] - the source writer: header, tables, one dispatch
//!   function per rule, footer
//!
//! The emitted tables reserve [`SENTINEL`] (`u16::MAX`) for "no
//! transition" and "no accepting clause"; emission fails rather than
//! truncate when a specification would collide with it.

pub mod emit;
pub mod tables;

pub use emit::emit_scanner;
pub use tables::{build_tables, CodegenError, CombinedTables, RuleLayout, SENTINEL};
