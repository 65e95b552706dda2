//! # Error Types
//!
//! Compilation errors for the lexer generator.
//!
//! Errors are accumulated rather than thrown: a failing macro taints
//! its name so later references stay silent, a failing rule does not
//! stop other rules, and callers receive the whole list in one shot.
//! When the `diagnostics` feature is enabled, errors integrate with
//! [`miette`] for rich reporting against the specification source.

use compact_str::CompactString;
use thiserror::Error;

use crate::span::Span;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A compilation error with the source range it arose at.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{kind}")]
pub struct CompileError {
    #[cfg_attr(feature = "diagnostics", label)]
    pub span: Span,
    #[source]
    pub kind: CompileErrorKind,
}

impl CompileError {
    #[must_use]
    pub fn new(span: Span, kind: CompileErrorKind) -> Self {
        Self { span, kind }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub const fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }
}

/// The kinds of compilation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum CompileErrorKind {
    #[error("duplicate definition of macro '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::duplicate_macro)))]
    DuplicateMacro { name: CompactString },

    #[error("recursive macros are not allowed: '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::recursive_macro)))]
    RecursiveMacro { name: CompactString },

    #[error("reference to undefined macro '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::undefined_macro)))]
    UndefinedMacro { name: CompactString },

    #[error("non-ASCII pattern requires the unicode option")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::unicode_in_ascii_mode)))]
    UnicodeInAsciiMode,

    #[error("unknown Unicode category '{code}'")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(silex::unknown_unicode_category))
    )]
    UnknownUnicodeCategory { code: CompactString },

    #[error("end-of-file marker cannot appear inside a regular expression")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::eof_in_regex)))]
    EndOfFileInRegex,

    #[error("bounded repetition is not supported")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(silex::unsupported_repetition)))]
    UnsupportedRepetition,
}
