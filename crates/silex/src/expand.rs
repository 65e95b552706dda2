//! # Macro Preprocessing and Pattern Validation
//!
//! Turns surface patterns into the regex IR: macro references are
//! inlined, extended forms (`+`, `?`, `.`, category escapes) are
//! rewritten to the core constructors, and the universe rules are
//! enforced. Macro definitions are processed strictly top-to-bottom,
//! so forward references are undefined references and recursion can
//! only be a self-reference.
//!
//! Validation accumulates errors instead of stopping: a macro that
//! fails to expand taints its name, and later references to a
//! tainted name expand to `∅` without a second diagnostic.
//!
//! Expansion output is *not* canonicalized; the DFA builder
//! canonicalizes once the universe is fixed.

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

#[cfg(test)]
use crate::charset::CharSet;
use crate::error::{CompileError, CompileErrorKind};
use crate::intern::{InternedStr, Interner};
use crate::regex::Regex;
use crate::spec::{CompilationOptions, LexerPattern, PatternKind};
use crate::unicode;

/// Largest code point that never needs the unicode option.
const ASCII_MAX: u32 = 0x7F;

/// The expanded macro environment.
#[derive(Debug, Default)]
pub struct MacroEnv {
    bindings: HashMap<InternedStr, Regex, ahash::RandomState>,
    bad: HashSet<InternedStr, ahash::RandomState>,
}

impl MacroEnv {
    /// The expansion of `name`, if it validated.
    #[must_use]
    pub fn get(&self, name: InternedStr) -> Option<&Regex> {
        self.bindings.get(&name)
    }

    /// Whether `name` failed to validate earlier. References to a
    /// tainted name expand to `∅` without another diagnostic.
    #[must_use]
    pub fn is_bad(&self, name: InternedStr) -> bool {
        self.bad.contains(&name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Result of preprocessing the macro section.
#[derive(Debug)]
pub struct PreprocessedMacros {
    pub env: MacroEnv,
    pub errors: Vec<CompileError>,
}

/// Validate and expand all macro definitions in source order.
#[must_use]
pub fn preprocess_macros(
    macros: &[(CompactString, LexerPattern)],
    options: CompilationOptions,
    symbols: &Interner,
) -> PreprocessedMacros {
    let mut env = MacroEnv::default();
    let mut errors = Vec::new();

    for (name, pattern) in macros {
        let id = symbols.intern(name);
        if env.bindings.contains_key(&id) || env.bad.contains(&id) {
            errors.push(CompileError::new(
                pattern.span,
                CompileErrorKind::DuplicateMacro { name: name.clone() },
            ));
            continue;
        }

        let mut local_errors = Vec::new();
        let regex = expand_pattern(
            pattern,
            &env,
            options,
            Some(id),
            symbols,
            &mut local_errors,
        );
        if local_errors.is_empty() {
            env.bindings.insert(id, regex);
        } else {
            env.bad.insert(id);
            errors.append(&mut local_errors);
        }
    }

    PreprocessedMacros { env, errors }
}

/// Validate and expand a rule clause pattern against a finished
/// macro environment.
pub fn validate_clause(
    pattern: &LexerPattern,
    env: &MacroEnv,
    options: CompilationOptions,
    symbols: &Interner,
) -> Result<Regex, Vec<CompileError>> {
    let mut errors = Vec::new();
    let regex = expand_pattern(pattern, env, options, None, symbols, &mut errors);
    if errors.is_empty() {
        Ok(regex)
    } else {
        Err(errors)
    }
}

/// The shared expansion walk. `current` is the macro being defined,
/// if any; a reference to it is the recursion error.
fn expand_pattern(
    pattern: &LexerPattern,
    env: &MacroEnv,
    options: CompilationOptions,
    current: Option<InternedStr>,
    symbols: &Interner,
    errors: &mut Vec<CompileError>,
) -> Regex {
    let span = pattern.span;
    match &pattern.kind {
        PatternKind::Epsilon => Regex::Epsilon,
        PatternKind::Empty => Regex::Empty,
        PatternKind::Any => Regex::Set(options.universe().charset()),
        PatternKind::EndOfFile => {
            errors.push(CompileError::new(span, CompileErrorKind::EndOfFileInRegex));
            Regex::Empty
        }
        PatternKind::Char(c) => {
            if !options.unicode && *c > ASCII_MAX {
                errors.push(CompileError::new(
                    span,
                    CompileErrorKind::UnicodeInAsciiMode,
                ));
                return Regex::Empty;
            }
            Regex::Char(*c)
        }
        PatternKind::Set(s) => {
            if !options.unicode && s.max_element().is_some_and(|max| max > ASCII_MAX) {
                errors.push(CompileError::new(
                    span,
                    CompileErrorKind::UnicodeInAsciiMode,
                ));
                return Regex::Empty;
            }
            Regex::Set(s.clone())
        }
        PatternKind::UnicodeCategory(code) => {
            if !options.unicode {
                errors.push(CompileError::new(
                    span,
                    CompileErrorKind::UnicodeInAsciiMode,
                ));
                return Regex::Empty;
            }
            match unicode::category_set(code) {
                Some(set) => Regex::Set(set),
                None => {
                    errors.push(CompileError::new(
                        span,
                        CompileErrorKind::UnknownUnicodeCategory { code: code.clone() },
                    ));
                    Regex::Empty
                }
            }
        }
        PatternKind::Macro(name) => {
            let id = symbols.intern(name);
            if current == Some(id) {
                errors.push(CompileError::new(
                    span,
                    CompileErrorKind::RecursiveMacro { name: name.clone() },
                ));
                return Regex::Empty;
            }
            if env.is_bad(id) {
                // already diagnosed at the definition site
                return Regex::Empty;
            }
            match env.get(id) {
                Some(regex) => regex.clone(),
                None => {
                    errors.push(CompileError::new(
                        span,
                        CompileErrorKind::UndefinedMacro { name: name.clone() },
                    ));
                    Regex::Empty
                }
            }
        }
        PatternKind::Not(p) => Regex::Not(Box::new(expand_pattern(
            p, env, options, current, symbols, errors,
        ))),
        PatternKind::Star(p) => Regex::Star(Box::new(expand_pattern(
            p, env, options, current, symbols, errors,
        ))),
        PatternKind::OneOrMore(p) => {
            // p+ = p · p*
            let inner = expand_pattern(p, env, options, current, symbols, errors);
            Regex::Concat(
                Box::new(inner.clone()),
                Box::new(Regex::Star(Box::new(inner))),
            )
        }
        PatternKind::Optional(p) => {
            // p? = ε ∨ p
            let inner = expand_pattern(p, env, options, current, symbols, errors);
            Regex::Or(Box::new(Regex::Epsilon), Box::new(inner))
        }
        PatternKind::Concat(p, q) => Regex::Concat(
            Box::new(expand_pattern(p, env, options, current, symbols, errors)),
            Box::new(expand_pattern(q, env, options, current, symbols, errors)),
        ),
        PatternKind::Or(p, q) => Regex::Or(
            Box::new(expand_pattern(p, env, options, current, symbols, errors)),
            Box::new(expand_pattern(q, env, options, current, symbols, errors)),
        ),
        PatternKind::And(p, q) => Regex::And(
            Box::new(expand_pattern(p, env, options, current, symbols, errors)),
            Box::new(expand_pattern(q, env, options, current, symbols, errors)),
        ),
        PatternKind::Repetition { .. } => {
            errors.push(CompileError::new(
                span,
                CompileErrorKind::UnsupportedRepetition,
            ));
            Regex::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Universe;
    use crate::span::Span;

    fn pat(kind: PatternKind) -> LexerPattern {
        LexerPattern::new(kind, Span::default())
    }

    fn pat_at(kind: PatternKind, offset: u32) -> LexerPattern {
        LexerPattern::new(kind, Span::at(offset, 1))
    }

    fn ch(c: char) -> LexerPattern {
        pat(PatternKind::Char(c as u32))
    }

    fn mac(name: &str) -> LexerPattern {
        pat(PatternKind::Macro(name.into()))
    }

    fn preprocess(
        macros: Vec<(&str, LexerPattern)>,
        options: CompilationOptions,
    ) -> (PreprocessedMacros, Interner) {
        let symbols = Interner::new();
        let macros: Vec<(CompactString, LexerPattern)> = macros
            .into_iter()
            .map(|(name, pattern)| (name.into(), pattern))
            .collect();
        let out = preprocess_macros(&macros, options, &symbols);
        (out, symbols)
    }

    #[test]
    fn test_simple_macro_expands() {
        let (out, symbols) = preprocess(
            vec![("digit", pat(PatternKind::Set(CharSet::of_range('0' as u32, '9' as u32))))],
            CompilationOptions::default(),
        );
        assert!(out.errors.is_empty());
        let digit = symbols.get("digit").expect("interned");
        assert_eq!(
            out.env.get(digit),
            Some(&Regex::Set(CharSet::of_range('0' as u32, '9' as u32)))
        );
    }

    #[test]
    fn test_macro_reference_inlines_prior_binding() {
        let (out, symbols) = preprocess(
            vec![
                ("a", ch('a')),
                ("b", pat(PatternKind::Concat(Box::new(mac("a")), Box::new(ch('b'))))),
            ],
            CompilationOptions::default(),
        );
        assert!(out.errors.is_empty());
        let b = symbols.get("b").expect("interned");
        assert_eq!(
            out.env.get(b),
            Some(&Regex::Concat(
                Box::new(Regex::Char('a' as u32)),
                Box::new(Regex::Char('b' as u32))
            ))
        );
    }

    #[test]
    fn test_duplicate_macro_keeps_prior_binding() {
        let (out, symbols) = preprocess(
            vec![("a", ch('a')), ("a", ch('b'))],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].kind,
            CompileErrorKind::DuplicateMacro { name: "a".into() }
        );
        let a = symbols.get("a").expect("interned");
        assert_eq!(out.env.get(a), Some(&Regex::Char('a' as u32)));
    }

    #[test]
    fn test_recursive_macro_rejected() {
        let (out, _) = preprocess(
            vec![(
                "m",
                pat(PatternKind::Concat(Box::new(mac("m")), Box::new(ch('a')))),
            )],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].kind,
            CompileErrorKind::RecursiveMacro { name: "m".into() }
        );
    }

    #[test]
    fn test_forward_reference_is_undefined() {
        let (out, _) = preprocess(
            vec![("a", mac("later")), ("later", ch('x'))],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].kind,
            CompileErrorKind::UndefinedMacro {
                name: "later".into()
            }
        );
    }

    #[test]
    fn test_bad_macro_reference_stays_silent() {
        // "bad" fails; a later reference to it must not re-report
        let (out, symbols) = preprocess(
            vec![
                ("bad", mac("missing")),
                ("user", pat(PatternKind::Star(Box::new(mac("bad"))))),
            ],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].kind,
            CompileErrorKind::UndefinedMacro {
                name: "missing".into()
            }
        );
        // the reference collapsed to ∅ inside the star
        let user = symbols.get("user").expect("interned");
        assert_eq!(
            out.env.get(user),
            Some(&Regex::Star(Box::new(Regex::Empty)))
        );
    }

    #[test]
    fn test_non_ascii_char_needs_unicode_option() {
        let (out, _) = preprocess(
            vec![("e", pat_at(PatternKind::Char(0x00E9), 12))],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, CompileErrorKind::UnicodeInAsciiMode);
        assert_eq!(out.errors[0].span.start(), 12);

        let (out, _) = preprocess(
            vec![("e", pat(PatternKind::Char(0x00E9)))],
            CompilationOptions { unicode: true },
        );
        assert!(out.errors.is_empty());
    }

    #[test]
    fn test_non_ascii_set_needs_unicode_option() {
        let set = CharSet::of_range(0x20, 0x2028);
        let (out, _) = preprocess(
            vec![("s", pat(PatternKind::Set(set)))],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, CompileErrorKind::UnicodeInAsciiMode);
    }

    #[test]
    fn test_category_requires_unicode_option() {
        let (out, _) = preprocess(
            vec![("u", pat(PatternKind::UnicodeCategory("Lu".into())))],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, CompileErrorKind::UnicodeInAsciiMode);

        let (out, symbols) = preprocess(
            vec![("u", pat(PatternKind::UnicodeCategory("Lu".into())))],
            CompilationOptions { unicode: true },
        );
        assert!(out.errors.is_empty());
        let u = symbols.get("u").expect("interned");
        match out.env.get(u) {
            Some(Regex::Set(s)) => assert!(s.contains('A' as u32)),
            other => panic!("expected a set, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category() {
        let (out, _) = preprocess(
            vec![("u", pat(PatternKind::UnicodeCategory("Zz".into())))],
            CompilationOptions { unicode: true },
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].kind,
            CompileErrorKind::UnknownUnicodeCategory { code: "Zz".into() }
        );
    }

    #[test]
    fn test_one_or_more_rewrite() {
        let (out, symbols) = preprocess(
            vec![("d", pat(PatternKind::OneOrMore(Box::new(ch('x')))))],
            CompilationOptions::default(),
        );
        assert!(out.errors.is_empty());
        let d = symbols.get("d").expect("interned");
        assert_eq!(
            out.env.get(d),
            Some(&Regex::Concat(
                Box::new(Regex::Char('x' as u32)),
                Box::new(Regex::Star(Box::new(Regex::Char('x' as u32))))
            ))
        );
    }

    #[test]
    fn test_optional_rewrite() {
        let (out, symbols) = preprocess(
            vec![("d", pat(PatternKind::Optional(Box::new(ch('x')))))],
            CompilationOptions::default(),
        );
        assert!(out.errors.is_empty());
        let d = symbols.get("d").expect("interned");
        let expanded = out.env.get(d).expect("bound");
        assert!(expanded.nullable());
        assert_eq!(
            expanded,
            &Regex::Or(
                Box::new(Regex::Epsilon),
                Box::new(Regex::Char('x' as u32))
            )
        );
    }

    #[test]
    fn test_any_rewrites_to_universe_set() {
        let (out, symbols) = preprocess(
            vec![("dot", pat(PatternKind::Any))],
            CompilationOptions::default(),
        );
        assert!(out.errors.is_empty());
        let dot = symbols.get("dot").expect("interned");
        assert_eq!(
            out.env.get(dot),
            Some(&Regex::Set(Universe::Ascii.charset()))
        );
    }

    #[test]
    fn test_repetition_rejected() {
        let (out, _) = preprocess(
            vec![(
                "r",
                pat(PatternKind::Repetition {
                    inner: Box::new(ch('a')),
                    lo: Some(2),
                    hi: Some(4),
                }),
            )],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, CompileErrorKind::UnsupportedRepetition);
    }

    #[test]
    fn test_eof_rejected_inside_regex() {
        let (out, _) = preprocess(
            vec![(
                "e",
                pat(PatternKind::Concat(
                    Box::new(ch('a')),
                    Box::new(pat(PatternKind::EndOfFile)),
                )),
            )],
            CompilationOptions::default(),
        );
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, CompileErrorKind::EndOfFileInRegex);
    }

    #[test]
    fn test_validate_clause_uses_env() {
        let symbols = Interner::new();
        let macros: Vec<(CompactString, LexerPattern)> =
            vec![("digit".into(), pat(PatternKind::Set(CharSet::of_range('0' as u32, '9' as u32))))];
        let out = preprocess_macros(&macros, CompilationOptions::default(), &symbols);
        assert!(out.errors.is_empty());

        let clause = pat(PatternKind::OneOrMore(Box::new(mac("digit"))));
        let regex = validate_clause(&clause, &out.env, CompilationOptions::default(), &symbols)
            .expect("validates");
        assert!(!regex.nullable());

        let broken = mac("nope");
        let errors =
            validate_clause(&broken, &out.env, CompilationOptions::default(), &symbols)
                .expect_err("undefined");
        assert_eq!(errors.len(), 1);
    }
}
