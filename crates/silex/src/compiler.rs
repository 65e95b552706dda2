//! # Specification Compiler
//!
//! Orchestrates a whole compilation: macro preprocessing first (it is
//! order-dependent and must run sequentially), then every rule
//! independently validated, vectorized and driven through the DFA
//! builder. Rules share nothing but the immutable macro environment
//! and options, so rule compilation is a data-parallel map; results
//! are joined back in declaration order regardless of completion
//! order.
//!
//! Compilation never yields partial output: any error anywhere fails
//! the whole run with the accumulated error list.

use compact_str::CompactString;

use crate::dfa::{rule_patterns_to_dfa, LexerRuleDfa};
use crate::error::CompileError;
use crate::expand::{preprocess_macros, validate_clause, MacroEnv};
use crate::intern::Interner;
use crate::regex::RegularVector;
use crate::spec::{CodeFragment, CompilationOptions, LexerRule, Specification};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A compiled rule: its DFA plus the per-clause action fragments in
/// clause order.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub parameters: Vec<CompactString>,
    pub dfa: LexerRuleDfa,
    pub clause_actions: Vec<CodeFragment>,
}

/// The output handed to the code emitter. Rules keep their
/// declaration order; the emitter relies on it to lay out contiguous
/// combined state-id ranges.
#[derive(Debug, Clone)]
pub struct CompiledSpecification {
    pub header: Option<CodeFragment>,
    pub footer: Option<CodeFragment>,
    rules: Vec<(CompactString, CompiledRule)>,
    pub start_rule: CompactString,
}

impl CompiledSpecification {
    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &CompiledRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.rules
            .iter()
            .find(|(rule_name, _)| rule_name == name)
            .map(|(_, rule)| rule)
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Compile a specification into per-rule DFAs.
///
/// # Errors
///
/// Returns every accumulated [`CompileError`] when macros or any rule
/// fail to validate. Macro errors abort before rule compilation; rule
/// errors are collected across all rules.
pub fn compile(
    spec: &Specification,
    options: CompilationOptions,
) -> Result<CompiledSpecification, Vec<CompileError>> {
    let symbols = Interner::new();

    let preprocessed = preprocess_macros(&spec.macros, options, &symbols);
    if !preprocessed.errors.is_empty() {
        return Err(preprocessed.errors);
    }
    let env = preprocessed.env;

    let compiled = compile_rules(&spec.rules, &env, options, &symbols);

    let mut errors = Vec::new();
    let mut rules = Vec::with_capacity(spec.rules.len());
    for ((name, _), result) in spec.rules.iter().zip(compiled) {
        match result {
            Ok(rule) => rules.push((name.clone(), rule)),
            Err(mut rule_errors) => errors.append(&mut rule_errors),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CompiledSpecification {
        header: spec.header.clone(),
        footer: spec.footer.clone(),
        rules,
        start_rule: spec.start_rule.clone(),
    })
}

#[cfg(feature = "parallel")]
fn compile_rules(
    rules: &[(CompactString, LexerRule)],
    env: &MacroEnv,
    options: CompilationOptions,
    symbols: &Interner,
) -> Vec<Result<CompiledRule, Vec<CompileError>>> {
    rules
        .par_iter()
        .map(|(_, rule)| compile_rule(rule, env, options, symbols))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compile_rules(
    rules: &[(CompactString, LexerRule)],
    env: &MacroEnv,
    options: CompilationOptions,
    symbols: &Interner,
) -> Vec<Result<CompiledRule, Vec<CompileError>>> {
    rules
        .iter()
        .map(|(_, rule)| compile_rule(rule, env, options, symbols))
        .collect()
}

/// Compile a single rule: validate every clause, vectorize in
/// declaration order, build the DFA.
fn compile_rule(
    rule: &LexerRule,
    env: &MacroEnv,
    options: CompilationOptions,
    symbols: &Interner,
) -> Result<CompiledRule, Vec<CompileError>> {
    // the parser prepends clauses as it reduces them, so the stored
    // order is reversed from the declaration order
    let clauses: Vec<_> = rule.clauses.iter().rev().collect();

    let mut errors = Vec::new();
    let mut regexes = Vec::with_capacity(clauses.len());
    for clause in &clauses {
        match validate_clause(&clause.pattern, env, options, symbols) {
            Ok(regex) => regexes.push(regex),
            Err(mut clause_errors) => errors.append(&mut clause_errors),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let vector: RegularVector = regexes.into_iter().collect();
    let dfa = rule_patterns_to_dfa(&vector, options.universe());

    Ok(CompiledRule {
        parameters: rule.parameters.clone(),
        dfa,
        clause_actions: clauses.iter().map(|c| c.action.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{LexerClause, LexerPattern, PatternKind};
    use crate::span::Span;

    fn pat(kind: PatternKind) -> LexerPattern {
        LexerPattern::new(kind, Span::default())
    }

    fn ch(c: char) -> LexerPattern {
        pat(PatternKind::Char(c as u32))
    }

    fn clause(pattern: LexerPattern, action: &str) -> LexerClause {
        LexerClause {
            pattern,
            action: CodeFragment::new(action, Span::default()),
        }
    }

    /// Build a rule from clauses in *declaration* order, storing them
    /// parser-style (reversed).
    fn rule(clauses: Vec<LexerClause>) -> LexerRule {
        LexerRule {
            parameters: Vec::new(),
            clauses: clauses.into_iter().rev().collect(),
        }
    }

    #[test]
    fn test_clause_order_is_declaration_order() {
        let spec = Specification {
            rules: vec![(
                "token".into(),
                rule(vec![clause(ch('a'), "A"), clause(ch('b'), "B")]),
            )],
            start_rule: "token".into(),
            ..Specification::default()
        };
        let compiled = compile(&spec, CompilationOptions::default()).expect("compiles");
        let rule = compiled.rule("token").expect("rule exists");
        assert_eq!(rule.clause_actions[0].text, "A");
        assert_eq!(rule.clause_actions[1].text, "B");

        // clause 0 is the 'a' clause
        let dfa = &rule.dfa;
        let s = dfa
            .transitions
            .target(dfa.initial_state, 'a' as u32)
            .expect("edge on a");
        assert_eq!(dfa.rule_accepted_by_state.get(&s), Some(&0));
    }

    #[test]
    fn test_rule_order_is_preserved() {
        let spec = Specification {
            rules: vec![
                ("first".into(), rule(vec![clause(ch('a'), "A")])),
                ("second".into(), rule(vec![clause(ch('b'), "B")])),
                ("third".into(), rule(vec![clause(ch('c'), "C")])),
            ],
            start_rule: "first".into(),
            ..Specification::default()
        };
        let compiled = compile(&spec, CompilationOptions::default()).expect("compiles");
        let names: Vec<&str> = compiled.rules().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(compiled.start_rule, "first");
    }

    #[test]
    fn test_macro_errors_abort_before_rules() {
        // the rule references a macro that *would* resolve, but the
        // duplicate definition must stop compilation first
        let spec = Specification {
            macros: vec![("a".into(), ch('a')), ("a".into(), ch('b'))],
            rules: vec![(
                "token".into(),
                rule(vec![clause(pat(PatternKind::Macro("a".into())), "A")]),
            )],
            start_rule: "token".into(),
            ..Specification::default()
        };
        let errors = compile(&spec, CompilationOptions::default()).expect_err("macro error");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_failing_rule_does_not_stop_others() {
        let spec = Specification {
            rules: vec![
                (
                    "broken".into(),
                    rule(vec![clause(pat(PatternKind::Macro("nope".into())), "X")]),
                ),
                ("fine".into(), rule(vec![clause(ch('a'), "A")])),
                (
                    "also_broken".into(),
                    rule(vec![clause(
                        pat(PatternKind::Repetition {
                            inner: Box::new(ch('a')),
                            lo: None,
                            hi: Some(3),
                        }),
                        "Y",
                    )]),
                ),
            ],
            start_rule: "fine".into(),
            ..Specification::default()
        };
        let errors = compile(&spec, CompilationOptions::default()).expect_err("rule errors");
        // both broken rules report; the healthy one compiled but the
        // result is withheld (no partial output)
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_header_footer_carried_verbatim() {
        let spec = Specification {
            header: Some(CodeFragment::new("use tokens::*;", Span::default())),
            footer: Some(CodeFragment::new("// end", Span::default())),
            rules: vec![("token".into(), rule(vec![clause(ch('a'), "A")]))],
            start_rule: "token".into(),
            ..Specification::default()
        };
        let compiled = compile(&spec, CompilationOptions::default()).expect("compiles");
        assert_eq!(compiled.header.as_ref().map(|f| f.text.as_str()), Some("use tokens::*;"));
        assert_eq!(compiled.footer.as_ref().map(|f| f.text.as_str()), Some("// end"));
    }

    #[test]
    fn test_parameters_carried() {
        let spec = Specification {
            rules: vec![(
                "token".into(),
                LexerRule {
                    parameters: vec!["depth".into()],
                    clauses: vec![clause(ch('a'), "A")],
                },
            )],
            start_rule: "token".into(),
            ..Specification::default()
        };
        let compiled = compile(&spec, CompilationOptions::default()).expect("compiles");
        let rule = compiled.rule("token").expect("rule exists");
        assert_eq!(rule.parameters, vec![CompactString::from("depth")]);
    }
}
