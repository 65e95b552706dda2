//! # Combined Table Layout
//!
//! Flattens the per-rule DFAs of a [`CompiledSpecification`] into the
//! two tables a generated scanner indexes at run time:
//!
//! - `trans[S][c]`: the combined target state for state `S` on
//!   character `c`, or [`SENTINEL`] when the input is not accepted.
//! - `actions[S]`: the clause index accepted in `S`, or [`SENTINEL`].
//!
//! Rules are laid out in declaration order; each rule's local state
//! ids are offset by the cumulative state count of all earlier rules.
//! The table is only as wide as the largest character appearing on
//! any edge, not the whole universe.

use thiserror::Error;

use silex::CompiledSpecification;

/// Reserved table entry meaning "no transition" / "no accept".
pub const SENTINEL: u16 = u16::MAX;

/// Table construction errors. Emission is all-or-nothing; no tables
/// are produced alongside an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("combined automaton has {count} states; the sentinel limits tables to {max}", max = SENTINEL)]
    TooManyStates { count: u64 },

    #[error("clause index {index} does not fit the action table")]
    TooManyClauses { index: usize },
}

/// Where one rule landed in the combined numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLayout {
    pub name: String,
    /// Added to the rule's local state ids.
    pub offset: u16,
    pub state_count: u16,
    /// Combined id of the rule's initial state.
    pub initial_state: u16,
}

/// The combined transition and action tables.
#[derive(Debug, Clone)]
pub struct CombinedTables {
    /// `trans[S][c]`, `S` combined, `c` in `0..=max_char`.
    pub trans: Vec<Vec<u16>>,
    /// `actions[S]`.
    pub actions: Vec<u16>,
    /// The widest character on any edge; table rows have
    /// `max_char + 1` columns.
    pub max_char: u32,
    /// Per-rule placement, in declaration order.
    pub layouts: Vec<RuleLayout>,
}

impl CombinedTables {
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.trans.len()
    }

    /// The layout of `rule`, if present.
    #[must_use]
    pub fn layout(&self, rule: &str) -> Option<&RuleLayout> {
        self.layouts.iter().find(|l| l.name == rule)
    }
}

/// Lay out all rule DFAs into combined tables.
///
/// # Errors
///
/// Fails when the combined state count or a clause index collides
/// with the sentinel domain.
pub fn build_tables(spec: &CompiledSpecification) -> Result<CombinedTables, CodegenError> {
    let total_states: u64 = spec
        .rules()
        .map(|(_, rule)| u64::from(rule.dfa.state_count()))
        .sum();
    // ids run 0..total_states, so exactly SENTINEL states still fit:
    // the largest id is SENTINEL - 1
    if total_states > u64::from(SENTINEL) {
        return Err(CodegenError::TooManyStates {
            count: total_states,
        });
    }

    let max_char = spec
        .rules()
        .flat_map(|(_, rule)| rule.dfa.transitions.edges())
        .filter_map(|(_, _, label)| label.max_element())
        .max()
        .unwrap_or(0);
    let width = max_char as usize + 1;

    let mut trans = vec![vec![SENTINEL; width]; total_states as usize];
    let mut actions = vec![SENTINEL; total_states as usize];
    let mut layouts = Vec::with_capacity(spec.rule_count());

    let mut offset: u16 = 0;
    for (name, rule) in spec.rules() {
        let dfa = &rule.dfa;

        for (src, dst, label) in dfa.transitions.edges() {
            let row = &mut trans[offset as usize + src.index()];
            let target = offset + dst.as_u32() as u16;
            for &(lo, hi) in label.ranges() {
                for c in lo..=hi {
                    row[c as usize] = target;
                }
            }
        }

        for (state, &clause) in &dfa.rule_accepted_by_state {
            if clause >= usize::from(SENTINEL) {
                return Err(CodegenError::TooManyClauses { index: clause });
            }
            actions[offset as usize + state.index()] = clause as u16;
        }

        let state_count = dfa.state_count() as u16;
        layouts.push(RuleLayout {
            name: name.to_owned(),
            offset,
            state_count,
            initial_state: offset + dfa.initial_state.as_u32() as u16,
        });
        offset += state_count;
    }

    Ok(CombinedTables {
        trans,
        actions,
        max_char,
        layouts,
    })
}
