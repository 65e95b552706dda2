//! # DFA Construction
//!
//! The worklist algorithm turning a regular vector into a rule DFA.
//!
//! Each DFA state is a canonical regular vector. Starting from the
//! canonicalized input vector, the builder repeatedly picks an
//! unexplored state, partitions the universe into the vector's
//! derivative classes, derives once per class through an arbitrary
//! representative, and targets the state of the resulting vector,
//! allocating it on first sight. Canonicalization quotients the
//! vector space down to finitely many states, so the worklist
//! terminates (Brzozowski); an incomplete canonical form would only
//! cost redundant states, never correctness.

use hashbrown::{HashMap, HashSet};

use crate::charset::{CharSet, Universe};
use crate::dfa::graph::{DfaStateId, LexerDfaGraph};
use crate::regex::RegularVector;

/// The builder's working state for a single rule. Single-threaded;
/// consumed when the rule's DFA is assembled.
struct CompilationState {
    transitions: LexerDfaGraph,
    final_states: HashSet<DfaStateId, ahash::RandomState>,
    vec_to_state: HashMap<RegularVector, DfaStateId, ahash::RandomState>,
    state_to_vec: HashMap<DfaStateId, RegularVector, ahash::RandomState>,
}

impl CompilationState {
    fn new() -> Self {
        Self {
            transitions: LexerDfaGraph::new(),
            final_states: HashSet::default(),
            vec_to_state: HashMap::default(),
            state_to_vec: HashMap::default(),
        }
    }

    /// Allocate a state for a vector not seen before.
    fn create_dfa_state(&mut self, vector: RegularVector) -> DfaStateId {
        debug_assert!(
            !self.vec_to_state.contains_key(&vector),
            "state created twice for one vector"
        );
        let id = self.transitions.create_vertex();
        if vector.nullable() {
            self.final_states.insert(id);
        }
        self.vec_to_state.insert(vector.clone(), id);
        self.state_to_vec.insert(id, vector);
        id
    }
}

/// The compiled automaton of one rule.
#[derive(Debug, Clone)]
pub struct LexerRuleDfa {
    pub transitions: LexerDfaGraph,
    pub initial_state: DfaStateId,
    /// Accepting state → the lowest clause index accepting there.
    /// Lowest wins: clause order is declaration order, and earlier
    /// clauses take precedence on overlap.
    pub rule_accepted_by_state: HashMap<DfaStateId, usize, ahash::RandomState>,
    /// For each clause, every state in which it accepts (not only the
    /// ones where it wins). Kept for overlap diagnostics.
    pub clause_accepting_states: Vec<HashSet<DfaStateId, ahash::RandomState>>,
}

impl LexerRuleDfa {
    #[must_use]
    pub fn state_count(&self) -> u32 {
        self.transitions.vertex_count()
    }

    /// Clauses that accept somewhere but never win the minimum-index
    /// tie-break, i.e. clauses that can never match.
    #[must_use]
    pub fn shadowed_clauses(&self) -> Vec<usize> {
        let winners: HashSet<usize, ahash::RandomState> =
            self.rule_accepted_by_state.values().copied().collect();
        self.clause_accepting_states
            .iter()
            .enumerate()
            .filter(|(clause, states)| !states.is_empty() && !winners.contains(clause))
            .map(|(clause, _)| clause)
            .collect()
    }
}

/// Build the DFA for one rule from its clause-pattern vector.
///
/// The input vector need not be canonical; it is canonicalized
/// against `universe` before seeding the worklist.
#[must_use]
pub fn rule_patterns_to_dfa(vector: &RegularVector, universe: Universe) -> LexerRuleDfa {
    let mut state = CompilationState::new();

    let initial_vector = vector.canonicalize(universe);
    let clause_count = initial_vector.len();
    let initial_state = state.create_dfa_state(initial_vector);
    let mut pending = vec![initial_state];

    while let Some(current) = pending.pop() {
        let vector = state.state_to_vec[&current].clone();
        if vector.is_empty() {
            // the error sink has no outgoing edges
            continue;
        }

        // edges accumulated per target so several classes reaching
        // the same state merge into one labeled edge
        let mut accumulated: HashMap<DfaStateId, CharSet, ahash::RandomState> = HashMap::default();

        for class in vector.derivative_classes(universe) {
            let Some(representative) = class.min_element() else {
                continue;
            };
            let derived = vector.derivative(representative).canonicalize(universe);
            if derived.is_empty() {
                continue;
            }
            let target = match state.vec_to_state.get(&derived) {
                Some(&existing) => existing,
                None => {
                    let fresh = state.create_dfa_state(derived);
                    pending.push(fresh);
                    fresh
                }
            };
            match accumulated.entry(target) {
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    let merged = entry.get().union(&class);
                    entry.insert(merged);
                }
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(class);
                }
            }
        }

        for (target, label) in accumulated {
            state.transitions.add_edges(current, target, label);
        }
    }

    let mut rule_accepted_by_state: HashMap<DfaStateId, usize, ahash::RandomState> =
        HashMap::default();
    let mut clause_accepting_states: Vec<HashSet<DfaStateId, ahash::RandomState>> =
        (0..clause_count).map(|_| HashSet::default()).collect();
    for (&id, vector) in &state.state_to_vec {
        let accepting = vector.accepting();
        if let Some(&winner) = accepting.first() {
            rule_accepted_by_state.insert(id, winner);
        }
        for clause in accepting {
            clause_accepting_states[clause].insert(id);
        }
    }
    debug_assert_eq!(
        rule_accepted_by_state.len(),
        state.final_states.len(),
        "acceptance disagrees with final-state marking"
    );

    LexerRuleDfa {
        transitions: state.transitions,
        initial_state,
        rule_accepted_by_state,
        clause_accepting_states,
    }
}
