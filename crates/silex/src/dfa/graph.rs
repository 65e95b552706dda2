//! The labeled multigraph underlying a rule's DFA.

use hashbrown::HashMap;
use std::fmt;

use crate::charset::CharSet;

/// Opaque identifier of a DFA state. Two ids are equal iff they name
/// the same regular vector; the builder guarantees this by looking
/// vectors up before allocating.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DfaStateId(u32);

impl DfaStateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DfaStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl fmt::Display for DfaStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Vertices plus `(source, target) → CharSet` adjacency.
///
/// By construction the labels on distinct outgoing edges of one
/// source are pairwise disjoint and their union is a subset of the
/// universe. No reverse-edge index is kept.
#[derive(Clone, Debug, Default)]
pub struct LexerDfaGraph {
    vertex_count: u32,
    edges: HashMap<(DfaStateId, DfaStateId), CharSet, ahash::RandomState>,
}

impl LexerDfaGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh vertex.
    pub fn create_vertex(&mut self) -> DfaStateId {
        let id = DfaStateId(self.vertex_count);
        self.vertex_count += 1;
        id
    }

    /// Union `label` into the edge `source → target`.
    pub fn add_edges(&mut self, source: DfaStateId, target: DfaStateId, label: CharSet) {
        match self.edges.entry((source, target)) {
            hashbrown::hash_map::Entry::Occupied(mut entry) => {
                let merged = entry.get().union(&label);
                entry.insert(merged);
            }
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(label);
            }
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The label on `source → target`, if the edge exists.
    #[must_use]
    pub fn edge(&self, source: DfaStateId, target: DfaStateId) -> Option<&CharSet> {
        self.edges.get(&(source, target))
    }

    /// All edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = (DfaStateId, DfaStateId, &CharSet)> {
        self.edges.iter().map(|(&(src, dst), set)| (src, dst, set))
    }

    /// Outgoing edges of `source`, in no particular order.
    pub fn outgoing(&self, source: DfaStateId) -> impl Iterator<Item = (DfaStateId, &CharSet)> {
        self.edges.iter().filter_map(move |(&(src, dst), set)| {
            if src == source {
                Some((dst, set))
            } else {
                None
            }
        })
    }

    /// The state reached from `source` on `c`, if any. At most one
    /// exists because outgoing labels are disjoint.
    #[must_use]
    pub fn target(&self, source: DfaStateId, c: u32) -> Option<DfaStateId> {
        self.outgoing(source)
            .find(|(_, set)| set.contains(c))
            .map(|(dst, _)| dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_vertex_is_fresh() {
        let mut graph = LexerDfaGraph::new();
        let a = graph.create_vertex();
        let b = graph.create_vertex();
        assert_ne!(a, b);
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn test_add_edges_unions_labels() {
        let mut graph = LexerDfaGraph::new();
        let a = graph.create_vertex();
        let b = graph.create_vertex();
        graph.add_edges(a, b, CharSet::of_range(1, 3));
        graph.add_edges(a, b, CharSet::of_range(5, 7));
        assert_eq!(graph.edge_count(), 1);
        let label = graph.edge(a, b).expect("edge");
        assert_eq!(label.ranges(), &[(1, 3), (5, 7)]);
    }

    #[test]
    fn test_target_lookup() {
        let mut graph = LexerDfaGraph::new();
        let a = graph.create_vertex();
        let b = graph.create_vertex();
        let c = graph.create_vertex();
        graph.add_edges(a, b, CharSet::singleton(10));
        graph.add_edges(a, c, CharSet::singleton(20));
        assert_eq!(graph.target(a, 10), Some(b));
        assert_eq!(graph.target(a, 20), Some(c));
        assert_eq!(graph.target(a, 30), None);
        assert_eq!(graph.target(b, 10), None);
    }
}
