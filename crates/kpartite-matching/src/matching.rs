use std::collections::HashSet;

use crate::graph::{Graph, Vertex};

/// A set of vertex pairs in which no vertex occurs twice.
///
/// Pairs are kept in the order they were found.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Matching {
    pairs: Vec<(Vertex, Vertex)>,
}

impl Matching {
    /// Create an empty matching.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, u: Vertex, v: Vertex) {
        self.pairs.push((u, v));
    }

    /// Append the pairs of `other`. The two matchings must be vertex disjoint.
    pub fn extend(&mut self, other: Matching) {
        self.pairs.extend(other.pairs);
    }

    /// Number of matched pairs.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns whether no pair is matched.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the matched pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.pairs.iter().copied()
    }

    /// The vertex matched with `v`, if any.
    pub fn partner(&self, v: Vertex) -> Option<Vertex> {
        self.pairs.iter().find_map(|&(a, b)| {
            if a == v {
                Some(b)
            } else if b == v {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Returns whether `v` is matched.
    pub fn contains(&self, v: Vertex) -> bool {
        self.partner(v).is_some()
    }

    /// Returns whether every pair is an edge of `graph` and no vertex is used twice.
    pub fn is_valid_in(&self, graph: &Graph) -> bool {
        let mut seen = HashSet::with_capacity(2 * self.len());
        self.iter().all(|(u, v)| graph.contains_edge(u, v) && seen.insert(u) && seen.insert(v))
    }

    /// Consumes the matching, returning its pairs.
    pub fn into_pairs(self) -> Vec<(Vertex, Vertex)> {
        self.pairs
    }
}

impl FromIterator<(Vertex, Vertex)> for Matching {
    fn from_iter<T: IntoIterator<Item = (Vertex, Vertex)>>(iter: T) -> Self {
        Self { pairs: iter.into_iter().collect() }
    }
}
