//! Kuhn's augmenting path algorithm for bipartite graphs.
//!
//! Left vertices are inserted one after another. For each of them a depth
//! first search looks for an augmenting path that ends in a free right vertex,
//! re-routing the partners of already matched right vertices along the way.
//! The search uses an explicit stack, so long augmenting paths do not grow the
//! call stack.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::graph::{Graph, Vertex};
use crate::matching::Matching;

/// Computes a matching with Kuhn's algorithm.
///
/// Only edges between `left` and `right` are considered. Left vertices are
/// tried in the given order and neighbors in adjacency order, so the result is
/// deterministic. Every left vertex that can be added by an augmenting path is
/// matched. The pairs are reported as `(left, right)` in the order of `left`.
#[instrument(skip_all, fields(left = left.len(), right = right.len()))]
pub fn augmenting_path_matching(left: &[Vertex], right: &[Vertex], graph: &Graph) -> Matching {
    let mut kuhn = Kuhn::new(left, right, graph);
    for v in 0..left.len() {
        kuhn.try_augment(v);
    }
    kuhn.into_matching()
}

/// Computes a matching that covers every vertex of `left`, if one exists.
///
/// Stops at the first left vertex that cannot be matched.
#[instrument(skip_all, fields(left = left.len(), right = right.len()))]
pub fn left_saturating_matching(left: &[Vertex], right: &[Vertex], graph: &Graph) -> Option<Matching> {
    if left.len() > right.len() {
        debug!("left side is larger than right side");
        return None;
    }
    let mut kuhn = Kuhn::new(left, right, graph);
    for v in 0..left.len() {
        if !kuhn.try_augment(v) {
            debug!(vertex = left[v], "no augmenting path");
            return None;
        }
    }
    Some(kuhn.into_matching())
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    left: usize,
    next: usize,
}

/// State of one matcher run. Nothing outlives [Kuhn::into_matching].
struct Kuhn<'a> {
    left: &'a [Vertex],
    right: &'a [Vertex],
    adjacency: Vec<Vec<usize>>,
    match_of_right: Vec<Option<usize>>,
    visited: Vec<bool>,
    stack: Vec<Frame>,
}

impl<'a> Kuhn<'a> {
    fn new(left: &'a [Vertex], right: &'a [Vertex], graph: &Graph) -> Self {
        let mut right_index = HashMap::with_capacity(right.len());
        for (i, &r) in right.iter().enumerate() {
            right_index.entry(r).or_insert(i);
        }
        let adjacency = left
            .iter()
            .map(|&v| graph.neighbors(v).filter_map(|w| right_index.get(&w).copied()).collect())
            .collect();
        Self {
            left,
            right,
            adjacency,
            match_of_right: vec![None; right.len()],
            visited: vec![false; right.len()],
            stack: Vec::new(),
        }
    }

    /// Searches an augmenting path starting at left vertex `root` and applies it.
    fn try_augment(&mut self, root: usize) -> bool {
        self.visited.fill(false);
        self.stack.clear();
        self.stack.push(Frame { left: root, next: 0 });

        while let Some(frame) = self.stack.last_mut() {
            let Some(&r) = self.adjacency[frame.left].get(frame.next) else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;
            if self.visited[r] {
                continue;
            }
            self.visited[r] = true;
            match self.match_of_right[r] {
                None => {
                    self.flip_path();
                    return true;
                }
                Some(owner) => {
                    trace!(left = self.left[owner], right = self.right[r], "re-routing");
                    self.stack.push(Frame { left: owner, next: 0 });
                }
            }
        }
        false
    }

    /// Every frame on the stack took the right vertex it advanced past last.
    /// Assigning each of them to their frame's left vertex shifts all partners
    /// along the path by one.
    fn flip_path(&mut self) {
        for frame in self.stack.drain(..) {
            let r = self.adjacency[frame.left][frame.next - 1];
            self.match_of_right[r] = Some(frame.left);
        }
    }

    fn into_matching(self) -> Matching {
        let mut match_of_left = vec![None; self.left.len()];
        for (r, l) in self.match_of_right.iter().enumerate() {
            if let Some(l) = *l {
                match_of_left[l] = Some(r);
            }
        }
        match_of_left
            .into_iter()
            .enumerate()
            .filter_map(|(l, r)| r.map(|r| (self.left[l], self.right[r])))
            .collect()
    }
}
