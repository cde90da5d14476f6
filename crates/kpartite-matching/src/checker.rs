use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::graph::{build, Edge, KPartiteGraph, MalformedInput, PartIndex, Vertex};
use crate::kuhn::left_saturating_matching;
use crate::reduce::{reduce, Reduction};

/// Which partition pairs have to be matched.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Policy {
    /// Every partition has to be saturated into the following one.
    #[default]
    AdjacentPairs,
    /// For every two partitions, the smaller one has to be saturated into the
    /// larger one. On ties the earlier partition is saturated.
    AllPairs,
}

/// Options of [is_perfect] and [Prepared::check].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CheckConfig {
    /// Which partition pairs are checked.
    pub policy: Policy,
    /// Run the forced-edge reduction on balanced pairs before searching.
    pub reduce: bool,
    /// Check the partition pairs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { policy: Policy::default(), reduce: true, parallel: false }
    }
}

impl CheckConfig {
    /// Default options with the given policy.
    pub fn new(policy: Policy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Enable or disable the forced-edge reduction.
    pub fn with_reduce(self, reduce: bool) -> Self {
        Self { reduce, ..self }
    }

    /// Enable or disable parallel evaluation of partition pairs.
    pub fn with_parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }
}

/// Result of a perfect matching check.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Check {
    /// Number of partitions.
    pub k: usize,
    /// Size of the first partition.
    pub reference_size: usize,
    /// Whether every required partition pair has a saturating matching.
    pub perfect: bool,
}

/// A validated input, ready to be checked.
#[derive(Clone, Debug)]
pub struct Prepared {
    graph: KPartiteGraph,
}

/// Validates the input and builds its adjacency.
///
/// # Errors
///
/// Returns [MalformedInput] if the input does not describe a k-partite graph.
pub fn prepare(partitions: &[Vec<Vertex>], edges: &[Edge]) -> Result<Prepared, MalformedInput> {
    Ok(Prepared { graph: build(partitions, edges)? })
}

/// Decides whether the k-partite graph has a perfect matching under `config`.
///
/// ```rust
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use kpartite_matching::{is_perfect, CheckConfig, Policy};
///
/// let partitions = [vec![1, 2], vec![3, 4], vec![5, 6]];
/// let edges = [(1, 3), (2, 4), (3, 5), (4, 6)];
/// let check = is_perfect(&partitions, &edges, &CheckConfig::new(Policy::AdjacentPairs))?;
///
/// assert_eq!((check.k, check.reference_size, check.perfect), (3, 2, true));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [MalformedInput] if the input does not describe a k-partite graph.
pub fn is_perfect(
    partitions: &[Vec<Vertex>],
    edges: &[Edge],
    config: &CheckConfig,
) -> Result<Check, MalformedInput> {
    Ok(prepare(partitions, edges)?.check(config))
}

impl Prepared {
    /// The validated graph.
    pub fn graph(&self) -> &KPartiteGraph {
        &self.graph
    }

    /// Checks every partition pair required by the policy.
    ///
    /// Stops at the first pair without a saturating matching. With fewer than
    /// two partitions nothing has to be matched and the graph is perfect.
    #[instrument(skip_all, fields(policy = ?config.policy))]
    pub fn check(&self, config: &CheckConfig) -> Check {
        let k = self.graph.k();
        let reference_size = self.graph.partitions().first().map_or(0, Vec::len);
        let pairs = self.pairs(config.policy);

        let has_matching = |&(left, right): &(PartIndex, PartIndex)| pair_has_matching(&self.graph, left, right, config.reduce);
        let perfect =
            if config.parallel { pairs.par_iter().all(has_matching) } else { pairs.iter().all(has_matching) };

        info!(k, reference_size, pairs = pairs.len(), perfect);
        Check { k, reference_size, perfect }
    }

    /// The `(left, right)` partition pairs in checking order.
    fn pairs(&self, policy: Policy) -> Vec<(PartIndex, PartIndex)> {
        let k = self.graph.k();
        match policy {
            Policy::AdjacentPairs => (1..k).map(|j| (PartIndex::new(j - 1), PartIndex::new(j))).collect(),
            Policy::AllPairs => {
                let mut pairs = Vec::with_capacity(k * k.saturating_sub(1) / 2);
                for i in 0..k {
                    for j in i + 1..k {
                        let (a, b) = (PartIndex::new(i), PartIndex::new(j));
                        if self.graph.partition(a).len() <= self.graph.partition(b).len() {
                            pairs.push((a, b));
                        } else {
                            pairs.push((b, a));
                        }
                    }
                }
                pairs
            }
        }
    }
}

/// Returns whether partition `left` can be saturated into partition `right`.
fn pair_has_matching(graph: &KPartiteGraph, left: PartIndex, right: PartIndex, reduce_first: bool) -> bool {
    let (left_vertices, right_vertices) = (graph.partition(left), graph.partition(right));
    if left_vertices.len() > right_vertices.len() {
        debug!(%left, %right, "left partition is larger");
        return false;
    }

    let subgraph = graph.induced_subgraph(left, right);

    // The degree rules assume both sides get covered.
    if !reduce_first || left_vertices.len() != right_vertices.len() {
        let found = left_saturating_matching(left_vertices, right_vertices, &subgraph).is_some();
        debug!(%left, %right, found);
        return found;
    }

    match reduce(subgraph) {
        Reduction::Infeasible { vertex } => {
            debug!(%left, %right, vertex, "isolated vertex");
            false
        }
        Reduction::FullyResolved(forced) => {
            debug!(%left, %right, forced = forced.len(), "resolved by forced edges");
            true
        }
        Reduction::Reduced { graph: rest, forced } => {
            let remaining = |side: &[Vertex]| -> Vec<Vertex> {
                side.iter().copied().filter(|&v| rest.contains_vertex(v)).collect()
            };
            let (left_rest, right_rest) = (remaining(left_vertices), remaining(right_vertices));
            let matching = left_saturating_matching(&left_rest, &right_rest, &rest);
            debug!(%left, %right, forced = forced.len(), remaining = left_rest.len(), found = matching.is_some());
            matching.is_some()
        }
    }
}
