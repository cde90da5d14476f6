use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::graph::{Graph, Vertex};
use crate::matching::Matching;

/// Outcome of [reduce].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reduction {
    /// The graph has a vertex without neighbors, so it has no perfect matching.
    Infeasible {
        /// The isolated vertex.
        vertex: Vertex,
    },
    /// Forced edges consumed every vertex. The matching is perfect.
    ///
    /// Pairs are `(v, u)` with `v` the vertex of degree one, so they are not
    /// oriented by partition.
    FullyResolved(Matching),
    /// Every remaining vertex has at least two neighbors.
    Reduced {
        /// The remaining graph.
        graph: Graph,
        /// Edges forced so far, oriented as in [Reduction::FullyResolved].
        /// They belong to every perfect matching of the input.
        forced: Matching,
    },
}

/// Removes forced edges until every vertex has at least two neighbors.
///
/// A vertex with a single neighbor must be matched to it in any perfect
/// matching, so both endpoints are removed and the pair is recorded. This can
/// lower the degree of other vertices, so the scan repeats until a fixpoint is
/// reached. A vertex without neighbors ends the reduction with
/// [Reduction::Infeasible].
///
/// Within one scan, a forced pair is only committed if neither endpoint has
/// already been consumed by another forced pair of the same scan. A degree one
/// vertex whose only neighbor was taken is left in the graph and becomes
/// isolated in the next scan.
#[instrument(skip_all, fields(n = graph.vertex_count(), m = graph.edge_count()))]
pub fn reduce(mut graph: Graph) -> Reduction {
    let mut forced = Matching::new();
    let mut removed = HashSet::new();
    let mut removal_order = Vec::new();
    let mut rounds = 0_usize;

    loop {
        if let Some(vertex) = graph.vertices().find(|&v| graph.degree(v) == 0) {
            debug!(vertex, forced = forced.len(), rounds, "isolated vertex");
            return Reduction::Infeasible { vertex };
        }

        removed.clear();
        removal_order.clear();
        for v in graph.vertices() {
            if removed.contains(&v) {
                continue;
            }
            let mut neighbors = graph.neighbors(v);
            let (Some(u), None) = (neighbors.next(), neighbors.next()) else {
                continue;
            };
            if removed.contains(&u) {
                trace!(v, u, "neighbor already forced");
                continue;
            }
            trace!(v, u, "forced edge");
            removed.insert(v);
            removed.insert(u);
            removal_order.extend([v, u]);
            forced.push(v, u);
        }

        if removal_order.is_empty() {
            break;
        }
        for &v in &removal_order {
            graph.remove_vertex(v);
        }
        rounds += 1;
    }

    debug!(forced = forced.len(), remaining = graph.vertex_count(), rounds);

    if graph.is_empty() {
        Reduction::FullyResolved(forced)
    } else {
        Reduction::Reduced { graph, forced }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::bipartite;

    #[test]
    fn empty_graph_is_resolved() {
        assert_eq!(reduce(Graph::new()), Reduction::FullyResolved(Matching::new()));
    }

    #[test]
    fn isolated_vertex_is_infeasible() {
        let graph = bipartite(&[1, 2], &[3, 4], &[(1, 3)]);
        assert!(matches!(reduce(graph), Reduction::Infeasible { .. }));
    }

    #[test]
    fn isolated_vertex_is_reported() {
        let graph = bipartite(&[1, 2], &[3], &[(1, 3)]);
        let Reduction::Infeasible { vertex } = reduce(graph) else { panic!("expected infeasible") };
        assert_eq!(vertex, 2);
    }

    #[test]
    fn chain_of_forced_edges() {
        // 1 - 3 is forced; afterwards 2 only sees 4.
        let graph = bipartite(&[1, 2], &[3, 4], &[(1, 3), (2, 3), (2, 4)]);
        let Reduction::FullyResolved(matching) = reduce(graph.clone()) else { panic!("expected resolved") };
        assert_eq!(matching.len(), 2);
        assert_eq!(matching.partner(1), Some(3));
        assert_eq!(matching.partner(2), Some(4));
        assert!(matching.is_valid_in(&graph));
    }

    #[test]
    fn forced_pairs_start_at_the_leaf() {
        // 2 and 3 are leaves, 3 lies on the right side.
        let graph = bipartite(&[1, 2], &[3, 4], &[(1, 3), (1, 4), (2, 4)]);
        let Reduction::FullyResolved(matching) = reduce(graph.clone()) else { panic!("expected resolved") };
        assert_eq!(matching.into_pairs(), [(2, 4), (3, 1)]);
    }

    #[test]
    fn long_path_is_resolved() {
        let n: Vertex = 2000;
        let left: Vec<_> = (0..n).step_by(2).collect();
        let right: Vec<_> = (1..n).step_by(2).collect();
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let graph = bipartite(&left, &right, &edges);
        let Reduction::FullyResolved(matching) = reduce(graph.clone()) else { panic!("expected resolved") };
        assert_eq!(matching.len(), n as usize / 2);
        assert!(matching.is_valid_in(&graph));
    }

    #[test]
    fn shared_neighbor_is_not_forced_twice() {
        // 1 and 2 both have 3 as their only neighbor. Only one of them may take it.
        let graph = bipartite(&[1, 2, 5], &[3, 4], &[(1, 3), (2, 3), (5, 3), (5, 4)]);
        assert_eq!(reduce(graph), Reduction::Infeasible { vertex: 2 });
    }

    #[test]
    fn two_leaves_on_one_center() {
        let graph = bipartite(&[1, 2], &[3], &[(1, 3), (2, 3)]);
        assert_eq!(reduce(graph), Reduction::Infeasible { vertex: 2 });
    }

    #[test]
    fn cycle_is_left_alone() {
        let graph = bipartite(&[1, 2], &[3, 4], &[(1, 3), (1, 4), (2, 3), (2, 4)]);
        let Reduction::Reduced { graph: rest, forced } = reduce(graph.clone()) else { panic!("expected reduced") };
        assert!(forced.is_empty());
        assert_eq!(rest, graph);
    }

    #[test]
    fn pendant_path_is_stripped() {
        // 5 - 6 hangs off the 4-cycle 1 3 2 4.
        let graph = bipartite(&[1, 2, 5], &[3, 4, 6], &[(1, 3), (1, 4), (2, 3), (2, 4), (5, 6)]);
        let Reduction::Reduced { graph: rest, forced } = reduce(graph) else { panic!("expected reduced") };
        assert_eq!(forced.iter().collect::<Vec<_>>(), [(5, 6)]);
        assert_eq!(rest.vertex_count(), 4);
        assert!(!rest.contains_vertex(5) && !rest.contains_vertex(6));
    }

    #[test]
    fn reduction_is_idempotent() {
        let graph = bipartite(&[1, 2, 5, 7], &[3, 4, 6, 8], &[(1, 3), (1, 4), (2, 3), (2, 4), (5, 6), (7, 8), (7, 6)]);
        let Reduction::Reduced { graph: rest, .. } = reduce(graph) else { panic!("expected reduced") };
        assert_eq!(reduce(rest.clone()), Reduction::Reduced { graph: rest, forced: Matching::new() });
    }
}
