use crate::graph::{Edge, Graph, Vertex};

pub(crate) fn bipartite(left: &[Vertex], right: &[Vertex], edges: &[Edge]) -> Graph {
    let mut graph = Graph::from_vertices(left.iter().chain(right).copied());
    for &(u, v) in edges {
        graph.add_edge(u, v);
    }
    graph
}

/// `k` partitions of `n` vertices, partition `i` holding `i * n .. (i + 1) * n`.
pub(crate) fn partitions(k: u32, n: u32) -> Vec<Vec<Vertex>> {
    (0..k).map(|i| (i * n..(i + 1) * n).collect()).collect()
}

/// Vertex `j` of every partition is joined to vertex `j` of the next one.
pub(crate) fn bijection_chain(k: u32, n: u32) -> (Vec<Vec<Vertex>>, Vec<Edge>) {
    let edges = (0..k.saturating_sub(1)).flat_map(|i| (0..n).map(move |j| (i * n + j, (i + 1) * n + j))).collect();
    (partitions(k, n), edges)
}

/// Every vertex is joined to every vertex of the next partition.
pub(crate) fn complete_chain(k: u32, n: u32) -> (Vec<Vec<Vertex>>, Vec<Edge>) {
    let edges = (0..k.saturating_sub(1))
        .flat_map(|i| (0..n).flat_map(move |a| (0..n).map(move |b| (i * n + a, (i + 1) * n + b))))
        .collect();
    (partitions(k, n), edges)
}

/// Vertex `j` of every partition is joined to vertex `j` of every other partition.
pub(crate) fn bijection_clique(k: u32, n: u32) -> (Vec<Vec<Vertex>>, Vec<Edge>) {
    let mut edges = vec![];
    for i in 0..k {
        for l in i + 1..k {
            edges.extend((0..n).map(|j| (i * n + j, l * n + j)));
        }
    }
    (partitions(k, n), edges)
}
