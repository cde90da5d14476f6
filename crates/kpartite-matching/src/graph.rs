use std::collections::HashMap;

use petgraph::graphmap::UnGraphMap;
use thiserror::Error;
use tracing::{info, instrument};

use crate::index::make_index;

make_index!(pub PartIndex);

/// Vertex identifier.
pub type Vertex = u32;

/// An undirected edge between two vertices.
pub type Edge = (Vertex, Vertex);

/// The input does not describe a k-partite graph.
#[derive(Error, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MalformedInput {
    /// An edge endpoint is not contained in any partition.
    #[error("edge ({u}, {v}) references vertex {vertex} which is in no partition")]
    UnknownVertex {
        /// The unknown endpoint.
        vertex: Vertex,
        /// First endpoint of the edge.
        u: Vertex,
        /// Second endpoint of the edge.
        v: Vertex,
    },
    /// A vertex is listed more than once.
    #[error("vertex {vertex} appears in partition {first} and in partition {second}")]
    DuplicateVertex {
        /// The repeated vertex.
        vertex: Vertex,
        /// Partition of the first occurrence.
        first: PartIndex,
        /// Partition of the second occurrence.
        second: PartIndex,
    },
    /// Both endpoints of an edge lie in the same partition.
    #[error("edge ({u}, {v}) joins two vertices of partition {partition}")]
    IntraPartitionEdge {
        /// First endpoint of the edge.
        u: Vertex,
        /// Second endpoint of the edge.
        v: Vertex,
        /// The partition containing both endpoints.
        partition: PartIndex,
    },
}

/// An undirected simple graph on [Vertex] identifiers.
///
/// Vertices and neighbors are iterated in insertion order. Removing a vertex
/// may move the most recently inserted vertex into its slot.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    adjacency: UnGraphMap<Vertex, ()>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with the given isolated vertices.
    pub fn from_vertices(vertices: impl IntoIterator<Item = Vertex>) -> Self {
        let mut graph = Self::new();
        for v in vertices {
            graph.add_vertex(v);
        }
        graph
    }

    /// Add a vertex. Adding an existing vertex does nothing.
    pub fn add_vertex(&mut self, v: Vertex) {
        self.adjacency.add_node(v);
    }

    /// Add the edge `{u, v}`, inserting missing endpoints.
    ///
    /// Adding an existing edge does nothing.
    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        debug_assert_ne!(u, v);
        self.adjacency.add_edge(u, v, ());
    }

    /// Remove a vertex and all its incident edges. Returns whether the vertex existed.
    pub fn remove_vertex(&mut self, v: Vertex) -> bool {
        self.adjacency.remove_node(v)
    }

    /// Remove the edge `{u, v}`. Returns whether the edge existed.
    pub fn remove_edge(&mut self, u: Vertex, v: Vertex) -> bool {
        self.adjacency.remove_edge(u, v).is_some()
    }

    /// Returns whether the vertex exists.
    pub fn contains_vertex(&self, v: Vertex) -> bool {
        self.adjacency.contains_node(v)
    }

    /// Returns whether the edge `{u, v}` exists.
    pub fn contains_edge(&self, u: Vertex, v: Vertex) -> bool {
        self.adjacency.contains_edge(u, v)
    }

    /// Number of neighbors of `v`. Zero for unknown vertices.
    pub fn degree(&self, v: Vertex) -> usize {
        self.adjacency.neighbors(v).count()
    }

    /// Iterate over the neighbors of `v`. Empty for unknown vertices.
    pub fn neighbors(&self, v: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        self.adjacency.neighbors(v)
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.adjacency.nodes()
    }

    /// Iterate over all edges, each reported once.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.all_edges().map(|(u, v, _)| (u, v))
    }

    /// Number of vertices.
    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.node_count()
    }

    /// Number of edges.
    #[inline(always)]
    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// Returns whether the graph has no vertices.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.vertex_count() == other.vertex_count()
            && self.edge_count() == other.edge_count()
            && self.vertices().all(|v| other.contains_vertex(v))
            && self.edges().all(|(u, v)| other.contains_edge(u, v))
    }
}

impl Eq for Graph {}

/// A validated k-partite graph.
#[derive(Clone, Debug)]
pub struct KPartiteGraph {
    partitions: Vec<Vec<Vertex>>,
    part_of: HashMap<Vertex, PartIndex>,
    graph: Graph,
}

/// Builds a [KPartiteGraph] from partitions and edges.
///
/// Every vertex of every partition is part of the graph, including isolated
/// ones. Repeated edges are merged.
///
/// # Errors
///
/// Returns [MalformedInput] if a vertex appears more than once, an edge
/// references a vertex outside all partitions, or an edge connects two
/// vertices of the same partition.
#[instrument(skip_all)]
pub fn build(partitions: &[Vec<Vertex>], edges: &[Edge]) -> Result<KPartiteGraph, MalformedInput> {
    let n = partitions.iter().map(Vec::len).sum();
    let mut part_of = HashMap::with_capacity(n);
    let mut graph = Graph { adjacency: UnGraphMap::with_capacity(n, edges.len()) };

    for (i, partition) in partitions.iter().enumerate() {
        let i = PartIndex::new(i);
        for &v in partition {
            if let Some(&first) = part_of.get(&v) {
                return Err(MalformedInput::DuplicateVertex { vertex: v, first, second: i });
            }
            part_of.insert(v, i);
            graph.add_vertex(v);
        }
    }

    for &(u, v) in edges {
        let lookup = |vertex: Vertex| part_of.get(&vertex).copied().ok_or(MalformedInput::UnknownVertex { vertex, u, v });
        let (pu, pv) = (lookup(u)?, lookup(v)?);
        if pu == pv {
            return Err(MalformedInput::IntraPartitionEdge { u, v, partition: pu });
        }
        graph.add_edge(u, v);
    }

    info!(k = partitions.len(), n = graph.vertex_count(), m = graph.edge_count());

    let partitions = partitions.to_vec();
    Ok(KPartiteGraph { partitions, part_of, graph })
}

impl KPartiteGraph {
    /// Number of partitions.
    #[inline(always)]
    pub fn k(&self) -> usize {
        self.partitions.len()
    }

    /// All partitions in input order.
    pub fn partitions(&self) -> &[Vec<Vertex>] {
        &self.partitions
    }

    /// The vertices of partition `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn partition(&self, i: PartIndex) -> &[Vertex] {
        &self.partitions[i.index()]
    }

    /// The partition containing `v`, if any.
    pub fn partition_of(&self, v: Vertex) -> Option<PartIndex> {
        self.part_of.get(&v).copied()
    }

    /// The whole graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Extracts the bipartite subgraph induced by partitions `i` and `j`.
    ///
    /// The result contains all vertices of both partitions, those of `i`
    /// first, and exactly the edges with one endpoint in each.
    pub fn induced_subgraph(&self, i: PartIndex, j: PartIndex) -> Graph {
        let (left, right) = (self.partition(i), self.partition(j));
        let mut sub = Graph { adjacency: UnGraphMap::with_capacity(left.len() + right.len(), 0) };
        for &v in left.iter().chain(right) {
            sub.add_vertex(v);
        }
        for &u in left {
            for v in self.graph.neighbors(u) {
                if self.part_of.get(&v) == Some(&j) {
                    sub.add_edge(u, v);
                }
            }
        }
        sub
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn isolated_vertices_are_kept() {
        let g = build(&[vec![1, 2], vec![3, 4]], &[(1, 3)]).unwrap();
        assert_eq!(g.k(), 2);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.graph().degree(2), 0);
        assert_eq!(g.graph().degree(4), 0);
        assert!(g.graph().contains_edge(3, 1));
    }

    #[test]
    fn repeated_edges_are_merged() {
        let g = build(&[vec![1], vec![2]], &[(1, 2), (2, 1), (1, 2)]).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.graph().degree(1), 1);
    }

    #[test]
    fn unknown_vertex() {
        let err = build(&[vec![1, 2], vec![3, 4]], &[(1, 3), (2, 7)]).unwrap_err();
        assert_eq!(err, MalformedInput::UnknownVertex { vertex: 7, u: 2, v: 7 });
        assert_eq!(err.to_string(), "edge (2, 7) references vertex 7 which is in no partition");
    }

    #[test]
    fn vertex_in_two_partitions() {
        let err = build(&[vec![1, 2], vec![2, 3]], &[]).unwrap_err();
        assert_eq!(err, MalformedInput::DuplicateVertex { vertex: 2, first: PartIndex::new(0), second: PartIndex::new(1) });
    }

    #[test]
    fn vertex_twice_in_one_partition() {
        let err = build(&[vec![1, 1]], &[]).unwrap_err();
        assert_eq!(err, MalformedInput::DuplicateVertex { vertex: 1, first: PartIndex::new(0), second: PartIndex::new(0) });
    }

    #[test]
    fn intra_partition_edge() {
        let err = build(&[vec![1, 2], vec![3]], &[(1, 3), (1, 2)]).unwrap_err();
        assert_eq!(err, MalformedInput::IntraPartitionEdge { u: 1, v: 2, partition: PartIndex::new(0) });
    }

    #[test]
    fn self_loop_is_intra_partition() {
        let err = build(&[vec![1], vec![2]], &[(1, 1)]).unwrap_err();
        assert!(matches!(err, MalformedInput::IntraPartitionEdge { u: 1, v: 1, .. }));
    }

    #[test]
    fn induced_subgraph_keeps_only_crossing_edges() {
        let g = build(&[vec![1, 2], vec![3, 4], vec![5, 6]], &[(1, 3), (2, 4), (3, 5), (4, 6), (1, 6)]).unwrap();

        let sub = g.induced_subgraph(PartIndex::new(0), PartIndex::new(1));
        assert_eq!(sub.vertices().collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert_eq!(sub.edge_count(), 2);
        assert!(sub.contains_edge(1, 3));
        assert!(sub.contains_edge(2, 4));

        let sub = g.induced_subgraph(PartIndex::new(2), PartIndex::new(0));
        assert_eq!(sub.vertices().collect::<Vec<_>>(), [5, 6, 1, 2]);
        assert_eq!(sub.edge_count(), 1);
        assert!(sub.contains_edge(6, 1));
    }

    #[test]
    fn partition_lookup() {
        let g = build(&[vec![10, 11], vec![20]], &[(10, 20)]).unwrap();
        assert_eq!(g.partition_of(11), Some(PartIndex::new(0)));
        assert_eq!(g.partition_of(20), Some(PartIndex::new(1)));
        assert_eq!(g.partition_of(30), None);
        assert_eq!(g.partition(PartIndex::new(1)), &[20]);
    }

    #[test]
    fn graph_equality_ignores_order() {
        let mut a = Graph::from_vertices([1, 2, 3]);
        a.add_edge(1, 2);
        a.add_edge(2, 3);
        let mut b = Graph::from_vertices([3, 2, 1]);
        b.add_edge(3, 2);
        b.add_edge(2, 1);
        assert_eq!(a, b);
        b.remove_edge(1, 2);
        assert_ne!(a, b);
    }
}
