use kpartite_matching::{Edge, Vertex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// A k-partite graph as it is stored in a dataset row.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Instance {
    pub partitions: Vec<Vec<Vertex>>,
    pub edges: Vec<Edge>,
}

impl Instance {
    pub fn k(&self) -> usize {
        self.partitions.len()
    }

    /// Size of the first partition, or `0` without partitions.
    pub fn n(&self) -> usize {
        self.partitions.first().map_or(0, Vec::len)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Layout {
    /// Every partition is completely joined to the next one.
    #[default]
    Chain,
    /// Every pair of partitions is joined by a bijection.
    Bijection,
}

/// Generates one instance with and one without a perfect matching.
///
/// Returns `None` if `k < 2` or `n == 0`, as every such graph is perfect.
pub fn generate_pair<R: Rng>(layout: Layout, k: u32, n: u32, rng: &mut R) -> Option<(Instance, Instance)> {
    match layout {
        Layout::Chain => Some((perfect_chain(k, n), not_perfect_chain(k, n, rng)?)),
        Layout::Bijection => {
            let additional_edges = rng.gen_range(3..=7);
            Some((perfect_bijection(k, n, additional_edges, rng), not_perfect_bijection(k, n, rng)?))
        }
    }
}

fn has_imperfect(k: u32, n: u32) -> bool {
    k >= 2 && n >= 1
}

fn partitions(k: u32, n: u32) -> Vec<Vec<Vertex>> {
    (0..k).map(|i| (i * n..(i + 1) * n).collect()).collect()
}

fn complete_chain_edges(partitions: &[Vec<Vertex>]) -> BTreeSet<Edge> {
    partitions
        .windows(2)
        .flat_map(|pair| pair[0].iter().flat_map(|&u| pair[1].iter().map(move |&v| (u, v))))
        .collect()
}

fn bijection_edges(partitions: &[Vec<Vertex>]) -> BTreeSet<Edge> {
    let mut edges = BTreeSet::new();
    for (i, p) in partitions.iter().enumerate() {
        for q in &partitions[i + 1..] {
            edges.extend(p.iter().copied().zip(q.iter().copied()));
        }
    }
    edges
}

/// Partition `i` holds `i * n .. (i + 1) * n` and every vertex is joined to
/// every vertex of the next partition.
pub fn complete_chain(k: u32, n: u32) -> Instance {
    let partitions = partitions(k, n);
    let edges = complete_chain_edges(&partitions).into_iter().collect();
    Instance { partitions, edges }
}

/// Vertex `j` of every partition is joined to vertex `j` of the next one.
pub fn bijection_chain(k: u32, n: u32) -> Instance {
    let partitions = partitions(k, n);
    let edges = partitions.windows(2).flat_map(|pair| pair[0].iter().copied().zip(pair[1].iter().copied())).collect();
    Instance { partitions, edges }
}

pub fn perfect_chain(k: u32, n: u32) -> Instance {
    complete_chain(k, n)
}

/// Like [perfect_chain], but a random vertex of the last partition loses all
/// its edges. `None` if `k < 2` or `n == 0`.
pub fn not_perfect_chain<R: Rng>(k: u32, n: u32, rng: &mut R) -> Option<Instance> {
    if !has_imperfect(k, n) {
        return None;
    }
    let mut instance = perfect_chain(k, n);
    let x = *instance.partitions.last()?.choose(rng)?;
    instance.edges.retain(|&(_, v)| v != x);
    Some(instance)
}

/// Every pair of partitions is joined by the bijection `i * n + j <-> l * n + j`.
/// Additionally, up to `additional_edges` random edges between distinct
/// partitions are added.
pub fn perfect_bijection<R: Rng>(k: u32, n: u32, additional_edges: usize, rng: &mut R) -> Instance {
    let partitions = partitions(k, n);
    let mut edges = bijection_edges(&partitions);
    if has_imperfect(k, n) {
        for _ in 0..additional_edges {
            let a = rng.gen_range(0..k);
            let b = rng.gen_range(0..k);
            if a == b {
                continue;
            }
            let u = a * n + rng.gen_range(0..n);
            let v = b * n + rng.gen_range(0..n);
            edges.insert((u.min(v), u.max(v)));
        }
    }
    Instance { partitions, edges: edges.into_iter().collect() }
}

/// Like [perfect_bijection] without additional edges, but a random vertex
/// loses all its edges. `None` if `k < 2` or `n == 0`.
pub fn not_perfect_bijection<R: Rng>(k: u32, n: u32, rng: &mut R) -> Option<Instance> {
    if !has_imperfect(k, n) {
        return None;
    }
    let mut instance = perfect_bijection(k, n, 0, rng);
    let x = *instance.partitions.choose(rng)?.choose(rng)?;
    instance.edges.retain(|&(u, v)| u != x && v != x);
    Some(instance)
}
