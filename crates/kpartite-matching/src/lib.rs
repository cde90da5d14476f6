//! This is a library to decide whether a [k-partite graph](https://en.wikipedia.org/wiki/Multipartite_graph)
//! has a perfect matching.
//!
//! The vertices are split into k disjoint partitions and every edge connects
//! two different partitions. For every partition pair selected by a [Policy],
//! the bipartite subgraph induced by the two partitions is extracted and the
//! checker asks for a matching that covers one side completely.
//!
//! Each pair is decided in two stages. Forced edges, i.e. edges at a vertex of
//! degree one, are removed until a fixpoint is reached ([reduce]). Whatever is
//! left is handed to Kuhn's augmenting path algorithm
//! ([left_saturating_matching]).
//!
//! # Examples
//!
//! ```rust
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use kpartite_matching::{is_perfect, CheckConfig};
//!
//! let partitions = [vec![1, 2], vec![3, 4]];
//!
//! // a complete bipartite graph on 2 + 2 vertices
//! let edges = [(1, 3), (1, 4), (2, 3), (2, 4)];
//! assert!(is_perfect(&partitions, &edges, &CheckConfig::default())?.perfect);
//!
//! // 2 and 4 are isolated
//! let edges = [(1, 3)];
//! assert!(!is_perfect(&partitions, &edges, &CheckConfig::default())?.perfect);
//! # Ok(())
//! # }
//! ```
//!
//! Requiring all partition pairs instead of neighboring ones.
//! ```rust
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use kpartite_matching::{prepare, CheckConfig, Policy};
//!
//! // a path through three partitions
//! let prepared = prepare(&[vec![0], vec![1], vec![2]], &[(0, 1), (1, 2)])?;
//!
//! assert!(prepared.check(&CheckConfig::new(Policy::AdjacentPairs)).perfect);
//! assert!(!prepared.check(&CheckConfig::new(Policy::AllPairs)).perfect);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![doc(test(attr(deny(warnings, rust_2018_idioms), allow(dead_code))))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod checker;
mod graph;
mod index;
mod kuhn;
mod matching;
mod reduce;

#[cfg(test)]
mod tests;

pub use checker::{is_perfect, prepare, Check, CheckConfig, Policy, Prepared};
pub use graph::{build, Edge, Graph, KPartiteGraph, MalformedInput, PartIndex, Vertex};
pub use kuhn::{augmenting_path_matching, left_saturating_matching};
pub use matching::Matching;
pub use reduce::{reduce, Reduction};
