//! Path Finding
//!
//! Searches for vertex sequences over any successor function, with costs
//! accumulated along the way and a ceiling that prunes expensive paths.
//!
//! # Overview
//!
//! - [`NextNodes`]: where the search may go from a vertex. Closures work
//!   directly; [`Forward`] and [`Backward`] adapt a [`ChunkedBidiGraph`].
//! - [`VertexSequenceFinder`]: first-found and cheapest paths, reachability
//!   checks, and paths over ordered waypoints.
//! - [`VertexSequence`]: a found path and its cost.
//!
//! [`ChunkedBidiGraph`]: crate::graph::ChunkedBidiGraph

mod backlink;
mod finder;
mod next_nodes;

pub use finder::VertexSequenceFinder;
pub use next_nodes::{Backward, Forward, NextNodes};

/// A path: vertices from start to goal, and the accumulated cost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexSequence<C> {
    pub vertices: Vec<usize>,
    pub cost: C,
}

impl<C> VertexSequence<C> {
    /// First vertex of the path.
    pub fn start(&self) -> Option<usize> {
        self.vertices.first().copied()
    }

    /// Last vertex of the path.
    pub fn goal(&self) -> Option<usize> {
        self.vertices.last().copied()
    }

    /// Number of arrows on the path.
    pub fn hops(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }
}
