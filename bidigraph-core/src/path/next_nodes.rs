//! Adjacency callbacks for the finder.

use crate::chunk::GraphChunk;
use crate::graph::{ChunkedBidiGraph, RowVertices};

/// Successor function of a graph: `vertex -> sequence of successors`.
///
/// Implemented for closures returning any `IntoIterator<Item = usize>`, and
/// for the [`Forward`] and [`Backward`] views of a [`ChunkedBidiGraph`].
pub trait NextNodes {
    /// Iterator over the successors of one vertex.
    type Iter<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// Successors of `vertex`, in the order the search should try them.
    fn next_nodes(&self, vertex: usize) -> Self::Iter<'_>;
}

impl<F, I> NextNodes for F
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = usize>,
{
    type Iter<'a> = I::IntoIter where Self: 'a;

    fn next_nodes(&self, vertex: usize) -> Self::Iter<'_> {
        self(vertex).into_iter()
    }
}

/// Follows arrows from tail to head.
#[derive(Debug)]
pub struct Forward<'g, C: GraphChunk>(pub &'g ChunkedBidiGraph<C>);

/// Follows arrows from head to tail.
#[derive(Debug)]
pub struct Backward<'g, C: GraphChunk>(pub &'g ChunkedBidiGraph<C>);

impl<C: GraphChunk> Clone for Forward<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: GraphChunk> Copy for Forward<'_, C> {}

impl<C: GraphChunk> Clone for Backward<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: GraphChunk> Copy for Backward<'_, C> {}

impl<C: GraphChunk> NextNodes for Forward<'_, C> {
    type Iter<'a> = RowVertices<'a> where Self: 'a;

    fn next_nodes(&self, vertex: usize) -> RowVertices<'_> {
        self.0.next_vertices(vertex)
    }
}

impl<C: GraphChunk> NextNodes for Backward<'_, C> {
    type Iter<'a> = RowVertices<'a> where Self: 'a;

    fn next_nodes(&self, vertex: usize) -> RowVertices<'_> {
        self.0.prev_vertices(vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_adjacency() {
        let adjacency = |v: usize| if v < 3 { vec![v + 1] } else { vec![] };
        assert_eq!(adjacency.next_nodes(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(adjacency.next_nodes(3).count(), 0);
    }

    #[test]
    fn graph_views_follow_direction() {
        let mut graph: ChunkedBidiGraph = ChunkedBidiGraph::new();
        graph.add_vertex_at(2).unwrap();
        graph.add_arrow(0, 2).unwrap();
        graph.add_arrow(1, 2).unwrap();
        assert_eq!(Forward(&graph).next_nodes(0).collect::<Vec<_>>(), vec![2]);
        assert_eq!(Backward(&graph).next_nodes(2).collect::<Vec<_>>(), vec![0, 1]);
    }
}
