//! Adjacency Chunks
//!
//! A chunk stores the adjacency rows of `chunk_size` consecutive vertices,
//! together with one integer payload per vertex. The graph keeps two parallel
//! arrays of chunks, one per direction, and only materializes a chunk when a
//! vertex in its range is first written.
//!
//! Vertices are passed to a chunk by their global index. A chunk masks off
//! the high bits itself, so callers never translate to local positions.
//!
//! # Preconditions
//!
//! Chunk operations do not validate their arguments. A vertex outside the
//! chunk's range or a row position past the end of the row panics. The graph
//! checks vertex ids at its public boundary before delegating here.
//!
//! # Layouts
//!
//! - [`CsrChunk`]: all rows share one backing array (offset + length per row).
//! - [`SmallVecChunk`]: one inline small vector per row.

mod csr;
mod small;

pub use csr::CsrChunk;
pub use small::SmallVecChunk;

/// Storage for the adjacency rows of a power-of-two range of vertices.
pub trait GraphChunk {
    /// Create an empty chunk covering `chunk_size` vertices, reserving
    /// `initial_arity` arrow slots per vertex.
    fn new(chunk_size: usize, initial_arity: usize) -> Self
    where
        Self: Sized;

    /// Add the arrow `vertex -> target` if it is absent.
    ///
    /// Returns `true` if the arrow was added. If the arrow is already present
    /// its payload is overwritten only when `update_if_present` is set, and
    /// `false` is returned.
    fn try_add_arrow(
        &mut self,
        vertex: usize,
        target: usize,
        data: i32,
        update_if_present: bool,
    ) -> bool;

    /// Remove the arrow `vertex -> target`. Returns whether it was present.
    fn try_remove_arrow(&mut self, vertex: usize, target: usize) -> bool {
        match self.index_of(vertex, target) {
            Some(index) => {
                self.remove_arrow_at(vertex, index);
                true
            }
            None => false,
        }
    }

    /// Remove the arrow at row position `index` and return its target.
    ///
    /// The relative order of the remaining entries is preserved.
    fn remove_arrow_at(&mut self, vertex: usize, index: usize) -> usize;

    /// Remove every arrow in the row of `vertex`.
    fn remove_all_arrows(&mut self, vertex: usize);

    /// Targets of the row of `vertex`, in row order.
    fn siblings(&self, vertex: usize) -> &[u32];

    /// Payloads of the row of `vertex`, parallel to [`siblings`](Self::siblings).
    fn arrows(&self, vertex: usize) -> &[i32];

    /// Auxiliary payload of `vertex`.
    fn vertex_data(&self, vertex: usize) -> i32;

    /// Set the auxiliary payload of `vertex`.
    fn set_vertex_data(&mut self, vertex: usize, data: i32);

    /// Row position of `target`, scanning linearly.
    fn index_of(&self, vertex: usize, target: usize) -> Option<usize> {
        self.siblings(vertex)
            .iter()
            .position(|&sibling| sibling as usize == target)
    }

    /// Number of arrows in the row of `vertex`.
    fn sibling_count(&self, vertex: usize) -> usize {
        self.siblings(vertex).len()
    }

    /// Target of the arrow at row position `index`.
    fn sibling(&self, vertex: usize, index: usize) -> usize {
        self.siblings(vertex)[index] as usize
    }

    /// Payload of the arrow at row position `index`.
    fn arrow(&self, vertex: usize, index: usize) -> i32 {
        self.arrows(vertex)[index]
    }
}

/// Shared behaviour tests, run against every chunk layout.
#[cfg(test)]
pub(crate) mod conformance {
    use super::GraphChunk;

    pub fn add_and_query<C: GraphChunk>() {
        let mut chunk = C::new(8, 2);
        assert!(chunk.try_add_arrow(3, 10, 7, false));
        assert!(chunk.try_add_arrow(3, 11, 8, false));
        assert_eq!(chunk.sibling_count(3), 2);
        assert_eq!(chunk.sibling(3, 0), 10);
        assert_eq!(chunk.arrow(3, 1), 8);
        assert_eq!(chunk.index_of(3, 11), Some(1));
        assert_eq!(chunk.index_of(3, 12), None);
        assert_eq!(chunk.sibling_count(4), 0);
    }

    pub fn duplicate_add_respects_update_flag<C: GraphChunk>() {
        let mut chunk = C::new(4, 1);
        assert!(chunk.try_add_arrow(1, 2, 5, false));
        assert!(!chunk.try_add_arrow(1, 2, 6, false));
        assert_eq!(chunk.arrow(1, 0), 5);
        assert!(!chunk.try_add_arrow(1, 2, 6, true));
        assert_eq!(chunk.arrow(1, 0), 6);
        assert_eq!(chunk.sibling_count(1), 1);
    }

    pub fn rows_grow_past_initial_capacity<C: GraphChunk>() {
        let mut chunk = C::new(4, 1);
        for target in 0..40 {
            assert!(chunk.try_add_arrow(2, target, -(target as i32), false));
            assert!(chunk.try_add_arrow(1, target + 100, 1, false));
        }
        assert_eq!(chunk.sibling_count(2), 40);
        assert_eq!(chunk.sibling_count(1), 40);
        for target in 0..40 {
            assert_eq!(chunk.sibling(2, target), target);
            assert_eq!(chunk.arrow(2, target), -(target as i32));
            assert_eq!(chunk.sibling(1, target), target + 100);
        }
    }

    pub fn removal<C: GraphChunk>() {
        let mut chunk = C::new(4, 4);
        for target in [5, 6, 7, 8] {
            chunk.try_add_arrow(0, target, target as i32, false);
        }
        assert!(chunk.try_remove_arrow(0, 6));
        assert!(!chunk.try_remove_arrow(0, 6));
        assert_eq!(chunk.siblings(0), &[5, 7, 8]);
        assert_eq!(chunk.arrows(0), &[5, 7, 8]);

        assert_eq!(chunk.remove_arrow_at(0, 2), 8);
        assert_eq!(chunk.siblings(0), &[5, 7]);

        chunk.remove_all_arrows(0);
        assert_eq!(chunk.sibling_count(0), 0);
        assert!(chunk.try_add_arrow(0, 9, 0, false));
        assert_eq!(chunk.siblings(0), &[9]);
    }

    pub fn vertex_data_is_independent_of_rows<C: GraphChunk>() {
        let mut chunk = C::new(16, 2);
        chunk.set_vertex_data(17, 42);
        assert_eq!(chunk.vertex_data(17), 42);
        chunk.try_add_arrow(17, 3, 1, false);
        chunk.remove_all_arrows(17);
        assert_eq!(chunk.vertex_data(17), 42);
        assert_eq!(chunk.vertex_data(18), 0);
    }

    pub fn global_indices_are_masked<C: GraphChunk>() {
        let mut chunk = C::new(4, 1);
        chunk.try_add_arrow(4 * 7 + 3, 1, 0, false);
        assert_eq!(chunk.sibling_count(3), 1);
        assert_eq!(chunk.sibling_count(4 * 7 + 3), 1);
    }
}
