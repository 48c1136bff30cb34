//! Chunked Bidirectional Graph
//!
//! Vertices are dense integers in `[0, vertex_count)`. Each arrow `v -> u` is
//! recorded twice: in the forward row of `v` and in the backward row of `u`.
//! Both directions are stored, not derived, so successor and predecessor
//! queries cost the same.
//!
//! # Storage
//!
//! Rows live in [`GraphChunk`]s. A vertex `v` belongs to chunk
//! `v >> chunk_shift` in each of the two chunk arrays. Chunk slots start out
//! empty and are filled the first time a vertex in their range is written;
//! reads of an untouched range see empty rows and zero payloads.
//!
//! # Mutation
//!
//! Every mutation updates both directions before it returns. If the two
//! directions ever disagree the mutation panics rather than commit half of
//! the change.

use std::iter::Map;
use std::slice;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::chunk::{CsrChunk, GraphChunk};
use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::visited::BitSetVisited;

use super::search::{SearchDataEnumerator, SearchEnumerator};

/// Largest supported vertex count. The top bit of a 32-bit id is reserved
/// by the traversal frontier.
pub const MAX_VERTEX_COUNT: usize = (u32::MAX >> 1) as usize;

/// Iterator over the vertices of one adjacency row.
pub type RowVertices<'a> = Map<slice::Iter<'a, u32>, fn(&u32) -> usize>;

fn widen(vertex: &u32) -> usize {
    *vertex as usize
}

/// One direction's array of lazily created chunks.
#[derive(Debug, Clone)]
pub(crate) struct ChunkArray<C> {
    slots: Vec<Option<Box<C>>>,
    chunk_size: usize,
    chunk_shift: u32,
    initial_arity: usize,
    direction: &'static str,
}

impl<C: GraphChunk> ChunkArray<C> {
    fn new(config: &GraphConfig, chunk_shift: u32, direction: &'static str) -> Self {
        Self {
            slots: Vec::new(),
            chunk_size: config.chunk_size,
            chunk_shift,
            initial_arity: config.initial_arity_capacity,
            direction,
        }
    }

    /// The chunk covering `vertex`, if it has been materialized.
    pub(crate) fn get(&self, vertex: usize) -> Option<&C> {
        self.slots
            .get(vertex >> self.chunk_shift)
            .and_then(|slot| slot.as_deref())
    }

    /// The chunk covering `vertex`, creating it on first use.
    fn get_or_create(&mut self, vertex: usize) -> &mut C {
        let index = vertex >> self.chunk_shift;
        let (chunk_size, initial_arity, direction) =
            (self.chunk_size, self.initial_arity, self.direction);
        self.slots[index].get_or_insert_with(|| {
            trace!(direction, chunk = index, "graph.chunk.materialize");
            Box::new(C::new(chunk_size, initial_arity))
        })
    }

    /// Targets of the row of `vertex`.
    pub(crate) fn row(&self, vertex: usize) -> &[u32] {
        self.get(vertex).map_or(&[], |chunk| chunk.siblings(vertex))
    }

    fn arrows(&self, vertex: usize) -> &[i32] {
        self.get(vertex).map_or(&[], |chunk| chunk.arrows(vertex))
    }

    pub(crate) fn vertex_data(&self, vertex: usize) -> i32 {
        self.get(vertex).map_or(0, |chunk| chunk.vertex_data(vertex))
    }

    /// Make room for `vertex_capacity` vertices, growing geometrically.
    fn grow(&mut self, vertex_capacity: usize) {
        let needed = (vertex_capacity + self.chunk_size - 1) >> self.chunk_shift;
        if needed <= self.slots.len() {
            return;
        }
        let new_len = needed.max(self.slots.len() * 2);
        debug!(
            direction = self.direction,
            from = self.slots.len(),
            to = new_len,
            "graph.chunks.grow"
        );
        self.slots.resize_with(new_len, || None);
    }

    fn clear(&mut self) {
        self.slots.fill_with(|| None);
    }

    fn materialized(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A mutable, chunked, bidirectional graph over dense integer vertices.
///
/// # Example
///
/// ```rust
/// use bidigraph_core::ChunkedBidiGraph;
///
/// let mut graph: ChunkedBidiGraph = ChunkedBidiGraph::new();
/// let a = graph.add_vertex().unwrap();
/// let b = graph.add_vertex().unwrap();
/// graph.add_arrow_if_absent(a, b, 7).unwrap();
///
/// assert_eq!(graph.next(a, 0), b);
/// assert_eq!(graph.prev(b, 0), a);
/// assert_eq!(graph.next_arrow(a, 0), 7);
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedBidiGraph<C: GraphChunk = CsrChunk> {
    config: GraphConfig,
    chunk_shift: u32,
    vertex_count: usize,
    arrow_count: usize,
    next_chunks: ChunkArray<C>,
    prev_chunks: ChunkArray<C>,
}

impl<C: GraphChunk> Default for ChunkedBidiGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: GraphChunk> ChunkedBidiGraph<C> {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        let config = GraphConfig::default();
        let chunk_shift = config.chunk_size.trailing_zeros();
        Self::from_parts(config, chunk_shift)
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> GraphResult<Self> {
        let chunk_shift = config.chunk_shift()?;
        Ok(Self::from_parts(config, chunk_shift))
    }

    fn from_parts(config: GraphConfig, chunk_shift: u32) -> Self {
        Self {
            config,
            chunk_shift,
            vertex_count: 0,
            arrow_count: 0,
            next_chunks: ChunkArray::new(&config, chunk_shift, "next"),
            prev_chunks: ChunkArray::new(&config, chunk_shift, "prev"),
        }
    }

    /// The configuration this graph was built with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// `log2(chunk_size)`.
    pub fn chunk_shift(&self) -> u32 {
        self.chunk_shift
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of arrows.
    pub fn arrow_count(&self) -> usize {
        self.arrow_count
    }

    /// Number of chunks materialized so far, over both directions.
    pub fn materialized_chunks(&self) -> usize {
        self.next_chunks.materialized() + self.prev_chunks.materialized()
    }

    // ---------------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------------

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self) -> GraphResult<usize> {
        let v = self.vertex_count;
        self.add_vertex_at(v)?;
        Ok(v)
    }

    /// Grow the graph so that `v` is its last vertex.
    ///
    /// Indices between the old vertex count and `v` become valid vertices
    /// without arrows. Fails with [`GraphError::Unsupported`] if `v` is
    /// already a vertex, since indices are never reused.
    pub fn add_vertex_at(&mut self, v: usize) -> GraphResult<()> {
        if v < self.vertex_count {
            return Err(GraphError::Unsupported("vertex indices cannot be reused"));
        }
        if v >= MAX_VERTEX_COUNT {
            return Err(GraphError::CapacityExceeded {
                requested: v.saturating_add(1),
                max: MAX_VERTEX_COUNT,
            });
        }
        let count = v + 1;
        self.next_chunks.grow(count);
        self.prev_chunks.grow(count);
        self.vertex_count = count;
        Ok(())
    }

    /// Vertex removal is not supported. Always fails.
    pub fn remove_vertex(&mut self, _v: usize) -> GraphResult<()> {
        Err(GraphError::Unsupported("vertex removal"))
    }

    /// Auxiliary payload of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn vertex_data(&self, v: usize) -> i32 {
        self.assert_vertex(v);
        self.next_chunks.vertex_data(v)
    }

    /// Set the auxiliary payload of `v`.
    pub fn set_vertex_data(&mut self, v: usize, data: i32) -> GraphResult<()> {
        self.check_vertex(v)?;
        self.next_chunks.get_or_create(v).set_vertex_data(v, data);
        self.prev_chunks.get_or_create(v).set_vertex_data(v, data);
        Ok(())
    }

    /// Remove all vertices and arrows.
    pub fn clear(&mut self) {
        debug!(
            vertices = self.vertex_count,
            arrows = self.arrow_count,
            "graph.clear"
        );
        self.next_chunks.clear();
        self.prev_chunks.clear();
        self.vertex_count = 0;
        self.arrow_count = 0;
    }

    // ---------------------------------------------------------------------
    // Arrows
    // ---------------------------------------------------------------------

    /// Add the arrow `v -> u` with payload 0 if it is absent.
    pub fn add_arrow(&mut self, v: usize, u: usize) -> GraphResult<bool> {
        self.add_arrow_if_absent(v, u, 0)
    }

    /// Add the arrow `v -> u` if it is absent.
    ///
    /// Returns `true` if the arrow was added. An existing arrow is left
    /// untouched, including its payload.
    pub fn add_arrow_if_absent(&mut self, v: usize, u: usize, data: i32) -> GraphResult<bool> {
        self.check_vertex(v)?;
        self.check_vertex(u)?;
        let added = self.prev_chunks.get_or_create(u).try_add_arrow(u, v, data, false);
        if added {
            let mirrored = self.next_chunks.get_or_create(v).try_add_arrow(v, u, data, false);
            assert!(mirrored, "mirror invariant violated: arrow {v} -> {u} only in next row");
            self.arrow_count += 1;
        }
        Ok(added)
    }

    /// Add the arrow `v -> u`, or overwrite its payload if it is present.
    ///
    /// Returns `true` if the arrow was added.
    pub fn add_or_update_arrow(&mut self, v: usize, u: usize, data: i32) -> GraphResult<bool> {
        self.check_vertex(v)?;
        self.check_vertex(u)?;
        let added = self.prev_chunks.get_or_create(u).try_add_arrow(u, v, data, true);
        let mirrored = self.next_chunks.get_or_create(v).try_add_arrow(v, u, data, true);
        assert_eq!(added, mirrored, "mirror invariant violated: arrow {v} -> {u}");
        if added {
            self.arrow_count += 1;
        }
        Ok(added)
    }

    /// Remove the arrow `v -> u`. Returns whether it was present.
    pub fn remove_arrow(&mut self, v: usize, u: usize) -> GraphResult<bool> {
        self.check_vertex(v)?;
        self.check_vertex(u)?;
        match self.find_index_of_next(v, u) {
            Some(index) => self.remove_next_at(v, index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove the arrow at position `index` of the forward row of `v`.
    ///
    /// Returns the successor the arrow pointed to.
    pub fn remove_next_at(&mut self, v: usize, index: usize) -> GraphResult<usize> {
        self.check_vertex(v)?;
        Self::check_index(index, self.next_count(v))?;
        let u = self.next_chunks.get_or_create(v).remove_arrow_at(v, index);
        let mirrored = self.prev_chunks.get_or_create(u).try_remove_arrow(u, v);
        assert!(mirrored, "mirror invariant violated: arrow {v} -> {u} missing from prev row");
        self.arrow_count -= 1;
        Ok(u)
    }

    /// Remove the arrow at position `index` of the backward row of `v`.
    ///
    /// Returns the predecessor the arrow came from.
    pub fn remove_prev_at(&mut self, v: usize, index: usize) -> GraphResult<usize> {
        self.check_vertex(v)?;
        Self::check_index(index, self.prev_count(v))?;
        let u = self.prev_chunks.get_or_create(v).remove_arrow_at(v, index);
        let mirrored = self.next_chunks.get_or_create(u).try_remove_arrow(u, v);
        assert!(mirrored, "mirror invariant violated: arrow {u} -> {v} missing from next row");
        self.arrow_count -= 1;
        Ok(u)
    }

    /// Remove every arrow leaving `v`. Returns how many were removed.
    pub fn remove_all_next(&mut self, v: usize) -> GraphResult<usize> {
        self.check_vertex(v)?;
        let removed = Self::remove_all(&mut self.next_chunks, &mut self.prev_chunks, v);
        self.arrow_count -= removed;
        Ok(removed)
    }

    /// Remove every arrow entering `v`. Returns how many were removed.
    pub fn remove_all_prev(&mut self, v: usize) -> GraphResult<usize> {
        self.check_vertex(v)?;
        let removed = Self::remove_all(&mut self.prev_chunks, &mut self.next_chunks, v);
        self.arrow_count -= removed;
        Ok(removed)
    }

    /// Clear the row of `v` in `own` and drop the mirror entries in `mirror`.
    fn remove_all(own: &mut ChunkArray<C>, mirror: &mut ChunkArray<C>, v: usize) -> usize {
        // Snapshot first: the mirror rows shift while we remove from them.
        let neighbors: SmallVec<[u32; 16]> = SmallVec::from_slice(own.row(v));
        for &u in neighbors.iter().rev() {
            let u = u as usize;
            let mirrored = mirror.get_or_create(u).try_remove_arrow(u, v);
            assert!(mirrored, "mirror invariant violated: {v} missing from row of {u}");
        }
        if !neighbors.is_empty() {
            own.get_or_create(v).remove_all_arrows(v);
        }
        debug!(
            direction = own.direction,
            vertex = v,
            removed = neighbors.len(),
            "graph.remove_all"
        );
        neighbors.len()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Number of successors of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn next_count(&self, v: usize) -> usize {
        self.assert_vertex(v);
        self.next_chunks.row(v).len()
    }

    /// Number of predecessors of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn prev_count(&self, v: usize) -> usize {
        self.assert_vertex(v);
        self.prev_chunks.row(v).len()
    }

    /// The `i`-th successor of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex or `i >= next_count(v)`.
    #[track_caller]
    pub fn next(&self, v: usize, i: usize) -> usize {
        self.assert_vertex(v);
        self.next_chunks.row(v)[i] as usize
    }

    /// The `i`-th predecessor of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex or `i >= prev_count(v)`.
    #[track_caller]
    pub fn prev(&self, v: usize, i: usize) -> usize {
        self.assert_vertex(v);
        self.prev_chunks.row(v)[i] as usize
    }

    /// Payload of the `i`-th arrow leaving `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex or `i >= next_count(v)`.
    #[track_caller]
    pub fn next_arrow(&self, v: usize, i: usize) -> i32 {
        self.assert_vertex(v);
        self.next_chunks.arrows(v)[i]
    }

    /// Payload of the `i`-th arrow entering `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex or `i >= prev_count(v)`.
    #[track_caller]
    pub fn prev_arrow(&self, v: usize, i: usize) -> i32 {
        self.assert_vertex(v);
        self.prev_chunks.arrows(v)[i]
    }

    /// Position of `u` in the forward row of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn find_index_of_next(&self, v: usize, u: usize) -> Option<usize> {
        self.assert_vertex(v);
        self.next_chunks.get(v).and_then(|chunk| chunk.index_of(v, u))
    }

    /// Position of `u` in the backward row of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn find_index_of_prev(&self, v: usize, u: usize) -> Option<usize> {
        self.assert_vertex(v);
        self.prev_chunks.get(v).and_then(|chunk| chunk.index_of(v, u))
    }

    /// Successors of `v`, in row order.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn next_vertices(&self, v: usize) -> RowVertices<'_> {
        self.assert_vertex(v);
        self.next_chunks.row(v).iter().map(widen as fn(&u32) -> usize)
    }

    /// Predecessors of `v`, in row order.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn prev_vertices(&self, v: usize) -> RowVertices<'_> {
        self.assert_vertex(v);
        self.prev_chunks.row(v).iter().map(widen as fn(&u32) -> usize)
    }

    /// Payloads of the arrows leaving `v`, parallel to [`next_vertices`](Self::next_vertices).
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn next_arrows(&self, v: usize) -> impl Iterator<Item = i32> + '_ {
        self.assert_vertex(v);
        self.next_chunks.arrows(v).iter().copied()
    }

    /// Payloads of the arrows entering `v`, parallel to [`prev_vertices`](Self::prev_vertices).
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn prev_arrows(&self, v: usize) -> impl Iterator<Item = i32> + '_ {
        self.assert_vertex(v);
        self.prev_chunks.arrows(v).iter().copied()
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    /// Vertices reachable from `v` along forward arrows, `v` included.
    ///
    /// Breadth-first unless `dfs` is set. `visited` decides which vertices
    /// are fresh; a vertex it already contains is neither yielded nor
    /// expanded, so one set can be shared across several searches.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn search_next<V>(&self, v: usize, dfs: bool, visited: V) -> SearchEnumerator<'_, C, V>
    where
        V: crate::visited::VisitedSet,
    {
        self.assert_vertex(v);
        SearchEnumerator::new(&self.next_chunks, v, dfs, visited)
    }

    /// Vertices reachable from `v` along backward arrows, `v` included.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn search_prev<V>(&self, v: usize, dfs: bool, visited: V) -> SearchEnumerator<'_, C, V>
    where
        V: crate::visited::VisitedSet,
    {
        self.assert_vertex(v);
        SearchEnumerator::new(&self.prev_chunks, v, dfs, visited)
    }

    /// Like [`search_next`](Self::search_next), yielding `(vertex, vertex_data)`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn search_next_data<V>(
        &self,
        v: usize,
        dfs: bool,
        visited: V,
    ) -> SearchDataEnumerator<'_, C, V>
    where
        V: crate::visited::VisitedSet,
    {
        self.search_next(v, dfs, visited).with_data()
    }

    /// Like [`search_prev`](Self::search_prev), yielding `(vertex, vertex_data)`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex.
    #[track_caller]
    pub fn search_prev_data<V>(
        &self,
        v: usize,
        dfs: bool,
        visited: V,
    ) -> SearchDataEnumerator<'_, C, V>
    where
        V: crate::visited::VisitedSet,
    {
        self.search_prev(v, dfs, visited).with_data()
    }

    /// Breadth-first successors of `v` with a private visited set.
    #[track_caller]
    pub fn breadth_first_next(&self, v: usize) -> SearchEnumerator<'_, C, BitSetVisited> {
        self.search_next(v, false, BitSetVisited::with_capacity(self.vertex_count))
    }

    /// Breadth-first predecessors of `v` with a private visited set.
    #[track_caller]
    pub fn breadth_first_prev(&self, v: usize) -> SearchEnumerator<'_, C, BitSetVisited> {
        self.search_prev(v, false, BitSetVisited::with_capacity(self.vertex_count))
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    fn check_vertex(&self, v: usize) -> GraphResult<()> {
        if v < self.vertex_count {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex: v,
                vertex_count: self.vertex_count,
            })
        }
    }

    fn check_index(index: usize, len: usize) -> GraphResult<()> {
        if index < len {
            Ok(())
        } else {
            Err(GraphError::IndexOutOfRange { index, len })
        }
    }

    #[track_caller]
    fn assert_vertex(&self, v: usize) {
        assert!(
            v < self.vertex_count,
            "vertex {v} out of range for vertex count {}",
            self.vertex_count
        );
    }
}
