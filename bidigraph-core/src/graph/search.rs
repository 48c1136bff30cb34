//! Traversal Enumerators
//!
//! Lazy breadth-first or depth-first walks over one direction of a
//! [`ChunkedBidiGraph`](super::ChunkedBidiGraph).
//!
//! # Algorithm
//!
//! The frontier is a double-ended queue of vertex ids. A vertex is marked in
//! the visited set at the moment it is pushed, so it is pushed, and yielded,
//! at most once.
//!
//! - BFS pops from the front and pushes at the back (queue discipline).
//! - DFS pops from the back and pushes at the back (stack discipline).
//!
//! An enumerator is consumed once. Starting over needs a new enumerator and,
//! unless the old marks should carry over, a fresh visited set.
//!
//! # Splitting
//!
//! [`SearchEnumerator::split_frontier`] hands part of the already discovered,
//! not yet yielded frontier to a [`FrontierSplit`] that can be consumed on
//! another thread. The enumerator still expands the handed-off vertices but
//! no longer yields them, so the two outputs together are exactly the
//! reachable set.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::chunk::GraphChunk;
use crate::visited::VisitedSet;

use super::bidi::ChunkArray;

/// Frontier entries with this bit set are expanded but not yielded.
const SILENT: u32 = 1 << 31;

/// Lazy traversal yielding vertex ids.
pub struct SearchEnumerator<'g, C, V> {
    chunks: &'g ChunkArray<C>,
    frontier: VecDeque<u32>,
    visited: V,
    dfs: bool,
    /// Frontier entries that will still be yielded.
    pending: usize,
}

impl<'g, C: GraphChunk, V: VisitedSet> SearchEnumerator<'g, C, V> {
    pub(crate) fn new(chunks: &'g ChunkArray<C>, root: usize, dfs: bool, mut visited: V) -> Self {
        let mut frontier = VecDeque::with_capacity(16);
        if visited.add(root) {
            frontier.push_back(root as u32);
        }
        let pending = frontier.len();
        Self {
            chunks,
            frontier,
            visited,
            dfs,
            pending,
        }
    }

    /// Whether this is a depth-first walk.
    pub fn is_depth_first(&self) -> bool {
        self.dfs
    }

    /// Give back the visited set, e.g. to reuse it for the next search.
    pub fn into_visited(self) -> V {
        self.visited
    }

    /// Also yield the payload of each vertex.
    pub fn with_data(self) -> SearchDataEnumerator<'g, C, V> {
        SearchDataEnumerator { inner: self }
    }

    /// Hand off up to half of the pending frontier.
    ///
    /// The handed-off vertices are the ones this enumerator would have
    /// yielded last. Returns `None` when fewer than two vertices are pending.
    pub fn split_frontier(&mut self) -> Option<FrontierSplit> {
        if self.pending < 2 {
            return None;
        }
        let take = self.pending / 2;
        let mut vertices = Vec::with_capacity(take);

        // BFS yields from the front, so the back is consumed last; DFS the reverse.
        let len = self.frontier.len();
        for step in 0..len {
            if vertices.len() == take {
                break;
            }
            let position = if self.dfs { step } else { len - 1 - step };
            let entry = &mut self.frontier[position];
            if *entry & SILENT == 0 {
                vertices.push(*entry as usize);
                *entry |= SILENT;
            }
        }
        if !self.dfs {
            vertices.reverse();
        }

        self.pending -= vertices.len();
        Some(FrontierSplit {
            vertices: vertices.into_iter(),
        })
    }

    /// Pop the next frontier entry and expand it.
    fn advance(&mut self) -> Option<usize> {
        loop {
            let entry = if self.dfs {
                self.frontier.pop_back()?
            } else {
                self.frontier.pop_front()?
            };
            let vertex = (entry & !SILENT) as usize;
            for &next in self.chunks.row(vertex) {
                if self.visited.add(next as usize) {
                    self.frontier.push_back(next);
                    self.pending += 1;
                }
            }
            if entry & SILENT == 0 {
                self.pending -= 1;
                return Some(vertex);
            }
        }
    }
}

impl<C: GraphChunk, V: VisitedSet> Iterator for SearchEnumerator<'_, C, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending, None)
    }
}

impl<C: GraphChunk, V: VisitedSet> FusedIterator for SearchEnumerator<'_, C, V> {}

/// Lazy traversal yielding `(vertex, vertex_data)` pairs.
pub struct SearchDataEnumerator<'g, C, V> {
    inner: SearchEnumerator<'g, C, V>,
}

impl<C: GraphChunk, V: VisitedSet> SearchDataEnumerator<'_, C, V> {
    /// See [`SearchEnumerator::split_frontier`]. The split yields bare
    /// vertex ids.
    pub fn split_frontier(&mut self) -> Option<FrontierSplit> {
        self.inner.split_frontier()
    }
}

impl<C: GraphChunk, V: VisitedSet> Iterator for SearchDataEnumerator<'_, C, V> {
    type Item = (usize, i32);

    fn next(&mut self) -> Option<(usize, i32)> {
        let vertex = self.inner.advance()?;
        Some((vertex, self.inner.chunks.vertex_data(vertex)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C: GraphChunk, V: VisitedSet> FusedIterator for SearchDataEnumerator<'_, C, V> {}

/// Vertices handed off by [`SearchEnumerator::split_frontier`].
#[derive(Debug, Clone)]
pub struct FrontierSplit {
    vertices: std::vec::IntoIter<usize>,
}

impl Iterator for FrontierSplit {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.vertices.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.vertices.size_hint()
    }
}

impl ExactSizeIterator for FrontierSplit {}

impl FusedIterator for FrontierSplit {}
