//! Small-Vector Chunk
//!
//! Each row is its own pair of `SmallVec`s. Rows with up to four arrows stay
//! inline in the chunk; longer rows spill to the heap independently, so no
//! compaction is ever needed.

use smallvec::SmallVec;

use super::GraphChunk;

const INLINE_ARITY: usize = 4;

#[derive(Debug, Clone, Default)]
struct SmallRow {
    siblings: SmallVec<[u32; INLINE_ARITY]>,
    arrows: SmallVec<[i32; INLINE_ARITY]>,
}

/// Chunk with one inline small vector per row.
#[derive(Debug, Clone)]
pub struct SmallVecChunk {
    mask: usize,
    rows: Vec<SmallRow>,
    vertex_data: Vec<i32>,
}

impl SmallVecChunk {
    fn row(&self, vertex: usize) -> &SmallRow {
        &self.rows[vertex & self.mask]
    }

    fn row_mut(&mut self, vertex: usize) -> &mut SmallRow {
        &mut self.rows[vertex & self.mask]
    }
}

impl GraphChunk for SmallVecChunk {
    fn new(chunk_size: usize, initial_arity: usize) -> Self {
        let rows = (0..chunk_size)
            .map(|_| SmallRow {
                siblings: SmallVec::with_capacity(initial_arity),
                arrows: SmallVec::with_capacity(initial_arity),
            })
            .collect();
        Self {
            mask: chunk_size - 1,
            rows,
            vertex_data: vec![0; chunk_size],
        }
    }

    fn try_add_arrow(
        &mut self,
        vertex: usize,
        target: usize,
        data: i32,
        update_if_present: bool,
    ) -> bool {
        let index = self.index_of(vertex, target);
        let row = self.row_mut(vertex);
        match index {
            Some(index) => {
                if update_if_present {
                    row.arrows[index] = data;
                }
                false
            }
            None => {
                row.siblings.push(target as u32);
                row.arrows.push(data);
                true
            }
        }
    }

    fn remove_arrow_at(&mut self, vertex: usize, index: usize) -> usize {
        let row = self.row_mut(vertex);
        assert!(
            index < row.siblings.len(),
            "row index {index} out of range for length {}",
            row.siblings.len()
        );
        row.arrows.remove(index);
        row.siblings.remove(index) as usize
    }

    fn remove_all_arrows(&mut self, vertex: usize) {
        let row = self.row_mut(vertex);
        row.siblings.clear();
        row.arrows.clear();
    }

    fn siblings(&self, vertex: usize) -> &[u32] {
        &self.row(vertex).siblings
    }

    fn arrows(&self, vertex: usize) -> &[i32] {
        &self.row(vertex).arrows
    }

    fn vertex_data(&self, vertex: usize) -> i32 {
        self.vertex_data[vertex & self.mask]
    }

    fn set_vertex_data(&mut self, vertex: usize, data: i32) {
        self.vertex_data[vertex & self.mask] = data;
    }
}
