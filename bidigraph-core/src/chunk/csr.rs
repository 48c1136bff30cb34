//! Single-Array CSR Chunk
//!
//! All rows of the chunk live in one pair of parallel backing arrays
//! (`siblings` for targets, `arrows` for payloads). Each vertex owns a
//! contiguous window described by its row record.
//!
//! # Memory Layout
//!
//! On creation every vertex gets `initial_arity` slots, laid out in vertex
//! order. When a row fills up it is moved to the tail of the backing arrays
//! with twice its capacity, abandoning its old window. Once the abandoned
//! slots exceed half of the reserved ones, the chunk is compacted back into
//! a dense layout.

use super::GraphChunk;

/// Window of a row inside the backing arrays.
#[derive(Debug, Clone, Copy, Default)]
struct Row {
    offset: usize,
    len: usize,
    capacity: usize,
}

impl Row {
    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Chunk whose rows share a single backing array.
#[derive(Debug, Clone)]
pub struct CsrChunk {
    mask: usize,
    rows: Vec<Row>,
    siblings: Vec<u32>,
    arrows: Vec<i32>,
    vertex_data: Vec<i32>,
    /// Sum of all row capacities. Everything else in the backing arrays
    /// is abandoned.
    reserved: usize,
}

impl CsrChunk {
    /// Total slots in the backing arrays, including abandoned ones.
    pub fn backing_len(&self) -> usize {
        self.siblings.len()
    }

    /// Slots that no row owns any more.
    pub fn abandoned(&self) -> usize {
        self.siblings.len() - self.reserved
    }

    fn row(&self, vertex: usize) -> Row {
        self.rows[vertex & self.mask]
    }

    /// Move the row to the tail with doubled capacity.
    fn grow_row(&mut self, local: usize) {
        let row = self.rows[local];
        let capacity = (row.capacity * 2).max(1);
        let offset = self.siblings.len();

        self.siblings.resize(offset + capacity, 0);
        self.arrows.resize(offset + capacity, 0);
        self.siblings.copy_within(row.range(), offset);
        self.arrows.copy_within(row.range(), offset);

        self.rows[local] = Row {
            offset,
            len: row.len,
            capacity,
        };
        self.reserved += capacity - row.capacity;

        if self.abandoned() * 2 > self.reserved {
            self.compact();
        }
    }

    /// Rewrite the backing arrays so that rows are dense again.
    fn compact(&mut self) {
        let mut siblings = vec![0; self.reserved];
        let mut arrows = vec![0; self.reserved];
        let mut offset = 0;
        for row in &mut self.rows {
            let len = row.len;
            siblings[offset..offset + len].copy_from_slice(&self.siblings[row.range()]);
            arrows[offset..offset + len].copy_from_slice(&self.arrows[row.range()]);
            row.offset = offset;
            offset += row.capacity;
        }
        self.siblings = siblings;
        self.arrows = arrows;
    }
}

impl GraphChunk for CsrChunk {
    fn new(chunk_size: usize, initial_arity: usize) -> Self {
        let rows = (0..chunk_size)
            .map(|local| Row {
                offset: local * initial_arity,
                len: 0,
                capacity: initial_arity,
            })
            .collect();
        let reserved = chunk_size * initial_arity;
        Self {
            mask: chunk_size - 1,
            rows,
            siblings: vec![0; reserved],
            arrows: vec![0; reserved],
            vertex_data: vec![0; chunk_size],
            reserved,
        }
    }

    fn try_add_arrow(
        &mut self,
        vertex: usize,
        target: usize,
        data: i32,
        update_if_present: bool,
    ) -> bool {
        if let Some(index) = self.index_of(vertex, target) {
            if update_if_present {
                let row = self.row(vertex);
                self.arrows[row.offset + index] = data;
            }
            return false;
        }

        let local = vertex & self.mask;
        if self.rows[local].len == self.rows[local].capacity {
            self.grow_row(local);
        }
        let row = &mut self.rows[local];
        let slot = row.offset + row.len;
        row.len += 1;
        self.siblings[slot] = target as u32;
        self.arrows[slot] = data;
        true
    }

    fn remove_arrow_at(&mut self, vertex: usize, index: usize) -> usize {
        let local = vertex & self.mask;
        let row = self.rows[local];
        assert!(
            index < row.len,
            "row index {index} out of range for length {}",
            row.len
        );
        let slot = row.offset + index;
        let target = self.siblings[slot] as usize;
        let end = row.offset + row.len;
        self.siblings.copy_within(slot + 1..end, slot);
        self.arrows.copy_within(slot + 1..end, slot);
        self.rows[local].len -= 1;
        target
    }

    fn remove_all_arrows(&mut self, vertex: usize) {
        self.rows[vertex & self.mask].len = 0;
    }

    fn siblings(&self, vertex: usize) -> &[u32] {
        &self.siblings[self.row(vertex).range()]
    }

    fn arrows(&self, vertex: usize) -> &[i32] {
        &self.arrows[self.row(vertex).range()]
    }

    fn vertex_data(&self, vertex: usize) -> i32 {
        self.vertex_data[vertex & self.mask]
    }

    fn set_vertex_data(&mut self, vertex: usize, data: i32) {
        self.vertex_data[vertex & self.mask] = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::conformance;

    #[test]
    fn add_and_query() {
        conformance::add_and_query::<CsrChunk>();
    }

    #[test]
    fn duplicate_add_respects_update_flag() {
        conformance::duplicate_add_respects_update_flag::<CsrChunk>();
    }

    #[test]
    fn rows_grow_past_initial_capacity() {
        conformance::rows_grow_past_initial_capacity::<CsrChunk>();
    }

    #[test]
    fn removal() {
        conformance::removal::<CsrChunk>();
    }

    #[test]
    fn vertex_data_is_independent_of_rows() {
        conformance::vertex_data_is_independent_of_rows::<CsrChunk>();
    }

    #[test]
    fn global_indices_are_masked() {
        conformance::global_indices_are_masked::<CsrChunk>();
    }

    #[test]
    fn initial_layout_is_dense() {
        let chunk = CsrChunk::new(8, 3);
        assert_eq!(chunk.backing_len(), 24);
        assert_eq!(chunk.abandoned(), 0);
    }

    #[test]
    fn growth_abandons_then_compacts() {
        let mut chunk = CsrChunk::new(2, 1);
        chunk.try_add_arrow(0, 1, 0, false);
        // Row 0 moves to the tail: one slot abandoned, three reserved.
        chunk.try_add_arrow(0, 2, 0, false);
        assert_eq!(chunk.abandoned(), 1);
        assert_eq!(chunk.backing_len(), 4);

        // Second move abandons three of five reserved slots and compacts.
        chunk.try_add_arrow(0, 3, 0, false);
        assert_eq!(chunk.abandoned(), 0);
        assert_eq!(chunk.backing_len(), 5);

        for target in 4..64 {
            chunk.try_add_arrow(0, target, 0, false);
            chunk.try_add_arrow(1, target, 1, false);
            let reserved = chunk.backing_len() - chunk.abandoned();
            assert!(chunk.abandoned() * 2 <= reserved);
        }
        let expected: Vec<u32> = (1..64).collect();
        assert_eq!(chunk.siblings(0), expected.as_slice());
        assert_eq!(chunk.siblings(1).len(), 60);
        assert!(chunk.arrows(1).iter().all(|&data| data == 1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn remove_at_past_end_panics() {
        let mut chunk = CsrChunk::new(4, 1);
        chunk.try_add_arrow(0, 1, 0, false);
        chunk.remove_arrow_at(0, 1);
    }
}
