//! Visited Sets
//!
//! Traversals do not own a fixed set type. They take anything implementing
//! [`VisitedSet`], a single "add if absent" operation that both marks and
//! tests a vertex. Callers pick the representation that suits the graph:
//!
//! - [`BitSetVisited`]: one bit per vertex, grows on demand.
//! - [`DenseVisitedSet`]: one `u16` stamp per vertex; `clear()` is O(1)
//!   amortized, which pays off when the same set is reused for many searches.
//! - `HashSet<usize>` / `IndexSet<usize>`: sparse ids, or when the visit
//!   order must be recorded.
//! - [`FnVisited`]: any closure `FnMut(usize) -> bool`.

use std::collections::HashSet;
use std::hash::BuildHasher;

use indexmap::IndexSet;

/// An "add if absent" capability over vertex ids.
pub trait VisitedSet {
    /// Mark `vertex` as visited.
    ///
    /// Returns `true` if the vertex was not visited before.
    fn add(&mut self, vertex: usize) -> bool;
}

impl<T: VisitedSet + ?Sized> VisitedSet for &mut T {
    fn add(&mut self, vertex: usize) -> bool {
        (**self).add(vertex)
    }
}

impl<S: BuildHasher> VisitedSet for HashSet<usize, S> {
    fn add(&mut self, vertex: usize) -> bool {
        self.insert(vertex)
    }
}

impl<S: BuildHasher> VisitedSet for IndexSet<usize, S> {
    fn add(&mut self, vertex: usize) -> bool {
        self.insert(vertex)
    }
}

/// Adapter turning a closure into a [`VisitedSet`].
///
/// # Example
///
/// ```rust
/// use bidigraph_core::visited::{FnVisited, VisitedSet};
///
/// let mut seen = Vec::new();
/// let mut visited = FnVisited(|v: usize| {
///     if seen.contains(&v) {
///         false
///     } else {
///         seen.push(v);
///         true
///     }
/// });
/// assert!(visited.add(3));
/// assert!(!visited.add(3));
/// ```
pub struct FnVisited<F>(pub F);

impl<F: FnMut(usize) -> bool> VisitedSet for FnVisited<F> {
    fn add(&mut self, vertex: usize) -> bool {
        (self.0)(vertex)
    }
}

/// Growable bitset.
#[derive(Debug, Clone, Default)]
pub struct BitSetVisited {
    words: Vec<u64>,
}

impl BitSetVisited {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set sized for `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
        }
    }

    /// Check whether `vertex` has been visited.
    pub fn contains(&self, vertex: usize) -> bool {
        self.words
            .get(vertex >> 6)
            .is_some_and(|&word| word & (1u64 << (vertex & 63)) != 0)
    }

    /// Number of visited vertices.
    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Check whether no vertex has been visited.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Forget all visited vertices, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

impl VisitedSet for BitSetVisited {
    fn add(&mut self, vertex: usize) -> bool {
        let word = vertex >> 6;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let bit = 1u64 << (vertex & 63);
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        fresh
    }
}

/// Generation-stamped dense set.
///
/// A vertex is visited when its stamp equals the current generation.
/// Clearing bumps the generation; only on wrap-around are the stamps
/// actually zeroed.
#[derive(Debug, Clone)]
pub struct DenseVisitedSet {
    stamps: Vec<u16>,
    generation: u16,
}

impl Default for DenseVisitedSet {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl DenseVisitedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set sized for `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stamps: vec![0; capacity],
            generation: 1,
        }
    }

    /// Number of vertices the set can hold without growing.
    pub fn capacity(&self) -> usize {
        self.stamps.len()
    }

    /// Check whether `vertex` has been visited.
    pub fn contains(&self, vertex: usize) -> bool {
        self.stamps.get(vertex) == Some(&self.generation)
    }

    /// Remove `vertex`. Returns whether it was visited.
    pub fn remove(&mut self, vertex: usize) -> bool {
        match self.stamps.get_mut(vertex) {
            Some(stamp) if *stamp == self.generation => {
                *stamp = 0;
                true
            }
            _ => false,
        }
    }

    /// Forget all visited vertices.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
    }
}

impl VisitedSet for DenseVisitedSet {
    fn add(&mut self, vertex: usize) -> bool {
        if vertex >= self.stamps.len() {
            self.stamps.resize(vertex + 1, 0);
        }
        let stamp = &mut self.stamps[vertex];
        if *stamp == self.generation {
            false
        } else {
            *stamp = self.generation;
            true
        }
    }
}
