//! Vertex Sequence Finder
//!
//! A search over an abstract successor function with a pluggable cost type.
//! The finder knows nothing about graph storage: it is configured with
//!
//! - `next_nodes`: the successors of a vertex ([`NextNodes`])
//! - `cost`: the cost of stepping from `v` to `u`
//! - `sum`: how costs accumulate
//! - `zero`: the cost of the empty path
//! - `max_cost`: the default ceiling for [`is_reachable`](VertexSequenceFinder::is_reachable)
//!
//! # Search Order
//!
//! [`find_vertex_sequence`](VertexSequenceFinder::find_vertex_sequence) is
//! breadth-first from all start vertices at once and returns the first path
//! that reaches a goal. Candidates are tried in the order `next_nodes`
//! yields them; nothing re-sorts them.
//!
//! [`find_cheapest_vertex_sequence`](VertexSequenceFinder::find_cheapest_vertex_sequence)
//! expands candidates by accumulated cost instead (Dijkstra), breaking ties
//! by discovery order. It requires costs that never decrease along a path.
//!
//! In both, a partial path whose cost exceeds the ceiling is dropped without
//! marking its head vertex, so a cheaper path may still reach that vertex.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::iter;

use tracing::{debug, trace};

use crate::error::PathError;
use crate::visited::{BitSetVisited, VisitedSet};

use super::backlink::BackLinks;
use super::next_nodes::NextNodes;
use super::VertexSequence;

/// Path finder over a successor function and a summable cost.
///
/// # Example
///
/// ```rust
/// use bidigraph_core::path::VertexSequenceFinder;
///
/// // 0 -> 1 -> 2 -> 3, each step costs its target's index.
/// let finder = VertexSequenceFinder::new(
///     |v: usize| if v < 3 { vec![v + 1] } else { vec![] },
///     |_v: usize, u: usize| u as u64,
///     |a: u64, b: u64| a + b,
///     0u64,
///     u64::MAX,
/// );
///
/// let path = finder.find_vertex_sequence([0], |v| v == 3, 10).unwrap();
/// assert_eq!(path.vertices, vec![0, 1, 2, 3]);
/// assert_eq!(path.cost, 6);
/// assert!(finder.find_vertex_sequence([0], |v| v == 3, 5).is_none());
/// ```
pub struct VertexSequenceFinder<N, C, K, S> {
    next_nodes: N,
    cost: K,
    sum: S,
    zero: C,
    max_cost: C,
}

fn unit_cost(_from: usize, _to: usize) -> u32 {
    1
}

impl<N: NextNodes> VertexSequenceFinder<N, u32, fn(usize, usize) -> u32, fn(u32, u32) -> u32> {
    /// A finder where every arrow costs 1 and costs saturate at `u32::MAX`.
    pub fn hop_count(next_nodes: N) -> Self {
        Self::new(next_nodes, unit_cost, u32::saturating_add, 0, u32::MAX)
    }
}

impl<N, C, K, S> VertexSequenceFinder<N, C, K, S>
where
    N: NextNodes,
    C: Copy + PartialOrd,
    K: Fn(usize, usize) -> C,
    S: Fn(C, C) -> C,
{
    /// Create a finder.
    pub fn new(next_nodes: N, cost: K, sum: S, zero: C, max_cost: C) -> Self {
        Self {
            next_nodes,
            cost,
            sum,
            zero,
            max_cost,
        }
    }

    /// The successor function.
    pub fn next_nodes(&self) -> &N {
        &self.next_nodes
    }

    /// Cost of the empty path.
    pub fn zero(&self) -> C {
        self.zero
    }

    /// Default cost ceiling.
    pub fn max_cost(&self) -> C {
        self.max_cost
    }

    // ---------------------------------------------------------------------
    // Single-leg searches
    // ---------------------------------------------------------------------

    /// First path found from any of `starts` to a vertex satisfying `goal`,
    /// with cost at most `max_cost`.
    pub fn find_vertex_sequence<I, G>(
        &self,
        starts: I,
        goal: G,
        max_cost: C,
    ) -> Option<VertexSequence<C>>
    where
        I: IntoIterator<Item = usize>,
        G: Fn(usize) -> bool,
    {
        self.find_vertex_sequence_with(starts, goal, BitSetVisited::new(), max_cost)
    }

    /// Like [`find_vertex_sequence`](Self::find_vertex_sequence) with a
    /// caller-supplied visited set. Vertices already in the set are never
    /// entered.
    pub fn find_vertex_sequence_with<I, G, V>(
        &self,
        starts: I,
        goal: G,
        mut visited: V,
        max_cost: C,
    ) -> Option<VertexSequence<C>>
    where
        I: IntoIterator<Item = usize>,
        G: Fn(usize) -> bool,
        V: VisitedSet,
    {
        let mut links = BackLinks::new();
        let mut queue = VecDeque::new();
        for start in starts {
            if visited.add(start) {
                queue.push_back(links.push(start, None, self.zero));
            }
        }

        while let Some(handle) = queue.pop_front() {
            let link = links.get(handle);
            if goal(link.vertex) {
                trace!(goal = link.vertex, explored = links.len(), "path.search.found");
                return Some(links.path_to(handle));
            }
            for next in self.next_nodes.next_nodes(link.vertex) {
                let cost = (self.sum)(link.cost, (self.cost)(link.vertex, next));
                if cost > max_cost {
                    continue;
                }
                if visited.add(next) {
                    queue.push_back(links.push(next, Some(handle), cost));
                }
            }
        }
        trace!(explored = links.len(), "path.search.exhausted");
        None
    }

    /// Single-start form of [`find_vertex_sequence_with`](Self::find_vertex_sequence_with).
    pub fn find_vertex_sequence_from<G, V>(
        &self,
        start: usize,
        goal: G,
        visited: V,
        max_cost: C,
    ) -> Option<VertexSequence<C>>
    where
        G: Fn(usize) -> bool,
        V: VisitedSet,
    {
        self.find_vertex_sequence_with(iter::once(start), goal, visited, max_cost)
    }

    /// Cheapest path from any of `starts` to a vertex satisfying `goal`,
    /// with cost at most `max_cost`.
    pub fn find_cheapest_vertex_sequence<I, G>(
        &self,
        starts: I,
        goal: G,
        max_cost: C,
    ) -> Option<VertexSequence<C>>
    where
        I: IntoIterator<Item = usize>,
        G: Fn(usize) -> bool,
    {
        let mut links = BackLinks::new();
        let mut settled = BitSetVisited::new();
        let mut heap = BinaryHeap::new();
        let mut sequence = 0;
        for start in starts {
            let handle = links.push(start, None, self.zero);
            heap.push(Candidate::new(self.zero, sequence, handle));
            sequence += 1;
        }

        while let Some(candidate) = heap.pop() {
            let link = links.get(candidate.handle);
            if !settled.add(link.vertex) {
                continue;
            }
            if goal(link.vertex) {
                trace!(goal = link.vertex, explored = links.len(), "path.cheapest.found");
                return Some(links.path_to(candidate.handle));
            }
            for next in self.next_nodes.next_nodes(link.vertex) {
                if settled.contains(next) {
                    continue;
                }
                let cost = (self.sum)(link.cost, (self.cost)(link.vertex, next));
                if cost > max_cost {
                    continue;
                }
                let handle = links.push(next, Some(candidate.handle), cost);
                heap.push(Candidate::new(cost, sequence, handle));
                sequence += 1;
            }
        }
        trace!(explored = links.len(), "path.cheapest.exhausted");
        None
    }

    // ---------------------------------------------------------------------
    // Reachability
    // ---------------------------------------------------------------------

    /// Whether a vertex satisfying `goal` is reachable from `start` within
    /// the default ceiling.
    pub fn is_reachable<G>(&self, start: usize, goal: G) -> bool
    where
        G: Fn(usize) -> bool,
    {
        self.is_reachable_from([start], goal, self.max_cost)
    }

    /// Whether a vertex satisfying `goal` is reachable from `start` within
    /// `max_cost`.
    pub fn is_reachable_within<G>(&self, start: usize, goal: G, max_cost: C) -> bool
    where
        G: Fn(usize) -> bool,
    {
        self.is_reachable_from([start], goal, max_cost)
    }

    /// Whether a vertex satisfying `goal` is reachable from any of `starts`
    /// within `max_cost`. Same traversal as
    /// [`find_vertex_sequence`](Self::find_vertex_sequence), without back-links.
    pub fn is_reachable_from<I, G>(&self, starts: I, goal: G, max_cost: C) -> bool
    where
        I: IntoIterator<Item = usize>,
        G: Fn(usize) -> bool,
    {
        let mut visited = BitSetVisited::new();
        let mut queue = VecDeque::new();
        for start in starts {
            if visited.add(start) {
                queue.push_back((start, self.zero));
            }
        }

        while let Some((vertex, cost)) = queue.pop_front() {
            if goal(vertex) {
                return true;
            }
            for next in self.next_nodes.next_nodes(vertex) {
                let next_cost = (self.sum)(cost, (self.cost)(vertex, next));
                if next_cost > max_cost {
                    continue;
                }
                if visited.add(next) {
                    queue.push_back((next, next_cost));
                }
            }
        }
        false
    }

    // ---------------------------------------------------------------------
    // Waypoints
    // ---------------------------------------------------------------------

    /// Path through `waypoints` in order.
    ///
    /// Each consecutive pair is solved independently with a fresh visited
    /// set, so legs may revisit vertices. The result is the concatenation of
    /// the legs, sharing each inner waypoint once; its cost is the sum of
    /// the leg costs. A single waypoint yields a one-vertex path of cost
    /// `zero`.
    pub fn find_vertex_sequence_over_waypoints<I>(
        &self,
        waypoints: I,
        max_cost_between_waypoints: C,
    ) -> Result<VertexSequence<C>, PathError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut waypoints = waypoints.into_iter();
        let Some(mut start) = waypoints.next() else {
            return Err(PathError::EmptyWaypoints);
        };

        let mut vertices = vec![start];
        let mut cost = self.zero;
        for goal in waypoints {
            let leg = self
                .find_vertex_sequence([start], |v| v == goal, max_cost_between_waypoints)
                .ok_or_else(|| {
                    debug!(start, goal, "path.waypoints.unreachable");
                    PathError::LegUnreachable { start, goal }
                })?;
            vertices.extend_from_slice(&leg.vertices[1..]);
            cost = (self.sum)(cost, leg.cost);
            start = goal;
        }
        Ok(VertexSequence { vertices, cost })
    }

    /// Whether every consecutive pair of `waypoints` is connected within
    /// `max_cost_between_waypoints`. An empty list is not reachable.
    pub fn is_reachable_over_waypoints<I>(
        &self,
        waypoints: I,
        max_cost_between_waypoints: C,
    ) -> bool
    where
        I: IntoIterator<Item = usize>,
    {
        let mut waypoints = waypoints.into_iter();
        let Some(mut start) = waypoints.next() else {
            return false;
        };
        for goal in waypoints {
            if !self.is_reachable_within(start, |v| v == goal, max_cost_between_waypoints) {
                return false;
            }
            start = goal;
        }
        true
    }
}

/// Heap entry ordered so that the cheapest, earliest candidate pops first.
struct Candidate<C> {
    cost: C,
    sequence: usize,
    handle: usize,
}

impl<C> Candidate<C> {
    fn new(cost: C, sequence: usize, handle: usize) -> Self {
        Self {
            cost,
            sequence,
            handle,
        }
    }
}

impl<C: PartialOrd> Ord for Candidate<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<C: PartialOrd> PartialOrd for Candidate<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: PartialOrd> PartialEq for Candidate<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: PartialOrd> Eq for Candidate<C> {}
