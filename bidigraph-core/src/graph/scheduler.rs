//! Update Scheduler
//!
//! The scheduler maps caller keys (figures, cells, anything hashable) to
//! dense vertex ids and records "A depends on B" as an arrow `B -> A` in a
//! [`ChunkedBidiGraph`]. It answers the questions callers ask of such a
//! graph:
//!
//! - Can A start depending on B without forming a cycle?
//! - Which keys are affected when B changes?
//! - In which order must keys be updated so that dependencies come first?
//!
//! # Algorithm
//!
//! Cycle checks are reachability queries: adding `B -> A` closes a cycle
//! exactly when B is already reachable from A. Update orders use Kahn's
//! algorithm on in-degrees, restricted to the affected keys when only part
//! of the graph changed.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use indexmap::IndexSet;
use tracing::debug;

use crate::error::GraphResult;
use crate::path::{Forward, VertexSequenceFinder};
use crate::visited::BitSetVisited;

use super::bidi::ChunkedBidiGraph;

/// Dependency graph over caller keys.
///
/// # Example
///
/// ```rust
/// use bidigraph_core::UpdateScheduler;
///
/// let mut scheduler = UpdateScheduler::new();
/// scheduler.add_dependency("label", "shape").unwrap();
/// scheduler.add_dependency("arrow", "label").unwrap();
///
/// assert!(!scheduler.can_depend_on(&"shape", &"arrow"));
/// assert_eq!(
///     scheduler.update_order().unwrap(),
///     vec![&"shape", &"label", &"arrow"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UpdateScheduler<K> {
    keys: IndexSet<K>,
    graph: ChunkedBidiGraph,
}

impl<K: Hash + Eq> Default for UpdateScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> UpdateScheduler<K> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            keys: IndexSet::new(),
            graph: ChunkedBidiGraph::new(),
        }
    }

    /// Register a key and return its vertex id. Known keys keep their id.
    pub fn insert(&mut self, key: K) -> GraphResult<usize> {
        if let Some(index) = self.keys.get_index_of(&key) {
            return Ok(index);
        }
        let index = self.graph.add_vertex()?;
        self.keys.insert(key);
        Ok(index)
    }

    /// Vertex id of a key.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.keys.get_index_of(key)
    }

    /// Key of a vertex id.
    pub fn key(&self, index: usize) -> Option<&K> {
        self.keys.get_index(index)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The underlying graph. Arrows point from dependency to dependent.
    pub fn graph(&self) -> &ChunkedBidiGraph {
        &self.graph
    }

    /// Record that `dependent` depends on `dependency`, registering both.
    ///
    /// Returns `true` if the dependency is new. Cycles are not rejected here;
    /// use [`can_depend_on`](Self::can_depend_on) first.
    pub fn add_dependency(&mut self, dependent: K, dependency: K) -> GraphResult<bool> {
        let to = self.insert(dependent)?;
        let from = self.insert(dependency)?;
        self.graph.add_arrow(from, to)
    }

    /// Forget that `dependent` depends on `dependency`.
    pub fn remove_dependency(&mut self, dependent: &K, dependency: &K) -> GraphResult<bool> {
        match (self.index_of(dependency), self.index_of(dependent)) {
            (Some(from), Some(to)) => self.graph.remove_arrow(from, to),
            _ => Ok(false),
        }
    }

    /// Drop every dependency of `dependent`. Returns how many were removed.
    pub fn clear_dependencies(&mut self, dependent: &K) -> GraphResult<usize> {
        match self.index_of(dependent) {
            Some(index) => self.graph.remove_all_prev(index),
            None => Ok(0),
        }
    }

    /// Check whether `dependent` may depend on `dependency` without a cycle.
    pub fn can_depend_on(&self, dependent: &K, dependency: &K) -> bool {
        if dependent == dependency {
            return false;
        }
        match (self.index_of(dependent), self.index_of(dependency)) {
            (Some(from), Some(goal)) => {
                let finder = VertexSequenceFinder::hop_count(Forward(&self.graph));
                !finder.is_reachable(from, |v| v == goal)
            }
            _ => true,
        }
    }

    /// Direct dependencies of `key`.
    pub fn dependencies_of(&self, key: &K) -> Vec<&K> {
        self.index_of(key)
            .map(|index| self.keys_of(self.graph.prev_vertices(index)))
            .unwrap_or_default()
    }

    /// Every key that depends on `key`, directly or transitively.
    pub fn dependents_of(&self, key: &K) -> Vec<&K> {
        self.index_of(key)
            .map(|index| self.keys_of(self.graph.breadth_first_next(index).skip(1)))
            .unwrap_or_default()
    }

    /// All keys, dependencies before dependents.
    ///
    /// Returns `None` if the dependencies contain a cycle.
    pub fn update_order(&self) -> Option<Vec<&K>> {
        let all: Vec<usize> = (0..self.keys.len()).collect();
        self.topological_sort(&all)
            .map(|order| self.keys_of(order.into_iter()))
    }

    /// The keys to update after `changed` changed, in update order.
    ///
    /// `changed` itself is not included. Returns `None` if the affected keys
    /// contain a cycle.
    pub fn update_order_after(&self, changed: &K) -> Option<Vec<&K>> {
        let Some(source) = self.index_of(changed) else {
            return Some(Vec::new());
        };
        let mut visited = BitSetVisited::with_capacity(self.graph.vertex_count());
        let affected: Vec<usize> = self
            .graph
            .search_next(source, false, &mut visited)
            .skip(1)
            .collect();
        debug!(source, affected = affected.len(), "scheduler.changed");
        self.topological_sort(&affected)
            .map(|order| self.keys_of(order.into_iter()))
    }

    /// Kahn's algorithm over the subgraph induced by `nodes`.
    fn topological_sort(&self, nodes: &[usize]) -> Option<Vec<usize>> {
        let mut in_degree: HashMap<usize, usize> = HashMap::with_capacity(nodes.len());
        for &node in nodes {
            in_degree.insert(node, 0);
        }
        let mut queue = VecDeque::new();
        for &node in nodes {
            let degree = self
                .graph
                .prev_vertices(node)
                .filter(|dependency| in_degree.contains_key(dependency))
                .count();
            in_degree.insert(node, degree);
            if degree == 0 {
                queue.push_back(node);
            }
        }

        let mut result = Vec::with_capacity(nodes.len());
        while let Some(node) = queue.pop_front() {
            result.push(node);
            for dependent in self.graph.next_vertices(node) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if result.len() == nodes.len() {
            Some(result)
        } else {
            debug!(
                nodes = nodes.len(),
                ordered = result.len(),
                "scheduler.cycle"
            );
            None
        }
    }

    fn keys_of(&self, indices: impl Iterator<Item = usize>) -> Vec<&K> {
        indices.filter_map(|index| self.keys.get_index(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> UpdateScheduler<&'static str> {
        // source -> derived1 -> derived2, source -> effect
        let mut scheduler = UpdateScheduler::new();
        scheduler.add_dependency("derived1", "source").unwrap();
        scheduler.add_dependency("derived2", "derived1").unwrap();
        scheduler.add_dependency("effect", "source").unwrap();
        scheduler
    }

    #[test]
    fn insert_is_stable() {
        let mut scheduler = UpdateScheduler::new();
        let a = scheduler.insert("a").unwrap();
        let b = scheduler.insert("b").unwrap();
        assert_eq!(scheduler.insert("a").unwrap(), a);
        assert_ne!(a, b);
        assert_eq!(scheduler.len(), 2);
        assert_eq!(scheduler.key(b), Some(&"b"));
    }

    #[test]
    fn add_and_remove_dependencies() {
        let mut scheduler = chain();
        assert!(!scheduler.add_dependency("derived1", "source").unwrap());
        assert_eq!(scheduler.dependencies_of(&"derived1"), vec![&"source"]);

        assert!(scheduler.remove_dependency(&"derived1", &"source").unwrap());
        assert!(scheduler.dependencies_of(&"derived1").is_empty());
        assert!(!scheduler.remove_dependency(&"derived1", &"missing").unwrap());
    }

    #[test]
    fn cycle_detection() {
        let scheduler = chain();
        assert!(!scheduler.can_depend_on(&"source", &"derived2"));
        assert!(!scheduler.can_depend_on(&"source", &"source"));
        assert!(scheduler.can_depend_on(&"derived2", &"effect"));
        assert!(scheduler.can_depend_on(&"effect", &"unknown"));
    }

    #[test]
    fn update_order_respects_dependencies() {
        let scheduler = chain();
        let order = scheduler.update_order().unwrap();
        let position = |key: &str| order.iter().position(|k| **k == key).unwrap();
        assert!(position("source") < position("derived1"));
        assert!(position("derived1") < position("derived2"));
        assert!(position("source") < position("effect"));
    }

    #[test]
    fn update_order_after_change_lists_affected() {
        let scheduler = chain();
        let order = scheduler.update_order_after(&"derived1").unwrap();
        assert_eq!(order, vec![&"derived2"]);

        let order = scheduler.update_order_after(&"source").unwrap();
        assert_eq!(order.len(), 3);
        let d1 = order.iter().position(|k| **k == "derived1").unwrap();
        let d2 = order.iter().position(|k| **k == "derived2").unwrap();
        assert!(d1 < d2);
    }

    #[test]
    fn cycles_have_no_update_order() {
        let mut scheduler = chain();
        scheduler.add_dependency("source", "derived2").unwrap();
        assert!(scheduler.update_order().is_none());
        // The changed key is excluded, so a cycle through it still orders.
        assert_eq!(
            scheduler.update_order_after(&"derived1").unwrap(),
            vec![&"derived2", &"source", &"effect"]
        );
    }

    #[test]
    fn transitive_dependents() {
        let scheduler = chain();
        let mut dependents = scheduler.dependents_of(&"source");
        dependents.sort();
        assert_eq!(dependents, vec![&"derived1", &"derived2", &"effect"]);
    }

    #[test]
    fn clear_dependencies_detaches_key() {
        let mut scheduler = chain();
        assert_eq!(scheduler.clear_dependencies(&"derived1").unwrap(), 1);
        assert!(scheduler.can_depend_on(&"source", &"derived2"));
    }
}
