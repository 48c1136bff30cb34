//! Integration Tests for Graph and Path Search
//!
//! These tests drive the graph with seeded random workloads and compare it
//! against a plain adjacency-list model.

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bidigraph_core::path::{Backward, Forward, VertexSequenceFinder};
use bidigraph_core::visited::{BitSetVisited, DenseVisitedSet, VisitedSet};
use bidigraph_core::{ChunkedBidiGraph, CsrChunk, GraphChunk, GraphConfig, SmallVecChunk};

/// Adjacency lists in insertion order, in both directions.
struct Reference {
    next: Vec<Vec<usize>>,
    prev: Vec<Vec<usize>>,
}

impl Reference {
    fn new(vertex_count: usize) -> Self {
        Self {
            next: vec![Vec::new(); vertex_count],
            prev: vec![Vec::new(); vertex_count],
        }
    }

    fn add(&mut self, v: usize, u: usize) -> bool {
        if self.next[v].contains(&u) {
            return false;
        }
        self.next[v].push(u);
        self.prev[u].push(v);
        true
    }

    fn remove(&mut self, v: usize, u: usize) -> bool {
        let before = self.next[v].len();
        self.next[v].retain(|&w| w != u);
        self.prev[u].retain(|&w| w != v);
        before != self.next[v].len()
    }

    fn remove_all_next(&mut self, v: usize) -> usize {
        let targets = std::mem::take(&mut self.next[v]);
        for &u in &targets {
            self.prev[u].retain(|&w| w != v);
        }
        targets.len()
    }

    fn remove_all_prev(&mut self, u: usize) -> usize {
        let sources = std::mem::take(&mut self.prev[u]);
        for &v in &sources {
            self.next[v].retain(|&w| w != u);
        }
        sources.len()
    }

    fn arrow_count(&self) -> usize {
        self.next.iter().map(Vec::len).sum()
    }

    fn reachable(&self, start: usize, forward: bool) -> HashSet<usize> {
        let rows = if forward { &self.next } else { &self.prev };
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for &u in &rows[v] {
                if seen.insert(u) {
                    queue.push_back(u);
                }
            }
        }
        seen
    }
}

const ROUNDS: usize = 3;

/// Build a graph in rounds that interleave insertions with bulk and single
/// removals, checking it against the reference after every phase.
fn random_graph<C: GraphChunk>(
    seed: u64,
    vertex_count: usize,
    arity: usize,
) -> (ChunkedBidiGraph<C>, Reference) {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = GraphConfig::default().chunk_size(4).initial_arity_capacity(2);
    let mut graph = ChunkedBidiGraph::<C>::with_config(config).unwrap();
    let mut reference = Reference::new(vertex_count);
    graph.add_vertex_at(vertex_count - 1).unwrap();

    for _ in 0..ROUNDS {
        for v in 0..vertex_count {
            for _ in 0..arity {
                let u = rng.gen_range(0..vertex_count);
                assert_eq!(graph.add_arrow(v, u).unwrap(), reference.add(v, u));
            }
        }
        assert_matches_reference(&graph, &reference);
        assert_searches_match(&graph, &reference);

        for _ in 0..vertex_count / 3 {
            let v = rng.gen_range(0..vertex_count);
            assert_eq!(graph.remove_all_next(v).unwrap(), reference.remove_all_next(v));
        }
        for _ in 0..vertex_count / 4 {
            let v = rng.gen_range(0..vertex_count);
            assert_eq!(graph.remove_all_prev(v).unwrap(), reference.remove_all_prev(v));
        }
        for _ in 0..vertex_count / 2 {
            let v = rng.gen_range(0..vertex_count);
            let u = rng.gen_range(0..vertex_count);
            assert_eq!(graph.remove_arrow(v, u).unwrap(), reference.remove(v, u));
        }
        assert_matches_reference(&graph, &reference);
        assert_searches_match(&graph, &reference);
    }
    (graph, reference)
}

fn sorted(row: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut row: Vec<usize> = row.collect();
    row.sort_unstable();
    row
}

fn assert_matches_reference<C: GraphChunk>(graph: &ChunkedBidiGraph<C>, reference: &Reference) {
    assert_eq!(graph.arrow_count(), reference.arrow_count());
    for v in 0..graph.vertex_count() {
        assert_eq!(sorted(graph.next_vertices(v)), sorted(reference.next[v].iter().copied()));
        assert_eq!(sorted(graph.prev_vertices(v)), sorted(reference.prev[v].iter().copied()));
        for i in 0..graph.next_count(v) {
            let u = graph.next(v, i);
            assert!(graph.find_index_of_prev(u, v).is_some(), "{v} -> {u} not mirrored");
        }
        for i in 0..graph.prev_count(v) {
            let w = graph.prev(v, i);
            assert!(graph.find_index_of_next(w, v).is_some(), "{w} -> {v} not mirrored");
        }
    }
}

fn assert_searches_match<C: GraphChunk>(graph: &ChunkedBidiGraph<C>, reference: &Reference) {
    for v in 0..graph.vertex_count() {
        for dfs in [false, true] {
            let forward: Vec<usize> = graph.search_next(v, dfs, BitSetVisited::new()).collect();
            let backward: Vec<usize> = graph.search_prev(v, dfs, BitSetVisited::new()).collect();
            assert_eq!(forward[0], v);
            assert_eq!(backward[0], v);

            let forward_set: HashSet<usize> = forward.iter().copied().collect();
            let backward_set: HashSet<usize> = backward.iter().copied().collect();
            assert_eq!(forward_set.len(), forward.len(), "duplicate vertex yielded");
            assert_eq!(backward_set.len(), backward.len(), "duplicate vertex yielded");
            assert_eq!(forward_set, reference.reachable(v, true));
            assert_eq!(backward_set, reference.reachable(v, false));
        }
    }
}

fn random_workloads_match_reference<C: GraphChunk>() {
    let mut seed = 0;
    for vertex_count in [8, 13, 20] {
        for arity in [0, 1, 7, 17] {
            seed += 1;
            random_graph::<C>(seed, vertex_count, arity);
        }
    }
}

/// Test that CSR-backed graphs agree with the reference model.
#[test]
fn csr_random_workloads_match_reference() {
    random_workloads_match_reference::<CsrChunk>();
}

/// Test that small-vector-backed graphs agree with the reference model.
#[test]
fn small_random_workloads_match_reference() {
    random_workloads_match_reference::<SmallVecChunk>();
}

/// Test that both chunk layouts produce identical rows for the same workload.
#[test]
fn chunk_layouts_agree() {
    let (csr, _) = random_graph::<CsrChunk>(99, 20, 7);
    let (small, _) = random_graph::<SmallVecChunk>(99, 20, 7);
    for v in 0..20 {
        assert!(csr.next_vertices(v).eq(small.next_vertices(v)));
        assert!(csr.prev_vertices(v).eq(small.prev_vertices(v)));
    }
}

/// Test that a shared visited set never yields a vertex twice across searches.
#[test]
fn shared_visited_set_partitions_reachable_vertices() {
    let (graph, reference) = random_graph::<CsrChunk>(7, 20, 1);
    let mut visited = DenseVisitedSet::with_capacity(graph.vertex_count());

    let mut seen = Vec::new();
    for v in 0..graph.vertex_count() {
        seen.extend(graph.search_next(v, false, &mut visited));
    }
    let unique: HashSet<usize> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len());
    assert_eq!(unique.len(), reference.next.len());

    visited.clear();
    assert!(visited.add(0));
}

/// Test that split-off frontiers and the remaining walk cover the reachable set.
#[test]
fn split_frontiers_cover_reachable_set() {
    let (graph, reference) = random_graph::<CsrChunk>(11, 20, 7);
    for dfs in [false, true] {
        let mut search = graph.search_next(0, dfs, BitSetVisited::new());
        let mut seen: Vec<usize> = search.next().into_iter().collect();
        let mut splits = Vec::new();
        while let Some(split) = search.split_frontier() {
            splits.push(split);
            if let Some(v) = search.next() {
                seen.push(v);
            }
        }
        seen.extend(search);
        for split in splits {
            seen.extend(split);
        }
        let unique: HashSet<usize> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
        assert_eq!(unique, reference.reachable(0, true));
    }
}

/// Test that found paths follow real arrows and respect the cost ceiling.
#[test]
fn found_paths_follow_arrows_within_ceiling() {
    let (graph, reference) = random_graph::<CsrChunk>(3, 20, 1);
    let finder = VertexSequenceFinder::hop_count(Forward(&graph));
    for start in 0..20 {
        let reachable = reference.reachable(start, true);
        for goal in 0..20 {
            let path = finder.find_vertex_sequence([start], |v| v == goal, u32::MAX);
            assert_eq!(path.is_some(), reachable.contains(&goal));
            let Some(path) = path else { continue };

            assert_eq!(path.start(), Some(start));
            assert_eq!(path.goal(), Some(goal));
            assert_eq!(path.cost as usize, path.hops());
            for pair in path.vertices.windows(2) {
                assert!(graph.find_index_of_next(pair[0], pair[1]).is_some());
            }

            let ceiling = path.cost;
            assert!(finder.find_vertex_sequence([start], |v| v == goal, ceiling).is_some());
            if ceiling > 0 {
                // Breadth-first paths are shortest, so one hop less never suffices.
                assert!(finder
                    .find_vertex_sequence([start], |v| v == goal, ceiling - 1)
                    .is_none());
            }
        }
    }
}

/// Test that backward search finds the reversed forward path length.
#[test]
fn backward_paths_mirror_forward_paths() {
    let (graph, _) = random_graph::<SmallVecChunk>(5, 13, 1);
    let forward = VertexSequenceFinder::hop_count(Forward(&graph));
    let backward = VertexSequenceFinder::hop_count(Backward(&graph));
    for start in 0..13 {
        for goal in 0..13 {
            let there = forward.find_vertex_sequence([start], |v| v == goal, u32::MAX);
            let back = backward.find_vertex_sequence([goal], |v| v == start, u32::MAX);
            assert_eq!(there.map(|p| p.cost), back.map(|p| p.cost));
        }
    }
}

/// Test that a waypoint path extends the path over its leading waypoints.
#[test]
fn waypoint_paths_share_prefix_and_suffix() {
    let (graph, _) = random_graph::<CsrChunk>(21, 20, 7);
    let finder = VertexSequenceFinder::hop_count(Forward(&graph));
    let mut rng = StdRng::seed_from_u64(42);

    let mut checked = 0;
    for _ in 0..50 {
        let (a, b, c) = (
            rng.gen_range(0..20),
            rng.gen_range(0..20),
            rng.gen_range(0..20),
        );
        let Ok(full) = finder.find_vertex_sequence_over_waypoints([a, b, c], u32::MAX) else {
            assert!(!finder.is_reachable_over_waypoints([a, b, c], u32::MAX));
            continue;
        };
        let head = finder.find_vertex_sequence_over_waypoints([a, b], u32::MAX).unwrap();
        let tail = finder.find_vertex_sequence_over_waypoints([b, c], u32::MAX).unwrap();

        assert!(finder.is_reachable_over_waypoints([a, b, c], u32::MAX));
        assert!(full.vertices.starts_with(&head.vertices));
        assert!(full.vertices.ends_with(&tail.vertices));
        assert_eq!(full.vertices.len(), head.vertices.len() + tail.vertices.len() - 1);
        assert_eq!(full.cost, head.cost + tail.cost);
        checked += 1;
    }
    assert!(checked > 0);
}

/// Test that cheapest paths never cost more than first-found paths.
#[test]
fn cheapest_paths_are_no_more_expensive() {
    let (graph, _) = random_graph::<CsrChunk>(8, 20, 7);
    let weight = |v: usize, u: usize| ((v * 7 + u * 3) % 5 + 1) as u64;
    let finder = VertexSequenceFinder::new(
        Forward(&graph),
        weight,
        |a: u64, b: u64| a + b,
        0,
        u64::MAX,
    );
    for goal in 0..20 {
        let first = finder.find_vertex_sequence([0], |v| v == goal, u64::MAX);
        let cheapest = finder.find_cheapest_vertex_sequence([0], |v| v == goal, u64::MAX);
        assert_eq!(first.is_some(), cheapest.is_some());
        if let (Some(first), Some(cheapest)) = (first, cheapest) {
            assert!(cheapest.cost <= first.cost);
            let recomputed: u64 = cheapest
                .vertices
                .windows(2)
                .map(|pair| weight(pair[0], pair[1]))
                .sum();
            assert_eq!(recomputed, cheapest.cost);
        }
    }
}
