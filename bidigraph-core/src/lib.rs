//! Bidigraph Core
//!
//! This crate provides a mutable directed graph over dense integer vertices,
//! stored in fixed-size chunks and indexed in both directions. It implements:
//!
//! - Chunked adjacency storage with per-arrow and per-vertex payloads
//! - Breadth-first and depth-first enumerators with pluggable visited sets
//! - Path search with summable costs, cost ceilings and waypoints
//! - A dependency scheduler built on top of the graph
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `chunk`: Adjacency storage for a power-of-two range of vertices
//! - `graph`: The bidirectional graph, its enumerators and the scheduler
//! - `path`: Vertex sequence search over any successor function
//! - `visited`: Visited-set strategies shared by the searches
//! - `config` / `error`: Graph configuration and error types
//!
//! # Example
//!
//! ```rust
//! use bidigraph_core::path::{Forward, VertexSequenceFinder};
//! use bidigraph_core::ChunkedBidiGraph;
//!
//! let mut graph: ChunkedBidiGraph = ChunkedBidiGraph::new();
//! for _ in 0..4 {
//!     graph.add_vertex().unwrap();
//! }
//! graph.add_arrow(0, 1).unwrap();
//! graph.add_arrow(1, 2).unwrap();
//! graph.add_arrow(0, 3).unwrap();
//!
//! // Traverse forward from 0
//! let reached: Vec<usize> = graph.breadth_first_next(0).collect();
//! assert_eq!(reached, vec![0, 1, 3, 2]);
//!
//! // Find a path with unit arrow costs
//! let finder = VertexSequenceFinder::hop_count(Forward(&graph));
//! let path = finder.find_vertex_sequence([0], |v| v == 2, u32::MAX).unwrap();
//! assert_eq!(path.vertices, vec![0, 1, 2]);
//! ```

pub mod chunk;
pub mod config;
pub mod error;
pub mod graph;
pub mod path;
pub mod visited;

pub use chunk::{CsrChunk, GraphChunk, SmallVecChunk};
pub use config::GraphConfig;
pub use error::{GraphError, GraphResult, PathError};
pub use graph::{ChunkedBidiGraph, UpdateScheduler};
pub use path::{Backward, Forward, NextNodes, VertexSequence, VertexSequenceFinder};
pub use visited::{BitSetVisited, DenseVisitedSet, VisitedSet};
