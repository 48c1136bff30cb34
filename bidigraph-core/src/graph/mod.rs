//! Bidirectional Graph
//!
//! This module implements the mutable graph that dependency and reachability
//! queries run against.
//!
//! # Overview
//!
//! The graph is a directed graph over dense integer vertices where:
//!
//! - Vertices are indices in `[0, vertex_count)`, appended and never reused
//! - Arrows carry an `i32` payload; each vertex carries one more
//!
//! # Design Decisions
//!
//! 1. Rows are stored in fixed-size chunks rather than one flat array because:
//!    - Untouched vertex ranges cost one empty slot, not a full row table
//!    - Growing the graph never moves existing rows
//!
//! 2. The graph is indexed by vertex id for O(1) row lookups.
//!
//! 3. We maintain both forward (successor) and backward (predecessor) rows
//!    to enable efficient traversal in both directions.

mod bidi;
mod scheduler;
mod search;

pub use bidi::{ChunkedBidiGraph, RowVertices, MAX_VERTEX_COUNT};
pub use scheduler::UpdateScheduler;
pub use search::{FrontierSplit, SearchDataEnumerator, SearchEnumerator};
