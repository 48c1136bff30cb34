//! Graph Configuration
//!
//! Sizing parameters for a [`ChunkedBidiGraph`](crate::graph::ChunkedBidiGraph).
//! The values are fixed for the lifetime of a graph.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Default number of vertices per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Default number of arrow slots reserved per vertex when a chunk is created.
pub const DEFAULT_INITIAL_ARITY_CAPACITY: usize = 4;

/// Upper bound on both the vertices of a chunk and the arrow slots it
/// reserves up front. Vertex ids and row offsets are 31-bit.
pub const MAX_CHUNK_SLOTS: usize = 1 << 31;

/// Sizing parameters for a chunked graph.
///
/// # Example
///
/// ```rust
/// use bidigraph_core::GraphConfig;
///
/// let config = GraphConfig::default().chunk_size(64);
/// assert_eq!(config.chunk_shift().unwrap(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Number of vertices covered by one chunk. Must be a power of 2.
    pub chunk_size: usize,

    /// Arrow slots reserved per vertex when a chunk materializes.
    pub initial_arity_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            initial_arity_capacity: DEFAULT_INITIAL_ARITY_CAPACITY,
        }
    }
}

impl GraphConfig {
    /// Builder: set the chunk size.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Builder: set the initial arity capacity.
    #[must_use]
    pub fn initial_arity_capacity(mut self, capacity: usize) -> Self {
        self.initial_arity_capacity = capacity;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a usable graph.
    pub fn validate(&self) -> GraphResult<()> {
        if !self.chunk_size.is_power_of_two() {
            return Err(GraphError::InvalidChunkSize {
                chunk_size: self.chunk_size,
            });
        }
        if self.initial_arity_capacity == 0 {
            return Err(GraphError::InvalidArityCapacity);
        }
        let slots = self.chunk_size.checked_mul(self.initial_arity_capacity);
        if self.chunk_size > MAX_CHUNK_SLOTS || slots.map_or(true, |n| n > MAX_CHUNK_SLOTS) {
            return Err(GraphError::ChunkTooLarge {
                chunk_size: self.chunk_size,
                initial_arity_capacity: self.initial_arity_capacity,
                max: MAX_CHUNK_SLOTS,
            });
        }
        Ok(())
    }

    /// `log2(chunk_size)`, after validation.
    pub fn chunk_shift(&self) -> GraphResult<u32> {
        self.validate()?;
        Ok(self.chunk_size.trailing_zeros())
    }
}
