//! Error Types
//!
//! Two families of failure are kept apart so callers can branch on them:
//!
//! - [`GraphError`]: programmer errors and unsupported operations on the
//!   graph itself (bad vertex ids, bad row positions, bad configuration).
//! - [`PathError`]: an ordinary "no path" outcome of a waypoint-chained
//!   search. Single-leg searches report the same outcome as `None`.

use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by graph construction and mutation.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The chunk size must be a non-zero power of two.
    #[error("chunk size {chunk_size} is not a power of 2")]
    InvalidChunkSize { chunk_size: usize },

    /// The initial arity capacity must be at least one.
    #[error("initial arity capacity must be at least 1")]
    InvalidArityCapacity,

    /// A chunk would hold more vertices or arrow slots than can be addressed.
    #[error("chunk of {chunk_size} vertices with {initial_arity_capacity} arrows each exceeds {max} slots")]
    ChunkTooLarge {
        chunk_size: usize,
        initial_arity_capacity: usize,
        max: usize,
    },

    /// The operation is not supported by this graph.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A vertex id outside `[0, vertex_count)`.
    #[error("vertex {vertex} out of range for vertex count {vertex_count}")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    /// A row position outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The vertex id space is exhausted.
    #[error("cannot grow graph to {requested} vertices (max {max})")]
    CapacityExceeded { requested: usize, max: usize },

    /// A configuration document could not be parsed.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors raised by waypoint-chained path searches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No waypoints were supplied.
    #[error("could not find path with empty waypoints")]
    EmptyWaypoints,

    /// One leg of the chain has no path within the cost bound.
    #[error("could not find path from {start} to {goal}")]
    LegUnreachable { start: usize, goal: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_unreachable_names_both_ends() {
        let err = PathError::LegUnreachable { start: 3, goal: 7 };
        assert_eq!(err.to_string(), "could not find path from 3 to 7");
    }

    #[test]
    fn config_error_converts_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: GraphError = json_err.into();
        assert!(matches!(err, GraphError::Config(_)));
    }
}
