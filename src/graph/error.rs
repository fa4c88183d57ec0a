use thiserror::Error;

/// Errors raised while building or packing proximity graphs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Cannot select {requested} receivers per sender: only {available} candidates available")]
    NotEnoughCandidates { requested: usize, available: usize },

    #[error("Edge count {required} exceeds padded capacity {capacity}; increase edge capacity")]
    CapacityExceeded { required: usize, capacity: usize },
}
