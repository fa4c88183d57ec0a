//! Proximity graphs over agent positions.
//!
//! - [`builder`] - radius, k-nearest and k-sampled graph construction
//! - [`edges`] - variable-length edge lists produced by the builders
//! - [`padded`] - fixed-capacity sentinel-padded arrays for observations

pub mod builder;
pub mod edges;
pub mod error;
pub mod padded;

pub use builder::{k_nearest_graph, k_sampled_graph, pairwise_diff, pairwise_distances, radius_graph};
pub use edges::EdgeSet;
pub use error::GraphError;
pub use padded::{PaddedEdges, SENTINEL};
