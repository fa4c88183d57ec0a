//! Obstacle-aware planning on the static motion graph.
//!
//! Obstacles are never represented explicitly: the lattice generator leaves
//! no targets inside them and the motion radius only joins lattice
//! neighbours, so routes following [`TimeMatrix`] predecessors go around them.

pub mod motion;
pub mod time_matrix;

pub use motion::MotionGraph;
pub use time_matrix::TimeMatrix;
