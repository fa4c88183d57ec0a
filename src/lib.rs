//! lattice_patrol - multi-robot patrol simulation over a target lattice
//!
//! Robots move between stationary targets, choosing one of a fixed number of
//! neighbouring targets each step. The crate provides proximity graph
//! construction, shortest-path planning over the static motion graph, a
//! routing controller with cached long-horizon plans, and the environment
//! that ties them together behind a `reset`/`step` interface.

pub mod env;
pub mod graph;
pub mod lattice;
pub mod planner;
pub mod routing;
pub mod types;

pub use env::{EnvConfig, EnvError, Observation, PatrolEnv, StepResult, TargetLayout};
pub use routing::{ControllerMode, Policy, RoutingController};
pub use types::{AgentKind, Position};
