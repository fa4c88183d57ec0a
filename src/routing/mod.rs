//! Routing: cached long-horizon plans, greedy fallback, and projection of a
//! desired target onto a concrete movement action.

pub mod controller;
pub mod policy;
pub mod solver;

pub use controller::{ControllerMode, RoutingController};
pub use policy::Policy;
pub use solver::{NearestNeighborSolver, RoutePlan, RouteSolver};
