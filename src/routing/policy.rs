//! Policy trait for driving the patrol environment.

use crate::env::{EnvError, PatrolEnv};

/// A policy that picks one movement action per robot.
///
/// Actions index into each robot's fixed-size movement edge set, in the order
/// the environment exposes through
/// [`PatrolEnv::movement_candidates`](crate::env::PatrolEnv::movement_candidates).
pub trait Policy {
    /// Selects one action per robot for the environment's current state.
    ///
    /// Takes the environment mutably because policies may consult lazily
    /// built caches (route plan, time matrix) or draw from its RNG.
    fn select_actions(&mut self, env: &mut PatrolEnv) -> Result<Vec<usize>, EnvError>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
