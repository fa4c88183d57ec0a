//! Mutable per-episode simulation state.

use super::error::EnvError;
use crate::graph::EdgeSet;
use crate::planner::TimeMatrix;
use crate::routing::RoutePlan;
use crate::types::{AgentKind, Position};

/// Everything that changes during an episode, owned in one place.
///
/// The agent array holds `n_robots` robots followed by the targets. A reset
/// replaces the whole value rather than patching individual fields.
#[derive(Debug, Clone)]
pub struct SimState {
    /// Position per agent.
    pub positions: Vec<Position>,
    /// Velocity per agent; always zero for targets.
    pub velocities: Vec<Position>,
    /// Visited flag per agent. Robots are permanently `true`; target flags
    /// only ever go from `false` to `true` within an episode.
    pub visited: Vec<bool>,
    /// Steps taken, counting the reset observation.
    pub step_counter: u32,
    /// Movement edges (robot → target, agent indices) from the last observation.
    pub movement_edges: EdgeSet,
    /// Route plan fetched from the solver, at most once per episode.
    pub route_plan: Option<RoutePlan>,
    /// Why the solver's plan was rejected this episode, if it was.
    pub route_plan_error: Option<EnvError>,
    /// Shortest paths over the motion graph, built lazily once per episode.
    pub time_matrix: Option<TimeMatrix>,
    n_robots: usize,
}

impl SimState {
    /// Fresh state with the given robot and target rows.
    ///
    /// `active` lists target-local indices that start unvisited; every other
    /// target starts visited.
    pub fn new(
        robots: Vec<Position>,
        robot_velocities: Vec<Position>,
        targets: &[Position],
        active: &[usize],
    ) -> Self {
        let n_robots = robots.len();
        let n_agents = n_robots + targets.len();

        let mut positions = robots;
        positions.extend_from_slice(targets);

        let mut velocities = robot_velocities;
        velocities.resize(n_agents, Position::origin());

        let mut visited = vec![true; n_agents];
        for &t in active {
            visited[n_robots + t] = false;
        }

        Self {
            positions,
            velocities,
            visited,
            step_counter: 0,
            movement_edges: EdgeSet::new(),
            route_plan: None,
            route_plan_error: None,
            time_matrix: None,
            n_robots,
        }
    }

    pub fn n_robots(&self) -> usize {
        self.n_robots
    }

    pub fn n_targets(&self) -> usize {
        self.positions.len() - self.n_robots
    }

    pub fn n_agents(&self) -> usize {
        self.positions.len()
    }

    pub fn kind(&self, agent: usize) -> AgentKind {
        if agent < self.n_robots {
            AgentKind::Robot
        } else {
            AgentKind::Target
        }
    }

    pub fn robot_positions(&self) -> &[Position] {
        &self.positions[..self.n_robots]
    }

    pub fn target_positions(&self) -> &[Position] {
        &self.positions[self.n_robots..]
    }

    /// Visited flags of the targets only.
    pub fn target_visited(&self) -> &[bool] {
        &self.visited[self.n_robots..]
    }

    pub fn n_visited_targets(&self) -> usize {
        self.target_visited().iter().filter(|&&v| v).count()
    }

    pub fn all_targets_visited(&self) -> bool {
        self.target_visited().iter().all(|&v| v)
    }

    /// Marks targets (agent indices) as visited; never clears a flag.
    pub fn mark_visited(&mut self, agents: impl IntoIterator<Item = usize>) {
        for a in agents {
            self.visited[a] = true;
        }
    }
}
