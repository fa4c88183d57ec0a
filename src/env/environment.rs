//! The patrol environment.
//!
//! One step runs: route → move → rebuild graphs → sense → reward → transition.

use std::fmt;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use super::config::EnvConfig;
use super::dynamics::integrate;
use super::error::EnvError;
use super::observation::{Observation, ObservationBuilder, StepGraphs};
use super::render::{RenderMode, Renderer, Snapshot};
use super::reward::RewardComputer;
use super::state::SimState;
use crate::graph::{k_sampled_graph, EdgeSet, PaddedEdges};
use crate::planner::{MotionGraph, TimeMatrix};
use crate::routing::controller::{
    closest_targets, desired_targets, greedy_targets, hop_to_action, project_next_hop,
};
use crate::routing::{ControllerMode, RoutePlan, RouteSolver};
use crate::types::Position;

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the step.
    pub observation: Observation,
    /// Number of targets first visited during this step.
    pub reward: f64,
    /// Whether the episode is over.
    pub done: bool,
    pub info: StepInfo,
}

/// Auxiliary step diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Visited targets after the step.
    pub n_visited: usize,
    /// Total targets.
    pub n_targets: usize,
    /// Live edges in the observation.
    pub n_edges: usize,
}

/// Multi-robot patrol environment over a fixed target lattice.
///
/// Robots occupy agent indices `[0, R)` and targets `[R, R + T)`. Each step a
/// robot picks one of its `n_actions` movement edges, steers toward that
/// edge's target for several integration sub-steps, and marks every target
/// within sensing range as visited.
///
/// # Lifecycle
///
/// 1. Call [`PatrolEnv::new`] with configuration and seed (runs a first reset).
/// 2. Optionally inject capabilities with [`PatrolEnv::with_solver`] and
///    [`PatrolEnv::with_renderer`].
/// 3. Call [`PatrolEnv::reset`] to start an episode.
/// 4. Repeatedly call [`PatrolEnv::step`] with one action per robot until `done`.
pub struct PatrolEnv {
    config: EnvConfig,
    targets: Vec<Position>,
    motion: MotionGraph,
    padded: PaddedEdges,
    state: SimState,
    rng: StdRng,
    solver: Option<Box<dyn RouteSolver>>,
    renderer: Option<Box<dyn Renderer>>,
    cumulative_reward: f64,
}

impl PatrolEnv {
    /// Creates a new environment and resets it once.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidConfig`] for degenerate configurations, and a
    /// capacity error if the static motion edges or the first observation do
    /// not fit the padded arrays.
    pub fn new(config: EnvConfig, seed: u64) -> Result<Self, EnvError> {
        let (targets, motion, padded) = Self::build_static(&config)?;
        let mut env = Self {
            config,
            targets,
            motion,
            padded,
            state: SimState::new(Vec::new(), Vec::new(), &[], &[]),
            rng: StdRng::seed_from_u64(seed),
            solver: None,
            renderer: None,
            cumulative_reward: 0.0,
        };
        env.reset()?;
        info!(
            "patrol environment: {} robots, {} targets, {} motion edges, {} edge slots",
            env.n_robots(),
            env.n_targets(),
            env.padded.n_static(),
            env.padded.capacity()
        );
        Ok(env)
    }

    /// Injects the route solver used by [`ControllerMode::Planned`].
    pub fn with_solver(mut self, solver: impl RouteSolver + 'static) -> Self {
        self.solver = Some(Box::new(solver));
        self
    }

    /// Injects the renderer used by [`RenderMode::Human`].
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    fn build_static(config: &EnvConfig) -> Result<(Vec<Position>, MotionGraph, PaddedEdges), EnvError> {
        let targets = config.layout.positions();
        config.validate(targets.len())?;

        let r = config.n_robots;
        let motion = MotionGraph::build(&targets, config.motion_radius);
        let capacity = (r + targets.len()) * config.max_edges_per_agent;
        let static_edges = motion.edges().clone().offset(r, r);
        let padded = PaddedEdges::with_static(capacity, &static_edges)?;
        if !motion.is_connected() {
            info!(
                "motion graph has {} components; some targets are unreachable",
                motion.component_count()
            );
        }
        Ok((targets, motion, padded))
    }

    /// Replaces the configuration, rebuilding the target layout and motion
    /// graph, then resets. Injected capabilities and the RNG are kept.
    pub fn reconfigure(&mut self, config: EnvConfig) -> Result<Observation, EnvError> {
        let (targets, motion, padded) = Self::build_static(&config)?;
        self.config = config;
        self.targets = targets;
        self.motion = motion;
        self.padded = padded;
        self.reset()
    }

    /// Reseeds the RNG. `None` draws a fresh seed from entropy. Returns the
    /// seed actually used.
    pub fn seed(&mut self, seed: Option<u64>) -> u64 {
        let seed = seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(seed);
        seed
    }

    /// Starts a new episode and returns its first observation.
    ///
    /// Robots are placed near distinct random targets (or at the configured
    /// start positions) with random initial velocities; the active targets
    /// are redrawn. The cached route plan and time matrix are discarded.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        self.state = self.initial_state();
        self.cumulative_reward = 0.0;
        let (observation, _) = self.observe()?;
        debug!(
            "reset: {} of {} targets active",
            self.n_targets() - self.state.n_visited_targets(),
            self.n_targets()
        );
        Ok(observation)
    }

    fn initial_state(&mut self) -> SimState {
        let r = self.config.n_robots;
        let t = self.targets.len();
        let v_max = self.config.v_max;
        let half = 0.5 * self.config.motion_radius;

        let velocities: Vec<Position> = (0..r)
            .map(|_| {
                Position::new(
                    self.rng.gen_range(-v_max..v_max),
                    self.rng.gen_range(-v_max..v_max),
                )
            })
            .collect();

        let robots = match &self.config.robot_starts {
            Some(starts) => starts.clone(),
            None => sample(&mut self.rng, t, r)
                .into_iter()
                .map(|j| {
                    let jitter = Position::new(
                        self.rng.gen_range(-half..half),
                        self.rng.gen_range(-half..half),
                    );
                    self.targets[j] + jitter
                })
                .collect(),
        };

        let active: Vec<usize> = match &self.config.active_targets {
            Some(active) => active.clone(),
            None => sample(&mut self.rng, t, self.config.n_active(t)).into_vec(),
        };

        SimState::new(robots, velocities, &self.targets, &active)
    }

    /// Advances the simulation by one step.
    ///
    /// `actions[i]` indexes robot `i`'s movement edges from the previous
    /// observation.
    ///
    /// # Errors
    ///
    /// Invalid actions are rejected before anything moves. A capacity error
    /// while packing the new observation rolls the motion back, so a failed
    /// step leaves the state as it was.
    pub fn step(&mut self, actions: &[usize]) -> Result<StepResult, EnvError> {
        let commanded = self.commanded_agents(actions)?;
        let positions = self.state.positions.clone();
        let velocities = self.state.velocities.clone();
        integrate(&mut self.state, &commanded, &self.config);

        let (observation, reward) = match self.observe() {
            Ok(packed) => packed,
            Err(e) => {
                self.state.positions = positions;
                self.state.velocities = velocities;
                return Err(e);
            }
        };
        self.cumulative_reward += reward;

        let done = RewardComputer::is_done(&self.state, &self.config);
        if done {
            info!(
                "episode finished after {} steps: {}/{} targets visited, reward {}",
                self.state.step_counter,
                self.state.n_visited_targets(),
                self.n_targets(),
                self.cumulative_reward
            );
        }

        let info = StepInfo {
            n_visited: self.state.n_visited_targets(),
            n_targets: self.n_targets(),
            n_edges: self.padded.n_live(),
        };
        Ok(StepResult {
            observation,
            reward,
            done,
            info,
        })
    }

    fn commanded_agents(&self, actions: &[usize]) -> Result<Vec<usize>, EnvError> {
        let r = self.n_robots();
        let k = self.config.n_actions;
        if actions.len() != r {
            return Err(EnvError::ActionCountMismatch {
                expected: r,
                got: actions.len(),
            });
        }
        actions
            .iter()
            .enumerate()
            .map(|(robot, &action)| {
                if action >= k {
                    return Err(EnvError::ActionOutOfRange {
                        robot,
                        action,
                        n_actions: k,
                    });
                }
                Ok(self.state.movement_edges.receivers[robot * k + action])
            })
            .collect()
    }

    /// Rebuilds graphs at the current positions, senses targets, and emits the
    /// observation together with the reward for newly visited targets.
    fn observe(&mut self) -> Result<(Observation, f64), EnvError> {
        let graphs = StepGraphs::compute(&self.state, &self.config)?;
        ObservationBuilder::pack_edges(&graphs, &mut self.padded)?;

        let visited_before = self.state.n_visited_targets();
        self.state.mark_visited(graphs.sensing.receivers.iter().copied());
        let observation = ObservationBuilder::snapshot(&self.state, &self.padded);

        self.state.movement_edges = graphs.movement;
        self.state.step_counter += 1;
        Ok((observation, RewardComputer::compute(visited_before, &self.state)))
    }

    /// Chooses one action per robot.
    ///
    /// See [`crate::routing::controller`] for the decision stages.
    ///
    /// # Errors
    ///
    /// [`EnvError::SolverUnavailable`] in planned mode without an injected
    /// solver; malformed solver output is rejected as well, and the same error
    /// is returned for the rest of the episode without calling the solver again.
    pub fn controller(&mut self, mode: ControllerMode) -> Result<Vec<usize>, EnvError> {
        let r = self.n_robots();
        let k = self.config.n_actions;

        if mode == ControllerMode::Random {
            return Ok((0..r).map(|_| self.rng.gen_range(0..k)).collect());
        }

        let current = closest_targets(self.state.robot_positions(), self.state.target_positions());
        let greedy = greedy_targets(
            self.state.robot_positions(),
            self.state.target_positions(),
            self.state.target_visited(),
        );

        let desired = match mode {
            ControllerMode::Planned => {
                self.ensure_route_plan()?;
                desired_targets(self.state.route_plan.as_mut(), &current, &greedy)
            }
            _ => desired_targets(None, &current, &greedy),
        };

        let motion = &self.motion;
        let edge_time = self.config.edge_time;
        let times = self
            .state
            .time_matrix
            .get_or_insert_with(|| TimeMatrix::compute(motion, edge_time));
        let visited = &self.state.visited[r..];
        let hops: Vec<usize> = current
            .iter()
            .zip(&desired)
            .map(|(&here, &goal)| project_next_hop(times, here, goal, visited))
            .collect();

        let positions = &self.state.positions;
        let receivers = &self.state.movement_edges.receivers;
        let actions = hops
            .iter()
            .enumerate()
            .map(|(robot, &hop)| {
                let candidates: Vec<Position> = receivers[robot * k..(robot + 1) * k]
                    .iter()
                    .map(|&a| positions[a])
                    .collect();
                hop_to_action(&candidates, &positions[r + hop])
            })
            .collect();
        Ok(actions)
    }

    /// Fetches the episode's route plan on first use.
    ///
    /// The solver runs at most once per episode: a rejected plan is
    /// remembered and its error returned until the next reset.
    fn ensure_route_plan(&mut self) -> Result<(), EnvError> {
        if self.state.route_plan.is_some() {
            return Ok(());
        }
        if let Some(err) = &self.state.route_plan_error {
            return Err(err.clone());
        }
        let solver = self.solver.as_ref().ok_or(EnvError::SolverUnavailable)?;
        info!("requesting route plan from solver '{}'", solver.name());
        let plan = solver.solve(
            self.state.robot_positions(),
            self.state.target_positions(),
            self.state.target_visited(),
        );

        if let Err(err) = self.check_plan(&plan) {
            warn!("route plan rejected for this episode: {}", err);
            self.state.route_plan_error = Some(err.clone());
            return Err(err);
        }
        self.state.route_plan = Some(plan);
        Ok(())
    }

    fn check_plan(&self, plan: &RoutePlan) -> Result<(), EnvError> {
        if plan.n_robots() != self.n_robots() {
            return Err(EnvError::MalformedPlan {
                expected: self.n_robots(),
                got: plan.n_robots(),
            });
        }
        let n_targets = self.n_targets();
        match plan.waypoints().find(|&w| w >= n_targets) {
            Some(target) => Err(EnvError::PlanTargetOutOfRange { target, n_targets }),
            None => Ok(()),
        }
    }

    /// Alternative candidate set: `k` jittered-nearest targets per robot,
    /// drawn from the environment RNG. Agent indices.
    pub fn sample_candidates(&mut self, k: usize) -> Result<EdgeSet, EnvError> {
        let edges = k_sampled_graph(
            k,
            self.state.robot_positions(),
            Some(self.state.target_positions()),
            self.config.sample_jitter,
            &mut self.rng,
        )?;
        Ok(edges.offset(0, self.n_robots()))
    }

    /// Hands a snapshot to the injected renderer.
    ///
    /// # Errors
    ///
    /// [`EnvError::RendererUnavailable`] for [`RenderMode::Human`] without a
    /// renderer.
    pub fn render(&mut self, mode: RenderMode) -> Result<(), EnvError> {
        if mode == RenderMode::None {
            return Ok(());
        }
        let renderer = self.renderer.as_mut().ok_or(EnvError::RendererUnavailable)?;
        let snapshot = Snapshot {
            step: self.state.step_counter,
            robots: self.state.robot_positions(),
            targets: self.state.target_positions(),
            visited: self.state.target_visited(),
            motion_edges: self.motion.edges(),
        };
        renderer.draw(&snapshot);
        Ok(())
    }

    /// Releases renderer resources.
    pub fn close(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.close();
        }
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Read-only view of the episode state.
    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn motion_graph(&self) -> &MotionGraph {
        &self.motion
    }

    /// Shortest paths over the motion graph, computed on first use each episode.
    pub fn time_matrix(&mut self) -> &TimeMatrix {
        let motion = &self.motion;
        let edge_time = self.config.edge_time;
        self.state
            .time_matrix
            .get_or_insert_with(|| TimeMatrix::compute(motion, edge_time))
    }

    /// Cached route plan for this episode, if one was requested.
    pub fn route_plan(&self) -> Option<&RoutePlan> {
        self.state.route_plan.as_ref()
    }

    /// Agent indices of robot `robot`'s movement edges, in action order.
    pub fn movement_candidates(&self, robot: usize) -> &[usize] {
        let k = self.config.n_actions;
        &self.state.movement_edges.receivers[robot * k..(robot + 1) * k]
    }

    /// Target index each robot currently counts as its location.
    pub fn closest_targets(&self) -> Vec<usize> {
        closest_targets(self.state.robot_positions(), self.state.target_positions())
    }

    pub fn n_robots(&self) -> usize {
        self.config.n_robots
    }

    pub fn n_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn n_agents(&self) -> usize {
        self.n_robots() + self.n_targets()
    }

    pub fn n_actions(&self) -> usize {
        self.config.n_actions
    }

    /// Padded edge capacity of every observation.
    pub fn max_edges(&self) -> usize {
        self.padded.capacity()
    }

    /// Cumulative reward this episode.
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }
}

impl fmt::Debug for PatrolEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatrolEnv")
            .field("n_robots", &self.n_robots())
            .field("n_targets", &self.n_targets())
            .field("step", &self.state.step_counter)
            .field("solver", &self.solver.as_ref().map(|s| s.name().to_string()))
            .field("has_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}
