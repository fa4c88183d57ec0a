//! Observation encoding for the patrol environment.
//!
//! Each step recomputes four proximity graphs at the new positions, packs the
//! ones the learner sees into the padded edge arrays after the static motion
//! edges, and snapshots node features.

use super::config::EnvConfig;
use super::state::SimState;
use crate::graph::{k_nearest_graph, radius_graph, EdgeSet, GraphError, PaddedEdges};

/// Features per node: `[type, unvisited]`.
pub const N_NODE_FEAT: usize = 2;
/// Features per edge: `[distance]`.
pub const N_EDGE_FEAT: usize = 1;
/// Global features: `[step]`.
pub const N_GLOB_FEAT: usize = 1;

/// Graph observation with fixed shapes.
///
/// Shapes depend only on the configuration: `nodes` is `agents × 2`, the edge
/// arrays are `agents × max_edges_per_agent` long, with `-1` in unused
/// sender/receiver slots.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub nodes: Vec<[f32; N_NODE_FEAT]>,
    pub edges: Vec<[f32; N_EDGE_FEAT]>,
    pub senders: Vec<i32>,
    pub receivers: Vec<i32>,
    pub step: u32,
}

impl Observation {
    /// Number of live (non-sentinel) edges.
    pub fn n_live_edges(&self) -> usize {
        self.senders.iter().filter(|&&s| s >= 0).count()
    }

    /// Flattens into `[nodes, edges, senders, receivers, step]` row-major.
    pub fn to_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(Self::flat_dim(self.nodes.len(), self.senders.len()));
        flat.extend(self.nodes.iter().flatten());
        flat.extend(self.edges.iter().flatten());
        flat.extend(self.senders.iter().map(|&s| s as f32));
        flat.extend(self.receivers.iter().map(|&r| r as f32));
        flat.push(self.step as f32);
        flat
    }

    /// Length of [`Observation::to_flat`] for the given shapes.
    pub fn flat_dim(n_agents: usize, max_edges: usize) -> usize {
        n_agents * N_NODE_FEAT + max_edges * (N_EDGE_FEAT + 2) + N_GLOB_FEAT
    }
}

/// Per-step proximity graphs, all in agent indices.
#[derive(Debug, Clone)]
pub struct StepGraphs {
    /// k-nearest robot → target edges, nearest excluded; one block of
    /// `n_actions` edges per robot, indexed by action.
    pub movement: EdgeSet,
    /// Robot → target edges within the motion radius.
    pub planning: EdgeSet,
    /// Robot ↔ robot edges within the communication radius.
    pub communication: EdgeSet,
    /// Robot → target edges within the sensing radius.
    pub sensing: EdgeSet,
}

impl StepGraphs {
    /// Builds all per-step graphs from the current positions.
    pub fn compute(state: &SimState, config: &EnvConfig) -> Result<Self, GraphError> {
        let r = state.n_robots();
        let robots = state.robot_positions();
        let targets = state.target_positions();

        let movement = k_nearest_graph(config.n_actions, robots, Some(targets), false)?.offset(0, r);
        let planning = radius_graph(config.motion_radius, robots, Some(targets), false).offset(0, r);
        let communication = radius_graph(config.comm_radius, robots, None, false);
        let sensing = radius_graph(config.sensor_radius, robots, Some(targets), false).offset(0, r);

        Ok(Self {
            movement,
            planning,
            communication,
            sensing,
        })
    }
}

/// Builds observations from state and padded edge storage.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Writes the dynamic edges into `padded`.
    ///
    /// Dynamic slots hold, in order: planning edges, movement edges reversed
    /// (target → robot), communication edges.
    ///
    /// # Errors
    ///
    /// [`GraphError::CapacityExceeded`] if the edges do not fit; `padded` is
    /// left unchanged.
    pub fn pack_edges(graphs: &StepGraphs, padded: &mut PaddedEdges) -> Result<(), GraphError> {
        let incoming = graphs.movement.clone().reversed();
        padded.set_dynamic(&[&graphs.planning, &incoming, &graphs.communication])
    }

    /// Captures node features and the current padded arrays.
    pub fn snapshot(state: &SimState, padded: &PaddedEdges) -> Observation {
        let nodes = (0..state.n_agents())
            .map(|a| {
                let unvisited = if state.visited[a] { 0.0 } else { 1.0 };
                [state.kind(a).type_flag(), unvisited]
            })
            .collect();

        Observation {
            nodes,
            edges: padded.weights.iter().map(|&w| [w]).collect(),
            senders: padded.senders.clone(),
            receivers: padded.receivers.clone(),
            step: state.step_counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn state() -> SimState {
        SimState::new(
            vec![Position::new(0.0, 0.5), Position::new(3.0, 0.0)],
            vec![Position::origin(); 2],
            &[
                Position::new(0.0, 0.0),
                Position::new(5.0, 0.0),
                Position::new(10.0, 0.0),
            ],
            &[1, 2],
        )
    }

    fn config() -> EnvConfig {
        EnvConfig {
            n_robots: 2,
            n_actions: 2,
            ..EnvConfig::default()
        }
    }

    #[test]
    fn graphs_use_agent_indices() {
        let g = StepGraphs::compute(&state(), &config()).unwrap();
        assert!(g.movement.receivers.iter().all(|&r| r >= 2));
        assert_eq!(g.movement.out_degree(0), 2);
        assert_eq!(g.movement.out_degree(1), 2);
        // robot 0 sits on target 0 (agent 2), so it is excluded from its actions
        assert_eq!(g.movement.receivers_of(0), vec![3, 4]);
        assert!(g.sensing.contains(0, 2));
        assert!(g.communication.contains(0, 1));
        assert!(g.communication.contains(1, 0));
    }

    #[test]
    fn pack_places_dynamic_edges_after_static() {
        let s = state();
        let g = StepGraphs::compute(&s, &config()).unwrap();
        let mut static_edges = EdgeSet::new();
        static_edges.push(2, 3, 5.0);
        let mut padded = PaddedEdges::with_static(5 * 5, &static_edges).unwrap();
        ObservationBuilder::pack_edges(&g, &mut padded).unwrap();
        let obs = ObservationBuilder::snapshot(&s, &padded);

        assert_eq!(obs.senders[0], 2);
        assert_eq!(obs.receivers[0], 3);
        let expected = 1 + g.planning.len() + g.movement.len() + g.communication.len();
        assert_eq!(obs.n_live_edges(), expected);
        assert_eq!(obs.senders.len(), obs.receivers.len());
        assert_eq!(obs.edges.len(), 25);
        // movement edges are stored target -> robot
        let first_move = 1 + g.planning.len();
        assert_eq!(obs.receivers[first_move], 0);
    }

    #[test]
    fn node_features_encode_type_and_unvisited() {
        let s = state();
        let padded = PaddedEdges::new(4);
        let obs = ObservationBuilder::snapshot(&s, &padded);
        assert_eq!(obs.nodes[0], [1.0, 0.0]);
        assert_eq!(obs.nodes[2], [0.0, 0.0]);
        assert_eq!(obs.nodes[3], [0.0, 1.0]);
    }

    #[test]
    fn flat_layout_length() {
        let s = state();
        let obs = ObservationBuilder::snapshot(&s, &PaddedEdges::new(10));
        assert_eq!(obs.to_flat().len(), Observation::flat_dim(5, 10));
    }

    #[test]
    fn pack_fails_when_capacity_too_small() {
        let g = StepGraphs::compute(&state(), &config()).unwrap();
        let mut padded = PaddedEdges::new(2);
        let err = ObservationBuilder::pack_edges(&g, &mut padded).unwrap_err();
        assert!(matches!(err, GraphError::CapacityExceeded { .. }));
    }
}
