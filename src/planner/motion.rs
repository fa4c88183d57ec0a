//! Static motion graph over target positions.

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{radius_graph, EdgeSet};
use crate::types::Position;

/// Radius graph among targets, built once per configuration.
///
/// Indices are target-local (`0..T`); add the robot count to obtain agent
/// indices. Self-loops are included with zero weight. Because it is a radius
/// graph, every edge `(i, j)` has a mirror `(j, i)`.
#[derive(Debug, Clone)]
pub struct MotionGraph {
    edges: EdgeSet,
    graph: DiGraph<Position, f64>,
}

impl MotionGraph {
    /// Builds the motion graph for `targets` with the given connection radius.
    pub fn build(targets: &[Position], radius: f64) -> Self {
        let edges = radius_graph(radius, targets, None, true);

        let mut graph = DiGraph::with_capacity(targets.len(), edges.len());
        for &p in targets {
            graph.add_node(p);
        }
        for (s, r, w) in edges.iter() {
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(r), w);
        }

        Self { edges, graph }
    }

    /// Edge list in row-major order, target-local indices.
    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn n_targets(&self) -> usize {
        self.graph.node_count()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Targets directly reachable from `target`, excluding itself.
    pub fn neighbors(&self, target: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(target))
            .map(|n| n.index())
            .filter(|&n| n != target)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of connected components; more than one means some target pairs
    /// are unreachable from each other.
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }
}
