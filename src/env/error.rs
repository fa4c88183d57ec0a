use thiserror::Error;

use crate::graph::GraphError;

/// Errors raised by the patrol environment and its controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Planned routing requested but no route solver was provided")]
    SolverUnavailable,

    #[error("Route solver returned {got} routes for {expected} robots")]
    MalformedPlan { expected: usize, got: usize },

    #[error("Route solver referenced target {target} but only {n_targets} targets exist")]
    PlanTargetOutOfRange { target: usize, n_targets: usize },

    #[error("Human rendering requested but no renderer was provided")]
    RendererUnavailable,

    #[error("Expected {expected} actions (one per robot), got {got}")]
    ActionCountMismatch { expected: usize, got: usize },

    #[error("Action {action} for robot {robot} is out of range (0..{n_actions})")]
    ActionOutOfRange {
        robot: usize,
        action: usize,
        n_actions: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_errors_pass_through() {
        let e: EnvError = GraphError::CapacityExceeded {
            required: 9,
            capacity: 8,
        }
        .into();
        assert!(e.to_string().contains("increase edge capacity"));
    }

    #[test]
    fn action_out_of_range_display() {
        let e = EnvError::ActionOutOfRange {
            robot: 1,
            action: 7,
            n_actions: 4,
        };
        assert_eq!(
            e.to_string(),
            "Action 7 for robot 1 is out of range (0..4)"
        );
    }
}
