//! Per-robot routing decisions.
//!
//! A decision runs in four stages:
//!
//! 1. locate each robot at its closest target
//! 2. pick a desired target: the cached route head, or the nearest unvisited
//!    target once the route is exhausted (or in greedy mode)
//! 3. project the desired target onto the next hop of the shortest motion-graph
//!    path, so the move never cuts across an obstacle; an unreachable target
//!    gives way to the nearest reachable unvisited one
//! 4. map that hop to the robot's movement edge whose receiver is closest to it
//!
//! The stages are free functions over plain slices; the environment drives
//! them through [`PatrolEnv::controller`](crate::env::PatrolEnv::controller).

use log::{debug, warn};

use super::policy::Policy;
use super::solver::RoutePlan;
use crate::env::{EnvError, PatrolEnv};
use crate::planner::TimeMatrix;
use crate::types::Position;

/// Decision policy used by [`PatrolEnv::controller`](crate::env::PatrolEnv::controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControllerMode {
    /// Uniformly random action per robot.
    Random,
    /// Always head for the nearest unvisited target.
    Greedy,
    /// Follow the cached solver route, falling back to greedy when exhausted.
    Planned,
}

/// Index of the closest target for every robot (ties go to the lower index).
pub fn closest_targets(robots: &[Position], targets: &[Position]) -> Vec<usize> {
    robots
        .iter()
        .map(|r| argmin_distance(r, targets, |_| true).unwrap_or(0))
        .collect()
}

/// Nearest unvisited target for every robot, or `None` when all are visited.
pub fn greedy_targets(robots: &[Position], targets: &[Position], visited: &[bool]) -> Vec<Option<usize>> {
    robots
        .iter()
        .map(|r| argmin_distance(r, targets, |j| !visited[j]))
        .collect()
}

/// Desired target per robot given an optional cached plan.
///
/// Robots whose plan is exhausted (or with no plan) use their greedy target;
/// when nothing is left unvisited they stay at their current target.
pub fn desired_targets(
    mut plan: Option<&mut RoutePlan>,
    current: &[usize],
    greedy: &[Option<usize>],
) -> Vec<usize> {
    current
        .iter()
        .zip(greedy)
        .enumerate()
        .map(|(robot, (&here, &fallback))| {
            if let Some(waypoint) = plan.as_deref_mut().and_then(|p| p.advance(robot, here)) {
                return waypoint;
            }
            if plan.is_some() {
                debug!("robot {} route exhausted, falling back to greedy", robot);
            }
            fallback.unwrap_or(here)
        })
        .collect()
}

/// Next hop from `current` toward `desired` along a shortest motion path.
///
/// An unreachable `desired` is replaced by the nearest reachable unvisited
/// target (see [`nearest_reachable_unvisited`]). When nothing reachable is
/// left the hop is `current`. Movement candidates never include the node a
/// robot stands on, so the robot then shuttles between `current` and its
/// closest neighbour until the episode ends.
///
/// `visited` holds one flag per target.
pub fn project_next_hop(times: &TimeMatrix, current: usize, desired: usize, visited: &[bool]) -> usize {
    if let Some(hop) = times.next_hop(current, desired) {
        return hop;
    }
    match nearest_reachable_unvisited(times, current, visited) {
        Some(target) => {
            warn!(
                "target {} unreachable from target {}; heading for target {} instead",
                desired, current, target
            );
            times.next_hop(current, target).unwrap_or(current)
        }
        None => {
            warn!(
                "target {} unreachable from target {} and no reachable target is unvisited; idling near target {}",
                desired, current, current
            );
            current
        }
    }
}

/// Unvisited target with the smallest travel time from `current`, ignoring
/// unreachable ones (ties go to the lower index).
pub fn nearest_reachable_unvisited(times: &TimeMatrix, current: usize, visited: &[bool]) -> Option<usize> {
    (0..times.n_targets())
        .filter(|&j| !visited[j] && times.is_reachable(current, j))
        .min_by(|&a, &b| {
            times
                .time(current, a)
                .total_cmp(&times.time(current, b))
                .then(a.cmp(&b))
        })
}

/// Index of the candidate receiver closest to `hop` (ties go to the lower
/// index). `candidates` are the receiver positions of one robot's movement
/// edges in action order.
pub fn hop_to_action(candidates: &[Position], hop: &Position) -> usize {
    argmin_distance(hop, candidates, |_| true).unwrap_or(0)
}

fn argmin_distance(
    from: &Position,
    points: &[Position],
    allowed: impl Fn(usize) -> bool,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|&(j, _)| allowed(j))
        .min_by(|(ja, a), (jb, b)| {
            from.distance_to(a)
                .total_cmp(&from.distance_to(b))
                .then(ja.cmp(jb))
        })
        .map(|(j, _)| j)
}

/// [`Policy`] adapter around [`PatrolEnv::controller`](crate::env::PatrolEnv::controller).
#[derive(Debug, Clone, Copy)]
pub struct RoutingController {
    mode: ControllerMode,
}

impl RoutingController {
    pub fn new(mode: ControllerMode) -> Self {
        Self { mode }
    }
}

impl Policy for RoutingController {
    fn select_actions(&mut self, env: &mut PatrolEnv) -> Result<Vec<usize>, EnvError> {
        env.controller(self.mode)
    }

    fn name(&self) -> &str {
        match self.mode {
            ControllerMode::Random => "random",
            ControllerMode::Greedy => "greedy",
            ControllerMode::Planned => "planned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::MotionGraph;

    fn row(n: usize) -> Vec<Position> {
        (0..n).map(|i| Position::new(i as f64 * 5.0, 0.0)).collect()
    }

    #[test]
    fn closest_targets_picks_nearest() {
        let robots = vec![Position::new(4.0, 1.0), Position::new(-3.0, 0.0)];
        assert_eq!(closest_targets(&robots, &row(3)), vec![1, 0]);
    }

    #[test]
    fn greedy_skips_visited_targets() {
        let robots = vec![Position::new(0.0, 0.0)];
        let visited = vec![true, true, false];
        assert_eq!(greedy_targets(&robots, &row(3), &visited), vec![Some(2)]);
        assert_eq!(greedy_targets(&robots, &row(3), &[true; 3]), vec![None]);
    }

    #[test]
    fn desired_follows_plan_then_falls_back() {
        let mut plan = RoutePlan::new(vec![vec![0, 2], vec![1]]);
        let greedy = vec![Some(3), Some(4)];
        let desired = desired_targets(Some(&mut plan), &[0, 1], &greedy);
        // robot 0 reached its head and moves on; robot 1 has one waypoint left
        assert_eq!(desired, vec![2, 4]);
        let desired = desired_targets(Some(&mut plan), &[2, 1], &greedy);
        assert_eq!(desired, vec![3, 4]);
    }

    #[test]
    fn desired_without_plan_or_unvisited_targets_stays() {
        assert_eq!(desired_targets(None, &[3], &[None]), vec![3]);
        assert_eq!(desired_targets(None, &[3], &[Some(1)]), vec![1]);
    }

    #[test]
    fn projection_follows_shortest_path() {
        let times = TimeMatrix::compute(&MotionGraph::build(&row(4), 6.0), 1.0);
        let visited = [false; 4];
        assert_eq!(project_next_hop(&times, 0, 3, &visited), 1);
        assert_eq!(project_next_hop(&times, 3, 0, &visited), 2);
        assert_eq!(project_next_hop(&times, 2, 2, &visited), 2);
    }

    #[test]
    fn unreachable_target_redirects_to_reachable_unvisited() {
        // island {0, 1, 2} and a lone target 3 far away
        let mut pts = row(3);
        pts.push(Position::new(100.0, 0.0));
        let times = TimeMatrix::compute(&MotionGraph::build(&pts, 6.0), 1.0);
        let visited = [true, true, false, false];
        assert_eq!(nearest_reachable_unvisited(&times, 0, &visited), Some(2));
        assert_eq!(project_next_hop(&times, 0, 3, &visited), 1);
    }

    #[test]
    fn nothing_reachable_left_yields_current() {
        let mut pts = row(2);
        pts.push(Position::new(100.0, 0.0));
        let times = TimeMatrix::compute(&MotionGraph::build(&pts, 6.0), 1.0);
        let visited = [true, true, false];
        assert_eq!(nearest_reachable_unvisited(&times, 0, &visited), None);
        assert_eq!(project_next_hop(&times, 0, 2, &visited), 0);
    }

    #[test]
    fn hop_maps_to_closest_candidate() {
        let candidates = vec![
            Position::new(0.0, 5.0),
            Position::new(5.0, 0.0),
            Position::new(0.0, -5.0),
        ];
        assert_eq!(hop_to_action(&candidates, &Position::new(5.0, 0.0)), 1);
        assert_eq!(hop_to_action(&candidates, &Position::new(10.0, 0.0)), 1);
    }

    #[test]
    fn controller_names() {
        assert_eq!(RoutingController::new(ControllerMode::Greedy).name(), "greedy");
        assert_eq!(RoutingController::new(ControllerMode::Planned).name(), "planned");
    }
}
