//! Long-horizon route solver capability and the cached plan it produces.

use std::collections::VecDeque;

use crate::types::Position;

/// Per-robot ordered sequence of target indices (target-local, `0..T`).
///
/// Consumed from the front as each robot reaches its next waypoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    routes: Vec<VecDeque<usize>>,
}

impl RoutePlan {
    /// Wraps one route per robot.
    pub fn new(routes: Vec<Vec<usize>>) -> Self {
        Self {
            routes: routes.into_iter().map(VecDeque::from).collect(),
        }
    }

    pub fn n_robots(&self) -> usize {
        self.routes.len()
    }

    /// Remaining waypoints for `robot`.
    pub fn remaining(&self, robot: usize) -> usize {
        self.routes.get(robot).map_or(0, |r| r.len())
    }

    /// Current head waypoint for `robot`.
    pub fn head(&self, robot: usize) -> Option<usize> {
        self.routes.get(robot).and_then(|r| r.front().copied())
    }

    /// Returns the waypoint `robot` should head for from `current`, or `None`
    /// when the route is exhausted (one or zero waypoints left).
    ///
    /// Reaching the head waypoint pops it, so the following waypoint becomes
    /// the new goal. The last waypoint is never popped.
    pub fn advance(&mut self, robot: usize, current: usize) -> Option<usize> {
        let route = self.routes.get_mut(robot)?;
        if route.len() <= 1 {
            return None;
        }
        if route.front() == Some(&current) {
            route.pop_front();
        }
        route.front().copied()
    }

    /// Iterates over all waypoints of all robots.
    pub fn waypoints(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.iter().flat_map(|r| r.iter().copied())
    }
}

/// External combinatorial route solver.
///
/// Called at most once per episode; the result is cached until reset.
pub trait RouteSolver: Send + Sync {
    /// Computes one ordered list of target indices per robot.
    ///
    /// # Arguments
    ///
    /// * `robots` - Current robot positions
    /// * `targets` - All target positions
    /// * `visited` - Visited flag per target
    fn solve(&self, robots: &[Position], targets: &[Position], visited: &[bool]) -> RoutePlan;

    /// Returns a human-readable name for this solver.
    fn name(&self) -> &str;
}

/// Nearest-neighbour tour construction over unvisited targets.
///
/// Robots take turns claiming the unclaimed unvisited target closest to the
/// end of their own tour. Each route starts with the target the robot is
/// currently closest to, so the first pop happens once the robot settles
/// there.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborSolver;

impl RouteSolver for NearestNeighborSolver {
    fn solve(&self, robots: &[Position], targets: &[Position], visited: &[bool]) -> RoutePlan {
        let unrestricted = vec![false; targets.len()];
        let mut claimed = visited.to_vec();
        let mut tails: Vec<Position> = robots.to_vec();
        let mut routes: Vec<Vec<usize>> = robots
            .iter()
            .map(|r| nearest(r, targets, &unrestricted).into_iter().collect())
            .collect();

        let mut progress = true;
        while progress {
            progress = false;
            for (route, tail) in routes.iter_mut().zip(tails.iter_mut()) {
                if let Some(t) = nearest(tail, targets, &claimed) {
                    claimed[t] = true;
                    *tail = targets[t];
                    if route.last() != Some(&t) {
                        route.push(t);
                    }
                    progress = true;
                }
            }
        }
        RoutePlan::new(routes)
    }

    fn name(&self) -> &str {
        "nearest_neighbor"
    }
}

fn nearest(from: &Position, targets: &[Position], excluded: &[bool]) -> Option<usize> {
    targets
        .iter()
        .enumerate()
        .filter(|&(j, _)| !excluded[j])
        .min_by(|(ja, a), (jb, b)| {
            from.distance_to(a)
                .total_cmp(&from.distance_to(b))
                .then(ja.cmp(jb))
        })
        .map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_pops_reached_head() {
        let mut plan = RoutePlan::new(vec![vec![3, 5, 7]]);
        assert_eq!(plan.advance(0, 1), Some(3));
        assert_eq!(plan.advance(0, 3), Some(5));
        assert_eq!(plan.remaining(0), 2);
        assert_eq!(plan.advance(0, 5), Some(7));
        // exhausted: the last waypoint stays
        assert_eq!(plan.advance(0, 7), None);
        assert_eq!(plan.head(0), Some(7));
    }

    #[test]
    fn advance_on_empty_or_missing_route() {
        let mut plan = RoutePlan::new(vec![vec![]]);
        assert_eq!(plan.advance(0, 0), None);
        assert_eq!(plan.advance(4, 0), None);
    }

    #[test]
    fn nearest_neighbor_covers_unvisited_once() {
        let targets: Vec<Position> = (0..6).map(|i| Position::new(i as f64, 0.0)).collect();
        let visited = vec![false, true, false, false, true, false];
        let robots = vec![Position::new(0.0, 0.0), Position::new(5.0, 0.0)];
        let plan = NearestNeighborSolver.solve(&robots, &targets, &visited);

        assert_eq!(plan.n_robots(), 2);
        assert_eq!(plan.head(0), Some(0));
        assert_eq!(plan.head(1), Some(5));

        let mut covered: Vec<usize> = plan.waypoints().collect();
        covered.sort_unstable();
        covered.dedup();
        assert_eq!(covered, vec![0, 2, 3, 5]);
    }
}
