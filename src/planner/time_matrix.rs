//! All-pairs shortest paths over the motion graph.

use log::trace;

use super::motion::MotionGraph;

/// Shortest travel time and path predecessor for every ordered target pair.
///
/// `time[i][j]` is the cost of the shortest path from `i` to `j`
/// (`f64::INFINITY` when `j` is unreachable); `predecessor[i][j]` is the
/// target visited just before `j` on that path, or `j` itself when no path
/// exists. The diagonal is zero with self-predecessors.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMatrix {
    time: Vec<Vec<f64>>,
    predecessor: Vec<Vec<usize>>,
    passes: usize,
}

impl TimeMatrix {
    /// Relaxes every motion edge with cost `edge_cost` until a full pass
    /// changes nothing.
    ///
    /// Disconnected graphs terminate too: unreachable entries simply stay
    /// infinite once no pass can lower them.
    pub fn compute(motion: &MotionGraph, edge_cost: f64) -> Self {
        let n = motion.n_targets();
        let mut time = vec![vec![f64::INFINITY; n]; n];
        let mut predecessor: Vec<Vec<usize>> = (0..n).map(|_| (0..n).collect()).collect();
        for (i, row) in time.iter_mut().enumerate() {
            row[i] = 0.0;
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for (sender, receiver, _) in motion.edges().iter() {
                for (row, prev) in time.iter_mut().zip(predecessor.iter_mut()) {
                    let candidate = row[sender] + edge_cost;
                    if candidate < row[receiver] {
                        row[receiver] = candidate;
                        prev[receiver] = sender;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        trace!("time matrix over {} targets settled after {} passes", n, passes);

        Self {
            time,
            predecessor,
            passes,
        }
    }

    pub fn n_targets(&self) -> usize {
        self.time.len()
    }

    /// Number of relaxation passes, including the final unchanged one.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn time(&self, from: usize, to: usize) -> f64 {
        self.time[from][to]
    }

    pub fn predecessor(&self, from: usize, to: usize) -> usize {
        self.predecessor[from][to]
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.time[from][to].is_finite()
    }

    /// First target to move to when travelling from `from` toward `to`.
    ///
    /// Reads the predecessor of `from` on the shortest path that starts at
    /// `to`; the motion graph is symmetric, so that node is the first hop of a
    /// shortest path in the forward direction. Returns `None` when `to` is
    /// unreachable and `Some(from)` when already there.
    pub fn next_hop(&self, from: usize, to: usize) -> Option<usize> {
        if from == to {
            return Some(from);
        }
        if !self.is_reachable(to, from) {
            return None;
        }
        Some(self.predecessor[to][from])
    }

    /// Full target sequence from `from` to `to`, both ends included.
    pub fn path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if !self.is_reachable(from, to) {
            return None;
        }
        let mut path = vec![to];
        let mut node = to;
        while node != from {
            node = self.predecessor[from][node];
            path.push(node);
            if path.len() > self.n_targets() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn collinear() -> MotionGraph {
        MotionGraph::build(
            &[
                Position::new(0.0, 0.0),
                Position::new(5.0, 0.0),
                Position::new(10.0, 0.0),
            ],
            6.0,
        )
    }

    fn grid(n: usize) -> MotionGraph {
        let pts: Vec<Position> = (0..n * n)
            .map(|k| Position::new((k % n) as f64, (k / n) as f64))
            .collect();
        MotionGraph::build(&pts, 1.0)
    }

    #[test]
    fn collinear_path_goes_through_middle() {
        let tm = TimeMatrix::compute(&collinear(), 1.0);
        assert_eq!(tm.time(0, 1), 1.0);
        assert_eq!(tm.time(1, 2), 1.0);
        assert_eq!(tm.time(0, 2), tm.time(0, 1) + tm.time(1, 2));
        assert_eq!(tm.predecessor(0, 2), 1);
        assert_eq!(tm.next_hop(0, 2), Some(1));
        assert_eq!(tm.path(0, 2), Some(vec![0, 1, 2]));
    }

    #[test]
    fn diagonal_is_zero_and_self_predecessor() {
        let tm = TimeMatrix::compute(&grid(3), 1.0);
        for i in 0..9 {
            assert_eq!(tm.time(i, i), 0.0);
            assert_eq!(tm.predecessor(i, i), i);
            assert_eq!(tm.next_hop(i, i), Some(i));
        }
    }

    #[test]
    fn grid_distances_are_manhattan() {
        let tm = TimeMatrix::compute(&grid(4), 1.0);
        for a in 0..16 {
            for b in 0..16 {
                let manhattan = ((a % 4) as i64 - (b % 4) as i64).abs()
                    + ((a / 4) as i64 - (b / 4) as i64).abs();
                assert_eq!(tm.time(a, b), manhattan as f64);
            }
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let tm = TimeMatrix::compute(&grid(4), 1.0);
        for a in 0..16 {
            for b in 0..16 {
                for c in 0..16 {
                    assert!(tm.time(a, c) <= tm.time(a, b) + tm.time(b, c));
                }
            }
        }
    }

    #[test]
    fn next_hop_is_a_neighbor_on_a_shortest_path() {
        let motion = grid(4);
        let tm = TimeMatrix::compute(&motion, 1.0);
        for from in 0..16 {
            for to in 0..16 {
                if from == to {
                    continue;
                }
                let hop = tm.next_hop(from, to).unwrap();
                assert!(motion.neighbors(from).contains(&hop));
                assert_eq!(tm.time(hop, to), tm.time(from, to) - 1.0);
            }
        }
    }

    #[test]
    fn disconnected_graph_terminates_with_infinite_entries() {
        let motion = MotionGraph::build(
            &[
                Position::new(0.0, 0.0),
                Position::new(1.0, 0.0),
                Position::new(50.0, 0.0),
            ],
            2.0,
        );
        let tm = TimeMatrix::compute(&motion, 1.0);
        assert!(tm.time(0, 2).is_infinite());
        assert!(!tm.is_reachable(2, 1));
        assert_eq!(tm.predecessor(0, 2), 2);
        assert_eq!(tm.next_hop(0, 2), None);
        assert_eq!(tm.path(0, 2), None);
        assert_eq!(tm.time(0, 1), 1.0);
        // one pass settles the 0-1 link, the next confirms nothing changes
        assert_eq!(tm.passes(), 2);
    }

    #[test]
    fn uniform_cost_scales_times() {
        let tm = TimeMatrix::compute(&collinear(), 2.5);
        assert_eq!(tm.time(0, 2), 5.0);
    }
}
