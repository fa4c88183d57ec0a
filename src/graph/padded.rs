//! Fixed-capacity edge arrays for batched observations.

use super::edges::EdgeSet;
use super::error::GraphError;

/// Marks an unused slot in [`PaddedEdges::senders`] / [`PaddedEdges::receivers`].
pub const SENTINEL: i32 = -1;

/// Fixed-capacity parallel edge arrays, padded with [`SENTINEL`].
///
/// The first `n_static` slots hold edges that never change during an episode
/// (the motion graph); the remainder is rewritten on every step.
///
/// # Invariants
///
/// - `senders`, `receivers` and `weights` always have length `capacity`
/// - live (non-sentinel) slots form a prefix of the arrays
/// - live slots never exceed `capacity`; overflow is an error, never truncation
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedEdges {
    pub senders: Vec<i32>,
    pub receivers: Vec<i32>,
    pub weights: Vec<f32>,
    n_static: usize,
    n_live: usize,
}

impl PaddedEdges {
    /// Creates empty arrays of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            senders: vec![SENTINEL; capacity],
            receivers: vec![SENTINEL; capacity],
            weights: vec![0.0; capacity],
            n_static: 0,
            n_live: 0,
        }
    }

    /// Creates arrays whose leading slots hold `static_edges`.
    pub fn with_static(capacity: usize, static_edges: &EdgeSet) -> Result<Self, GraphError> {
        let mut padded = Self::new(capacity);
        padded.write(0, &[static_edges])?;
        padded.n_static = static_edges.len();
        Ok(padded)
    }

    pub fn capacity(&self) -> usize {
        self.senders.len()
    }

    /// Number of static leading edges.
    pub fn n_static(&self) -> usize {
        self.n_static
    }

    /// Number of live edges (static + current dynamic).
    pub fn n_live(&self) -> usize {
        self.n_live
    }

    /// Replaces all dynamic slots with the concatenation of `dynamic`.
    ///
    /// # Errors
    ///
    /// [`GraphError::CapacityExceeded`] when static plus dynamic edges do not
    /// fit. The arrays are left untouched in that case.
    pub fn set_dynamic(&mut self, dynamic: &[&EdgeSet]) -> Result<(), GraphError> {
        self.write(self.n_static, dynamic)
    }

    fn write(&mut self, start: usize, sets: &[&EdgeSet]) -> Result<(), GraphError> {
        let incoming: usize = sets.iter().map(|s| s.len()).sum();
        let required = start + incoming;
        if required > self.capacity() {
            return Err(GraphError::CapacityExceeded {
                required,
                capacity: self.capacity(),
            });
        }

        self.senders[start..].fill(SENTINEL);
        self.receivers[start..].fill(SENTINEL);
        self.weights[start..].fill(0.0);

        let mut slot = start;
        for set in sets {
            for (s, r, w) in set.iter() {
                self.senders[slot] = s as i32;
                self.receivers[slot] = r as i32;
                self.weights[slot] = w as f32;
                slot += 1;
            }
        }
        self.n_live = required;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(usize, usize)]) -> EdgeSet {
        let mut e = EdgeSet::new();
        for &(s, r) in pairs {
            e.push(s, r, 1.0);
        }
        e
    }

    #[test]
    fn static_prefix_survives_dynamic_rewrites() {
        let mut p = PaddedEdges::with_static(6, &edges(&[(3, 4), (4, 3)])).unwrap();
        p.set_dynamic(&[&edges(&[(0, 3), (0, 4), (1, 3)])]).unwrap();
        assert_eq!(p.n_live(), 5);
        p.set_dynamic(&[&edges(&[(1, 4)])]).unwrap();
        assert_eq!(p.n_static(), 2);
        assert_eq!(p.senders, vec![3, 4, 1, -1, -1, -1]);
        assert_eq!(p.receivers, vec![4, 3, 4, -1, -1, -1]);
        assert_eq!(p.n_live(), 3);
    }

    #[test]
    fn overflow_is_an_error_and_leaves_arrays_intact() {
        let mut p = PaddedEdges::with_static(3, &edges(&[(0, 1)])).unwrap();
        p.set_dynamic(&[&edges(&[(1, 2)])]).unwrap();
        let before = p.clone();
        let err = p
            .set_dynamic(&[&edges(&[(0, 2)]), &edges(&[(2, 0), (2, 1)])])
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::CapacityExceeded {
                required: 4,
                capacity: 3
            }
        );
        assert_eq!(p, before);
    }

    #[test]
    fn static_overflow_is_rejected() {
        let err = PaddedEdges::with_static(1, &edges(&[(0, 1), (1, 0)])).unwrap_err();
        assert!(matches!(err, GraphError::CapacityExceeded { .. }));
    }
}
