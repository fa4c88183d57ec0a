//! Variable-length directed edge lists.

/// A set of directed, weighted edges stored as parallel arrays.
///
/// Edge `e` goes from `senders[e]` to `receivers[e]` with weight `weights[e]`.
/// Builders emit edges in row-major order: ascending sender, then ascending
/// receiver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    pub senders: Vec<usize>,
    pub receivers: Vec<usize>,
    pub weights: Vec<f64>,
}

impl EdgeSet {
    /// Creates an empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty edge set with room for `n` edges.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            senders: Vec::with_capacity(n),
            receivers: Vec::with_capacity(n),
            weights: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, sender: usize, receiver: usize, weight: f64) {
        self.senders.push(sender);
        self.receivers.push(receiver);
        self.weights.push(weight);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Iterates over `(sender, receiver, weight)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.senders
            .iter()
            .zip(&self.receivers)
            .zip(&self.weights)
            .map(|((&s, &r), &w)| (s, r, w))
    }

    /// Shifts sender and receiver indices into the global agent numbering.
    ///
    /// Builders work on local position slices; robots sit at offset 0 and
    /// targets at offset `R` in the agent array.
    pub fn offset(mut self, sender_offset: usize, receiver_offset: usize) -> Self {
        for s in &mut self.senders {
            *s += sender_offset;
        }
        for r in &mut self.receivers {
            *r += receiver_offset;
        }
        self
    }

    /// Swaps the direction of every edge.
    pub fn reversed(self) -> Self {
        Self {
            senders: self.receivers,
            receivers: self.senders,
            weights: self.weights,
        }
    }

    /// Receivers of the edges leaving `sender`, in storage order.
    pub fn receivers_of(&self, sender: usize) -> Vec<usize> {
        self.iter()
            .filter(|&(s, _, _)| s == sender)
            .map(|(_, r, _)| r)
            .collect()
    }

    /// Number of edges leaving `sender`.
    pub fn out_degree(&self, sender: usize) -> usize {
        self.senders.iter().filter(|&&s| s == sender).count()
    }

    /// Returns true if the edge `(sender, receiver)` is present.
    pub fn contains(&self, sender: usize, receiver: usize) -> bool {
        self.iter().any(|(s, r, _)| s == sender && r == receiver)
    }
}
