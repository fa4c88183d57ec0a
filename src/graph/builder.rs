//! Proximity graph construction from position arrays.
//!
//! Every builder takes a sender set `a` and an optional receiver set `b`.
//! When `b` is `None` the graph is built on `a` alone, and the diagonal
//! (an agent paired with itself) is treated specially: radius graphs include it
//! only on request, k-selection graphs never consider it.
//!
//! Selection order is fully deterministic: candidates are ranked by ascending
//! distance, then ascending receiver index. Emitted edges are row-major
//! (ascending sender, then ascending receiver) regardless of rank, so the
//! position of an edge within its sender's block is stable.

use std::cmp::Ordering;

use rand::Rng;

use super::edges::EdgeSet;
use super::error::GraphError;
use crate::types::Position;

/// Displacement tensor `a[i] - b[j]`, shaped `n × m`.
pub fn pairwise_diff(a: &[Position], b: Option<&[Position]>) -> Vec<Vec<Position>> {
    let b = b.unwrap_or(a);
    a.iter()
        .map(|pa| b.iter().map(|pb| *pa - *pb).collect())
        .collect()
}

/// Euclidean distance matrix between `a` and `b` (or `a` and itself).
pub fn pairwise_distances(a: &[Position], b: Option<&[Position]>) -> Vec<Vec<f64>> {
    pairwise_diff(a, b)
        .into_iter()
        .map(|row| row.into_iter().map(|d| d.norm()).collect())
        .collect()
}

/// Edges between every pair closer than or exactly at `radius`.
///
/// Weights are Euclidean distances. On a single set the diagonal is emitted
/// (with weight 0) only when `self_loops` is true.
pub fn radius_graph(
    radius: f64,
    a: &[Position],
    b: Option<&[Position]>,
    self_loops: bool,
) -> EdgeSet {
    let single = b.is_none();
    let dist = pairwise_distances(a, b);
    let mut edges = EdgeSet::new();

    for (i, row) in dist.iter().enumerate() {
        for (j, &d) in row.iter().enumerate() {
            if single && i == j && !self_loops {
                continue;
            }
            if d <= radius {
                edges.push(i, j, d);
            }
        }
    }
    edges
}

/// Exactly `k` outgoing edges per sender, to its nearest receivers.
///
/// With `allow_nearest == false` the `k + 1` closest receivers are gathered
/// and the closest one dropped, which keeps a robot from choosing the node it
/// is already standing on.
///
/// # Errors
///
/// [`GraphError::NotEnoughCandidates`] if a sender has fewer than `k`
/// (or `k + 1`) candidate receivers.
pub fn k_nearest_graph(
    k: usize,
    a: &[Position],
    b: Option<&[Position]>,
    allow_nearest: bool,
) -> Result<EdgeSet, GraphError> {
    let needed = if allow_nearest { k } else { k + 1 };
    let dist = pairwise_distances(a, b);
    let mut edges = EdgeSet::with_capacity(a.len() * k);

    for (i, row) in dist.iter().enumerate() {
        let ranked = rank_candidates(row, b.is_none().then_some(i), needed)?;
        let skip = usize::from(!allow_nearest);
        emit_sorted(&mut edges, i, &ranked[skip..], row);
    }
    Ok(edges)
}

/// `k` outgoing edges per sender, chosen by jittered normalised distance.
///
/// Each sender's distances are divided by that sender's largest distance,
/// then perturbed by a uniform draw from `[0, jitter)`. The `k` smallest
/// perturbed values win. Weights are the true Euclidean distances. Draws are
/// taken sender-major, receiver-minor, so a seeded `rng` reproduces the same
/// edges.
///
/// # Errors
///
/// [`GraphError::NotEnoughCandidates`] if a sender has fewer than `k`
/// candidate receivers.
pub fn k_sampled_graph<R: Rng + ?Sized>(
    k: usize,
    a: &[Position],
    b: Option<&[Position]>,
    jitter: f64,
    rng: &mut R,
) -> Result<EdgeSet, GraphError> {
    let dist = pairwise_distances(a, b);
    let mut edges = EdgeSet::with_capacity(a.len() * k);

    for (i, row) in dist.iter().enumerate() {
        let exclude = b.is_none().then_some(i);
        let scale = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| Some(j) != exclude)
            .map(|(_, &d)| d)
            .fold(0.0_f64, f64::max);

        let noisy: Vec<f64> = row
            .iter()
            .enumerate()
            .map(|(j, &d)| {
                if Some(j) == exclude {
                    return f64::INFINITY;
                }
                let norm = if scale > 0.0 { d / scale } else { 0.0 };
                if jitter > 0.0 {
                    norm + rng.gen_range(0.0..jitter)
                } else {
                    norm
                }
            })
            .collect();

        let ranked = rank_candidates(&noisy, exclude, k)?;
        emit_sorted(&mut edges, i, &ranked, row);
    }
    Ok(edges)
}

/// Returns the `needed` best candidate indices of `scores`, best first.
fn rank_candidates(
    scores: &[f64],
    exclude: Option<usize>,
    needed: usize,
) -> Result<Vec<usize>, GraphError> {
    let mut candidates: Vec<usize> = (0..scores.len()).filter(|&j| Some(j) != exclude).collect();
    if needed > candidates.len() {
        return Err(GraphError::NotEnoughCandidates {
            requested: needed,
            available: candidates.len(),
        });
    }
    candidates.sort_by(|&x, &y| compare_scores(scores[x], scores[y]).then(x.cmp(&y)));
    candidates.truncate(needed);
    Ok(candidates)
}

fn compare_scores(x: f64, y: f64) -> Ordering {
    x.total_cmp(&y)
}

fn emit_sorted(edges: &mut EdgeSet, sender: usize, chosen: &[usize], dist_row: &[f64]) {
    let mut chosen = chosen.to_vec();
    chosen.sort_unstable();
    for j in chosen {
        edges.push(sender, j, dist_row[j]);
    }
}
