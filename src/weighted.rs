//! Weighted sampling without replacement via priority keys (A-Res).
//!
//! Each candidate position `i` with weight `w_i` draws an independent
//! `u_i ~ Uniform(0, 1]` and gets the key `u_i^(1 / w_i)`; the `k` largest
//! keys form the sample (Efraimidis–Spirakis, 2006). Inclusion probability
//! is monotonically increasing in weight and no per-call cumulative
//! distribution is ever materialized. A bounded min-heap of size `k` keeps
//! the pass O(d log k).
//!
//! Keys are computed in `f64` log space, `exp(ln(u) / w)`, which stays
//! stable for very small and very large weights. A weight of exactly 0
//! yields the minimal key `0.0`: the candidate remains a valid slot but is
//! only selected when fewer than `k` positive-weight candidates exist.
//! Ties between equal keys (in particular between zero-weight candidates)
//! break deterministically toward the lower position, so the degenerate
//! all-zero-weight range selects the `k` lowest positions given any seed.
//! One uniform draw is consumed per candidate regardless of its weight, so
//! RNG stream consumption never depends on the weight values.
//!
//! Like the uniform module, functions emit *positions within the range*;
//! the batch driver maps positions to neighbor ids and edge ids.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rand::prelude::*;

use crate::SampleSize;

/// A candidate's priority key with its position, ordered by key and then
/// by position (lower position wins ties).
#[derive(Debug, Clone, Copy)]
struct PriorityKey {
    key: f64,
    pos: usize,
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

/// Sample positions from `[0, weights.len())` without replacement,
/// proportionally to weight, with a convenience thread-local RNG.
///
/// Not deterministic across processes; use
/// [`weighted_sample_range_with_rng`] where determinism matters.
pub fn weighted_sample_range(weights: &[f32], size: SampleSize) -> Vec<usize> {
    let mut rng = rand::rng();
    let mut out = Vec::new();
    weighted_sample_range_with_rng(weights, size, &mut out, &mut rng);
    out
}

/// Sample positions from `[0, weights.len())` without replacement,
/// proportionally to weight, appending them to `out`.
///
/// When the requested size covers the whole range, positions are emitted
/// in stored order and the RNG is not touched. Otherwise exactly
/// `min(k, d)` positions are emitted in decreasing key order.
pub fn weighted_sample_range_with_rng<R: Rng + ?Sized>(
    weights: &[f32],
    size: SampleSize,
    out: &mut Vec<usize>,
    rng: &mut R,
) {
    let degree = weights.len();
    if size.takes_all(degree) {
        out.extend(0..degree);
        return;
    }
    let take = size.bound(degree);
    if take == 0 {
        return;
    }

    // Bounded min-heap over the current top-k keys; the root is the
    // smallest kept key and is evicted by any larger candidate.
    let mut heap: BinaryHeap<Reverse<PriorityKey>> = BinaryHeap::with_capacity(take);
    for (pos, &w) in weights.iter().enumerate() {
        let u = rng.random::<f64>().max(f64::MIN_POSITIVE);
        let key = if w > 0.0 {
            (u.ln() / f64::from(w)).exp()
        } else {
            0.0
        };
        let candidate = PriorityKey { key, pos };
        if heap.len() < take {
            heap.push(Reverse(candidate));
        } else if let Some(&Reverse(smallest)) = heap.peek() {
            if candidate > smallest {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending order of `Reverse` is descending key order.
    out.extend(
        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry.pos),
    );
}
