//! Uniform sampling without replacement via partial Fisher–Yates.
//!
//! Conceptually: start from the identity permutation of positions `[0, d)`,
//! run only the first `k` steps of a Fisher–Yates shuffle, and emit the
//! prefix. This yields an unbiased size-`k` sample without replacement in
//! O(k) swaps, which matters when a node's degree is orders of magnitude
//! larger than `k`.
//!
//! Two entry modes:
//! - *ephemeral*: a fresh index buffer is allocated per call;
//! - *scratch*: the caller supplies a reusable buffer, grown on demand and
//!   initialized only over the first `d` slots, amortizing allocation across
//!   millions of per-node calls.
//!
//! Both modes are observationally identical given the same RNG state.
//!
//! The functions here emit *positions within the range* (`0..d`), not
//! neighbor ids; the batch driver maps a position to the neighbor id and,
//! when requested, the edge id stored in the same slot.

use rand::prelude::*;

use crate::SampleSize;

/// Uniformly sample positions from `[0, degree)` without replacement,
/// with a convenience thread-local RNG.
///
/// Not deterministic across processes; use
/// [`uniform_sample_range_with_rng`] where determinism matters.
pub fn uniform_sample_range(degree: usize, size: SampleSize) -> Vec<usize> {
    let mut rng = rand::rng();
    uniform_sample_range_with_rng(degree, size, &mut rng)
}

/// Uniformly sample positions from `[0, degree)` without replacement,
/// allocating an ephemeral index buffer.
pub fn uniform_sample_range_with_rng<R: Rng + ?Sized>(
    degree: usize,
    size: SampleSize,
    rng: &mut R,
) -> Vec<usize> {
    let mut out = Vec::new();
    let mut scratch = Vec::new();
    uniform_sample_range_scratch_with_rng(degree, size, &mut scratch, &mut out, rng);
    out
}

/// Uniformly sample positions from `[0, degree)` without replacement,
/// appending them to `out` and using a caller-owned scratch buffer.
///
/// `scratch` is grown to `degree` slots if shorter and only its first
/// `degree` slots are touched; its contents carry no meaning between calls.
///
/// When the requested size covers the whole range (`All`, or `k >= degree`),
/// positions are emitted in stored order and neither the RNG nor the
/// scratch buffer is touched.
pub fn uniform_sample_range_scratch_with_rng<R: Rng + ?Sized>(
    degree: usize,
    size: SampleSize,
    scratch: &mut Vec<usize>,
    out: &mut Vec<usize>,
    rng: &mut R,
) {
    if size.takes_all(degree) {
        out.extend(0..degree);
        return;
    }
    let take = size.bound(degree);
    if take == 0 {
        return;
    }

    if scratch.len() < degree {
        scratch.resize(degree, 0);
    }
    for (pos, slot) in scratch[..degree].iter_mut().enumerate() {
        *slot = pos;
    }

    // Partial Fisher–Yates: after step i, scratch[i] is the i-th sample.
    for i in 0..take {
        let j = rng.random_range(i..degree);
        scratch.swap(i, j);
        out.push(scratch[i]);
    }
}
