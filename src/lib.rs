//! `kinjo`: minibatch neighbor sampling over compressed sparse graphs.
//!
//! Given a CSC/CSR adjacency (neighbor ids + offsets) and a batch of query
//! nodes, this crate draws a bounded random subset of each node's outgoing
//! neighbors, the minibatch primitive of GraphSAGE-style training loops.
//! Sampling is always without replacement: partial Fisher–Yates for the
//! uniform case (with an optional reusable scratch buffer), priority-key
//! A-Res for the edge-weighted case.
//!
//! Exposed modules:
//! - `csc`: read-only [`CscGraph`] adjacency view + degree resolution.
//! - `fisher_yates`: uniform sampling of positions from one neighbor range.
//! - `weighted`: weight-proportional sampling of positions from one range.
//! - `batch`: [`NeighborSampler`], the batch driver (sequential and
//!   rayon-parallel), producing flat `(neighbors, counts, edge_ids)` output.
//! - `error`: the [`SampleError`] taxonomy.
//!
//! ```
//! use kinjo::{CscGraph, NeighborSampler, SampleSize};
//!
//! // Edges (src, dst): (3,0), (7,0), (0,1), (9,1), (1,2), (4,3), (2,4),
//! // (9,5), (3,5), (9,6), (1,6), (9,8), (7,8), stored CSC by destination.
//! let row = [3i64, 7, 0, 9, 1, 4, 2, 9, 3, 9, 1, 9, 7];
//! let colptr = [0i64, 2, 4, 5, 6, 7, 9, 11, 11, 13, 13];
//! let graph = CscGraph::new(&row, &colptr)?;
//!
//! let sampler = NeighborSampler::new(SampleSize::from(2)).with_seed(7);
//! let out = sampler.sample(&graph, &[0, 7, 1, 2])?;
//!
//! // Node 7 has no neighbors; everyone else has at most 2.
//! assert_eq!(out.counts, vec![2, 0, 2, 1]);
//! # Ok::<(), kinjo::SampleError>(())
//! ```

#![forbid(unsafe_code)]

pub mod batch;
pub mod csc;
pub mod error;
pub mod fisher_yates;
pub mod weighted;

pub use batch::{NeighborSampler, SampleOutput};
pub use csc::{CscGraph, IndexType};
pub use error::SampleError;
pub use fisher_yates::{
    uniform_sample_range, uniform_sample_range_scratch_with_rng, uniform_sample_range_with_rng,
};
pub use weighted::{weighted_sample_range, weighted_sample_range_with_rng};

/// Requested per-node sample size.
///
/// The graph-learning frontends this crate serves use `-1` as an
/// "all neighbors" sentinel; [`SampleSize::from`] maps any negative value
/// to [`SampleSize::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Return every neighbor, in stored order, without randomness.
    All,
    /// Return at most this many neighbors.
    Fixed(usize),
}

impl SampleSize {
    /// Number of samples drawn from a range of `degree` candidates.
    pub fn bound(self, degree: usize) -> usize {
        match self {
            SampleSize::All => degree,
            SampleSize::Fixed(k) => k.min(degree),
        }
    }

    /// True when the whole range is returned untouched (no randomness).
    pub fn takes_all(self, degree: usize) -> bool {
        match self {
            SampleSize::All => true,
            SampleSize::Fixed(k) => k >= degree,
        }
    }
}

impl From<i64> for SampleSize {
    fn from(raw: i64) -> Self {
        if raw < 0 {
            SampleSize::All
        } else {
            SampleSize::Fixed(raw as usize)
        }
    }
}
