//! Batch driver: per-query-node sampling with assembled, flattened output.
//!
//! [`NeighborSampler`] walks a batch of query nodes, resolves each node's
//! neighbor range, samples it uniformly or by edge weight, and packs the
//! results into three flat arrays: neighbors, per-node counts, and
//! (optionally) the original edge ids of the sampled edges.
//!
//! Per-node work items are mutually independent, so the `par_*` entry
//! points fan them out over rayon. Output sizing is two-pass: counts are
//! known from degrees alone (`min(k, degree)`), a prefix sum turns them
//! into disjoint output segments, and workers fill their segments without
//! reallocation or write contention. Every worker owns a private RNG and a
//! private scratch buffer; with a fixed seed, per-node outcomes are derived
//! from the node's batch position alone, so results are identical for any
//! worker count and for sequential vs parallel execution.

use std::ops::Range;

use log::debug;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::csc::{CscGraph, IndexType};
use crate::error::SampleError;
use crate::fisher_yates::uniform_sample_range_scratch_with_rng;
use crate::weighted::weighted_sample_range_with_rng;
use crate::SampleSize;

/// Flattened sampling output for one query batch.
///
/// `neighbors` holds each node's sample contiguously, in batch order;
/// `counts[i]` is the number of neighbors actually sampled for the i-th
/// query node; `edge_ids` is parallel to `neighbors` and present iff edge
/// ids were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutput<I> {
    pub neighbors: Vec<I>,
    pub counts: Vec<usize>,
    pub edge_ids: Option<Vec<I>>,
}

/// Configurable neighbor sampler over a [`CscGraph`].
///
/// # Examples
///
/// ```
/// use kinjo::{CscGraph, NeighborSampler, SampleSize};
///
/// let row = [3i64, 7, 0, 9, 1, 4, 2, 9, 3, 9, 1, 9, 7];
/// let colptr = [0i64, 2, 4, 5, 6, 7, 9, 11, 11, 13, 13];
/// let graph = CscGraph::new(&row, &colptr)?;
///
/// let sampler = NeighborSampler::new(SampleSize::Fixed(2)).with_seed(7);
/// let out = sampler.sample(&graph, &[0, 7, 1, 2])?;
/// assert_eq!(out.counts, vec![2, 0, 2, 1]);
/// assert_eq!(out.neighbors.len(), 5);
/// # Ok::<(), kinjo::SampleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NeighborSampler {
    size: SampleSize,
    return_edge_ids: bool,
    seed: Option<u64>,
}

impl NeighborSampler {
    /// Create a sampler drawing up to `size` neighbors per query node.
    pub fn new(size: SampleSize) -> Self {
        Self {
            size,
            return_edge_ids: false,
            seed: None,
        }
    }

    /// Set a random seed. Seeded runs are exactly reproducible, including
    /// across sequential/parallel execution and any worker count.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Also emit the original edge id of every sampled edge.
    ///
    /// Requires the graph view to carry an edge id array; sampling fails
    /// with [`SampleError::InvalidArgument`] otherwise.
    pub fn return_edge_ids(mut self, yes: bool) -> Self {
        self.return_edge_ids = yes;
        self
    }

    /// Sample uniformly without replacement, sequentially.
    ///
    /// One scratch buffer is reused across the whole batch, so per-node
    /// allocation is amortized even for very skewed degree distributions.
    pub fn sample<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
    ) -> Result<SampleOutput<I>, SampleError> {
        debug!(
            "uniform sample: batch={} size={:?} seeded={}",
            nodes.len(),
            self.size,
            self.seed.is_some()
        );
        self.run_sequential(graph, nodes, RangeSampler::Uniform)
    }

    /// Sample uniformly without replacement, in parallel over query nodes.
    pub fn par_sample<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
    ) -> Result<SampleOutput<I>, SampleError> {
        debug!(
            "uniform par_sample: batch={} size={:?} seeded={}",
            nodes.len(),
            self.size,
            self.seed.is_some()
        );
        self.run_parallel(graph, nodes, RangeSampler::Uniform)
    }

    /// Sample without replacement with probability proportional to edge
    /// weight, sequentially.
    ///
    /// Requires the graph view to carry an edge weight array; there is no
    /// silent fallback to uniform sampling.
    pub fn weighted_sample<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
    ) -> Result<SampleOutput<I>, SampleError> {
        debug!(
            "weighted sample: batch={} size={:?} seeded={}",
            nodes.len(),
            self.size,
            self.seed.is_some()
        );
        let weights = require_weights(graph)?;
        self.run_sequential(graph, nodes, RangeSampler::Weighted(weights))
    }

    /// Sample proportionally to edge weight, in parallel over query nodes.
    pub fn par_weighted_sample<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
    ) -> Result<SampleOutput<I>, SampleError> {
        debug!(
            "weighted par_sample: batch={} size={:?} seeded={}",
            nodes.len(),
            self.size,
            self.seed.is_some()
        );
        let weights = require_weights(graph)?;
        self.run_parallel(graph, nodes, RangeSampler::Weighted(weights))
    }

    fn run_sequential<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
        mode: RangeSampler<'_>,
    ) -> Result<SampleOutput<I>, SampleError> {
        let eid_src = self.eid_source(graph)?;
        let ranges = resolve_ranges(graph, nodes)?;
        let counts: Vec<usize> = ranges.iter().map(|r| self.size.bound(r.len())).collect();
        let total: usize = counts.iter().sum();

        let neighbor_src = graph.neighbor_ids();
        let mut neighbors = Vec::with_capacity(total);
        let mut edge_ids = eid_src.map(|_| Vec::with_capacity(total));

        let mut scratch = Vec::new();
        let mut positions = Vec::new();
        for (p, range) in ranges.iter().enumerate() {
            positions.clear();
            let mut rng = self.node_rng(p);
            mode.sample_into(range, self.size, &mut scratch, &mut positions, &mut rng);
            for &pos in &positions {
                neighbors.push(neighbor_src[range.start + pos]);
            }
            if let (Some(out), Some(src)) = (edge_ids.as_mut(), eid_src) {
                for &pos in &positions {
                    out.push(src[range.start + pos]);
                }
            }
        }

        Ok(SampleOutput {
            neighbors,
            counts,
            edge_ids,
        })
    }

    fn run_parallel<I: IndexType>(
        &self,
        graph: &CscGraph<'_, I>,
        nodes: &[I],
        mode: RangeSampler<'_>,
    ) -> Result<SampleOutput<I>, SampleError> {
        let eid_src = self.eid_source(graph)?;
        let ranges = resolve_ranges(graph, nodes)?;
        let counts: Vec<usize> = ranges.iter().map(|r| self.size.bound(r.len())).collect();
        let total: usize = counts.iter().sum();

        let neighbor_src = graph.neighbor_ids();
        let mut neighbors = vec![I::zero(); total];
        let mut edge_ids = eid_src.map(|_| vec![I::zero(); total]);

        let neighbor_segments = split_segments(&mut neighbors, &counts);
        let eid_segments: Vec<Option<&mut [I]>> = match edge_ids.as_mut() {
            Some(buf) => split_segments(buf, &counts).into_iter().map(Some).collect(),
            None => counts.iter().map(|_| None).collect(),
        };

        (ranges, neighbor_segments, eid_segments)
            .into_par_iter()
            .enumerate()
            .for_each_init(
                || (Vec::new(), Vec::new()),
                |(scratch, positions), (p, (range, n_seg, e_seg))| {
                    positions.clear();
                    let mut rng = self.node_rng(p);
                    mode.sample_into(&range, self.size, scratch, positions, &mut rng);
                    for (dst, &pos) in n_seg.iter_mut().zip(positions.iter()) {
                        *dst = neighbor_src[range.start + pos];
                    }
                    if let (Some(e_seg), Some(src)) = (e_seg, eid_src) {
                        for (dst, &pos) in e_seg.iter_mut().zip(positions.iter()) {
                            *dst = src[range.start + pos];
                        }
                    }
                },
            );

        Ok(SampleOutput {
            neighbors,
            counts,
            edge_ids,
        })
    }

    fn eid_source<'a, I: IndexType>(
        &self,
        graph: &CscGraph<'a, I>,
    ) -> Result<Option<&'a [I]>, SampleError> {
        if !self.return_edge_ids {
            return Ok(None);
        }
        graph
            .edge_ids()
            .map(Some)
            .ok_or_else(|| SampleError::InvalidArgument {
                reason: "edge ids requested but the graph view carries no edge id array".into(),
            })
    }

    /// RNG for the node at batch position `p`.
    ///
    /// Seeded runs derive one independent stream per node from (seed, p),
    /// so outcomes do not depend on scheduling or worker count.
    fn node_rng(&self, position: usize) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(mix_seed(seed, position as u64))),
            None => Box::new(rand::rng()),
        }
    }
}

/// Per-range sampling mode, fixed for a whole batch call.
#[derive(Clone, Copy)]
enum RangeSampler<'a> {
    Uniform,
    Weighted(&'a [f32]),
}

impl RangeSampler<'_> {
    fn sample_into<R: Rng + ?Sized>(
        &self,
        range: &Range<usize>,
        size: SampleSize,
        scratch: &mut Vec<usize>,
        out: &mut Vec<usize>,
        rng: &mut R,
    ) {
        match self {
            RangeSampler::Uniform => {
                uniform_sample_range_scratch_with_rng(range.len(), size, scratch, out, rng);
            }
            RangeSampler::Weighted(weights) => {
                weighted_sample_range_with_rng(&weights[range.clone()], size, out, rng);
            }
        }
    }
}

fn require_weights<'a, I: IndexType>(
    graph: &CscGraph<'a, I>,
) -> Result<&'a [f32], SampleError> {
    graph
        .edge_weights()
        .ok_or_else(|| SampleError::InvalidArgument {
            reason: "weighted sampling requested but the graph view carries no weight array".into(),
        })
}

/// Resolve every query node's range up front; any out-of-range node aborts
/// the call before sampling starts, so no partial output can be observed.
fn resolve_ranges<I: IndexType>(
    graph: &CscGraph<'_, I>,
    nodes: &[I],
) -> Result<Vec<Range<usize>>, SampleError> {
    nodes.iter().map(|&v| graph.neighbor_range(v)).collect()
}

/// Split `buf` into one disjoint mutable segment per count.
fn split_segments<'b, T>(mut buf: &'b mut [T], counts: &[usize]) -> Vec<&'b mut [T]> {
    let mut segments = Vec::with_capacity(counts.len());
    for &count in counts {
        let (head, tail) = buf.split_at_mut(count);
        segments.push(head);
        buf = tail;
    }
    segments
}

/// SplitMix64 over (seed, position), decorrelating per-node streams that
/// share one user-facing seed.
fn mix_seed(seed: u64, position: u64) -> u64 {
    let mut z = seed.wrapping_add(position.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // CSC form of the example graph from the crate docs: edges
    // (3,0), (7,0), (0,1), (9,1), (1,2), (4,3), (2,4), (9,5), (3,5),
    // (9,6), (1,6), (9,8), (7,8).
    const ROW: [i64; 13] = [3, 7, 0, 9, 1, 4, 2, 9, 3, 9, 1, 9, 7];
    const COLPTR: [i64; 11] = [0, 2, 4, 5, 6, 7, 9, 11, 11, 13, 13];
    const WEIGHTS: [f32; 13] = [
        0.1, 0.5, 0.2, 0.5, 0.9, 1.9, 2.0, 2.1, 0.01, 0.9, 0.12, 0.59, 0.67,
    ];

    fn graph() -> CscGraph<'static, i64> {
        CscGraph::new(&ROW, &COLPTR).expect("valid graph")
    }

    fn group_sets(out: &SampleOutput<i64>) -> Vec<HashSet<i64>> {
        let mut groups = Vec::with_capacity(out.counts.len());
        let mut cursor = 0;
        for &c in &out.counts {
            groups.push(out.neighbors[cursor..cursor + c].iter().copied().collect());
            cursor += c;
        }
        groups
    }

    #[test]
    fn fixture_batch_counts_and_groups() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(2)).with_seed(3);
        let out = sampler.sample(&graph(), &[0, 7, 1, 2]).expect("sampled");

        assert_eq!(out.counts, vec![2, 0, 2, 1]);
        assert_eq!(out.neighbors.len(), 5);
        assert!(out.edge_ids.is_none());

        let groups = group_sets(&out);
        assert_eq!(groups[0], HashSet::from([3, 7]));
        assert!(groups[1].is_empty());
        assert_eq!(groups[2], HashSet::from([0, 9]));
        assert_eq!(groups[3], HashSet::from([1]));
    }

    #[test]
    fn sample_all_returns_full_adjacency_in_stored_order() {
        let sampler = NeighborSampler::new(SampleSize::All);
        let nodes: Vec<i64> = (0..10).collect();
        let out = sampler.sample(&graph(), &nodes).expect("sampled");
        assert_eq!(out.neighbors, ROW.to_vec());
        assert_eq!(out.counts, vec![2, 2, 1, 1, 1, 2, 2, 0, 2, 0]);
    }

    #[test]
    fn sentinel_sample_size_means_all() {
        assert_eq!(SampleSize::from(-1), SampleSize::All);
        assert_eq!(SampleSize::from(0), SampleSize::Fixed(0));
        assert_eq!(SampleSize::from(4), SampleSize::Fixed(4));
    }

    #[test]
    fn size_zero_yields_empty_output() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(0)).with_seed(1);
        let out = sampler.sample(&graph(), &[0, 1, 5]).expect("sampled");
        assert!(out.neighbors.is_empty());
        assert_eq!(out.counts, vec![0, 0, 0]);
    }

    #[test]
    fn empty_batch_yields_empty_output() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(2));
        let out = sampler.sample(&graph(), &[]).expect("sampled");
        assert!(out.neighbors.is_empty());
        assert!(out.counts.is_empty());
    }

    #[test]
    fn duplicate_query_nodes_are_sampled_independently() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(1)).with_seed(5);
        let out = sampler.sample(&graph(), &[5, 5, 5]).expect("sampled");
        assert_eq!(out.counts, vec![1, 1, 1]);
        for g in group_sets(&out) {
            assert!(g.is_subset(&HashSet::from([9, 3])));
        }
    }

    #[test]
    fn out_of_range_node_aborts_the_whole_call() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(2));
        let err = sampler
            .sample(&graph(), &[0, 42, 1])
            .expect_err("node 42 out of range");
        assert!(matches!(err, SampleError::OutOfRange { index: 42, .. }));
        let err = sampler
            .par_sample(&graph(), &[0, 42, 1])
            .expect_err("node 42 out of range");
        assert!(matches!(err, SampleError::OutOfRange { index: 42, .. }));
    }

    #[test]
    fn edge_ids_require_an_eid_array() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(2)).return_edge_ids(true);
        let err = sampler.sample(&graph(), &[0]).expect_err("no eid array");
        assert!(matches!(err, SampleError::InvalidArgument { .. }));
    }

    #[test]
    fn weighted_sampling_requires_a_weight_array() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(2));
        let err = sampler
            .weighted_sample(&graph(), &[0])
            .expect_err("no weight array");
        assert!(matches!(err, SampleError::InvalidArgument { .. }));
    }

    #[test]
    fn emitted_edge_ids_share_the_sampled_slot() {
        // eid e identifies slot e, so ROW[eid] must equal the neighbor.
        let eids: Vec<i64> = (0..13).collect();
        let g = graph().with_edge_ids(&eids).expect("matching eids");
        let sampler = NeighborSampler::new(SampleSize::Fixed(2))
            .with_seed(9)
            .return_edge_ids(true);

        let out = sampler.sample(&g, &[0, 5, 6, 8]).expect("sampled");
        let out_eids = out.edge_ids.as_ref().expect("eids requested");
        assert_eq!(out_eids.len(), out.neighbors.len());
        for (n, &e) in out.neighbors.iter().zip(out_eids.iter()) {
            assert_eq!(*n, ROW[e as usize]);
        }
    }

    #[test]
    fn weighted_batch_respects_counts_and_membership() {
        let g = graph().with_edge_weights(&WEIGHTS).expect("matching weights");
        let sampler = NeighborSampler::new(SampleSize::Fixed(2)).with_seed(21);
        let out = sampler.weighted_sample(&g, &[0, 7, 1, 2]).expect("sampled");

        assert_eq!(out.counts, vec![2, 0, 2, 1]);
        let groups = group_sets(&out);
        assert_eq!(groups[0], HashSet::from([3, 7]));
        assert_eq!(groups[2], HashSet::from([0, 9]));
        assert_eq!(groups[3], HashSet::from([1]));
    }

    #[test]
    fn parallel_matches_sequential_under_a_seed() {
        let eids: Vec<i64> = (0..13).collect();
        let g = graph()
            .with_edge_ids(&eids)
            .expect("matching eids")
            .with_edge_weights(&WEIGHTS)
            .expect("matching weights");
        let nodes: Vec<i64> = (0..10).chain(0..10).collect();

        for seed in 0..20u64 {
            let sampler = NeighborSampler::new(SampleSize::Fixed(1))
                .with_seed(seed)
                .return_edge_ids(true);

            let seq = sampler.sample(&g, &nodes).expect("sequential");
            let par = sampler.par_sample(&g, &nodes).expect("parallel");
            assert_eq!(seq, par);

            let seq_w = sampler.weighted_sample(&g, &nodes).expect("sequential");
            let par_w = sampler.par_weighted_sample(&g, &nodes).expect("parallel");
            assert_eq!(seq_w, par_w);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let sampler = NeighborSampler::new(SampleSize::Fixed(1)).with_seed(77);
        let nodes: Vec<i64> = (0..10).collect();
        let a = sampler.sample(&graph(), &nodes).expect("sampled");
        let b = sampler.sample(&graph(), &nodes).expect("sampled");
        assert_eq!(a, b);
    }
}
