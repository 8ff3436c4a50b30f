//! Read-only compressed adjacency views (CSC/CSR layout).
//!
//! A [`CscGraph`] borrows three or four parallel arrays owned by the caller:
//! neighbor ids grouped contiguously by source node, an offset array locating
//! each node's group, and optionally per-edge external ids and weights.
//! The view is validated once at construction and never mutated afterwards,
//! so it can be shared freely across parallel sampling workers.

use std::fmt;
use std::ops::Range;

use num_traits::PrimInt;

use crate::error::SampleError;

/// Integer widths accepted for node and edge indices.
///
/// Signed 32/64-bit indices are what graph-learning frontends hand over;
/// unsigned widths come for free from the same bounds.
pub trait IndexType: PrimInt + Send + Sync + fmt::Debug + 'static {}

impl<T> IndexType for T where T: PrimInt + Send + Sync + fmt::Debug + 'static {}

/// A borrowed, immutable CSC/CSR view of a graph's adjacency.
///
/// `offsets` has length `node_count + 1`; `offsets[v]..offsets[v + 1]` is
/// node `v`'s slice of `neighbor_ids`. All parallel arrays (`edge_ids`,
/// `edge_weights`) share `neighbor_ids`' length and grouping.
///
/// # Examples
///
/// ```
/// use kinjo::CscGraph;
///
/// let row = [3i64, 7, 0, 9, 1, 4, 2, 9, 3, 9, 1, 9, 7];
/// let colptr = [0i64, 2, 4, 5, 6, 7, 9, 11, 11, 13, 13];
/// let graph = CscGraph::new(&row, &colptr)?;
///
/// assert_eq!(graph.node_count(), 10);
/// assert_eq!(graph.degree(0)?, 2);
/// assert_eq!(graph.neighbors(1)?, &[0, 9]);
/// assert_eq!(graph.degree(7)?, 0);
/// # Ok::<(), kinjo::SampleError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CscGraph<'a, I: IndexType> {
    neighbor_ids: &'a [I],
    offsets: &'a [I],
    edge_ids: Option<&'a [I]>,
    edge_weights: Option<&'a [f32]>,
}

impl<'a, I: IndexType> CscGraph<'a, I> {
    /// Build a view over `neighbor_ids` grouped by `offsets`.
    ///
    /// Validates the offset invariants up front (`offsets[0] == 0`,
    /// non-decreasing, final entry equal to the edge count) so that
    /// sampling never has to re-check them per node.
    pub fn new(neighbor_ids: &'a [I], offsets: &'a [I]) -> Result<Self, SampleError> {
        if offsets.is_empty() {
            return Err(SampleError::ShapeMismatch {
                array: "offsets",
                expected: 1,
                actual: 0,
            });
        }
        if offsets[0] != I::zero() {
            return Err(SampleError::InvalidArgument {
                reason: format!("offsets must start at 0, got {:?}", offsets[0]),
            });
        }
        for (i, pair) in offsets.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(SampleError::InvalidArgument {
                    reason: format!(
                        "offsets must be non-decreasing, but offsets[{}] = {:?} > offsets[{}] = {:?}",
                        i,
                        pair[0],
                        i + 1,
                        pair[1]
                    ),
                });
            }
        }
        let declared = offsets[offsets.len() - 1].to_usize().unwrap_or(usize::MAX);
        if declared != neighbor_ids.len() {
            return Err(SampleError::ShapeMismatch {
                array: "neighbor_ids",
                expected: declared,
                actual: neighbor_ids.len(),
            });
        }
        Ok(Self {
            neighbor_ids,
            offsets,
            edge_ids: None,
            edge_weights: None,
        })
    }

    /// Attach a per-edge external id array, parallel to `neighbor_ids`.
    pub fn with_edge_ids(mut self, edge_ids: &'a [I]) -> Result<Self, SampleError> {
        if edge_ids.len() != self.neighbor_ids.len() {
            return Err(SampleError::ShapeMismatch {
                array: "edge_ids",
                expected: self.neighbor_ids.len(),
                actual: edge_ids.len(),
            });
        }
        self.edge_ids = Some(edge_ids);
        Ok(self)
    }

    /// Attach a per-edge weight array, parallel to `neighbor_ids`.
    ///
    /// Weights must be non-negative; a zero weight is a valid slot with
    /// zero selection probability.
    pub fn with_edge_weights(mut self, edge_weights: &'a [f32]) -> Result<Self, SampleError> {
        if edge_weights.len() != self.neighbor_ids.len() {
            return Err(SampleError::ShapeMismatch {
                array: "edge_weights",
                expected: self.neighbor_ids.len(),
                actual: edge_weights.len(),
            });
        }
        self.edge_weights = Some(edge_weights);
        Ok(self)
    }

    /// Number of nodes covered by the view.
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of edges (length of `neighbor_ids`).
    pub fn edge_count(&self) -> usize {
        self.neighbor_ids.len()
    }

    /// The full neighbor id array.
    pub fn neighbor_ids(&self) -> &'a [I] {
        self.neighbor_ids
    }

    /// The per-edge external id array, if attached.
    pub fn edge_ids(&self) -> Option<&'a [I]> {
        self.edge_ids
    }

    /// The per-edge weight array, if attached.
    pub fn edge_weights(&self) -> Option<&'a [f32]> {
        self.edge_weights
    }

    /// Resolve node `v`'s slice of the edge arrays.
    ///
    /// This is the degree resolver: `offsets[v]..offsets[v + 1]`. Fails with
    /// [`SampleError::OutOfRange`] if `v` is negative or `>= node_count()`,
    /// so a bad query node can never cause an out-of-bounds read.
    pub fn neighbor_range(&self, node: I) -> Result<Range<usize>, SampleError> {
        let bound = self.node_count();
        let idx = node
            .to_usize()
            .filter(|&i| i < bound)
            .ok_or(SampleError::OutOfRange {
                what: "query node",
                index: node.to_i128().unwrap_or(i128::MIN),
                bound,
            })?;
        let start = self.offset_at(idx)?;
        let end = self.offset_at(idx + 1)?;
        Ok(start..end)
    }

    /// Out-degree of node `v` (may be 0).
    pub fn degree(&self, node: I) -> Result<usize, SampleError> {
        Ok(self.neighbor_range(node)?.len())
    }

    /// Node `v`'s neighbors, in stored order.
    pub fn neighbors(&self, node: I) -> Result<&'a [I], SampleError> {
        Ok(&self.neighbor_ids[self.neighbor_range(node)?])
    }

    /// Largest out-degree across all nodes.
    ///
    /// Useful for pre-sizing a reusable scratch buffer.
    pub fn max_degree(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).to_usize().unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    fn offset_at(&self, i: usize) -> Result<usize, SampleError> {
        self.offsets[i]
            .to_usize()
            .filter(|&o| o <= self.neighbor_ids.len())
            .ok_or(SampleError::OutOfRange {
                what: "derived offset",
                index: self.offsets[i].to_i128().unwrap_or(i128::MIN),
                bound: self.neighbor_ids.len(),
            })
    }
}
