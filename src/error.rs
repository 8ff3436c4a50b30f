//! Error taxonomy for sampling calls.
//!
//! Every failure is detected synchronously, before or during a batch call,
//! and aborts the whole call: a `SampleError` means no output was produced.
//! Nothing is retried internally and nothing silently falls back to a
//! default (a missing weight array is an error, not uniform sampling).

use thiserror::Error;

/// Unified error type for all public sampling entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// The request contradicts the graph view it was issued against,
    /// e.g. edge ids were requested but the view carries no edge id array.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A parallel array does not agree with the graph's declared shape.
    #[error("shape mismatch in `{array}`: expected length {expected}, got {actual}")]
    ShapeMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A query node index or a derived offset fell outside its valid bound.
    #[error("{what} {index} out of range (bound {bound})")]
    OutOfRange {
        what: &'static str,
        index: i128,
        bound: usize,
    },
}
