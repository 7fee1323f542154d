//! Feature-batch tensors for the vcreg regularizer.
//!
//! This crate holds the data side of the regularizer: a rank-4 batch of
//! embedding feature maps `(batch, channels, height, width)` backed by
//! `ndarray`, plus the handful of shape and element helpers the loss needs.
//!
//! # Overview
//!
//! - [`FeatureBatch`]: an owned, validated rank-4 batch, stored flattened as
//!   `(batch, channels, height * width)`.
//! - [`Shape`] and [`BatchDims`]: dimension bookkeeping.
//! - [`ops`]: `relu` and off-diagonal extraction for square matrices.
//!
//! # Example
//!
//! ```rust
//! use vcreg_tensor::FeatureBatch;
//!
//! let batch = FeatureBatch::from_shape_vec(&[2, 3, 2, 2], vec![0.5; 24]).unwrap();
//! assert_eq!(batch.batch_size(), 2);
//! assert_eq!(batch.channels(), 3);
//! assert_eq!(batch.spatial(), 4);
//! assert_eq!(batch.flattened().shape(), &[2, 3, 4]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod ops;
pub mod shape;

pub use batch::FeatureBatch;
pub use shape::{BatchDims, Shape};

/// Error types for tensor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    /// The tensor does not have the required number of dimensions.
    #[error("Rank mismatch: expected {expected}D tensor, got {got}D with shape {shape}")]
    RankMismatch {
        /// The required rank.
        expected: usize,
        /// The rank that was provided.
        got: usize,
        /// The offending shape.
        shape: Shape,
    },

    /// A flat buffer does not match the element count of its shape.
    #[error("Data length mismatch: shape {shape} needs {expected} elements, got {got}")]
    DataLength {
        /// The shape the buffer was meant to fill.
        shape: Shape,
        /// Number of elements implied by the shape.
        expected: usize,
        /// Number of elements provided.
        got: usize,
    },

    /// A matrix operation that needs a square matrix received a rectangular one.
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Invalid shape error.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

/// Result type for tensor operations.
pub type TensorResult<T> = Result<T, TensorError>;

impl From<ndarray::ShapeError> for TensorError {
    fn from(err: ndarray::ShapeError) -> Self {
        TensorError::InvalidShape(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() {
        let batch = FeatureBatch::from_shape_vec(&[2, 1, 1, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        assert_eq!(batch.dims(), BatchDims::new(2, 1, 1, 3));

        let channel = batch.channel(0);
        assert_eq!(channel.shape(), &[2, 3]);
        assert_eq!(channel[[1, 2]], 6.0);
    }

    #[test]
    fn test_tensor_error() {
        let err = TensorError::RankMismatch {
            expected: 4,
            got: 2,
            shape: Shape::from([3, 2]),
        };
        let msg = err.to_string();
        assert!(msg.contains("Rank mismatch"));
        assert!(msg.contains("(3, 2)"));

        let err = TensorError::NotSquare { rows: 2, cols: 3 };
        assert!(err.to_string().contains("2x3"));
    }
}
